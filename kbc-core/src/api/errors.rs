/*!

Error kinds, per §7. Two enums cover the two conditions that are genuinely errors — input
rejected at load time, and internal assertion violations — built with `thiserror` the way
`logannye-tinyzkp` (the pack's one example with a comparable structured-error dependency)
builds its error enums. Resource bounds (`max_term_size`, `max_critical_pairs`, `max_cp_depth`)
are deliberately *not* represented here: tripping one is plain control flow
(`LoopOutcome::NoProgress`), not an error, per §7's "recoverable... returns an incomplete
state."

*/

use thiserror::Error;

/// An axiom was rejected at orientation time (§4.C `orient`, cases 2 and 3). The embedder's
/// loader (out of scope here) is expected to surface this as a fatal input error, per §7.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum InputError {
  #[error("rhs contains a variable not bound in lhs")]
  UnboundVariable,
  #[error("neither side of the equation is reducible in the ordering (rhs >= lhs)")]
  NotOriented,
}

/// An internal invariant was violated. These never represent a recoverable program state —
/// per §7, they indicate a programming error in the engine itself, not bad input.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum EngineBug {
  #[error("Rule::backwards called on a rule that cannot be reversed (Oriented/WeaklyOriented)")]
  NotReversible,
  #[error("malformed symbol: function header size does not match subterm extent")]
  MalformedSymbol,
}
