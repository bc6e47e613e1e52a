/*!

The active set's elements, §4.F. An active clause is either a rewrite rule (the common case) or
a joinable equation kept around purely so later critical pairs can be subsumed against it without
re-deriving it. Both are tagged with the saturation-loop-assigned id used to refer to them from
the passive queue, the output message stream, and the proof DAG.

*/

use crate::core::{rule::Rule, term_store::Term};

pub type ActiveId = u64;

#[derive(Clone, Debug)]
pub struct ActiveRule {
  pub id:   ActiveId,
  pub rule: Rule,
  /// Insertion order, used to break ties in the passive queue's age component (§4.G) and as a
  /// cheap recency signal during interreduction.
  pub age:  u64,
  /// Derivation depth: `0` for a rule oriented straight from a user-declared axiom, otherwise
  /// `1 + max` of the two rules whose overlap produced the critical pair this rule came from
  /// (§4.G). Checked against `config.max_cp_depth` before a critical pair is even enqueued.
  pub depth: u32,
}

#[derive(Clone, Debug)]
pub enum Active {
  Rule(ActiveRule),
  /// An equation both sides of which were already joinable when it was derived: kept for
  /// subsumption, never used to rewrite.
  JoinableEquation { id: ActiveId, lhs: Term, rhs: Term, age: u64 },
}

impl Active {
  pub fn id(&self) -> ActiveId {
    match self {
      Active::Rule(r) => r.id,
      Active::JoinableEquation { id, .. } => *id,
    }
  }

  pub fn age(&self) -> u64 {
    match self {
      Active::Rule(r) => r.age,
      Active::JoinableEquation { age, .. } => *age,
    }
  }

  pub fn as_rule(&self) -> Option<&ActiveRule> {
    match self {
      Active::Rule(r) => Some(r),
      Active::JoinableEquation { .. } => None,
    }
  }
}
