/*!

The output message stream (§6). Messages are emitted in-order before the state mutation they
describe takes effect (§5 "Ordering guarantees": message emission precedes state mutation
within a single `complete1`).

*/

use crate::core::{active::Active, goal::Goal, proof::Proof};

#[derive(Debug, Clone)]
pub enum Message {
  /// A rule has been added to the active set.
  NewActive(Active),
  /// A joinable equation was recorded (subsumption index growth).
  NewEquation { lhs: crate::core::term_store::Term, rhs: crate::core::term_store::Term },
  /// A rule was retired by interreduction.
  DeleteActive(Active),
  /// The passive queue was rescored against the current rule set.
  SimplifyQueue,
  /// Each active rule was checked against every other (§4.I "Interreduction").
  Interreduce,
  /// A goal was solved; carries its certified proof.
  ProvedGoal { goal: Goal, proof: Proof },
}
