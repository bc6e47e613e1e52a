/*!

The seam a concrete problem loader (TPTP or otherwise) would implement against. Parsing a
problem file into symbols, axioms, and goals is explicitly out of scope for this crate (it's an
outer surface, not part of the completion engine itself); `ProblemSource` exists so that surface
has a defined place to plug into [`crate::Prover`] once it's built, without this crate needing to
know anything about concrete syntax.

*/

use crate::Prover;

pub trait ProblemSource {
  /// Declares this source's symbols, starting equations, and goals into `prover`.
  fn populate(&mut self, prover: &mut Prover);
}
