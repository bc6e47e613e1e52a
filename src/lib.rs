/*!

The public entry point. [`Prover`] wires `kbc_core`'s saturation engine (the term store, KBO,
active/passive sets, and the `complete1` loop) into something an embedder drives one tick at a
time, forwarding the engine's output message stream to an [`Output`] sink.

Reading a concrete problem syntax (TPTP and friends) off disk or a socket is out of scope here —
that's [`ProblemSource`]'s job, a seam a future loader implements against rather than something
this crate provides an implementation of.

*/

mod clock;
mod output;
mod problem_source;
mod prover;

pub use clock::{Clock, IterationBudget, Unbounded};
pub use output::{CollectingOutput, Output};
pub use problem_source::ProblemSource;
pub use prover::Prover;

pub use kbc_core::{
  Active, ActiveRule, Comparison, Config, CriticalPair, EngineBug, FunctionId, FunctionSymbol,
  Goal, InputError, JoinConfig, JoinOutcome, LoopOutcome, Message, Model, Orientation, Passive,
  PassiveOrigin, Proof, ProofStep, Rule, ScoreWeights, SymbolFlag, SymbolFlags, SymbolTable, Term,
  TermBuilder, TermList, Ticker, VariableIndex,
};
