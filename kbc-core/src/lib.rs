#![allow(dead_code)]
/*!

The saturation engine for an unfailing Knuth–Bendix completion prover.

Laid out the way the teacher lays out its workspace crates: `api` holds the types an embedder
constructs or observes (symbols, terms, rules, configuration, messages); `core` holds the
algorithms that operate on them (the term store, substitution/matching/unification, the KBO
ordering and its models, the term index, rewriting, critical pairs, the passive queue, and the
saturation loop itself).

*/

pub mod api;
pub(crate) mod core;

pub use crate::core::{
  active::{Active, ActiveRule},
  critical_pair::{CriticalPair, JoinOutcome},
  goal::Goal,
  kbo::{Comparison, Model},
  passive_queue::{Passive, PassiveOrigin},
  proof::{Proof, ProofStep},
  rule::{Orientation, Rule},
  saturation::{complete1, LoopOutcome},
  state::State,
  term_store::{Term, TermBuilder, TermList},
  ticker::Ticker,
};
pub use crate::api::{
  config::{Config, JoinConfig, ScoreWeights},
  errors::{EngineBug, InputError},
  message::Message,
  symbol::{FunctionId, FunctionSymbol, SymbolFlag, SymbolFlags, SymbolTable, VariableIndex},
};
