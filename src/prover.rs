/*!

[`Prover`] owns one saturation run: a symbol table, the engine's mutable [`kbc_core::State`], and
a maintenance ticker. It is driven one iteration at a time via [`Prover::tick`], or to completion
(or a [`Clock`]'s cutoff) via [`Prover::run`].

*/

use kbc_abs::log;
use kbc_core::{complete1, Goal, LoopOutcome, Passive, PassiveOrigin, State, SymbolTable, Term, Ticker};

use crate::{Config, Output};

pub struct Prover {
  state:       State,
  maintenance: Ticker,
}

impl Prover {
  /// Builds a prover over `table` with `config`. The maintenance ticker's interval is derived
  /// from `config.renormalise_percent`: a full passive-queue renormalisation and interreduction
  /// pass runs roughly once every `1 / renormalise_percent` iterations (§6).
  pub fn new(table: SymbolTable, config: Config) -> Self {
    log::init_tracing();
    let interval = if config.renormalise_percent > 0.0 {
      (1.0 / config.renormalise_percent).round().max(1.0) as u64
    } else {
      0
    };
    Prover { state: State::new(table, config), maintenance: Ticker::new_task(interval) }
  }

  pub fn table(&self) -> &SymbolTable {
    &self.state.table
  }

  /// Declares `lhs = rhs` as a starting axiom, enqueuing it as the first passive critical pair
  /// the saturation loop will consider.
  pub fn add_equation(&mut self, lhs: Term, rhs: Term) {
    let age = self.state.critical_pair_count;
    self.state.critical_pair_count += 1;
    let origin = PassiveOrigin::Equation { lhs, rhs, depth: 0 };
    self.state.passive.push(Passive { origin, score: 0, age });
  }

  /// Registers a goal the prover should watch for: once both sides normalise to the same term
  /// under the growing active set, a [`kbc_core::Message::ProvedGoal`] is emitted carrying the
  /// certified proof.
  pub fn add_goal(&mut self, lhs: Term, rhs: Term) -> u64 {
    let id = self.state.fresh_goal_id();
    self.state.goals.push(Goal::new(id, lhs, rhs));
    id
  }

  /// Runs one `complete1` iteration, forwarding every message the engine emitted as a result to
  /// `output`, in emission order.
  pub fn tick<O: Output>(&mut self, output: &mut O) -> LoopOutcome {
    let outcome = complete1(&mut self.state, &mut self.maintenance);
    for message in self.state.take_messages() {
      output.emit(message);
    }
    outcome
  }

  /// Ticks until the passive queue is exhausted or `clock` says to stop, whichever comes first.
  pub fn run<C: crate::Clock, O: Output>(&mut self, clock: &mut C, output: &mut O) {
    let mut iterations = 0u64;
    loop {
      if clock.should_stop(iterations) {
        return;
      }
      if matches!(self.tick(output), LoopOutcome::Exhausted | LoopOutcome::NoProgress) {
        return;
      }
      iterations += 1;
    }
  }
}
