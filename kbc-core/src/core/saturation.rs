/*!

The saturation loop itself, §4.I: `complete1` is one iteration — dequeue the best passive
critical pair (`core::passive_queue::dequeue`, which reconstructs it from its compact record and
skips anything orphaned or oversized along the way), attempt to join it (`core::critical_pair::
join_critical_pair`), and either discard it, recurse into the sub-critical-pairs a
subconnectedness split produced, or orient the unjoined remainder into a new active rule and fan
out the new critical pairs it creates with every existing rule (subject to `config.max_cp_depth`
and subsumption against what's already known). `interreduce` is the periodic maintenance step
that keeps the active set itself reduced: a rule whose left side becomes reducible by some other
rule is redundant and is retired back into the pool of equations to reprocess; a rule whose right
side simplifies has that simplification folded in place.

*/

use crate::{
  api::message::Message,
  core::{
    active::{ActiveId, ActiveRule},
    critical_pair::{join_critical_pair, overlaps, score, CriticalPair, JoinOutcome},
    goal::{normalise_goals, GoalId},
    passive_queue::{self, PassiveOrigin},
    proof::certify,
    rewriting::simplify,
    rule::{orient_either, Rule},
    state::State,
    term_store::Term,
    ticker::Ticker,
  },
};

#[derive(Clone, Debug)]
pub enum LoopOutcome {
  /// One iteration completed; carries the ids of any goals newly proved this round.
  Continue { solved_goals: Vec<GoalId> },
  /// The passive queue was empty; there was nothing left to consider.
  Exhausted,
  /// A resource bound (`max_critical_pairs`) was already tripped, or every goal is already
  /// solved, before this call did any work: a recoverable halt, not an error (§7).
  NoProgress,
}

/// An equation already implied by what's active: either it's one of the pairs already recorded
/// as joinable, or it's exactly (in either direction) some active rule's defining equation (§4.H,
/// "subsumption"). A subsumed candidate is dropped outright rather than re-derived as a new rule.
fn is_subsumed(state: &State, lhs: &Term, rhs: &Term) -> bool {
  let matches_either_way = |a: &Term, b: &Term| {
    (a.eq_structural(lhs) && b.eq_structural(rhs)) || (a.eq_structural(rhs) && b.eq_structural(lhs))
  };
  state.joinable_equations.iter().any(|(a, b)| matches_either_way(a, b))
    || state.active_rules.values().any(|ar| matches_either_way(&ar.rule.lhs, &ar.rule.rhs))
}

/// Attempts to join `cp` (§4.H). A pair that's fully joined is recorded for subsumption and its
/// derivation emitted as [`Message::NewEquation`]; one resolved into sub-critical-pairs by a
/// subconnectedness split is recursed into, each sub-pair considered in turn; one that's still
/// divergent is oriented into a new active rule (trying both readings, since a critical pair
/// carries no preferred direction the way a user-declared axiom does) and added to the active set.
pub fn consider(state: &mut State, cp: CriticalPair) -> Option<ActiveId> {
  let rules = state.active_rule_pairs();
  let outcome = join_critical_pair(&cp, &state.rule_index, &rules, &state.table, &state.config.join);

  match outcome {
    JoinOutcome::Joined { sub_pairs, .. } if sub_pairs.is_empty() => {
      state.record_joinable_equation(cp.lhs.clone(), cp.rhs.clone());
      state.emit(Message::NewEquation { lhs: cp.lhs.clone(), rhs: cp.rhs.clone() });
      None
    }
    JoinOutcome::Joined { sub_pairs, .. } => {
      let mut last = None;
      for sub in sub_pairs {
        // `join_critical_pair` is responsible for never handing back a sub-pair identical to
        // `cp` itself (that would mean the split made no real progress); this is a backstop, not
        // the primary guard, so a future change to that invariant fails safe here instead of
        // recursing forever — treat an unchanged sub-pair as if it had come back `NotJoined`.
        if sub.lhs.eq_structural(&cp.lhs) && sub.rhs.eq_structural(&cp.rhs) {
          kbc_abs::debug!("dropping a sub-critical-pair identical to its parent: no splitting progress was made");
          continue;
        }
        last = consider(state, sub).or(last);
      }
      last
    }
    JoinOutcome::NotJoined { pair, .. } => {
      // Critical pairs carry no preferred direction (unlike a user-declared axiom), so try both
      // readings before giving up. A pair that's orientable in neither direction is dropped:
      // internally-derived equations have no loader to surface an `InputError` to, and the pair
      // either came from a malformed rule elsewhere (an engine bug, not this call's problem) or
      // is one more case unfailing completion leaves for a human to add by hand.
      match orient_either(&pair.lhs, &pair.rhs, &state.table) {
        Ok(rule) => add_active(state, rule, pair.depth),
        Err(e) => {
          kbc_abs::debug!("dropping an unorientable critical pair: {e}");
          None
        }
      }
    }
  }
}

/// Scores and enqueues a single new critical pair under its compact `origin` record, respecting
/// `config.max_term_size`, `config.max_cp_depth`, and `config.max_critical_pairs` (§4.G/§4.H):
/// oversized or too-deep pairs, and pairs beyond the configured budget, are silently dropped
/// rather than grown without bound.
fn add_cp(state: &mut State, origin: PassiveOrigin, cp: CriticalPair) {
  if state.critical_pair_count >= state.config.max_critical_pairs {
    return;
  }
  if cp.depth > state.config.max_cp_depth {
    return;
  }
  if cp.lhs.size() > state.config.max_term_size || cp.rhs.size() > state.config.max_term_size {
    return;
  }
  state.critical_pair_count += 1;
  let age = state.critical_pair_count;
  let weights = state.config.critical_pairs;
  let s = score(&cp, age, &weights, &state.table);
  state.passive.push(passive_queue::Passive { origin, score: s, age });
}

/// Adds `rule` to the active set and fans out every critical pair it forms with the
/// (pre-existing) active rules, plus any pair it forms overlapping with itself — unless `rule`'s
/// equation is subsumed by an equation or rule already known, in which case it's dropped and
/// `None` is returned instead.
pub fn add_active(state: &mut State, rule: Rule, depth: u32) -> Option<ActiveId> {
  if is_subsumed(state, &rule.lhs, &rule.rhs) {
    return None;
  }

  let existing: Vec<ActiveRule> = state.active_rules.values().cloned().collect();
  let id = state.add_active_rule(rule, depth);
  let new_rule = state.active_rules.get(&id).unwrap().clone();
  let max_depth = state.config.max_cp_depth;

  let mut generated: Vec<(PassiveOrigin, CriticalPair)> = Vec::new();
  for other in &existing {
    for (position, cp) in overlaps(&new_rule, other, &state.table, max_depth) {
      generated.push((PassiveOrigin::Overlap { rule1: new_rule.id, rule2: other.id, position }, cp));
    }
    for (position, cp) in overlaps(other, &new_rule, &state.table, max_depth) {
      generated.push((PassiveOrigin::Overlap { rule1: other.id, rule2: new_rule.id, position }, cp));
    }
  }
  for (position, cp) in overlaps(&new_rule, &new_rule, &state.table, max_depth) {
    generated.push((PassiveOrigin::Overlap { rule1: new_rule.id, rule2: new_rule.id, position }, cp));
  }

  for (origin, cp) in generated {
    add_cp(state, origin, cp);
  }
  Some(id)
}

/// One maintenance sweep over the active set: a rule whose left side some *other* rule can now
/// rewrite is redundant (its own defining equation is no longer in normal form, so it's retired
/// and reprocessed as a fresh equation, keeping its own derivation depth); a rule whose right side
/// simplifies has the simplification folded in.
pub fn interreduce(state: &mut State) {
  let ids: Vec<ActiveId> = {
    let mut ids: Vec<_> = state.active_rules.keys().copied().collect();
    ids.sort_unstable();
    ids
  };

  for id in ids {
    let Some(active_rule) = state.active_rules.get(&id) else { continue };
    let rule = active_rule.rule.clone();
    let depth = active_rule.depth;
    let others: Vec<_> =
      state.active_rules.values().filter(|r| r.id != id).map(|r| (r.id, r.rule.clone())).collect();

    let lhs_reduced = simplify(&rule.lhs, &state.rule_index, &others, &state.table);
    if !lhs_reduced.eq_structural(&rule.lhs) {
      state.remove_active_rule(id);
      let (l, r) = rule.unorient();
      consider(state, CriticalPair { lhs: l, rhs: r, source: (id, id), depth });
      continue;
    }

    let rhs_reduced = simplify(&rule.rhs, &state.rule_index, &others, &state.table);
    if !rhs_reduced.eq_structural(&rule.rhs) {
      if let Some(entry) = state.active_rules.get_mut(&id) {
        entry.rule.rhs = rhs_reduced;
      }
    }
  }

  state.emit(Message::Interreduce);
}

/// One iteration of the saturation loop. `maintenance` gates how often a full passive-queue
/// renormalisation and interreduction run; a `maintenance.check_task()` firing this round triggers
/// `simplify_queue` unconditionally, then `interreduce` only if `config.simplify` is enabled — a
/// deployment that wants the (expensive) rescoring sweep but not the stronger, also-expensive
/// active-set reduction can disable just the latter.
///
/// Per §4.I, the bound and goal checks run *before* any work this round: a `max_critical_pairs`
/// trip or an already-solved goal halts with [`LoopOutcome::NoProgress`] without touching the
/// passive queue.
pub fn complete1(state: &mut State, maintenance: &mut Ticker) -> LoopOutcome {
  if state.considered_count >= state.config.max_critical_pairs {
    return LoopOutcome::NoProgress;
  }
  if state.goals.iter().any(|g| g.is_solved()) {
    return LoopOutcome::NoProgress;
  }

  let Some(cp) = passive_queue::dequeue(
    &mut state.passive,
    &state.active_rules,
    &state.table,
    state.config.max_term_size,
    &mut state.considered_count,
  ) else {
    return LoopOutcome::Exhausted;
  };
  state.considered_count += 1;

  consider(state, cp);

  if maintenance.check_task() {
    let rules = state.active_rule_pairs();
    passive_queue::simplify_queue(
      &mut state.passive,
      &state.active_rules,
      &state.rule_index,
      &rules,
      &state.table,
      &state.config.critical_pairs,
    );
    if state.config.simplify {
      interreduce(state);
    }
    state.emit(Message::SimplifyQueue);
  }

  let rules = state.active_rule_pairs();
  let mut goals = std::mem::take(&mut state.goals);
  let newly_solved = normalise_goals(&mut goals, &state.rule_index, &rules, &state.table);

  for &goal_id in &newly_solved {
    if let Some(goal) = goals.iter().find(|g| g.id == goal_id) {
      if let Some((l, r)) = goal.matching_pair() {
        let proof = certify(l, r);
        state.emit(Message::ProvedGoal { goal: goal.clone(), proof });
      }
    }
  }
  state.goals = goals;

  LoopOutcome::Continue { solved_goals: newly_solved }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    api::{config::Config, symbol::FunctionSymbol},
    core::{goal::Goal, passive_queue::Passive, state::State, term_store::{const_term, TermBuilder}},
  };

  fn equation_passive(lhs: Term, rhs: Term) -> Passive {
    Passive { origin: PassiveOrigin::Equation { lhs, rhs, depth: 0 }, score: 0, age: 0 }
  }

  #[test]
  fn completes_a_simple_ground_equation_and_proves_a_goal() {
    let mut table = crate::api::symbol::SymbolTable::new();
    let a = table.declare(FunctionSymbol::new("a", 0, 1, 0));
    let b = table.declare(FunctionSymbol::new("b", 0, 1, 1));

    let mut state = State::new(table, Config::default());
    state.goals.push(Goal::new(state.fresh_goal_id(), const_term(a), const_term(b)));

    state.passive.push(equation_passive(const_term(a), const_term(b)));

    let mut ticker = Ticker::new_task(0);
    let outcome = complete1(&mut state, &mut ticker);
    match outcome {
      LoopOutcome::Continue { solved_goals } => assert_eq!(solved_goals, vec![0]),
      other => panic!("expected progress, got {other:?}"),
    }
    assert_eq!(state.active_rules.len(), 1);

    let messages = state.take_messages();
    assert!(messages.iter().any(|m| matches!(m, Message::ProvedGoal { .. })));
  }

  #[test]
  fn zero_max_critical_pairs_halts_with_no_progress() {
    // S5: a budget of zero considered CPs stops the loop before it touches the passive queue,
    // even though there's a perfectly good axiom sitting in it.
    let mut table = crate::api::symbol::SymbolTable::new();
    let a = table.declare(FunctionSymbol::new("a", 0, 1, 0));
    let b = table.declare(FunctionSymbol::new("b", 0, 1, 1));

    let mut config = Config::default();
    config.max_critical_pairs = 0;
    let mut state = State::new(table, config);
    state.passive.push(equation_passive(const_term(a), const_term(b)));

    let mut ticker = Ticker::new_task(0);
    assert!(matches!(complete1(&mut state, &mut ticker), LoopOutcome::NoProgress));
    assert!(state.active_rules.is_empty());
    assert_eq!(state.passive.len(), 1);
  }

  #[test]
  fn exhausted_when_passive_queue_is_empty() {
    let table = crate::api::symbol::SymbolTable::new();
    let mut state = State::new(table, Config::default());
    let mut ticker = Ticker::new_task(0);
    assert!(matches!(complete1(&mut state, &mut ticker), LoopOutcome::Exhausted));
  }

  #[test]
  fn commutativity_axiom_joins_an_instance_via_a_model_order() {
    // A minimal end-to-end shape of scenario S2 from the original write-up: declaring a
    // commutative function and adding f(x, y) = f(y, x) as the sole starting equation produces
    // a Permutative active rule rather than looping or rejecting the input.
    let mut table = crate::api::symbol::SymbolTable::new();
    let f = table.declare(FunctionSymbol::new("f", 2, 1, 1));
    let x = crate::api::symbol::VariableIndex(0);
    let y = crate::api::symbol::VariableIndex(1);

    let mut b1 = TermBuilder::new();
    b1.emit_fun(f, |bd| {
      bd.emit_var(x);
      bd.emit_var(y);
    });
    let fxy = b1.finish();
    let mut b2 = TermBuilder::new();
    b2.emit_fun(f, |bd| {
      bd.emit_var(y);
      bd.emit_var(x);
    });
    let fyx = b2.finish();

    let mut state = State::new(table, Config::default());
    state.passive.push(equation_passive(fxy, fyx));
    let mut ticker = Ticker::new_task(0);
    complete1(&mut state, &mut ticker);
    assert_eq!(state.active_rules.len(), 1);
    let rule = state.active_rules.values().next().unwrap();
    assert!(matches!(rule.rule.orientation, crate::core::rule::Orientation::Permutative(_)));
  }

  #[test]
  fn a_rule_subsuming_equation_is_not_re_added_as_a_duplicate_rule() {
    let mut table = crate::api::symbol::SymbolTable::new();
    let a = table.declare(FunctionSymbol::new("a", 0, 1, 0));
    let b = table.declare(FunctionSymbol::new("b", 0, 1, 1));

    let mut state = State::new(table, Config::default());
    let rule = crate::core::rule::orient(&const_term(a), &const_term(b), &state.table).unwrap();
    add_active(&mut state, rule.clone(), 0);
    assert_eq!(state.active_rules.len(), 1);

    // The very same equation, read the other way round, is subsumed by the rule just added.
    let duplicate = crate::core::rule::orient(&const_term(a), &const_term(b), &state.table).unwrap();
    let result = add_active(&mut state, duplicate, 0);
    assert!(result.is_none());
    assert_eq!(state.active_rules.len(), 1);
  }

  #[test]
  fn joining_a_pair_emits_new_equation_instead_of_a_new_active_rule() {
    let mut table = crate::api::symbol::SymbolTable::new();
    let a = table.declare(FunctionSymbol::new("a", 0, 1, 0));

    let mut state = State::new(table, Config::default());
    let result = consider(&mut state, CriticalPair { lhs: const_term(a), rhs: const_term(a), source: (0, 0), depth: 0 });
    assert!(result.is_none());
    assert!(state.active_rules.is_empty());
    assert_eq!(state.joinable_equations.len(), 1);

    let messages = state.take_messages();
    assert!(messages.iter().any(|m| matches!(m, Message::NewEquation { .. })));
  }
}
