/*!

Goals: equations the engine is trying to prove rather than merely complete against, §4.I/§4.J. A
goal tracks, for each side, the *set* of [`Reduction`]s reached so far by one-step rewrites
(`rewriting::successors`), grown one generation at a time as `normalise_goals` is driven against
the current active set. A goal is solved the moment the two sides' candidate sets share a target
term, rather than only when each side's single greedy simplification happens to land on the same
term — mid-completion the active set isn't confluent yet, so a term can have more than one
irreducible-so-far rewrite, and committing to just one per side can miss a join the broader set
would catch. Keeping the full [`Reduction`] (not just its target) per candidate means that once a
goal is solved, `core::proof::certify` can be handed the exact pair of traces that met, rather than
having to re-derive a connection from scratch.

*/

use crate::core::{
  active::ActiveId,
  rewriting::{successors, trans, Reduction},
  rule::Rule,
  term_index::RuleIndex,
  term_store::Term,
};
use crate::api::symbol::SymbolTable;

pub type GoalId = u64;

/// Caps how large a goal's side set is allowed to grow, so a side that keeps turning up genuinely
/// new successors (an Unoriented/Permutative rule set not yet confluent) can't make a goal check
/// grow without bound.
pub const MAX_GOAL_FORMS: usize = 64;

#[derive(Clone, Debug)]
pub struct Goal {
  pub id:  GoalId,
  pub lhs: Term,
  pub rhs: Term,
  lhs_forms: Vec<Reduction>,
  rhs_forms: Vec<Reduction>,
}

impl Goal {
  pub fn new(id: GoalId, lhs: Term, rhs: Term) -> Self {
    Goal { lhs_forms: vec![Reduction::Refl(lhs.clone())], rhs_forms: vec![Reduction::Refl(rhs.clone())], lhs, rhs }
  }

  pub fn is_solved(&self) -> bool {
    self.matching_pair().is_some()
  }

  /// A pair of reductions, one per side, that reach the same target term, if the sides' candidate
  /// sets currently intersect.
  pub fn matching_pair(&self) -> Option<(&Reduction, &Reduction)> {
    self.lhs_forms.iter().find_map(|l| {
      self.rhs_forms.iter().find(|r| l.target().eq_structural(&r.target())).map(|r| (l, r))
    })
  }

  /// The reductions to normal-form candidates discovered so far for the left side.
  pub fn lhs_forms(&self) -> &[Reduction] {
    &self.lhs_forms
  }

  /// The reductions to normal-form candidates discovered so far for the right side.
  pub fn rhs_forms(&self) -> &[Reduction] {
    &self.rhs_forms
  }
}

/// Grows `forms` by one generation: every one-step reduct of every candidate already in the set,
/// deduplicated against what's already there by target term, up to [`MAX_GOAL_FORMS`].
fn grow(forms: &mut Vec<Reduction>, index: &RuleIndex, rules: &[(ActiveId, Rule)], table: &SymbolTable) {
  if forms.len() >= MAX_GOAL_FORMS {
    return;
  }
  let mut fresh: Vec<Reduction> = Vec::new();
  for reduction in forms.iter() {
    let current = reduction.target();
    for step in successors(&current, index, rules, table) {
      let candidate = step.target();
      let known =
        forms.iter().any(|r| r.target().eq_structural(&candidate)) || fresh.iter().any(|r| r.target().eq_structural(&candidate));
      if !known {
        fresh.push(trans(reduction.clone(), step));
      }
    }
  }
  forms.extend(fresh);
  forms.truncate(MAX_GOAL_FORMS);
}

/// Grows every not-yet-solved goal's side sets by one generation against the current active set,
/// returning the ids of goals newly discovered to be solved this round.
pub fn normalise_goals(
  goals: &mut [Goal],
  index: &RuleIndex,
  rules: &[(ActiveId, Rule)],
  table: &SymbolTable,
) -> Vec<GoalId> {
  let mut solved = Vec::new();
  for goal in goals.iter_mut() {
    if goal.is_solved() {
      continue;
    }
    grow(&mut goal.lhs_forms, index, rules, table);
    grow(&mut goal.rhs_forms, index, rules, table);
    if goal.is_solved() {
      solved.push(goal.id);
    }
  }
  solved
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{api::symbol::FunctionSymbol, core::term_store::const_term};

  fn index_rule(index: &mut RuleIndex, id: ActiveId, rule: &Rule) {
    index.index_oriented.insert(id, rule.lhs.clone());
    index.index_all.insert(id, rule.lhs.clone());
  }

  #[test]
  fn goal_becomes_solved_once_both_sides_rewrite_together() {
    let mut table = SymbolTable::new();
    let a = table.declare(FunctionSymbol::new("a", 0, 1, 0));
    let b = table.declare(FunctionSymbol::new("b", 0, 1, 1));
    let rule = crate::core::rule::orient(&const_term(b), &const_term(a), &table).unwrap();

    let mut index = RuleIndex::new();
    index_rule(&mut index, 1, &rule);
    let rules = vec![(1u64, rule)];

    let mut goals = vec![Goal::new(1, const_term(a), const_term(b))];
    assert!(!goals[0].is_solved());

    let solved = normalise_goals(&mut goals, &index, &rules, &table);
    assert_eq!(solved, vec![1]);
    assert!(goals[0].is_solved());
    let (l, r) = goals[0].matching_pair().unwrap();
    assert!(l.target().eq_structural(&r.target()));
  }

  #[test]
  fn goal_solves_across_multiple_growth_generations() {
    // a -> b -> c, a two-hop chain: one normalise_goals call only grows the set by one
    // generation, so reaching rhs = c from lhs = a takes two calls.
    let mut table = SymbolTable::new();
    let a = table.declare(FunctionSymbol::new("a", 0, 1, 0));
    let b = table.declare(FunctionSymbol::new("b", 0, 1, 1));
    let c = table.declare(FunctionSymbol::new("c", 0, 1, 2));
    let r1 = crate::core::rule::orient(&const_term(a), &const_term(b), &table).unwrap();
    let r2 = crate::core::rule::orient(&const_term(b), &const_term(c), &table).unwrap();

    let mut index = RuleIndex::new();
    index_rule(&mut index, 1, &r1);
    index_rule(&mut index, 2, &r2);
    let rules = vec![(1u64, r1), (2u64, r2)];

    let mut goals = vec![Goal::new(1, const_term(a), const_term(c))];

    let solved = normalise_goals(&mut goals, &index, &rules, &table);
    assert!(solved.is_empty(), "one generation only reaches b, not c yet");
    assert!(!goals[0].is_solved());
    assert!(goals[0].lhs_forms().iter().any(|r| r.target().function_id() == Some(b)));

    let solved = normalise_goals(&mut goals, &index, &rules, &table);
    assert_eq!(solved, vec![1]);
    assert!(goals[0].is_solved());
  }

  #[test]
  fn unrelated_sides_never_solve() {
    let mut table = SymbolTable::new();
    let a = table.declare(FunctionSymbol::new("a", 0, 1, 0));
    let b = table.declare(FunctionSymbol::new("b", 0, 1, 1));
    let index = RuleIndex::new();
    let rules: Vec<(ActiveId, Rule)> = Vec::new();

    let mut goals = vec![Goal::new(1, const_term(a), const_term(b))];
    let solved = normalise_goals(&mut goals, &index, &rules, &table);
    assert!(solved.is_empty());
    assert!(!goals[0].is_solved());
  }
}
