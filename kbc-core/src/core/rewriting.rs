/*!

Rewriting strategies and the reduction traces they produce, §4.F/§4.G. A [`Reduction`] is a
small algebra recording *how* one term was rewritten to another, not just that it was: `Refl` (no
step), `Step` (one rule application at the root), `Trans` (sequencing), `Cong` (lifting a
reduction of a subterm through its parent). Proof certification (`core::proof`) walks this trace
rather than re-deriving it.

Four strategy combinators explore where a rewrite happens:

- [`rewrite_root`]: the primitive — one step, at the root, if any active rule's left side
  matches there and is eligible.
- [`anywhere`]: the first redex found by a pre-order (outermost-first) walk.
- [`nested`]: the first redex found bottom-up (innermost-first): children are normalised before
  their parent is even considered.
- [`parallel`]: every non-overlapping redex found by a single outermost-first scan, rewritten
  simultaneously (a scanned subtree that was itself just rewritten is not re-descended into).

*/

use crate::{
  api::symbol::SymbolTable,
  core::{
    active::ActiveId,
    kbo::Model,
    rule::Rule,
    substitution::apply_single,
    term_index::RuleIndex,
    term_store::{Term, TermBuilder},
  },
};

/// A trace of zero or more rewrite steps from `source()` to `target()`.
#[derive(Clone, Debug)]
pub enum Reduction {
  Refl(Term),
  Step { before: Term, after: Term, rule_id: ActiveId },
  Trans(Box<Reduction>, Box<Reduction>),
  Cong { before: Term, after: Term, at: usize, sub: Box<Reduction> },
}

impl Reduction {
  pub fn source(&self) -> Term {
    match self {
      Reduction::Refl(t) => t.clone(),
      Reduction::Step { before, .. } => before.clone(),
      Reduction::Trans(a, _) => a.source(),
      Reduction::Cong { before, .. } => before.clone(),
    }
  }

  pub fn target(&self) -> Term {
    match self {
      Reduction::Refl(t) => t.clone(),
      Reduction::Step { after, .. } => after.clone(),
      Reduction::Trans(_, b) => b.target(),
      Reduction::Cong { after, .. } => after.clone(),
    }
  }

  pub fn is_refl(&self) -> bool {
    matches!(self, Reduction::Refl(_))
  }
}

/// Sequences `a` then `b`. Collapses away a `Refl` on either side instead of piling up
/// no-op links, so a long normalisation doesn't carry dead weight in its trace.
pub fn trans(a: Reduction, b: Reduction) -> Reduction {
  debug_assert!(a.target().eq_structural(&b.source()), "trans: a's target must equal b's source");
  if a.is_refl() {
    return b;
  }
  if b.is_refl() {
    return a;
  }
  Reduction::Trans(Box::new(a), Box::new(b))
}

/// Lifts `sub`, a reduction of the argument at position `at`, through its parent context
/// (`before`/`after` being the whole terms, not just the rewritten argument).
pub fn cong(before: Term, after: Term, at: usize, sub: Reduction) -> Reduction {
  if sub.is_refl() {
    return Reduction::Refl(before);
  }
  Reduction::Cong { before, after, at, sub: Box::new(sub) }
}

/// Every eligible one-step reduct of `term` at its root: every active rule whose left side
/// matches there and whose eligibility check passes, not just the first (§4.F: a strategy is
/// `Term -> [Reduction]`, not `Term -> Option<Reduction>`). [`rewrite_root`] narrows this to a
/// single greedy pick for the single-path normalisation strategies below; [`successors`] keeps
/// the full list, since exhaustive goal search (§4.I) can't afford to discard a rule that was
/// simultaneously eligible.
pub fn rewrite_root_all(term: &Term, index: &RuleIndex, rules: &[(ActiveId, Rule)], table: &SymbolTable) -> Vec<Reduction> {
  let mut out = Vec::new();
  // `index_oriented` and `index_all` both carry an oriented rule's forward direction
  // (`State::add_active_rule`), so the chained scan below can hand back the same id twice;
  // dedupe so a rule active in both views doesn't produce two identical successors.
  let mut seen = Vec::new();
  for (id, subst) in index.index_oriented.matches(term).into_iter().chain(index.index_all.matches(term)) {
    if seen.contains(&id) {
      continue;
    }
    let Some((_, rule)) = rules.iter().find(|(rid, _)| *rid == id) else { continue };
    if !rule.is_eligible(&subst, table) {
      continue;
    }
    seen.push(id);
    let after = apply_single(&subst, &rule.rhs);
    out.push(Reduction::Step { before: term.clone(), after, rule_id: id });
  }
  out
}

/// One rewrite step at `term`'s root: the first of [`rewrite_root_all`]'s eligible matches.
/// An intentional narrowing for the single-path normalisation strategies (`anywhere`/`nested`/
/// `parallel`, and hence `normal_forms`/`simplify`): they commit to one rewrite per step rather
/// than branching on every simultaneously-eligible rule, which is sound for computing *a* normal
/// form (§4.H's `use_simple`) even though it can in principle miss a join a more exhaustive
/// search would find — that exhaustive case is what `successors`/`Goal` (§4.I) is for.
pub fn rewrite_root(term: &Term, index: &RuleIndex, rules: &[(ActiveId, Rule)], table: &SymbolTable) -> Option<Reduction> {
  rewrite_root_all(term, index, rules, table).into_iter().next()
}

/// As [`rewrite_root`], but eligibility is decided under a fixed ground-extension [`Model`]
/// (`Rule::is_eligible_in`) rather than the universal order, so `Unoriented`/`Permutative` rules
/// the universal check can't settle become available (§4.H, ground joinability / `split`).
pub fn rewrite_root_in(
  term: &Term,
  index: &RuleIndex,
  rules: &[(ActiveId, Rule)],
  table: &SymbolTable,
  model: &Model,
) -> Option<Reduction> {
  for (id, subst) in index.index_oriented.matches(term).into_iter().chain(index.index_all.matches(term)) {
    let Some((_, rule)) = rules.iter().find(|(rid, _)| *rid == id) else { continue };
    if !rule.is_eligible_in(&subst, model, table) {
      continue;
    }
    let after = apply_single(&subst, &rule.rhs);
    return Some(Reduction::Step { before: term.clone(), after, rule_id: id });
  }
  None
}

type Strategy<'a> = &'a dyn Fn(&Term, &RuleIndex, &[(ActiveId, Rule)], &SymbolTable) -> Option<Reduction>;

/// Rebuilds `term` with its argument at position `at` replaced by `new_child`. Exposed to
/// `core::proof` so a [`crate::core::proof::ProofStep::Cong`] node can be checked against the
/// same reconstruction rule that built it in the first place (§4.J).
pub(crate) fn rebuild_with_child(term: &Term, at: usize, new_child: &Term) -> Term {
  let mut builder = TermBuilder::new();
  let id = term.function_id().expect("rebuild_with_child: term must be a compound term");
  builder.emit_fun(id, |b| {
    for (i, child) in term.args().enumerate() {
      if i == at {
        b.emit_term_slice(new_child);
      } else {
        b.emit_term_slice(&child);
      }
    }
  });
  builder.finish()
}

/// The first redex found outermost-first: try `term`'s root, then recurse into its children
/// left to right, stopping at the first success.
pub fn anywhere(
  strategy: Strategy,
  term: &Term,
  index: &RuleIndex,
  rules: &[(ActiveId, Rule)],
  table: &SymbolTable,
) -> Option<Reduction> {
  if let Some(step) = strategy(term, index, rules, table) {
    return Some(step);
  }
  for (i, child) in term.args().enumerate() {
    if let Some(sub) = anywhere(strategy, &child, index, rules, table) {
      let after = rebuild_with_child(term, i, &sub.target());
      return Some(cong(term.clone(), after, i, sub));
    }
  }
  None
}

/// The first redex found innermost-first: every child is explored (and would already be in
/// normal form, by the time this is driven by `normalise_with`) before the root itself is tried.
pub fn nested(
  strategy: Strategy,
  term: &Term,
  index: &RuleIndex,
  rules: &[(ActiveId, Rule)],
  table: &SymbolTable,
) -> Option<Reduction> {
  for (i, child) in term.args().enumerate() {
    if let Some(sub) = nested(strategy, &child, index, rules, table) {
      let after = rebuild_with_child(term, i, &sub.target());
      return Some(cong(term.clone(), after, i, sub));
    }
  }
  strategy(term, index, rules, table)
}

/// Every non-overlapping redex found by a single outermost-first scan, rewritten at once: a
/// subtree rewritten at its root is not re-descended into during this pass.
pub fn parallel(
  strategy: Strategy,
  term: &Term,
  index: &RuleIndex,
  rules: &[(ActiveId, Rule)],
  table: &SymbolTable,
) -> Option<Reduction> {
  if let Some(step) = strategy(term, index, rules, table) {
    return Some(step);
  }
  if term.is_variable() {
    return None;
  }
  let mut current = Reduction::Refl(term.clone());
  let mut any = false;
  for (i, child) in term.args().enumerate() {
    if let Some(sub) = parallel(strategy, &child, index, rules, table) {
      let base = current.target();
      let after = rebuild_with_child(&base, i, &sub.target());
      current = trans(current, cong(base, after, i, sub));
      any = true;
    }
  }
  any.then_some(current)
}

#[derive(Clone, Debug)]
pub enum RewriteOutcome {
  /// A genuine normal form was reached within the round bound.
  Normal(Reduction),
  /// The round bound was hit before the term stopped changing. Not treated as a programming
  /// error: with `Unoriented`/`Permutative` rules in play a naive strategy can genuinely loop on
  /// pathological input, and the caller (critical-pair joining, §4.H) is expected to treat this
  /// as "not (yet) joinable" rather than crash the whole saturation run.
  LoopBound(Reduction),
}

impl RewriteOutcome {
  pub fn reduction(&self) -> &Reduction {
    match self {
      RewriteOutcome::Normal(r) | RewriteOutcome::LoopBound(r) => r,
    }
  }

  pub fn normal_form(&self) -> Term {
    self.reduction().target()
  }

  pub fn is_normal(&self) -> bool {
    matches!(self, RewriteOutcome::Normal(_))
  }
}

pub const MAX_REWRITE_ROUNDS: u32 = 1000;

/// Drives `strategy` to a fixed point, composing each step into a single [`Reduction`]. Stops
/// and reports [`RewriteOutcome::LoopBound`] after [`MAX_REWRITE_ROUNDS`] rounds rather than
/// looping forever or panicking.
pub fn normalise_with(
  strategy: Strategy,
  term: &Term,
  index: &RuleIndex,
  rules: &[(ActiveId, Rule)],
  table: &SymbolTable,
) -> RewriteOutcome {
  let mut trace = Reduction::Refl(term.clone());
  let mut rounds = 0u32;
  loop {
    let current = trace.target();
    match strategy(&current, index, rules, table) {
      Some(step) => {
        trace = trans(trace, step);
        rounds += 1;
        if rounds >= MAX_REWRITE_ROUNDS {
          return RewriteOutcome::LoopBound(trace);
        }
      }
      None => return RewriteOutcome::Normal(trace),
    }
  }
}

/// Normalises `term` using the parallel strategy (§4.F), the usual choice for computing the
/// normal form a critical pair's two sides are compared against (§4.H): every non-overlapping
/// redex scanned in one outermost-first pass is rewritten at once, rather than committing to a
/// single innermost or outermost redex per round.
pub fn normal_forms(
  term: &Term,
  index: &RuleIndex,
  rules: &[(ActiveId, Rule)],
  table: &SymbolTable,
) -> RewriteOutcome {
  normalise_with(&|t, idx, rs, tab| parallel(&rewrite_root, t, idx, rs, tab), term, index, rules, table)
}

/// As [`normal_forms`], but eligibility is decided under a fixed ground-extension `model`
/// (`rewrite_root_in`) instead of the universal order (§4.H).
pub fn normal_forms_in(
  term: &Term,
  index: &RuleIndex,
  rules: &[(ActiveId, Rule)],
  table: &SymbolTable,
  model: &Model,
) -> RewriteOutcome {
  normalise_with(
    &|t, idx, rs, tab| parallel(&|t2, idx2, rs2, tab2| rewrite_root_in(t2, idx2, rs2, tab2, model), t, idx, rs, tab),
    term,
    index,
    rules,
    table,
  )
}

/// `term`'s immediate one-step reducts at every position and for every simultaneously-eligible
/// rule at that position (not just the first found at the first position tried), used by goal
/// search (§4.I, `Goal`/`normalise_goals`) to grow each side's candidate set one generation at a
/// time without discarding a branch a single greedy strategy would have picked instead.
pub fn successors(
  term: &Term,
  index: &RuleIndex,
  rules: &[(ActiveId, Rule)],
  table: &SymbolTable,
) -> Vec<Reduction> {
  let mut out = rewrite_root_all(term, index, rules, table);
  if !term.is_variable() {
    for (i, child) in term.args().enumerate() {
      for sub in successors(&child, index, rules, table) {
        let after = rebuild_with_child(term, i, &sub.target());
        out.push(cong(term.clone(), after, i, sub));
      }
    }
  }
  out
}

/// Normalises `term` and discards the trace, keeping only the resulting term. A thin convenience
/// wrapper for callers (e.g. the passive queue) that only need the result.
pub fn simplify(term: &Term, index: &RuleIndex, rules: &[(ActiveId, Rule)], table: &SymbolTable) -> Term {
  normal_forms(term, index, rules, table).normal_form()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    api::symbol::{FunctionSymbol, SymbolTable, VariableIndex},
    core::{
      rule::orient,
      term_store::{const_term, TermBuilder},
    },
  };

  fn index_rule(index: &mut RuleIndex, id: ActiveId, rule: &Rule) {
    index.index_oriented.insert(id, rule.lhs.clone());
    index.index_all.insert(id, rule.lhs.clone());
  }

  #[test]
  fn normalises_a_two_rule_chain() {
    let mut table = SymbolTable::new();
    let a = table.declare(FunctionSymbol::new("a", 0, 3, 0));
    let b = table.declare(FunctionSymbol::new("b", 0, 2, 1));
    let c = table.declare(FunctionSymbol::new("c", 0, 1, 2));

    // a -> b -> c, each a weight-decreasing Oriented rule.
    let r1 = orient(&const_term(a), &const_term(b), &table).unwrap();
    let r2 = orient(&const_term(b), &const_term(c), &table).unwrap();

    let mut index = RuleIndex::new();
    index_rule(&mut index, 1, &r1);
    index_rule(&mut index, 2, &r2);
    let rules = vec![(1, r1), (2, r2)];

    let outcome = normal_forms(&const_term(a), &index, &rules, &table);
    assert!(outcome.is_normal());
    assert_eq!(outcome.normal_form().function_id(), Some(c));
  }

  #[test]
  fn congruence_rewrites_inside_a_compound_term() {
    let mut table = SymbolTable::new();
    let f = table.declare(FunctionSymbol::new("f", 1, 1, 5));
    let a = table.declare(FunctionSymbol::new("a", 0, 3, 0));
    let b = table.declare(FunctionSymbol::new("b", 0, 1, 1));

    let r1 = orient(&const_term(a), &const_term(b), &table).unwrap();
    let mut index = RuleIndex::new();
    index_rule(&mut index, 1, &r1);
    let rules = vec![(1, r1)];

    let mut builder = TermBuilder::new();
    builder.emit_fun(f, |bd| {
      bd.emit_const(a);
    });
    let fa = builder.finish();

    let outcome = normal_forms(&fa, &index, &rules, &table);
    assert!(outcome.is_normal());
    let nf = outcome.normal_form();
    assert_eq!(nf.function_id(), Some(f));
    assert_eq!(nf.args().next().unwrap().function_id(), Some(b));
  }

  #[test]
  fn unoriented_cycle_is_reported_as_loop_bound() {
    let mut table = SymbolTable::new();
    let a = table.declare(FunctionSymbol::new("a", 0, 1, 0));
    let b = table.declare(FunctionSymbol::new("b", 0, 1, 1));
    // Equal weight, incomparable precedence-wise in neither direction dominates by weight:
    // force an artificial Unoriented rule both ways to make the naive strategy loop.
    let _x = VariableIndex(0);
    let forward = crate::core::rule::Rule::new(
      const_term(a),
      const_term(b),
      crate::core::rule::Orientation::Unoriented,
    );
    let backward = forward.backwards().unwrap();

    let mut index = RuleIndex::new();
    index_rule(&mut index, 1, &forward);
    index_rule(&mut index, 2, &backward);
    let rules = vec![(1, forward), (2, backward)];

    // Ground terms with no variables: Unoriented::is_eligible falls back to a direct kbo_gt
    // check on the instantiated sides, which for two equal-weight ground constants is false in
    // both directions, so nothing actually fires — confirming the naive strategy terminates
    // immediately rather than looping, which is the correct, desired behaviour here. The
    // loop-bound path is instead exercised structurally via a direct `normalise_with` call on a
    // synthetic always-firing strategy below.
    let outcome = normal_forms(&const_term(a), &index, &rules, &table);
    assert!(outcome.is_normal());

    let flips = |t: &Term, _idx: &RuleIndex, _rs: &[(ActiveId, crate::core::rule::Rule)], _tab: &SymbolTable| -> Option<Reduction> {
      let other = if t.function_id() == Some(a) { const_term(b) } else { const_term(a) };
      Some(Reduction::Step { before: t.clone(), after: other, rule_id: 0 })
    };
    let outcome = normalise_with(&flips, &const_term(a), &index, &rules, &table);
    assert!(!outcome.is_normal());
  }

  #[test]
  fn successors_collects_every_simultaneously_eligible_root_rule() {
    // a -> b and a -> c, both active at once: rewrite_root commits to whichever the index
    // happens to return first, but successors must surface both reducts.
    let mut table = SymbolTable::new();
    let a = table.declare(FunctionSymbol::new("a", 0, 3, 0));
    let b = table.declare(FunctionSymbol::new("b", 0, 1, 1));
    let c = table.declare(FunctionSymbol::new("c", 0, 1, 2));

    let r1 = orient(&const_term(a), &const_term(b), &table).unwrap();
    let r2 = orient(&const_term(a), &const_term(c), &table).unwrap();

    let mut index = RuleIndex::new();
    index_rule(&mut index, 1, &r1);
    index_rule(&mut index, 2, &r2);
    let rules = vec![(1, r1), (2, r2)];

    let reducts = successors(&const_term(a), &index, &rules, &table);
    let targets: Vec<_> = reducts.iter().map(|r| r.target().function_id()).collect();
    assert!(targets.contains(&Some(b)));
    assert!(targets.contains(&Some(c)));
    assert_eq!(targets.len(), 2);

    // rewrite_root only ever commits to one of the two.
    let single = rewrite_root(&const_term(a), &index, &rules, &table).unwrap();
    assert!(single.target().function_id() == Some(b) || single.target().function_id() == Some(c));
  }
}
