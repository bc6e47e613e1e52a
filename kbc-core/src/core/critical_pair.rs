/*!

Critical pairs: the divergences found by overlapping one active rule's left side against
another's, §4.G. `overlap_at` reconstructs the single critical pair a `(rule, rule, position)`
triple denotes (the passive queue's compact record, §3); `overlaps` fans that out over every
position of `r1`'s left side and gates the result on a depth budget. `score` ranks one for the
passive queue (`core::passive_queue`). `join_critical_pair` asks whether the two sides already
rewrite to the same normal form (`JoinConfig::use_simple`), falling back to a case split into
sub-critical-pairs under representative ground-extension models when the pair shares at least two
variables (`use_subconnectedness`, `split`), and finally to a witnessing model for the pairs that
stay divergent (`use_ground_joinability`).

*/

use crate::{
  api::{config::{JoinConfig, ScoreWeights}, symbol::{SymbolTable, VariableIndex}},
  core::{
    active::{ActiveId, ActiveRule},
    kbo::Model,
    rewriting::{normal_forms_in, simplify},
    rule::Rule,
    substitution::apply_single,
    term_index::RuleIndex,
    term_store::{Term, TermBuilder},
    unification::unify,
  },
};

#[derive(Clone, Debug)]
pub struct CriticalPair {
  pub lhs:    Term,
  pub rhs:    Term,
  pub source: (ActiveId, ActiveId),
  /// `0` for a pair seeded directly from a user-declared axiom (or re-derived from a retired
  /// rule during interreduction, which keeps the retired rule's own depth); otherwise
  /// `1 + max(r1.depth, r2.depth)` of the two rules whose overlap produced it (§4.G). Checked
  /// against `config.max_cp_depth` before the pair is even enqueued.
  pub depth: u32,
}

fn max_variable_index(term: &Term) -> Option<u32> {
  term.free_variables().iter().map(|v| v as u32).max()
}

/// Rebuilds `term` with every variable index shifted up by `offset`, so a second rule's
/// variables never collide with a first rule's when the two are unified against one another.
fn rename_apart(term: &Term, offset: u32) -> Term {
  let mut builder = TermBuilder::new();
  emit_renamed(term, offset, &mut builder);
  builder.finish()
}

fn emit_renamed(term: &Term, offset: u32, builder: &mut TermBuilder) {
  if let Some(v) = term.variable_index() {
    builder.emit_var(VariableIndex(v.0 + offset));
    return;
  }
  let id = term.function_id().unwrap();
  builder.emit_fun(id, |b| {
    for child in term.args() {
      emit_renamed(&child, offset, b);
    }
  });
}

/// Rebuilds `term` with the subterm at `path` replaced by `replacement`.
fn replace_at_path(term: &Term, path: &[usize], replacement: &Term) -> Term {
  let Some((&first, rest)) = path.split_first() else {
    return replacement.clone();
  };
  let id = term.function_id().expect("replace_at_path: non-empty path into a variable");
  let mut builder = TermBuilder::new();
  builder.emit_fun(id, |b| {
    for (i, child) in term.args().enumerate() {
      if i == first {
        b.emit_term_slice(&replace_at_path(&child, rest, replacement));
      } else {
        b.emit_term_slice(&child);
      }
    }
  });
  builder.finish()
}

/// Reconstructs the single critical pair at `r1`'s left-hand-side position `position` overlapped
/// against `r2`, or `None` if that position doesn't unify with (a variable-disjoint copy of)
/// `r2`'s left side, is itself a variable, or the two readings already agree. This is the
/// re-derivation half of the passive queue's compact `(rule_id1, rule_id2, position)` record
/// (§3): `overlaps` below calls it to generate a batch, and `core::passive_queue::dequeue` calls
/// it again later to recover the same pair lazily, from whatever the two rules look like *then*.
pub fn overlap_at(r1: &ActiveRule, r2: &ActiveRule, position: usize, table: &SymbolTable) -> Option<CriticalPair> {
  let l1 = &r1.rule.lhs;
  if position >= l1.size() {
    return None;
  }
  let sub = l1.subterm_at(position);
  if sub.is_variable() {
    // Overlapping at a variable position would only ever produce a substitution instance of an
    // existing rule, never a new divergence, so it's skipped per the usual restriction.
    return None;
  }

  let offset = max_variable_index(&r1.rule.lhs)
    .into_iter()
    .chain(max_variable_index(&r1.rule.rhs))
    .max()
    .map(|m| m + 1)
    .unwrap_or(0);
  let l2 = rename_apart(&r2.rule.lhs, offset);
  let rhs2 = rename_apart(&r2.rule.rhs, offset);

  let sigma = unify(&sub, &l2)?;
  let path = l1.position_to_path(position);
  let overlapped = apply_single(&sigma, l1);
  let via_r1 = apply_single(&sigma, &r1.rule.rhs);
  let via_r2 = replace_at_path(&overlapped, &path, &apply_single(&sigma, &rhs2));

  if via_r1.eq_structural(&via_r2) {
    return None; // trivially joined already, not a useful critical pair
  }
  let _ = table; // taken for symmetry with the rest of the API / future precedence-based pruning
  let depth = 1 + r1.depth.max(r2.depth);
  Some(CriticalPair { lhs: via_r1, rhs: via_r2, source: (r1.id, r2.id), depth })
}

/// Every critical pair between `r1` and `r2`, paired with the left-hand-side position that
/// produced it (so the caller can record the compact `(rule_id1, rule_id2, position)` passive
/// entry instead of the materialised pair). Pairs whose depth would exceed `max_depth` are
/// dropped before any unification is even attempted (§4.G/§4.H).
pub fn overlaps(
  r1: &ActiveRule,
  r2: &ActiveRule,
  table: &SymbolTable,
  max_depth: u32,
) -> Vec<(usize, CriticalPair)> {
  if 1 + r1.depth.max(r2.depth) > max_depth {
    return Vec::new();
  }
  let size = r1.rule.lhs.size();
  (0..size).filter_map(|position| overlap_at(r1, r2, position, table).map(|cp| (position, cp))).collect()
}

fn term_depth(term: &Term) -> u32 {
  if term.is_variable() {
    return 0;
  }
  1 + term.args().map(|c| term_depth(&c)).max().unwrap_or(0)
}

/// Ranks a critical pair for the passive queue: lower scores dequeue first (§4.G/§4.H).
/// Combines term size, tree depth, and age under caller-configurable weights, so a deployment
/// can favour breadth (shallow, old pairs first) or depth (small pairs first) as it prefers.
pub fn score(cp: &CriticalPair, age: u64, weights: &ScoreWeights, table: &SymbolTable) -> i64 {
  let size = crate::core::kbo::weight(&cp.lhs, table) + crate::core::kbo::weight(&cp.rhs, table);
  let depth = term_depth(&cp.lhs).max(term_depth(&cp.rhs));
  weights.size_weight * size as i64 + weights.depth_weight * depth as i64 + weights.age_weight * age as i64
}

/// The free variables shared between `cp`'s two sides, sorted and deduplicated: the axis a
/// ground-extension model needs to fix a total order over (§4.H).
fn relevant_vars(cp: &CriticalPair) -> Vec<VariableIndex> {
  let mut vars: Vec<VariableIndex> = cp
    .lhs
    .free_variables()
    .iter()
    .chain(cp.rhs.free_variables().iter())
    .map(VariableIndex::from_usize)
    .collect();
  vars.sort_by_key(|v| v.0);
  vars.dedup();
  vars
}

/// A handful of representative ground-extension models to retry a critical pair's joinability
/// under. Exhaustive case-splitting over every total order on the pair's variables is
/// exponential; this instead tries the two extremal orderings (ascending and descending
/// precedence rank), which catches the common case where joinability only depends on *some*
/// variable being heavier than another (§4.H). Empty when fewer than two variables are shared,
/// since a single variable (or none) admits no relative ordering to split on.
fn representative_models(cp: &CriticalPair) -> Vec<Model> {
  let vars = relevant_vars(cp);
  if vars.len() < 2 {
    return Vec::new();
  }
  let ascending = Model::from_order(vars.iter().enumerate().map(|(i, &v)| (v, i as i64)));
  let descending = Model::from_order(vars.iter().enumerate().map(|(i, &v)| (v, -(i as i64))));
  vec![ascending, descending]
}

/// Case-splits `cp` under `representative_models`' ground extensions: each model re-normalises
/// both sides (`normal_forms_in`, which lets `Unoriented`/`Permutative` rules the universal order
/// couldn't settle fire), and a branch whose sides still disagree under its model is returned as
/// a sub-critical-pair for the caller to keep working on. A branch that already agrees is simply
/// dropped — it's joined, and needs no further consideration (§4.H, the subconnectedness
/// criterion).
pub fn split(cp: &CriticalPair, index: &RuleIndex, rules: &[(ActiveId, Rule)], table: &SymbolTable) -> Vec<CriticalPair> {
  representative_models(cp)
    .into_iter()
    .filter_map(|model| {
      let l = normal_forms_in(&cp.lhs, index, rules, table, &model).normal_form();
      let r = normal_forms_in(&cp.rhs, index, rules, table, &model).normal_form();
      (!l.eq_structural(&r)).then(|| CriticalPair { lhs: l, rhs: r, source: cp.source, depth: cp.depth })
    })
    .collect()
}

/// A ground-extension model under which `cp`'s two (already-simplified) sides are still
/// observably distinct, for a caller that wants to explain *why* a pair wasn't joined rather than
/// just that it wasn't. Falls back to the unrefined model if no representative model exposes a
/// difference (e.g. fewer than two shared variables).
fn ground_joinability_witness(cp: &CriticalPair, index: &RuleIndex, rules: &[(ActiveId, Rule)], table: &SymbolTable) -> Model {
  for model in representative_models(cp) {
    let l = normal_forms_in(&cp.lhs, index, rules, table, &model).normal_form();
    let r = normal_forms_in(&cp.rhs, index, rules, table, &model).normal_form();
    if !l.eq_structural(&r) {
      return model;
    }
  }
  Model::new()
}

/// The result of attempting to join a critical pair (§4.H).
#[derive(Clone, Debug)]
pub enum JoinOutcome {
  /// The pair is resolved: either fully joined (`sub_pairs` empty), or retired in favour of one
  /// or more sub-critical-pairs produced by `split` that the caller should recurse on in its
  /// place (each one strictly simpler: fixed to a single ground-extension model).
  Joined { normal_form: Term, sub_pairs: Vec<CriticalPair> },
  /// Still divergent after every enabled strategy was tried; `pair` is the simplified pair to
  /// actually enqueue/orient, and `witness` is a ground extension under which the divergence was
  /// last observed.
  NotJoined { pair: CriticalPair, witness: Model },
}

/// Attempts to join `cp`'s two sides, trying each strategy `join` enables in turn (§6 `join.*`):
/// a direct rewrite-to-normal-form comparison (`use_simple`), then — if the pair shares at least
/// two variables — a case split into sub-critical-pairs under representative models
/// (`use_subconnectedness`), and finally, if still unresolved, a witnessing model for the
/// divergence (`use_ground_joinability`).
pub fn join_critical_pair(
  cp: &CriticalPair,
  index: &RuleIndex,
  rules: &[(ActiveId, Rule)],
  table: &SymbolTable,
  join: &JoinConfig,
) -> JoinOutcome {
  let lhs_nf = simplify(&cp.lhs, index, rules, table);
  let rhs_nf = simplify(&cp.rhs, index, rules, table);
  let simplified = CriticalPair { lhs: lhs_nf, rhs: rhs_nf, source: cp.source, depth: cp.depth };

  if join.use_simple && simplified.lhs.eq_structural(&simplified.rhs) {
    return JoinOutcome::Joined { normal_form: simplified.lhs.clone(), sub_pairs: Vec::new() };
  }

  if join.use_subconnectedness && relevant_vars(&simplified).len() >= 2 {
    let sub_pairs = split(&simplified, index, rules, table);
    // `split` only drops a branch once its two sides actually agree; a branch where neither side
    // rewrote at all under its ground-extension model (no active rule yet applies to either side)
    // comes back unchanged from the input pair. Recursing into such a sub-pair would hand `consider`
    // back the exact pair it started with and loop forever, so this only counts as progress, and
    // only reports `Joined`, when every surviving branch is actually a *different* (narrower) pair
    // than `simplified` — otherwise this strategy made no headway and the call falls through to the
    // remaining ones below, exactly as if `use_subconnectedness` had not fired.
    let made_progress = sub_pairs
      .iter()
      .all(|sp| !(sp.lhs.eq_structural(&simplified.lhs) && sp.rhs.eq_structural(&simplified.rhs)));
    if made_progress {
      return JoinOutcome::Joined { normal_form: simplified.lhs.clone(), sub_pairs };
    }
  }

  let witness = if join.use_ground_joinability {
    ground_joinability_witness(&simplified, index, rules, table)
  } else {
    Model::new()
  };
  JoinOutcome::NotJoined { pair: simplified, witness }
}
