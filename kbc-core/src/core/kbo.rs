/*!

The Knuth-Bendix ordering (KBO), §4.C. Two flavours share the same weight/precedence machinery:

- The *universal* order (`kbo_gt`/`less_than`/`less_eq`) holds for every ground instance
  simultaneously. It requires the variable-multiset domination condition (`vars(t)` a
  sub-multiset of `vars(s)` whenever `s` is claimed to exceed `t`) and is therefore partial:
  two terms with incomparable variable occurrences (e.g. `f(x, y)` and `f(y, x)`) are neither
  greater nor less under it.
- A [`Model`] resolves that partiality by pinning variables to a definite rank on the same axis
  as symbol precedence, without the domination check (it isn't claiming anything about *other*
  ground instances). `compare_in`/`less_in` are total exactly when every variable they need to
  compare is in the model's domain — which every model this engine builds (over a critical pair's
  complete `relevant_vars`) guarantees — and fall back to [`Comparison::Incomparable`] otherwise,
  the same case the teacher's `PartialOrdering` calls `None`.

*/

use std::collections::HashMap;

use crate::{
  api::symbol::{FunctionId, SymbolTable, VariableIndex},
  core::term_store::Term,
};

/// The weight of `term` under `table`: each variable occurrence contributes
/// [`crate::api::symbol::VARIABLE_WEIGHT`], each function occurrence contributes its declared
/// weight, summed over every node (§4.C).
pub fn weight(term: &Term, table: &SymbolTable) -> u64 {
  if let Some(_v) = term.variable_index() {
    return crate::api::symbol::VARIABLE_WEIGHT as u64;
  }
  let id = term.function_id().unwrap();
  let mut total = table.weight(id) as u64;
  for child in term.args() {
    total += weight(&child, table);
  }
  total
}

/// `true` iff every variable's occurrence count in `t` is no greater than its occurrence count
/// in `s` — the condition that makes "`s` exceeds `t`" stable under every substitution at once.
pub fn variable_condition(s: &Term, t: &Term) -> bool {
  let s_vars = s.variable_multiset();
  let t_vars = t.variable_multiset();
  t_vars.iter().all(|(v, &count_t)| s_vars.get(v).copied().unwrap_or(0) >= count_t)
}

/// The universal KBO: `s` strictly exceeds `t` for every ground instance of both. `false`
/// whenever the two terms are structurally equal or the variable condition fails — including,
/// notably, whenever `s` is itself a bare variable (a variable never dominates anything).
pub fn kbo_gt(s: &Term, t: &Term, table: &SymbolTable) -> bool {
  if s.eq_structural(t) {
    return false;
  }
  if !variable_condition(s, t) {
    return false;
  }

  let ws = weight(s, table);
  let wt = weight(t, table);
  if ws != wt {
    return ws > wt;
  }

  if s.is_variable() {
    // variable_condition already guarantees t contributes no variable s doesn't have at least
    // as many of; a bare variable can only tie-weight with another bare variable, and that case
    // was caught by eq_structural above (s != t means it's some *other* variable, which fails
    // variable_condition outright). So this arm is unreachable in practice but kept total.
    return false;
  }
  if t.is_variable() {
    // Equal weight, s is a compound term with t as one of its variables: t is a proper subterm
    // of s (guaranteed by the variable condition forcing t's single occurrence to come from
    // inside s), so s is strictly the larger term.
    return true;
  }

  let s_head = s.function_id().unwrap();
  let t_head = t.function_id().unwrap();
  if s_head != t_head {
    return table.precedence_cmp(s_head, t_head) == std::cmp::Ordering::Greater;
  }

  // Same head symbol, same weight: lexicographic comparison of arguments, left to right, at
  // the first position where they differ structurally.
  for (sa, ta) in s.args().zip(t.args()) {
    if sa.eq_structural(&ta) {
      continue;
    }
    return kbo_gt(&sa, &ta, table);
  }
  false
}

pub fn less_than(s: &Term, t: &Term, table: &SymbolTable) -> bool {
  kbo_gt(t, s, table)
}

pub fn greater_than(s: &Term, t: &Term, table: &SymbolTable) -> bool {
  kbo_gt(s, t, table)
}

/// `s <= t`, i.e. `s == t` or `s < t`. Unlike defining this as `!kbo_gt(t, s)`, this does not
/// claim `x <= y` *and* `y <= x` for two distinct, unrelated variables `x`, `y` — both directions
/// correctly come back `false` since `kbo_gt` is `false` whenever its first argument is a bare
/// variable.
pub fn less_eq(s: &Term, t: &Term, table: &SymbolTable) -> bool {
  s.eq_structural(t) || less_than(s, t, table)
}

/// The result of comparing two terms under a [`Model`], mirroring the teacher's
/// `PartialOrdering` (`mod2-abs/src/partial_ordering.rs`): a model only pins the variables it was
/// actually built over (§4.C), so comparing against a variable outside its domain is genuinely
/// `Incomparable` rather than silently defaulting to some rank. Every `Model` this engine builds
/// (`representative_models`, over a critical pair's full `relevant_vars`) covers every variable
/// that can occur in a term it's asked to compare, so `Incomparable` is not observed on any path
/// in this codebase today — but a caller that builds a narrower model gets the honest answer.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Comparison {
  Less,
  Equal,
  Greater,
  Incomparable,
}

/// Pins every variable relevant to a comparison to an integer rank on the same axis as symbol
/// precedence, turning the partial universal order into a total one. Used when splitting a
/// critical pair into ground-extension cases (§4.H): each branch of the split carries its own
/// `Model` refining how its variables compare against one another and against the symbols in
/// play.
#[derive(Clone, Debug, Default)]
pub struct Model {
  rank: HashMap<VariableIndex, i64>,
}

impl Model {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builds a model from an explicit list of `(variable, rank)` pairs. Later entries for the
  /// same variable overwrite earlier ones.
  pub fn from_order(pairs: impl IntoIterator<Item = (VariableIndex, i64)>) -> Self {
    let mut rank = HashMap::new();
    for (v, r) in pairs {
      rank.insert(v, r);
    }
    Model { rank }
  }

  /// `None` iff `v` was never assigned a rank by this model — distinct from "rank zero".
  pub fn rank_of(&self, v: VariableIndex) -> Option<i64> {
    self.rank.get(&v).copied()
  }

  /// Returns a new model identical to `self` except that `v` is (re)assigned `rank`. The
  /// original is left untouched, since a saturation branch and its siblings each need their own
  /// refinement of a shared parent model (§4.H).
  pub fn weaken(&self, v: VariableIndex, rank: i64) -> Model {
    let mut rank_map = self.rank.clone();
    rank_map.insert(v, rank);
    Model { rank: rank_map }
  }
}

/// The precedence-axis rank of `term`'s root under `model`: a function symbol's declared
/// precedence, or `None` if `term` is a variable outside `model`'s domain.
fn symbolic_rank(term: &Term, table: &SymbolTable, model: &Model) -> Option<i64> {
  match term.function_id() {
    Some(id) => Some(table.get(id).precedence),
    None => model.rank_of(term.variable_index().unwrap()),
  }
}

/// Compares `s` and `t` under a fixed `model`. Total whenever every variable occurring in `s`
/// and `t` is in `model`'s domain (the only case this engine ever constructs, via
/// `representative_models`); `Comparison::Incomparable` the moment a comparison would need the
/// rank of a variable `model` never assigned (§4.C, `less_in`).
pub fn compare_in(model: &Model, s: &Term, t: &Term, table: &SymbolTable) -> Comparison {
  if s.eq_structural(t) {
    return Comparison::Equal;
  }

  let ws = weight(s, table);
  let wt = weight(t, table);
  if ws != wt {
    return if ws > wt { Comparison::Greater } else { Comparison::Less };
  }

  match (s.function_id(), t.function_id()) {
    (None, None) => {
      let rs = model.rank_of(s.variable_index().unwrap());
      let rt = model.rank_of(t.variable_index().unwrap());
      match (rs, rt) {
        (Some(rs), Some(rt)) => match rs.cmp(&rt) {
          std::cmp::Ordering::Equal => Comparison::Equal,
          std::cmp::Ordering::Greater => Comparison::Greater,
          std::cmp::Ordering::Less => Comparison::Less,
        },
        _ => Comparison::Incomparable,
      }
    }
    _ => {
      let rs = symbolic_rank(s, table, model);
      let rt = symbolic_rank(t, table, model);
      let (rs, rt) = match (rs, rt) {
        (Some(rs), Some(rt)) => (rs, rt),
        _ => return Comparison::Incomparable,
      };
      if rs != rt {
        return if rs > rt { Comparison::Greater } else { Comparison::Less };
      }
      // Same rank and same weight: both must be compound (two distinct variables with equal
      // rank were already handled above, and a variable can't share a function symbol's rank
      // space without model.weaken being told to put it there deliberately — in that case we
      // fall through to lexicographic comparison over an empty argument list for the variable
      // side, comparing it as if it were a zero-arity symbol at that rank).
      for (sa, ta) in s.args().zip(t.args()) {
        match compare_in(model, &sa, &ta, table) {
          Comparison::Equal => continue,
          other => return other,
        }
      }
      Comparison::Equal
    }
  }
}

/// Strict "less than" under `model`, collapsing `Incomparable` into `false` — the two calling
/// sites (`Rule::is_eligible_in`'s `Permutative`/`Unoriented` branches) only need to know whether
/// a substitution makes the rule fire, and "can't tell" and "no" both mean "don't fire".
pub fn less_in(model: &Model, s: &Term, t: &Term, table: &SymbolTable) -> bool {
  compare_in(model, s, t, table) == Comparison::Less
}
