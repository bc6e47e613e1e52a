/*!

A `Substitution` binds variable indices to terms. Two representations coexist, per §4.B:
`SubstitutionBuilder` is append-only (used while matching or unifying walks a term, adding
bindings as it goes) and `Substitution` is the frozen, indexed lookup table handed to callers.
In spirit this follows the teacher's `Substitution` (`core/substitution.rs`), which is "a thin
wrapper around a `Vec<...>`... indexed by small integers representing variables" — here the
vector holds `Option<Term>` rather than `Option<DagNodePtr>`, since terms are values, not
garbage-collected nodes.

*/

use crate::{
  api::symbol::VariableIndex,
  core::term_store::{Term, TermBuilder},
};

/// An append-only substitution under construction. `bind` may be called more than once for
/// the same variable; later calls overwrite earlier ones (used by matching to retry after a
/// backtrack).
#[derive(Clone, Default)]
pub struct SubstitutionBuilder {
  bindings: Vec<Option<Term>>,
}

impl SubstitutionBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  #[inline]
  fn ensure_len(&mut self, index: usize) {
    if self.bindings.len() <= index {
      self.bindings.resize(index + 1, None);
    }
  }

  pub fn get(&self, v: VariableIndex) -> Option<&Term> {
    self.bindings.get(v.as_usize()).and_then(|o| o.as_ref())
  }

  pub fn bind(&mut self, v: VariableIndex, term: Term) {
    self.ensure_len(v.as_usize());
    self.bindings[v.as_usize()] = Some(term);
  }

  pub fn finish(self) -> Substitution {
    Substitution { bindings: self.bindings }
  }
}

/// A frozen, indexed substitution: `get` is `O(1)`.
#[derive(Clone, Default)]
pub struct Substitution {
  bindings: Vec<Option<Term>>,
}

impl Substitution {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn singleton(v: VariableIndex, term: Term) -> Self {
    let mut b = SubstitutionBuilder::new();
    b.bind(v, term);
    b.finish()
  }

  #[inline(always)]
  pub fn get(&self, v: VariableIndex) -> Option<&Term> {
    self.bindings.get(v.as_usize()).and_then(|o| o.as_ref())
  }

  pub fn bind(&mut self, v: VariableIndex, term: Term) {
    if self.bindings.len() <= v.as_usize() {
      self.bindings.resize(v.as_usize() + 1, None);
    }
    self.bindings[v.as_usize()] = Some(term);
  }

  pub fn domain(&self) -> impl Iterator<Item = VariableIndex> + '_ {
    self.bindings
        .iter()
        .enumerate()
        .filter_map(|(i, o)| o.is_some().then(|| VariableIndex::from_usize(i)))
  }

  pub fn is_empty(&self) -> bool {
    self.bindings.iter().all(Option::is_none)
  }

  pub fn into_builder(self) -> SubstitutionBuilder {
    SubstitutionBuilder { bindings: self.bindings }
  }
}

/// Applies `subst` to `term`, replacing each variable occurrence once. Variables outside
/// `subst`'s domain are left as-is.
pub fn apply_single(subst: &Substitution, term: &Term) -> Term {
  let mut builder = TermBuilder::new();
  emit_substituted(subst, term, &mut builder);
  builder.finish()
}

fn emit_substituted(subst: &Substitution, term: &Term, builder: &mut TermBuilder) {
  if let Some(v) = term.variable_index() {
    match subst.get(v) {
      Some(image) => {
        builder.emit_term_slice(image);
      }
      None => {
        builder.emit_var(v);
      }
    }
    return;
  }
  let id = term.function_id().unwrap();
  builder.emit_fun(id, |b| {
    for child in term.args() {
      emit_substituted(subst, &child, b);
    }
  });
}

/// Applies `subst` to `term`, then keeps reapplying at variable sites introduced by the
/// previous application until no variable from `subst`'s domain remains reachable. Used to
/// close a triangular unifier (§4.B).
pub fn apply_iterated(subst: &Substitution, term: &Term) -> Term {
  let mut current = term.clone();
  loop {
    let next = apply_single(subst, &current);
    if term_mentions_domain(subst, &next) && !next.eq_structural(&current) {
      current = next;
      continue;
    }
    return next;
  }
}

fn term_mentions_domain(subst: &Substitution, term: &Term) -> bool {
  term.free_variables().iter().any(|v| subst.get(VariableIndex::from_usize(v)).is_some())
}

/// Composes two substitutions: `tau` is applied to every image of `sigma`, then extended with
/// `tau`'s bindings whose variable is not already in `sigma`'s domain. Idempotent when `sigma`
/// and `tau` are each idempotent over disjoint domains (§4.B).
pub fn compose(sigma: &Substitution, tau: &Substitution) -> Substitution {
  let mut result = SubstitutionBuilder::new();
  for v in sigma.domain() {
    let image = sigma.get(v).unwrap();
    result.bind(v, apply_single(tau, image));
  }
  for v in tau.domain() {
    if sigma.get(v).is_none() {
      result.bind(v, tau.get(v).unwrap().clone());
    }
  }
  result.finish()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    api::symbol::{FunctionId, FunctionSymbol, SymbolTable},
    core::term_store::{const_term, var_term, TermBuilder},
  };

  fn setup() -> (SymbolTable, FunctionId, FunctionId) {
    let mut table = SymbolTable::new();
    let f = table.declare(FunctionSymbol::new("f", 2, 1, 1));
    let zero = table.declare(FunctionSymbol::new("zero", 0, 0, 0));
    (table, f, zero)
  }

  #[test]
  fn apply_single_substitutes_each_variable_once() {
    let (_table, f, zero) = setup();
    let x = VariableIndex(0);
    // f(x, x)
    let mut b = TermBuilder::new();
    b.emit_fun(f, |b| {
      b.emit_var(x);
      b.emit_var(x);
    });
    let term = b.finish();

    let subst = Substitution::singleton(x, const_term(zero));
    let result = apply_single(&subst, &term);
    assert_eq!(result.size(), 3); // f(zero, zero)
    assert!(result.args().all(|a| a.function_id() == Some(zero)));
  }

  #[test]
  fn compose_applies_tau_to_sigma_images_then_extends() {
    let (_table, f, zero) = setup();
    let x = VariableIndex(0);
    let y = VariableIndex(1);

    // sigma: x -> y
    let sigma = Substitution::singleton(x, var_term(y));
    // tau: y -> zero
    let tau = Substitution::singleton(y, const_term(zero));

    let composed = compose(&sigma, &tau);
    // x should map to zero (sigma's image y, rewritten by tau)
    assert_eq!(composed.get(x).unwrap().function_id(), Some(zero));
    // y should still map to zero (from tau, since sigma didn't bind y)
    assert_eq!(composed.get(y).unwrap().function_id(), Some(zero));
  }
}
