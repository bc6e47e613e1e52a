/*!

Robinson-style unification with an occurs check, per §4.B. `unify` returns bindings in
triangular form (a variable's image may itself mention another bound variable) and then closes
them by iterated self-application until idempotent.

*/

use std::collections::HashMap;

use crate::{
  api::symbol::VariableIndex,
  core::{
    substitution::{apply_iterated, Substitution, SubstitutionBuilder},
    term_store::Term,
  },
};

/// Unifies `s` and `t`, returning a closed (idempotent), not necessarily triangular,
/// substitution, or `None` if no unifier exists.
pub fn unify(s: &Term, t: &Term) -> Option<Substitution> {
  let mut triangular = HashMap::new();
  if !unify_into(s, t, &mut triangular) {
    return None;
  }
  Some(close(triangular))
}

fn chase<'a>(triangular: &'a HashMap<VariableIndex, Term>, v: VariableIndex) -> Option<&'a Term> {
  triangular.get(&v)
}

fn unify_into(s: &Term, t: &Term, triangular: &mut HashMap<VariableIndex, Term>) -> bool {
  let s_resolved = resolve(s, triangular);
  let t_resolved = resolve(t, triangular);

  if s_resolved.eq_structural(&t_resolved) {
    return true;
  }

  if let Some(v) = s_resolved.variable_index() {
    return bind(v, &t_resolved, triangular);
  }
  if let Some(v) = t_resolved.variable_index() {
    return bind(v, &s_resolved, triangular);
  }

  if s_resolved.function_id() != t_resolved.function_id() {
    return false;
  }

  let mut sargs = s_resolved.args();
  let mut targs = t_resolved.args();
  loop {
    match (sargs.next(), targs.next()) {
      (Some(a), Some(b)) => {
        if !unify_into(&a, &b, triangular) {
          return false;
        }
      }
      (None, None) => return true,
      _ => return false,
    }
  }
}

/// Replaces `term`'s root with its current triangular binding, if it's a bound variable.
/// Shallow: only the root is resolved, since `unify_into` recurses structurally anyway.
fn resolve(term: &Term, triangular: &HashMap<VariableIndex, Term>) -> Term {
  if let Some(v) = term.variable_index() {
    if let Some(bound) = chase(triangular, v) {
      return resolve(bound, triangular);
    }
  }
  term.clone()
}

fn bind(v: VariableIndex, term: &Term, triangular: &mut HashMap<VariableIndex, Term>) -> bool {
  if occurs(v, term, triangular) {
    return false;
  }
  triangular.insert(v, term.clone());
  true
}

fn occurs(v: VariableIndex, term: &Term, triangular: &HashMap<VariableIndex, Term>) -> bool {
  if let Some(u) = term.variable_index() {
    if u == v {
      return true;
    }
    if let Some(bound) = chase(triangular, u) {
      return occurs(v, bound, triangular);
    }
    return false;
  }
  term.args().any(|child| occurs(v, &child, triangular))
}

/// Closes a triangular substitution by repeatedly applying it to its own images until no
/// further simplification occurs, yielding an idempotent result.
fn close(triangular: HashMap<VariableIndex, Term>) -> Substitution {
  let mut builder = SubstitutionBuilder::new();
  for (&v, term) in &triangular {
    builder.bind(v, term.clone());
  }
  let raw = builder.finish();

  let mut closed = SubstitutionBuilder::new();
  for v in raw.domain() {
    let image = raw.get(v).unwrap();
    closed.bind(v, apply_iterated(&raw, image));
  }
  closed.finish()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    api::symbol::{FunctionId, FunctionSymbol, SymbolTable},
    core::{
      substitution::apply_single,
      term_store::{const_term, var_term, TermBuilder},
    },
  };

  fn setup() -> (FunctionId, FunctionId) {
    let mut table = SymbolTable::new();
    let f = table.declare(FunctionSymbol::new("f", 2, 1, 1));
    let a = table.declare(FunctionSymbol::new("a", 0, 1, 0));
    (f, a)
  }

  #[test]
  fn unifies_and_satisfies_sigma_s_equals_sigma_t() {
    let (f, a) = setup();
    let x = VariableIndex(0);
    let y = VariableIndex(1);

    // s = f(x, a), t = f(a, y)
    let mut sb = TermBuilder::new();
    sb.emit_fun(f, |b| {
      b.emit_var(x);
      b.emit_const(a);
    });
    let s = sb.finish();

    let mut tb = TermBuilder::new();
    tb.emit_fun(f, |b| {
      b.emit_const(a);
      b.emit_var(y);
    });
    let t = tb.finish();

    let sigma = unify(&s, &t).expect("should unify");
    let si = apply_single(&sigma, &s);
    let ti = apply_single(&sigma, &t);
    assert!(si.eq_structural(&ti), "sigma(s) should equal sigma(t)");
  }

  #[test]
  fn occurs_check_rejects_cyclic_binding() {
    let (f, _a) = setup();
    let x = VariableIndex(0);

    let s = var_term(x);
    let mut tb = TermBuilder::new();
    tb.emit_fun(f, |b| {
      b.emit_var(x);
      b.emit_var(x);
    });
    let t = tb.finish();

    assert!(unify(&s, &t).is_none());
  }

  #[test]
  fn unification_result_is_idempotent() {
    let (f, a) = setup();
    let x = VariableIndex(0);
    let y = VariableIndex(1);

    let mut sb = TermBuilder::new();
    sb.emit_fun(f, |b| {
      b.emit_var(x);
      b.emit_var(y);
    });
    let s = sb.finish();

    let mut tb = TermBuilder::new();
    tb.emit_fun(f, |b| {
      b.emit_var(y);
      b.emit_const(a);
    });
    let t = tb.finish();

    let sigma = unify(&s, &t).unwrap();
    // Applying sigma twice should be the same as applying it once.
    let once = apply_single(&sigma, &s);
    let sigma_as_term_applied_again = apply_single(&sigma, &once);
    assert!(once.eq_structural(&sigma_as_term_applied_again));
  }
}
