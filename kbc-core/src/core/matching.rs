/*!

Matching, per §4.B: given a pattern `p` and a term `t`, produces the unique substitution σ with
σ(p) = t, or fails. Fails total-ly (never panics) on a function-symbol mismatch or a variable
bound inconsistently across two occurrences.

*/

use crate::core::{
  substitution::{Substitution, SubstitutionBuilder},
  term_store::Term,
};

pub fn match_term(pattern: &Term, target: &Term) -> Option<Substitution> {
  let mut builder = SubstitutionBuilder::new();
  if match_into(pattern, target, &mut builder) {
    Some(builder.finish())
  } else {
    None
  }
}

fn match_into(pattern: &Term, target: &Term, builder: &mut SubstitutionBuilder) -> bool {
  if let Some(v) = pattern.variable_index() {
    return match builder.get(v) {
      Some(existing) => existing.eq_structural(target),
      None => {
        builder.bind(v, target.clone());
        true
      }
    };
  }

  if target.is_variable() {
    // A variable in the target can never match a non-variable pattern position: σ(p) = t
    // requires p's function structure to literally appear in t.
    return false;
  }

  if pattern.function_id() != target.function_id() {
    return false;
  }

  let mut pargs = pattern.args();
  let mut targs = target.args();
  loop {
    match (pargs.next(), targs.next()) {
      (Some(p), Some(t)) => {
        if !match_into(&p, &t, builder) {
          return false;
        }
      }
      (None, None) => return true,
      // Arities differ: can't happen for well-formed terms built over a consistent symbol
      // table, but fail rather than panic, per §4.B's totality requirement.
      _ => return false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    api::symbol::{FunctionId, FunctionSymbol, SymbolTable, VariableIndex},
    core::term_store::{const_term, var_term, TermBuilder},
  };

  fn setup() -> (FunctionId, FunctionId) {
    let mut table = SymbolTable::new();
    let f = table.declare(FunctionSymbol::new("f", 2, 1, 1));
    let a = table.declare(FunctionSymbol::new("a", 0, 1, 0));
    (f, a)
  }

  #[test]
  fn matches_and_is_idempotent_on_its_own_image() {
    let (f, a) = setup();
    let x = VariableIndex(0);
    let mut b = TermBuilder::new();
    b.emit_fun(f, |b| {
      b.emit_var(x);
      b.emit_const(a);
    });
    let pattern = b.finish();

    let mut b2 = TermBuilder::new();
    b2.emit_fun(f, |b| {
      b.emit_const(a);
      b.emit_const(a);
    });
    let target = b2.finish();

    let sigma = match_term(&pattern, &target).expect("should match");
    assert_eq!(sigma.get(x).unwrap().function_id(), Some(a));

    // match(p, sigma(p)) = sigma (restricted to vars(p)), §8.8
    let image = crate::core::substitution::apply_single(&sigma, &pattern);
    let sigma2 = match_term(&pattern, &image).expect("should match its own image");
    assert_eq!(sigma2.get(x).unwrap(), sigma.get(x).unwrap());
  }

  #[test]
  fn fails_on_function_mismatch() {
    let (f, a) = setup();
    let pattern = const_term(a);
    let mut b = TermBuilder::new();
    b.emit_fun(f, |b| {
      b.emit_const(a);
      b.emit_const(a);
    });
    let target = b.finish();
    assert!(match_term(&pattern, &target).is_none());
  }

  #[test]
  fn fails_on_inconsistent_variable_binding() {
    let (f, a) = setup();
    let x = VariableIndex(0);
    let mut b = TermBuilder::new();
    b.emit_fun(f, |b| {
      b.emit_var(x);
      b.emit_var(x);
    });
    let pattern = b.finish();

    let mut b2 = TermBuilder::new();
    b2.emit_fun(f, |b| {
      b.emit_const(a);
      b.emit_fun(f, |b| {
        b.emit_const(a);
        b.emit_const(a);
      });
    });
    let target = b2.finish();
    assert!(match_term(&pattern, &target).is_none());
  }
}
