/*!

Oriented (and not-quite-oriented) rewrite rules, §4.D. `orient` classifies an equation `s = t`
into one of four shapes depending on what the KBO (`core::kbo`) can say about it:

- [`Orientation::Oriented`]: `s` exceeds `t` under the *universal* order, so `s -> t` rewrites
  correctly for every substitution, unconditionally.
- [`Orientation::WeaklyOriented`]: the two sides tie in weight, but a minimal (weight-0) constant
  exists, so the rule still always makes progress except in the degenerate case where the
  instantiated left side *is* that constant.
- [`Orientation::Permutative`]: `t` is literally `s` with its variables permuted (e.g. a
  commutativity instance `f(x, y) = f(y, x)`); the rule fires only for substitutions under which
  the permuted variables happen to compare correctly.
- [`Orientation::Unoriented`]: none of the above; the rule can only be used when a substitution
  instance happens to orient one way, checked case by case.

*/

use std::collections::HashMap;

use crate::{
  api::{errors::{EngineBug, InputError}, symbol::{FunctionId, SymbolTable, VariableIndex}},
  core::{
    kbo::{kbo_gt, less_eq, less_in, Model},
    substitution::{apply_single, Substitution},
    term_store::Term,
    unification::unify,
  },
};

#[derive(Clone, Debug)]
pub enum Orientation {
  Oriented,
  WeaklyOriented { minimal: FunctionId },
  Permutative(Vec<(VariableIndex, VariableIndex)>),
  Unoriented,
}

#[derive(Clone, Debug)]
pub struct Rule {
  pub lhs:         Term,
  pub rhs:         Term,
  pub orientation: Orientation,
}

impl Rule {
  pub fn new(lhs: Term, rhs: Term, orientation: Orientation) -> Self {
    Rule { lhs, rhs, orientation }
  }

  /// Whether this rule may fire for `subst` applied to `self.lhs`. `Oriented` rules are always
  /// eligible — that's what being unconditionally larger means. Every other orientation needs a
  /// per-substitution check, since the rule's direction isn't settled until the variables are
  /// pinned down.
  pub fn is_eligible(&self, subst: &Substitution, table: &SymbolTable) -> bool {
    match &self.orientation {
      Orientation::Oriented => true,

      Orientation::WeaklyOriented { minimal } => {
        let lhs_instance = apply_single(subst, &self.lhs);
        lhs_instance.function_id() != Some(*minimal)
      }

      Orientation::Permutative(pairs) => {
        for (a, b) in pairs {
          let ta = subst.get(*a).cloned().unwrap_or_else(|| crate::core::term_store::var_term(*a));
          let tb = subst.get(*b).cloned().unwrap_or_else(|| crate::core::term_store::var_term(*b));
          if ta.eq_structural(&tb) {
            continue;
          }
          return kbo_gt(&ta, &tb, table);
        }
        false
      }

      Orientation::Unoriented => {
        let lhs_instance = apply_single(subst, &self.lhs);
        let rhs_instance = apply_single(subst, &self.rhs);
        kbo_gt(&lhs_instance, &rhs_instance, table)
      }
    }
  }

  /// As [`Rule::is_eligible`], but for a fixed ground-extension [`Model`] instead of the
  /// universal order: every variable is pinned to a definite rank, so `Unoriented`/`Permutative`
  /// rules that the universal check can't settle become decidable (§4.H, ground joinability).
  pub fn is_eligible_in(&self, subst: &Substitution, model: &Model, table: &SymbolTable) -> bool {
    match &self.orientation {
      Orientation::Oriented => true,

      Orientation::WeaklyOriented { minimal } => {
        let lhs_instance = apply_single(subst, &self.lhs);
        lhs_instance.function_id() != Some(*minimal)
      }

      Orientation::Permutative(pairs) => {
        for (a, b) in pairs {
          let ta = subst.get(*a).cloned().unwrap_or_else(|| crate::core::term_store::var_term(*a));
          let tb = subst.get(*b).cloned().unwrap_or_else(|| crate::core::term_store::var_term(*b));
          if ta.eq_structural(&tb) {
            continue;
          }
          return less_in(model, &tb, &ta, table);
        }
        false
      }

      Orientation::Unoriented => {
        let lhs_instance = apply_single(subst, &self.lhs);
        let rhs_instance = apply_single(subst, &self.rhs);
        less_in(model, &rhs_instance, &lhs_instance, table)
      }
    }
  }

  /// The rule read right-to-left, for orientations that can fire in either direction.
  /// `Err(EngineBug::NotReversible)` for `Oriented`/`WeaklyOriented`, which only ever rewrite
  /// left-to-right — calling this on one of those is a programming error (§7, internal
  /// assertion violation), not a recoverable condition.
  pub fn backwards(&self) -> Result<Rule, EngineBug> {
    match &self.orientation {
      Orientation::Permutative(pairs) => {
        let flipped = pairs.iter().map(|&(a, b)| (b, a)).collect();
        Ok(Rule::new(self.rhs.clone(), self.lhs.clone(), Orientation::Permutative(flipped)))
      }
      Orientation::Unoriented => {
        Ok(Rule::new(self.rhs.clone(), self.lhs.clone(), Orientation::Unoriented))
      }
      Orientation::Oriented | Orientation::WeaklyOriented { .. } => Err(EngineBug::NotReversible),
    }
  }

  /// Forgets the orientation, recovering the underlying equation. Used when a rule is retired
  /// (interreduction, §4.I) and needs to be re-added to the passive queue as a plain equation.
  pub fn unorient(&self) -> (Term, Term) {
    (self.lhs.clone(), self.rhs.clone())
  }
}

/// `true` iff the mgu `sigma` binds every variable in its domain to the bare minimal constant —
/// the condition (§4.C step 1) that distinguishes a genuine `WeaklyOriented` rule (one that can
/// still make no progress for a single degenerate instantiation) from a plain `Oriented` one.
/// A substituted subterm counts as "non-minimal" the moment its root symbol differs from the
/// minimal constant's — nested structure under a variable binding is never unwrapped to ask
/// whether it's "secretly" the minimal constant one level down (Open Question (a), resolved in
/// `DESIGN.md`).
fn mgu_collapses_every_variable_to_minimal(sigma: &Substitution, minimal: FunctionId) -> bool {
  sigma.domain().all(|v| {
    let image = sigma.get(v).expect("v came from sigma's own domain");
    image.function_id() == Some(minimal) && image.size() == 1
  })
}

/// Classifies the equation `s = t` and builds the corresponding [`Rule`], always reading `s` as
/// the intended left-hand side (§4.C): this function never flips the equation to make it
/// orientable. A caller with an equation in no particular preferred direction (the saturation
/// loop's critical pairs) is expected to try both `orient(s, t, _)` and `orient(t, s, _)` and use
/// whichever succeeds, mirroring "the caller must have split equations first" in step 2 below.
pub fn orient(s: &Term, t: &Term, table: &SymbolTable) -> Result<Rule, InputError> {
  if s.eq_structural(t) {
    // A trivial equation; callers filter these out before they reach the active set, but stay
    // total rather than reject it as malformed input.
    return Ok(Rule::new(s.clone(), t.clone(), Orientation::Unoriented));
  }

  if less_eq(t, s, table) {
    // s >= t: orienting s -> t is always safe. Check whether it's only safe up to a degenerate
    // instantiation first (WeaklyOriented), since that's a strictly stronger condition to ask
    // for than plain Oriented.
    if let Some(minimal) = table.minimal() {
      if let Some(mgu) = unify(s, t) {
        if mgu_collapses_every_variable_to_minimal(&mgu, minimal) {
          return Ok(Rule::new(s.clone(), t.clone(), Orientation::WeaklyOriented { minimal }));
        }
      }
    }
    return Ok(Rule::new(s.clone(), t.clone(), Orientation::Oriented));
  }

  if less_eq(s, t, table) {
    // t > s: orienting s -> t would decrease the wrong way. The caller must re-present the
    // equation with the sides swapped (or split it) rather than have `orient` guess a direction.
    return Err(InputError::NotOriented);
  }

  if !vars_subset(t, s) {
    return Err(InputError::UnboundVariable);
  }

  if let Some(map) = find_permutation(s, t) {
    let pairs: Vec<_> = map.into_iter().filter(|(a, b)| a != b).collect();
    if !pairs.is_empty() {
      return Ok(Rule::new(s.clone(), t.clone(), Orientation::Permutative(pairs)));
    }
  }

  Ok(Rule::new(s.clone(), t.clone(), Orientation::Unoriented))
}

/// Orients `s = t` trying `s` as the left-hand side first, then `t`, so a caller holding an
/// equation with no preferred direction (a freshly-normalised critical pair) gets a rule whenever
/// either reading is orientable. Propagates the forward attempt's error only if both directions
/// fail, since a genuinely unbound variable on both readings is the more informative diagnosis.
pub fn orient_either(s: &Term, t: &Term, table: &SymbolTable) -> Result<Rule, InputError> {
  match orient(s, t, table) {
    Ok(rule) => Ok(rule),
    Err(forward_err) => orient(t, s, table).map_err(|_| forward_err),
  }
}

/// `true` iff every variable occurring in `t` also occurs in `s` (§4.C step 3): the condition
/// that makes `rhs < lhs` well-formed as a rewrite rule rather than one that could introduce a
/// fresh, unbound variable when applied.
fn vars_subset(t: &Term, s: &Term) -> bool {
  t.free_variables().is_subset(&s.free_variables())
}

/// Looks for a variable bijection `pi` with `pi(s) == t` structurally (same function symbols
/// everywhere, variables renamed consistently and injectively). Returns the witnessed mapping,
/// including identity pairs, so the caller can decide whether anything actually moved.
fn find_permutation(s: &Term, t: &Term) -> Option<HashMap<VariableIndex, VariableIndex>> {
  let mut forward = HashMap::new();
  let mut backward = HashMap::new();
  if walk_permutation(s, t, &mut forward, &mut backward) {
    Some(forward)
  } else {
    None
  }
}

fn walk_permutation(
  s: &Term,
  t: &Term,
  forward: &mut HashMap<VariableIndex, VariableIndex>,
  backward: &mut HashMap<VariableIndex, VariableIndex>,
) -> bool {
  match (s.variable_index(), t.variable_index()) {
    (Some(sv), Some(tv)) => match forward.get(&sv) {
      Some(&mapped) => mapped == tv,
      None => {
        if backward.contains_key(&tv) {
          return false; // tv already claimed by a different source variable: not a bijection
        }
        forward.insert(sv, tv);
        backward.insert(tv, sv);
        true
      }
    },
    (None, None) => {
      if s.function_id() != t.function_id() {
        return false;
      }
      let mut sargs = s.args();
      let mut targs = t.args();
      loop {
        match (sargs.next(), targs.next()) {
          (Some(a), Some(b)) => {
            if !walk_permutation(&a, &b, forward, backward) {
              return false;
            }
          }
          (None, None) => return true,
          _ => return false,
        }
      }
    }
    _ => false, // a variable lining up against a compound term is not a renaming
  }
}
