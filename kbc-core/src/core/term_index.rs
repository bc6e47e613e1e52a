/*!

A discrimination-tree-style index over a set of indexed terms (rule left-hand sides), §4.E.
Retrieval is two-stage: `approx_matches` narrows candidates cheaply by comparing only each
indexed term's root symbol against the query's root, then `matches` runs the real matcher
(`core::matching::match_term`) over that narrowed set and keeps only the entries that actually
succeed. This is depth-1 discrimination rather than the teacher's full multi-level trie (see
`core/automata/` in the teacher for the general case), which is enough here since the active set
stays small relative to a full term-rewriting engine's rule base.

`RuleIndex` is the engine's one instance of this: rule left-hand sides that are unconditionally
usable (`Orientation::Oriented`/`WeaklyOriented`) live in `index_oriented`; every left-hand side
that could ever fire, including the backwards view of `Permutative`/`Unoriented` rules, lives in
`index_all` (used when searching for overlaps, §4.G, which doesn't care about direction).

*/

use std::{collections::HashMap, hash::Hash};

use crate::{
  api::symbol::FunctionId,
  core::{matching::match_term, substitution::Substitution, term_store::Term},
};

#[derive(Clone)]
struct Entry<Id> {
  id:   Id,
  term: Term,
}

/// Indexes terms by their root symbol, bucketing variable-rooted patterns separately since a
/// bare variable matches anything.
#[derive(Clone)]
pub struct TermIndex<Id> {
  by_function: HashMap<FunctionId, Vec<Entry<Id>>>,
  variables:   Vec<Entry<Id>>,
}

impl<Id: Copy + Eq + Hash> TermIndex<Id> {
  pub fn new() -> Self {
    TermIndex { by_function: HashMap::new(), variables: Vec::new() }
  }

  pub fn insert(&mut self, id: Id, term: Term) {
    match term.function_id() {
      Some(f) => self.by_function.entry(f).or_default().push(Entry { id, term }),
      None => self.variables.push(Entry { id, term }),
    }
  }

  /// Removes every entry keyed to `id`. `O(n)` in the index size; fine at the scale this index
  /// operates at (the active rule set, not a persistent term store).
  pub fn delete(&mut self, id: Id) {
    for bucket in self.by_function.values_mut() {
      bucket.retain(|e| e.id != id);
    }
    self.variables.retain(|e| e.id != id);
  }

  pub fn len(&self) -> usize {
    self.by_function.values().map(Vec::len).sum::<usize>() + self.variables.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Every indexed entry whose pattern could possibly match `target`: variable-rooted patterns
  /// unconditionally, plus function-rooted patterns sharing `target`'s root symbol.
  pub fn approx_matches(&self, target: &Term) -> Vec<(Id, &Term)> {
    let mut out: Vec<(Id, &Term)> = self.variables.iter().map(|e| (e.id, &e.term)).collect();
    if let Some(f) = target.function_id() {
      if let Some(bucket) = self.by_function.get(&f) {
        out.extend(bucket.iter().map(|e| (e.id, &e.term)));
      }
    }
    out
  }

  /// The subset of `approx_matches` whose pattern actually matches `target`, each paired with
  /// the substitution that witnesses it.
  pub fn matches(&self, target: &Term) -> Vec<(Id, Substitution)> {
    self
      .approx_matches(target)
      .into_iter()
      .filter_map(|(id, pattern)| match_term(pattern, target).map(|sigma| (id, sigma)))
      .collect()
  }
}

impl<Id: Copy + Eq + Hash> Default for TermIndex<Id> {
  fn default() -> Self {
    Self::new()
  }
}

/// Both views the saturation loop needs over the active rule set's left-hand sides: one
/// restricted to unconditionally-usable directions, one covering every direction a rule could
/// ever rewrite in.
#[derive(Clone, Default)]
pub struct RuleIndex {
  pub index_oriented: TermIndex<u64>,
  pub index_all:      TermIndex<u64>,
}

impl RuleIndex {
  pub fn new() -> Self {
    Self::default()
  }
}
