/*!

The passive queue, §3/§4.G/§4.H: a min-heap of not-yet-considered critical pairs, ordered so the
"best" (lowest-scoring) pair dequeues first. Per §3's compact record, an entry doesn't store a
materialised critical pair — it stores a [`PassiveOrigin`] (either the two rule ids and the
left-hand-side position an overlap came from, or the raw sides of an axiom/retired-rule equation)
and [`reconstruct`]s the actual pair lazily, once it's about to be used. That's what lets the free
function [`dequeue`] recognise and skip an *orphaned* entry — one whose rule(s) were since retired
by interreduction — instead of handing the caller a critical pair built from a rule that no longer
exists.

`simplify_queue` is the periodic-maintenance hook (§4.I) that renormalises every passive pair's two
sides against the current active set, dropping anything that's become joinable in the meantime and
rescoring what's left, since a pair enqueued early in a run may have simplified a great deal by the
time its turn comes up.

*/

use std::{cmp::Reverse, collections::{BinaryHeap, HashMap}};

use crate::{
  api::{config::ScoreWeights, symbol::SymbolTable},
  core::{
    active::{ActiveId, ActiveRule},
    critical_pair::{overlap_at, score, CriticalPair},
    rewriting::simplify,
    rule::Rule,
    term_index::RuleIndex,
    term_store::Term,
  },
};

/// The compact record a passive entry actually carries (§3): either a reference to the two rules
/// (and the position) an overlap came from, reconstructed lazily, or the raw sides of an equation
/// that isn't tied to any rule — a user-declared axiom, or one reprocessed from a rule
/// interreduction just retired.
#[derive(Clone, Debug)]
pub enum PassiveOrigin {
  Overlap { rule1: ActiveId, rule2: ActiveId, position: usize },
  Equation { lhs: Term, rhs: Term, depth: u32 },
}

#[derive(Clone, Debug)]
pub struct Passive {
  pub origin: PassiveOrigin,
  pub score:  i64,
  pub age:    u64,
}

impl PartialEq for Passive {
  fn eq(&self, other: &Self) -> bool {
    (self.score, self.age) == (other.score, other.age)
  }
}
impl Eq for Passive {}

impl PartialOrd for Passive {
  fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
    Some(self.cmp(other))
  }
}
impl Ord for Passive {
  /// Ascending by score, older first on a tie: the ordering a min-heap should pop smallest-first.
  fn cmp(&self, other: &Self) -> std::cmp::Ordering {
    (self.score, self.age).cmp(&(other.score, other.age))
  }
}

#[derive(Default)]
pub struct PassiveQueue {
  heap: BinaryHeap<Reverse<Passive>>,
}

impl PassiveQueue {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.heap.len()
  }

  pub fn is_empty(&self) -> bool {
    self.heap.is_empty()
  }

  pub fn push(&mut self, passive: Passive) {
    self.heap.push(Reverse(passive));
  }

  /// Pops the best-scoring raw entry, without checking whether it's orphaned or oversized. Most
  /// callers want the free function [`dequeue`] instead, which does.
  pub fn pop_raw(&mut self) -> Option<Passive> {
    self.heap.pop().map(|Reverse(p)| p)
  }

  pub fn drain(&mut self) -> Vec<Passive> {
    std::mem::take(&mut self.heap).into_vec().into_iter().map(|Reverse(p)| p).collect()
  }
}

/// Reconstructs the critical pair `origin` denotes against the current active set. `None` for an
/// `Overlap` origin means the entry is orphaned: one or both of the rules it referenced were
/// retired by interreduction since it was enqueued (§3).
pub fn reconstruct(
  origin: &PassiveOrigin,
  active_rules: &HashMap<ActiveId, ActiveRule>,
  table: &SymbolTable,
) -> Option<CriticalPair> {
  match origin {
    PassiveOrigin::Overlap { rule1, rule2, position } => {
      let r1 = active_rules.get(rule1)?;
      let r2 = active_rules.get(rule2)?;
      overlap_at(r1, r2, *position, table)
    }
    PassiveOrigin::Equation { lhs, rhs, depth } => {
      Some(CriticalPair { lhs: lhs.clone(), rhs: rhs.clone(), source: (0, 0), depth: *depth })
    }
  }
}

/// Pops entries off `queue` until a non-orphaned, within-bounds critical pair is found (or the
/// queue runs dry), skipping — and counting in `considered_count` — every orphaned entry (an
/// `Overlap` whose rule(s) were since retired) and every entry whose reconstructed pair now
/// exceeds `max_term_size` on either side (§3/§4.H). The returned pair is the one `consider`
/// should actually work on.
pub fn dequeue(
  queue: &mut PassiveQueue,
  active_rules: &HashMap<ActiveId, ActiveRule>,
  table: &SymbolTable,
  max_term_size: usize,
  considered_count: &mut u64,
) -> Option<CriticalPair> {
  loop {
    let passive = queue.pop_raw()?;
    let Some(cp) = reconstruct(&passive.origin, active_rules, table) else {
      *considered_count += 1; // orphaned: the overlap no longer applies, but it was still considered
      continue;
    };
    if cp.lhs.size() > max_term_size || cp.rhs.size() > max_term_size {
      *considered_count += 1;
      continue;
    }
    return Some(cp);
  }
}

/// Renormalises a single passive entry's two sides against the current active set. Returns
/// `None` if the entry is orphaned, or has become joinable (and so is no longer useful to keep
/// around); `Some` with the rescored entry (same compact origin, fresh score) otherwise.
pub fn simplify_passive(
  passive: &Passive,
  active_rules: &HashMap<ActiveId, ActiveRule>,
  index: &RuleIndex,
  rules: &[(ActiveId, Rule)],
  table: &SymbolTable,
  weights: &ScoreWeights,
) -> Option<Passive> {
  let cp = reconstruct(&passive.origin, active_rules, table)?;
  let lhs = simplify(&cp.lhs, index, rules, table);
  let rhs = simplify(&cp.rhs, index, rules, table);
  if lhs.eq_structural(&rhs) {
    return None;
  }
  let rescored = CriticalPair { lhs, rhs, source: cp.source, depth: cp.depth };
  let s = score(&rescored, passive.age, weights, table);
  Some(Passive { origin: passive.origin.clone(), score: s, age: passive.age })
}

/// Rebuilds the whole queue by `simplify_passive`-ing every entry, dropping orphaned and
/// newly-joinable pairs. The periodic-maintenance step the main loop runs every so often (§4.I),
/// not on every iteration, since renormalising the entire passive set is the more expensive
/// maintenance op.
pub fn simplify_queue(
  queue: &mut PassiveQueue,
  active_rules: &HashMap<ActiveId, ActiveRule>,
  index: &RuleIndex,
  rules: &[(ActiveId, Rule)],
  table: &SymbolTable,
  weights: &ScoreWeights,
) {
  let entries = queue.drain();
  for entry in entries {
    if let Some(simplified) = simplify_passive(&entry, active_rules, index, rules, table, weights) {
      queue.push(simplified);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{api::symbol::FunctionSymbol, core::term_store::const_term};

  fn equation_passive(lhs: Term, rhs: Term, score_value: i64, age: u64) -> Passive {
    Passive { origin: PassiveOrigin::Equation { lhs, rhs, depth: 0 }, score: score_value, age }
  }

  #[test]
  fn dequeue_returns_lowest_score_first() {
    let mut table = SymbolTable::new();
    let a = table.declare(FunctionSymbol::new("a", 0, 1, 0));
    let b = table.declare(FunctionSymbol::new("b", 0, 1, 1));
    let mut queue = PassiveQueue::new();
    queue.push(equation_passive(const_term(a), const_term(b), 10, 0));
    queue.push(equation_passive(const_term(a), const_term(b), 2, 1));
    queue.push(equation_passive(const_term(a), const_term(b), 7, 2));

    let mut considered = 0u64;
    let active_rules: HashMap<ActiveId, ActiveRule> = HashMap::new();
    assert!(dequeue(&mut queue, &active_rules, &table, 1000, &mut considered).is_some());
    // Scores were 2, 7, 10 in enqueue order; the lowest must come out first.
    assert_eq!(queue.len(), 2);
    let next = queue.pop_raw().unwrap();
    assert_eq!(next.score, 7);
    assert_eq!(considered, 0);
  }

  #[test]
  fn dequeue_skips_an_orphaned_overlap_and_counts_it() {
    let mut table = SymbolTable::new();
    let a = table.declare(FunctionSymbol::new("a", 0, 1, 0));

    let mut queue = PassiveQueue::new();
    // References rule ids that don't exist in the (empty) active set: orphaned from the start.
    queue.push(Passive { origin: PassiveOrigin::Overlap { rule1: 1, rule2: 2, position: 0 }, score: 0, age: 0 });
    queue.push(equation_passive(const_term(a), const_term(a), 5, 1));

    let active_rules: HashMap<ActiveId, ActiveRule> = HashMap::new();
    let mut considered = 0u64;
    // The equation entry normalises trivially (both sides equal), it's still a valid reconstructed
    // pair even though joinable; only orphan/oversize skip here, so it should come back.
    let result = dequeue(&mut queue, &active_rules, &table, 1000, &mut considered);
    assert!(result.is_some());
    assert_eq!(considered, 1, "the orphaned overlap entry should have been skipped and counted");
  }

  #[test]
  fn simplify_queue_drops_pairs_that_became_joinable() {
    let mut table = SymbolTable::new();
    let a = table.declare(FunctionSymbol::new("a", 0, 1, 0));
    let b = table.declare(FunctionSymbol::new("b", 0, 1, 1));
    let rule = crate::core::rule::orient(&const_term(b), &const_term(a), &table).unwrap();

    let mut index = RuleIndex::new();
    index.index_oriented.insert(1, rule.lhs.clone());
    index.index_all.insert(1, rule.lhs.clone());
    let rules = vec![(1u64, rule.clone())];
    let mut active_rules = HashMap::new();
    active_rules.insert(1u64, ActiveRule { id: 1, rule, age: 0, depth: 0 });

    let mut queue = PassiveQueue::new();
    // a = b becomes joinable once "a -> b" is active, since both sides normalise to b.
    queue.push(equation_passive(const_term(a), const_term(b), 0, 0));

    simplify_queue(&mut queue, &active_rules, &index, &rules, &table, &ScoreWeights::default());
    assert!(queue.is_empty());
  }

  #[test]
  fn simplify_queue_drops_an_orphaned_overlap_entry() {
    let table = SymbolTable::new();
    let index = RuleIndex::new();
    let rules: Vec<(ActiveId, Rule)> = Vec::new();
    let active_rules: HashMap<ActiveId, ActiveRule> = HashMap::new();

    let mut queue = PassiveQueue::new();
    queue.push(Passive { origin: PassiveOrigin::Overlap { rule1: 1, rule2: 2, position: 0 }, score: 0, age: 0 });

    simplify_queue(&mut queue, &active_rules, &index, &rules, &table, &ScoreWeights::default());
    assert!(queue.is_empty(), "an overlap referencing retired rules should be dropped, not rescored");
  }
}
