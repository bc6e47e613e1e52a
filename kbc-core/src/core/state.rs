/*!

The saturation loop's mutable state, §4.I: the symbol table, the active rule set (and its two
term indices), the set of equations already known joinable (kept for subsumption rather than
rewriting), the goal list, the passive queue, and the pending output message buffer the loop
appends to before each mutation takes effect (§6's ordering guarantee).

*/

use std::collections::HashMap;

use crate::{
  api::{config::Config, message::Message, symbol::SymbolTable},
  core::{
    active::{Active, ActiveId, ActiveRule},
    goal::Goal,
    passive_queue::PassiveQueue,
    rule::Rule,
    term_index::RuleIndex,
    term_store::Term,
  },
};

pub struct State {
  pub table:              SymbolTable,
  pub config:             Config,
  pub rule_index:         RuleIndex,
  pub active_rules:       HashMap<ActiveId, ActiveRule>,
  pub joinable_equations: Vec<(Term, Term)>,
  pub goals:              Vec<Goal>,
  pub passive:            PassiveQueue,
  next_active_id:         ActiveId,
  next_goal_id:           u64,
  messages:                Vec<Message>,
  /// Total critical pairs ever enqueued, used as the age/score tie-breaker (§4.H).
  pub critical_pair_count: u64,
  /// Total critical pairs actually dequeued and fed to `consider`, checked against
  /// `config.max_critical_pairs` at the top of `complete1` (§4.I step 1).
  pub considered_count: u64,
}

impl State {
  pub fn new(table: SymbolTable, config: Config) -> Self {
    State {
      table,
      config,
      rule_index: RuleIndex::new(),
      active_rules: HashMap::new(),
      joinable_equations: Vec::new(),
      goals: Vec::new(),
      passive: PassiveQueue::new(),
      next_active_id: 0,
      next_goal_id: 0,
      messages: Vec::new(),
      critical_pair_count: 0,
      considered_count: 0,
    }
  }

  pub fn fresh_active_id(&mut self) -> ActiveId {
    let id = self.next_active_id;
    self.next_active_id += 1;
    id
  }

  pub fn fresh_goal_id(&mut self) -> u64 {
    let id = self.next_goal_id;
    self.next_goal_id += 1;
    id
  }

  /// A snapshot of the active rule set as `(id, rule)` pairs, the shape `core::rewriting` and
  /// `core::critical_pair` expect.
  pub fn active_rule_pairs(&self) -> Vec<(ActiveId, Rule)> {
    self.active_rules.values().map(|r| (r.id, r.rule.clone())).collect()
  }

  /// Adds a rule to the active set, indexing it under its unconditional and (if applicable)
  /// reversed left-hand sides, and emitting the corresponding message. `depth` is the rule's
  /// derivation depth (§4.G): `0` for a rule oriented straight from a user-declared axiom,
  /// otherwise `1 + max` of the two rules whose overlap produced it.
  pub fn add_active_rule(&mut self, rule: Rule, depth: u32) -> ActiveId {
    let id = self.fresh_active_id();
    self.rule_index.index_all.insert(id, rule.lhs.clone());
    if matches!(rule.orientation, crate::core::rule::Orientation::Oriented | crate::core::rule::Orientation::WeaklyOriented { .. }) {
      self.rule_index.index_oriented.insert(id, rule.lhs.clone());
    }
    if let Ok(backward) = rule.backwards() {
      self.rule_index.index_all.insert(id, backward.lhs.clone());
    }
    let active_rule = ActiveRule { id, rule, age: id, depth };
    self.messages.push(Message::NewActive(Active::Rule(active_rule.clone())));
    self.active_rules.insert(id, active_rule);
    id
  }

  /// Removes a rule from the active set entirely (interreduction, §4.I), returning it so the
  /// caller can re-derive an equation from it if appropriate.
  pub fn remove_active_rule(&mut self, id: ActiveId) -> Option<ActiveRule> {
    let removed = self.active_rules.remove(&id)?;
    self.rule_index.index_oriented.delete(id);
    self.rule_index.index_all.delete(id);
    self.messages.push(Message::DeleteActive(Active::Rule(removed.clone())));
    Some(removed)
  }

  pub fn record_joinable_equation(&mut self, lhs: Term, rhs: Term) {
    self.joinable_equations.push((lhs.clone(), rhs.clone()));
  }

  pub fn emit(&mut self, message: Message) {
    self.messages.push(message);
  }

  /// Drains every message queued since the last drain, preserving emission order (§6).
  pub fn take_messages(&mut self) -> Vec<Message> {
    std::mem::take(&mut self.messages)
  }
}
