/*!

A process-wide interning table for labelling values of type `T` with small integer ids.

This generalises the teacher's ad hoc `static mut SYMBOL_COUNT: u32` counter (see
`Symbol::new` in the teacher repo) into something safe and re-entrant: `label(x)` is
idempotent (calling it twice with an equal `x` returns the same id) and `find(id)` is total
over every id ever returned by `label`. Both are safe to call from a re-entrant context, such
as an `Ord` implementation that itself labels a value while the table's lock is held
elsewhere on the call stack — the lock is only ever held for the duration of a single
`label`/`find` call, never across a callback into user code.

A single process-wide instance is reachable through `Labeller::<T>::global()`, lazily
initialized on first use. Embedders that want an independent table (e.g. for tests that must
not interfere with each other) can construct their own `Labeller::new()` instead.

*/

use std::{
  any::{Any, TypeId},
  collections::HashMap,
  hash::Hash,
  sync::Mutex,
};

use once_cell::sync::Lazy;

struct Inner<T> {
  by_id:    Vec<T>,
  by_value: HashMap<T, u32>,
}

pub struct Labeller<T> {
  inner: Mutex<Inner<T>>,
}

impl<T: Eq + Hash + Clone> Labeller<T> {
  pub fn new() -> Self {
    Labeller {
      inner: Mutex::new(Inner { by_id: Vec::new(), by_value: HashMap::new() }),
    }
  }

  /// Returns the id for `value`, allocating a fresh one on first sight. Idempotent.
  pub fn label(&self, value: T) -> u32 {
    let mut inner = self.inner.lock().expect("labeller mutex poisoned");
    if let Some(&id) = inner.by_value.get(&value) {
      return id;
    }
    let id = inner.by_id.len() as u32;
    inner.by_id.push(value.clone());
    inner.by_value.insert(value, id);
    id
  }

  /// Looks up the value behind a previously allocated id. Total on any id returned by
  /// `label` on this table; panics on an id this table never allocated, which indicates a
  /// programming error (mixing ids from two different tables).
  pub fn find(&self, id: u32) -> T {
    let inner = self.inner.lock().expect("labeller mutex poisoned");
    inner.by_id[id as usize].clone()
  }

  pub fn len(&self) -> usize {
    self.inner.lock().expect("labeller mutex poisoned").by_id.len()
  }
}

impl<T: Eq + Hash + Clone> Default for Labeller<T> {
  fn default() -> Self {
    Self::new()
  }
}

/// One registry slot per distinct `T`, keyed by `TypeId` since a plain `static` can't itself be
/// generic over `T`. Each slot is populated at most once (under the registry's own lock) and then
/// leaked, which is what lets `global()` hand back a `&'static Labeller<T>` rather than something
/// tied to the lock guard's lifetime.
static GLOBAL_LABELLERS: Lazy<Mutex<HashMap<TypeId, &'static (dyn Any + Send + Sync)>>> = Lazy::new(|| Mutex::new(HashMap::new()));

impl<T: Eq + Hash + Clone + Send + Sync + 'static> Labeller<T> {
  /// The process-wide instance for `T`, built on first call and shared by every caller
  /// thereafter. Distinct `T`s get distinct, independent tables.
  pub fn global() -> &'static Labeller<T> {
    let mut registry = GLOBAL_LABELLERS.lock().expect("labeller registry mutex poisoned");
    let slot = registry.entry(TypeId::of::<T>()).or_insert_with(|| {
      let leaked: &'static Labeller<T> = Box::leak(Box::new(Labeller::<T>::new()));
      leaked as &'static (dyn Any + Send + Sync)
    });
    slot.downcast_ref::<Labeller<T>>().expect("labeller registry entry had the wrong concrete type")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn label_is_idempotent() {
    let l: Labeller<String> = Labeller::new();
    let a = l.label("foo".to_string());
    let b = l.label("foo".to_string());
    let c = l.label("bar".to_string());
    assert_eq!(a, b);
    assert_ne!(a, c);
  }

  #[test]
  fn find_round_trips() {
    let l: Labeller<String> = Labeller::new();
    let id = l.label("baz".to_string());
    assert_eq!(l.find(id), "baz");
  }

  #[derive(Clone, PartialEq, Eq, Hash)]
  struct GlobalProbe(u32);

  #[test]
  fn global_returns_the_same_instance_on_every_call() {
    let a = Labeller::<GlobalProbe>::global();
    let id = a.label(GlobalProbe(1));
    let b = Labeller::<GlobalProbe>::global();
    assert_eq!(b.find(id), GlobalProbe(1));
  }

  #[test]
  fn global_tables_for_distinct_types_do_not_share_ids() {
    Labeller::<String>::global().label("distinct-types-probe".to_string());
    let n: &Labeller<GlobalProbe> = Labeller::global();
    assert!(n.len() <= 1, "a fresh type must not inherit entries from another type's global table");
  }
}
