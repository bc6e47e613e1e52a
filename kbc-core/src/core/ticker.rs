/*!

A tick counter gating how often the main loop runs its periodic-maintenance step (§4.I):
interreduction and full passive-queue renormalisation are each worth doing regularly, but not on
every single `complete1` iteration, since both walk the entire active/passive set.

*/

/// Counts iterations and reports back once every `interval` of them.
#[derive(Clone, Debug)]
pub struct Ticker {
  interval: u64,
  count:    u64,
}

impl Ticker {
  /// A ticker that fires once every `interval` calls to `check_task` (an interval of `0` never
  /// fires, used to disable a maintenance step entirely).
  pub fn new_task(interval: u64) -> Self {
    Ticker { interval, count: 0 }
  }

  /// Advances the ticker by one iteration, returning `true` exactly when `interval` iterations
  /// have elapsed since the last time it fired.
  pub fn check_task(&mut self) -> bool {
    if self.interval == 0 {
      return false;
    }
    self.count += 1;
    if self.count >= self.interval {
      self.count = 0;
      true
    } else {
      false
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fires_every_nth_check() {
    let mut ticker = Ticker::new_task(3);
    assert!(!ticker.check_task());
    assert!(!ticker.check_task());
    assert!(ticker.check_task());
    assert!(!ticker.check_task());
  }

  #[test]
  fn zero_interval_never_fires() {
    let mut ticker = Ticker::new_task(0);
    for _ in 0..10 {
      assert!(!ticker.check_task());
    }
  }
}
