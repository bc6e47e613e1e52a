/*!

Configuration, per §6. A plain struct with a `Default` impl: the teacher tunes itself with
plain structs and Cargo feature flags rather than a config-file crate, and no repo in the pack
pulls one in for comparable engine-tuning knobs, so that's what this crate does too.

*/

/// Weights of the score function (`critical_pairs.*`, §6). §9 Open Question (b) asks that the
/// formula's knobs be exposed rather than hard-coded; `CriticalPair::score` (see
/// `core::critical_pair`) is exactly `size_weight * size + depth_weight * depth + age_weight *
/// considered_at`.
#[derive(Clone, Copy, Debug)]
pub struct ScoreWeights {
  pub size_weight:  i64,
  pub depth_weight: i64,
  pub age_weight:   i64,
}

impl Default for ScoreWeights {
  fn default() -> Self {
    ScoreWeights { size_weight: 1, depth_weight: 1, age_weight: 0 }
  }
}

/// Which joinability strategies to attempt (`join.*`, §6), tried in the order listed here.
#[derive(Clone, Copy, Debug)]
pub struct JoinConfig {
  pub use_simple:             bool,
  pub use_subconnectedness:   bool,
  pub use_ground_joinability: bool,
}

impl Default for JoinConfig {
  fn default() -> Self {
    JoinConfig { use_simple: true, use_subconnectedness: true, use_ground_joinability: false }
  }
}

/// Named options with the exact effects listed in §6's Configuration table.
#[derive(Clone, Copy, Debug)]
pub struct Config {
  /// Drop critical pairs whose either side exceeds this symbol count.
  pub max_term_size: usize,
  /// Stop once this many critical pairs have been *considered*.
  pub max_critical_pairs: u64,
  /// Drop overlaps whose depth exceeds this.
  pub max_cp_depth: u32,
  /// Enable/disable periodic interreduction.
  pub simplify: bool,
  /// Fraction (0.0-1.0) of the work budget between queue-simplification passes.
  pub renormalise_percent: f64,
  pub critical_pairs: ScoreWeights,
  pub join: JoinConfig,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      max_term_size:        1000,
      max_critical_pairs:   u64::MAX,
      max_cp_depth:         u32::MAX,
      simplify:             true,
      renormalise_percent:  0.1,
      critical_pairs:       ScoreWeights::default(),
      join:                 JoinConfig::default(),
    }
  }
}
