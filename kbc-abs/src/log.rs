/*!

A thin facade over `tracing` so the rest of the engine never names the logging backend
directly. Call sites use `critical!`, `error!`, `warning!`, `info!`, `debug!`, `trace!`; if we
ever swap `tracing` for something else, this is the only module that has to change.

*/

use std::sync::atomic::{AtomicBool, Ordering};

static SUBSCRIBER_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Installs a `tracing_subscriber::fmt` subscriber as the global default. Idempotent: later
/// calls are no-ops. Embedders who want their own subscriber can simply not call this.
pub fn init_tracing() {
  if SUBSCRIBER_INSTALLED.swap(true, Ordering::SeqCst) {
    return;
  }
  let subscriber = tracing_subscriber::fmt()
      .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
      .finish();
  // If another subscriber already won the race (e.g. the embedder installed one between our
  // swap and this call), that's fine; we just keep ours unset.
  let _ = tracing::subscriber::set_global_default(subscriber);
}

#[macro_export]
macro_rules! critical {
    ($($arg:tt)*) => { $crate::tracing::error!(target: "kbc::critical", $($arg)*) };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => { $crate::tracing::error!($($arg)*) };
}

#[macro_export]
macro_rules! warning {
    ($($arg:tt)*) => { $crate::tracing::warn!($($arg)*) };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => { $crate::tracing::info!($($arg)*) };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => { $crate::tracing::debug!($($arg)*) };
}

#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => { $crate::tracing::trace!($($arg)*) };
}

pub use crate::{critical, error, warning, info, debug, trace};
