//! Shared helpers for integration tests.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Process environment is global; tests touching it take turns.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Run `f` with the given variables set (`Some`) or removed (`None`).
///
/// The previous values are put back when `f` returns or panics.
pub fn with_scoped_env<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _restore = EnvRestore::apply(vars);
    f()
}

struct EnvRestore {
    saved: BTreeMap<String, Option<String>>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvRestore {
    fn apply(vars: &[(&str, Option<&str>)]) -> Self {
        // A panicking test must not wedge every later one.
        let lock = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let mut saved = BTreeMap::new();
        for (key, value) in vars {
            saved
                .entry(key.to_string())
                .or_insert_with(|| std::env::var(key).ok());
            set_or_remove(key, value.as_deref());
        }
        Self { saved, _lock: lock }
    }
}

impl Drop for EnvRestore {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            set_or_remove(key, value.as_deref());
        }
    }
}

fn set_or_remove(key: &str, value: Option<&str>) {
    match value {
        Some(value) => std::env::set_var(key, value),
        None => std::env::remove_var(key),
    }
}
