use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Exclusive access to the process environment for one test.
///
/// Every variable touched through the scope gets its previous value back on
/// drop, before the lock is released.
pub(crate) struct EnvScope {
    saved: Vec<(&'static str, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvScope {
    pub(crate) fn lock() -> Self {
        Self {
            saved: Vec::new(),
            _lock: ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    pub(crate) fn set(&mut self, key: &'static str, value: &str) -> &mut Self {
        self.remember(key);
        // SAFETY: ENV_LOCK is held for the lifetime of the scope.
        unsafe { std::env::set_var(key, value) };
        self
    }

    pub(crate) fn unset(&mut self, key: &'static str) -> &mut Self {
        self.remember(key);
        // SAFETY: ENV_LOCK is held for the lifetime of the scope.
        unsafe { std::env::remove_var(key) };
        self
    }

    fn remember(&mut self, key: &'static str) {
        if !self.saved.iter().any(|(saved, _)| *saved == key) {
            self.saved.push((key, std::env::var(key).ok()));
        }
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..).rev() {
            // SAFETY: still holding ENV_LOCK; `_lock` drops after this body.
            unsafe {
                match previous {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}
