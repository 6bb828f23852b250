use super::traits::{LOGGED_IN_KEY, SessionStore};
use crate::error::SessionError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Flat string key/value file, the on-disk shape of the client's local store.
type KeyValues = BTreeMap<String, String>;

/// Session flag persisted in a JSON key/value file.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<KeyValues, SessionError> {
        if !self.path.exists() {
            return Ok(KeyValues::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(KeyValues::new());
        }
        serde_json::from_str(&contents).map_err(|e| SessionError::Store {
            path: self.path.display().to_string(),
            message: format!("corrupt key/value file: {e}"),
        })
    }

    fn save(&self, values: &KeyValues) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(values).map_err(|e| SessionError::Store {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn name(&self) -> &str {
        "file"
    }

    fn is_authenticated(&self) -> bool {
        match self.load() {
            Ok(values) => values.get(LOGGED_IN_KEY).is_some_and(|v| v == "true"),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "session store unreadable: {e}");
                false
            }
        }
    }

    fn set_logged_in(&self, logged_in: bool) -> Result<(), SessionError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // A corrupt file is replaced rather than blocking login.
        let mut values = self.load().unwrap_or_default();
        if logged_in {
            values.insert(LOGGED_IN_KEY.to_string(), "true".to_string());
        } else {
            values.remove(LOGGED_IN_KEY);
        }
        self.save(&values)
    }
}

/// Process-local session flag.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    logged_in: AtomicBool,
}

impl MemorySessionStore {
    pub fn new(logged_in: bool) -> Self {
        Self {
            logged_in: AtomicBool::new(logged_in),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn is_authenticated(&self) -> bool {
        self.logged_in.load(Ordering::SeqCst)
    }

    fn set_logged_in(&self, logged_in: bool) -> Result<(), SessionError> {
        self.logged_in.store(logged_in, Ordering::SeqCst);
        Ok(())
    }
}
