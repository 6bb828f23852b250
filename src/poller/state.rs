use crate::version::VersionRecord;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Lifecycle of the update poller. `Locked` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PollerState {
    Idle,
    Checking,
    Locked,
}

/// Result of one pass through the check routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CheckOutcome {
    /// Another check was already in flight; nothing was fetched.
    Skipped,
    /// Already locked; nothing was fetched.
    AlreadyLocked,
    /// The source has no published record.
    NoRecord,
    /// Latest record is not newer than the installed build.
    UpToDate,
    /// Latest record is newer; the client is now locked.
    Locked,
    /// The fetch failed; state left unchanged.
    Failed,
}

/// What the client knows about its own version relative to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalVersionState {
    pub installed_version: String,
    pub lock: bool,
    pub pending_record: Option<VersionRecord>,
}

impl LocalVersionState {
    pub fn new(installed_version: impl Into<String>) -> Self {
        Self {
            installed_version: installed_version.into(),
            lock: false,
            pending_record: None,
        }
    }

    /// Latch the lock on `record`. Later calls keep the first record.
    pub(crate) fn lock_on(&mut self, record: VersionRecord) -> bool {
        if self.lock {
            return false;
        }
        self.lock = true;
        self.pending_record = Some(record);
        true
    }
}
