use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One published release, as stored in the backend `app_versions` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: String,
    /// Download link for the update artifact (`apk_url` on the wire).
    #[serde(rename = "apk_url")]
    pub artifact_url: String,
    #[serde(rename = "created_at")]
    pub published_at: DateTime<Utc>,
}

impl VersionRecord {
    pub fn new(
        version: impl Into<String>,
        artifact_url: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            version: version.into(),
            artifact_url: artifact_url.into(),
            published_at,
        }
    }

    /// Pick the most recently published record.
    pub fn latest(records: impl IntoIterator<Item = Self>) -> Option<Self> {
        records.into_iter().max_by_key(|r| r.published_at)
    }
}
