//! Latest-version lookup through Supabase's PostgREST endpoint.

use super::http_client::{build_source_client, sanitize_error_body};
use crate::config::SupabaseConfig;
use crate::error::SourceError;
use crate::version::VersionRecord;
use reqwest::Client;

const SELECT_COLUMNS: &str = "version,apk_url,created_at";

/// Reads the newest row of the versions table: `order=created_at.desc&limit=1`.
pub struct PostgrestVersionFetcher {
    endpoint: String,
    anon_key: String,
    client: Client,
}

impl PostgrestVersionFetcher {
    pub fn new(base_url: &str, anon_key: &str, table: &str, timeout_secs: u64) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            endpoint: format!("{base_url}/rest/v1/{table}"),
            anon_key: anon_key.to_string(),
            client: build_source_client(timeout_secs),
        }
    }

    pub fn from_config(config: &SupabaseConfig) -> Result<Self, SourceError> {
        let url = config
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| SourceError::NotConfigured("supabase.url is not set".into()))?;
        let key = config
            .anon_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| SourceError::NotConfigured("supabase.anon_key is not set".into()))?;
        Ok(Self::new(
            url,
            key,
            &config.table,
            config.request_timeout_secs,
        ))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn fetch_latest(&self) -> Result<Option<VersionRecord>, SourceError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("select", SELECT_COLUMNS),
                ("order", "created_at.desc"),
                ("limit", "1"),
            ])
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SourceError::Request {
                endpoint: self.endpoint.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| SourceError::Request {
            endpoint: self.endpoint.clone(),
            message: format!("reading body: {e}"),
        })?;

        if !status.is_success() {
            return Err(SourceError::Http {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
                body: sanitize_error_body(&body, &self.anon_key),
            });
        }

        let rows: Vec<VersionRecord> =
            serde_json::from_str(&body).map_err(|e| SourceError::Decode(e.to_string()))?;
        Ok(VersionRecord::latest(rows))
    }
}
