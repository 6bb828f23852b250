use super::postgrest::PostgrestVersionFetcher;
use super::realtime::{RealtimeFeed, build_socket_url};
use super::traits::{InsertSubscription, VersionSource, insert_bus};
use crate::config::SupabaseConfig;
use crate::error::SourceError;
use crate::version::VersionRecord;
use std::future::Future;
use std::pin::Pin;

const NOTICE_CAPACITY: usize = 16;

/// Where the realtime socket connects once someone subscribes.
#[derive(Debug, Clone)]
struct RealtimeTarget {
    socket_url: String,
    table: String,
    anon_key: String,
}

/// Version source backed by a Supabase project: PostgREST for reads and,
/// optionally, Realtime for insert notifications.
///
/// The realtime socket is opened per [`subscribe`](VersionSource::subscribe)
/// call and closed when that subscription is dropped, so an unmounted poller
/// leaves no connection behind.
pub struct SupabaseVersionSource {
    fetcher: PostgrestVersionFetcher,
    realtime: Option<RealtimeTarget>,
}

impl SupabaseVersionSource {
    pub fn from_config(config: &SupabaseConfig, realtime: bool) -> Result<Self, SourceError> {
        let fetcher = PostgrestVersionFetcher::from_config(config)?;

        let realtime = if realtime {
            // from_config above already checked both are present.
            let url = config.url.as_deref().unwrap_or_default();
            let key = config.anon_key.as_deref().unwrap_or_default();
            Some(RealtimeTarget {
                socket_url: build_socket_url(url, key)?,
                table: config.table.clone(),
                anon_key: key.to_string(),
            })
        } else {
            None
        };

        Ok(Self { fetcher, realtime })
    }

    pub fn has_realtime(&self) -> bool {
        self.realtime.is_some()
    }
}

impl VersionSource for SupabaseVersionSource {
    fn name(&self) -> &str {
        "supabase"
    }

    fn fetch_latest(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<VersionRecord>, SourceError>> + Send + '_>> {
        Box::pin(self.fetcher.fetch_latest())
    }

    /// Opens a realtime socket; must be called inside a tokio runtime.
    fn subscribe(&self) -> Option<InsertSubscription> {
        let target = self.realtime.as_ref()?;
        let (tx, rx) = insert_bus(NOTICE_CAPACITY);
        let feed = RealtimeFeed::spawn(
            target.socket_url.clone(),
            target.table.clone(),
            target.anon_key.clone(),
            tx,
        );
        Some(InsertSubscription::with_keepalive(rx, feed))
    }
}
