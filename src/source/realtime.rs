//! Supabase Realtime subscription for version-table inserts.
//!
//! Speaks the Phoenix channel protocol (JSON serializer, `vsn=1.0.0`) over a
//! WebSocket: join `realtime:public:<table>` with a `postgres_changes` INSERT
//! filter, heartbeat on the `phoenix` topic, and forward every insert as an
//! [`InsertNotice`]. A dropped socket reconnects with capped exponential
//! backoff; while disconnected the feed is silent and the poller's timer is
//! the only trigger.

use super::traits::{InsertNotice, InsertSender};
use crate::error::SourceError;
use anyhow::{Context, Result};
use futures_util::{Sink, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_tungstenite::tungstenite::Message;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const INITIAL_BACKOFF_SECS: u64 = 1;
const MAX_BACKOFF_SECS: u64 = 30;

/// One Phoenix frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoenixMessage {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(rename = "ref", default)]
    pub msg_ref: Option<String>,
}

/// Build `wss://<host>/realtime/v1/websocket?apikey=..&vsn=1.0.0` from the
/// project's REST URL.
pub fn build_socket_url(base_url: &str, anon_key: &str) -> Result<String, SourceError> {
    let mut url = url::Url::parse(base_url.trim_end_matches('/'))
        .map_err(|e| SourceError::NotConfigured(format!("invalid supabase url: {e}")))?;

    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(SourceError::NotConfigured(format!(
                "unsupported supabase url scheme '{other}'"
            )));
        }
    };
    url.set_scheme(scheme)
        .map_err(|()| SourceError::NotConfigured("cannot switch url to websocket".into()))?;
    url.set_path("/realtime/v1/websocket");
    url.query_pairs_mut()
        .clear()
        .append_pair("apikey", anon_key)
        .append_pair("vsn", "1.0.0");
    Ok(url.into())
}

pub fn channel_topic(table: &str) -> String {
    format!("realtime:public:{table}")
}

pub fn join_message(table: &str, anon_key: &str, msg_ref: u64) -> PhoenixMessage {
    PhoenixMessage {
        topic: channel_topic(table),
        event: "phx_join".into(),
        payload: json!({
            "config": {
                "broadcast": { "self": false },
                "presence": { "key": "" },
                "postgres_changes": [
                    { "event": "INSERT", "schema": "public", "table": table }
                ]
            },
            "access_token": anon_key,
        }),
        msg_ref: Some(msg_ref.to_string()),
    }
}

pub fn heartbeat_message(msg_ref: u64) -> PhoenixMessage {
    PhoenixMessage {
        topic: "phoenix".into(),
        event: "heartbeat".into(),
        payload: json!({}),
        msg_ref: Some(msg_ref.to_string()),
    }
}

/// Extract an insert notification for `table` from a raw frame.
///
/// Accepts both the `postgres_changes` envelope and the legacy bare
/// `INSERT` event. Anything else (replies, presence, other tables) is `None`.
pub fn parse_insert(raw: &str, table: &str) -> Option<InsertNotice> {
    let message: PhoenixMessage = serde_json::from_str(raw).ok()?;
    if message.topic != channel_topic(table) {
        return None;
    }

    let change = match message.event.as_str() {
        "postgres_changes" => message.payload.get("data")?,
        "INSERT" => &message.payload,
        _ => return None,
    };

    let kind = change
        .get("type")
        .or_else(|| change.get("eventType"))
        .and_then(serde_json::Value::as_str)?;
    if kind != "INSERT" {
        return None;
    }
    if let Some(changed_table) = change.get("table").and_then(serde_json::Value::as_str)
        && changed_table != table
    {
        return None;
    }

    let version = change
        .get("record")
        .or_else(|| change.get("new"))
        .and_then(|record| record.get("version"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned);

    Some(InsertNotice { version })
}

/// Status carried by a `phx_reply` to our join, if `raw` is one.
fn join_reply_status(raw: &str, table: &str) -> Option<String> {
    let message: PhoenixMessage = serde_json::from_str(raw).ok()?;
    if message.event != "phx_reply" || message.topic != channel_topic(table) {
        return None;
    }
    message
        .payload
        .get("status")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}

fn is_channel_closed(raw: &str, table: &str) -> bool {
    serde_json::from_str::<PhoenixMessage>(raw).is_ok_and(|m| {
        m.topic == channel_topic(table) && matches!(m.event.as_str(), "phx_error" | "phx_close")
    })
}

/// Background task holding the realtime socket open.
///
/// Dropping the feed aborts the task and closes the socket.
pub struct RealtimeFeed {
    handle: JoinHandle<()>,
}

impl RealtimeFeed {
    pub fn spawn(socket_url: String, table: String, anon_key: String, tx: InsertSender) -> Self {
        let client = RealtimeClient {
            socket_url,
            table,
            anon_key,
            next_ref: AtomicU64::new(1),
        };

        let handle = tokio::spawn(async move {
            let mut backoff = INITIAL_BACKOFF_SECS;
            loop {
                match client.connect_and_listen(&tx).await {
                    Ok(joined) => {
                        if joined {
                            backoff = INITIAL_BACKOFF_SECS;
                        }
                        tracing::warn!(table = %client.table, "realtime socket closed; reconnecting");
                    }
                    Err(e) => {
                        tracing::warn!(table = %client.table, "realtime connection failed: {e:#}");
                    }
                }
                tokio::time::sleep(Duration::from_secs(backoff)).await;
                backoff = backoff.saturating_mul(2).min(MAX_BACKOFF_SECS);
            }
        });

        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for RealtimeFeed {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct RealtimeClient {
    socket_url: String,
    table: String,
    anon_key: String,
    next_ref: AtomicU64,
}

impl RealtimeClient {
    fn next_ref(&self) -> u64 {
        self.next_ref.fetch_add(1, Ordering::SeqCst)
    }

    /// Run one socket session. `Ok(true)` if the join was acknowledged
    /// before the socket went away.
    async fn connect_and_listen(&self, tx: &InsertSender) -> Result<bool> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(&self.socket_url)
            .await
            .context("connect realtime websocket")?;
        let (mut write, mut read) = ws_stream.split();

        let join = join_message(&self.table, &self.anon_key, self.next_ref());
        send_frame(&mut write, &join)
            .await
            .context("send realtime join")?;

        let mut heartbeat = interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await;
        let mut joined = false;

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    send_frame(&mut write, &heartbeat_message(self.next_ref()))
                        .await
                        .context("send realtime heartbeat")?;
                }
                message = read.next() => {
                    let Some(message) = message else {
                        return Ok(joined);
                    };
                    let message = message.context("read realtime frame")?;
                    let Some(raw) = websocket_message_to_text(message) else {
                        continue;
                    };

                    if let Some(status) = join_reply_status(&raw, &self.table) {
                        if status == "ok" {
                            if !joined {
                                tracing::info!(table = %self.table, "realtime channel joined");
                            }
                            joined = true;
                        } else {
                            anyhow::bail!("realtime join rejected with status '{status}'");
                        }
                        continue;
                    }

                    if is_channel_closed(&raw, &self.table) {
                        return Ok(joined);
                    }

                    if let Some(notice) = parse_insert(&raw, &self.table) {
                        tracing::debug!(version = ?notice.version, "realtime insert received");
                        // Nobody listening just means no poller is mounted.
                        let _ = tx.send(notice);
                    }
                }
            }
        }
    }
}

async fn send_frame<WsSink>(write: &mut WsSink, frame: &PhoenixMessage) -> Result<()>
where
    WsSink: Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let text = serde_json::to_string(frame).context("encode realtime frame")?;
    write.send(Message::Text(text.into())).await?;
    Ok(())
}

fn websocket_message_to_text(message: Message) -> Option<String> {
    match message {
        Message::Text(text) => Some(text.to_string()),
        Message::Binary(bytes) => String::from_utf8(bytes.to_vec()).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_url_switches_scheme_and_path() {
        let url = build_socket_url("https://demo.supabase.co/", "anon").unwrap();
        assert_eq!(
            url,
            "wss://demo.supabase.co/realtime/v1/websocket?apikey=anon&vsn=1.0.0"
        );

        let local = build_socket_url("http://127.0.0.1:54321", "k").unwrap();
        assert!(local.starts_with("ws://127.0.0.1:54321/realtime/v1/websocket"));
    }

    #[test]
    fn socket_url_rejects_other_schemes() {
        assert!(build_socket_url("ftp://demo.supabase.co", "anon").is_err());
        assert!(build_socket_url("not a url", "anon").is_err());
    }

    #[test]
    fn join_frame_filters_inserts_on_table() {
        let frame = join_message("app_versions", "anon", 7);
        let json = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["topic"], "realtime:public:app_versions");
        assert_eq!(json["event"], "phx_join");
        assert_eq!(json["ref"], "7");
        let filter = &json["payload"]["config"]["postgres_changes"][0];
        assert_eq!(filter["event"], "INSERT");
        assert_eq!(filter["table"], "app_versions");
    }

    #[test]
    fn heartbeat_targets_phoenix_topic() {
        let json = serde_json::to_value(heartbeat_message(3)).unwrap();
        assert_eq!(json["topic"], "phoenix");
        assert_eq!(json["event"], "heartbeat");
    }

    #[test]
    fn parses_postgres_changes_insert() {
        let raw = r#"{"topic":"realtime:public:app_versions","event":"postgres_changes","payload":{"ids":[1],"data":{"type":"INSERT","schema":"public","table":"app_versions","record":{"version":"1.5.0","apk_url":"https://x","created_at":"2026-06-01T00:00:00Z"}}},"ref":null}"#;
        let notice = parse_insert(raw, "app_versions").unwrap();
        assert_eq!(notice.version.as_deref(), Some("1.5.0"));
    }

    #[test]
    fn parses_legacy_insert_event() {
        let raw = r#"{"topic":"realtime:public:app_versions","event":"INSERT","payload":{"type":"INSERT","record":{"version":"2.0.0"}},"ref":null}"#;
        let notice = parse_insert(raw, "app_versions").unwrap();
        assert_eq!(notice.version.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn insert_without_record_still_notifies() {
        let raw = r#"{"topic":"realtime:public:app_versions","event":"postgres_changes","payload":{"data":{"type":"INSERT","table":"app_versions"}},"ref":null}"#;
        let notice = parse_insert(raw, "app_versions").unwrap();
        assert!(notice.version.is_none());
    }

    #[test]
    fn ignores_non_insert_frames() {
        let update = r#"{"topic":"realtime:public:app_versions","event":"postgres_changes","payload":{"data":{"type":"UPDATE","table":"app_versions"}},"ref":null}"#;
        let reply = r#"{"topic":"realtime:public:app_versions","event":"phx_reply","payload":{"status":"ok","response":{}},"ref":"1"}"#;
        let other_table = r#"{"topic":"realtime:public:prices","event":"postgres_changes","payload":{"data":{"type":"INSERT","table":"prices"}},"ref":null}"#;

        assert!(parse_insert(update, "app_versions").is_none());
        assert!(parse_insert(reply, "app_versions").is_none());
        assert!(parse_insert(other_table, "app_versions").is_none());
        assert!(parse_insert("not json", "app_versions").is_none());
    }

    #[test]
    fn join_reply_status_reads_status() {
        let ok = r#"{"topic":"realtime:public:app_versions","event":"phx_reply","payload":{"status":"ok"},"ref":"1"}"#;
        let heartbeat_reply = r#"{"topic":"phoenix","event":"phx_reply","payload":{"status":"ok"},"ref":"2"}"#;

        assert_eq!(join_reply_status(ok, "app_versions").as_deref(), Some("ok"));
        assert!(join_reply_status(heartbeat_reply, "app_versions").is_none());
    }

    #[test]
    fn detects_channel_close() {
        let closed = r#"{"topic":"realtime:public:app_versions","event":"phx_close","payload":{},"ref":null}"#;
        assert!(is_channel_closed(closed, "app_versions"));
        assert!(!is_channel_closed(closed, "prices"));
    }

    #[tokio::test]
    async fn feed_keeps_retrying_unreachable_socket() {
        let (tx, _rx) = super::super::traits::insert_bus(4);
        let feed = RealtimeFeed::spawn(
            "ws://127.0.0.1:9/realtime/v1/websocket".into(),
            "app_versions".into(),
            "anon".into(),
            tx,
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(feed.is_running());
    }
}
