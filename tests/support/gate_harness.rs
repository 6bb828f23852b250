#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;
use gasolink_gate::GateConfig;
use gasolink_gate::runtime::VersionGate;
use gasolink_gate::session::MemorySessionStore;
use gasolink_gate::source::{MemoryVersionSource, VersionSource};
use gasolink_gate::version::VersionRecord;

pub const INSTALLED: &str = "1.0.0";

pub struct Harness {
    pub gate: VersionGate,
    pub source: Arc<MemoryVersionSource>,
    pub session: Arc<MemorySessionStore>,
    exhausted: Arc<AtomicUsize>,
}

impl Harness {
    pub fn exhausted_calls(&self) -> usize {
        self.exhausted.load(Ordering::SeqCst)
    }
}

pub fn record(version: &str) -> VersionRecord {
    VersionRecord::new(
        version,
        format!("https://cdn.example.com/gasolink-{version}.apk"),
        Utc::now(),
    )
}

pub fn test_config(max_clicks: u32) -> GateConfig {
    let mut config = GateConfig::default();
    config.version_gate.installed_version = INSTALLED.into();
    config.version_gate.realtime = false;
    config.click_budget.max_clicks = max_clicks;
    config.observability.backend = "none".into();
    config
}

pub fn harness(logged_in: bool, latest: Option<&str>, max_clicks: u32) -> Harness {
    let source = Arc::new(match latest {
        Some(version) => MemoryVersionSource::with_latest(record(version)),
        None => MemoryVersionSource::new(),
    });
    let session = Arc::new(MemorySessionStore::new(logged_in));
    let exhausted = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&exhausted);

    let gate = VersionGate::with_parts(
        &test_config(max_clicks),
        Arc::clone(&source) as Arc<dyn VersionSource>,
        Arc::clone(&session) as Arc<dyn gasolink_gate::SessionStore>,
        move || {
            hits.fetch_add(1, Ordering::SeqCst);
        },
    )
    .expect("harness config is valid");

    Harness {
        gate,
        source,
        session,
        exhausted,
    }
}
