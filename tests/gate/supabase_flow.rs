use super::support::test_config;
use gasolink_gate::runtime::VersionGate;
use gasolink_gate::{CheckOutcome, NavigationDecision, Tab};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn supabase_config(uri: &str, session_dir: &tempfile::TempDir) -> gasolink_gate::GateConfig {
    let mut config = test_config(7);
    config.supabase.url = Some(uri.into());
    config.supabase.anon_key = Some("anon-key".into());
    config.session.store_path = session_dir
        .path()
        .join("session.json")
        .display()
        .to_string();
    config
}

#[tokio::test]
async fn newer_row_in_app_versions_locks_the_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/app_versions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"version":"1.2.0","apk_url":"https://cdn.example.com/1.2.0.apk","created_at":"2026-09-01T12:00:00Z"}]"#,
        ))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let gate = VersionGate::from_config(&supabase_config(&server.uri(), &dir)).unwrap();

    assert_eq!(gate.check_now().await, CheckOutcome::Locked);
    assert_eq!(
        gate.try_navigate(Tab::Financeiro),
        NavigationDecision::DenyUpdateRequired
    );
    assert_eq!(
        gate.poller().pending_artifact_url().as_deref(),
        Some("https://cdn.example.com/1.2.0.apk")
    );
}

#[tokio::test]
async fn server_error_leaves_the_client_usable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/app_versions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let gate = VersionGate::from_config(&supabase_config(&server.uri(), &dir)).unwrap();

    assert_eq!(gate.check_now().await, CheckOutcome::Failed);
    assert!(gate.try_navigate(Tab::Financeiro).is_allowed());
}

#[tokio::test]
async fn persisted_login_skips_the_throttle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/app_versions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("session.json"), r#"{"loggedIn":"true"}"#).unwrap();
    let gate = VersionGate::from_config(&supabase_config(&server.uri(), &dir)).unwrap();

    assert_eq!(gate.check_now().await, CheckOutcome::NoRecord);
    for _ in 0..10 {
        assert!(gate.try_navigate(Tab::PerfilUser).is_allowed());
    }
    assert_eq!(gate.gate().budget().used(), 0);
}

#[tokio::test]
async fn stopping_the_gate_closes_the_realtime_socket() {
    use futures_util::StreamExt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    // Websocket-only endpoint; plain REST reads fail and the gate stays open.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    let opened = Arc::new(AtomicUsize::new(0));
    let closed = Arc::new(AtomicUsize::new(0));
    let (opened_tx, closed_tx) = (Arc::clone(&opened), Arc::clone(&closed));
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let (opened, closed) = (Arc::clone(&opened_tx), Arc::clone(&closed_tx));
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                opened.fetch_add(1, Ordering::SeqCst);
                while let Some(Ok(_)) = ws.next().await {}
                closed.fetch_add(1, Ordering::SeqCst);
            });
        }
    });
    let count_reaches = |counter: Arc<AtomicUsize>, expected: usize| async move {
        for _ in 0..200 {
            if counter.load(Ordering::SeqCst) == expected {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    };

    let dir = tempfile::tempdir().unwrap();
    let mut config = supabase_config(&uri, &dir);
    config.version_gate.realtime = true;
    let gate = VersionGate::from_config(&config).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(opened.load(Ordering::SeqCst), 0);

    assert!(gate.start());
    assert!(count_reaches(Arc::clone(&opened), 1).await);

    gate.stop().await;
    assert!(count_reaches(Arc::clone(&closed), 1).await);
    assert!(!gate.is_running());
    assert!(gate.try_navigate(Tab::Inicio).is_allowed());
}
