use super::support::{harness, record};
use gasolink_gate::platform::RecordingUrlOpener;
use gasolink_gate::{CheckOutcome, GateEvent, NavigationDecision, PollerState, Tab};
use std::time::Duration;

#[tokio::test]
async fn outdated_client_is_blocked_regardless_of_login() {
    for logged_in in [true, false] {
        let h = harness(logged_in, Some("1.1.0"), 7);
        assert_eq!(h.gate.check_now().await, CheckOutcome::Locked);

        for tab in Tab::ALL {
            assert_eq!(
                h.gate.try_navigate(tab),
                NavigationDecision::DenyUpdateRequired
            );
        }
        assert_eq!(h.gate.gate().budget().used(), 0);
    }
}

#[tokio::test]
async fn lock_survives_remote_rollback() {
    let h = harness(true, Some("1.1.0"), 7);
    h.gate.check_now().await;

    h.source.set_latest(Some(record("1.0.0")));
    assert_eq!(h.gate.check_now().await, CheckOutcome::AlreadyLocked);
    assert_eq!(h.gate.poller().state(), PollerState::Locked);
}

#[tokio::test]
async fn current_client_stays_idle_across_checks() {
    let h = harness(false, Some("1.0.0"), 7);
    for _ in 0..5 {
        assert_eq!(h.gate.check_now().await, CheckOutcome::UpToDate);
    }
    assert_eq!(h.gate.poller().state(), PollerState::Idle);
    assert!(h.gate.try_navigate(Tab::PerfilUser).is_allowed());
}

#[tokio::test]
async fn backend_outage_never_locks() {
    let h = harness(false, Some("9.0.0"), 7);
    h.source.fail_next(3);

    for _ in 0..3 {
        assert_eq!(h.gate.check_now().await, CheckOutcome::Failed);
    }
    assert!(!h.gate.is_locked());
}

#[tokio::test]
async fn mounted_gate_reacts_to_insert_notice() {
    let h = harness(false, Some("1.0.0"), 7);
    let mut events = h.gate.subscribe_events();
    assert!(h.gate.start());

    h.source.publish(record("1.0.1"));

    let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("update event within 2 seconds")
        .unwrap();
    assert!(matches!(event, GateEvent::UpdateRequired { ref version, .. } if version == "1.0.1"));
    assert!(h.gate.is_locked());

    h.gate.stop().await;
    assert!(!h.gate.is_running());
}

#[tokio::test]
async fn locked_client_opens_the_pending_download() {
    let h = harness(false, Some("2.0.0"), 7);
    let opener = RecordingUrlOpener::new();

    assert!(!h.gate.open_artifact(&opener).await.unwrap());
    h.gate.check_now().await;
    assert!(h.gate.open_artifact(&opener).await.unwrap());
    assert_eq!(
        opener.opened(),
        vec!["https://cdn.example.com/gasolink-2.0.0.apk"]
    );
}
