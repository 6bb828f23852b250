use super::support::harness;
use gasolink_gate::session::SessionStore;
use gasolink_gate::{GateEvent, NavigationDecision, Tab, TabSelection};

#[tokio::test]
async fn anonymous_visitor_gets_six_switches_then_login_prompt() {
    let h = harness(false, Some("1.0.0"), 7);
    let mut events = h.gate.subscribe_events();
    h.gate.check_now().await;

    let mut nav = h.gate.navigator(Tab::Inicio);
    let route = [
        Tab::VeiculoConfig,
        Tab::Financeiro,
        Tab::PerfilUser,
        Tab::Inicio,
        Tab::VeiculoConfig,
        Tab::Financeiro,
    ];
    for tab in route {
        assert_eq!(nav.select(tab), TabSelection::Switched(tab));
    }
    assert_eq!(h.exhausted_calls(), 0);

    assert_eq!(
        nav.select(Tab::PerfilUser),
        TabSelection::Denied(NavigationDecision::DenyLoginRequired)
    );
    assert_eq!(nav.current(), Tab::Financeiro);
    assert_eq!(h.exhausted_calls(), 1);

    let budget = h.gate.gate().budget();
    assert_eq!(budget.used(), 6);
    assert_eq!(budget.remaining(), 0);

    assert_eq!(
        events.recv().await.unwrap(),
        GateEvent::LoginRequired {
            target: "perfil-user".into()
        }
    );
}

#[tokio::test]
async fn authenticated_user_navigates_freely() {
    let h = harness(true, Some("1.0.0"), 7);
    h.gate.check_now().await;

    let mut nav = h.gate.navigator(Tab::Inicio);
    for tab in Tab::ALL.iter().cycle().skip(1).take(30) {
        assert_eq!(nav.select(*tab), TabSelection::Switched(*tab));
    }
    assert_eq!(h.gate.gate().budget().used(), 0);
    assert_eq!(h.exhausted_calls(), 0);
}

#[test]
fn tapping_the_active_tab_costs_nothing() {
    let h = harness(false, None, 2);
    let mut nav = h.gate.navigator(Tab::Financeiro);

    for _ in 0..10 {
        assert_eq!(nav.select(Tab::Financeiro), TabSelection::Unchanged);
    }
    assert_eq!(h.gate.gate().budget().remaining(), 2);
}

#[test]
fn logging_in_after_exhaustion_unblocks_navigation() {
    let h = harness(false, None, 1);

    assert_eq!(
        h.gate.try_navigate(Tab::Financeiro),
        NavigationDecision::DenyLoginRequired
    );
    h.session.set_logged_in(true).unwrap();
    assert_eq!(h.gate.try_navigate(Tab::Financeiro), NavigationDecision::Allow);
    assert_eq!(h.exhausted_calls(), 1);
}
