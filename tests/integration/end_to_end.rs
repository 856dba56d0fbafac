//! Full cycles: probe, classify, track, alert

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use status_watch::classify::ErrorKind;
use status_watch::config::{Alert, Webhook};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn test_threshold_incident_and_recovery() {
    use Step::*;

    let probe = ScriptedProbe::new().script(
        "bot",
        [Unreachable, Unreachable, Unreachable, Unreachable, Unreachable, Healthy],
    );
    let monitor = create_monitor(
        settings(3, Duration::from_secs(1), None),
        vec![endpoint("bot")],
        Arc::new(probe),
    );

    let cycle1 = monitor.run_cycle().await.unwrap();
    let cycle2 = monitor.run_cycle().await.unwrap();
    assert!(cycle1.incidents.is_empty());
    assert!(cycle2.incidents.is_empty());

    let cycle3 = monitor.run_cycle().await.unwrap();
    assert_eq!(cycle3.incidents.len(), 1);
    let incident = &cycle3.incidents[0];
    assert_eq!(incident.name, "bot");
    assert_eq!(incident.address, "http://bot.test:8080");
    assert_eq!(incident.kind, ErrorKind::Unreachable);
    assert_eq!(incident.reason, "connection refused");
    assert_eq!(incident.count, 3);

    for _ in 4..=5 {
        let cycle = monitor.run_cycle().await.unwrap();
        assert!(cycle.incidents.is_empty());
        assert!(cycle.recoveries.is_empty());
    }

    let snapshot = monitor.outstanding().await.unwrap();
    assert_eq!(snapshot[0].count, 5);
    assert!(snapshot[0].reported);

    let cycle6 = monitor.run_cycle().await.unwrap();
    assert_eq!(cycle6.recoveries.len(), 1);
    assert_eq!(cycle6.recoveries[0].count, 5);
    assert!(monitor.outstanding().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_kind_change_restarts_debounce() {
    use Step::*;

    let probe = ScriptedProbe::new().script(
        "bot",
        [Unreachable, Unreachable, Status(500), Status(500)],
    );
    let monitor = create_monitor(
        settings(2, Duration::from_secs(1), None),
        vec![endpoint("bot")],
        Arc::new(probe),
    );

    monitor.run_cycle().await.unwrap();
    assert_eq!(monitor.run_cycle().await.unwrap().incidents.len(), 1);

    // different error kind: count restarts at 1 without recovery in between
    let third = monitor.run_cycle().await.unwrap();
    assert!(third.incidents.is_empty());
    assert!(third.recoveries.is_empty());
    let snapshot = monitor.outstanding().await.unwrap();
    assert_eq!(snapshot[0].kind, ErrorKind::ProtocolError);
    assert_eq!(snapshot[0].reason, "HTTP 500");
    assert_eq!(snapshot[0].count, 1);
    assert!(!snapshot[0].reported);

    let fourth = monitor.run_cycle().await.unwrap();
    assert_eq!(fourth.incidents[0].kind, ErrorKind::ProtocolError);
}

#[tokio::test]
async fn test_incident_is_sent_to_webhook_once() {
    let sink = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/alerts"))
        .and(body_partial_json(serde_json::json!({"endpoint": "bot", "count": 2})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&sink)
        .await;

    let alert = Alert::Webhook(Webhook {
        url: format!("{}/alerts", sink.uri()),
    });
    let probe = ScriptedProbe::new().script("bot", vec![Step::Unreachable; 7]);
    let monitor = create_monitor(
        settings(2, Duration::from_secs(1), Some(alert)),
        vec![endpoint("bot"), endpoint("fine")],
        Arc::new(probe),
    );

    for _ in 0..6 {
        monitor.run_cycle().await.unwrap();
    }

    // `expect(1)` is verified when the mock server drops
    let snapshot = monitor.check_now().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].name, "bot");
}

#[tokio::test]
async fn test_http_probe_against_real_endpoint() {
    use status_watch::probe::HttpProbe;
    use status_watch::registry::Endpoint;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "failed", "retcode": 1})),
        )
        .mount(&server)
        .await;

    let probe = HttpProbe::new(Duration::from_secs(2), 0).unwrap();
    let monitor = create_monitor(
        settings(1, Duration::from_secs(2), None),
        vec![Endpoint::new("bot", server.uri(), "t")],
        Arc::new(probe),
    );

    let report = monitor.run_cycle().await.unwrap();
    assert_eq!(report.incidents.len(), 1);
    assert_eq!(report.incidents[0].kind, ErrorKind::ApplicationError);
    assert_eq!(report.incidents[0].reason, "status=failed, retcode=1");
}
