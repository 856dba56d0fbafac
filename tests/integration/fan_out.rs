//! Concurrency of the probe fan-out

use std::sync::Arc;
use std::time::{Duration, Instant};

use status_watch::probe::{HttpProbe, ProbeOutcome, probe_all};
use status_watch::registry::Endpoint;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn test_hanging_probes_bounded_by_single_timeout() {
    let names = ["a", "b", "c", "d", "e"];
    let mut probe = ScriptedProbe::new();
    for name in &names[..4] {
        probe = probe.script(name, [Step::Hang]);
    }
    let endpoints: Vec<_> = names.iter().map(|n| endpoint(n)).collect();

    let budget = Duration::from_millis(300);
    let start = Instant::now();
    let results = probe_all(&probe, &endpoints, budget).await;
    let elapsed = start.elapsed();

    // 4 hanging probes in sequence would take 1.2s
    assert!(elapsed >= budget);
    assert!(elapsed < Duration::from_millis(900), "took {elapsed:?}");

    let order: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(order, names);

    for result in &results[..4] {
        match &result.outcome {
            ProbeOutcome::Unreachable { error } => assert!(error.contains("timed out")),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
    assert!(results[4].is_success());
}

#[tokio::test]
async fn test_slow_endpoint_does_not_delay_others() {
    let slow = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_status"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&slow)
        .await;

    let fast = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "ok", "retcode": 0})),
        )
        .mount(&fast)
        .await;

    let endpoints = vec![
        Endpoint::new("slow", slow.uri(), "t"),
        Endpoint::new("fast", fast.uri(), "t"),
    ];
    let probe = Arc::new(HttpProbe::new(Duration::from_millis(300), 0).unwrap());

    let start = Instant::now();
    let results = probe_all(probe.as_ref(), &endpoints, Duration::from_secs(2)).await;

    assert!(start.elapsed() < Duration::from_secs(2));
    assert!(!results[0].is_success());
    assert_eq!(results[1].status_code(), Some(200));
}

#[tokio::test]
async fn test_exhausted_retries_stay_unreachable() {
    // port 9 refuses every attempt
    let endpoints = vec![Endpoint::new("gone", "http://127.0.0.1:9", "t")];
    let probe = HttpProbe::new(Duration::from_millis(500), 2).unwrap();

    let results = probe_all(&probe, &endpoints, Duration::from_secs(2)).await;
    assert!(!results[0].is_success());
}
