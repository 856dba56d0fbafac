//! Query API tests (router driven in-process)

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use status_watch::api::{ApiState, router};
use status_watch::query::NO_ANOMALIES;
use tower::ServiceExt;

use crate::helpers::*;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn state(probe: ScriptedProbe) -> ApiState {
    let monitor = create_monitor(
        settings(2, Duration::from_secs(1), None),
        vec![endpoint("alpha"), endpoint("beta")],
        Arc::new(probe),
    );
    ApiState::new(monitor)
}

#[tokio::test]
async fn test_health_reports_endpoint_count() {
    let app = router(state(ScriptedProbe::new()), None);

    let response = app
        .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["endpoints"], 2);
}

#[tokio::test]
async fn test_incidents_empty_before_any_cycle() {
    let app = router(state(ScriptedProbe::new()), None);

    let response = app
        .oneshot(Request::get("/api/v1/incidents").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["count"], 0);
    assert_eq!(json["report"], NO_ANOMALIES);
}

#[tokio::test]
async fn test_check_runs_cycle_and_returns_snapshot() {
    let probe = ScriptedProbe::new().script("beta", [Step::Status(503), Step::Status(503)]);
    let app = router(state(probe), None);

    let check = || Request::post("/api/v1/check").body(Body::empty()).unwrap();

    let first = body_json(app.clone().oneshot(check()).await.unwrap()).await;
    assert_eq!(first["count"], 1);
    assert_eq!(first["incidents"][0]["name"], "beta");
    assert_eq!(first["incidents"][0]["kind"], "protocol_error");
    assert_eq!(first["incidents"][0]["reported"], false);

    let second = body_json(app.clone().oneshot(check()).await.unwrap()).await;
    assert_eq!(second["incidents"][0]["count"], 2);
    assert_eq!(second["incidents"][0]["reported"], true);
    assert!(second["report"].as_str().unwrap().contains("Status: HTTP 503"));

    // plain query does not probe again
    let listed = body_json(
        app.oneshot(Request::get("/api/v1/incidents").body(Body::empty()).unwrap())
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(listed["incidents"][0]["count"], 2);
}

#[tokio::test]
async fn test_token_required_when_configured() {
    let app = router(state(ScriptedProbe::new()), Some("sekret".to_string()));

    let missing = app
        .clone()
        .oneshot(Request::get("/api/v1/incidents").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let wrong = app
        .clone()
        .oneshot(
            Request::get("/api/v1/incidents")
                .header("Authorization", "Bearer nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::FORBIDDEN);

    let ok = app
        .clone()
        .oneshot(
            Request::get("/api/v1/incidents")
                .header("Authorization", "Bearer sekret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);

    // liveness stays open
    let health = app
        .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_stopped_tracker_is_service_unavailable() {
    let state = state(ScriptedProbe::new());
    state.monitor.tracker().shutdown().await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    let response = router(state, None)
        .oneshot(Request::get("/api/v1/incidents").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(body_json(response).await["error"].is_string());
}
