use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use uuid::Uuid;

use crackfleet::config::MinionConfig;
use crackfleet::minion::api::{router, MinionState};

// md5("050-0000005")
const HASH_AT_5: &str = "1a1674fc1f2ce010f161b4cd1ad80939";

fn test_state() -> MinionState {
    MinionState::new(MinionConfig {
        worker_threads: 2,
        cancellation_check_every: 50,
        subrange_min_size: 10,
    })
}

fn app(state: &MinionState) -> Router {
    router(state.clone())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    use tower::ServiceExt;
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn crack_body(job_id: Uuid, hash: &str, lo: u64, hi: u64) -> Value {
    json!({
        "job_id": job_id,
        "hash": hash,
        "scheme_name": "phone-05x",
        "lo": lo,
        "hi": hi,
    })
}

#[tokio::test]
async fn test_health_returns_ok() {
    let state = test_state();
    let (status, body) = send(app(&state), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_crack_finds_password() {
    let state = test_state();
    let job_id = Uuid::new_v4();
    let (status, body) = send(
        app(&state),
        post_json("/crack", crack_body(job_id, HASH_AT_5, 0, 100)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "FOUND");
    assert_eq!(body["password"], "050-0000005");
    assert_eq!(body["job_id"], job_id.to_string());
    assert_eq!(body["scheme_name"], "phone-05x");
}

#[tokio::test]
async fn test_crack_accepts_uppercase_hash() {
    let state = test_state();
    let job_id = Uuid::new_v4();
    let uppercase = HASH_AT_5.to_uppercase();
    let (status, body) = send(
        app(&state),
        post_json("/crack", crack_body(job_id, &uppercase, 0, 100)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "FOUND");
}

#[tokio::test]
async fn test_crack_not_found() {
    let state = test_state();
    let (status, body) = send(
        app(&state),
        post_json("/crack", crack_body(Uuid::new_v4(), HASH_AT_5, 100, 200)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "NOT_FOUND");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_crack_rejects_malformed_hash() {
    let state = test_state();
    let (status, body) = send(
        app(&state),
        post_json("/crack", crack_body(Uuid::new_v4(), "zznothex", 0, 10)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "INVALID_INPUT");
    assert!(body["error"].as_str().unwrap().contains("invalid MD5 hash"));
}

#[tokio::test]
async fn test_crack_rejects_unknown_scheme() {
    let state = test_state();
    let body = json!({
        "job_id": Uuid::new_v4(),
        "hash": HASH_AT_5,
        "scheme_name": "rainbow-table",
        "lo": 0,
        "hi": 10,
    });
    let (status, body) = send(app(&state), post_json("/crack", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_crack_rejects_out_of_bounds_range() {
    let state = test_state();
    let (_, body) = send(
        app(&state),
        post_json(
            "/crack",
            crack_body(Uuid::new_v4(), HASH_AT_5, 0, 100_000_000),
        ),
    )
    .await;
    assert_eq!(body["status"], "INVALID_INPUT");

    let (_, body) = send(
        app(&state),
        post_json("/crack", crack_body(Uuid::new_v4(), HASH_AT_5, 10, 5)),
    )
    .await;
    assert_eq!(body["status"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_cancel_is_idempotent() {
    let state = test_state();
    let job_id = Uuid::new_v4();

    // Cancelling a job the minion has never seen still succeeds.
    let (status, body) = send(app(&state), post_json("/cancel", json!({ "job_id": job_id }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (_, body) = send(app(&state), post_json("/cancel", json!({ "job_id": job_id }))).await;
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_crack_after_cancel_returns_cancelled() {
    let state = test_state();
    let job_id = Uuid::new_v4();

    let (_, body) = send(app(&state), post_json("/cancel", json!({ "job_id": job_id }))).await;
    assert_eq!(body["ok"], true);

    // check_every=50 over a 10k range: the flag is observed promptly.
    let (_, body) = send(
        app(&state),
        post_json("/crack", crack_body(job_id, HASH_AT_5, 1_000, 11_000)),
    )
    .await;
    assert_eq!(body["status"], "CANCELLED");
}

#[tokio::test]
async fn test_status_reflects_cancel_flag() {
    let state = test_state();
    let job_id = Uuid::new_v4();

    let (status, body) = send(app(&state), get(&format!("/status/{job_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cancelled"], false);

    send(app(&state), post_json("/cancel", json!({ "job_id": job_id }))).await;
    let (_, body) = send(app(&state), get(&format!("/status/{job_id}"))).await;
    assert_eq!(body["cancelled"], true);
}
