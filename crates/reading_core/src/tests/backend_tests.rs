use super::*;
use crate::test_support::{card, refused_backend_url, spawn_backend};
use axum::{
    routing::{get, post},
    Json, Router,
};

async fn echo_interpret(Json(request): Json<InterpretRequest>) -> Json<InterpretResponse> {
    Json(InterpretResponse {
        interpretation: format!("{} / {}", request.question, request.cards.join(",")),
        advice: "천천히 나아가세요".to_string(),
    })
}

async fn echo_follow_up(Json(request): Json<FollowUpRequest>) -> Json<FollowUpResponse> {
    Json(FollowUpResponse {
        response: format!("answer: {}", request.question),
    })
}

async fn server_error() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn not_json() -> &'static str {
    "the oracle is sleeping"
}

async fn slow_interpret() -> Json<InterpretResponse> {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(InterpretResponse {
        interpretation: "too late".to_string(),
        advice: String::new(),
    })
}

fn backend(base_url: &str) -> HttpReadingBackend {
    HttpReadingBackend::new(base_url, Duration::from_secs(5)).expect("client")
}

#[tokio::test]
async fn interpret_posts_question_and_card_names() {
    let base_url = spawn_backend(Router::new().route(INTERPRET_PATH, post(echo_interpret))).await;
    let request = InterpretRequest::new("이직을 해야 할까요?", &[card(0), card(6), card(19)]);

    let response = backend(&base_url).interpret(&request).await.expect("interpret");

    assert_eq!(response.interpretation, "이직을 해야 할까요? / 바보,연인,태양");
    assert_eq!(response.advice, "천천히 나아가세요");
}

#[tokio::test]
async fn follow_up_returns_response_text() {
    let base_url = spawn_backend(Router::new().route(FOLLOW_UP_PATH, post(echo_follow_up))).await;
    let request = FollowUpRequest::new("언제쯤일까요?", &[card(7)]);

    let response = backend(&base_url).follow_up(&request).await.expect("follow up");

    assert_eq!(response.response, "answer: 언제쯤일까요?");
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let base_url = spawn_backend(Router::new().route(INTERPRET_PATH, post(echo_interpret))).await;
    let client = backend(&format!("{base_url}/"));
    assert_eq!(client.base_url(), base_url);

    let request = InterpretRequest::new("q", &[card(1)]);
    client.interpret(&request).await.expect("interpret");
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let base_url = spawn_backend(Router::new().route(INTERPRET_PATH, post(server_error))).await;
    let request = InterpretRequest::new("q", &[card(1)]);

    let err = backend(&base_url)
        .interpret(&request)
        .await
        .expect_err("must fail");

    assert!(
        matches!(err, BackendError::Status { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn malformed_body_is_reported() {
    let base_url = spawn_backend(Router::new().route(FOLLOW_UP_PATH, post(not_json))).await;
    let request = FollowUpRequest::new("q", &[card(1)]);

    let err = backend(&base_url)
        .follow_up(&request)
        .await
        .expect_err("must fail");

    assert!(matches!(err, BackendError::Malformed { .. }), "unexpected error: {err}");
}

#[tokio::test]
async fn slow_backend_times_out() {
    let base_url = spawn_backend(Router::new().route(INTERPRET_PATH, post(slow_interpret))).await;
    let client = HttpReadingBackend::new(&base_url, Duration::from_millis(200)).expect("client");
    let request = InterpretRequest::new("q", &[card(1)]);

    let err = client.interpret(&request).await.expect_err("must time out");

    assert!(matches!(err, BackendError::Timeout { .. }), "unexpected error: {err}");
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    let base_url = refused_backend_url().await;
    let request = InterpretRequest::new("q", &[card(1)]);

    let err = backend(&base_url)
        .interpret(&request)
        .await
        .expect_err("must fail");

    assert!(matches!(err, BackendError::Transport { .. }), "unexpected error: {err}");
}

#[tokio::test]
async fn health_reflects_status_and_reachability() {
    let healthy = spawn_backend(Router::new().route(HEALTH_PATH, get(|| async { "ok" }))).await;
    assert!(backend(&healthy).health().await);

    let unhealthy = spawn_backend(Router::new().route(HEALTH_PATH, get(server_error))).await;
    assert!(!backend(&unhealthy).health().await);

    let unreachable = refused_backend_url().await;
    assert!(!backend(&unreachable).health().await);
}

#[tokio::test]
async fn missing_backend_always_fails() {
    let request = InterpretRequest::new("q", &[card(1)]);
    assert!(matches!(
        MissingReadingBackend.interpret(&request).await,
        Err(BackendError::Unavailable)
    ));
    assert!(!MissingReadingBackend.health().await);
}
