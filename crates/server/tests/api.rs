use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use engine::{Engine, MemoryStore};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower::ServiceExt;

async fn engine() -> Engine {
    Engine::builder()
        .store(Arc::new(MemoryStore::new()))
        .build()
        .await
        .unwrap()
}

async fn app() -> Router {
    server::router(Arc::new(engine().await))
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn call_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = call(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn create(app: &Router) -> String {
    let (status, body) = call_json(app, post_empty("/api/v1/wallet")).await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn create_wallet_returns_id_and_opening_balance() {
    let app = app().await;
    let (status, body) = call_json(&app, post_empty("/api/v1/wallet")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"].as_f64(), Some(100.0));
    assert!(body["id"].as_str().unwrap().parse::<uuid::Uuid>().is_ok());
}

#[tokio::test]
async fn status_of_created_wallet() {
    let app = app().await;
    let id = create(&app).await;

    let (status, body) = call_json(&app, get(&format!("/api/v1/wallet/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], json!(id));
    assert_eq!(body["balance"].as_f64(), Some(100.0));
}

#[tokio::test]
async fn status_of_unknown_or_malformed_wallet_is_404() {
    let app = app().await;

    let unknown = uuid::Uuid::new_v4();
    let (status, body) = call_json(&app, get(&format!("/api/v1/wallet/{unknown}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = call(&app, get("/api/v1/wallet/not-a-uuid")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn send_moves_funds_and_shows_in_both_histories() {
    let app = app().await;
    let a = create(&app).await;
    let b = create(&app).await;

    let (status, body) = call(
        &app,
        post_json(
            &format!("/api/v1/wallet/{a}/send"),
            json!({"to": b, "amount": 30}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let (_, wallet_a) = call_json(&app, get(&format!("/api/v1/wallet/{a}"))).await;
    let (_, wallet_b) = call_json(&app, get(&format!("/api/v1/wallet/{b}"))).await;
    assert_eq!(wallet_a["balance"].as_f64(), Some(70.0));
    assert_eq!(wallet_b["balance"].as_f64(), Some(130.0));

    for id in [&a, &b] {
        let (status, history) =
            call_json(&app, get(&format!("/api/v1/wallet/{id}/history"))).await;
        assert_eq!(status, StatusCode::OK);
        let items = history.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["from"], json!(a));
        assert_eq!(items[0]["to"], json!(b));
        assert_eq!(items[0]["amount"].as_f64(), Some(30.0));
        assert!(items[0]["timestamp"].is_string());
    }
}

#[tokio::test]
async fn send_accepts_cents() {
    let app = app().await;
    let a = create(&app).await;
    let b = create(&app).await;

    let (status, _) = call(
        &app,
        post_json(
            &format!("/api/v1/wallet/{a}/send"),
            json!({"to": b, "amount": 0.35}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, wallet_a) = call_json(&app, get(&format!("/api/v1/wallet/{a}"))).await;
    assert_eq!(wallet_a["balance"].as_f64(), Some(99.65));
}

#[tokio::test]
async fn send_rejects_bad_bodies_with_400() {
    let app = app().await;
    let a = create(&app).await;
    let b = create(&app).await;
    let uri = format!("/api/v1/wallet/{a}/send");

    let bodies = [
        json!({"to": b}),
        json!({"amount": 10}),
        json!({"to": b, "amount": "10"}),
        json!({"to": b, "amount": 0.001}),
    ];
    for body in bodies {
        let (status, _) = call(&app, post_json(&uri, body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let garbage = Request::post(&uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = call(&app, garbage).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, wallet_a) = call_json(&app, get(&format!("/api/v1/wallet/{a}"))).await;
    assert_eq!(wallet_a["balance"].as_f64(), Some(100.0));
}

#[tokio::test]
async fn send_rejects_invalid_amounts_with_400() {
    let app = app().await;
    let a = create(&app).await;
    let b = create(&app).await;
    let uri = format!("/api/v1/wallet/{a}/send");

    for amount in [json!(0), json!(-5)] {
        let (status, _) = call(&app, post_json(&uri, json!({"to": b, "amount": amount}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _) = call(&app, post_json(&uri, json!({"to": a, "amount": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn send_with_insufficient_funds_is_400() {
    let app = app().await;
    let a = create(&app).await;
    let b = create(&app).await;

    let (status, body) = call_json(
        &app,
        post_json(
            &format!("/api/v1/wallet/{a}/send"),
            json!({"to": b, "amount": 100.01}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, history) = call_json(&app, get(&format!("/api/v1/wallet/{a}/history"))).await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn send_from_or_to_unknown_wallet_is_404() {
    let app = app().await;
    let a = create(&app).await;
    let ghost = uuid::Uuid::new_v4().to_string();

    let (status, _) = call(
        &app,
        post_json(
            &format!("/api/v1/wallet/{ghost}/send"),
            json!({"to": a, "amount": 1}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        post_json(
            &format!("/api/v1/wallet/{a}/send"),
            json!({"to": ghost, "amount": 1}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        post_json(
            &format!("/api/v1/wallet/{a}/send"),
            json!({"to": "nobody", "amount": 1}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        post_json(
            "/api/v1/wallet/nobody/send",
            json!({"to": a, "amount": 1}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, wallet_a) = call_json(&app, get(&format!("/api/v1/wallet/{a}"))).await;
    assert_eq!(wallet_a["balance"].as_f64(), Some(100.0));
}

#[tokio::test]
async fn history_of_unknown_wallet_is_404() {
    let app = app().await;
    let ghost = uuid::Uuid::new_v4();

    let (status, _) = call(&app, get(&format!("/api/v1/wallet/{ghost}/history"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn history_honours_requested_order() {
    let app = app().await;
    let a = create(&app).await;
    let b = create(&app).await;
    let uri = format!("/api/v1/wallet/{a}/send");

    for amount in [1, 2, 3] {
        let (status, _) = call(&app, post_json(&uri, json!({"to": b, "amount": amount}))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let amounts = |history: Value| -> Vec<f64> {
        history
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["amount"].as_f64().unwrap())
            .collect()
    };

    let (_, history) = call_json(&app, get(&format!("/api/v1/wallet/{a}/history"))).await;
    assert_eq!(amounts(history), vec![1.0, 2.0, 3.0]);

    let (_, history) = call_json(
        &app,
        get(&format!("/api/v1/wallet/{b}/history?order=newest_first")),
    )
    .await;
    assert_eq!(amounts(history), vec![3.0, 2.0, 1.0]);

    let (status, _) = call(
        &app,
        get(&format!("/api/v1/wallet/{a}/history?order=sideways")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn spawned_server_answers_over_tcp() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = server::spawn_with_listener(engine().await, listener).unwrap();

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(
            b"POST /api/v1/wallet HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("\"balance\":100.0"), "{response}");
}
