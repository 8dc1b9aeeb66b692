//! Shared helpers for board-core integration tests.

#![allow(dead_code)]

use board_core::Board;
use board_core::config::Config;
use board_core::credentials::TokenSlot;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token-0123456789abcdef";

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

pub fn config(uri: &str) -> Config {
    Config {
        api_base_url: uri.to_string(),
        ..Config::default()
    }
}

/// Anonymous board talking to `server`.
pub fn board(server: &MockServer) -> (Board, TokenSlot) {
    let token = TokenSlot::in_memory();
    let board = Board::with_token(&config(&server.uri()), token.clone()).unwrap();
    (board, token)
}

/// Board signed in as `alice` through a restored token.
pub async fn signed_in(server: &MockServer) -> (Board, TokenSlot) {
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "alice",
            "cognito_user_id": "sub-alice",
            "email": "alice@example.com"
        })))
        .mount(server)
        .await;

    let (mut board, token) = board(server);
    token.set(TOKEN).unwrap();
    board.restore_session().await;
    assert!(board.current_user().is_some(), "fixture sign-in failed");
    (board, token)
}

pub fn post_json(id: u64, content: &str, likes: u64) -> Value {
    json!({
        "id": id,
        "content": content,
        "userName": "alice",
        "category": "여행",
        "likes": likes,
        "comments": 0,
        "createdAt": "2024-05-01T10:00:00Z"
    })
}

/// Mounts `GET /posts` returning `posts`.
pub async fn mount_posts(server: &MockServer, posts: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(posts)))
        .mount(server)
        .await;
}
