//! Session flows against a mocked identity provider endpoint.

mod fixtures;

use board_core::config::{AuthBackendKind, Config};
use board_core::credentials::TokenSlot;
use board_core::validation::ChangePassword;
use board_core::{AuthErrorKind, Board, SessionStatus};
use board_types::wire::Credentials;
use fixtures::{TOKEN, can_bind_localhost};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TARGET: &str = "x-amz-target";

fn target(action: &str) -> String {
    format!("AWSCognitoIdentityProviderService.{action}")
}

/// Board whose identity provider and content API both point at `server`.
fn idp_board(server: &MockServer) -> (Board, TokenSlot) {
    let mut config = Config {
        api_base_url: server.uri(),
        ..Config::default()
    };
    config.auth.backend = AuthBackendKind::IdentityProvider;
    config.identity_provider.client_id = Some("client-123".to_string());
    config.identity_provider.endpoint = Some(server.uri());

    let token = TokenSlot::in_memory();
    let board = Board::with_token(&config, token.clone()).unwrap();
    (board, token)
}

async fn mount_get_user(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header(TARGET, target("GetUser").as_str()))
        .and(body_partial_json(json!({ "AccessToken": TOKEN })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Username": "alice",
            "UserAttributes": [
                { "Name": "sub", "Value": "sub-alice" },
                { "Name": "email", "Value": "alice@example.com" },
                { "Name": "email_verified", "Value": "true" }
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sign_in_then_fetch_profile() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header(TARGET, target("InitiateAuth").as_str()))
        .and(header("content-type", "application/x-amz-json-1.1"))
        .and(body_partial_json(json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": "client-123",
            "AuthParameters": { "USERNAME": "alice", "PASSWORD": "Secret1!" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AuthenticationResult": { "AccessToken": TOKEN, "ExpiresIn": 3600 }
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_get_user(&server).await;

    let (mut board, token) = idp_board(&server);
    let user = board
        .login(&Credentials::new("alice", "Secret1!"))
        .await
        .unwrap();

    assert_eq!(user.id, "sub-alice");
    assert!(user.email_verified);
    assert_eq!(board.session().status(), SessionStatus::Authenticated);
    assert_eq!(token.get().as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    if !can_bind_localhost() {
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header(TARGET, target("InitiateAuth").as_str()))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "NotAuthorizedException",
            "message": "Incorrect username or password."
        })))
        .mount(&server)
        .await;

    let (mut board, token) = idp_board(&server);
    let err = board
        .login(&Credentials::new("alice", "wrong"))
        .await
        .unwrap_err();

    assert_eq!(err.auth_kind(), Some(AuthErrorKind::InvalidCredentials));
    assert_eq!(err.to_string(), "Incorrect username or password.");
    assert_eq!(board.session().status(), SessionStatus::Anonymous);
    assert!(!token.is_present());
}

#[tokio::test]
async fn test_unconfirmed_user_is_reported() {
    if !can_bind_localhost() {
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header(TARGET, target("InitiateAuth").as_str()))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "UserNotConfirmedException",
            "message": "User is not confirmed."
        })))
        .mount(&server)
        .await;

    let (mut board, _) = idp_board(&server);
    let err = board
        .login(&Credentials::new("alice", "Secret1!"))
        .await
        .unwrap_err();
    assert_eq!(err.auth_kind(), Some(AuthErrorKind::UserNotConfirmed));
}

#[tokio::test]
async fn test_change_password_wrong_current_keeps_session() {
    if !can_bind_localhost() {
        return;
    }
    let server = MockServer::start().await;
    mount_get_user(&server).await;
    Mock::given(method("POST"))
        .and(header(TARGET, target("ChangePassword").as_str()))
        .and(body_partial_json(json!({
            "PreviousPassword": "old1!x",
            "ProposedPassword": "abc123!",
            "AccessToken": TOKEN
        })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "NotAuthorizedException",
            "message": "Incorrect username or password."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (mut board, token) = idp_board(&server);
    token.set(TOKEN).unwrap();
    board.restore_session().await;
    assert_eq!(board.session().status(), SessionStatus::Authenticated);

    let err = board
        .change_password(&ChangePassword::new("old1!x", "abc123!", "abc123!"))
        .await
        .unwrap_err();

    assert_eq!(err.auth_kind(), Some(AuthErrorKind::InvalidCredentials));
    assert_eq!(board.session().status(), SessionStatus::Authenticated);
    assert!(token.is_present());
}

#[tokio::test]
async fn test_revoked_token_expires_session() {
    if !can_bind_localhost() {
        return;
    }
    let server = MockServer::start().await;
    mount_get_user(&server).await;
    Mock::given(method("POST"))
        .and(header(TARGET, target("DeleteUser").as_str()))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "NotAuthorizedException",
            "message": "Access Token has been revoked"
        })))
        .mount(&server)
        .await;

    let (mut board, token) = idp_board(&server);
    token.set(TOKEN).unwrap();
    board.restore_session().await;

    let err = board.delete_account().await.unwrap_err();
    assert!(err.requires_login());
    assert_eq!(board.session().status(), SessionStatus::Anonymous);
    assert!(!token.is_present());
}

#[tokio::test]
async fn test_username_recovery_goes_to_rest_backend() {
    if !can_bind_localhost() {
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/find-username"))
        .and(body_partial_json(json!({ "email": "alice@example.com" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header(TARGET, target("ForgotPassword").as_str()))
        .and(body_partial_json(json!({ "ClientId": "client-123", "Username": "alice" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "CodeDeliveryDetails": { "DeliveryMedium": "EMAIL" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (board, _) = idp_board(&server);
    board
        .request_username_recovery("alice@example.com")
        .await
        .unwrap();
    board
        .request_password_reset("alice", "alice@example.com")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_sign_up_requires_confirmation() {
    if !can_bind_localhost() {
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header(TARGET, target("SignUp").as_str()))
        .and(body_partial_json(json!({ "ClientId": "client-123", "Username": "carol" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "UserConfirmed": false,
            "UserSub": "sub-carol"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (mut board, token) = idp_board(&server);
    let outcome = board
        .sign_up(&board_types::wire::Registration {
            username: "carol".into(),
            email: "carol@example.com".into(),
            password: "abc123!".into(),
            name: None,
        })
        .await
        .unwrap();

    assert!(outcome.confirmation_required);
    assert_eq!(outcome.user.id, "sub-carol");
    assert_eq!(board.session().status(), SessionStatus::Anonymous);
    assert!(!token.is_present());
}
