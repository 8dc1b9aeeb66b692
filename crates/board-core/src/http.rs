//! HTTP plumbing shared by the auth gateways and the content client.

use std::time::Duration;

use board_types::wire::ErrorBody;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::credentials::TokenSlot;
use crate::error::{AuthError, AuthErrorKind, BoardError, BoardResult};

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("board/", env!("CARGO_PKG_VERSION"));

/// How a request authenticates, which decides how a 401 is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// No credentials (find-username, reset-password, public reads)
    None,
    /// Username/password exchange; 401 means the credentials were wrong
    SignIn,
    /// Bearer token from the slot; 401 means the session is gone
    Bearer,
}

/// Builds the reqwest client used for every backend.
pub fn build_client(timeout: Option<Duration>) -> anyhow::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))
}

/// Base URL plus token slot; resolves paths and attaches credentials.
#[derive(Debug, Clone)]
pub struct Endpoint {
    http: reqwest::Client,
    base_url: String,
    token: TokenSlot,
}

impl Endpoint {
    pub fn new(http: reqwest::Client, base_url: &str, token: TokenSlot) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &TokenSlot {
        &self.token
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Attaches the bearer token when `auth` asks for it.
    ///
    /// Fails before sending when a bearer call has no token to send.
    pub fn authorize(&self, builder: RequestBuilder, auth: Auth) -> BoardResult<RequestBuilder> {
        if auth != Auth::Bearer {
            return Ok(builder);
        }
        match self.token.get() {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Err(AuthError::new(AuthErrorKind::NotAuthorized, "Log in to continue").into()),
        }
    }

    /// Sends the request and returns the raw body of a successful reply.
    pub async fn send(&self, builder: RequestBuilder, auth: Auth) -> BoardResult<String> {
        let response = self.authorize(builder, auth)?.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body, auth));
        }
        Ok(response.text().await?)
    }

    /// Sends the request and decodes a JSON reply.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        auth: Auth,
    ) -> BoardResult<T> {
        let body = self.send(builder, auth).await?;
        decode(&body)
    }

    /// Sends the request and decodes the reply if it carries a body.
    pub async fn send_optional_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        auth: Auth,
    ) -> BoardResult<Option<T>> {
        let body = self.send(builder, auth).await?;
        decode_optional(&body)
    }
}

pub fn decode<T: DeserializeOwned>(body: &str) -> BoardResult<T> {
    serde_json::from_str(body)
        .map_err(|e| BoardError::Network(format!("failed to decode response: {e}")))
}

/// Empty bodies (and a literal `null`) decode to `None`.
pub fn decode_optional<T: DeserializeOwned>(body: &str) -> BoardResult<Option<T>> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    decode(trimmed).map(Some)
}

/// Extracts the server message from an error body.
///
/// Order: JSON `message`, JSON `error`, raw body, `HTTP <status>`.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body)
        && let Some(text) = parsed.text()
    {
        return text.trim().to_string();
    }
    let raw = body.trim();
    if raw.is_empty() || raw.starts_with('{') {
        format!("HTTP {}", status.as_u16())
    } else {
        raw.to_string()
    }
}

/// Maps a non-2xx REST reply onto the error taxonomy.
pub fn classify_status(status: StatusCode, body: &str, auth: Auth) -> BoardError {
    let message = error_message(status, body);
    let has_server_message = !message.starts_with("HTTP ");
    let auth_error = |kind: AuthErrorKind| {
        if has_server_message {
            BoardError::Auth(AuthError::new(kind, message.clone()))
        } else {
            BoardError::auth(kind)
        }
    };

    match (status, auth) {
        (StatusCode::UNAUTHORIZED, Auth::SignIn) => auth_error(AuthErrorKind::InvalidCredentials),
        (StatusCode::UNAUTHORIZED, Auth::Bearer) => BoardError::auth(AuthErrorKind::SessionExpired),
        (StatusCode::FORBIDDEN, _) => auth_error(AuthErrorKind::NotAuthorized),
        (StatusCode::TOO_MANY_REQUESTS, _) => auth_error(AuthErrorKind::RateLimited),
        _ => BoardError::Backend {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use super::*;

    #[tokio::test]
    async fn test_truncated_body_is_a_network_error() {
        let Ok(listener) = std::net::TcpListener::bind("127.0.0.1:0") else {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        };
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => return,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 50\r\n\r\nshort");
        });

        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        let endpoint = Endpoint::new(http, &format!("http://{addr}"), TokenSlot::in_memory());
        let builder = endpoint.request(reqwest::Method::GET, "/posts");
        let err = endpoint.send(builder, Auth::None).await.unwrap_err();
        assert!(matches!(err, BoardError::Network(_)), "{err:?}");
    }

    #[test]
    fn test_unauthorized_depends_on_call() {
        let sign_in = classify_status(StatusCode::UNAUTHORIZED, "", Auth::SignIn);
        assert_eq!(sign_in.auth_kind(), Some(AuthErrorKind::InvalidCredentials));

        let bearer = classify_status(StatusCode::UNAUTHORIZED, "", Auth::Bearer);
        assert!(bearer.is_session_expired());

        let anonymous = classify_status(StatusCode::UNAUTHORIZED, "", Auth::None);
        assert!(matches!(anonymous, BoardError::Backend { status: 401, .. }));
    }

    #[test]
    fn test_forbidden_and_rate_limit() {
        let err = classify_status(
            StatusCode::FORBIDDEN,
            r#"{"message":"Not your post"}"#,
            Auth::Bearer,
        );
        assert_eq!(err.auth_kind(), Some(AuthErrorKind::NotAuthorized));
        assert_eq!(err.to_string(), "Not your post");

        let err = classify_status(StatusCode::TOO_MANY_REQUESTS, "", Auth::None);
        assert_eq!(err.auth_kind(), Some(AuthErrorKind::RateLimited));
    }

    #[test]
    fn test_backend_message_fallbacks() {
        assert_eq!(
            error_message(StatusCode::CONFLICT, r#"{"message":"Username taken"}"#),
            "Username taken"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
        assert_eq!(error_message(StatusCode::INTERNAL_SERVER_ERROR, ""), "HTTP 500");
        assert_eq!(error_message(StatusCode::INTERNAL_SERVER_ERROR, "{}"), "HTTP 500");
    }

    #[test]
    fn test_decode_optional_accepts_empty_body() {
        assert_eq!(decode_optional::<u32>("").unwrap(), None);
        assert_eq!(decode_optional::<u32>(" null ").unwrap(), None);
        assert_eq!(decode_optional::<u32>("7").unwrap(), Some(7));
        assert!(decode_optional::<u32>("nope").is_err());
    }

    #[test]
    fn test_url_joins_paths() {
        let endpoint = Endpoint::new(
            reqwest::Client::new(),
            "http://localhost:8080/",
            TokenSlot::in_memory(),
        );
        assert_eq!(endpoint.url("/posts"), "http://localhost:8080/posts");
        assert_eq!(endpoint.url("posts/1"), "http://localhost:8080/posts/1");
    }

    #[test]
    fn test_bearer_without_token_fails_before_sending() {
        let endpoint = Endpoint::new(
            reqwest::Client::new(),
            "http://localhost:8080",
            TokenSlot::in_memory(),
        );
        let builder = endpoint.request(reqwest::Method::GET, "/users/me");
        let err = endpoint.authorize(builder, Auth::Bearer).unwrap_err();
        assert_eq!(err.auth_kind(), Some(AuthErrorKind::NotAuthorized));
    }
}
