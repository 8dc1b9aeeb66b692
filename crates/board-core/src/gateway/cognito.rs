//! Managed identity provider backend (Cognito user pool JSON API).
//!
//! Every operation is `POST {endpoint}/` with an `X-Amz-Target` header naming
//! the action. Errors carry their type in `__type`.

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use board_types::User;
use board_types::wire::{Credentials, Registration};
use hmac::{Hmac, Mac};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use sha2::Sha256;

use super::{Registered, RestAuth, SignIn, SignUpOutcome};
use crate::config::IdentityProviderConfig;
use crate::credentials::TokenSlot;
use crate::error::{AuthError, AuthErrorKind, BoardError, BoardResult};
use crate::http::{self, Endpoint};

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

type HmacSha256 = Hmac<Sha256>;

/// What kind of call failed, which decides how `NotAuthorizedException` reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    /// Password sign-in
    SignIn,
    /// Password change; the current password is checked server-side
    ChangePassword,
    /// Any call carrying the access token
    Token,
    /// Calls without user credentials (sign-up, forgot-password)
    Anonymous,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorReply {
    #[serde(rename = "__type", default)]
    kind: String,
    #[serde(alias = "Message", default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthReply {
    #[serde(default)]
    authentication_result: Option<AuthenticationResult>,
    #[serde(default)]
    challenge_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetUserReply {
    username: String,
    #[serde(default)]
    user_attributes: Vec<Attribute>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Attribute {
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpReply {
    #[serde(default)]
    user_confirmed: bool,
    #[serde(default)]
    user_sub: Option<String>,
}

impl GetUserReply {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.user_attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    fn into_user(self) -> User {
        User {
            id: self.attribute("sub").unwrap_or_default().to_string(),
            email: self.attribute("email").map(str::to_string),
            email_verified: self.attribute("email_verified") == Some("true"),
            username: self.username,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CognitoAuth {
    endpoint: Endpoint,
    client_id: String,
    client_secret: Option<String>,
    /// Username recovery has no provider action; it goes to the REST backend.
    rest: RestAuth,
}

impl CognitoAuth {
    pub fn from_config(
        config: &IdentityProviderConfig,
        http: reqwest::Client,
        token: TokenSlot,
        rest: RestAuth,
    ) -> Result<Self> {
        let client_id = config
            .client_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .context("No client id configured. Set client_id in [identity_provider].")?
            .to_string();
        let endpoint = config.effective_endpoint();
        url::Url::parse(&endpoint)
            .with_context(|| format!("Invalid identity provider endpoint: {endpoint}"))?;

        Ok(Self {
            endpoint: Endpoint::new(http, &endpoint, token),
            client_id,
            client_secret: config.effective_client_secret().map(str::to_string),
            rest,
        })
    }

    pub fn token(&self) -> &TokenSlot {
        self.endpoint.token()
    }

    /// `SECRET_HASH` for app clients with a secret:
    /// base64(HMAC-SHA256(secret, username + client_id)).
    fn secret_hash(&self, username: &str) -> Option<String> {
        let secret = self.client_secret.as_deref()?;
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
        mac.update(username.as_bytes());
        mac.update(self.client_id.as_bytes());
        Some(STANDARD.encode(mac.finalize().into_bytes()))
    }

    fn access_token(&self) -> BoardResult<String> {
        self.token()
            .get()
            .ok_or_else(|| BoardError::auth(AuthErrorKind::SessionExpired))
    }

    /// Sends one action and returns the raw reply body.
    async fn call(&self, action: &str, payload: &Value, call: Call) -> BoardResult<String> {
        let response = self
            .endpoint
            .request(Method::POST, "/")
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{action}"))
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .body(payload.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = classify_error(status, &body, call);
            tracing::debug!(action, status = status.as_u16(), error = %err, "identity provider call failed");
            return Err(err);
        }
        Ok(response.text().await?)
    }

    async fn call_json<T: DeserializeOwned>(
        &self,
        action: &str,
        payload: &Value,
        call: Call,
    ) -> BoardResult<T> {
        let body = self.call(action, payload, call).await?;
        http::decode(&body)
    }

    async fn fetch_user(&self, access_token: &str) -> BoardResult<User> {
        let reply: GetUserReply = self
            .call_json("GetUser", &json!({ "AccessToken": access_token }), Call::Token)
            .await?;
        Ok(reply.into_user())
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> BoardResult<SignIn> {
        let username = credentials.username.trim();
        let mut params = json!({
            "USERNAME": username,
            "PASSWORD": credentials.password,
        });
        if let Some(hash) = self.secret_hash(username) {
            params["SECRET_HASH"] = Value::String(hash);
        }
        let payload = json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": self.client_id,
            "AuthParameters": params,
        });

        let reply: InitiateAuthReply = self.call_json("InitiateAuth", &payload, Call::SignIn).await?;
        let Some(result) = reply.authentication_result else {
            let challenge = reply.challenge_name.unwrap_or_else(|| "unknown".to_string());
            return Err(AuthError::new(
                AuthErrorKind::Unknown,
                format!("Sign-in needs an unsupported challenge: {challenge}"),
            )
            .into());
        };

        let user = self.fetch_user(&result.access_token).await?;
        tracing::debug!(username = %user.username, "identity provider sign-in succeeded");
        Ok(SignIn {
            user,
            token: Some(result.access_token),
        })
    }

    pub async fn sign_up(&self, registration: &Registration) -> BoardResult<Registered> {
        let username = registration.username.trim();
        let mut attributes = vec![json!({ "Name": "email", "Value": registration.email })];
        if let Some(name) = registration.name.as_deref().filter(|n| !n.trim().is_empty()) {
            attributes.push(json!({ "Name": "name", "Value": name }));
        }
        let mut payload = json!({
            "ClientId": self.client_id,
            "Username": username,
            "Password": registration.password,
            "UserAttributes": attributes,
        });
        if let Some(hash) = self.secret_hash(username) {
            payload["SecretHash"] = Value::String(hash);
        }

        let body = self.call("SignUp", &payload, Call::Anonymous).await?;
        let reply: SignUpReply = http::decode_optional(&body)?.unwrap_or_default();
        let user = User {
            id: reply.user_sub.unwrap_or_default(),
            email: Some(registration.email.clone()),
            ..User::new(username)
        };
        Ok(Registered {
            outcome: SignUpOutcome {
                user,
                confirmation_required: !reply.user_confirmed,
            },
            token: None,
        })
    }

    pub async fn sign_out(&self) -> BoardResult<()> {
        let token = self.access_token()?;
        self.call("GlobalSignOut", &json!({ "AccessToken": token }), Call::Token)
            .await?;
        Ok(())
    }

    pub async fn get_current_user(&self) -> BoardResult<User> {
        let token = self.access_token()?;
        self.fetch_user(&token).await
    }

    pub async fn change_password(&self, current: &str, new: &str) -> BoardResult<()> {
        let token = self.access_token()?;
        let payload = json!({
            "PreviousPassword": current,
            "ProposedPassword": new,
            "AccessToken": token,
        });
        self.call("ChangePassword", &payload, Call::ChangePassword)
            .await?;
        Ok(())
    }

    pub async fn delete_account(&self) -> BoardResult<()> {
        let token = self.access_token()?;
        self.call("DeleteUser", &json!({ "AccessToken": token }), Call::Token)
            .await?;
        Ok(())
    }

    pub async fn request_username_recovery(&self, email: &str) -> BoardResult<()> {
        self.rest.request_username_recovery(email).await
    }

    pub async fn request_password_reset(&self, username: &str) -> BoardResult<()> {
        let username = username.trim();
        let mut payload = json!({
            "ClientId": self.client_id,
            "Username": username,
        });
        if let Some(hash) = self.secret_hash(username) {
            payload["SecretHash"] = Value::String(hash);
        }
        self.call("ForgotPassword", &payload, Call::Anonymous)
            .await?;
        Ok(())
    }
}

fn mentions_dead_token(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("token") && (lower.contains("expired") || lower.contains("revoked"))
}

/// Maps a provider error reply onto the error taxonomy.
pub fn classify_error(status: StatusCode, body: &str, call: Call) -> BoardError {
    let reply = match serde_json::from_str::<ErrorReply>(body) {
        Ok(reply) if !reply.kind.is_empty() => reply,
        _ => {
            return BoardError::Backend {
                status: status.as_u16(),
                message: http::error_message(status, body),
            };
        }
    };

    // `__type` may be namespaced: "com.amazonaws...#NotAuthorizedException".
    let kind = reply.kind.rsplit('#').next().unwrap_or_default();
    let message = reply
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| kind.to_string());
    let auth = |kind: AuthErrorKind| BoardError::Auth(AuthError::new(kind, message.clone()));

    match kind {
        "NotAuthorizedException" => {
            if call == Call::Token || mentions_dead_token(&message) {
                BoardError::auth(AuthErrorKind::SessionExpired)
            } else if matches!(call, Call::SignIn | Call::ChangePassword) {
                auth(AuthErrorKind::InvalidCredentials)
            } else {
                auth(AuthErrorKind::NotAuthorized)
            }
        }
        "UserNotConfirmedException" => auth(AuthErrorKind::UserNotConfirmed),
        "TooManyRequestsException" | "LimitExceededException" => auth(AuthErrorKind::RateLimited),
        "UserNotFoundException" => auth(AuthErrorKind::InvalidCredentials),
        "InvalidPasswordException" | "InvalidParameterException" => BoardError::Backend {
            status: 400,
            message,
        },
        _ => auth(AuthErrorKind::Unknown),
    }
}
