//! REST auth endpoints served next to the content API.

use board_types::User;
use board_types::wire::{
    AuthReply, Credentials, EmailBody, PasswordChangeBody, PasswordResetBody, Registration,
};
use reqwest::Method;
use serde::Deserialize;

use super::{Registered, SignIn, SignUpOutcome};
use crate::credentials::TokenSlot;
use crate::error::BoardResult;
use crate::http::{Auth, Endpoint};

/// Logout is not under the auth prefix.
const LOGOUT_PATH: &str = "/auth/logout";
const CURRENT_USER_PATH: &str = "/users/me";

/// `/users/me` replies with the user, sometimes wrapped as `{user: ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum UserEnvelope {
    Wrapped { user: User },
    Bare(User),
}

impl UserEnvelope {
    fn into_user(self) -> User {
        match self {
            UserEnvelope::Wrapped { user } | UserEnvelope::Bare(user) => user,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RestAuth {
    endpoint: Endpoint,
    prefix: String,
}

impl RestAuth {
    pub fn new(http: reqwest::Client, base_url: &str, prefix: &str, token: TokenSlot) -> Self {
        Self {
            endpoint: Endpoint::new(http, base_url, token),
            prefix: normalize_prefix(prefix),
        }
    }

    pub fn token(&self) -> &TokenSlot {
        self.endpoint.token()
    }

    fn auth_path(&self, op: &str) -> String {
        format!("{}/{op}", self.prefix)
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> BoardResult<SignIn> {
        let request = self
            .endpoint
            .request(Method::POST, &self.auth_path("login"))
            .json(credentials);
        let reply: AuthReply = self.endpoint.send_json(request, Auth::SignIn).await?;

        let token = reply.access_token.filter(|t| !t.trim().is_empty());
        let user = reply
            .user
            .unwrap_or_else(|| User::new(credentials.username.trim()));
        tracing::debug!(username = %user.username, has_token = token.is_some(), "REST sign-in succeeded");
        Ok(SignIn { user, token })
    }

    pub async fn sign_up(&self, registration: &Registration) -> BoardResult<Registered> {
        let request = self
            .endpoint
            .request(Method::POST, &self.auth_path("register"))
            .json(registration);
        let reply: AuthReply = self
            .endpoint
            .send_optional_json(request, Auth::None)
            .await?
            .unwrap_or_default();

        let token = reply.access_token.filter(|t| !t.trim().is_empty());
        let user = reply.user.unwrap_or_else(|| User {
            email: Some(registration.email.clone()),
            ..User::new(registration.username.trim())
        });
        Ok(Registered {
            outcome: SignUpOutcome {
                user,
                confirmation_required: token.is_none(),
            },
            token,
        })
    }

    pub async fn sign_out(&self) -> BoardResult<()> {
        let request = self.endpoint.request(Method::POST, LOGOUT_PATH);
        self.endpoint.send(request, Auth::Bearer).await?;
        Ok(())
    }

    pub async fn get_current_user(&self) -> BoardResult<User> {
        let request = self.endpoint.request(Method::GET, CURRENT_USER_PATH);
        let envelope: UserEnvelope = self.endpoint.send_json(request, Auth::Bearer).await?;
        Ok(envelope.into_user())
    }

    pub async fn change_password(&self, current: &str, new: &str) -> BoardResult<()> {
        let request = self
            .endpoint
            .request(Method::POST, &self.auth_path("change-password"))
            .json(&PasswordChangeBody {
                current_password: current,
                new_password: new,
            });
        self.endpoint.send(request, Auth::Bearer).await?;
        Ok(())
    }

    pub async fn delete_account(&self) -> BoardResult<()> {
        let request = self.endpoint.request(Method::DELETE, CURRENT_USER_PATH);
        self.endpoint.send(request, Auth::Bearer).await?;
        Ok(())
    }

    pub async fn request_username_recovery(&self, email: &str) -> BoardResult<()> {
        let request = self
            .endpoint
            .request(Method::POST, &self.auth_path("find-username"))
            .json(&EmailBody { email });
        self.endpoint.send(request, Auth::None).await?;
        Ok(())
    }

    pub async fn request_password_reset(&self, username: &str, email: &str) -> BoardResult<()> {
        let request = self
            .endpoint
            .request(Method::POST, &self.auth_path("reset-password"))
            .json(&PasswordResetBody { username, email });
        self.endpoint.send(request, Auth::None).await?;
        Ok(())
    }
}

/// `api/v1/auth/` -> `/api/v1/auth`; blank means the server root.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
