//! Auth Gateway: one operation set over interchangeable auth backends.
//!
//! The gateway translates requests and classifies failures. It never
//! mutates session state; the token slot is only read.

pub mod cognito;
pub mod rest;

use anyhow::Result;
use board_types::User;
use board_types::wire::{Credentials, Registration};

pub use self::cognito::CognitoAuth;
pub use self::rest::RestAuth;
use crate::config::{AuthBackendKind, Config};
use crate::credentials::TokenSlot;
use crate::error::{AuthErrorKind, BoardError, BoardResult};

/// Successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignIn {
    pub user: User,
    /// Bearer token to persist. `None` when the backend issued none.
    pub token: Option<String>,
}

/// Result of a sign-up as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub user: User,
    /// The account must be confirmed (email code) before sign-in works.
    pub confirmation_required: bool,
}

/// Sign-up reply including the token some backends issue right away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    pub outcome: SignUpOutcome,
    pub token: Option<String>,
}

/// Auth backend selected by `auth.backend`.
#[derive(Debug, Clone)]
pub enum AuthGateway {
    Rest(RestAuth),
    IdentityProvider(CognitoAuth),
}

impl AuthGateway {
    /// Builds the gateway configured in `config`.
    ///
    /// `api_base_url` is the resolved content API URL; REST auth and the
    /// username-recovery fallback live there.
    pub fn from_config(
        config: &Config,
        http: reqwest::Client,
        api_base_url: &str,
        token: TokenSlot,
    ) -> Result<Self> {
        let rest = RestAuth::new(http.clone(), api_base_url, &config.auth.rest_prefix, token.clone());
        match config.auth.backend {
            AuthBackendKind::Rest => Ok(AuthGateway::Rest(rest)),
            AuthBackendKind::IdentityProvider => Ok(AuthGateway::IdentityProvider(
                CognitoAuth::from_config(&config.identity_provider, http, token, rest)?,
            )),
        }
    }

    pub fn kind(&self) -> AuthBackendKind {
        match self {
            AuthGateway::Rest(_) => AuthBackendKind::Rest,
            AuthGateway::IdentityProvider(_) => AuthBackendKind::IdentityProvider,
        }
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> BoardResult<SignIn> {
        match self {
            AuthGateway::Rest(rest) => rest.sign_in(credentials).await,
            AuthGateway::IdentityProvider(idp) => idp.sign_in(credentials).await,
        }
    }

    pub async fn sign_up(&self, registration: &Registration) -> BoardResult<Registered> {
        match self {
            AuthGateway::Rest(rest) => rest.sign_up(registration).await,
            AuthGateway::IdentityProvider(idp) => idp.sign_up(registration).await,
        }
    }

    pub async fn sign_out(&self) -> BoardResult<()> {
        match self {
            AuthGateway::Rest(rest) => rest.sign_out().await,
            AuthGateway::IdentityProvider(idp) => idp.sign_out().await,
        }
    }

    pub async fn get_current_user(&self) -> BoardResult<User> {
        match self {
            AuthGateway::Rest(rest) => rest.get_current_user().await,
            AuthGateway::IdentityProvider(idp) => idp.get_current_user().await,
        }
    }

    /// Current bearer token. Fails with `SessionExpired` when there is none.
    pub fn fetch_token(&self) -> BoardResult<String> {
        let slot = match self {
            AuthGateway::Rest(rest) => rest.token(),
            AuthGateway::IdentityProvider(idp) => idp.token(),
        };
        slot.get()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| BoardError::auth(AuthErrorKind::SessionExpired))
    }

    pub async fn change_password(&self, current: &str, new: &str) -> BoardResult<()> {
        match self {
            AuthGateway::Rest(rest) => rest.change_password(current, new).await,
            AuthGateway::IdentityProvider(idp) => idp.change_password(current, new).await,
        }
    }

    pub async fn delete_account(&self) -> BoardResult<()> {
        match self {
            AuthGateway::Rest(rest) => rest.delete_account().await,
            AuthGateway::IdentityProvider(idp) => idp.delete_account().await,
        }
    }

    pub async fn request_username_recovery(&self, email: &str) -> BoardResult<()> {
        match self {
            AuthGateway::Rest(rest) => rest.request_username_recovery(email).await,
            AuthGateway::IdentityProvider(idp) => idp.request_username_recovery(email).await,
        }
    }

    /// Starts a password reset for `username`. The REST backend also wants
    /// the account email; the identity provider ignores it.
    pub async fn request_password_reset(&self, username: &str, email: &str) -> BoardResult<()> {
        match self {
            AuthGateway::Rest(rest) => rest.request_password_reset(username, email).await,
            AuthGateway::IdentityProvider(idp) => idp.request_password_reset(username).await,
        }
    }
}
