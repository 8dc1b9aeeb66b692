//! Session Store: who is signed in, and the transitions between states.
//!
//! Anonymous --login / sign-up with token / restore--> Authenticated
//! Authenticated --logout / delete account / expired session--> Anonymous

use board_types::User;
use board_types::wire::{Credentials, Registration};

use crate::credentials::{TokenSlot, mask_token};
use crate::error::BoardResult;
use crate::gateway::{AuthGateway, SignUpOutcome};
use crate::profile::ProfileImage;
use crate::validation::{ChangePassword, check_password_policy, require};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Anonymous,
    Authenticated,
}

/// Current authentication state. A user exists only while authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(User),
}

impl Session {
    pub fn status(&self) -> SessionStatus {
        match self {
            Session::Anonymous => SessionStatus::Anonymous,
            Session::Authenticated(_) => SessionStatus::Authenticated,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }
}

#[derive(Debug)]
pub struct SessionStore {
    gateway: AuthGateway,
    token: TokenSlot,
    session: Session,
    profile_preview: Option<ProfileImage>,
}

impl SessionStore {
    pub fn new(gateway: AuthGateway, token: TokenSlot) -> Self {
        Self {
            gateway,
            token,
            session: Session::Anonymous,
            profile_preview: None,
        }
    }

    pub fn gateway(&self) -> &AuthGateway {
        &self.gateway
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn user(&self) -> Option<&User> {
        self.session.user()
    }

    /// Confirmed profile image, kept in memory for this session only.
    pub fn profile_preview(&self) -> Option<&ProfileImage> {
        self.profile_preview.as_ref()
    }

    pub fn set_profile_preview(&mut self, image: ProfileImage) {
        self.profile_preview = Some(image);
    }

    /// Re-establishes the session from a stored token.
    ///
    /// Never fails: without a token nothing is sent, and a token the
    /// backend rejects is cleared.
    pub async fn restore_session(&mut self) -> &Session {
        let Some(token) = self.token.get() else {
            self.session = Session::Anonymous;
            return &self.session;
        };

        match self.gateway.get_current_user().await {
            Ok(user) => {
                tracing::debug!(username = %user.username, token = %mask_token(&token), "session restored");
                self.session = Session::Authenticated(user);
            }
            Err(err) => {
                tracing::debug!(error = %err, "stored token rejected; continuing anonymously");
                self.clear_local();
            }
        }
        &self.session
    }

    pub async fn login(&mut self, credentials: &Credentials) -> BoardResult<User> {
        require("username", &credentials.username)?;
        require("password", &credentials.password)?;

        match self.gateway.sign_in(credentials).await {
            Ok(signed_in) => {
                if let Some(token) = signed_in.token.as_deref() {
                    self.store_token(token);
                }
                tracing::info!(username = %signed_in.user.username, "logged in");
                self.session = Session::Authenticated(signed_in.user.clone());
                Ok(signed_in.user)
            }
            Err(err) => {
                tracing::debug!(error = %err, "login failed");
                self.clear_local();
                Err(err)
            }
        }
    }

    /// Registers an account. The session is authenticated right away only
    /// when the backend issues a token.
    pub async fn sign_up(&mut self, registration: &Registration) -> BoardResult<SignUpOutcome> {
        require("username", &registration.username)?;
        require("email", &registration.email)?;
        require("password", &registration.password)?;
        check_password_policy(&registration.password)?;

        let registered = self.gateway.sign_up(registration).await?;
        if let Some(token) = registered.token.as_deref() {
            self.store_token(token);
            self.session = Session::Authenticated(registered.outcome.user.clone());
        }
        tracing::info!(
            username = %registered.outcome.user.username,
            confirmation_required = registered.outcome.confirmation_required,
            "signed up"
        );
        Ok(registered.outcome)
    }

    /// Signs out. Local state is cleared even when the backend call fails.
    pub async fn logout(&mut self) {
        if self.token.is_present()
            && let Err(err) = self.gateway.sign_out().await
        {
            tracing::warn!(error = %err, "remote sign-out failed; clearing local session anyway");
        }
        self.clear_local();
        tracing::info!("logged out");
    }

    /// Deletes the account. An expired session is cleared locally and the
    /// error still returned; other failures leave the session untouched.
    pub async fn delete_account(&mut self) -> BoardResult<()> {
        match self.gateway.delete_account().await {
            Ok(()) => {
                tracing::info!("account deleted");
                self.clear_local();
                Ok(())
            }
            Err(err) => {
                if err.is_session_expired() {
                    self.expire();
                }
                Err(err)
            }
        }
    }

    pub async fn change_password(&mut self, form: &ChangePassword) -> BoardResult<()> {
        form.validate()?;
        match self.gateway.change_password(&form.current, &form.new).await {
            Ok(()) => {
                tracing::info!("password changed");
                Ok(())
            }
            Err(err) => {
                if err.is_session_expired() {
                    self.expire();
                }
                Err(err)
            }
        }
    }

    pub async fn request_username_recovery(&self, email: &str) -> BoardResult<()> {
        require("email", email)?;
        self.gateway.request_username_recovery(email.trim()).await
    }

    pub async fn request_password_reset(&self, username: &str, email: &str) -> BoardResult<()> {
        require("username", username)?;
        require("email", email)?;
        self.gateway
            .request_password_reset(username.trim(), email.trim())
            .await
    }

    /// Local clear after the backend reported the session gone.
    pub fn expire(&mut self) {
        if self.session.is_authenticated() || self.token.is_present() {
            tracing::info!("session expired; clearing local credentials");
        }
        self.clear_local();
    }

    fn store_token(&self, token: &str) {
        if let Err(err) = self.token.set(token) {
            tracing::warn!(error = %format!("{err:#}"), "failed to persist token; session lasts until exit");
        }
    }

    fn clear_local(&mut self) {
        if let Err(err) = self.token.clear() {
            tracing::warn!(error = %format!("{err:#}"), "failed to remove stored token");
        }
        self.session = Session::Anonymous;
        self.profile_preview = None;
    }
}
