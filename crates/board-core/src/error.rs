//! Error taxonomy shared by the stores and the gateways.
//!
//! - `Validation`: rejected locally, before any request is sent.
//! - `Auth`: classified authentication failure.
//! - `Network`: the request could not complete.
//! - `Backend`: non-2xx reply carrying a server message.

use std::fmt;

use board_types::PostId;

/// Sub-kinds of authentication failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    InvalidCredentials,
    NotAuthorized,
    UserNotConfirmed,
    RateLimited,
    SessionExpired,
    Unknown,
}

impl fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthErrorKind::InvalidCredentials => write!(f, "invalid_credentials"),
            AuthErrorKind::NotAuthorized => write!(f, "not_authorized"),
            AuthErrorKind::UserNotConfirmed => write!(f, "user_not_confirmed"),
            AuthErrorKind::RateLimited => write!(f, "rate_limited"),
            AuthErrorKind::SessionExpired => write!(f, "session_expired"),
            AuthErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}

impl AuthErrorKind {
    /// Message shown when the backend supplied nothing better.
    pub fn default_message(self) -> &'static str {
        match self {
            AuthErrorKind::InvalidCredentials => "Invalid username or password",
            AuthErrorKind::NotAuthorized => "You are not allowed to do that",
            AuthErrorKind::UserNotConfirmed => {
                "Account is not confirmed yet. Finish email verification first"
            }
            AuthErrorKind::RateLimited => "Too many attempts. Try again later",
            AuthErrorKind::SessionExpired => "Session expired. Please log in again",
            AuthErrorKind::Unknown => "Authentication failed",
        }
    }
}

/// Classified authentication failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthError {
    pub kind: AuthErrorKind,
    /// One-line summary suitable for display
    pub message: String,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Error with the kind's default message.
    pub fn of(kind: AuthErrorKind) -> Self {
        Self::new(kind, kind.default_message())
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Local input violations. No request is made when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required form field is empty (holds the field name).
    EmptyField(&'static str),
    PasswordMismatch,
    PasswordUnchanged,
    PasswordTooShort { min: usize },
    PasswordMissingLowercase,
    PasswordMissingDigit,
    PasswordMissingSymbol,
    PasswordInvalidCharacter(char),
    UnknownPost(PostId),
    UnsupportedImage(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{field} must not be empty"),
            ValidationError::PasswordMismatch => {
                write!(f, "New password and confirmation do not match")
            }
            ValidationError::PasswordUnchanged => {
                write!(f, "New password must differ from the current password")
            }
            ValidationError::PasswordTooShort { min } => {
                write!(f, "Password must be at least {min} characters long")
            }
            ValidationError::PasswordMissingLowercase => {
                write!(f, "Password must contain a lowercase letter")
            }
            ValidationError::PasswordMissingDigit => write!(f, "Password must contain a digit"),
            ValidationError::PasswordMissingSymbol => write!(
                f,
                "Password must contain one of the symbols {}",
                crate::validation::PASSWORD_SYMBOLS
            ),
            ValidationError::PasswordInvalidCharacter(c) => {
                write!(f, "Password contains a character that is not allowed: {c:?}")
            }
            ValidationError::UnknownPost(id) => write!(f, "Post {id} is not loaded"),
            ValidationError::UnsupportedImage(reason) => {
                write!(f, "Unsupported profile image: {reason}")
            }
        }
    }
}

/// Error returned by every store and gateway operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    Validation(ValidationError),
    Auth(AuthError),
    Network(String),
    Backend { status: u16, message: String },
}

pub type BoardResult<T> = Result<T, BoardError>;

impl BoardError {
    pub fn auth(kind: AuthErrorKind) -> Self {
        BoardError::Auth(AuthError::of(kind))
    }

    pub fn auth_kind(&self) -> Option<AuthErrorKind> {
        match self {
            BoardError::Auth(err) => Some(err.kind),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        self.auth_kind() == Some(AuthErrorKind::SessionExpired)
    }

    /// True when the caller should send the user back to the login form.
    pub fn requires_login(&self) -> bool {
        self.is_session_expired()
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, BoardError::Validation(_))
    }
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::Validation(err) => write!(f, "{err}"),
            BoardError::Auth(err) => write!(f, "{err}"),
            BoardError::Network(msg) => write!(f, "Network error: {msg}"),
            BoardError::Backend { status, message } => write!(f, "HTTP {status}: {message}"),
        }
    }
}

impl std::error::Error for BoardError {}

impl From<ValidationError> for BoardError {
    fn from(err: ValidationError) -> Self {
        BoardError::Validation(err)
    }
}

impl From<AuthError> for BoardError {
    fn from(err: AuthError) -> Self {
        BoardError::Auth(err)
    }
}

impl From<reqwest::Error> for BoardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BoardError::Network(format!("request timed out: {err}"))
        } else if err.is_decode() {
            BoardError::Network(format!("failed to decode response: {err}"))
        } else {
            BoardError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expired_requires_login() {
        let err = BoardError::auth(AuthErrorKind::SessionExpired);
        assert!(err.is_session_expired());
        assert!(err.requires_login());
        assert!(!BoardError::auth(AuthErrorKind::RateLimited).requires_login());
    }

    #[test]
    fn test_display_uses_backend_message() {
        let err = BoardError::Backend {
            status: 409,
            message: "Username taken".into(),
        };
        assert_eq!(err.to_string(), "HTTP 409: Username taken");
    }
}
