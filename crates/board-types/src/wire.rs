//! Request and response bodies of the REST auth and content endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::post::Category;
use crate::user::User;

/// Username/password pair. Never printed with the password.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Sign-up form.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// `POST {prefix}/login` and `POST {prefix}/register` reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthReply {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body returned by the REST backend. Either field may carry the text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|m| !m.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailBody<'a> {
    pub email: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetBody<'a> {
    pub username: &'a str,
    pub email: &'a str,
}

#[derive(Clone, Serialize)]
pub struct PasswordChangeBody<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

/// Draft of a new post, as sent to `POST /posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category: Category,
    pub user_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditPostBody<'a> {
    pub content: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct LikeBody {
    pub liked: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommentBody<'a> {
    pub text: &'a str,
    pub user_name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditCommentBody<'a> {
    pub text: &'a str,
}
