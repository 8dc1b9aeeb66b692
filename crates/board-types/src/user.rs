use serde::{Deserialize, Serialize};

/// Authenticated user profile as reported by the auth backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawUser")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub email_verified: bool,
}

/// Wire shape of [`User`]. Backends name the identifier differently and
/// some send several of them at once.
#[derive(Deserialize)]
struct RawUser {
    #[serde(default, deserialize_with = "crate::de::id_string")]
    id: String,
    #[serde(default, deserialize_with = "crate::de::id_string")]
    user_id: String,
    #[serde(default, deserialize_with = "crate::de::id_string")]
    cognito_user_id: String,
    #[serde(default, deserialize_with = "crate::de::id_string")]
    sub: String,
    #[serde(alias = "userName")]
    username: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default, alias = "emailVerified")]
    email_verified: bool,
}

impl From<RawUser> for User {
    fn from(raw: RawUser) -> Self {
        let id = [raw.id, raw.user_id, raw.cognito_user_id, raw.sub]
            .into_iter()
            .find(|id| !id.is_empty())
            .unwrap_or_default();
        Self {
            id,
            username: raw.username,
            email: raw.email,
            email_verified: raw.email_verified,
        }
    }
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    /// Display name used as the author of posts and comments.
    pub fn display_name(&self) -> &str {
        &self.username
    }
}
