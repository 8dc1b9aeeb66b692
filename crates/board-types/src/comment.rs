use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::post::PostId;

pub type CommentId = u64;

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(deserialize_with = "crate::de::id_number")]
    pub id: CommentId,
    #[serde(
        default,
        alias = "post_id",
        deserialize_with = "crate::de::opt_id_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub post_id: Option<PostId>,
    #[serde(default, alias = "author", alias = "user_name")]
    pub user_name: String,
    pub text: String,
    #[serde(
        default,
        alias = "created_at",
        deserialize_with = "crate::de::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}
