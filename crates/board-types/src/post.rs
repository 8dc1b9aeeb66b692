//! Posts and the fields attached to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::comment::{Comment, CommentId};

/// Backend-assigned post identifier. Higher ids are more recent.
pub type PostId = u64;

/// A board post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(deserialize_with = "crate::de::id_number")]
    pub id: PostId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(default, alias = "author", alias = "user_name")]
    pub user_name: String,
    #[serde(
        default,
        alias = "created_at",
        deserialize_with = "crate::de::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub likes: Likes,
    #[serde(default)]
    pub comments: CommentCount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl Post {
    pub fn like_count(&self) -> u64 {
        self.likes.count()
    }

    pub fn comment_count(&self) -> u64 {
        self.comments.count()
    }

    /// Case-insensitive match against title, content and author.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.content.to_lowercase().contains(&needle)
            || self
                .title
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains(&needle))
            || self.user_name.to_lowercase().contains(&needle)
    }
}

/// Board category. The fixed set is what the board offers for filtering;
/// labels outside it are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    #[default]
    All,
    Pets,
    Travel,
    Health,
    Celebrities,
    Other(String),
}

impl Category {
    /// Categories shown by the board, in display order.
    pub const FIXED: &'static [Category] = &[
        Category::All,
        Category::Pets,
        Category::Travel,
        Category::Health,
        Category::Celebrities,
    ];

    /// Wire label used by the backend.
    pub fn label(&self) -> &str {
        match self {
            Category::All => "전체",
            Category::Pets => "동물/반려동물",
            Category::Travel => "여행",
            Category::Health => "건강/헬스",
            Category::Celebrities => "연예인",
            Category::Other(label) => label,
        }
    }

    /// Short ASCII identifier, accepted on the command line.
    pub fn slug(&self) -> &str {
        match self {
            Category::All => "all",
            Category::Pets => "pets",
            Category::Travel => "travel",
            Category::Health => "health",
            Category::Celebrities => "celebrities",
            Category::Other(label) => label,
        }
    }

    /// Parses a wire label or a slug. Empty input means `All`.
    pub fn from_label(raw: &str) -> Category {
        let raw = raw.trim();
        if raw.is_empty() {
            return Category::All;
        }
        Self::FIXED
            .iter()
            .find(|c| c.label() == raw || c.slug().eq_ignore_ascii_case(raw))
            .cloned()
            .unwrap_or_else(|| Category::Other(raw.to_string()))
    }

    /// Whether a post in `category` passes this filter.
    pub fn admits(&self, category: &Category) -> bool {
        matches!(self, Category::All) || self == category
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::from_label(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Other(label) => label,
            other => other.label().to_string(),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Like information. List endpoints send a count; detail endpoints send the
/// names of the users who liked the post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Likes {
    Count(u64),
    Users(Vec<String>),
}

impl Default for Likes {
    fn default() -> Self {
        Likes::Count(0)
    }
}

impl Likes {
    pub fn count(&self) -> u64 {
        match self {
            Likes::Count(n) => *n,
            Likes::Users(users) => users.len() as u64,
        }
    }

    /// Whether `user` likes the post. `None` when only a count is known.
    pub fn contains(&self, user: &str) -> Option<bool> {
        match self {
            Likes::Count(_) => None,
            Likes::Users(users) => Some(users.iter().any(|u| u == user)),
        }
    }

    /// Returns the like state after `user` sets their like to `liked`.
    #[must_use]
    pub fn toggled(&self, user: &str, liked: bool) -> Likes {
        match self {
            Likes::Count(n) if liked => Likes::Count(n + 1),
            Likes::Count(n) => Likes::Count(n.saturating_sub(1)),
            Likes::Users(users) => {
                let mut users: Vec<String> = users.iter().filter(|u| *u != user).cloned().collect();
                if liked {
                    users.push(user.to_string());
                }
                Likes::Users(users)
            }
        }
    }
}

/// Comment information attached to a post: either a count or the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommentCount {
    Count(u64),
    List(Vec<Comment>),
}

impl Default for CommentCount {
    fn default() -> Self {
        CommentCount::Count(0)
    }
}

impl CommentCount {
    pub fn count(&self) -> u64 {
        match self {
            CommentCount::Count(n) => *n,
            CommentCount::List(list) => list.len() as u64,
        }
    }

    pub fn record_added(&mut self, comment: &Comment) {
        match self {
            CommentCount::Count(n) => *n += 1,
            CommentCount::List(list) => list.push(comment.clone()),
        }
    }

    pub fn record_removed(&mut self, id: CommentId) {
        match self {
            CommentCount::Count(n) => *n = n.saturating_sub(1),
            CommentCount::List(list) => list.retain(|c| c.id != id),
        }
    }
}
