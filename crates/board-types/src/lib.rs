//! Shared data model for the board client.
//!
//! Everything here is plain data with serde mappings for the REST content API.
//! No I/O, no state transitions.

mod de;

pub mod comment;
pub mod post;
pub mod user;
pub mod wire;

pub use comment::{Comment, CommentId};
pub use post::{Category, CommentCount, Likes, Post, PostId};
pub use user::User;
