//! CLI command handlers.

pub mod auth;
pub mod comments;
pub mod config;
pub mod posts;
pub mod profile;
