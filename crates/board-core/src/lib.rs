//! Client core of the community board.
//!
//! - [`session::SessionStore`]: authentication state and its transitions.
//! - [`gateway::AuthGateway`]: REST or identity-provider auth backend.
//! - [`content::ContentStore`]: posts, comments and likes held in memory.
//! - [`board::Board`]: both stores behind one context object.

pub mod api;
pub mod board;
pub mod config;
pub mod content;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod http;
pub mod logging;
pub mod profile;
pub mod request_id;
pub mod session;
pub mod validation;

pub use board::Board;
pub use config::Config;
pub use error::{AuthError, AuthErrorKind, BoardError, BoardResult, ValidationError};
pub use session::{Session, SessionStatus};
