//! Credentials, session tokens and request identity.

pub mod config;
pub mod password;
pub mod session;
pub mod token;

pub use self::config::AuthConfig;
pub use self::session::{authenticate, current_user, AuthUser};
