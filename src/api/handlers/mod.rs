pub mod follow;
pub use self::follow::follow;

pub mod health;
pub use self::health::health;

pub mod user_login;
pub use self::user_login::login;

pub mod user_signup;
pub use self::user_signup::signup;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body returned by handlers that only report an outcome.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Lightweight email sanity check run before touching the store.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}
