//! Session and hashing settings shared by the login, signup and middleware.

use secrecy::{ExposeSecret, SecretString};

pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;
pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Everything the auth handlers need, built once at startup.
#[derive(Clone)]
pub struct AuthConfig {
    secret: Option<SecretString>,
    token_ttl_seconds: i64,
    cookie_max_age_seconds: i64,
    cookie_secure: bool,
    bcrypt_cost: u32,
}

impl AuthConfig {
    /// A missing or empty secret leaves the service up, but login answers 500.
    #[must_use]
    pub fn new(secret: Option<SecretString>) -> Self {
        Self {
            secret: secret.filter(|secret| !secret.expose_secret().is_empty()),
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            cookie_max_age_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            cookie_secure: false,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_cookie_max_age_seconds(mut self, seconds: i64) -> Self {
        self.cookie_max_age_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    #[must_use]
    pub fn secret(&self) -> Option<&SecretString> {
        self.secret.as_ref()
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> i64 {
        self.token_ttl_seconds
    }

    #[must_use]
    pub fn cookie_max_age_seconds(&self) -> i64 {
        self.cookie_max_age_seconds
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    #[must_use]
    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("cookie_max_age_seconds", &self.cookie_max_age_seconds)
            .field("cookie_secure", &self.cookie_secure)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_align_cookie_with_token() {
        let config = AuthConfig::new(Some(SecretString::from("s3cret".to_string())));
        assert_eq!(config.token_ttl_seconds(), 2_592_000);
        assert_eq!(config.cookie_max_age_seconds(), config.token_ttl_seconds());
        assert!(!config.cookie_secure());
        assert_eq!(config.bcrypt_cost(), bcrypt::DEFAULT_COST);
    }

    #[test]
    fn empty_secret_is_treated_as_missing() {
        assert!(AuthConfig::new(Some(SecretString::from(String::new()))).secret().is_none());
        assert!(AuthConfig::new(None).secret().is_none());
    }

    #[test]
    fn debug_redacts_secret() {
        let config = AuthConfig::new(Some(SecretString::from("s3cret".to_string())));
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("***"));
    }
}
