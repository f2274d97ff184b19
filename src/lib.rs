//! # Kinship
//!
//! `kinship` is a small account service: it creates users, verifies their
//! credentials, issues signed session tokens and records who follows whom.
//!
//! ## Accounts
//!
//! Usernames and mail addresses are unique. Passwords are stored as bcrypt
//! hashes only. An omitted (or empty) location is stored as `NULL`.
//!
//! ## Sessions
//!
//! Login issues an HS256 JWT carrying the user id as `sub`. The token is
//! returned in the response body and in an `HttpOnly` `Authorization` cookie.
//! No session state is kept server-side; every request is authenticated by
//! verifying the signature and expiration of the presented token.
//!
//! ## Follows
//!
//! A follow is a directed edge between two existing users. Following the same
//! user twice is a no-op and following yourself is rejected.

pub mod api;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
