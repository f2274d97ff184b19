//! Persistence for users and follow edges.
//!
//! Handlers only see the [`Store`] trait. [`postgres::PgStore`] backs the
//! running server and [`memory::MemoryStore`] backs the handler tests.

pub mod memory;
pub mod postgres;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub use self::memory::MemoryStore;
pub use self::postgres::PgStore;

/// Store-assigned user identifier.
pub type UserId = i64;

/// Shared handle passed to the handlers through an `Extension`.
pub type DynStore = Arc<dyn Store>;

/// A persisted account.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub mail: String,
    pub password_hash: String,
    pub location: Option<String>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("mail", &self.mail)
            .field("password_hash", &"***")
            .field("location", &self.location)
            .finish()
    }
}

/// Account fields as they are written; `password_hash` is never plaintext.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub mail: String,
    pub password_hash: String,
    pub location: Option<String>,
}

/// Result of inserting a user. Uniqueness is enforced at insert time too,
/// so a concurrent signup that won the race shows up here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(UserId),
    MailTaken,
    UsernameTaken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Created,
    /// The edge already existed; nothing was written.
    AlreadyFollowing,
    /// One of the two users does not exist.
    UnknownUser,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Users whose username or mail equals `login`, oldest first.
    /// One account's username can equal another's mail, so this returns at
    /// most two rows.
    async fn find_by_login(&self, login: &str) -> Result<Vec<User>>;

    /// True when `mail` is taken as a mail or as a username.
    async fn mail_in_use(&self, mail: &str) -> Result<bool>;

    /// True when `username` is taken as a username or as a mail.
    async fn username_in_use(&self, username: &str) -> Result<bool>;

    async fn user_exists(&self, id: UserId) -> Result<bool>;

    async fn create_user(&self, user: NewUser) -> Result<CreateOutcome>;

    /// Record `follower -> followed`.
    async fn follow(&self, follower: UserId, followed: UserId) -> Result<FollowOutcome>;

    async fn follow_exists(&self, follower: UserId, followed: UserId) -> Result<bool>;

    /// Liveness check used by `/health`.
    async fn ping(&self) -> Result<()>;
}
