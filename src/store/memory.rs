//! In-process store with the same uniqueness rules as the SQL schema: the
//! constraints at insert time are per column, the `*_in_use` checks span both.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;

use super::{CreateOutcome, FollowOutcome, NewUser, Store, User, UserId};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    follows: HashSet<(UserId, UserId)>,
}

impl Inner {
    fn contains(&self, id: UserId) -> bool {
        self.users.iter().any(|user| user.id == id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.inner.read().await.users.len()
    }

    pub async fn follow_count(&self) -> usize {
        self.inner.read().await.follows.len()
    }

    pub async fn user(&self, id: UserId) -> Option<User> {
        self.inner
            .read()
            .await
            .users
            .iter()
            .find(|user| user.id == id)
            .cloned()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_by_login(&self, login: &str) -> Result<Vec<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .filter(|user| user.username == login || user.mail == login)
            .take(2)
            .cloned()
            .collect())
    }

    async fn mail_in_use(&self, mail: &str) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .any(|user| user.mail == mail || user.username == mail))
    }

    async fn username_in_use(&self, username: &str) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .any(|user| user.username == username || user.mail == username))
    }

    async fn user_exists(&self, id: UserId) -> Result<bool> {
        Ok(self.inner.read().await.contains(id))
    }

    async fn create_user(&self, user: NewUser) -> Result<CreateOutcome> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.mail == user.mail) {
            return Ok(CreateOutcome::MailTaken);
        }
        if inner.users.iter().any(|u| u.username == user.username) {
            return Ok(CreateOutcome::UsernameTaken);
        }

        let id = inner.users.last().map_or(1, |last| last.id + 1);
        inner.users.push(User {
            id,
            username: user.username,
            mail: user.mail,
            password_hash: user.password_hash,
            location: user.location,
        });
        Ok(CreateOutcome::Created(id))
    }

    async fn follow(&self, follower: UserId, followed: UserId) -> Result<FollowOutcome> {
        let mut inner = self.inner.write().await;
        if !inner.contains(follower) || !inner.contains(followed) {
            return Ok(FollowOutcome::UnknownUser);
        }
        if inner.follows.insert((follower, followed)) {
            Ok(FollowOutcome::Created)
        } else {
            Ok(FollowOutcome::AlreadyFollowing)
        }
    }

    async fn follow_exists(&self, follower: UserId, followed: UserId) -> Result<bool> {
        Ok(self.inner.read().await.follows.contains(&(follower, followed)))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, mail: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            mail: mail.to_string(),
            password_hash: "hash".to_string(),
            location: None,
        }
    }

    #[tokio::test]
    async fn create_user_assigns_increasing_ids() -> Result<()> {
        let store = MemoryStore::new();
        let first = store.create_user(new_user("alice", "alice@example.com")).await?;
        let second = store.create_user(new_user("bob", "bob@example.com")).await?;
        assert_eq!(first, CreateOutcome::Created(1));
        assert_eq!(second, CreateOutcome::Created(2));
        Ok(())
    }

    #[tokio::test]
    async fn create_user_reports_mail_before_username() -> Result<()> {
        let store = MemoryStore::new();
        store.create_user(new_user("alice", "alice@example.com")).await?;

        let both = store.create_user(new_user("alice", "alice@example.com")).await?;
        assert_eq!(both, CreateOutcome::MailTaken);

        let username = store.create_user(new_user("alice", "other@example.com")).await?;
        assert_eq!(username, CreateOutcome::UsernameTaken);
        assert_eq!(store.user_count().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn find_by_login_matches_username_or_mail() -> Result<()> {
        let store = MemoryStore::new();
        store.create_user(new_user("alice", "alice@example.com")).await?;

        assert_eq!(store.find_by_login("alice").await?.len(), 1);
        assert_eq!(store.find_by_login("alice@example.com").await?.len(), 1);
        assert!(store.find_by_login("ghost").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn find_by_login_returns_username_and_mail_owners() -> Result<()> {
        let store = MemoryStore::new();
        store.create_user(new_user("bob@example.com", "eve@example.com")).await?;
        store.create_user(new_user("bob", "bob@example.com")).await?;

        let ids: Vec<UserId> = store
            .find_by_login("bob@example.com")
            .await?
            .into_iter()
            .map(|user| user.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
        Ok(())
    }

    #[tokio::test]
    async fn in_use_checks_span_username_and_mail() -> Result<()> {
        let store = MemoryStore::new();
        store.create_user(new_user("bob@example.com", "eve@example.com")).await?;

        assert!(store.mail_in_use("bob@example.com").await?);
        assert!(store.mail_in_use("eve@example.com").await?);
        assert!(store.username_in_use("eve@example.com").await?);
        assert!(store.username_in_use("bob@example.com").await?);
        assert!(!store.username_in_use("bob").await?);
        Ok(())
    }

    #[tokio::test]
    async fn follow_is_idempotent_and_requires_users() -> Result<()> {
        let store = MemoryStore::new();
        store.create_user(new_user("alice", "alice@example.com")).await?;
        store.create_user(new_user("bob", "bob@example.com")).await?;

        assert_eq!(store.follow(1, 2).await?, FollowOutcome::Created);
        assert_eq!(store.follow(1, 2).await?, FollowOutcome::AlreadyFollowing);
        assert_eq!(store.follow(1, 42).await?, FollowOutcome::UnknownUser);
        assert!(store.follow_exists(1, 2).await?);
        assert!(!store.follow_exists(2, 1).await?);
        assert_eq!(store.follow_count().await, 1);
        Ok(())
    }
}
