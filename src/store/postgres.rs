//! PostgreSQL-backed store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Connection, PgPool, Row};
use tracing::Instrument;

use super::{CreateOutcome, FollowOutcome, NewUser, Store, User, UserId};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const USERNAME_CONSTRAINT: &str = "users_username_key";
const MAIL_CONSTRAINT: &str = "users_mail_key";

/// Integrity failures the store turns into outcomes instead of errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Violation {
    Mail,
    Username,
    ForeignKey,
}

fn violation(err: &sqlx::Error) -> Option<Violation> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    match db_err.code().as_deref() {
        Some(UNIQUE_VIOLATION) => match db_err.constraint() {
            Some(MAIL_CONSTRAINT) => Some(Violation::Mail),
            Some(USERNAME_CONSTRAINT) => Some(Violation::Username),
            _ => None,
        },
        Some(FOREIGN_KEY_VIOLATION) => Some(Violation::ForeignKey),
        _ => None,
    }
}

fn query_span(operation: &'static str, statement: &'static str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error if any schema statement fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&self.pool)
            .await
            .context("failed to apply schema")?;
        Ok(())
    }

    async fn exists(&self, query: &'static str, value: &str) -> Result<bool> {
        let row = sqlx::query(query)
            .bind(value)
            .fetch_one(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;
        Ok(row.get("exists"))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_by_login(&self, login: &str) -> Result<Vec<User>> {
        let query = "SELECT id, username, mail, password, location FROM users WHERE username = $1 OR mail = $1 ORDER BY id LIMIT 2";
        let rows = sqlx::query(query)
            .bind(login)
            .fetch_all(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to lookup user by login")?;

        Ok(rows
            .into_iter()
            .map(|row| User {
                id: row.get("id"),
                username: row.get("username"),
                mail: row.get("mail"),
                password_hash: row.get("password"),
                location: row.get("location"),
            })
            .collect())
    }

    async fn mail_in_use(&self, mail: &str) -> Result<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM users WHERE mail = $1 OR username = $1) AS exists",
            mail,
        )
        .await
        .context("failed to check mail")
    }

    async fn username_in_use(&self, username: &str) -> Result<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR mail = $1) AS exists",
            username,
        )
        .await
        .context("failed to check username")
    }

    async fn user_exists(&self, id: UserId) -> Result<bool> {
        let query = "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1) AS exists";
        let row = sqlx::query(query)
            .bind(id)
            .fetch_one(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to check user")?;
        Ok(row.get("exists"))
    }

    async fn create_user(&self, user: NewUser) -> Result<CreateOutcome> {
        let query = r"
            INSERT INTO users
                (username, mail, password, location)
            VALUES ($1, $2, $3, $4)
            RETURNING id
        ";
        let row = sqlx::query(query)
            .bind(&user.username)
            .bind(&user.mail)
            .bind(&user.password_hash)
            .bind(user.location.as_deref())
            .fetch_one(&self.pool)
            .instrument(query_span("INSERT", query))
            .await;

        match row {
            Ok(row) => Ok(CreateOutcome::Created(row.get("id"))),
            Err(err) => match violation(&err) {
                Some(Violation::Mail) => Ok(CreateOutcome::MailTaken),
                Some(Violation::Username) => Ok(CreateOutcome::UsernameTaken),
                _ => Err(err).context("failed to insert user"),
            },
        }
    }

    async fn follow(&self, follower: UserId, followed: UserId) -> Result<FollowOutcome> {
        let query = r"
            INSERT INTO follows
                (follower_id, followed_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, followed_id) DO NOTHING
        ";
        let result = sqlx::query(query)
            .bind(follower)
            .bind(followed)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Ok(FollowOutcome::AlreadyFollowing),
            Ok(_) => Ok(FollowOutcome::Created),
            Err(err) if violation(&err) == Some(Violation::ForeignKey) => {
                Ok(FollowOutcome::UnknownUser)
            }
            Err(err) => Err(err).context("failed to insert follow"),
        }
    }

    async fn follow_exists(&self, follower: UserId, followed: UserId) -> Result<bool> {
        let query = "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND followed_id = $2) AS exists";
        let row = sqlx::query(query)
            .bind(follower)
            .bind(followed)
            .fetch_one(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to check follow")?;
        Ok(row.get("exists"))
    }

    async fn ping(&self) -> Result<()> {
        let acquire_span = tracing::info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .context("failed to acquire database connection")?;

        let ping_span =
            tracing::info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .context("failed to ping database")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::{borrow::Cow, error::Error as StdError, fmt};

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
        constraint: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &'static str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn constraint(&self) -> Option<&str> {
            self.constraint
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    fn db_error(code: &'static str, constraint: Option<&'static str>) -> sqlx::Error {
        sqlx::Error::Database(Box::new(TestDbError {
            code: Some(code),
            constraint,
        }))
    }

    #[test]
    fn violation_maps_unique_constraints() {
        assert_eq!(
            violation(&db_error("23505", Some("users_mail_key"))),
            Some(Violation::Mail)
        );
        assert_eq!(
            violation(&db_error("23505", Some("users_username_key"))),
            Some(Violation::Username)
        );
        assert_eq!(violation(&db_error("23505", Some("follows_pkey"))), None);
    }

    #[test]
    fn violation_maps_foreign_key() {
        assert_eq!(
            violation(&db_error("23503", Some("follows_followed_id_fkey"))),
            Some(Violation::ForeignKey)
        );
    }

    #[test]
    fn violation_ignores_other_errors() {
        assert_eq!(violation(&db_error("99999", None)), None);
        assert_eq!(violation(&sqlx::Error::RowNotFound), None);
    }

    #[test]
    fn schema_declares_named_unique_constraints() {
        assert!(SCHEMA_SQL.contains(MAIL_CONSTRAINT));
        assert!(SCHEMA_SQL.contains(USERNAME_CONSTRAINT));
    }
}
