//! bcrypt hashing, run off the async executor.

use anyhow::{Context, Result};
use tokio::task;

/// Hash `password` with a fresh salt.
///
/// # Errors
/// Returns an error if bcrypt rejects the cost or the worker task panics.
pub async fn hash_password(password: String, cost: u32) -> Result<String> {
    task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("password hashing task failed")?
        .context("failed to hash password")
}

/// Check `password` against a stored hash. Malformed hashes never verify.
pub async fn verify_password(password: String, hash: String) -> bool {
    match task::spawn_blocking(move || bcrypt::verify(password, &hash)).await {
        Ok(Ok(valid)) => valid,
        Ok(Err(err)) => {
            tracing::warn!("Stored password hash could not be verified: {err}");
            false
        }
        Err(err) => {
            tracing::error!("Password verification task failed: {err}");
            false
        }
    }
}
