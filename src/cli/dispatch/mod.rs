//! Map parsed CLI arguments to the action the binary runs.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{auth, ARG_BASE_PATH, ARG_DSN, ARG_PORT};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .filter(|v| !v.trim().is_empty())
        .context("missing required argument: --dsn")?;
    let base_path = matches
        .get_one::<String>(ARG_BASE_PATH)
        .cloned()
        .unwrap_or_else(|| "/api".to_string());

    let auth_opts = auth::Options::parse(matches);

    Ok(Action::Server(Args {
        port,
        dsn,
        base_path,
        secret: auth_opts.secret,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        cookie_max_age_seconds: auth_opts.cookie_max_age_seconds,
        cookie_secure: auth_opts.cookie_secure,
    }))
}
