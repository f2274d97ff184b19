use crate::api::auth::config::DEFAULT_TOKEN_TTL_SECONDS;
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_SECRET: &str = "secret";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_COOKIE_MAX_AGE_SECONDS: &str = "cookie-max-age-seconds";
pub const ARG_COOKIE_SECURE: &str = "cookie-secure";

#[derive(Clone)]
pub struct Options {
    pub secret: Option<SecretString>,
    pub token_ttl_seconds: i64,
    pub cookie_max_age_seconds: i64,
    pub cookie_secure: bool,
}

impl Options {
    /// Parse session arguments from matches.
    /// The cookie lifetime follows the token lifetime unless set.
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        let secret = matches
            .get_one::<String>(ARG_SECRET)
            .filter(|v| !v.trim().is_empty())
            .map(|v| SecretString::from(v.clone()));

        let token_ttl_seconds = matches
            .get_one::<i64>(ARG_TOKEN_TTL_SECONDS)
            .copied()
            .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS);

        let cookie_max_age_seconds = matches
            .get_one::<i64>(ARG_COOKIE_MAX_AGE_SECONDS)
            .copied()
            .unwrap_or(token_ttl_seconds);

        Self {
            secret,
            token_ttl_seconds,
            cookie_max_age_seconds,
            cookie_secure: matches.get_flag(ARG_COOKIE_SECURE),
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SECRET)
                .long(ARG_SECRET)
                .help("HMAC secret used to sign session tokens")
                .long_help(
                    "HMAC secret used to sign session tokens.\n\nThe server starts without it, but every login answers with a server configuration error.",
                )
                .env("KINSHIP_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Session token lifetime in seconds")
                .env("KINSHIP_TOKEN_TTL_SECONDS")
                .default_value("2592000")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_COOKIE_MAX_AGE_SECONDS)
                .long(ARG_COOKIE_MAX_AGE_SECONDS)
                .help("Session cookie Max-Age in seconds (default: token lifetime)")
                .env("KINSHIP_COOKIE_MAX_AGE_SECONDS")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long(ARG_COOKIE_SECURE)
                .help("Mark the session cookie Secure (HTTPS only)")
                .env("KINSHIP_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
}
