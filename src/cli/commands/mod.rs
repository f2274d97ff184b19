pub mod auth;
pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";
pub const ARG_DSN: &str = "dsn";
pub const ARG_BASE_PATH: &str = "base-path";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("kinship")
        .about("Accounts, sessions and follows")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("KINSHIP_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long(ARG_DSN)
                .help("Database connection string")
                .env("KINSHIP_DSN")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_BASE_PATH)
                .long(ARG_BASE_PATH)
                .help("Path prefix for the signup, login and follow routes (\"/\" mounts them at the root)")
                .default_value("/api")
                .env("KINSHIP_BASE_PATH"),
        );

    let command = auth::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_VARS: [&str; 8] = [
        "KINSHIP_PORT",
        "KINSHIP_DSN",
        "KINSHIP_BASE_PATH",
        "KINSHIP_SECRET",
        "KINSHIP_TOKEN_TTL_SECONDS",
        "KINSHIP_COOKIE_MAX_AGE_SECONDS",
        "KINSHIP_COOKIE_SECURE",
        "KINSHIP_LOG_LEVEL",
    ];

    fn with_cleared_env<F: FnOnce() -> R, R>(f: F) -> R {
        temp_env::with_vars(ENV_VARS.map(|key| (key, None::<&str>)), f)
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "kinship");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Accounts, sessions and follows".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        with_cleared_env(|| {
            let matches =
                new().get_matches_from(vec!["kinship", "--dsn", "postgres://localhost/kinship"]);

            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8080));
            assert_eq!(
                matches.get_one::<String>(ARG_BASE_PATH).cloned(),
                Some("/api".to_string())
            );
            assert_eq!(
                matches.get_one::<i64>(auth::ARG_TOKEN_TTL_SECONDS).copied(),
                Some(2_592_000)
            );
            assert_eq!(matches.get_one::<i64>(auth::ARG_COOKIE_MAX_AGE_SECONDS), None);
            assert!(!matches.get_flag(auth::ARG_COOKIE_SECURE));
            assert_eq!(matches.get_one::<String>(auth::ARG_SECRET), None);
        });
    }

    #[test]
    fn test_dsn_required() {
        with_cleared_env(|| {
            let result = new().try_get_matches_from(vec!["kinship"]);
            assert_eq!(
                result.map_err(|e| e.kind()).err(),
                Some(clap::error::ErrorKind::MissingRequiredArgument)
            );
        });
    }

    #[test]
    fn test_env_vars() {
        temp_env::with_vars(
            [
                ("KINSHIP_PORT", Some("9090")),
                ("KINSHIP_DSN", Some("postgres://user@localhost:5432/kinship")),
                ("KINSHIP_BASE_PATH", Some("/")),
                ("KINSHIP_SECRET", Some("s3cret")),
                ("KINSHIP_TOKEN_TTL_SECONDS", Some("3600")),
                ("KINSHIP_COOKIE_MAX_AGE_SECONDS", Some("600")),
                ("KINSHIP_COOKIE_SECURE", Some("true")),
                ("KINSHIP_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["kinship"]);

                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(9090));
                assert_eq!(
                    matches.get_one::<String>(ARG_DSN).cloned(),
                    Some("postgres://user@localhost:5432/kinship".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(ARG_BASE_PATH).cloned(),
                    Some("/".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(auth::ARG_SECRET).cloned(),
                    Some("s3cret".to_string())
                );
                assert_eq!(
                    matches.get_one::<i64>(auth::ARG_TOKEN_TTL_SECONDS).copied(),
                    Some(3600)
                );
                assert_eq!(
                    matches
                        .get_one::<i64>(auth::ARG_COOKIE_MAX_AGE_SECONDS)
                        .copied(),
                    Some(600)
                );
                assert!(matches.get_flag(auth::ARG_COOKIE_SECURE));
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_ttl_must_be_positive() {
        with_cleared_env(|| {
            let result = new().try_get_matches_from(vec![
                "kinship",
                "--dsn",
                "postgres://localhost/kinship",
                "--token-ttl-seconds",
                "0",
            ]);
            assert!(result.is_err());
        });
    }
}
