//! `-v` / `KINSHIP_LOG_LEVEL`: a repeat count on the command line, a level
//! name or number in the environment.

use clap::{builder::ValueParser, Arg, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Accept `0..=5` or a level name (`error` is 0, `trace` is 4).
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("KINSHIP_LOG_LEVEL")
            .global(true)
            .action(clap::ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    fn verbosity_from_env(level: &str) -> Result<Option<u8>, clap::Error> {
        temp_env::with_vars(
            [
                ("KINSHIP_LOG_LEVEL", Some(level)),
                ("KINSHIP_DSN", Some("postgres://localhost/kinship")),
            ],
            || {
                commands::new()
                    .try_get_matches_from(vec!["kinship"])
                    .map(|m| m.get_one::<u8>(ARG_VERBOSITY).copied())
            },
        )
    }

    #[test]
    fn log_level_env_accepts_names_and_numbers() {
        for (level, expected) in [
            ("error", 0),
            ("warn", 1),
            ("INFO", 2),
            ("debug", 3),
            ("trace", 4),
            ("5", 5),
        ] {
            assert_eq!(
                verbosity_from_env(level).ok().flatten(),
                Some(expected),
                "{level}"
            );
        }
    }

    #[test]
    fn log_level_env_rejects_unknown_names() {
        assert_eq!(
            verbosity_from_env("loud").map_err(|e| e.kind()).err(),
            Some(clap::error::ErrorKind::ValueValidation)
        );
    }

    #[test]
    fn repeated_flag_counts() {
        temp_env::with_var("KINSHIP_LOG_LEVEL", None::<&str>, || {
            let matches =
                with_args(Command::new("kinship")).get_matches_from(vec!["kinship", "-vvv"]);
            assert_eq!(matches.get_one::<u8>(ARG_VERBOSITY).copied(), Some(3));
        });
    }
}
