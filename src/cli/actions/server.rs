use crate::{
    api::{self, auth::AuthConfig},
    cli::telemetry,
};
use anyhow::Result;
use secrecy::SecretString;
use tracing::debug;

pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub base_path: String,
    pub secret: Option<SecretString>,
    pub token_ttl_seconds: i64,
    pub cookie_max_age_seconds: i64,
    pub cookie_secure: bool,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("port", &self.port)
            .field("dsn", &"***")
            .field("base_path", &self.base_path)
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("cookie_max_age_seconds", &self.cookie_max_age_seconds)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

impl Args {
    #[must_use]
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(self.secret.clone())
            .with_token_ttl_seconds(self.token_ttl_seconds)
            .with_cookie_max_age_seconds(self.cookie_max_age_seconds)
            .with_cookie_secure(self.cookie_secure)
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable, the schema cannot be applied or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Starting server with {:?}", args);

    let auth_config = args.auth_config();
    let result = api::new(args.port, args.dsn, args.base_path, auth_config).await;

    telemetry::shutdown_tracer();

    result
}
