//! Session token: an HS256 JWT with the user id as `sub`.

use jsonwebtoken::{
    decode, encode, errors::Error, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use ulid::Ulid;

use crate::store::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,
    pub exp: i64,
    /// Unique per issuance so two logins in the same second differ.
    pub jti: String,
}

pub fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Sign a token for `user_id` that expires `ttl_seconds` after `now`.
///
/// # Errors
/// Returns an error if signing fails.
pub fn issue(
    user_id: UserId,
    secret: &SecretString,
    now: i64,
    ttl_seconds: i64,
) -> Result<String, Error> {
    let claims = Claims {
        sub: user_id,
        exp: now.saturating_add(ttl_seconds),
        jti: Ulid::new().to_string(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
}

/// Check signature and expiration, returning the claims.
///
/// # Errors
/// Returns an error for a bad signature, a malformed token, or an expired one.
pub fn verify(token: &str, secret: &SecretString) -> Result<Claims, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn issued_token_round_trips_claims() -> Result<(), Error> {
        let now = now_unix_seconds();
        let token = issue(7, &secret("s3cret"), now, 3600)?;
        let claims = verify(&token, &secret("s3cret"))?;
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.exp, now + 3600);
        Ok(())
    }

    #[test]
    fn tokens_issued_back_to_back_differ() -> Result<(), Error> {
        let now = now_unix_seconds();
        let first = issue(7, &secret("s3cret"), now, 3600)?;
        let second = issue(7, &secret("s3cret"), now, 3600)?;
        assert_ne!(first, second);
        assert_eq!(verify(&first, &secret("s3cret"))?.sub, 7);
        assert_eq!(verify(&second, &secret("s3cret"))?.sub, 7);
        Ok(())
    }

    #[test]
    fn wrong_secret_is_rejected() -> Result<(), Error> {
        let token = issue(7, &secret("s3cret"), now_unix_seconds(), 3600)?;
        let err = verify(&token, &secret("other")).err().map(Error::into_kind);
        assert!(matches!(err, Some(ErrorKind::InvalidSignature)));
        Ok(())
    }

    #[test]
    fn expired_token_is_rejected() -> Result<(), Error> {
        let token = issue(7, &secret("s3cret"), now_unix_seconds() - 7200, 3600)?;
        let err = verify(&token, &secret("s3cret")).err().map(Error::into_kind);
        assert!(matches!(err, Some(ErrorKind::ExpiredSignature)));
        Ok(())
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(verify("not.a.token", &secret("s3cret")).is_err());
    }
}
