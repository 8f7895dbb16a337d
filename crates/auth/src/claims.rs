use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{PrincipalId, Role};

/// Session token claims.
///
/// `iat`/`exp` are unix seconds so the encoded form matches registered JWT
/// claim names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject / principal identifier.
    pub sub: PrincipalId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Roles granted to the session.
    #[serde(default)]
    pub roles: Vec<Role>,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}

impl JwtClaims {
    /// Claims valid from `now` for `ttl`.
    pub fn new(sub: PrincipalId, roles: Vec<Role>, now: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        Self {
            sub,
            email: None,
            roles,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("malformed token: {0}")]
    Malformed(String),
}

/// Validate the time window of already-decoded claims.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn accepts_claims_inside_window() {
        let claims = JwtClaims::new(PrincipalId::new(), vec![Role::ADMIN], at(1_000), Duration::minutes(10));
        assert_eq!(validate_claims(&claims, at(1_001)), Ok(()));
    }

    #[test]
    fn rejects_expired_and_future_tokens() {
        let claims = JwtClaims::new(PrincipalId::new(), vec![], at(1_000), Duration::seconds(60));
        assert_eq!(validate_claims(&claims, at(1_060)), Err(TokenValidationError::Expired));
        assert_eq!(validate_claims(&claims, at(999)), Err(TokenValidationError::NotYetValid));
    }

    #[test]
    fn rejects_inverted_window() {
        let mut claims = JwtClaims::new(PrincipalId::new(), vec![], at(1_000), Duration::seconds(60));
        claims.exp = claims.iat;
        assert_eq!(
            validate_claims(&claims, at(1_000)),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }
}
