//! HS256 bearer token decoding.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

/// Turns a raw bearer token into verified claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;
}

/// Shared-secret HS256 validator.
///
/// Signature checks go through `jsonwebtoken`; the time window is checked
/// against the caller-supplied `now` so tests stay deterministic.
#[derive(Clone)]
pub struct Hs256JwtValidator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Sign claims with the same secret (dev tooling and tests).
    pub fn issue(&self, claims: &JwtClaims) -> Result<String, TokenValidationError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))
    }
}

impl core::fmt::Debug for Hs256JwtValidator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256JwtValidator").finish_non_exhaustive()
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp"]);

        let data = decode::<JwtClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenValidationError::InvalidSignature,
                _ => TokenValidationError::Malformed(e.to_string()),
            }
        })?;

        validate_claims(&data.claims, now)?;
        tracing::debug!(sub = %data.claims.sub, "bearer token accepted");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PrincipalId, Role};
    use chrono::Duration;

    #[test]
    fn round_trips_signed_claims() {
        let validator = Hs256JwtValidator::new("unit-secret");
        let now = Utc::now();
        let claims = JwtClaims::new(PrincipalId::new(), vec![Role::ADMIN], now, Duration::minutes(5))
            .with_email("admin@example.com");

        let token = validator.issue(&claims).unwrap();
        let decoded = validator.validate(&token, now).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let now = Utc::now();
        let claims = JwtClaims::new(PrincipalId::new(), vec![], now, Duration::minutes(5));
        let token = Hs256JwtValidator::new("other").issue(&claims).unwrap();

        let err = Hs256JwtValidator::new("unit-secret").validate(&token, now).unwrap_err();
        assert_eq!(err, TokenValidationError::InvalidSignature);
    }

    #[test]
    fn rejects_expired_token() {
        let validator = Hs256JwtValidator::new("unit-secret");
        let issued = Utc::now() - Duration::hours(2);
        let claims = JwtClaims::new(PrincipalId::new(), vec![], issued, Duration::minutes(5));
        let token = validator.issue(&claims).unwrap();

        assert_eq!(
            validator.validate(&token, Utc::now()).unwrap_err(),
            TokenValidationError::Expired
        );
    }

    #[test]
    fn rejects_garbage() {
        let validator = Hs256JwtValidator::new("unit-secret");
        assert!(matches!(
            validator.validate("not-a-jwt", Utc::now()),
            Err(TokenValidationError::Malformed(_))
        ));
    }
}
