use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use decorshop_auth::{JwtValidator, Permission};

use crate::app::errors::ApiError;
use crate::authz;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Reject requests without a valid bearer token; otherwise attach the
/// caller's [`PrincipalContext`].
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers()).ok_or(ApiError::Unauthorized)?;

    let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "bearer token rejected");
        ApiError::Unauthorized
    })?;

    req.extensions_mut()
        .insert(PrincipalContext::new(claims.sub, claims.email, claims.roles));

    Ok(next.run(req).await)
}

/// Route-level capability gate. Must sit behind [`auth_middleware`].
pub async fn require_capability(
    State(required): State<Permission>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = req
        .extensions()
        .get::<PrincipalContext>()
        .ok_or(ApiError::Unauthorized)?;

    if let Err(e) = authz::authorize_capability(principal, &required) {
        tracing::info!(
            principal_id = %principal.principal_id(),
            capability = %required,
            "capability denied"
        );
        return Err(e.into());
    }

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn bearer_token_extraction() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(extract_bearer(&headers("Bearer   ")), None);
        assert_eq!(extract_bearer(&headers("Basic abc")), None);
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }
}
