//! `decorshop-auth`: authentication/authorization boundary.
//!
//! Decoupled from HTTP and storage: the API layer feeds bearer tokens in and
//! gets principals and capability decisions out.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{AuthzError, Principal, authorize};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use permissions::{Permission, permissions_for_roles};
pub use principal::PrincipalId;
pub use roles::Role;
