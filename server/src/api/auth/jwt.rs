//! JWT bearer token verification
//!
//! Tokens are issued elsewhere; this side only checks the HS256 signature and
//! expiry and hands back the claims.

use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

/// JWT validation error
#[derive(Debug)]
pub enum JwtError {
    /// Token signature has expired
    Expired,
    /// Token signature is invalid
    InvalidSignature,
    /// Other validation error
    Invalid(String),
}

impl fmt::Display for JwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "Token has expired"),
            Self::InvalidSignature => write!(f, "Invalid token signature"),
            Self::Invalid(msg) => write!(f, "Invalid token: {}", msg),
        }
    }
}

impl std::error::Error for JwtError {}

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorClaims {
    /// User ID
    pub sub: String,
    pub role: String,
    pub exp: i64,
}

impl ActorClaims {
    /// Numeric user id, if `sub` holds one
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Validate and decode a bearer token
pub fn validate_token(token: &str, signing_key: &[u8]) -> Result<ActorClaims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data =
        decode::<ActorClaims>(token, &DecodingKey::from_secret(signing_key), &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::Invalid(e.to_string()),
            })?;

    Ok(token_data.claims)
}

/// Sign a token for tests
#[cfg(test)]
pub fn create_token(signing_key: &[u8], user_id: i64, role: &str, ttl_secs: i64) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let claims = ActorClaims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp: crate::utils::time::now_secs() + ttl_secs,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap()
}
