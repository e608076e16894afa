// ABOUTME: Token verification contract and its HS256 JWT implementation
// ABOUTME: Turns a signed credential into the caller's user id; issuing tokens happens elsewhere

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

pub const INVALID_TOKEN: &str = "Unauthorized - Invalid token";

/// Claims carried by the credential cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub exp: i64,
}

pub trait TokenVerifier: Send + Sync {
    /// Returns the user id embedded in a valid token.
    fn verify(&self, token: &str) -> Result<Uuid>;
}

#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Uuid> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|err| {
            tracing::debug!("Token rejected: {}", err);
            AppError::Unauthorized(INVALID_TOKEN.to_string())
        })?;

        Uuid::parse_str(&data.claims.user_id)
            .map_err(|_| AppError::Unauthorized(INVALID_TOKEN.to_string()))
    }
}
