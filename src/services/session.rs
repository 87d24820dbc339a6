use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when identifying the current user
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Session token has no subject")]
    MissingSubject,
}

/// Claims carried by a Supabase access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Authenticated user id
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub aud: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Verifies HS256 access tokens signed with the project's JWT secret
#[derive(Clone)]
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    pub fn new(secret: &str, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify a raw token and return its claims
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation)?;

        if data.claims.sub.trim().is_empty() {
            return Err(SessionError::MissingSubject);
        }

        Ok(data.claims)
    }

    /// Verify the value of an `Authorization` header
    pub fn verify_header(&self, header: Option<&str>) -> Result<SessionClaims, SessionError> {
        let token = header
            .and_then(bearer_token)
            .ok_or(SessionError::MissingToken)?;
        self.verify(token)
    }
}

/// Extract the token from `Bearer <token>`
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
