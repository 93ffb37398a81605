use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

// -- Password hashing --

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))
}

/// False on mismatch and on hashes that do not parse as PHC strings.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// -- Tokens --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Confirmation,
}

impl TokenKind {
    pub fn lifetime(self) -> chrono::Duration {
        match self {
            TokenKind::Access => chrono::Duration::minutes(30),
            TokenKind::Confirmation => chrono::Duration::minutes(1440),
        }
    }
}

/// JWT payload. `sub` is optional so that a token without a subject decodes
/// far enough to be rejected with `MissingSubject` instead of a parse error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: i64,
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is malformed or its signature is invalid")]
    Invalid,
    #[error("token carries no subject")]
    MissingSubject,
    #[error("expected a {expected:?} token")]
    TypeMismatch { expected: TokenKind },
}

/// HS256 signing and verification with a process-wide secret, held here
/// rather than read from the environment at verify time.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Expiry is absolute wall-clock time, recomputed against "now" at
    /// verification.
    pub fn issue(&self, email: &str, kind: TokenKind) -> anyhow::Result<String> {
        debug!(email, ?kind, "issuing token");
        let claims = Claims {
            sub: Some(email.to_string()),
            exp: (Utc::now() + kind.lifetime()).timestamp(),
            kind,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<String, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?;

        if data.claims.kind != expected {
            return Err(TokenError::TypeMismatch { expected });
        }

        data.claims.sub.ok_or(TokenError::MissingSubject)
    }
}
