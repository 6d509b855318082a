/// Bearer token issuance and verification
///
/// Tokens are compact HS256-signed JWTs carrying the caller's identity:
///
/// ```text
/// { "id": "42", "firstName": "Ada", "lastName": "Lovelace",
///   "email": "ada@example.com", "iat": 1700000000, "exp": 1700003600 }
/// ```
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: 1 hour by default, validated with zero leeway
/// - **Secret Management**: secrets should be at least 32 bytes (256 bits)
///
/// Verification failures of every kind (bad signature, malformed token, expiry) are
/// reported as [`AuthError::InvalidCredential`]. Callers that need to tell expiry
/// apart must decode the `exp` claim themselves.
///
/// # Example
///
/// ```
/// use pawlog_shared::auth::jwt::TokenService;
/// use pawlog_shared::auth::middleware::Identity;
/// use pawlog_shared::models::RecordId;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("test-secret-key-at-least-32-bytes-long");
/// let identity = Identity {
///     id: RecordId::new(1).unwrap(),
///     first_name: "Ada".to_string(),
///     last_name: "Lovelace".to_string(),
///     email: "ada@example.com".to_string(),
/// };
///
/// let token = tokens.issue(&identity)?;
/// let claims = tokens.verify(&token)?;
/// assert_eq!(claims.id, identity.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::middleware::{AuthError, Identity};
use crate::models::RecordId;

/// Default token lifetime
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3600;

/// Error type for token creation
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),
}

/// JWT claims structure
///
/// Identity fields plus the standard `iat` / `exp` timestamps (Unix seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// User ID (string on the wire)
    pub id: RecordId,

    pub first_name: String,

    pub last_name: String,

    pub email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Builds claims for `identity` issued at `issued_at`
    pub fn new(identity: &Identity, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: identity.id,
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            email: identity.email.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    /// Identity carried by the claims
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Signs and verifies bearer tokens with a shared secret
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_seconds", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a token service with the default 1-hour lifetime
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::seconds(DEFAULT_TOKEN_TTL_SECONDS))
    }

    /// Creates a token service with a custom lifetime
    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Issues a token for `identity`, valid from now until now + TTL
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if encoding fails
    pub fn issue(&self, identity: &Identity) -> Result<String, JwtError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issues a token as if it had been signed at `issued_at`
    pub fn issue_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let claims = Claims::new(identity, issued_at, self.ttl);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies signature and expiry and returns the embedded claims
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredential` for any verification failure
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(reason = %e, "Rejected bearer token");
                AuthError::InvalidCredential
            })
    }
}
