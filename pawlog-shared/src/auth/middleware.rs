/// Authorization gate
///
/// Stateless check run before every protected operation. It takes the raw
/// `Authorization` header value, extracts the bearer token, verifies it with the
/// [`TokenService`] and yields the caller's [`Identity`].
///
/// The HTTP layer wraps [`authorize`] in an axum middleware that stores the identity in
/// the request extensions; handlers read it with `Extension<Identity>`. Claims are
/// trusted until expiry, so the user row is not re-fetched.
///
/// # Failure kinds
///
/// - Header absent, or not of the form `Bearer <token>` → [`AuthError::MissingCredential`]
/// - Token present but rejected by the token service → [`AuthError::InvalidCredential`]
///
/// # Example
///
/// ```
/// use pawlog_shared::auth::jwt::TokenService;
/// use pawlog_shared::auth::middleware::{authorize, AuthError};
///
/// let tokens = TokenService::new("test-secret-key-at-least-32-bytes-long");
/// assert_eq!(authorize(None, &tokens), Err(AuthError::MissingCredential));
/// assert_eq!(authorize(Some("Bearer nope"), &tokens), Err(AuthError::InvalidCredential));
/// ```

use serde::{Deserialize, Serialize};

use super::jwt::TokenService;
use crate::models::RecordId;

/// Authenticated caller, decoded from the bearer token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// User ID
    pub id: RecordId,

    pub first_name: String,

    pub last_name: String,

    pub email: String,
}

/// Error type for the authorization gate and credential checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No usable `Authorization: Bearer` header
    #[error("Missing credentials")]
    MissingCredential,

    /// Credentials were presented but rejected
    #[error("Invalid credentials")]
    InvalidCredential,
}

/// Extracts the token from a `Bearer <token>` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let token = header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(AuthError::MissingCredential)?;

    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }

    Ok(token)
}

/// Runs the gate over a raw `Authorization` header value
pub fn authorize(header: Option<&str>, tokens: &TokenService) -> Result<Identity, AuthError> {
    let token = bearer_token(header)?;
    let claims = tokens.verify(token)?;

    Ok(claims.identity())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn identity() -> Identity {
        Identity {
            id: RecordId::new(5).unwrap(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: "grace@example.com".to_string(),
        }
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def")), Ok("abc.def"));
        assert_eq!(bearer_token(None), Err(AuthError::MissingCredential));
        assert_eq!(bearer_token(Some("")), Err(AuthError::MissingCredential));
        assert_eq!(bearer_token(Some("Bearer ")), Err(AuthError::MissingCredential));
        assert_eq!(bearer_token(Some("Bearer    ")), Err(AuthError::MissingCredential));
        assert_eq!(bearer_token(Some("Basic dXNlcjpwdw==")), Err(AuthError::MissingCredential));
        assert_eq!(bearer_token(Some("abc.def")), Err(AuthError::MissingCredential));
    }

    #[test]
    fn test_authorize_success() {
        let tokens = TokenService::new(SECRET);
        let header = format!("Bearer {}", tokens.issue(&identity()).unwrap());

        assert_eq!(authorize(Some(&header), &tokens), Ok(identity()));
    }

    #[test]
    fn test_authorize_rejects_foreign_token() {
        let issuer = TokenService::new("some-other-secret-at-least-32-bytes!!");
        let header = format!("Bearer {}", issuer.issue(&identity()).unwrap());

        assert_eq!(
            authorize(Some(&header), &TokenService::new(SECRET)),
            Err(AuthError::InvalidCredential)
        );
    }
}
