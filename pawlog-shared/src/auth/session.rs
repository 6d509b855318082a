/// Login flow
///
/// `check_credentials` looks the user up by normalized email and compares the password
/// against the stored hash. An unknown email is still run through one verification
/// against a decoy hash, so both failure paths take about as long and both report
/// [`AuthError::InvalidCredential`].
///
/// `issue_session` performs the same check and then signs a bearer token for the user.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use super::jwt::TokenService;
use super::middleware::{AuthError, Identity};
use super::password::{hash_password_async, verify_password_async, PasswordPolicy};
use crate::error::{ServiceError, ServiceResult};
use crate::models::user::normalize_email;
use crate::models::User;
use crate::store::UserStore;

/// Login request body
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Identity {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Credential checks and token issuance
#[derive(Clone)]
pub struct SessionService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
    decoy_hash: String,
}

impl SessionService {
    /// Builds the service, hashing a throwaway password under `policy` as the decoy
    pub async fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<TokenService>,
        policy: PasswordPolicy,
    ) -> ServiceResult<Self> {
        let decoy_hash = hash_password_async("pawlog-decoy-password".to_string(), policy).await?;

        Ok(Self {
            users,
            tokens,
            decoy_hash,
        })
    }

    /// Returns the user whose email and password match
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` for a malformed request
    /// - `ServiceError::Auth(InvalidCredential)` for an unknown email or wrong password
    pub async fn check_credentials(&self, credentials: &Credentials) -> ServiceResult<User> {
        let email = normalize_email(&credentials.email);
        Credentials {
            email: email.clone(),
            password: credentials.password.clone(),
        }
        .validate()?;

        let user = self.users.find_user_by_email(&email).await?;

        let stored_hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.decoy_hash.clone(),
        };

        let matches = verify_password_async(credentials.password.clone(), stored_hash).await?;

        match user {
            Some(user) if matches => {
                debug!(user_id = %user.id, "Credentials accepted");
                Ok(user)
            }
            _ => {
                debug!("Credentials rejected");
                Err(AuthError::InvalidCredential.into())
            }
        }
    }

    /// Checks credentials and issues a bearer token
    pub async fn issue_session(&self, credentials: &Credentials) -> ServiceResult<String> {
        let user = self.check_credentials(credentials).await?;

        let token = self
            .tokens
            .issue(&Identity::from(&user))
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        info!(user_id = %user.id, "Issued session token");
        Ok(token)
    }
}
