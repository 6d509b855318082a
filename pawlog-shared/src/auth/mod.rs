/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: bearer token issuance and verification (TokenService)
/// - [`middleware`]: the per-request authorization gate
/// - [`session`]: the login flow (credential check and token issuance)
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id, cost tunable, run on the blocking pool
/// - **JWT Tokens**: HS256 signing, 1 hour expiry with zero leeway
/// - **Uniform failures**: unknown email and wrong password are indistinguishable
///
/// # Example
///
/// ```no_run
/// use pawlog_shared::auth::password::{hash_password, verify_password, PasswordPolicy};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password", &PasswordPolicy::default())?;
/// assert!(verify_password("user_password", &hash)?);
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod session;
