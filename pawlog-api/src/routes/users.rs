/// User endpoints
///
/// # Endpoints
///
/// - `POST /api/user` - Register a user
/// - `POST /api/user/login` - Check credentials
/// - `POST /api/user/verify` - Check credentials and issue a bearer token
///
/// Login and verify fail identically for an unknown email and a wrong password.

use crate::{
    app::AppState,
    error::ApiResult,
    routes::{CreatedResponse, MessageResponse},
};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use pawlog_shared::{auth::session::Credentials, linker::CreateUserRequest};
use serde::{Deserialize, Serialize};

/// Token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Bearer token, valid for one hour by default
    pub token: String,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/user
/// Content-Type: application/json
///
/// {
///   "firstName": "Ada",
///   "lastName": "Lovelace",
///   "email": "ada@example.com",
///   "password": "SecureP@ss123",
///   "profilePicture": null
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Email already registered
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<Json<CreatedResponse>> {
    let Json(req) = payload?;
    let id = state.linker.create_user(req).await?;

    Ok(Json(CreatedResponse::new("User created", id)))
}

/// Check credentials without issuing a token
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(credentials) = payload?;
    state.sessions.check_credentials(&credentials).await?;

    Ok(Json(MessageResponse {
        message: "Login successful".to_string(),
    }))
}

/// Check credentials and issue a bearer token
///
/// # Response
///
/// ```json
/// { "token": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password
pub async fn verify(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(credentials) = payload?;
    let token = state.sessions.issue_session(&credentials).await?;

    Ok(Json(TokenResponse { token }))
}
