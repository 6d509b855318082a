/// Training log endpoints
///
/// - `POST /api/training` - Log a session for one of the caller's animals

use crate::{app::AppState, error::ApiResult, routes::CreatedResponse};
use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use pawlog_shared::{auth::middleware::Identity, linker::CreateTrainingLogRequest};

/// Create a training log
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid bearer token
/// - `422 Unprocessable Entity`: Validation failed
/// - `404 Not Found`: Animal does not exist
/// - `403 Forbidden`: Animal belongs to another user
pub async fn create_training_log(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    payload: Result<Json<CreateTrainingLogRequest>, JsonRejection>,
) -> ApiResult<Json<CreatedResponse>> {
    let Json(req) = payload?;
    let id = state.linker.create_training_log(&caller, req).await?;

    Ok(Json(CreatedResponse::new("Training log created", id)))
}
