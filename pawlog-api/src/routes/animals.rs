/// Animal endpoints
///
/// - `POST /api/animal` - Register an animal owned by the caller

use crate::{app::AppState, error::ApiResult, routes::CreatedResponse};
use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use pawlog_shared::{auth::middleware::Identity, linker::CreateAnimalRequest};

/// Register an animal
///
/// The owner is the authenticated caller; an `owner` field in the body is ignored.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid bearer token
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: The caller already has an animal with this name
pub async fn create_animal(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    payload: Result<Json<CreateAnimalRequest>, JsonRejection>,
) -> ApiResult<Json<CreatedResponse>> {
    let Json(req) = payload?;
    let id = state.linker.create_animal(&caller, req).await?;

    Ok(Json(CreatedResponse::new("Animal created", id)))
}
