/// Admin listings
///
/// # Endpoint
///
/// ```text
/// GET /api/admin/{users|animals|training}?lastId=<id>&limit=<n>
/// ```
///
/// # Response
///
/// ```json
/// { "items": [ ... ], "nextCursor": "42" }
/// ```
///
/// Pass `nextCursor` back as `lastId` for the following page. An empty page carries
/// `"message": "No more items"` and `"nextCursor": null`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use pawlog_shared::{
    error::FieldError,
    models::RecordId,
    pagination::{EntityKind, Listing, PageRequest, DEFAULT_PAGE_LIMIT},
};
use serde::{Deserialize, Serialize};

/// Query parameters, kept as raw strings so parse failures name the field
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub last_id: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    #[serde(flatten)]
    pub listing: Listing,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<ListResponse>> {
    let kind: EntityKind = kind.parse()?;
    let Query(params) = params?;
    let req = page_request(&params)?;

    let listing = state.paginator.list_page(kind, req).await?;
    let message = listing.is_empty().then(|| "No more items".to_string());

    Ok(Json(ListResponse { listing, message }))
}

fn page_request(params: &ListParams) -> ApiResult<PageRequest> {
    let mut details = Vec::new();

    let last_id = match params.last_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match raw.parse::<RecordId>() {
            Ok(id) => Some(id),
            Err(_) => {
                details.push(FieldError::new("lastId", "lastId must be a valid identifier"));
                None
            }
        },
    };

    let limit = match params.limit.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_PAGE_LIMIT,
        Some(raw) => raw.parse::<i64>().unwrap_or_else(|_| {
            details.push(FieldError::new("limit", "limit must be an integer"));
            DEFAULT_PAGE_LIMIT
        }),
    };

    if !details.is_empty() {
        return Err(ApiError::ValidationError(details));
    }

    Ok(PageRequest::new(last_id, limit)?)
}
