/// File upload endpoint
///
/// # Endpoint
///
/// ```text
/// POST /api/file/upload
/// Content-Type: multipart/form-data
///
/// type=animalImage|userImage|trainingLogVideo
/// id=<record id>
/// file=<binary, with filename>
/// ```
///
/// # Response
///
/// ```json
/// { "message": "File uploaded", "key": "rex.png-1700000000000-1a2b3c4d" }
/// ```
///
/// When `UPLOAD_REQUIRE_AUTH` is on, the route sits behind the authorization gate and
/// the caller must own the target record.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Multipart, State},
    Extension, Json,
};
use pawlog_shared::{auth::middleware::Identity, blob::BlobUpload};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,

    /// Storage key now attached to the record
    pub key: String,
}

pub async fn upload(
    State(state): State<AppState>,
    caller: Option<Extension<Identity>>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut upload = BlobUpload {
        kind: String::new(),
        target_id: String::new(),
        file_name: String::new(),
        content_type: None,
        bytes: Default::default(),
    };

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "type" => upload.kind = field.text().await?,
            "id" => upload.target_id = field.text().await?,
            "file" => {
                upload.file_name = field.file_name().unwrap_or_default().to_string();
                upload.content_type = field.content_type().map(str::to_string);
                upload.bytes = field.bytes().await?;
            }
            _ => {}
        }
    }

    // The gate only runs when uploads require auth, so an identity means ownership applies.
    let requester = caller.as_ref().map(|Extension(identity)| identity);
    let receipt = state.uploads.upload_and_attach(upload, requester).await?;

    Ok(Json(UploadResponse {
        message: "File uploaded".to_string(),
        key: receipt.key,
    }))
}
