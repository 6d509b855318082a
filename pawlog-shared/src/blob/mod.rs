/// Media uploads
///
/// Files are not kept in the database. Their bytes go to an external [`BlobStore`] and
/// only the returned key is written onto the owning record:
///
/// | Target | Record | Field |
/// |---|---|---|
/// | `animalImage` | Animal | `profile_picture` |
/// | `userImage` | User | `profile_picture` |
/// | `trainingLogVideo` | TrainingLog | `training_log_video` |
///
/// [`BlobUploadCoordinator::upload_and_attach`] validates the request, resolves the
/// target, stores the bytes under a fresh key and sets exactly that one field.
///
/// A re-upload replaces the key but leaves the previous blob in the store; the orphaned
/// key is logged at `warn` so it can be cleaned up out of band.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::middleware::Identity;
use crate::error::{FieldError, ServiceError, ServiceResult};
use crate::models::RecordId;
use crate::store::Repositories;

pub mod http;
pub mod memory;

pub use http::{HttpBlobConfig, HttpBlobStore};
pub use memory::MemoryBlobStore;

/// Longest file-name prefix kept in a storage key
const MAX_KEY_NAME_LEN: usize = 128;

/// Error type for blob store operations
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// The store could not be reached or the request failed in flight
    #[error("Blob store request failed: {0}")]
    Request(String),

    /// The store answered with a non-success status
    #[error("Blob store rejected upload with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Client construction or configuration failure
    #[error("Blob store misconfigured: {0}")]
    Config(String),
}

impl From<BlobError> for ServiceError {
    fn from(err: BlobError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

/// External byte storage addressed by opaque keys
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `key` and returns the key the store recorded
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: Option<&str>,
    ) -> Result<String, BlobError>;
}

/// Record field an upload is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget {
    AnimalImage,
    UserImage,
    TrainingLogVideo,
}

impl UploadTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadTarget::AnimalImage => "animalImage",
            UploadTarget::UserImage => "userImage",
            UploadTarget::TrainingLogVideo => "trainingLogVideo",
        }
    }
}

impl fmt::Display for UploadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadTarget {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "animalImage" => Ok(UploadTarget::AnimalImage),
            "userImage" => Ok(UploadTarget::UserImage),
            "trainingLogVideo" => Ok(UploadTarget::TrainingLogVideo),
            _ => Err(FieldError::new(
                "type",
                "Type must be one of animalImage, userImage, trainingLogVideo",
            )),
        }
    }
}

/// Derives a collision-resistant storage key from a file name and a timestamp
///
/// Format: `<sanitized name>-<unix millis>-<8 hex chars>`. Characters outside
/// `[A-Za-z0-9._-]` become `_`.
pub fn storage_key(file_name: &str, now: DateTime<Utc>) -> String {
    let mut name: String = file_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_KEY_NAME_LEN)
        .collect();

    if name.is_empty() {
        name.push_str("file");
    }

    let nonce = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", name, now.timestamp_millis(), &nonce[..8])
}

/// Upload as received from the client, before validation
#[derive(Debug, Clone)]
pub struct BlobUpload {
    /// Raw `type` field
    pub kind: String,

    /// Raw `id` field
    pub target_id: String,

    pub file_name: String,

    pub content_type: Option<String>,

    pub bytes: Bytes,
}

/// Outcome of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub target: UploadTarget,
    pub target_id: RecordId,

    /// Key now stored on the record
    pub key: String,

    /// Key that was replaced, if any; its blob is not reclaimed
    pub replaced: Option<String>,
}

/// Stores uploaded bytes and attaches the key to the owning record
#[derive(Clone)]
pub struct BlobUploadCoordinator {
    repos: Repositories,
    store: Arc<dyn BlobStore>,
}

impl BlobUploadCoordinator {
    pub fn new(repos: Repositories, store: Arc<dyn BlobStore>) -> Self {
        Self { repos, store }
    }

    /// Validates, stores and attaches an upload
    ///
    /// When `requester` is given, the caller must own the target: the user itself, the
    /// animal's owner or the log's author.
    ///
    /// # Errors
    ///
    /// - `Validation` for an unknown type, malformed id, empty file or missing file name
    /// - `NotFound` if the target record does not exist
    /// - `Forbidden` if `requester` does not own the target
    /// - `Internal` if the blob store fails
    pub async fn upload_and_attach(
        &self,
        upload: BlobUpload,
        requester: Option<&Identity>,
    ) -> ServiceResult<UploadReceipt> {
        let (target, target_id) = validate(&upload)?;

        let owner_id = self.resolve_owner(target, target_id).await?;
        if let Some(requester) = requester {
            if requester.id != owner_id {
                return Err(ServiceError::Forbidden(format!(
                    "Only the owner can upload a {}",
                    target
                )));
            }
        }

        let key = storage_key(&upload.file_name, Utc::now());
        let size = upload.bytes.len();
        let key = self
            .store
            .put(&key, upload.bytes, upload.content_type.as_deref())
            .await?;

        let replaced = match target {
            UploadTarget::UserImage => self.repos.users.set_user_picture(target_id, &key).await?,
            UploadTarget::AnimalImage => {
                self.repos.animals.set_animal_picture(target_id, &key).await?
            }
            UploadTarget::TrainingLogVideo => {
                self.repos
                    .training_logs
                    .set_training_log_video(target_id, &key)
                    .await?
            }
        }
        .ok_or_else(|| not_found(target))?;

        if let Some(previous) = &replaced {
            warn!(
                upload_target = %target,
                target_id = %target_id,
                orphaned_key = %previous,
                "Replaced blob key; previous blob is not reclaimed"
            );
        }

        info!(upload_target = %target, target_id = %target_id, key = %key, size, "Upload attached");

        Ok(UploadReceipt {
            target,
            target_id,
            key,
            replaced,
        })
    }

    /// Looks up the target and returns the user who owns it
    async fn resolve_owner(
        &self,
        target: UploadTarget,
        target_id: RecordId,
    ) -> ServiceResult<RecordId> {
        let owner = match target {
            UploadTarget::UserImage => self.repos.users.find_user(target_id).await?.map(|u| u.id),
            UploadTarget::AnimalImage => self
                .repos
                .animals
                .find_animal(target_id)
                .await?
                .map(|a| a.owner_id),
            UploadTarget::TrainingLogVideo => self
                .repos
                .training_logs
                .find_training_log(target_id)
                .await?
                .map(|l| l.user_id),
        };

        owner.ok_or_else(|| not_found(target))
    }
}

fn validate(upload: &BlobUpload) -> ServiceResult<(UploadTarget, RecordId)> {
    let mut details = Vec::new();

    let target = upload.kind.parse::<UploadTarget>();
    let target_id = upload
        .target_id
        .parse::<RecordId>()
        .map_err(|_| FieldError::new("id", "Id must be a valid identifier"));

    if upload.bytes.is_empty() {
        details.push(FieldError::new("file", "File must not be empty"));
    } else if upload.file_name.trim().is_empty() {
        details.push(FieldError::new("file", "File name is required"));
    }

    match (target, target_id) {
        (Ok(target), Ok(target_id)) if details.is_empty() => Ok((target, target_id)),
        (target, target_id) => {
            details.extend(target.err());
            details.extend(target_id.err());
            details.sort_by(|a, b| a.field.cmp(&b.field));
            Err(ServiceError::Validation(details))
        }
    }
}

fn not_found(target: UploadTarget) -> ServiceError {
    let what = match target {
        UploadTarget::UserImage => "User",
        UploadTarget::AnimalImage => "Animal",
        UploadTarget::TrainingLogVideo => "Training log",
    };
    ServiceError::NotFound(format!("{} not found", what))
}
