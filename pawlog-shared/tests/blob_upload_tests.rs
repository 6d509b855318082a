/// Integration tests for upload-and-attach

mod common;

use bytes::Bytes;
use common::Harness;
use pawlog_shared::blob::{BlobUpload, UploadTarget};
use pawlog_shared::error::ServiceError;

fn upload(kind: &str, id: impl ToString, name: &str) -> BlobUpload {
    BlobUpload {
        kind: kind.to_string(),
        target_id: id.to_string(),
        file_name: name.to_string(),
        content_type: Some("image/png".to_string()),
        bytes: Bytes::from_static(b"\x89PNG fake image"),
    }
}

#[tokio::test]
async fn test_animal_image_touches_only_profile_picture() {
    let h = Harness::new();
    let alice = h.register("alice@example.com").await;
    let rex = h.add_animal(&alice, "Rex").await;
    let before = h.repos.animals.find_animal(rex).await.unwrap().unwrap();

    let receipt = h
        .uploads
        .upload_and_attach(upload("animalImage", rex, "rex.png"), None)
        .await
        .unwrap();

    let after = h.repos.animals.find_animal(rex).await.unwrap().unwrap();
    assert_eq!(receipt.target, UploadTarget::AnimalImage);
    assert_eq!(after.profile_picture.as_deref(), Some(receipt.key.as_str()));
    assert_eq!(after.name, before.name);
    assert_eq!(after.hours_trained, before.hours_trained);
    assert_eq!(after.owner_id, before.owner_id);
    assert_eq!(after.date_of_birth, before.date_of_birth);

    let stored = h.blobs.get(&receipt.key).await.expect("blob should be stored");
    assert_eq!(stored.content_type.as_deref(), Some("image/png"));
}

#[tokio::test]
async fn test_user_image_and_training_video() {
    let h = Harness::new();
    let alice = h.register("alice@example.com").await;
    let rex = h.add_animal(&alice, "Rex").await;
    let log = h.add_log(&alice, rex, 1.0).await;

    let picture = h
        .uploads
        .upload_and_attach(upload("userImage", alice.id, "me.png"), None)
        .await
        .unwrap();
    let video = h
        .uploads
        .upload_and_attach(upload("trainingLogVideo", log, "session.mp4"), None)
        .await
        .unwrap();

    let user = h.repos.users.find_user(alice.id).await.unwrap().unwrap();
    assert_eq!(user.profile_picture, Some(picture.key));

    let log = h.repos.training_logs.find_training_log(log).await.unwrap().unwrap();
    assert_eq!(log.training_log_video, Some(video.key));
    assert!(video.replaced.is_none());
}

#[tokio::test]
async fn test_reupload_replaces_key_and_keeps_old_blob() {
    let h = Harness::new();
    let alice = h.register("alice@example.com").await;

    let first = h
        .uploads
        .upload_and_attach(upload("userImage", alice.id, "me.png"), None)
        .await
        .unwrap();
    let second = h
        .uploads
        .upload_and_attach(upload("userImage", alice.id, "me.png"), None)
        .await
        .unwrap();

    assert_ne!(first.key, second.key);
    assert_eq!(second.replaced, Some(first.key.clone()));
    assert!(h.blobs.get(&first.key).await.is_some());
    assert_eq!(h.blobs.len().await, 2);
}

#[tokio::test]
async fn test_missing_target_is_not_found_and_stores_nothing() {
    let h = Harness::new();

    let err = h
        .uploads
        .upload_and_attach(upload("animalImage", 42, "rex.png"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(_)));
    assert!(h.blobs.is_empty().await);
}

#[tokio::test]
async fn test_bad_kind_or_id_is_validation_error() {
    let h = Harness::new();

    let bad_kind = h
        .uploads
        .upload_and_attach(upload("avatar", 1, "x.png"), None)
        .await
        .unwrap_err();
    let bad_id = h
        .uploads
        .upload_and_attach(upload("userImage", "-3", "x.png"), None)
        .await
        .unwrap_err();

    assert!(matches!(bad_kind, ServiceError::Validation(_)));
    assert!(matches!(bad_id, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_requester_must_own_target() {
    let h = Harness::new();
    let alice = h.register("alice@example.com").await;
    let mallory = h.register("mallory@example.com").await;
    let rex = h.add_animal(&alice, "Rex").await;

    let err = h
        .uploads
        .upload_and_attach(upload("animalImage", rex, "rex.png"), Some(&mallory))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    h.uploads
        .upload_and_attach(upload("animalImage", rex, "rex.png"), Some(&alice))
        .await
        .unwrap();
}
