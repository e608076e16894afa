// ABOUTME: Tests for the photo service rules over a real SQLite store and on-disk blobs
// ABOUTME: Covers upload validation, comment appends, author projection and owner-only deletion

#[cfg(test)]
mod tests {
    use super::super::blob::{BlobError, BlobStore, FsBlobStore};
    use super::super::entities::user;
    use super::super::error::AppError;
    use super::super::photos::*;
    use super::super::storage::Storage;
    use super::super::types::ImageUpload;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;
    use uuid::Uuid;

    struct Harness {
        service: PhotoService,
        storage: Arc<Storage>,
        image_dir: PathBuf,
        _temp_dir: TempDir,
    }

    async fn create_harness() -> Harness {
        let temp_dir = TempDir::new().unwrap();
        let db_url = format!("sqlite:{}?mode=rwc", temp_dir.path().join("test.db").display());
        let image_dir = temp_dir.path().join("images");

        let storage = Arc::new(Storage::new(&db_url).await.unwrap());
        let blobs = Arc::new(FsBlobStore::new(&image_dir).await.unwrap());

        Harness {
            service: PhotoService::new(storage.clone(), blobs),
            storage,
            image_dir,
            _temp_dir: temp_dir,
        }
    }

    /// Stores fine but cannot delete anything.
    struct StuckBlobStore;

    #[async_trait]
    impl BlobStore for StuckBlobStore {
        async fn put(&self, _name: Option<&str>, _bytes: &[u8]) -> Result<String, BlobError> {
            Ok(format!("stuck-{}.png", Uuid::new_v4()))
        }

        async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
            Err(BlobError::NotFound(key.to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<(), BlobError> {
            Err(BlobError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only volume",
            )))
        }
    }

    fn png(bytes: &[u8]) -> Option<ImageUpload> {
        Some(ImageUpload {
            original_name: Some("sunset.png".to_string()),
            content_type: Some("image/png".to_string()),
            bytes: bytes.to_vec(),
        })
    }

    async fn seed_user(storage: &Storage, first: &str, last: &str) -> Uuid {
        let model = user::Model {
            id: Uuid::new_v4(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            login_name: first.to_lowercase(),
            password: "pw".to_string(),
            location: String::new(),
            description: String::new(),
            occupation: String::new(),
        };
        storage.store_user(model).await.unwrap().id
    }

    #[tokio::test]
    async fn test_upload_without_payload_creates_nothing() {
        let h = create_harness().await;
        let user_id = Uuid::new_v4();

        let missing = h.service.upload(user_id, None).await;
        assert!(matches!(missing, Err(AppError::BadRequest(msg)) if msg == NO_IMAGE));

        let empty = h.service.upload(user_id, png(b"")).await;
        assert!(matches!(empty, Err(AppError::BadRequest(msg)) if msg == NO_IMAGE));

        assert!(h.storage.find_photos_by_user(user_id).await.unwrap().is_empty());
        assert_eq!(std::fs::read_dir(&h.image_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image_types() {
        let h = create_harness().await;
        let user_id = Uuid::new_v4();

        let upload = Some(ImageUpload {
            original_name: Some("notes.txt".to_string()),
            content_type: Some("text/plain".to_string()),
            bytes: b"hello".to_vec(),
        });
        let result = h.service.upload(user_id, upload).await;
        assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg == UNSUPPORTED_IMAGE));

        let untyped = Some(ImageUpload {
            original_name: Some("mystery.png".to_string()),
            content_type: None,
            bytes: b"hello".to_vec(),
        });
        assert!(h.service.upload(user_id, untyped).await.is_err());

        assert!(h.storage.find_photos_by_user(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_creates_owned_record_and_blob() {
        let h = create_harness().await;
        let user_id = Uuid::new_v4();

        let photo = h.service.upload(user_id, png(b"\x89PNG")).await.unwrap();

        assert_eq!(photo.user_id, user_id);
        assert!(photo.file_name.ends_with(".png"));
        assert!(photo.comments.0.is_empty());
        assert_eq!(
            std::fs::read(h.image_dir.join(&photo.file_name)).unwrap(),
            b"\x89PNG"
        );

        let listed = h.service.list_by_user(user_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, photo.id);
    }

    #[tokio::test]
    async fn test_repeated_uploads_get_unique_file_names() {
        let h = create_harness().await;
        let user_id = Uuid::new_v4();

        let mut names = HashSet::new();
        for _ in 0..25 {
            let photo = h.service.upload(user_id, png(b"same bytes")).await.unwrap();
            names.insert(photo.file_name);
        }

        assert_eq!(names.len(), 25);
        assert_eq!(h.service.list_by_user(user_id).await.unwrap().len(), 25);
    }

    #[tokio::test]
    async fn test_whitespace_comment_is_rejected() {
        let h = create_harness().await;
        let owner = Uuid::new_v4();
        let photo = h.service.upload(owner, png(b"img")).await.unwrap();

        let result = h.service.add_comment(owner, photo.id, "   ").await;
        assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg == EMPTY_COMMENT));

        let result = h.service.add_comment(owner, photo.id, "").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let stored = h.storage.find_photo(photo.id).await.unwrap().unwrap();
        assert_eq!(stored.comments.len(), 0);
    }

    #[tokio::test]
    async fn test_comment_appends_exactly_one_with_caller_identity() {
        let h = create_harness().await;
        let owner = Uuid::new_v4();
        let commenter = Uuid::new_v4();
        let photo = h.service.upload(owner, png(b"img")).await.unwrap();

        h.service.add_comment(owner, photo.id, "first!").await.unwrap();
        let before = h.storage.find_photo(photo.id).await.unwrap().unwrap();

        let comment_id = h
            .service
            .add_comment(commenter, photo.id, "nice!")
            .await
            .unwrap();

        let after = h.storage.find_photo(photo.id).await.unwrap().unwrap();
        assert_eq!(after.comments.len(), before.comments.len() + 1);

        let last = after.comments.iter().last().unwrap();
        assert_eq!(last.id, comment_id);
        assert_eq!(last.comment, "nice!");
        assert_eq!(last.user_id, commenter);
    }

    #[tokio::test]
    async fn test_comment_on_missing_photo_is_not_found() {
        let h = create_harness().await;

        let result = h
            .service
            .add_comment(Uuid::new_v4(), Uuid::new_v4(), "hello")
            .await;
        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg == PHOTO_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_non_owner_delete_is_forbidden_and_harmless() {
        let h = create_harness().await;
        let owner = Uuid::new_v4();
        let photo = h.service.upload(owner, png(b"keep me")).await.unwrap();

        let result = h.service.delete_photo(Uuid::new_v4(), photo.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(msg)) if msg == NOT_OWNER));

        assert!(h.storage.find_photo(photo.id).await.unwrap().is_some());
        assert!(h.image_dir.join(&photo.file_name).exists());
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found_the_second_time() {
        let h = create_harness().await;
        let owner = Uuid::new_v4();
        let photo = h.service.upload(owner, png(b"bye")).await.unwrap();

        h.service.delete_photo(owner, photo.id).await.unwrap();
        assert!(h.storage.find_photo(photo.id).await.unwrap().is_none());
        assert!(!h.image_dir.join(&photo.file_name).exists());

        let again = h.service.delete_photo(owner, photo.id).await;
        assert!(matches!(again, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_tolerates_already_missing_blob() {
        let h = create_harness().await;
        let owner = Uuid::new_v4();
        let photo = h.service.upload(owner, png(b"gone")).await.unwrap();

        std::fs::remove_file(h.image_dir.join(&photo.file_name)).unwrap();

        h.service.delete_photo(owner, photo.id).await.unwrap();
        assert!(h.storage.find_photo(photo.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_blob_failure_keeps_record() {
        let h = create_harness().await;
        let service = PhotoService::new(h.storage.clone(), Arc::new(StuckBlobStore));
        let owner = Uuid::new_v4();
        let photo = service.upload(owner, png(b"stuck")).await.unwrap();

        let result = service.delete_photo(owner, photo.id).await;
        assert!(matches!(result, Err(AppError::BlobDelete(_))));
        assert!(h.storage.find_photo(photo.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_by_user_with_no_photos_is_empty() {
        let h = create_harness().await;

        let photos = h.service.list_by_user(Uuid::new_v4()).await.unwrap();
        assert!(photos.is_empty());
    }

    #[tokio::test]
    async fn test_list_by_user_resolves_authors_and_tolerates_removed_ones() {
        let h = create_harness().await;
        let owner = seed_user(&h.storage, "Ada", "Lovelace").await;
        let guest = seed_user(&h.storage, "Grace", "Hopper").await;
        let photo = h.service.upload(owner, png(b"img")).await.unwrap();

        h.service.add_comment(owner, photo.id, "my photo").await.unwrap();
        h.service.add_comment(guest, photo.id, "lovely").await.unwrap();
        h.storage.delete_user(guest).await.unwrap();

        let views = h.service.list_by_user(owner).await.unwrap();
        assert_eq!(views.len(), 1);

        let view = &views[0];
        assert_eq!(view.user_id, owner);
        assert_eq!(view.file_name, photo.file_name);
        assert_eq!(view.comments.len(), 2);

        assert_eq!(view.comments[0].comment, "my photo");
        let author = view.comments[0].user.as_ref().unwrap();
        assert_eq!(author.first_name, "Ada");
        assert_eq!(author.last_name, "Lovelace");

        assert_eq!(view.comments[1].comment, "lovely");
        assert!(view.comments[1].user.is_none());
    }

    #[tokio::test]
    async fn test_list_returns_at_most_one_summary() {
        let h = create_harness().await;
        assert!(h.service.list().await.unwrap().is_empty());

        let owner = Uuid::new_v4();
        let first = h.service.upload(owner, png(b"1")).await.unwrap();
        h.service.add_comment(owner, first.id, "one").await.unwrap();
        h.service.upload(owner, png(b"2")).await.unwrap();
        h.service.upload(owner, png(b"3")).await.unwrap();

        let listed = h.service.list().await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_read_image_maps_blob_errors() {
        let h = create_harness().await;
        let photo = h.service.upload(Uuid::new_v4(), png(b"pixels")).await.unwrap();

        assert_eq!(h.service.read_image(&photo.file_name).await.unwrap(), b"pixels");
        assert!(matches!(
            h.service.read_image("1-1.png").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            h.service.read_image("..secret").await,
            Err(AppError::BadRequest(_))
        ));
    }
}
