// ABOUTME: Photo service: uploads, listings, comment threads and owner-only deletion
// ABOUTME: Sequences blob store and document store calls and projects comments with author names

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::blob::{BlobError, BlobStore};
use crate::entities::photo::{self, Comment, CommentList};
use crate::error::{AppError, Result};
use crate::storage::Storage;
use crate::types::{CommentAuthor, CommentView, ImageUpload, PhotoSummary, PhotoView};

pub const ACCEPTED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
    "image/heic",
    "image/avif",
];

pub const NO_IMAGE: &str = "No image provided";
pub const UNSUPPORTED_IMAGE: &str = "Unsupported image type";
pub const EMPTY_COMMENT: &str = "Empty comment";
pub const PHOTO_NOT_FOUND: &str = "Photo not found";
pub const NOT_OWNER: &str = "Unauthorized - You can only delete your own photos";

#[derive(Clone)]
pub struct PhotoService {
    storage: Arc<Storage>,
    blobs: Arc<dyn BlobStore>,
}

impl PhotoService {
    pub fn new(storage: Arc<Storage>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { storage, blobs }
    }

    /// Writes the blob, then the record. A failed record write leaves the blob behind.
    pub async fn upload(&self, user_id: Uuid, upload: Option<ImageUpload>) -> Result<photo::Model> {
        let upload = upload
            .filter(|upload| !upload.bytes.is_empty())
            .ok_or_else(|| AppError::BadRequest(NO_IMAGE.to_string()))?;

        let accepted = upload
            .content_type
            .as_deref()
            .map(|ct| ACCEPTED_IMAGE_TYPES.contains(&ct.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !accepted {
            tracing::warn!(content_type = ?upload.content_type, "Rejected upload media type");
            return Err(AppError::BadRequest(UNSUPPORTED_IMAGE.to_string()));
        }

        let file_name = self
            .blobs
            .put(upload.original_name.as_deref(), &upload.bytes)
            .await?;

        let record = photo::Model {
            id: Uuid::new_v4(),
            user_id,
            file_name: file_name.clone(),
            date_time: Utc::now(),
            comments: CommentList::default(),
        };

        match self.storage.insert_photo(record).await {
            Ok(saved) => {
                tracing::info!(
                    photo_id = %saved.id,
                    %user_id,
                    file_name = %saved.file_name,
                    "Photo uploaded"
                );
                Ok(saved)
            }
            Err(err) => {
                tracing::warn!(%file_name, "Photo record write failed; blob left orphaned");
                Err(err.into())
            }
        }
    }

    /// Returns at most one arbitrary photo no matter how many exist.
    pub async fn list(&self) -> Result<Vec<PhotoSummary>> {
        let photo = self.storage.find_any_photo().await?;

        Ok(photo
            .into_iter()
            .map(|photo| PhotoSummary {
                id: photo.id,
                comment_count: photo.comments.len(),
                date_time: photo.date_time,
            })
            .collect())
    }

    /// Any authenticated caller may read any user's photos.
    pub async fn list_by_user(&self, owner_id: Uuid) -> Result<Vec<PhotoView>> {
        let photos = self.storage.find_photos_by_user(owner_id).await?;

        let author_ids: Vec<Uuid> = photos
            .iter()
            .flat_map(|photo| photo.comments.iter().map(|comment| comment.user_id))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let authors: HashMap<Uuid, CommentAuthor> = self
            .storage
            .get_users_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|user| {
                (
                    user.id,
                    CommentAuthor {
                        first_name: user.first_name,
                        last_name: user.last_name,
                    },
                )
            })
            .collect();

        Ok(photos
            .into_iter()
            .map(|photo| project_photo(photo, &authors))
            .collect())
    }

    /// No ownership check: anyone signed in may comment on any photo.
    pub async fn add_comment(&self, user_id: Uuid, photo_id: Uuid, text: &str) -> Result<Uuid> {
        if text.trim().is_empty() {
            return Err(AppError::BadRequest(EMPTY_COMMENT.to_string()));
        }

        let photo = self
            .storage
            .find_photo(photo_id)
            .await?
            .ok_or_else(|| AppError::NotFound(PHOTO_NOT_FOUND.to_string()))?;

        let comment = Comment {
            id: Uuid::new_v4(),
            comment: text.to_string(),
            date_time: Utc::now(),
            user_id,
        };
        let comment_id = comment.id;

        let mut comments = photo.comments.clone();
        comments.push(comment);
        self.storage.update_photo_comments(photo, comments).await?;

        tracing::info!(%photo_id, %comment_id, %user_id, "Comment added");
        Ok(comment_id)
    }

    /// Removes the blob first and the record second. Any blob failure other than
    /// "already gone" stops before the record is touched.
    pub async fn delete_photo(&self, user_id: Uuid, photo_id: Uuid) -> Result<()> {
        let photo = self
            .storage
            .find_photo(photo_id)
            .await?
            .ok_or_else(|| AppError::NotFound(PHOTO_NOT_FOUND.to_string()))?;

        if photo.user_id != user_id {
            return Err(AppError::Forbidden(NOT_OWNER.to_string()));
        }

        match self.blobs.delete(&photo.file_name).await {
            Ok(()) => {}
            Err(BlobError::NotFound(key)) => {
                tracing::info!(%photo_id, %key, "Blob already absent, removing record");
            }
            Err(err) => return Err(AppError::BlobDelete(err)),
        }

        if !self.storage.delete_photo(photo_id).await? {
            return Err(AppError::NotFound(PHOTO_NOT_FOUND.to_string()));
        }

        tracing::info!(%photo_id, %user_id, "Photo deleted");
        Ok(())
    }

    pub async fn read_image(&self, file_name: &str) -> Result<Vec<u8>> {
        match self.blobs.get(file_name).await {
            Ok(bytes) => Ok(bytes),
            Err(BlobError::NotFound(_)) => Err(AppError::NotFound("Image not found".to_string())),
            Err(BlobError::InvalidKey(_)) => {
                Err(AppError::BadRequest("Invalid image name".to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn project_photo(photo: photo::Model, authors: &HashMap<Uuid, CommentAuthor>) -> PhotoView {
    PhotoView {
        id: photo.id,
        file_name: photo.file_name,
        date_time: photo.date_time,
        user_id: photo.user_id,
        comments: photo
            .comments
            .0
            .into_iter()
            .map(|comment| CommentView {
                id: comment.id,
                user: authors.get(&comment.user_id).cloned(),
                comment: comment.comment,
                date_time: comment.date_time,
            })
            .collect(),
    }
}
