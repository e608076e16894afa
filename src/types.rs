// ABOUTME: Request and response shapes for the photo API
// ABOUTME: Includes the client-facing PhotoView projection with resolved comment authors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image payload pulled out of the upload form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub original_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub id: Uuid,
    pub file_name: String,
}

/// Thin listing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSummary {
    pub id: Uuid,
    pub comment_count: usize,
    pub date_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub comment: String,
    pub date_time: DateTime<Utc>,
    // None once the author's account is gone
    pub user: Option<CommentAuthor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoView {
    pub id: Uuid,
    pub file_name: String,
    pub date_time: DateTime<Utc>,
    pub user_id: Uuid,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddCommentRequest {
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddCommentResponse {
    pub message: String,
    pub id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
