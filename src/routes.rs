// ABOUTME: HTTP handlers and the route table for the photo API
// ABOUTME: Protected routes sit behind the auth gate; listing, images and health are public

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Extension, Multipart, Path, State,
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::{StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::AppState;
use crate::blob;
use crate::error::{AppError, Result};
use crate::middleware::require_auth;
use crate::photos::EMPTY_COMMENT;
use crate::session::AuthenticatedUser;
use crate::types::{
    AddCommentRequest, AddCommentResponse, ImageUpload, MessageResponse, PhotoSummary, PhotoView,
    UploadResponse,
};

const PHOTO_FIELD: &str = "photo";
const IMAGE_TOO_LARGE: &str = "Image too large";

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    let protected = Router::new()
        .route("/new", post(upload_photo))
        .route("/photoOfUser/:id", get(photos_of_user))
        .route("/commentOfPhoto/:photo_id", post(add_comment))
        .route("/delete/:photo_id", delete(delete_photo))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let photo_routes = Router::new()
        .route("/list", get(list_photos))
        .merge(protected);

    Router::new()
        .nest("/api/photo", photo_routes)
        .route("/images/:file_name", get(serve_image))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn upload_photo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let upload = match multipart {
        Ok(multipart) => read_photo_field(multipart).await?,
        Err(rejection) => {
            tracing::debug!("Upload without a multipart body: {}", rejection);
            None
        }
    };

    let photo = state.photos.upload(user.user_id, upload).await?;

    Ok(Json(UploadResponse {
        message: "Photo uploaded successfully".to_string(),
        id: photo.id,
        file_name: photo.file_name,
    }))
}

async fn read_photo_field(mut multipart: Multipart) -> Result<Option<ImageUpload>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }

        let original_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(multipart_error)?
            .to_vec();

        return Ok(Some(ImageUpload {
            original_name,
            content_type,
            bytes,
        }));
    }

    Ok(None)
}

fn multipart_error(err: MultipartError) -> AppError {
    tracing::debug!("Multipart read failed: {}", err);
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(IMAGE_TOO_LARGE.to_string())
    } else {
        AppError::BadRequest("Invalid multipart body".to_string())
    }
}

fn comment_body_error(rejection: JsonRejection) -> AppError {
    tracing::debug!("Comment body rejected: {}", rejection);
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::BadRequest(EMPTY_COMMENT.to_string())
        }
        JsonRejection::JsonDataError(_) => {
            AppError::BadRequest("Comment must be a string".to_string())
        }
        _ => AppError::BadRequest("Malformed comment body".to_string()),
    }
}

async fn list_photos(State(state): State<AppState>) -> Result<Json<Vec<PhotoSummary>>> {
    let photos = state.photos.list().await.inspect_err(|err| {
        tracing::error!("Photo listing failed: {}", err);
    })?;

    Ok(Json(photos))
}

async fn photos_of_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PhotoView>>> {
    let owner_id = Uuid::parse_str(&id)?;
    let photos = state.photos.list_by_user(owner_id).await?;

    Ok(Json(photos))
}

async fn add_comment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(photo_id): Path<String>,
    body: std::result::Result<Json<AddCommentRequest>, JsonRejection>,
) -> Result<Json<AddCommentResponse>> {
    let photo_id = Uuid::parse_str(&photo_id)?;
    let Json(req) = body.map_err(comment_body_error)?;
    let text = req.comment.unwrap_or_default();

    let comment_id = state
        .photos
        .add_comment(user.user_id, photo_id, &text)
        .await?;

    Ok(Json(AddCommentResponse {
        message: "Comment added successfully".to_string(),
        id: comment_id,
    }))
}

async fn delete_photo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(photo_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let photo_id = Uuid::parse_str(&photo_id)?;
    state.photos.delete_photo(user.user_id, photo_id).await?;

    Ok(Json(MessageResponse {
        message: "Photo deleted successfully".to_string(),
    }))
}

async fn serve_image(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse> {
    let bytes = state.photos.read_image(&file_name).await?;

    Ok(([(header::CONTENT_TYPE, blob::content_type_for(&file_name))], bytes))
}
