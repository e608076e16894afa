// ABOUTME: Blob store contract for raw image bytes plus the on-disk implementation
// ABOUTME: Generates collision-resistant keys from time, randomness and the original extension

use async_trait::async_trait;
use rand::Rng;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWrite, AsyncWriteExt};

const MAX_EXTENSION_LEN: usize = 10;
const MAX_KEY_ATTEMPTS: usize = 5;
const RANDOM_SPAN: u32 = 1_000_000_000;

#[derive(Debug)]
pub enum BlobError {
    NotFound(String),
    InvalidKey(String),
    Io(std::io::Error),
}

impl fmt::Display for BlobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobError::NotFound(key) => write!(f, "blob '{}' does not exist", key),
            BlobError::InvalidKey(key) => write!(f, "invalid blob key '{}'", key),
            BlobError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for BlobError {}

impl From<std::io::Error> for BlobError {
    fn from(err: std::io::Error) -> Self {
        BlobError::Io(err)
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under a freshly generated key and returns that key.
    async fn put(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String, BlobError>;

    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError>;

    /// Fails with `BlobError::NotFound` when nothing is stored under `key`.
    async fn delete(&self, key: &str) -> Result<(), BlobError>;
}

/// `<unix-millis>-<random><.ext>`, keeping the original extension when it is plain alphanumerics.
pub fn generate_key(original_name: Option<&str>) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random = rand::thread_rng().gen_range(0..RANDOM_SPAN);
    format!("{}-{}{}", millis, random, extension_of(original_name))
}

fn extension_of(original_name: Option<&str>) -> String {
    original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

pub fn validate_key(key: &str) -> Result<(), BlobError> {
    let escapes = key.is_empty()
        || key.starts_with('.')
        || key.contains("..")
        || key.contains('/')
        || key.contains('\\')
        || key.contains('\0');
    if escapes {
        return Err(BlobError::InvalidKey(key.to_string()));
    }
    Ok(())
}

pub fn content_type_for(key: &str) -> &'static str {
    let ext = Path::new(key)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Writes the blob body, removing the half-written file if the write fails.
async fn write_or_discard<W>(path: &Path, writer: &mut W, bytes: &[u8]) -> Result<(), BlobError>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        writer.write_all(bytes).await?;
        writer.flush().await
    }
    .await;

    if let Err(err) = written {
        if let Err(cleanup) = tokio::fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), "Failed to remove partial blob: {}", cleanup);
        }
        return Err(err.into());
    }

    Ok(())
}

pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, BlobError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, BlobError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String, BlobError> {
        let mut last_err = None;

        for _ in 0..MAX_KEY_ATTEMPTS {
            let key = generate_key(original_name);
            let path = self.path_for(&key)?;

            // create_new refuses to clobber a blob that won the same key
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;

            match opened {
                Ok(mut file) => {
                    write_or_discard(&path, &mut file, bytes).await?;
                    tracing::debug!(key = %key, size = bytes.len(), "Stored blob");
                    return Ok(key);
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!(key = %key, "Blob key collision, regenerating");
                    last_err = Some(err);
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(BlobError::Io(last_err.unwrap_or_else(|| {
            std::io::Error::new(ErrorKind::AlreadyExists, "exhausted blob key attempts")
        })))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(BlobError::NotFound(key.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(BlobError::NotFound(key.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}
