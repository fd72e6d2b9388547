use std::path::PathBuf;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0}")]
    InvalidDataUri(String),

    #[error("image exceeds size limit ({actual} > {limit} bytes)")]
    TooLarge { actual: u64, limit: u64 },

    #[error("media IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An image decoded from a `data:image/<ext>;base64,<payload>` URI.
#[derive(Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub extension: String,
    pub bytes: Vec<u8>,
}

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpeg", "jpg", "gif", "webp"];

/// Parse a base64 image data URI as sent by the recipe form.
pub fn decode_data_uri(uri: &str) -> Result<DecodedImage, MediaError> {
    let rest = uri
        .trim()
        .strip_prefix("data:image/")
        .ok_or_else(|| MediaError::InvalidDataUri("Image must be a data:image/ URI".into()))?;
    let (extension, payload) = rest.split_once(";base64,").ok_or_else(|| {
        MediaError::InvalidDataUri("Image data URI must be base64-encoded".into())
    })?;

    let extension = extension.to_ascii_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(MediaError::InvalidDataUri(format!(
            "Unsupported image type: {extension}"
        )));
    }

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| MediaError::InvalidDataUri(format!("Invalid base64 image data: {e}")))?;
    if bytes.is_empty() {
        return Err(MediaError::InvalidDataUri("Image must not be empty".into()));
    }

    Ok(DecodedImage { extension, bytes })
}

/// Storage for uploaded recipe images.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store an image and return the public URL path it is served under.
    async fn put_image(&self, image: &DecodedImage) -> Result<String, MediaError>;
}

/// Filesystem-backed image store.
///
/// Files are content-addressed: `{root}/recipes/{sha256}.{ext}`, so re-uploading
/// the same image is a no-op.
pub struct FilesystemMediaStore {
    root: PathBuf,
    url_prefix: String,
    max_size: u64,
}

impl FilesystemMediaStore {
    pub async fn new(root: PathBuf, url_prefix: String, max_size: u64) -> Result<Self, MediaError> {
        fs::create_dir_all(root.join("recipes")).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self {
            root,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
            max_size,
        })
    }

    fn temp_path(&self) -> PathBuf {
        self.root
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl MediaStore for FilesystemMediaStore {
    async fn put_image(&self, image: &DecodedImage) -> Result<String, MediaError> {
        let size = image.bytes.len() as u64;
        if size > self.max_size {
            return Err(MediaError::TooLarge {
                actual: size,
                limit: self.max_size,
            });
        }

        let file_name = format!(
            "{}.{}",
            hex::encode(Sha256::digest(&image.bytes)),
            image.extension
        );
        let relative = format!("recipes/{file_name}");
        let target = self.root.join(&relative);

        if !target.exists() {
            let temp_path = self.temp_path();
            if let Err(e) = fs::write(&temp_path, &image.bytes).await {
                let _ = fs::remove_file(&temp_path).await;
                return Err(e.into());
            }
            if let Err(e) = fs::rename(&temp_path, &target).await {
                let _ = fs::remove_file(&temp_path).await;
                return Err(e.into());
            }
        }

        Ok(format!("{}/{relative}", self.url_prefix))
    }
}
