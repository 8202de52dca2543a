use actix_multipart::Field;
use actix_web::{error, web, Error};
use futures::StreamExt;
use std::path::Path;

/// Uploads larger than this are refused outright.
pub const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

/// Subdirectory of the media directory holding post images.
pub const POST_IMAGE_DIR: &str = "posts";

/// An uploaded file held in memory until its form validates.
pub struct UploadPayload {
    pub data: Vec<u8>,
    pub filename: String,
    pub hash: blake3::Hash,
}

impl UploadPayload {
    /// File extension derived from the leading bytes, or None when this is not an image we accept.
    pub fn image_extension(&self) -> Option<&'static str> {
        sniff_image_extension(&self.data)
    }

    /// Content addressed path under the media directory, i.e. `posts/<blake3>.png`.
    pub fn relative_path(&self) -> Option<String> {
        self.image_extension()
            .map(|ext| format!("{}/{}.{}", POST_IMAGE_DIR, self.hash, ext))
    }
}

pub fn get_file_url(relative_path: &str) -> String {
    format!("/media/{}", relative_path)
}

pub fn sniff_image_extension(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some("gif")
    } else if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("png")
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpg")
    } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        Some("webp")
    } else {
        None
    }
}

/// Reads a multipart text field as UTF-8.
pub async fn read_text_field(field: &mut Field) -> Result<String, Error> {
    let mut buf: Vec<u8> = Vec::new();
    while let Some(chunk) = field.next().await {
        let bytes = chunk.map_err(|e| {
            log::error!("read_text_field: multipart read error: {}", e);
            error::ErrorBadRequest("Error reading form data.")
        })?;
        if buf.len() + bytes.len() > MAX_IMAGE_BYTES {
            return Err(error::ErrorPayloadTooLarge("Form field is too large."));
        }
        buf.extend_from_slice(&bytes);
    }

    String::from_utf8(buf).map_err(|_| error::ErrorBadRequest("Form field is not valid UTF-8."))
}

/// Reads a multipart file field into memory, hashing as it goes.
/// Returns None when the browser submitted the field without choosing a file.
pub async fn read_file_field(field: &mut Field) -> Result<Option<UploadPayload>, Error> {
    let filename = field
        .content_disposition()
        .get_filename()
        .unwrap_or_default()
        .to_owned();

    let mut hasher = blake3::Hasher::new();
    let mut buf: Vec<u8> = Vec::with_capacity(1024);
    while let Some(chunk) = field.next().await {
        let bytes = chunk.map_err(|e| {
            log::error!("read_file_field: multipart read error: {}", e);
            error::ErrorBadRequest("Error reading upload data.")
        })?;
        if buf.len() + bytes.len() > MAX_IMAGE_BYTES {
            return Err(error::ErrorPayloadTooLarge("Upload is too large."));
        }
        hasher.update(&bytes);
        buf.extend_from_slice(&bytes);
    }

    if buf.is_empty() && filename.is_empty() {
        return Ok(None);
    }

    Ok(Some(UploadPayload {
        data: buf,
        filename,
        hash: hasher.finalize(),
    }))
}

/// Writes an accepted image under the media directory and returns its relative path.
/// Identical uploads share one file.
pub async fn save_image(media_dir: &Path, payload: UploadPayload) -> Result<String, Error> {
    let relative_path = payload
        .relative_path()
        .ok_or_else(|| error::ErrorBadRequest("Upload is not a supported image."))?;
    let path = media_dir.join(&relative_path);
    log::info!("Storing upload {:?} as {}", payload.filename, relative_path);

    let res = web::block(move || -> std::io::Result<()> {
        if path.exists() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            std::fs::DirBuilder::new().recursive(true).create(parent)?;
        }
        std::fs::write(&path, &payload.data)
    })
    .await
    .map_err(error::ErrorInternalServerError)?;

    res.map_err(|e| {
        log::error!("save_image: failed to write {}: {}", relative_path, e);
        error::ErrorInternalServerError("Failed to store upload.")
    })?;

    Ok(relative_path)
}
