//! Product image storage on the local filesystem.

use crate::error::{ApiError, ApiResult};
use std::path::Path;
use uuid::Uuid;

/// Extensions accepted for uploads, lowercase and without the dot.
/// Anything else (`.html`, `.svg`, ...) would be served back verbatim.
const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Writes `bytes` into `upload_dir` under a fresh `<uuid><ext>` name.
///
/// The extension is taken from `original_name`, which must contain a `.`
/// and name an image format; it is stored lowercased. The directory is
/// created when missing. Returns the stored file name.
pub async fn store_image(upload_dir: &Path, original_name: &str, bytes: &[u8]) -> ApiResult<String> {
    if bytes.is_empty() {
        return Err(ApiError::api("File cannot be null or empty"));
    }

    let extension = extension_of(original_name).ok_or_else(|| ApiError::api("Invalid file name"))?;
    let normalized = extension.to_ascii_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&normalized.trim_start_matches('.')) {
        tracing::warn!(event = "catalog.image_rejected", extension = %extension);
        return Err(ApiError::api(format!("Unsupported image type: {}", extension)));
    }
    let file_name = format!("{}{}", Uuid::new_v4(), normalized);

    tokio::fs::create_dir_all(upload_dir).await?;
    tokio::fs::write(upload_dir.join(&file_name), bytes).await?;

    tracing::info!(
        event = "catalog.image_stored",
        file_name = %file_name,
        size = bytes.len(),
    );
    Ok(file_name)
}

/// `".png"` for `"photo.png"`; `None` when the name has no dot.
fn extension_of(original_name: &str) -> Option<&str> {
    let name = Path::new(original_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(original_name);
    name.rfind('.').map(|idx| &name[idx..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("photo.png"), Some(".png"));
        assert_eq!(extension_of("archive.tar.gz"), Some(".gz"));
        assert_eq!(extension_of("../../etc/shadow.jpg"), Some(".jpg"));
        assert_eq!(extension_of("README"), None);
    }

    #[tokio::test]
    async fn test_store_image_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("images");

        let name = store_image(&dir, "cat.jpeg", b"\xff\xd8\xff").await.unwrap();
        assert!(name.ends_with(".jpeg"));
        assert_eq!(std::fs::read(dir.join(&name)).unwrap(), b"\xff\xd8\xff");
    }

    #[tokio::test]
    async fn test_store_image_rejects_bad_input() {
        let tmp = tempfile::tempdir().unwrap();
        let err = store_image(tmp.path(), "noext", b"data").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid file name");

        let err = store_image(tmp.path(), "a.png", b"").await.unwrap_err();
        assert_eq!(err.to_string(), "File cannot be null or empty");
    }

    #[tokio::test]
    async fn test_store_image_only_accepts_image_types() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["page.html", "logo.svg", "x.htm", "run.js", "photo.png.html"] {
            let err = store_image(tmp.path(), name, b"<script>").await.unwrap_err();
            assert!(err.to_string().starts_with("Unsupported image type: ."), "{}", name);
        }
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);

        let name = store_image(tmp.path(), "Photo.JPG", b"\xff\xd8").await.unwrap();
        assert!(name.ends_with(".jpg"));
        let name = store_image(tmp.path(), "anim.webp", b"RIFF").await.unwrap();
        assert!(name.ends_with(".webp"));
    }
}
