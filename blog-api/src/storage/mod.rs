use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

use crate::errors::StorageError;

type StorageResult<T> = Result<T, StorageError>;

pub const PICTURE_BYTES_MAX: usize = 2_000_000;
const PICTURE_DIR: &str = "profile_pics";

/// Where profile pictures live. Profiles only keep the returned reference.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn save(&self, bytes: &[u8], extension: &str) -> StorageResult<String>;
    async fn load(&self, reference: &str) -> StorageResult<Vec<u8>>;
    async fn remove(&self, reference: &str) -> StorageResult<()>;
}

/// File extension for an accepted picture type, judged by content.
pub fn picture_extension(bytes: &[u8]) -> Option<&'static str> {
    match infer::get(bytes)?.mime_type() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        _ => None,
    }
}

pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, reference: &str) -> StorageResult<PathBuf> {
        let bad = || StorageError::BadReference {
            reference: reference.to_owned(),
        };
        let name = reference
            .strip_prefix(PICTURE_DIR)
            .and_then(|r| r.strip_prefix('/'))
            .ok_or_else(bad)?;
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(bad());
        }
        Ok(self.root.join(PICTURE_DIR).join(name))
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn save(&self, bytes: &[u8], extension: &str) -> StorageResult<String> {
        let dir = self.root.join(PICTURE_DIR);
        tokio::fs::create_dir_all(&dir).await?;
        let reference = format!("{}/{}.{}", PICTURE_DIR, Uuid::new_v4(), extension);
        let path = self.resolve(&reference)?;
        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        debug!("stored {} bytes at {}", bytes.len(), display(&path));
        Ok(reference)
    }

    async fn load(&self, reference: &str) -> StorageResult<Vec<u8>> {
        let path = self.resolve(reference)?;
        let mut buf = vec![];
        let f = tokio::fs::File::open(&path).await?;
        let mut reader = tokio::io::BufReader::new(f);
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    async fn remove(&self, reference: &str) -> StorageResult<()> {
        let path = self.resolve(reference)?;
        match tokio::fs::remove_file(&path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Smallest byte prefix `infer` recognises as a JPEG.
    pub const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
    pub const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn only_jpeg_and_png_are_accepted() {
        assert_eq!(picture_extension(JPEG_MAGIC), Some("jpg"));
        assert_eq!(picture_extension(PNG_MAGIC), Some("png"));
        assert_eq!(picture_extension(b"GIF89a......"), None);
        assert_eq!(picture_extension(b"plain text"), None);
    }

    #[tokio::test]
    async fn save_load_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path());
        let reference = store.save(JPEG_MAGIC, "jpg").await.unwrap();
        assert!(reference.starts_with("profile_pics/"));
        assert!(reference.ends_with(".jpg"));
        assert_eq!(store.load(&reference).await.unwrap(), JPEG_MAGIC);

        store.remove(&reference).await.unwrap();
        assert!(store.load(&reference).await.is_err());
        // removing twice is harmless
        store.remove(&reference).await.unwrap();
    }

    #[tokio::test]
    async fn references_cannot_escape_the_picture_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path());
        for reference in ["../etc/passwd", "profile_pics/../x", "profile_pics/", "other/a.jpg"] {
            assert!(
                matches!(
                    store.load(reference).await,
                    Err(StorageError::BadReference { .. })
                ),
                "{reference}"
            );
        }
    }
}
