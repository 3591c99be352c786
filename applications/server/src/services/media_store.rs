/// Media file storage on the local filesystem
use std::path::{Component, Path, PathBuf};

use wavecast_core::{Track, TrackId, Username};

use crate::error::{Result, ServerError};

const MUSIC_DIR: &str = "music";
const COVERS_DIR: &str = "covers";
const AVATARS_DIR: &str = "avatars";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Owns the media directory layout: `music/` for audio, `covers/` for
/// track artwork, `avatars/` for profile pictures. Stored paths are
/// relative to the base so the directory can be moved wholesale.
pub struct MediaStore {
    base_path: PathBuf,
}

impl MediaStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Create the directory layout if it does not exist yet
    pub async fn initialize(&self) -> Result<()> {
        for dir in [MUSIC_DIR, COVERS_DIR, AVATARS_DIR] {
            tokio::fs::create_dir_all(self.base_path.join(dir)).await?;
        }
        tracing::info!(base = %self.base_path.display(), "Media store initialized");
        Ok(())
    }

    /// Write an uploaded audio file. Returns the media-relative path.
    pub async fn store_audio(&self, track_id: &TrackId, data: &[u8]) -> Result<String> {
        let relative = format!("{}/{}.mp3", MUSIC_DIR, track_id);
        tokio::fs::write(self.base_path.join(&relative), data).await?;
        Ok(relative)
    }

    /// Write track cover art. Returns the media-relative path.
    pub async fn store_cover(&self, track_id: &TrackId, ext: &str, data: &[u8]) -> Result<String> {
        let relative = format!("{}/{}.{}", COVERS_DIR, track_id, ext);
        tokio::fs::write(self.base_path.join(&relative), data).await?;
        Ok(relative)
    }

    /// Write a user avatar, replacing any previous one. Returns the
    /// media-relative path.
    pub async fn store_avatar(
        &self,
        username: &Username,
        ext: &str,
        data: &[u8],
    ) -> Result<String> {
        // An avatar re-uploaded with a different extension would
        // otherwise leave the old file behind.
        for old_ext in IMAGE_EXTENSIONS {
            if *old_ext != ext {
                let old = self
                    .base_path
                    .join(AVATARS_DIR)
                    .join(format!("{}.{}", username, old_ext));
                let _ = tokio::fs::remove_file(old).await;
            }
        }

        let relative = format!("{}/{}.{}", AVATARS_DIR, username, ext);
        tokio::fs::write(self.base_path.join(&relative), data).await?;
        Ok(relative)
    }

    /// Resolve a media-relative path to an absolute one.
    ///
    /// Every component must be a plain name; `..`, roots, and prefixes
    /// are rejected so a crafted filename cannot escape the base.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let path = Path::new(relative);
        for component in path.components() {
            if !matches!(component, Component::Normal(_)) {
                return Err(ServerError::Forbidden(
                    "Path traversal attempt detected".to_string(),
                ));
            }
        }
        Ok(self.base_path.join(path))
    }

    /// Remove the audio and cover files owned by a track. Missing files
    /// are not an error; the caller is deleting the track either way.
    pub async fn delete_track_files(&self, track: &Track) {
        if let Ok(audio) = self.resolve(&track.file_path) {
            let _ = tokio::fs::remove_file(audio).await;
        }
        if let Some(cover_url) = &track.cover_path {
            if let Some(relative) = cover_url.strip_prefix("/api/media/") {
                if let Ok(cover) = self.resolve(relative) {
                    let _ = tokio::fs::remove_file(cover).await;
                }
            }
        }
    }

    pub fn is_allowed_audio(filename: &str) -> bool {
        matches!(Self::extension_of(filename).as_deref(), Some("mp3"))
    }

    pub fn is_allowed_image(filename: &str) -> bool {
        match Self::extension_of(filename) {
            Some(ext) => IMAGE_EXTENSIONS.contains(&ext.as_str()),
            None => false,
        }
    }

    /// Lowercased extension of an uploaded filename
    pub fn extension_of(filename: &str) -> Option<String> {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store() -> (MediaStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = MediaStore::new(temp.path());
        store.initialize().await.unwrap();
        (store, temp)
    }

    #[tokio::test]
    async fn stores_and_resolves_audio() {
        let (store, _temp) = store().await;
        let id = TrackId::generate();

        let relative = store.store_audio(&id, b"ID3 fake mp3 bytes").await.unwrap();
        assert_eq!(relative, format!("music/{}.mp3", id));

        let absolute = store.resolve(&relative).unwrap();
        let data = tokio::fs::read(absolute).await.unwrap();
        assert_eq!(data, b"ID3 fake mp3 bytes");
    }

    #[tokio::test]
    async fn replacing_avatar_removes_stale_extension() {
        let (store, _temp) = store().await;
        let alice = Username::new("alice");

        let first = store.store_avatar(&alice, "png", b"png bytes").await.unwrap();
        let second = store.store_avatar(&alice, "jpg", b"jpg bytes").await.unwrap();

        assert!(!store.resolve(&first).unwrap().exists());
        assert!(store.resolve(&second).unwrap().exists());
    }

    #[tokio::test]
    async fn resolve_rejects_traversal() {
        let (store, _temp) = store().await;
        assert!(store.resolve("../etc/passwd").is_err());
        assert!(store.resolve("music/../../secrets").is_err());
        assert!(store.resolve("/etc/passwd").is_err());
        assert!(store.resolve("covers/ok.jpg").is_ok());
    }

    #[test]
    fn upload_extension_rules() {
        assert!(MediaStore::is_allowed_audio("song.mp3"));
        assert!(MediaStore::is_allowed_audio("SONG.MP3"));
        assert!(!MediaStore::is_allowed_audio("song.wav"));
        assert!(!MediaStore::is_allowed_audio("song"));

        assert!(MediaStore::is_allowed_image("cover.jpg"));
        assert!(MediaStore::is_allowed_image("cover.jpeg"));
        assert!(MediaStore::is_allowed_image("cover.PNG"));
        assert!(!MediaStore::is_allowed_image("cover.gif"));
    }
}
