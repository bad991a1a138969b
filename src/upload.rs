// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! File intake: media classification, content encoding and image previews

use base64::{engine::general_purpose, Engine as _};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{Result, SorterError};

/// The two content kinds a file can be categorized as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Text,
}

impl MediaKind {
    /// Classify a MIME type, `None` for anything that is neither image nor text
    pub fn classify(media_type: &str) -> Option<Self> {
        let media_type = media_type.trim().to_ascii_lowercase();
        if media_type.starts_with("image/") {
            Some(MediaKind::Image)
        } else if media_type.starts_with("text/") {
            Some(MediaKind::Text)
        } else {
            None
        }
    }
}

/// A file selected by the user
///
/// `content` holds base64 for images and the decoded text for text files.
#[derive(Debug)]
pub struct UploadedFile {
    pub name: String,
    pub media_type: String,
    pub size_bytes: u64,
    pub content: String,
    preview: Option<PreviewHandle>,
}

impl UploadedFile {
    /// Build a file from raw bytes with a declared MIME type.
    ///
    /// Images get a preview registered in `previews` when one is given.
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: &[u8],
        previews: Option<&PreviewStore>,
    ) -> Result<Self> {
        let name = name.into();
        let media_type = media_type.into();

        let kind = MediaKind::classify(&media_type)
            .ok_or_else(|| SorterError::UnsupportedMediaType(media_type.clone()))?;

        let (content, preview) = match kind {
            MediaKind::Image => {
                let preview = previews.map(|store| store.register(&media_type, bytes.to_vec()));
                (general_purpose::STANDARD.encode(bytes), preview)
            }
            MediaKind::Text => (String::from_utf8_lossy(bytes).into_owned(), None),
        };

        debug!("Accepted {} ({}, {} bytes)", name, media_type, bytes.len());

        Ok(Self {
            name,
            media_type,
            size_bytes: bytes.len() as u64,
            content,
            preview,
        })
    }

    /// Read a file from disk, guessing its MIME type from the extension
    pub fn from_path(path: &Path, previews: Option<&PreviewStore>) -> Result<Self> {
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();

        // Reject before reading: large binaries are common here
        if MediaKind::classify(&media_type).is_none() {
            return Err(SorterError::UnsupportedMediaType(media_type));
        }

        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed")
            .to_string();

        Self::from_bytes(name, media_type, &bytes, previews)
    }

    pub fn kind(&self) -> Option<MediaKind> {
        MediaKind::classify(&self.media_type)
    }

    /// URL path of the image preview, if any
    pub fn preview_reference(&self) -> Option<String> {
        self.preview.as_ref().map(PreviewHandle::reference)
    }

    /// Size in kilobytes, as shown next to the file name
    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

/// A stored image preview
#[derive(Clone)]
pub struct Preview {
    pub media_type: String,
    pub bytes: Arc<Vec<u8>>,
}

/// In-memory store of image previews served to the browser
#[derive(Clone, Default)]
pub struct PreviewStore {
    entries: Arc<Mutex<HashMap<Uuid, Preview>>>,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register image bytes and return the handle that owns the entry
    pub fn register(&self, media_type: &str, bytes: Vec<u8>) -> PreviewHandle {
        let id = Uuid::new_v4();
        let preview = Preview {
            media_type: media_type.to_string(),
            bytes: Arc::new(bytes),
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(id, preview);
        }
        debug!("Registered preview {}", id);

        PreviewHandle {
            id,
            store: self.clone(),
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<Preview> {
        self.entries.lock().ok()?.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, id: &Uuid) {
        if let Ok(mut entries) = self.entries.lock() {
            if entries.remove(id).is_some() {
                info!("Released preview {}", id);
            }
        }
    }
}

impl fmt::Debug for PreviewStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewStore")
            .field("entries", &self.len())
            .finish()
    }
}

/// Owns one preview entry; dropping it releases the entry
pub struct PreviewHandle {
    id: Uuid,
    store: PreviewStore,
}

impl PreviewHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn reference(&self) -> String {
        format!("/preview/{}", self.id)
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.store.release(&self.id);
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PreviewHandle").field(&self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_media_types() {
        assert_eq!(MediaKind::classify("image/png"), Some(MediaKind::Image));
        assert_eq!(MediaKind::classify("text/plain"), Some(MediaKind::Text));
        assert_eq!(MediaKind::classify("text/markdown"), Some(MediaKind::Text));
        assert_eq!(MediaKind::classify("application/pdf"), None);
        assert_eq!(MediaKind::classify(""), None);
    }

    #[test]
    fn text_content_is_kept_as_text() {
        let file = UploadedFile::from_bytes("note.txt", "text/plain", b"hello", None).unwrap();
        assert_eq!(file.content, "hello");
        assert_eq!(file.size_bytes, 5);
        assert!(file.preview_reference().is_none());
    }

    #[test]
    fn image_content_is_base64() {
        let bytes = [0x89u8, b'P', b'N', b'G'];
        let file = UploadedFile::from_bytes("shot.png", "image/png", &bytes, None).unwrap();
        assert_eq!(file.content, general_purpose::STANDARD.encode(bytes));
        assert_eq!(file.kind(), Some(MediaKind::Image));
    }

    #[test]
    fn unsupported_type_is_rejected() {
        let err = UploadedFile::from_bytes("doc.pdf", "application/pdf", b"%PDF", None).unwrap_err();
        assert!(matches!(err, SorterError::UnsupportedMediaType(t) if t == "application/pdf"));
    }

    #[test]
    fn preview_released_once_on_drop() {
        let store = PreviewStore::new();
        let file = UploadedFile::from_bytes("a.png", "image/png", b"img", Some(&store)).unwrap();
        let reference = file.preview_reference().unwrap();
        assert!(reference.starts_with("/preview/"));
        assert_eq!(store.len(), 1);

        drop(file);
        assert!(store.is_empty());
    }

    #[test]
    fn replacing_a_file_releases_only_the_old_preview() {
        let store = PreviewStore::new();
        let mut current = UploadedFile::from_bytes("a.png", "image/png", b"a", Some(&store)).unwrap();
        let next = UploadedFile::from_bytes("b.png", "image/png", b"b", Some(&store)).unwrap();
        assert_eq!(store.len(), 2);
        assert!(current.preview_reference().is_some());

        current = next;
        assert_eq!(store.len(), 1);
        let id = current.preview.as_ref().unwrap().id();
        assert_eq!(store.get(&id).unwrap().bytes.as_slice(), b"b");
    }

    #[test]
    fn from_path_guesses_type_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todo.txt");
        std::fs::write(&path, "buy milk").unwrap();

        let file = UploadedFile::from_path(&path, None).unwrap();
        assert_eq!(file.name, "todo.txt");
        assert_eq!(file.media_type, "text/plain");
        assert_eq!(file.content, "buy milk");
    }

    #[test]
    fn from_path_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, "%PDF-1.7").unwrap();

        assert!(matches!(
            UploadedFile::from_path(&path, None),
            Err(SorterError::UnsupportedMediaType(_))
        ));
    }
}
