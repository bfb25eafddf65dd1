//! Document uploads
//!
//! Candidate files enter the pipeline here. The validator decides which of
//! them are admitted under the configured [`UploadPolicy`], and the encoder
//! turns admitted files into base64 payloads for inline transport.

pub mod encoder;
pub mod validator;

pub use encoder::FileEncoder;
pub use validator::{AllowedType, FileValidator, SizeLimit, UploadPolicy, ValidationOutcome};

use crate::types::{AppError, AppResult};
use bytes::Bytes;
use std::path::Path;

/// A file the user attached, held for the duration of one submission
#[derive(Clone)]
pub struct UploadCandidate {
    pub name: String,
    pub size: u64,
    pub media_type: String,
    pub bytes: Bytes,
}

impl std::fmt::Debug for UploadCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadCandidate")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("media_type", &self.media_type)
            .finish()
    }
}

impl UploadCandidate {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a candidate from disk, guessing its media type from the extension
    pub async fn from_path(path: &Path) -> AppResult<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let data = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::Read(format!("{}: {}", name, e)))?;

        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self::new(name, media_type, data))
    }

    /// Lower-cased extension including the dot, if the name has one
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
    }
}

/// A base64 payload ready to be sent inline
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFile {
    pub media_type: String,
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_from_path_guesses_media_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pdf");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"%PDF-1.4 test").unwrap();

        let candidate = UploadCandidate::from_path(&path).await.unwrap();
        assert_eq!(candidate.name, "deck.pdf");
        assert_eq!(candidate.media_type, "application/pdf");
        assert_eq!(candidate.size, 13);
        assert_eq!(candidate.extension().as_deref(), Some(".pdf"));
    }

    #[tokio::test]
    async fn test_from_path_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = UploadCandidate::from_path(&dir.path().join("gone.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Read(msg) if msg.starts_with("gone.pdf")));
    }

    #[test]
    fn test_debug_omits_bytes() {
        let candidate = UploadCandidate::new("notes.txt", "text/plain", b"secret body".to_vec());
        let printed = format!("{:?}", candidate);
        assert!(printed.contains("notes.txt"));
        assert!(!printed.contains("secret body"));
    }
}
