// Base64 encoding of admitted uploads

use super::{EncodedFile, UploadCandidate};
use crate::types::{AppError, AppResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use futures::future::try_join_all;
use tracing::{debug, info};

pub struct FileEncoder;

impl FileEncoder {
    /// Encode one file. An empty file has no payload and is a read error.
    pub fn encode(candidate: &UploadCandidate) -> AppResult<EncodedFile> {
        if candidate.bytes.is_empty() {
            return Err(AppError::Read(format!(
                "{}: file is empty or could not be read",
                candidate.name
            )));
        }

        let data = BASE64.encode(&candidate.bytes);
        debug!(file = %candidate.name, encoded_len = data.len(), "File encoded");

        Ok(EncodedFile {
            media_type: candidate.media_type.clone(),
            data,
        })
    }

    /// Encode all files concurrently. Any failure fails the whole batch.
    pub async fn encode_all(candidates: &[UploadCandidate]) -> AppResult<Vec<EncodedFile>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let tasks = candidates.iter().cloned().map(|candidate| async move {
            let name = candidate.name.clone();
            tokio::task::spawn_blocking(move || Self::encode(&candidate))
                .await
                .map_err(|e| AppError::Read(format!("{}: encoding task failed: {}", name, e)))?
        });

        let encoded = try_join_all(tasks).await?;
        info!(files = encoded.len(), "Encoded uploads");
        Ok(encoded)
    }
}
