use super::{GenerationController, GenerationResult};
use crate::error::GenerationError;
use std::path::{Path, PathBuf};

/// File name for a generated image, derived only from its request id.
/// Bytes outside `[A-Za-z0-9_-]` are percent-encoded, so distinct ids never
/// share a file name.
pub fn artifact_name(request_id: &str) -> String {
    if request_id.is_empty() {
        return "geminizer.jpg".to_string();
    }
    let mut stem = String::with_capacity(request_id.len());
    for byte in request_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{byte:02X}"));
        }
    }
    format!("geminizer-{stem}.jpg")
}

pub async fn write_artifact(
    result: &GenerationResult,
    dir: &Path,
) -> Result<PathBuf, GenerationError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(artifact_name(&result.request_id));
    tokio::fs::write(&path, &result.image_data).await?;
    tracing::info!(
        request_id = %result.request_id,
        path = %path.display(),
        "generation.export"
    );
    Ok(path)
}

impl GenerationController {
    /// Write the committed image into `dir`.
    pub async fn export_current(&self, dir: &Path) -> Result<PathBuf, GenerationError> {
        let result = self.current().ok_or(GenerationError::NoResult)?;
        write_artifact(&result, dir).await
    }
}
