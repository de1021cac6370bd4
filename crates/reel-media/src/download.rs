//! Streaming HTTP download of stock clips.

use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};

/// Reject downloads that produced suspiciously small files; a real clip is
/// at least a few kilobytes even at the lowest quality tier.
const MIN_CLIP_FILE_SIZE: u64 = 4 * 1024;

/// Download a file from `url` to `output_path`, streaming the body to disk.
///
/// Fails on non-success status codes and on bodies shorter than
/// [`MIN_CLIP_FILE_SIZE`]; a truncated download must not reach the trim step
/// looking like a valid clip.
pub async fn download_file(
    client: &reqwest::Client,
    url: &str,
    output_path: impl AsRef<Path>,
) -> MediaResult<()> {
    let output_path = output_path.as_ref();
    debug!("Downloading {} -> {}", url, output_path.display());

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| MediaError::download_failed(url, e.to_string()))?;

    if !response.status().is_success() {
        return Err(MediaError::download_failed(
            url,
            format!("HTTP status {}", response.status()),
        ));
    }

    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut file = tokio::fs::File::create(output_path).await?;
    let mut stream = response;
    let mut written: u64 = 0;
    while let Some(chunk) = stream
        .chunk()
        .await
        .map_err(|e| MediaError::download_failed(url, e.to_string()))?
    {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    if written < MIN_CLIP_FILE_SIZE {
        tokio::fs::remove_file(output_path).await.ok();
        return Err(MediaError::download_failed(
            url,
            format!("body too small ({} bytes)", written),
        ));
    }

    info!("Downloaded {} ({} bytes)", output_path.display(), written);
    Ok(())
}

/// Remove special characters from a filename and cap its length.
pub fn sanitize_filename(name: &str, max_length: usize) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|'))
        .collect();
    cleaned.chars().take(max_length).collect()
}
