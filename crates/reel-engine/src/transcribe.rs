//! Transcript acquisition.
//!
//! Speech-to-text is an external collaborator. The engine only requires
//! something implementing [`Transcriber`]; the shipped implementation loads
//! the word timings the STT tool wrote as JSON, which also serves as the
//! deterministic substitution point in tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use reel_models::{Transcript, WordToken};

use crate::error::{EngineError, EngineResult};

/// Capability interface for the speech-to-text collaborator.
///
/// Input is an audio file path (already converted to WAV by the caller);
/// output is the ordered word-level transcript.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> EngineResult<Transcript>;
}

/// One word entry in the STT tool's JSON output.
#[derive(Debug, Deserialize)]
struct WordRecord {
    word: String,
    start: f64,
    end: f64,
    #[serde(default = "full_confidence")]
    confidence: f64,
}

fn full_confidence() -> f64 {
    1.0
}

/// Loads a transcript from a JSON file written by the external STT tool:
/// an array of `{word, start, end, confidence}` records.
///
/// The file is located next to the audio file (same stem, `.words.json`
/// extension) unless an explicit path is given.
pub struct JsonFileTranscriber {
    path: Option<PathBuf>,
}

impl JsonFileTranscriber {
    /// Resolve the transcript file next to the audio file.
    pub fn new() -> Self {
        Self { path: None }
    }

    /// Load from an explicit transcript file.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    fn resolve(&self, audio_path: &Path) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None => audio_path.with_extension("words.json"),
        }
    }
}

impl Default for JsonFileTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transcriber for JsonFileTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> EngineResult<Transcript> {
        let path = self.resolve(audio_path);
        info!("Loading word timings from {}", path.display());

        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            EngineError::external(
                "transcriber",
                format!("cannot read {}: {}", path.display(), e),
            )
        })?;
        let records: Vec<WordRecord> = serde_json::from_str(&raw).map_err(|e| {
            EngineError::external(
                "transcriber",
                format!("malformed transcript {}: {}", path.display(), e),
            )
        })?;

        let mut tokens = Vec::with_capacity(records.len());
        for record in records {
            tokens.push(WordToken::new(
                record.word,
                record.start,
                record.end,
                record.confidence.clamp(0.0, 1.0),
            )?);
        }
        Ok(Transcript::from_words(tokens)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_transcript_json() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("narration.wav");
        let words = dir.path().join("narration.words.json");
        tokio::fs::write(
            &words,
            r#"[
                {"word": "Hello", "start": 0.0, "end": 0.5, "confidence": 0.97},
                {"word": "world", "start": 0.6, "end": 1.0}
            ]"#,
        )
        .await
        .unwrap();

        let transcript = JsonFileTranscriber::new().transcribe(&audio).await.unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.tokens()[0].word, "Hello");
        assert!((transcript.tokens()[0].gap_after - 0.1).abs() < 1e-9);
        assert_eq!(transcript.tokens()[1].confidence, 1.0); // defaulted
    }

    #[tokio::test]
    async fn test_missing_file_is_external_service_error() {
        let result = JsonFileTranscriber::new()
            .transcribe(Path::new("/nonexistent/audio.wav"))
            .await;
        assert!(matches!(result, Err(EngineError::ExternalService { .. })));
    }

    #[tokio::test]
    async fn test_malformed_json_is_external_service_error() {
        let dir = TempDir::new().unwrap();
        let words = dir.path().join("bad.json");
        tokio::fs::write(&words, "{not json").await.unwrap();

        let result = JsonFileTranscriber::from_path(&words)
            .transcribe(Path::new("unused.wav"))
            .await;
        assert!(matches!(result, Err(EngineError::ExternalService { .. })));
    }
}
