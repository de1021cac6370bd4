//! Engine error taxonomy.
//!
//! Failure policy: single-clip and single-keyword failures are absorbed and
//! degrade output quality; calibration and assembly failures abort the run
//! with a diagnostic carrying the offending identifier.

use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Speaking-rate calibration is undefined: the transcript carries zero
    /// active speech.
    #[error("Calibration failed: {0}")]
    Calibration(String),

    /// An external collaborator (search, keyword generation, transcription)
    /// failed or returned an unexpected shape.
    #[error("External service '{service}' failed: {detail}")]
    ExternalService { service: String, detail: String },

    /// One clip could not be downloaded or decoded.
    #[error("Failed to acquire clip {url}: {detail}")]
    MediaAcquisition { url: String, detail: String },

    /// No clips available for an entire part, or final mux failure.
    #[error("Assembly failed: {0}")]
    Assembly(String),

    #[error("Media error: {0}")]
    Media(#[from] reel_media::MediaError),

    #[error("Model error: {0}")]
    Model(#[from] reel_models::ModelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub fn external(service: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            detail: detail.into(),
        }
    }

    pub fn acquisition(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MediaAcquisition {
            url: url.into(),
            detail: detail.into(),
        }
    }

    pub fn assembly(msg: impl Into<String>) -> Self {
        Self::Assembly(msg.into())
    }

    pub fn calibration(msg: impl Into<String>) -> Self {
        Self::Calibration(msg.into())
    }

    /// Whether this failure may be absorbed by skipping the offending item
    /// (clip or keyword) instead of aborting the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ExternalService { .. } | Self::MediaAcquisition { .. }
        )
    }
}
