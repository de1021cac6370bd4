//! Script parts: contiguous slices of the narration with time windows.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Maximum keywords attached to a single part.
pub const MAX_KEYWORDS_PER_PART: usize = 10;

/// A contiguous slice of the narration script with a time window and the
/// keywords used to search stock footage for it.
///
/// Parts are ordered; their windows are contiguous and non-overlapping and
/// collectively span the full narration duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptPart {
    pub text: String,
    /// Ordered search keywords, at most [`MAX_KEYWORDS_PER_PART`].
    /// Duplicates are allowed; the keyword generator is not trusted to dedup.
    pub keywords: Vec<String>,
    pub start_time: f64,
    pub end_time: f64,
}

impl ScriptPart {
    /// Create a validated part. Keywords beyond the cap are dropped, keeping
    /// order.
    pub fn new(
        text: impl Into<String>,
        mut keywords: Vec<String>,
        start_time: f64,
        end_time: f64,
    ) -> ModelResult<Self> {
        if start_time < 0.0 {
            return Err(ModelError::NegativeTimestamp(start_time));
        }
        if end_time <= start_time {
            return Err(ModelError::EmptyWindow {
                start: start_time,
                end: end_time,
            });
        }
        keywords.truncate(MAX_KEYWORDS_PER_PART);
        Ok(Self {
            text: text.into(),
            keywords,
            start_time,
            end_time,
        })
    }

    /// Length of this part's time window in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Whitespace-separated word count of the part text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
