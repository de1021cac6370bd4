//! Timed word tokens and transcripts.
//!
//! A [`Transcript`] is the word-level output of the external speech-to-text
//! collaborator: an ordered sequence of [`WordToken`]s with non-decreasing
//! start times. Tokens may abut or overlap slightly; that is taken as given.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// One recognized word with its speech timing.
///
/// `gap_after` is the silence between this token's end and the next token's
/// start, clamped at zero (tokens can overlap slightly). The last token of a
/// transcript always has `gap_after == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordToken {
    pub word: String,
    /// Start of the word in seconds from the beginning of the audio.
    pub start: f64,
    /// End of the word in seconds.
    pub end: f64,
    /// Recognizer confidence in [0, 1].
    pub confidence: f64,
    /// Silence until the next token, seconds. Zero for the last token.
    #[serde(default)]
    pub gap_after: f64,
}

impl WordToken {
    /// Create a validated token. `gap_after` starts at zero and is derived
    /// when the token joins a [`Transcript`].
    pub fn new(word: impl Into<String>, start: f64, end: f64, confidence: f64) -> ModelResult<Self> {
        if start < 0.0 {
            return Err(ModelError::NegativeTimestamp(start));
        }
        if end < start {
            return Err(ModelError::EndBeforeStart { start, end });
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ModelError::ConfidenceOutOfRange(confidence));
        }
        Ok(Self {
            word: word.into(),
            start,
            end,
            confidence,
            gap_after: 0.0,
        })
    }

    /// Active speech duration of this token.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Ordered sequence of timed word tokens. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    tokens: Vec<WordToken>,
}

impl Transcript {
    /// Build a transcript from tokens, deriving each token's `gap_after`
    /// from its successor's start time.
    ///
    /// Start times must be non-decreasing; `end[i] <= start[i+1]` is not
    /// required.
    pub fn from_words(mut tokens: Vec<WordToken>) -> ModelResult<Self> {
        for i in 1..tokens.len() {
            if tokens[i].start < tokens[i - 1].start {
                return Err(ModelError::UnorderedTokens {
                    index: i,
                    start: tokens[i].start,
                    previous: tokens[i - 1].start,
                });
            }
        }
        for i in 0..tokens.len() {
            tokens[i].gap_after = if i + 1 < tokens.len() {
                (tokens[i + 1].start - tokens[i].end).max(0.0)
            } else {
                0.0
            };
        }
        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[WordToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Sum of per-token active speech durations. Silences between words are
    /// excluded, so this is not the wall-clock span of the recording.
    pub fn total_speech_duration(&self) -> f64 {
        self.tokens.iter().map(WordToken::duration).sum()
    }

    /// Wall-clock end of the last token, or 0 for an empty transcript.
    pub fn span_end(&self) -> f64 {
        self.tokens.last().map(|t| t.end).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(word: &str, start: f64, end: f64) -> WordToken {
        WordToken::new(word, start, end, 0.9).unwrap()
    }

    #[test]
    fn test_token_validation() {
        assert!(WordToken::new("hi", -0.1, 0.5, 0.9).is_err());
        assert!(WordToken::new("hi", 1.0, 0.5, 0.9).is_err());
        assert!(WordToken::new("hi", 0.0, 0.5, 1.5).is_err());
        assert!(WordToken::new("hi", 0.0, 0.5, 0.0).is_ok());
    }

    #[test]
    fn test_gap_after_derivation() {
        let t = Transcript::from_words(vec![
            token("Hello", 0.0, 0.5),
            token("world", 0.6, 1.0),
            token(".", 1.1, 1.5),
        ])
        .unwrap();

        let gaps: Vec<f64> = t.tokens().iter().map(|t| t.gap_after).collect();
        assert!((gaps[0] - 0.1).abs() < 1e-9);
        assert!((gaps[1] - 0.1).abs() < 1e-9);
        assert_eq!(gaps[2], 0.0);
    }

    #[test]
    fn test_gap_after_clamped_for_overlapping_tokens() {
        let t = Transcript::from_words(vec![token("a", 0.0, 0.6), token("b", 0.5, 1.0)]).unwrap();
        assert_eq!(t.tokens()[0].gap_after, 0.0);
    }

    #[test]
    fn test_unordered_tokens_rejected() {
        let result = Transcript::from_words(vec![token("b", 1.0, 1.5), token("a", 0.5, 0.9)]);
        assert!(matches!(result, Err(ModelError::UnorderedTokens { index: 1, .. })));
    }

    #[test]
    fn test_total_speech_duration_excludes_silence() {
        let t = Transcript::from_words(vec![token("a", 0.0, 0.5), token("b", 2.0, 2.5)]).unwrap();
        assert!((t.total_speech_duration() - 1.0).abs() < 1e-9);
        assert!((t.span_end() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_transcript() {
        let t = Transcript::from_words(Vec::new()).unwrap();
        assert!(t.is_empty());
        assert_eq!(t.total_speech_duration(), 0.0);
    }
}
