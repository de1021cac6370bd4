//! Script partitioning.
//!
//! Splits the narration script into ordered, keyword-tagged parts whose time
//! windows track the recorded voice-over. The speaking rate is calibrated
//! from the transcript's active-speech duration, sentences are packed
//! greedily into word budgets, and windows are assigned by the configured
//! [`WindowPolicy`].

use async_trait::async_trait;
use regex::Regex;
use tracing::{info, warn};

use reel_models::{ScriptPart, Transcript};

use crate::config::WindowPolicy;
use crate::error::{EngineError, EngineResult};

/// Capability interface for the external keyword generator.
///
/// Implementations return at most 10 short, generic keyword strings for a
/// part of the script. Fewer than 10 and duplicates are tolerated.
#[async_trait]
pub trait KeywordGenerator: Send + Sync {
    async fn keywords(&self, part_text: &str) -> EngineResult<Vec<String>>;
}

/// Split script text into sentences.
///
/// A sentence ends at a run of `.`, `!` or `?` (plus any closing quote)
/// followed by whitespace or end of input. Trailing text without a
/// terminator still forms a sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let re = Regex::new(r#"[^.!?]*[.!?]+["']?"#).expect("sentence regex");
    let mut sentences = Vec::new();
    let mut consumed = 0;

    for m in re.find_iter(text) {
        let sentence = m.as_str().trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        consumed = m.end();
    }

    let tail = text[consumed..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Greedily pack consecutive sentences into parts of at most
/// `words_per_part` words. A single over-long sentence still forms its own
/// part; sentences are never split.
fn pack_sentences(sentences: &[String], words_per_part: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();

    for sentence in sentences {
        let candidate = if current.is_empty() {
            sentence.clone()
        } else {
            format!("{} {}", current, sentence)
        };
        if candidate.split_whitespace().count() <= words_per_part || current.is_empty() {
            current = candidate;
        } else {
            parts.push(current);
            current = sentence.clone();
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Partition a script into timed, keyword-tagged parts.
///
/// Calibration divides the script's word count by the transcript's
/// active-speech duration; a transcript with zero speech makes the rate
/// undefined and fails with [`EngineError::Calibration`].
///
/// Keyword generation failures are absorbed unless `strict_external` is
/// set: the part keeps an empty keyword list and the failure is logged.
/// With `strict_external` the first failure aborts partitioning.
pub async fn partition(
    script_text: &str,
    transcript: &Transcript,
    seconds_per_part: f64,
    policy: WindowPolicy,
    keyword_fn: &dyn KeywordGenerator,
    strict_external: bool,
) -> EngineResult<Vec<ScriptPart>> {
    let spoken = transcript.total_speech_duration();
    if spoken <= 0.0 {
        return Err(EngineError::calibration(
            "transcript has zero active speech duration",
        ));
    }

    let total_words = script_text.split_whitespace().count();
    let rate = total_words as f64 / spoken;
    let words_per_part = ((rate * seconds_per_part).round() as usize).max(1);
    info!(
        rate = format!("{:.2}", rate),
        words_per_part, "Calibrated speaking rate"
    );

    let sentences = split_sentences(script_text);
    let texts = pack_sentences(&sentences, words_per_part);
    let windows = match policy {
        WindowPolicy::TranscriptAnchored => anchor_windows(&texts, transcript, rate),
        WindowPolicy::RateProjected => project_windows(&texts, rate),
    };

    let mut parts = Vec::with_capacity(texts.len());
    for (text, (start, end)) in texts.into_iter().zip(windows) {
        let keywords = match keyword_fn.keywords(&text).await {
            Ok(keywords) => keywords,
            Err(e) if strict_external => return Err(e),
            Err(e) => {
                warn!(error = %e, "Keyword generation failed for part, continuing without keywords");
                Vec::new()
            }
        };
        parts.push(ScriptPart::new(text, keywords, start, end)?);
    }
    Ok(parts)
}

/// Policy A: advance a cursor through the transcript, consuming tokens until
/// the running word count reaches the part's word count. The window spans
/// the consumed tokens, with the end extended by the last token's gap so
/// consecutive windows abut.
fn anchor_windows(texts: &[String], transcript: &Transcript, rate: f64) -> Vec<(f64, f64)> {
    let tokens = transcript.tokens();
    let mut windows = Vec::with_capacity(texts.len());
    let mut cursor = 0usize;
    let mut prev_end = 0.0f64;

    for (i, text) in texts.iter().enumerate() {
        let target_words = text.split_whitespace().count();
        let mut consumed_words = 0usize;
        let first = cursor;

        while cursor < tokens.len() && consumed_words < target_words {
            consumed_words += tokens[cursor].word.split_whitespace().count().max(1);
            cursor += 1;
        }

        let (start, end) = if cursor > first {
            let start = if i == 0 { tokens[first].start } else { prev_end };
            let last = &tokens[cursor - 1];
            (start, last.end + last.gap_after)
        } else {
            // Transcript exhausted (script outruns the recording); fall back
            // to rate projection from the previous window.
            (prev_end, prev_end + target_words as f64 / rate)
        };
        prev_end = end;
        windows.push((start, end));
    }
    windows
}

/// Policy B: chain rate-projected windows from zero.
fn project_windows(texts: &[String], rate: f64) -> Vec<(f64, f64)> {
    let mut windows = Vec::with_capacity(texts.len());
    let mut clock = 0.0f64;
    for text in texts {
        let duration = text.split_whitespace().count() as f64 / rate;
        windows.push((clock, clock + duration));
        clock += duration;
    }
    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_models::WordToken;

    struct NoKeywords;

    #[async_trait]
    impl KeywordGenerator for NoKeywords {
        async fn keywords(&self, _part_text: &str) -> EngineResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    struct FailingKeywords;

    #[async_trait]
    impl KeywordGenerator for FailingKeywords {
        async fn keywords(&self, _part_text: &str) -> EngineResult<Vec<String>> {
            Err(EngineError::external("openai", "rate limited"))
        }
    }

    fn uniform_transcript(words: &[&str], word_duration: f64) -> Transcript {
        let tokens = words
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let start = i as f64 * word_duration;
                WordToken::new(*w, start, start + word_duration, 0.9).unwrap()
            })
            .collect();
        Transcript::from_words(tokens).unwrap()
    }

    #[test]
    fn test_split_sentences() {
        let s = split_sentences("My name is ChatGPT. How can I help you today?");
        assert_eq!(s, vec!["My name is ChatGPT.", "How can I help you today?"]);
    }

    #[test]
    fn test_split_sentences_handles_tail_without_terminator() {
        let s = split_sentences("First sentence. trailing fragment");
        assert_eq!(s, vec!["First sentence.", "trailing fragment"]);
    }

    #[test]
    fn test_split_sentences_empty() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn test_pack_sentences_budget() {
        let sentences: Vec<String> = vec![
            "My name is ChatGPT.".to_string(),
            "How can I help you today?".to_string(),
        ];
        let parts = pack_sentences(&sentences, 5);
        assert_eq!(parts, vec!["My name is ChatGPT.", "How can I help you today?"]);
    }

    #[test]
    fn test_pack_sentences_combines_under_budget() {
        let sentences: Vec<String> = vec!["One two.".to_string(), "Three four.".to_string()];
        let parts = pack_sentences(&sentences, 10);
        assert_eq!(parts, vec!["One two. Three four."]);
    }

    #[test]
    fn test_pack_oversized_sentence_forms_own_part() {
        let sentences: Vec<String> = vec![
            "Short one.".to_string(),
            "This is a very long sentence that exceeds any budget on its own.".to_string(),
            "Tail.".to_string(),
        ];
        let parts = pack_sentences(&sentences, 4);
        assert_eq!(parts.len(), 3);
        assert!(parts[1].starts_with("This is a very long"));
    }

    #[tokio::test]
    async fn test_partition_zero_speech_is_calibration_error() {
        let transcript = Transcript::from_words(Vec::new()).unwrap();
        let result = partition("Some script.", &transcript, 10.0, WindowPolicy::default(), &NoKeywords, false).await;
        assert!(matches!(result, Err(EngineError::Calibration(_))));
    }

    #[tokio::test]
    async fn test_partition_transcript_anchored_windows_are_contiguous() {
        let script = "My name is ChatGPT. How can I help you today?";
        // 10 words over 10s of speech -> rate 1.0; 5s per part -> 5 words.
        let words: Vec<&str> = script
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| c.is_ascii_punctuation()))
            .collect();
        let transcript = uniform_transcript(&words, 1.0);

        let parts = partition(script, &transcript, 5.0, WindowPolicy::TranscriptAnchored, &NoKeywords, false)
            .await
            .unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].text, "My name is ChatGPT.");
        assert_eq!(parts[1].text, "How can I help you today?");
        assert!((parts[0].end_time - parts[1].start_time).abs() < 1e-9);
        // Tokens abut here, so the first window covers the part's four words.
        assert_eq!(parts[0].start_time, 0.0);
        assert!((parts[0].end_time - 4.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_partition_rate_projected_windows_chain_from_zero() {
        let script = "My name is ChatGPT. How can I help you today?";
        let words: Vec<&str> = script.split_whitespace().collect();
        let transcript = uniform_transcript(&words, 1.0);

        let parts = partition(script, &transcript, 5.0, WindowPolicy::RateProjected, &NoKeywords, false)
            .await
            .unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].start_time, 0.0);
        assert!((parts[0].end_time - 4.0).abs() < 1e-9); // 4 words at 1 w/s
        assert!((parts[1].start_time - parts[0].end_time).abs() < 1e-9);
        assert!((parts[1].end_time - 10.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_partition_reproduces_sentence_sequence() {
        let script = "Alpha beta gamma. Delta epsilon. Zeta eta theta iota kappa. Lambda mu.";
        let words: Vec<&str> = script.split_whitespace().collect();
        let transcript = uniform_transcript(&words, 0.5);

        let parts = partition(script, &transcript, 2.0, WindowPolicy::TranscriptAnchored, &NoKeywords, false)
            .await
            .unwrap();

        let rejoined = parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rejoined, script);
    }

    #[tokio::test]
    async fn test_partition_tolerates_keyword_failure() {
        let script = "One two three four five.";
        let words: Vec<&str> = script.split_whitespace().collect();
        let transcript = uniform_transcript(&words, 1.0);

        let parts = partition(script, &transcript, 10.0, WindowPolicy::TranscriptAnchored, &FailingKeywords, false)
            .await
            .unwrap();
        assert_eq!(parts.len(), 1);
        assert!(parts[0].keywords.is_empty());
    }

    #[tokio::test]
    async fn test_partition_strict_mode_escalates_keyword_failure() {
        let script = "One two three four five.";
        let words: Vec<&str> = script.split_whitespace().collect();
        let transcript = uniform_transcript(&words, 1.0);

        let result = partition(script, &transcript, 10.0, WindowPolicy::TranscriptAnchored, &FailingKeywords, true)
            .await;
        assert!(matches!(result, Err(EngineError::ExternalService { .. })));
    }

    #[tokio::test]
    async fn test_partition_script_longer_than_transcript_falls_back_to_projection() {
        // 12-word script but only 4 transcribed words.
        let script = "One two three four. Five six seven eight. Nine ten eleven twelve.";
        let transcript = uniform_transcript(&["One", "two", "three", "four"], 1.0);

        let parts = partition(script, &transcript, 2.0, WindowPolicy::TranscriptAnchored, &NoKeywords, false)
            .await
            .unwrap();

        // Windows stay contiguous even past the transcript tail.
        for pair in parts.windows(2) {
            assert!((pair[0].end_time - pair[1].start_time).abs() < 1e-9);
        }
        assert!(parts.iter().all(|p| p.end_time > p.start_time));
    }
}
