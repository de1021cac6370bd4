//! Caption segmentation and SRT rendering.
//!
//! Groups a transcript's word tokens into caption blocks: a boundary is
//! forced before a token when the gap after the previous token reaches the
//! threshold, or when the current block is full. The last block always
//! closes at the final token.

use std::path::Path;

use tracing::info;

use reel_models::{CaptionBlock, Transcript};

use crate::error::EngineResult;

/// Group transcript tokens into caption blocks.
///
/// `max_words_per_block = None` disables the length condition (gap-only
/// segmentation). Every token lands in exactly one block and block order
/// follows token order; an empty transcript yields no blocks.
pub fn segment_captions(
    transcript: &Transcript,
    max_words_per_block: Option<usize>,
    max_gap_seconds: f64,
) -> Vec<CaptionBlock> {
    let tokens = transcript.tokens();
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut blocks: Vec<CaptionBlock> = Vec::new();
    let mut block_start = 0usize;

    let mut close_block = |blocks: &mut Vec<CaptionBlock>, start: usize, end: usize| {
        let words: Vec<&str> = tokens[start..=end].iter().map(|t| t.word.as_str()).collect();
        blocks.push(CaptionBlock {
            index: blocks.len() + 1,
            start: tokens[start].start,
            end: tokens[end].end,
            text: words.join(" "),
        });
    };

    for k in 1..tokens.len() {
        let gap_break = tokens[k - 1].gap_after >= max_gap_seconds;
        let length_break = max_words_per_block.is_some_and(|limit| k - block_start >= limit);
        if gap_break || length_break {
            close_block(&mut blocks, block_start, k - 1);
            block_start = k;
        }
    }
    close_block(&mut blocks, block_start, tokens.len() - 1);

    blocks
}

/// Render caption blocks as SRT text: index line, timecode line, text line,
/// blank separator.
pub fn render_srt(blocks: &[CaptionBlock]) -> String {
    let mut lines = Vec::with_capacity(blocks.len() * 4);
    for block in blocks {
        lines.push(block.index.to_string());
        lines.push(block.timecode_line());
        lines.push(block.text.clone());
        lines.push(String::new());
    }
    lines.join("\n")
}

/// Write caption blocks to an SRT file, UTF-8 encoded.
pub async fn write_srt(blocks: &[CaptionBlock], path: impl AsRef<Path>) -> EngineResult<()> {
    let path = path.as_ref();
    tokio::fs::write(path, render_srt(blocks)).await?;
    info!("Wrote {} caption blocks to {}", blocks.len(), path.display());
    Ok(())
}
