//! Caption blocks for subtitle rendering.

use serde::{Deserialize, Serialize};

use crate::timecode::format_timecode;

/// A group of consecutive transcript tokens rendered as one subtitle entry.
///
/// `start` is the first member token's start, `end` the last member token's
/// end. Blocks are numbered from 1 with no gaps in numbering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionBlock {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl CaptionBlock {
    /// The `start --> end` line of this block's SRT entry.
    pub fn timecode_line(&self) -> String {
        format!("{} --> {}", format_timecode(self.start), format_timecode(self.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timecode_line() {
        let block = CaptionBlock {
            index: 1,
            start: 0.0,
            end: 1.5,
            text: "Hello world .".to_string(),
        };
        assert_eq!(block.timecode_line(), "00:00:00,000 --> 00:00:01,500");
    }
}
