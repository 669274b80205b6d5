//! Splits a multi-posting text blob into individual postings.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::models::config::SplitterConfig;

lazy_static! {
    // Two or more consecutive blank lines
    static ref BLANK_RUN: Regex = Regex::new(r"\n(?:[ \t\r]*\n){2,}").unwrap();
}

/// Raw text of one posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingText {
    /// Position of the block in the input, counted before noise filtering.
    pub index: usize,
    pub text: String,
}

/// Split on `---` delimiter lines, else on runs of two or more blank lines,
/// else keep the whole input as one posting.
///
/// Blocks shorter than `min_block_chars` characters are dropped.
pub fn split(raw: &str, config: &SplitterConfig) -> Vec<PostingText> {
    let blocks = split_on_delimiter(raw).unwrap_or_else(|| {
        let blocks: Vec<String> = BLANK_RUN.split(raw).map(str::to_string).collect();
        if blocks.len() > 1 { blocks } else { vec![raw.to_string()] }
    });

    let total = blocks.len();
    let postings: Vec<PostingText> = blocks
        .into_iter()
        .enumerate()
        .map(|(index, block)| PostingText {
            index,
            text: block.trim().to_string(),
        })
        .filter(|p| p.text.chars().count() >= config.min_block_chars)
        .collect();

    debug!(
        "Split input into {} blocks, kept {} postings",
        total,
        postings.len()
    );
    postings
}

pub(crate) fn is_delimiter(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

fn split_on_delimiter(raw: &str) -> Option<Vec<String>> {
    if !raw.lines().any(is_delimiter) {
        return None;
    }

    let mut blocks = vec![String::new()];
    for line in raw.lines() {
        if is_delimiter(line) {
            blocks.push(String::new());
        } else if let Some(block) = blocks.last_mut() {
            block.push_str(line);
            block.push('\n');
        }
    }
    Some(blocks)
}
