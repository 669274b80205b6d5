//! Text canonicalization shared by every matching step.
//!
//! Any comparison between a posting line and an extracted value goes through
//! [`normalize`], so the extractor, labeler, reconciler and candidate scorer
//! agree on what "the same text" means.

use lazy_static::lazy_static;
use regex::Regex;
use sha1::{Digest, Sha1};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

lazy_static! {
    /// Punctuation and separators folded to a single space.
    static ref PUNCTUATION: Regex = Regex::new(
        r#"[·•/\\()\[\]{}:,;"“”‘’`~\-–—]"#
    ).unwrap();

    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    static ref FILENAME_UNSAFE: Regex = Regex::new(r"[^a-z0-9\s]").unwrap();
}

/// Placeholder used when a value produces an empty file name component.
pub const EMPTY_FILENAME_COMPONENT: &str = "sin_dato";

/// Canonicalize free text for matching.
///
/// Strips accents, folds punctuation to spaces, collapses whitespace and
/// lowercases. `normalize(normalize(s)) == normalize(s)` for every `s`.
pub fn normalize(text: &str) -> String {
    let stripped = strip_accents(text.trim());
    let spaced = PUNCTUATION.replace_all(&stripped, " ");
    let collapsed = WHITESPACE.replace_all(&spaced, " ");
    // Lowercasing may reintroduce combining marks (e.g. 'İ'), fold once more.
    strip_accents(&collapsed.to_lowercase()).trim().to_string()
}

/// Decompose and drop combining marks.
pub fn strip_accents(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Normalize a value for use as a file name component.
pub fn normalize_for_filename(text: &str, max_length: usize) -> String {
    let lowered = strip_accents(&text.to_lowercase());
    let kept = FILENAME_UNSAFE.replace_all(&lowered, "");
    let joined = WHITESPACE.replace_all(kept.trim(), "_");
    let truncated: String = joined.chars().take(max_length).collect();
    let trimmed = truncated.trim_matches('_');

    if trimmed.is_empty() {
        EMPTY_FILENAME_COMPONENT.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Content hash identifying where a line came from (lowercase hex SHA-1).
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Provenance hash of a posting: [`content_hash`] of the trimmed text.
pub fn posting_hash(text: &str) -> String {
    content_hash(text.trim())
}

/// Collapse runs of whitespace into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Non-empty trimmed lines, in order.
pub fn content_lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

/// Encoding a byte buffer was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf8Bom,
    Latin1,
    /// UTF-8 with invalid sequences replaced by U+FFFD.
    Lossy,
}

/// Decoded text and the encoding that produced it.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub text: String,
    pub encoding: TextEncoding,
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decode a file's bytes, trying UTF-8, then Latin-1, then lossy UTF-8.
///
/// Never fails: undecodable input still yields text.
pub fn decode_text(bytes: &[u8]) -> Decoded {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        if let Ok(text) = std::str::from_utf8(rest) {
            return Decoded {
                text: text.to_string(),
                encoding: TextEncoding::Utf8Bom,
            };
        }
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Decoded {
            text: text.to_string(),
            encoding: TextEncoding::Utf8,
        };
    }

    // C1 controls almost never appear in real Latin-1 text.
    if !bytes.iter().any(|b| (0x80..=0x9F).contains(b)) {
        return Decoded {
            text: bytes.iter().map(|&b| b as char).collect(),
            encoding: TextEncoding::Latin1,
        };
    }

    Decoded {
        text: String::from_utf8_lossy(bytes).into_owned(),
        encoding: TextEncoding::Lossy,
    }
}
