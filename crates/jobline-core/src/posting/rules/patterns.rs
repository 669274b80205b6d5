//! Common regex patterns for posting extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // List items
    pub static ref BULLET_ITEM: Regex = Regex::new(
        r"^\s*[-•*·▪‣◦–—]\s*(\S.*?)\s*$"
    ).unwrap();

    pub static ref NUMBERED_ITEM: Regex = Regex::new(
        r"^\s*\d{1,2}[.)]\s+(\S.*?)\s*$"
    ).unwrap();

    // Date-shaped tokens: YYYY-MM-DD and DD/MM/YYYY families
    pub static ref DATE_TOKEN: Regex = Regex::new(
        r"\b(?:\d{4}[-/.]\d{1,2}[-/.]\d{1,2}|\d{1,2}[-/.]\d{1,2}[-/.]\d{4})\b"
    ).unwrap();

    // Paragraph breaks (a run of blank lines)
    pub static ref BLANK_LINE_RUN: Regex = Regex::new(
        r"\n[ \t\r]*\n\s*"
    ).unwrap();

    // Separators after which a title line carries location or metadata
    pub static ref TITLE_SEPARATOR: Regex = Regex::new(
        r"\s+[-–—|]\s+|\s*·\s*"
    ).unwrap();

    // Company suffix indicators, whole words
    pub static ref COMPANY_SUFFIX: Regex = Regex::new(
        r"(?i)\b(?:inc|llc|ltda|ltd|corp|corporation|company|group|sas|co)\b|\bs\.\s?a\b"
    ).unwrap();

    pub static ref LOGO_TOKEN: Regex = Regex::new(
        r"(?i)\blogo\b"
    ).unwrap();

    // Cleanup of company values
    pub static ref LOGO_SUFFIX: Regex = Regex::new(
        r"(?i)\s*(?:\(logo\)|\blogo)\s*$"
    ).unwrap();

    pub static ref MODALITY_TAG: Regex = Regex::new(
        r"(?i)\(\s*(?:hybrid|remote|on-site|on site|work from home|remoto|h[ií]brido|presencial)\s*\)"
    ).unwrap();

    pub static ref TRAILING_PUNCTUATION: Regex = Regex::new(
        r"[\s,;:]+$"
    ).unwrap();

    // A final period after a word, but not after a one-letter abbreviation ("S.A.")
    pub static ref DANGLING_PERIOD: Regex = Regex::new(
        r"([^.\s]{2,})\.$"
    ).unwrap();
}
