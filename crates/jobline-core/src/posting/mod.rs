//! Job posting field extraction module.

mod parser;
pub mod rules;

pub use parser::{DateSource, ExtractionResult, HeuristicExtractor, DATE_DEFAULTED_WARNING};
pub use rules::company::clean_company_name;

/// Trait for posting field extractors.
///
/// Extraction never fails: fields that cannot be found degrade to empty or
/// default values and are reported through [`ExtractionResult::presence`].
pub trait PostingExtractor {
    /// Extract structured fields from one posting's raw text.
    fn extract(&self, text: &str) -> ExtractionResult;
}
