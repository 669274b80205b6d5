//! Core library for job-posting field extraction and line-label datasets.
//!
//! This crate provides:
//! - Text normalization shared by every matching step
//! - Rule-chain extraction of role, company, date, work mode, description
//!   and requirements from noisy posting text
//! - Splitting of multi-posting text blobs
//! - Weak line labeling (`role` / `company` / `other`) for classifier training
//! - Dataset merge, dedupe and minority oversampling
//! - Company-candidate scoring for prioritized review
//! - Validation and comparison of hand-corrected posting records

pub mod candidates;
pub mod dataset;
pub mod error;
pub mod models;
pub mod posting;
pub mod records;
pub mod report;
pub mod splitter;
pub mod text;

pub use candidates::{CandidateRecord, CandidateScore, CandidateScorer};
pub use error::{ConfigError, JoblineError, ReconcileError, Result};
pub use models::config::JoblineConfig;
pub use models::line::{Label, LineRecord};
pub use models::posting::{ExtractedFields, Field, FieldPresence, WorkMode};
pub use posting::{ExtractionResult, HeuristicExtractor, PostingExtractor};
pub use report::ExtractionReport;
pub use splitter::{split, PostingText};
pub use text::{content_hash, normalize};
