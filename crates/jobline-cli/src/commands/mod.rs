//! CLI command implementations.

pub mod audit;
pub mod candidates;
pub mod compare;
pub mod config;
pub mod dedupe;
pub mod extract;
pub mod label;
pub mod merge;
pub mod oversample;
pub mod stats;
pub mod validate;
