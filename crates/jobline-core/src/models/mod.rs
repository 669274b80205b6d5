//! Data models for postings, line records and configuration.

pub mod config;
pub mod line;
pub mod posting;
