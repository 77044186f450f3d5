//! Error types for the timeline tracker
//!
//! The tracking core never fails: missing regions degrade to skipped watches
//! and zero offsets. These errors only describe bad input arriving at the
//! API boundary (section ids, configuration, JS values, missing DOM).

use thiserror::Error;

/// Boundary error for tracker construction and the WASM API
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GliderError {
    /// A section identifier was the empty string
    #[error("Section id at index {0} is empty")]
    EmptySectionId(usize),

    /// The same identifier appeared twice in one registry
    #[error("Duplicate section id '{0}'")]
    DuplicateSection(String),

    /// A configuration value is out of range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Language code the tracker does not know how to lay out
    #[error("Unsupported language '{0}' (expected 'he' or 'en')")]
    UnsupportedLanguage(String),

    /// Failed to convert a value to or from JavaScript
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Browser object required by the DOM adapters is missing
    #[error("DOM unavailable: {0}")]
    DomUnavailable(String),
}

pub type GliderResult<T> = Result<T, GliderError>;
