//! Error types for analysis requests.

use thiserror::Error;

/// The only failure `explain` can surface.
///
/// Provider failures degrade down the chain and the local analyzer always
/// succeeds, so rejection of too-short input is the single user-visible
/// error at this boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Selected text is too short to analyze ({len} characters, minimum {min})")]
    InputTooShort { len: usize, min: usize },
}
