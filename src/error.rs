// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for kb-sorter

use thiserror::Error;

/// Result type alias for kb-sorter operations
pub type Result<T> = std::result::Result<T, SorterError>;

/// Message shown to the user whenever the model call fails for any reason
pub const CATEGORIZATION_FAILED: &str =
    "Failed to get categorization from the AI model. Please check your API key and network connection.";

/// Message shown when a categorization is attempted without allow-lists
pub const EMPTY_LISTS_GUIDANCE: &str =
    "Please define at least one project and one tag before categorizing.";

/// kb-sorter error types
#[derive(Error, Debug)]
pub enum SorterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Gemini answered, but not with something usable
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// An allow-list was empty when a categorization was requested
    #[error("{}", EMPTY_LISTS_GUIDANCE)]
    EmptyAllowList,

    #[error("Unsupported file type: {0}")]
    UnsupportedMediaType(String),

    /// Generic failure surfaced to the user for any upstream problem
    #[error("{}", CATEGORIZATION_FAILED)]
    Categorization,

    #[error("Invalid edit: {0}")]
    InvalidEdit(String),
}

impl SorterError {
    /// Whether this error came from the model call rather than from local input
    pub fn is_upstream(&self) -> bool {
        matches!(self, SorterError::Categorization)
    }
}
