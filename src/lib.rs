// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! kb-sorter: AI Knowledge Base Sorter
//!
//! Suggests a project and tags for a file using a hosted Gemini model,
//! keeps the suggestion within the user's own project and tag lists, and
//! lets the user edit and confirm it from the CLI or a small web UI.

pub mod categorize;
pub mod config;
pub mod error;
pub mod gemini;
pub mod session;
pub mod upload;
pub mod web;

pub use categorize::{AllowLists, CategorizationResult, Categorizer, FALLBACK_PROJECT};
pub use config::AppConfig;
pub use error::{Result, SorterError};
pub use upload::UploadedFile;
