// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Review session: allow-list editing, the file-selection cycle and
//! editing/confirming a suggestion.
//!
//! Each file selection bumps a generation counter. Categorization results
//! carry the [`Ticket`] of the cycle they were started in and are discarded
//! if the user has since cleared or replaced the file.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::categorize::{build_request, AllowLists, CategorizationResult};
use crate::error::EMPTY_LISTS_GUIDANCE;
use crate::gemini::GenerateRequest;
use crate::upload::{MediaKind, UploadedFile};
use crate::{Result, SorterError};

/// Identifies one file-selection cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Analyzing,
    Review,
    Failed,
    Categorized,
}

/// A categorization that still has to be sent to the model
#[derive(Debug)]
pub struct PendingCategorization {
    pub ticket: Ticket,
    pub request: GenerateRequest,
    /// Lists as they were when the file was selected
    pub lists: AllowLists,
}

pub struct Session {
    lists: AllowLists,
    file: Option<UploadedFile>,
    generation: u64,
    phase: Phase,
    suggestion: Option<CategorizationResult>,
    edited: Option<CategorizationResult>,
    error: Option<String>,
    confirmed_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(lists: AllowLists) -> Self {
        Self {
            lists,
            file: None,
            generation: 0,
            phase: Phase::Idle,
            suggestion: None,
            edited: None,
            error: None,
            confirmed_at: None,
        }
    }

    pub fn lists(&self) -> &AllowLists {
        &self.lists
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        self.file.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn edited(&self) -> Option<&CategorizationResult> {
        self.edited.as_ref()
    }

    pub fn suggestion(&self) -> Option<&CategorizationResult> {
        self.suggestion.as_ref()
    }

    pub fn add_project(&mut self, name: &str) -> bool {
        self.lists.add_project(name)
    }

    pub fn remove_project(&mut self, name: &str) -> bool {
        self.lists.remove_project(name)
    }

    pub fn add_tag(&mut self, name: &str) -> bool {
        self.lists.add_tag(name)
    }

    pub fn remove_tag(&mut self, name: &str) -> bool {
        self.lists.remove_tag(name)
    }

    /// Make `file` the current file and prepare its categorization.
    ///
    /// Returns `None` when the request cannot be made; the reason is
    /// recorded as the session error.
    pub fn select_file(&mut self, file: UploadedFile) -> Option<PendingCategorization> {
        self.clear_file();
        let ticket = Ticket(self.generation);

        let prepared = build_request(&file, &self.lists);
        self.file = Some(file);

        match prepared {
            Ok(request) => {
                self.phase = Phase::Analyzing;
                Some(PendingCategorization {
                    ticket,
                    request,
                    lists: self.lists.clone(),
                })
            }
            Err(e) => {
                let message = match e {
                    SorterError::EmptyAllowList => EMPTY_LISTS_GUIDANCE.to_string(),
                    other => other.to_string(),
                };
                self.fail(message);
                None
            }
        }
    }

    fn fail(&mut self, message: String) {
        self.phase = Phase::Failed;
        self.error = Some(message);
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation && self.file.is_some()
    }

    /// Apply the outcome of a categorization. Stale outcomes are dropped.
    pub fn complete(&mut self, ticket: Ticket, outcome: Result<CategorizationResult>) -> bool {
        if !self.is_current(ticket) || self.phase != Phase::Analyzing {
            debug!("Discarding stale categorization for cycle {}", ticket.0);
            return false;
        }

        match outcome {
            Ok(result) => {
                self.suggestion = Some(result.clone());
                self.edited = Some(result);
                self.phase = Phase::Review;
            }
            Err(e) => self.fail(e.to_string()),
        }
        true
    }

    /// Drop the current file (releasing its preview) and reset the cycle
    pub fn clear_file(&mut self) {
        self.generation += 1;
        self.file = None;
        self.suggestion = None;
        self.edited = None;
        self.error = None;
        self.confirmed_at = None;
        self.phase = Phase::Idle;
    }

    pub fn reject(&mut self) {
        info!("Suggestion rejected");
        self.clear_file();
    }

    fn editable(&mut self) -> Result<&mut CategorizationResult> {
        match (self.phase, self.edited.as_mut()) {
            (Phase::Review, Some(edited)) => Ok(edited),
            _ => Err(SorterError::InvalidEdit("no suggestion to edit".to_string())),
        }
    }

    pub fn set_project(&mut self, project: &str) -> Result<()> {
        if !self.lists.projects.iter().any(|p| p == project) {
            return Err(SorterError::InvalidEdit(format!("unknown project {:?}", project)));
        }
        self.editable()?.project = project.to_string();
        Ok(())
    }

    /// Add a tag from the tag list; adding one that is already present is a no-op
    pub fn add_result_tag(&mut self, tag: &str) -> Result<()> {
        if !self.lists.tags.iter().any(|t| t == tag) {
            return Err(SorterError::InvalidEdit(format!("unknown tag {:?}", tag)));
        }
        let edited = self.editable()?;
        if !edited.tags.iter().any(|t| t == tag) {
            edited.tags.push(tag.to_string());
        }
        Ok(())
    }

    pub fn remove_result_tag(&mut self, tag: &str) -> Result<()> {
        self.editable()?.tags.retain(|t| t != tag);
        Ok(())
    }

    /// Tags from the list not yet on the edited result
    pub fn unselected_tags(&self) -> Vec<String> {
        let selected = self.edited.as_ref().map(|e| e.tags.as_slice()).unwrap_or(&[]);
        self.lists
            .tags
            .iter()
            .filter(|t| !selected.contains(t))
            .cloned()
            .collect()
    }

    /// Accept the edited categorization. The returned ticket is used to reset
    /// the form later without touching a file selected in the meantime.
    pub fn confirm(&mut self) -> Result<(Ticket, CategorizationResult)> {
        let confirmed = self.editable()?.clone();
        info!(
            "Confirmed categorization: project={} tags={:?}",
            confirmed.project, confirmed.tags
        );
        self.phase = Phase::Categorized;
        self.confirmed_at = Some(Utc::now());
        Ok((Ticket(self.generation), confirmed))
    }

    /// Clear the form after a confirmation, unless a new cycle has started
    pub fn reset_after_confirm(&mut self, ticket: Ticket) -> bool {
        if self.is_current(ticket) && self.phase == Phase::Categorized {
            self.clear_file();
            return true;
        }
        false
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            projects: self.lists.projects.clone(),
            tags: self.lists.tags.clone(),
            file: self.file.as_ref().map(FileView::from),
            suggestion: self.suggestion.clone(),
            edited: self.edited.clone(),
            unselected_tags: self.unselected_tags(),
            error: self.error.clone(),
            confirmed_at: self.confirmed_at,
        }
    }
}

/// What the browser needs to render a file
#[derive(Debug, Clone, Serialize)]
pub struct FileView {
    pub name: String,
    pub media_type: String,
    pub size_kb: String,
    pub preview: Option<String>,
    pub text: Option<String>,
}

impl From<&UploadedFile> for FileView {
    fn from(file: &UploadedFile) -> Self {
        let text = match file.kind() {
            Some(MediaKind::Text) => Some(file.content.clone()),
            _ => None,
        };
        Self {
            name: file.name.clone(),
            media_type: file.media_type.clone(),
            size_kb: format!("{:.2}", file.size_kb()),
            preview: file.preview_reference(),
            text,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub projects: Vec<String>,
    pub tags: Vec<String>,
    pub file: Option<FileView>,
    pub suggestion: Option<CategorizationResult>,
    pub edited: Option<CategorizationResult>,
    pub unselected_tags: Vec<String>,
    pub error: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
}
