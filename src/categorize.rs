// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Categorization contract: request construction, reply parsing and
//! allow-list sanitization

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::gemini::{ContentGenerator, GenerateRequest, InlineData, Part};
use crate::upload::{MediaKind, UploadedFile};
use crate::{Result, SorterError};

/// Project assigned when the model picks something outside the project list
pub const FALLBACK_PROJECT: &str = "Uncategorized";

/// A project and tags for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizationResult {
    pub project: String,
    pub tags: Vec<String>,
}

/// User-maintained projects and tags, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowLists {
    pub projects: Vec<String>,
    pub tags: Vec<String>,
}

impl AllowLists {
    pub fn new(projects: Vec<String>, tags: Vec<String>) -> Self {
        Self { projects, tags }
    }

    /// Both lists must have at least one entry before a categorization
    pub fn ensure_ready(&self) -> Result<()> {
        if self.projects.is_empty() || self.tags.is_empty() {
            return Err(SorterError::EmptyAllowList);
        }
        Ok(())
    }

    pub fn add_project(&mut self, name: &str) -> bool {
        add_item(&mut self.projects, name)
    }

    pub fn remove_project(&mut self, name: &str) -> bool {
        remove_item(&mut self.projects, name)
    }

    pub fn add_tag(&mut self, name: &str) -> bool {
        add_item(&mut self.tags, name)
    }

    pub fn remove_tag(&mut self, name: &str) -> bool {
        remove_item(&mut self.tags, name)
    }
}

/// Trimmed, non-empty, not already present. Returns whether the list changed.
fn add_item(items: &mut Vec<String>, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || items.iter().any(|i| i == value) {
        return false;
    }
    items.push(value.to_string());
    true
}

fn remove_item(items: &mut Vec<String>, value: &str) -> bool {
    let before = items.len();
    items.retain(|i| i != value);
    items.len() != before
}

/// Turn a file into the single content part sent to the model
pub fn file_to_part(file: &UploadedFile) -> Result<Part> {
    match MediaKind::classify(&file.media_type) {
        Some(MediaKind::Text) => Ok(Part::Text {
            text: format!("File Content:\n```\n{}\n```", file.content),
        }),
        Some(MediaKind::Image) => Ok(Part::InlineData {
            inline_data: InlineData {
                mime_type: file.media_type.clone(),
                data: file.content.clone(),
            },
        }),
        None => Err(SorterError::UnsupportedMediaType(file.media_type.clone())),
    }
}

pub fn system_instruction(file_name: &str, lists: &AllowLists) -> String {
    format!(
        "You are an intelligent knowledge base assistant. Your task is to analyze the provided file and suggest a categorization.

Analyze the file's content, name, and type. If the file is an image (like a screenshot or document), analyze any text within it.

File Name: {}

You MUST suggest exactly one project from the provided project list that best fits the file.
You MUST suggest one or more relevant tags from the provided tag list. If no tags seem relevant, return an empty array for tags.

Strictly adhere to the provided JSON schema for your response. Only use the projects and tags from the lists below.

Available Projects:
{}

Available Tags:
{}
",
        file_name,
        lists.projects.join(", "),
        lists.tags.join(", "),
    )
}

pub fn response_schema(lists: &AllowLists) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "project": {
                "type": "STRING",
                "description": format!(
                    "The single most relevant project for the file, chosen exclusively from this list: [{}]",
                    lists.projects.join(", ")
                ),
            },
            "tags": {
                "type": "ARRAY",
                "description": format!(
                    "An array of relevant tags for the file, chosen exclusively from this list: [{}]",
                    lists.tags.join(", ")
                ),
                "items": { "type": "STRING" },
            },
        },
        "required": ["project", "tags"],
    })
}

/// Build the model request for a file. Fails before any network access
/// on empty allow-lists or an unsupported media type.
pub fn build_request(file: &UploadedFile, lists: &AllowLists) -> Result<GenerateRequest> {
    lists.ensure_ready()?;
    let part = file_to_part(file)?;

    Ok(GenerateRequest {
        part,
        system_instruction: system_instruction(&file.name, lists),
        response_schema: response_schema(lists),
    })
}

/// Parse the model's JSON reply. Both fields are required.
pub fn parse_response(text: &str) -> Result<CategorizationResult> {
    Ok(serde_json::from_str(text.trim())?)
}

/// Force a result onto the allow-lists.
///
/// An unknown project becomes [`FALLBACK_PROJECT`]; unknown tags are dropped
/// and the surviving tags keep their order.
pub fn sanitize(raw: CategorizationResult, lists: &AllowLists) -> CategorizationResult {
    let projects: HashSet<&str> = lists.projects.iter().map(String::as_str).collect();
    let allowed_tags: HashSet<&str> = lists.tags.iter().map(String::as_str).collect();

    let project = if projects.contains(raw.project.as_str()) {
        raw.project
    } else {
        warn!("Model suggested unknown project {:?}, using {}", raw.project, FALLBACK_PROJECT);
        FALLBACK_PROJECT.to_string()
    };

    let tags = raw
        .tags
        .into_iter()
        .filter(|tag| {
            let known = allowed_tags.contains(tag.as_str());
            if !known {
                warn!("Dropping unknown tag {:?}", tag);
            }
            known
        })
        .collect();

    CategorizationResult { project, tags }
}

/// Runs the categorization contract against a content generator
pub struct Categorizer {
    generator: Arc<dyn ContentGenerator>,
}

impl Categorizer {
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self { generator }
    }

    /// Suggest a project and tags for `file`
    pub async fn categorize(&self, file: &UploadedFile, lists: &AllowLists) -> Result<CategorizationResult> {
        let request = build_request(file, lists)?;
        info!("Categorizing {} ({})", file.name, file.media_type);
        self.execute(&request, lists).await
    }

    /// Send a prepared request and sanitize the reply.
    ///
    /// Every failure past this point is reported as [`SorterError::Categorization`].
    pub async fn execute(&self, request: &GenerateRequest, lists: &AllowLists) -> Result<CategorizationResult> {
        let outcome = match self.generator.generate(request).await {
            Ok(text) => parse_response(&text),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(raw) => Ok(sanitize(raw, lists)),
            Err(e) => {
                error!("Error categorizing file with Gemini API: {}", e);
                Err(SorterError::Categorization)
            }
        }
    }
}
