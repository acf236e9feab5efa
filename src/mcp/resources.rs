//! MCP resource handlers.
//!
//! Resources are accessed via URI scheme `recue://`:
//!
//! - `recue://git/status` — current repository snapshot (JSON)
//! - `recue://context/active` — result of the last compose (markdown)
//! - `recue://guideline` — index of loaded guidelines (markdown)
//! - `recue://guideline/{id}` — a single guideline (markdown)

use crate::services::ContextService;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// URI scheme prefix for all recue resources.
const URI_SCHEME: &str = "recue://";

/// Handler for MCP resources.
pub struct ResourceHandler {
    /// Shared session service.
    service: Arc<ContextService>,
}

impl ResourceHandler {
    /// Creates a new resource handler.
    #[must_use]
    pub const fn new(service: Arc<ContextService>) -> Self {
        Self { service }
    }

    /// Lists all available resources.
    ///
    /// Guideline resources are listed dynamically, one per stored
    /// guideline.
    #[must_use]
    pub fn list_resources(&self) -> Vec<ResourceDefinition> {
        let mut resources = vec![
            ResourceDefinition {
                uri: format!("{URI_SCHEME}git/status"),
                name: "Repository Status".to_string(),
                description: Some("Current git snapshot: branch, changes, recent commits".to_string()),
                mime_type: Some("application/json".to_string()),
            },
            ResourceDefinition {
                uri: format!("{URI_SCHEME}context/active"),
                name: "Active Context".to_string(),
                description: Some("Payload from the most recent compose".to_string()),
                mime_type: Some("text/markdown".to_string()),
            },
            ResourceDefinition {
                uri: format!("{URI_SCHEME}guideline"),
                name: "Guideline Index".to_string(),
                description: Some("All loaded guidelines with tier and due state".to_string()),
                mime_type: Some("text/markdown".to_string()),
            },
        ];

        for guideline in self.service.list_guidelines() {
            resources.push(ResourceDefinition {
                uri: format!("{URI_SCHEME}guideline/{}", guideline.id),
                name: guideline.id.clone(),
                description: Some(format!("Guideline, tier {}", guideline.priority_tier)),
                mime_type: Some("text/markdown".to_string()),
            });
        }

        resources
    }

    /// Gets a resource by URI.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI scheme or path is unknown, or the
    /// guideline id does not exist.
    pub fn get_resource(&self, uri: &str) -> Result<ResourceContent> {
        let uri = uri.trim();

        let Some(path) = uri.strip_prefix(URI_SCHEME) else {
            return Err(Error::InvalidArgument(format!("Invalid URI scheme: {uri}")));
        };

        match path {
            "git/status" => {
                let snapshot = self.service.git_snapshot();
                let text =
                    serde_json::to_string_pretty(&snapshot).map_err(|e| Error::OperationFailed {
                        operation: "serialize_snapshot".to_string(),
                        cause: e.to_string(),
                    })?;
                Ok(ResourceContent {
                    uri: uri.to_string(),
                    mime_type: Some("application/json".to_string()),
                    text: Some(text),
                })
            },
            "context/active" => {
                let text = self.service.last_composed().map_or_else(
                    || "_Nothing composed yet. Call track_tokens first._".to_string(),
                    |composed| composed.rendered,
                );
                Ok(ResourceContent {
                    uri: uri.to_string(),
                    mime_type: Some("text/markdown".to_string()),
                    text: Some(text),
                })
            },
            "guideline" => Ok(ResourceContent {
                uri: uri.to_string(),
                mime_type: Some("text/markdown".to_string()),
                text: Some(self.guideline_index()),
            }),
            _ => {
                let Some(id) = path.strip_prefix("guideline/") else {
                    return Err(Error::InvalidArgument(format!(
                        "Unknown resource path: {path}"
                    )));
                };
                let guideline = self.service.guideline(id)?;
                Ok(ResourceContent {
                    uri: uri.to_string(),
                    mime_type: Some("text/markdown".to_string()),
                    text: Some(format!(
                        "# {} (priority {})\n\n{}",
                        guideline.id, guideline.priority_tier, guideline.content
                    )),
                })
            },
        }
    }

    /// Renders the guideline index listing ids, tiers, and due state.
    fn guideline_index(&self) -> String {
        let summary = self.service.summary();
        let guidelines = self.service.list_guidelines();

        if guidelines.is_empty() {
            return "_No guidelines loaded._".to_string();
        }

        let mut lines = vec![
            "# Guidelines".to_string(),
            String::new(),
            format!(
                "{} guidelines, {} tokens consumed.",
                summary.total_guidelines, summary.current_token_count
            ),
            String::new(),
        ];
        for guideline in guidelines {
            let due = if summary.due_now.contains(&guideline.id) {
                "due now"
            } else {
                "scheduled"
            };
            lines.push(format!(
                "- `{}` (tier {}, {due})",
                guideline.id, guideline.priority_tier
            ));
        }
        lines.join("\n")
    }
}

/// Definition of an MCP resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Resource URI.
    pub uri: String,
    /// Human-readable name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// MIME type of the content.
    pub mime_type: Option<String>,
}

/// Content of an MCP resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceContent {
    /// Resource URI.
    pub uri: String,
    /// MIME type of the content.
    pub mime_type: Option<String>,
    /// Text content.
    pub text: Option<String>,
}
