//! MCP tool implementations.
//!
//! Provides tool handlers for the Model Context Protocol.
//!
//! # Module Structure
//!
//! - [`definitions`]: Tool schema definitions (JSON Schema for input validation)
//! - [`handlers`]: Tool execution logic against the [`ContextService`]

mod definitions;
mod handlers;

use crate::services::ContextService;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of MCP tools.
pub struct ToolRegistry {
    /// Available tools.
    tools: HashMap<String, ToolDefinition>,
    /// Shared session service.
    service: Arc<ContextService>,
}

impl ToolRegistry {
    /// Creates a new tool registry with all recue tools.
    #[must_use]
    pub fn new(service: Arc<ContextService>) -> Self {
        let mut tools = HashMap::new();

        tools.insert(
            "add_guideline".to_string(),
            definitions::add_guideline_tool(),
        );
        tools.insert(
            "remove_guideline".to_string(),
            definitions::remove_guideline_tool(),
        );
        tools.insert("track_tokens".to_string(), definitions::track_tokens_tool());
        tools.insert(
            "get_context_summary".to_string(),
            definitions::get_context_summary_tool(),
        );
        tools.insert(
            "force_refresh".to_string(),
            definitions::force_refresh_tool(),
        );

        Self { tools, service }
    }

    /// Returns all tool definitions.
    #[must_use]
    pub fn list_tools(&self) -> Vec<&ToolDefinition> {
        self.tools.values().collect()
    }

    /// Gets a tool definition by name.
    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Executes a tool with the given arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool is unknown, the arguments are
    /// malformed, or execution fails.
    pub fn execute(&self, name: &str, arguments: Value) -> Result<ToolResult> {
        match name {
            "add_guideline" => handlers::execute_add_guideline(&self.service, arguments),
            "remove_guideline" => handlers::execute_remove_guideline(&self.service, arguments),
            "track_tokens" => handlers::execute_track_tokens(&self.service, arguments),
            "get_context_summary" => handlers::execute_get_context_summary(&self.service),
            "force_refresh" => handlers::execute_force_refresh(&self.service),
            _ => Err(Error::InvalidArgument(format!("Unknown tool: {name}"))),
        }
    }
}

/// Definition of an MCP tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON Schema for input validation.
    pub input_schema: Value,
}

/// Result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the result represents an error.
    #[serde(default)]
    pub is_error: bool,
}

/// Content types that can be returned by tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}
