//! Tool definitions for MCP tools.
//!
//! Contains the JSON Schema definitions for all recue tools.

use super::ToolDefinition;

/// Defines the `add_guideline` tool.
pub fn add_guideline_tool() -> ToolDefinition {
    ToolDefinition {
        name: "add_guideline".to_string(),
        description: "Add a guideline that will be re-surfaced on a token-based repetition schedule"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": "string",
                    "description": "Unique guideline id"
                },
                "content": {
                    "type": "string",
                    "description": "The guideline text to re-surface"
                },
                "priority": {
                    "type": "integer",
                    "description": "Priority tier: 10 always visible, 8-9 frequent, 5-7 normal, 1-4 low (default: 5)",
                    "minimum": 1,
                    "maximum": 10
                },
                "repeat_after_tokens": {
                    "type": "integer",
                    "description": "Override the repeat interval in tokens (default derives from priority)",
                    "minimum": 1
                }
            },
            "required": ["id", "content"]
        }),
    }
}

/// Defines the `remove_guideline` tool.
pub fn remove_guideline_tool() -> ToolDefinition {
    ToolDefinition {
        name: "remove_guideline".to_string(),
        description: "Remove a guideline by id".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": "string",
                    "description": "Guideline id to remove"
                }
            },
            "required": ["id"]
        }),
    }
}

/// Defines the `track_tokens` tool.
pub fn track_tokens_tool() -> ToolDefinition {
    ToolDefinition {
        name: "track_tokens".to_string(),
        description: "Record consumed tokens and receive the guidelines now due plus repository status"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "delta": {
                    "type": "integer",
                    "description": "Tokens consumed since the last call (non-negative)",
                    "minimum": 0
                }
            },
            "required": ["delta"]
        }),
    }
}

/// Defines the `get_context_summary` tool.
pub fn get_context_summary_tool() -> ToolDefinition {
    ToolDefinition {
        name: "get_context_summary".to_string(),
        description: "Get a read-only summary of all guidelines, their due state, and the repetition schedule"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        }),
    }
}

/// Defines the `force_refresh` tool.
pub fn force_refresh_tool() -> ToolDefinition {
    ToolDefinition {
        name: "force_refresh".to_string(),
        description: "Force a git status refresh, bypassing the snapshot TTL".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        }),
    }
}
