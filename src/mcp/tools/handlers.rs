//! Tool execution handlers.

use crate::services::ContextService;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

use super::{ToolContent, ToolResult};

/// Maximum allowed input length for guideline content.
///
/// Prevents memory exhaustion via oversized payloads. 1MB is generous for
/// any reasonable guideline while preventing abuse.
const MAX_CONTENT_LENGTH: usize = 1_048_576; // 1 MB

/// Maximum allowed length for guideline ids.
const MAX_ID_LENGTH: usize = 256;

/// Validates that a string input does not exceed the maximum allowed length.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` if the input exceeds `max_length`.
fn validate_input_length(input: &str, field_name: &str, max_length: usize) -> Result<()> {
    if input.len() > max_length {
        return Err(Error::InvalidArgument(format!(
            "{field_name} exceeds maximum length ({} > {max_length} bytes)",
            input.len()
        )));
    }
    Ok(())
}

fn text_result(text: impl Into<String>) -> ToolResult {
    ToolResult {
        content: vec![ToolContent::Text { text: text.into() }],
        is_error: false,
    }
}

/// Arguments for the `add_guideline` tool.
#[derive(Debug, Deserialize)]
struct AddGuidelineArgs {
    id: String,
    content: String,
    priority: Option<u8>,
    repeat_after_tokens: Option<u64>,
}

/// Arguments for the `remove_guideline` tool.
#[derive(Debug, Deserialize)]
struct RemoveGuidelineArgs {
    id: String,
}

/// Arguments for the `track_tokens` tool.
#[derive(Debug, Deserialize)]
struct TrackTokensArgs {
    delta: i64,
}

/// Executes the `add_guideline` tool.
pub fn execute_add_guideline(service: &ContextService, arguments: Value) -> Result<ToolResult> {
    let args: AddGuidelineArgs =
        serde_json::from_value(arguments).map_err(|e| Error::InvalidArgument(e.to_string()))?;

    validate_input_length(&args.id, "id", MAX_ID_LENGTH)?;
    validate_input_length(&args.content, "content", MAX_CONTENT_LENGTH)?;

    let guideline =
        service.add_guideline(&args.id, &args.content, args.priority, args.repeat_after_tokens)?;

    let schedule = guideline.repeat_after_tokens.map_or_else(
        || {
            if guideline.is_always_visible() {
                "always visible".to_string()
            } else {
                format!("repeats on the tier-{} default interval", guideline.priority_tier)
            }
        },
        |tokens| format!("repeats every {tokens} tokens"),
    );

    Ok(text_result(format!(
        "Added guideline '{}' (tier {}, {schedule})",
        guideline.id, guideline.priority_tier
    )))
}

/// Executes the `remove_guideline` tool.
pub fn execute_remove_guideline(service: &ContextService, arguments: Value) -> Result<ToolResult> {
    let args: RemoveGuidelineArgs =
        serde_json::from_value(arguments).map_err(|e| Error::InvalidArgument(e.to_string()))?;

    service.remove_guideline(&args.id)?;
    Ok(text_result(format!("Removed guideline '{}'", args.id)))
}

/// Executes the `track_tokens` tool.
///
/// Returns the freshly composed payload: due guidelines in scheduler order
/// followed by the repository summary.
pub fn execute_track_tokens(service: &ContextService, arguments: Value) -> Result<ToolResult> {
    let args: TrackTokensArgs =
        serde_json::from_value(arguments).map_err(|e| Error::InvalidArgument(e.to_string()))?;

    let payload = service.track_tokens(args.delta)?;
    Ok(text_result(format!(
        "Tracked {} tokens (total {}).\n\n{}",
        args.delta, payload.token_count, payload.rendered
    )))
}

/// Executes the `get_context_summary` tool.
pub fn execute_get_context_summary(service: &ContextService) -> Result<ToolResult> {
    let summary = service.summary();
    let text = serde_json::to_string_pretty(&summary).map_err(|e| Error::OperationFailed {
        operation: "serialize_summary".to_string(),
        cause: e.to_string(),
    })?;
    Ok(text_result(text))
}

/// Executes the `force_refresh` tool.
pub fn execute_force_refresh(service: &ContextService) -> Result<ToolResult> {
    let snapshot = service.force_refresh();
    Ok(text_result(format!(
        "Refreshed repository status.\n\n{}",
        snapshot.summary_markdown()
    )))
}
