//! MCP (Model Context Protocol) server.
//!
//! Exposes the guideline tools and resources to the host assistant over a
//! JSON-RPC 2.0 stdio transport.

mod resources;
mod server;
pub mod tools;

pub use resources::{ResourceContent, ResourceDefinition, ResourceHandler};
pub use server::{McpServer, RateLimitConfig};
pub use tools::{ToolContent, ToolDefinition, ToolRegistry, ToolResult};
