//! Service layer.

mod context;

pub use context::{ComposedContext, ContextService, ContextSummary, NextRepetition};
