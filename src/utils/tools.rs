//! Verified-tool state shared across build phases.

use std::collections::{HashMap, HashSet};

use crate::utils::context::ExecutionContext;

/// Tool verification error type
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("'{tool}' is not available: {reason}")]
    Unavailable { tool: String, reason: String },
    #[error("Failed to build container image '{tag}': {reason}")]
    ImageBuild { tag: String, reason: String },
    #[error("Host tools must be verified before app tools")]
    VerificationOrder,
}

/// Verification results for one CLI invocation.
///
/// Host-scope tools are verified at most once per process; each app gets
/// exactly one execution context bound, and a binding never changes for
/// the registry's lifetime. Phases share one registry by reference so
/// verification work done by an earlier phase carries over.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    host_verified: bool,
    host_tools: HashSet<String>,
    contexts: HashMap<String, ExecutionContext>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether host-scope verification has completed.
    pub fn host_verified(&self) -> bool {
        self.host_verified
    }

    pub fn mark_host_verified(&mut self) {
        self.host_verified = true;
    }

    /// Whether a host-scope tool has already been verified.
    pub fn has_tool(&self, name: &str) -> bool {
        self.host_tools.contains(name)
    }

    pub fn record_tool(&mut self, name: &str) {
        self.host_tools.insert(name.to_string());
    }

    /// The execution context bound for an app, if any.
    pub fn context(&self, app_name: &str) -> Option<&ExecutionContext> {
        self.contexts.get(app_name)
    }

    /// Bind an execution context for an app. The first binding wins; a
    /// later call for the same app leaves the existing binding untouched.
    pub fn bind_context(&mut self, app_name: &str, context: ExecutionContext) {
        self.contexts.entry(app_name.to_string()).or_insert(context);
    }
}
