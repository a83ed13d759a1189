//! Request orchestration: validation, then matching.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::MatchError;
use crate::matcher::match_prompt;
use crate::validate::{self, ValidationReport};

/// Stateless prompt matching service over a shared [`Config`].
///
/// Cloning is cheap; all clones share the same configuration.
#[derive(Debug, Clone)]
pub struct PromptService {
    config: Arc<Config>,
}

impl PromptService {
    /// Create a service over the given configuration.
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validate a decoded request and resolve it to a prompt id.
    ///
    /// Validation runs to completion before matching, so structural errors
    /// always take precedence over unknown values or missing combinations.
    pub fn process(&self, request: &Value) -> Result<String, MatchError> {
        let req = validate::validate(request, &self.config)?;
        debug!(data_len = req.data.as_ref().map_or(0, |d| d.chars().count()), "request validated");
        match_prompt(&self.config.table, &req).map(str::to_string)
    }

    /// Produce a diagnostic report listing every problem with a request.
    pub fn inspect(&self, request: &Value) -> ValidationReport {
        validate::inspect(request, &self.config)
    }
}

impl Default for PromptService {
    fn default() -> Self {
        Self::new(Arc::new(Config::default()))
    }
}
