//! Task definition and command template handling

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Placeholder replaced with the GPU slot identifier.
pub const GPU_PLACEHOLDER: &str = "{gpu}";

/// Placeholder replaced with the task parameter.
pub const PARAM_PLACEHOLDER: &str = "{x}";

/// One unit of work: a command template paired with the parameter that gets
/// substituted into it. Immutable once enqueued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Command template, may contain `{gpu}` and `{x}` placeholders
    pub template: String,

    /// Value substituted for `{x}`
    pub parameter: String,
}

impl Task {
    /// Create a new task
    pub fn new(template: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            parameter: parameter.into(),
        }
    }

    /// Substitute the GPU slot and parameter into the template.
    ///
    /// Only the two recognized placeholders are replaced; a template that
    /// contains neither runs unchanged.
    pub fn render(&self, gpu: u32) -> String {
        self.template
            .replace(GPU_PLACEHOLDER, &gpu.to_string())
            .replace(PARAM_PLACEHOLDER, &self.parameter)
    }
}

/// Outcome of one executed task. Exactly one report is produced per task
/// consumed from the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskReport {
    /// Whether the external process exited zero
    pub success: bool,

    /// The parameter this task ran with
    pub parameter: String,

    /// GPU slot that executed the task
    pub gpu: u32,

    /// Wall-clock time from launch to exit, in whole milliseconds
    pub elapsed_ms: u64,
}

/// Split a substituted command line into an argument vector using
/// shell-style quoting rules (quoted arguments may contain spaces).
pub fn tokenize(command: &str) -> Result<Vec<String>> {
    let argv = shlex::split(command)
        .ok_or_else(|| Error::InvalidCommand(format!("unbalanced quoting in `{command}`")))?;
    if argv.is_empty() {
        return Err(Error::InvalidCommand("empty command".to_string()));
    }
    Ok(argv)
}
