//! JSON output formatting.

use anyhow::Result;
use serde::Serialize;
use toolbox_core::{Notice, PromptReason};

/// Credential prompt as emitted in JSON mode.
#[derive(Debug, Serialize)]
pub struct PromptOutput {
    pub prompt: PromptReason,
    pub hint: &'static str,
}

impl PromptOutput {
    pub fn new(reason: PromptReason) -> Self {
        Self {
            prompt: reason,
            hint: "toolbox key set",
        }
    }
}

/// Notice as emitted in JSON mode.
#[derive(Debug, Serialize)]
pub struct NoticeOutput<'a> {
    pub notice: &'a Notice,
}

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Serializes any value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let output = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(output)
    }
}
