//! Terminal presenter.
//!
//! Notices and prompts go to stderr as they happen. The rendered view is
//! held back and written to stdout once the command finishes, so a command
//! that renders twice (activate, then refresh) prints only the final view.

use std::sync::{Mutex, PoisonError};

use anyhow::Result;
use toolbox_core::{Notice, NoticeLevel, Presenter, PromptReason, ToolboxView};

use super::json::{JsonFormatter, NoticeOutput, PromptOutput};
use super::text::TextFormatter;
use crate::OutputFormat;

/// Presenter writing to the terminal.
pub struct CliPresenter {
    format: OutputFormat,
    text: TextFormatter,
    json: JsonFormatter,
    quiet: bool,
    view: Mutex<Option<ToolboxView>>,
}

impl CliPresenter {
    /// Creates a presenter.
    pub fn new(format: OutputFormat, use_colors: bool, pretty: bool, quiet: bool) -> Self {
        Self {
            format,
            text: TextFormatter::new(use_colors),
            json: JsonFormatter::new(pretty),
            quiet,
            view: Mutex::new(None),
        }
    }

    /// Takes the last rendered view.
    pub fn take_view(&self) -> Option<ToolboxView> {
        self.view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Formats the view for stdout.
    pub fn format_view(&self, view: &ToolboxView) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(self.text.format_view(view)),
            OutputFormat::Json => self.json.format(view),
        }
    }

    /// Prints the last rendered view, if any. Returns whether one was printed.
    pub fn flush(&self) -> Result<bool> {
        match self.take_view() {
            Some(view) => {
                println!("{}", self.format_view(&view)?);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn format_notice(&self, notice: &Notice) -> String {
        match self.format {
            OutputFormat::Text => self.text.format_notice(notice),
            OutputFormat::Json => self
                .json
                .format(&NoticeOutput { notice })
                .unwrap_or_else(|_| notice.message.clone()),
        }
    }

    fn format_prompt(&self, reason: PromptReason) -> String {
        match self.format {
            OutputFormat::Text => self.text.format_prompt(reason),
            OutputFormat::Json => self
                .json
                .format(&PromptOutput::new(reason))
                .unwrap_or_default(),
        }
    }
}

impl Presenter for CliPresenter {
    fn render(&self, view: &ToolboxView) {
        *self.view.lock().unwrap_or_else(PoisonError::into_inner) = Some(view.clone());
    }

    fn prompt_credential(&self, reason: PromptReason) {
        eprintln!("{}", self.format_prompt(reason));
    }

    fn notify(&self, notice: &Notice) {
        if self.quiet && notice.level == NoticeLevel::Info {
            return;
        }
        eprintln!("{}", self.format_notice(notice));
    }
}
