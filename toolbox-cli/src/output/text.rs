//! Text output formatting with colors.

use chrono::{DateTime, Local, Utc};
use toolbox_core::{InstallStatus, Notice, NoticeLevel, PromptReason, ToolView, ToolboxView, UNKNOWN};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    name_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            name_width: 28,
        }
    }

    /// Formats the full tool list.
    pub fn format_view(&self, view: &ToolboxView) -> String {
        let mut lines = Vec::new();

        let source = if view.from_cache { "cached" } else { "fresh" };
        lines.push(format!(
            "{} {}",
            self.bold("DHIS2 Tools"),
            self.dim(&format!(
                "(releases as of {}, {source})",
                Self::format_timestamp(view.fetched_at)
            ))
        ));
        lines.push("─".repeat(60));

        if view.tools.is_empty() {
            lines.push(self.dim("No tracked tools."));
        }
        for tool in &view.tools {
            lines.push(self.format_tool(tool));
        }

        lines.push(String::new());
        lines.push(format!(
            "{} of {} tools installed",
            view.installed_count(),
            view.tools.len()
        ));

        lines.join("\n")
    }

    /// Formats one tool as a header line plus detail lines.
    pub fn format_tool(&self, tool: &ToolView) -> String {
        let release = &tool.release;
        let published = release
            .published_date()
            .map_or_else(|| UNKNOWN.to_string(), |d| d.format("%Y-%m-%d").to_string());

        let mut lines = vec![format!(
            "{:<width$} {:<10} {:<12} {}",
            release.name,
            release.version,
            published,
            self.format_status(tool),
            width = self.name_width
        )];

        lines.push(format!("  {}", self.cyan(&tool.repository_url)));
        if release.has_download() {
            lines.push(format!("  Download: {}", release.download_url));
        }

        lines.join("\n")
    }

    /// Formats the installed state.
    pub fn format_status(&self, tool: &ToolView) -> String {
        match &tool.installed {
            InstallStatus::Installed { version } if tool.is_outdated() => {
                self.yellow(&format!("Installed {version} (update available)"))
            }
            InstallStatus::Installed { version } => self.green(&format!("Installed {version}")),
            InstallStatus::NotInstalled => self.dim("Not installed"),
        }
    }

    /// Formats a notice with a level prefix.
    pub fn format_notice(&self, notice: &Notice) -> String {
        let prefix = match notice.level {
            NoticeLevel::Info => self.cyan("info:"),
            NoticeLevel::Warning => self.yellow("warning:"),
            NoticeLevel::Error => self.red("error:"),
        };
        format!("{prefix} {}", notice.message)
    }

    /// Formats the credential-entry prompt.
    pub fn format_prompt(&self, reason: PromptReason) -> String {
        let headline = match reason {
            PromptReason::Missing => "No GitHub key is stored.",
            PromptReason::Invalid => "The stored GitHub key was rejected by GitHub.",
        };
        format!(
            "{}\nRun {} to enter a personal access token.",
            self.bold(headline),
            self.cyan("`toolbox key set`")
        )
    }

    fn format_timestamp(at: DateTime<Utc>) -> String {
        at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}
