//! Output formatting for CLI.

mod json;
mod presenter;
mod text;

pub use json::JsonFormatter;
pub use presenter::CliPresenter;
