//! Display primitives shared by command output: colors, tables and spinners.

pub mod colors;
pub mod progress;
pub mod table;

pub use colors::*;
pub use progress::*;
pub use table::*;

/// Render a success action result.
pub fn action_success(message: &str) -> String {
    format!("{} {}", console::style("\u{2713}").green().bold(), message)
}

/// Render a failure action result.
pub fn action_failure(message: &str) -> String {
    format!("{} {}", console::style("\u{2717}").red().bold(), message)
}

/// Bold section heading.
pub fn heading(title: &str) -> String {
    console::style(title).bold().underlined().to_string()
}
