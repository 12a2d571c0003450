//! Spinners for long-running backend calls.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ";

/// Create a spinner with `message`. In JSON mode the spinner is hidden so
/// stdout stays parseable.
pub fn create_spinner(message: impl Into<String>, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
        spinner.set_style(style.tick_chars(SPINNER_CHARS));
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Extension trait for ProgressBar to add common utility methods
pub trait ProgressBarExt {
    /// Finish with a success message (green checkmark)
    fn finish_success(&self, message: impl Into<String>);

    /// Finish with an error message (red X)
    fn finish_error(&self, message: impl Into<String>);
}

impl ProgressBarExt for ProgressBar {
    fn finish_success(&self, message: impl Into<String>) {
        self.finish_with_message(super::action_success(&message.into()));
    }

    fn finish_error(&self, message: impl Into<String>) {
        self.finish_with_message(super::action_failure(&message.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_spinner_is_hidden() {
        let spinner = create_spinner("Creating plan", true);
        assert!(spinner.is_hidden());
        spinner.finish_success("done");
        assert!(spinner.is_finished());
    }
}
