//! Status color mapping for CLI output.
//!
//! `console` drops styling on its own when stdout is not a terminal or
//! `NO_COLOR` is set.

use console::{style, StyledObject};

use crate::domain::models::{BackendMode, GuardrailStatus, ImageStatus, LinkStatus};

/// Online = green, offline = red, checking = yellow.
pub fn colorize_link(status: LinkStatus) -> StyledObject<&'static str> {
    match status {
        LinkStatus::Online => style("online").green().bold(),
        LinkStatus::Offline => style("offline").red().bold(),
        LinkStatus::Checking => style("checking").yellow(),
    }
}

pub fn colorize_mode(mode: BackendMode) -> StyledObject<&'static str> {
    match mode {
        BackendMode::Live => style("live").cyan(),
        BackendMode::Mocked => style("mocked").dim(),
    }
}

pub fn colorize_guardrail(status: Option<GuardrailStatus>) -> StyledObject<&'static str> {
    match status {
        Some(GuardrailStatus::Pass) => style("pass").green(),
        Some(GuardrailStatus::NeedsFix) => style("needs fix").red().bold(),
        None => style("-").dim(),
    }
}

pub const fn image_status_label(status: Option<ImageStatus>) -> &'static str {
    match status {
        Some(ImageStatus::Live) => "live",
        Some(ImageStatus::Mocked) => "mocked",
        Some(ImageStatus::Error) => "error",
        None => "-",
    }
}
