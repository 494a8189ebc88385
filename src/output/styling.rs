use console::{style, Style};

use crate::board::StageStatus;
use crate::providers::gitlab::CiStatus;

/// Styling helpers for terminal output
pub fn dim(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn bright_green(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).bright().green()
}

pub fn bright_yellow(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

pub fn magenta_bold(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).magenta().bold()
}

pub fn gray() -> Style {
    Style::new().black().bright()
}

/// Color of the project name, keyed on the overall pipeline status.
pub fn pipeline_style(status: CiStatus) -> Style {
    match status {
        CiStatus::Success => Style::new().green(),
        CiStatus::Failed => Style::new().red(),
        CiStatus::Running | CiStatus::Pending => Style::new().yellow(),
        _ => Style::new().white(),
    }
}

/// Glyph and color of a stage column.
pub fn column_style(status: StageStatus) -> (&'static str, Style) {
    match status {
        StageStatus::Running => ("🟣", Style::new().magenta()),
        StageStatus::Failed => ("💥", Style::new().red()),
        StageStatus::Passed => ("✅", Style::new().green()),
        StageStatus::Other => ("👋", Style::new().blue()),
        StageStatus::Pending => ("⏳", Style::new().white()),
        StageStatus::AllowedToFail => ("🟨", Style::new().yellow()),
        StageStatus::Canceled => ("⏹️ ", Style::new().yellow()),
        StageStatus::Skipped => ("⏭️ ", Style::new().yellow()),
        StageStatus::Manual | StageStatus::Unknown => ("❓", gray()),
    }
}
