//! Colored terminal rendering for import results.

use cours_sync_core::normalize::EventKind;
use cours_sync_core::{ImportReport, RejectedEvent, SkippedEvent, TargetEvent};
use owo_colors::OwoColorize;

use crate::utils::tui::pluralize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for EventKind {
    fn render(&self) -> String {
        let label = format!("{:<5}", self.label());
        match self {
            EventKind::Exam => label.green().bold().to_string(),
            EventKind::Lecture => label.red().to_string(),
            EventKind::Tutorial => label.blue().to_string(),
            EventKind::Lab => label.yellow().to_string(),
            EventKind::Other => label.dimmed().to_string(),
        }
    }
}

impl Render for TargetEvent {
    fn render(&self) -> String {
        format!(
            "{} {} {}",
            self.kind.render(),
            self.summary(),
            self.start_label().dimmed()
        )
    }
}

impl Render for SkippedEvent {
    fn render(&self) -> String {
        format!("{} {} {}", "!".yellow(), self.label(), self.reason.dimmed())
    }
}

impl Render for RejectedEvent {
    fn render(&self) -> String {
        format!(
            "{} {} {}",
            "x".red(),
            self.summary,
            format!("{} {}", self.status, self.message).dimmed()
        )
    }
}

impl Render for ImportReport {
    fn render(&self) -> String {
        let mut lines = vec![format!(
            "{} Imported {} into {}",
            "✓".green(),
            pluralize("event", self.imported),
            self.calendar_name.bold()
        )];

        if !self.skipped.is_empty() {
            lines.push(format!(
                "\nSkipped {}:",
                pluralize("event", self.skipped.len()).yellow()
            ));
            lines.extend(self.skipped.iter().map(|s| format!("   {}", s.render())));
        }

        if !self.rejected.is_empty() {
            lines.push(format!(
                "\nRejected by Google, {}:",
                pluralize("event", self.rejected.len()).red()
            ));
            lines.extend(self.rejected.iter().map(|r| format!("   {}", r.render())));
        }

        lines.join("\n")
    }
}

