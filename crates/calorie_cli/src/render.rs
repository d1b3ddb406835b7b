//! Terminal view for tracker updates.

use calorie_core::{DerivedTotals, Entry, EntryId, EntryKind, ViewRenderer};
use std::io::{self, Write};

const PROGRESS_BAR_WIDTH: usize = 30;

/// Writes entry changes as they happen and the totals on `finish`.
pub struct TextRenderer<W: Write> {
    out: W,
    echo_entries: bool,
    last_totals: Option<DerivedTotals>,
    error: Option<io::Error>,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W, echo_entries: bool) -> Self {
        Self {
            out,
            echo_entries,
            last_totals: None,
            error: None,
        }
    }

    pub fn set_echo_entries(&mut self, echo_entries: bool) {
        self.echo_entries = echo_entries;
    }

    /// Prints one entry line regardless of the echo setting.
    pub fn print_entry(&mut self, kind: EntryKind, entry: &Entry) {
        let line = format_entry(kind, entry);
        self.write_line(&line);
    }

    pub fn print_message(&mut self, message: &str) {
        self.write_line(message);
    }

    /// Prints the latest totals and returns the first write error, if any.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(totals) = self.last_totals {
            for line in format_totals(&totals) {
                self.write_line(&line);
            }
        }
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_line(&mut self, line: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = writeln!(self.out, "{line}") {
            self.error = Some(err);
        }
    }
}

impl<W: Write> ViewRenderer for TextRenderer<W> {
    fn render_totals(&mut self, totals: &DerivedTotals) {
        self.last_totals = Some(*totals);
    }

    fn append_entry(&mut self, kind: EntryKind, entry: &Entry) {
        if self.echo_entries {
            self.print_entry(kind, entry);
        }
    }

    fn remove_entry(&mut self, kind: EntryKind, id: &EntryId) {
        if self.echo_entries {
            self.write_line(&format!("removed {kind} {id}"));
        }
    }

    fn clear_entries(&mut self) {
        if self.echo_entries {
            self.write_line("cleared all meals and workouts");
        }
    }
}

fn format_entry(kind: EntryKind, entry: &Entry) -> String {
    format!(
        "{:<7} {:<22} {:>7} kcal  {}",
        kind,
        entry.id(),
        entry.calories(),
        entry.name()
    )
}

fn format_totals(totals: &DerivedTotals) -> Vec<String> {
    let filled =
        (totals.progress_percent() / 100.0 * PROGRESS_BAR_WIDTH as f64).round() as usize;
    let bar = format!(
        "[{}{}] {:.0}%{}",
        "#".repeat(filled),
        " ".repeat(PROGRESS_BAR_WIDTH - filled),
        totals.progress_percent(),
        if totals.over_limit { " OVER LIMIT" } else { "" }
    );

    vec![
        format!("limit     {}", totals.limit),
        format!("consumed  {}", totals.consumed),
        format!("burned    {}", totals.burned),
        format!("net       {}", totals.net),
        format!("remaining {}", totals.remaining),
        bar,
    ]
}
