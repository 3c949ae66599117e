//! Review and export of the recorded log
//!
//! A report is a timestamped copy of the recorder's snapshot. Rendering never
//! touches the recorder again.

use crate::events::RecordedAction;
use crate::recorder::RecordingSnapshot;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::io::Write;
use steplog_core::{Error, Result};

const TITLE: &str = "Recorded Actions Report";
const COLUMNS: [&str; 6] = ["Step", "Action", "Target", "Value", "Page", "Time"];

#[derive(Debug, Clone)]
pub struct Report {
    pub generated_at: DateTime<Local>,
    pub recording: bool,
    pub actions: Vec<RecordedAction>,
}

/// First line of a JSON lines export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportHeader {
    pub title: String,
    pub generated: String,
    pub recording: bool,
    pub actions: usize,
}

impl Report {
    /// Fails with `NothingToExport` when the log is empty
    pub fn from_snapshot(snapshot: RecordingSnapshot) -> Result<Self> {
        Self::new(snapshot.actions, snapshot.recording)
    }

    pub fn new(actions: Vec<RecordedAction>, recording: bool) -> Result<Self> {
        if actions.is_empty() {
            return Err(Error::nothing_to_export());
        }
        Ok(Self {
            generated_at: Local::now(),
            recording,
            actions,
        })
    }

    pub fn status(&self) -> &'static str {
        if self.recording {
            "Active"
        } else {
            "Stopped"
        }
    }

    fn generated(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    pub fn header(&self) -> ReportHeader {
        ReportHeader {
            title: TITLE.to_string(),
            generated: self.generated(),
            recording: self.recording,
            actions: self.actions.len(),
        }
    }

    pub fn to_markdown(&self) -> String {
        let mut md = format!("# {}\n\n", TITLE);
        md.push_str(&format!("**Generated:** {}\n", self.generated()));
        md.push_str(&format!("**Total Actions:** {}\n", self.actions.len()));
        md.push_str(&format!("**Recording Status:** {}\n\n", self.status()));

        md.push_str(&format!("| {} |\n", COLUMNS.join(" | ")));
        md.push_str(&format!(
            "|{}|\n",
            COLUMNS
                .iter()
                .map(|c| "-".repeat(c.len() + 2))
                .collect::<Vec<_>>()
                .join("|")
        ));
        for row in self.rows() {
            let cells: Vec<String> = row.iter().map(|c| escape_cell(c)).collect();
            md.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        md
    }

    /// Fixed-width table for terminals
    pub fn to_table(&self) -> String {
        let rows = self.rows();
        let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.len()).collect();
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<width$}", c, width = *w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let head: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
        let mut out = line(&head[..]);
        out.push('\n');
        out.push_str(&widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
        out.push('\n');
        for row in &rows {
            out.push_str(&line(&row[..]));
            out.push('\n');
        }
        out.push_str(&format!(
            "\n{} action{} ({})\n",
            self.actions.len(),
            if self.actions.len() == 1 { "" } else { "s" },
            self.status().to_lowercase()
        ));
        out
    }

    /// Header line, then one action per line
    pub fn write_jsonl(&self, mut w: impl Write) -> Result<()> {
        serde_json::to_writer(&mut w, &self.header())?;
        writeln!(w)?;
        for action in &self.actions {
            serde_json::to_writer(&mut w, action)?;
            writeln!(w)?;
        }
        w.flush()?;
        Ok(())
    }

    fn rows(&self) -> Vec<[String; 6]> {
        self.actions
            .iter()
            .map(|a| {
                [
                    a.step_no().to_string(),
                    a.action_type().label().to_string(),
                    a.target_element().to_string(),
                    if a.value().is_empty() {
                        "-".to_string()
                    } else {
                        a.value().to_string()
                    },
                    a.page().to_string(),
                    a.timestamp().to_string(),
                ]
            })
            .collect()
    }
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}
