//! Report storage - exported reports on disk
//!
//! The recorder never persists anything by itself; files only appear when a
//! report is explicitly saved. JSON lines exports can be loaded back for review.

use crate::events::RecordedAction;
use crate::report::{Report, ReportHeader};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Markdown,
    Jsonl,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Jsonl => "jsonl",
        }
    }
}

pub struct ReportStorage {
    dir: PathBuf,
}

impl ReportStorage {
    pub fn new() -> Result<Self> {
        let home = std::env::var("HOME").context("HOME not set")?;
        Self::with_dir(PathBuf::from(home).join(".steplog"))
    }

    pub fn with_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create report dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Save a report as `<name>_<timestamp>.<ext>`
    pub fn save(&self, report: &Report, name: &str, format: ExportFormat) -> Result<PathBuf> {
        let ts = report.generated_at.format("%Y%m%d_%H%M%S");
        let filename = format!("{}_{}.{}", sanitize(name), ts, format.extension());
        let path = self.dir.join(&filename);

        let file = File::create(&path).with_context(|| format!("cannot create {}", path.display()))?;
        let mut w = BufWriter::new(file);
        match format {
            ExportFormat::Markdown => {
                w.write_all(report.to_markdown().as_bytes())?;
                w.flush()?;
            }
            ExportFormat::Jsonl => report.write_jsonl(&mut w)?,
        }

        Ok(path)
    }

    /// Load a JSON lines export
    pub fn load(&self, filename: &str) -> Result<(ReportHeader, Vec<RecordedAction>)> {
        let path = self.dir.join(filename);
        let file = File::open(&path).with_context(|| format!("cannot open {}", path.display()))?;
        let mut lines = BufReader::new(file).lines();

        // First line: header
        let header_line = lines.next().context("Empty file")??;
        let header: ReportHeader =
            serde_json::from_str(&header_line).context("not a steplog JSON lines report")?;

        // Remaining lines: actions
        let mut actions = Vec::new();
        for (i, line) in lines.enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let action: RecordedAction = serde_json::from_str(&line)
                .with_context(|| format!("bad action on line {}", i + 2))?;
            actions.push(action);
        }

        Ok((header, actions))
    }

    /// List saved reports, oldest name first
    pub fn list(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if let Some(s) = name.to_str() {
                if s.ends_with(".jsonl") || s.ends_with(".md") {
                    files.push(s.to_string());
                }
            }
        }
        files.sort();
        Ok(files)
    }

    pub fn delete(&self, filename: &str) -> Result<()> {
        let path = self.dir.join(filename);
        fs::remove_file(&path).with_context(|| format!("cannot delete {}", path.display()))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

fn sanitize(s: &str) -> String {
    let s: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if s.is_empty() {
        "recorded-actions".to_string()
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ActionType, NewAction};
    use crate::recorder::ActionRecorder;

    fn report() -> Report {
        let recorder = ActionRecorder::new();
        recorder.start_recording();
        recorder.add_action(NewAction::new(ActionType::Select, "#country", "/dropdowns").with_value("fr"));
        recorder.add_action(NewAction::new(ActionType::Drop, "#target", "/drag-drop"));
        Report::from_snapshot(recorder.snapshot()).unwrap()
    }

    #[test]
    fn jsonl_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ReportStorage::with_dir(dir.path()).unwrap();
        let report = report();

        let path = storage.save(&report, "login flow", ExportFormat::Jsonl).unwrap();
        let filename = path.file_name().unwrap().to_str().unwrap().to_string();
        assert!(filename.starts_with("login_flow_"));
        assert!(filename.ends_with(".jsonl"));

        let (header, actions) = storage.load(&filename).unwrap();
        assert!(header.recording);
        assert_eq!(header.actions, 2);
        assert_eq!(actions, report.actions);
    }

    #[test]
    fn markdown_save_list_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ReportStorage::with_dir(dir.path().join("reports")).unwrap();

        let path = storage.save(&report(), "", ExportFormat::Markdown).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# Recorded Actions Report"));

        let listed = storage.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].starts_with("recorded-actions_"));
        assert!(storage.load(&listed[0]).is_err());

        storage.delete(&listed[0]).unwrap();
        assert!(storage.list().unwrap().is_empty());
    }
}
