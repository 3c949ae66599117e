//! Interactive session - a line-oriented stand-in for the practice pages
//!
//! Each line is either a recorder control (`start`, `stop`, `clear`), an
//! interaction dispatched on the in-process document (`click`, `type`, ...)
//! or a review command (`show`, `export`).

use anyhow::Result;
use std::path::PathBuf;
use steplog::prelude::*;
use steplog::ErrorCode;

pub const HELP: &str = "\
Recorder:    start | stop | clear | status
Navigation:  goto <page>
Interaction: click | dblclick | rightclick | drag | drop <element>
             type | select | change <element>=<value>
             {\"type\":\"click\",\"target\":{...},\"page\":\"/x\"}   (raw DOM event)
Review:      show | export <md|jsonl> [name]
Other:       help | quit

Elements use tag#id.class[role=x], optionally followed by ' in <ancestor>'.
A value always comes last and is taken verbatim:
  click button#start-recording-btn in div.action-recorder-controls
  type #email-input in form#signup=a@b.com
  type #q=rock in roll
  select #country=fr";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Stop,
    Clear,
    Status,
    Goto(String),
    Dispatch(DomEvent),
    Show,
    Export {
        format: ExportFormat,
        name: Option<String>,
    },
    Help,
    Quit,
    Nothing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Quiet,
    Quit,
}

/// Parse one input line. `page` is the route events are attributed to.
pub fn parse_command(line: &str, page: &str) -> steplog::Result<Command> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("//") {
        return Ok(Command::Nothing);
    }
    if line.starts_with('{') {
        let event: DomEvent = serde_json::from_str(line)
            .map_err(|e| Error::new(ErrorCode::InvalidEvent, e.to_string()))?;
        return Ok(Command::Dispatch(event));
    }

    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let word = word.to_lowercase();
    let word = word.as_str();
    let rest = rest.trim();

    let command = match word {
        "start" => Command::Start,
        "stop" => Command::Stop,
        "clear" => Command::Clear,
        "status" => Command::Status,
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "goto" => {
            if rest.is_empty() {
                return Err(usage("goto <page>"));
            }
            let page = if rest.starts_with('/') {
                rest.to_string()
            } else {
                format!("/{}", rest)
            };
            Command::Goto(page)
        }
        "export" => {
            let (format, name) = rest.split_once(' ').unwrap_or((rest, ""));
            let format = match format {
                "md" | "markdown" => ExportFormat::Markdown,
                "jsonl" | "json" => ExportFormat::Jsonl,
                _ => return Err(usage("export <md|jsonl> [name]")),
            };
            let name = Some(name.trim().to_string()).filter(|n| !n.is_empty());
            Command::Export { format, name }
        }
        "click" | "dblclick" | "rightclick" | "drag" | "drop" => {
            let kind = match word {
                "click" => DomEventKind::Click,
                "dblclick" => DomEventKind::DblClick,
                "rightclick" => DomEventKind::ContextMenu,
                "drag" => DomEventKind::DragStart,
                _ => DomEventKind::Drop,
            };
            let target = element(rest, None, word)?;
            Command::Dispatch(DomEvent::new(kind, target, page))
        }
        "type" | "select" | "change" => {
            let (kind, tag) = match word {
                "type" => (DomEventKind::Input, Some("input")),
                "select" => (DomEventKind::Change, Some("select")),
                _ => (DomEventKind::Change, None),
            };
            let target = element(rest, tag, word)?;
            if target.value.is_none() {
                return Err(usage(&format!("{} <element>=<value>", word)));
            }
            Command::Dispatch(DomEvent::new(kind, target, page))
        }
        other => {
            return Err(Error::new(ErrorCode::Unknown, format!("Unknown command: {}", other))
                .with_suggestions(vec!["Type 'help' for the list of commands".to_string()]))
        }
    };
    Ok(command)
}

/// Parse an element spec; when it starts without a tag, use `default_tag`
fn element(spec: &str, default_tag: Option<&str>, word: &str) -> steplog::Result<Element> {
    if spec.is_empty() {
        return Err(usage(&format!("{} <element>", word)));
    }
    let mut el = Element::parse_spec(spec)?;
    if let Some(tag) = default_tag {
        if spec.starts_with(['#', '.', '[']) {
            el.tag = tag.to_string();
        }
    }
    Ok(el)
}

fn usage(text: &str) -> Error {
    Error::new(ErrorCode::Unknown, format!("Usage: {}", text))
}

pub struct Session {
    recorder: ActionRecorder,
    document: Document,
    page: String,
    reports: PathBuf,
}

impl Session {
    pub fn new(recorder: ActionRecorder, reports: PathBuf) -> Self {
        let document = Document::new();
        recorder.attach_source(document.source());
        Self {
            recorder,
            document,
            page: "/".to_string(),
            reports,
        }
    }

    pub fn recorder(&self) -> &ActionRecorder {
        &self.recorder
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    pub fn execute(&mut self, line: &str) -> Result<Reply> {
        let command = match parse_command(line, &self.page) {
            Ok(c) => c,
            Err(e) => return Ok(Reply::Text(describe_error(&e))),
        };

        let reply = match command {
            Command::Start => {
                self.recorder.start_recording();
                Reply::Text("Action recording started".to_string())
            }
            Command::Stop => {
                self.recorder.stop_recording();
                Reply::Text("Action recording stopped".to_string())
            }
            Command::Clear => {
                self.recorder.clear_actions();
                Reply::Text("Recorded actions cleared".to_string())
            }
            Command::Status => Reply::Text(format!(
                "{} | {} action{} | page {}",
                if self.recorder.is_recording() { "Recording" } else { "Stopped" },
                self.recorder.action_count(),
                if self.recorder.action_count() == 1 { "" } else { "s" },
                self.page
            )),
            Command::Goto(page) => {
                self.page = page;
                Reply::Text(format!("Now on {}", self.page))
            }
            Command::Dispatch(event) => {
                if event.page.is_empty() {
                    let event = DomEvent { page: self.page.clone(), ..event };
                    self.document.dispatch(&event);
                } else {
                    self.document.dispatch(&event);
                }
                Reply::Quiet
            }
            Command::Show => match Report::from_snapshot(self.recorder.snapshot()) {
                Ok(report) => Reply::Text(report.to_table()),
                Err(e) => Reply::Text(describe_error(&e)),
            },
            Command::Export { format, name } => match Report::from_snapshot(self.recorder.snapshot()) {
                Ok(report) => {
                    let storage = ReportStorage::with_dir(&self.reports)?;
                    let path = storage.save(&report, name.as_deref().unwrap_or("recorded-actions"), format)?;
                    Reply::Text(format!("Saved: {}", path.display()))
                }
                Err(e) => Reply::Text(describe_error(&e)),
            },
            Command::Help => Reply::Text(HELP.to_string()),
            Command::Quit => Reply::Quit,
            Command::Nothing => Reply::Quiet,
        };
        Ok(reply)
    }
}

fn describe_error(e: &Error) -> String {
    let mut text = e.message.clone();
    for s in &e.suggestions {
        text.push_str(&format!("\n  hint: {}", s));
    }
    text
}
