//! sl - steplog CLI
//!
//! Record interactions with DOM practice fixtures, review them and export
//! Markdown or JSON lines reports.

mod session;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use steplog::prelude::*;
use steplog::recorder::ReportHeader;

use session::{Reply, Session};

#[derive(Parser)]
#[command(name = "sl")]
#[command(about = "steplog - record, review and export DOM interactions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Recorder config (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Report directory (default ~/.steplog)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Machine-readable output
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive recording session (default)
    Session,
    /// Feed a JSON lines DOM event script through the recorder
    Replay {
        file: PathBuf,
        #[arg(short, long, value_enum, default_value = "table")]
        format: Format,
        /// Also save the report under this name
        #[arg(long)]
        save: Option<String>,
    },
    /// List saved reports
    List,
    /// Show a saved JSON lines report
    Show {
        file: String,
        #[arg(short, long, value_enum, default_value = "table")]
        format: Format,
    },
    /// Delete a saved report
    Delete {
        file: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Md,
    Jsonl,
}

#[derive(Serialize)]
struct Output<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Error>,
}

impl<T: Serialize> Output<T> {
    fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }
    fn err(e: Error) -> Output<()> {
        Output { success: false, data: None, error: Some(e) }
    }
}

fn print_json<T: Serialize>(output: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(output)?);
    Ok(())
}

#[derive(Serialize)]
struct ReportData<'a> {
    header: ReportHeader,
    actions: &'a [RecordedAction],
}

// ── Main ────────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let json = cli.json;
    let result = run(cli);

    if let Err(e) = result {
        match e.downcast_ref::<Error>() {
            Some(err) if err.is_notice() => {
                eprintln!("{}", err.message);
                return;
            }
            Some(err) if json => {
                let _ = print_json(&Output::<()>::err(err.clone()));
            }
            _ => {}
        }
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => RecorderConfig::load(path)?,
        None => RecorderConfig::default(),
    };
    let storage = match &cli.dir {
        Some(dir) => ReportStorage::with_dir(dir)?,
        None => ReportStorage::new()?,
    };

    match cli.command.unwrap_or(Commands::Session) {
        Commands::Session => run_session(config, &storage),
        Commands::Replay { file, format, save } => replay(config, &storage, &file, format, save, cli.json),
        Commands::List => list(&storage, cli.json),
        Commands::Show { file, format } => show(&storage, &file, format, cli.json),
        Commands::Delete { file } => delete(&storage, &file, cli.json),
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

// ── Session ─────────────────────────────────────────────────────────────────

fn run_session(config: RecorderConfig, storage: &ReportStorage) -> Result<()> {
    let recorder = ActionRecorder::with_config(config);
    let mut session = Session::new(recorder.clone(), storage.path().to_path_buf());

    // Echo each new step as it lands in the log.
    let echoed = Arc::new(AtomicUsize::new(0));
    let (r, seen) = (recorder.clone(), echoed.clone());
    let subscription = recorder.subscribe(move || {
        let actions = r.actions();
        let already = seen.swap(actions.len(), Ordering::SeqCst);
        for a in actions.iter().skip(already) {
            let value = if a.value().is_empty() { String::new() } else { format!(" = {:?}", a.value()) };
            println!("  [{}] {} {}{} ({})", a.step_no(), a.action_type(), a.target_element(), value, a.page());
        }
    });

    let r = recorder.clone();
    ctrlc::set_handler(move || {
        r.stop_recording();
        match Report::from_snapshot(r.snapshot()) {
            Ok(report) => println!("\n{}", report.to_markdown()),
            Err(e) => eprintln!("\n{}", e.message),
        }
        std::process::exit(130);
    })?;

    println!("steplog session. Type 'help' for commands, Ctrl+C to stop and print the report.");
    let stdin = io::stdin();
    loop {
        print!("{}> ", session.page());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match session.execute(&line)? {
            Reply::Text(text) => println!("{}", text),
            Reply::Quiet => {}
            Reply::Quit => break,
        }
    }

    recorder.unsubscribe(subscription);
    recorder.stop_recording();
    Ok(())
}

// ── Reports ─────────────────────────────────────────────────────────────────

fn replay(
    config: RecorderConfig,
    storage: &ReportStorage,
    file: &Path,
    format: Format,
    save: Option<String>,
    json: bool,
) -> Result<()> {
    let events = read_script(file)?;

    let recorder = ActionRecorder::with_config(config);
    let document = Document::new();
    recorder.attach_source(document.source());

    recorder.start_recording();
    let mut delivered = 0usize;
    for event in &events {
        if document.dispatch(event) {
            delivered += 1;
        }
    }
    recorder.stop_recording();
    tracing::info!(events = events.len(), delivered, recorded = recorder.action_count(), "replay finished");

    let report = Report::from_snapshot(recorder.snapshot())?;
    if let Some(name) = save {
        let format = if format == Format::Jsonl { ExportFormat::Jsonl } else { ExportFormat::Markdown };
        let path = storage.save(&report, &name, format)?;
        eprintln!("Saved: {}", path.display());
    }

    if json {
        return print_json(&Output::ok(ReportData { header: report.header(), actions: &report.actions }));
    }
    print_report(&report, format)
}

/// One DomEvent per line; blank lines and `//` comments are skipped
fn read_script(file: &Path) -> Result<Vec<DomEvent>> {
    let f = std::fs::File::open(file).with_context(|| format!("cannot open {}", file.display()))?;
    let mut events = Vec::new();
    for (i, line) in io::BufReader::new(f).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        let event: DomEvent = serde_json::from_str(line)
            .map_err(|e| Error::invalid_event(i + 1, &e.to_string()))?;
        events.push(event);
    }
    Ok(events)
}

fn print_report(report: &Report, format: Format) -> Result<()> {
    match format {
        Format::Table => print!("{}", report.to_table()),
        Format::Md => print!("{}", report.to_markdown()),
        Format::Jsonl => report.write_jsonl(io::stdout().lock())?,
    }
    Ok(())
}

fn list(storage: &ReportStorage, json: bool) -> Result<()> {
    let files = storage.list()?;
    if json {
        return print_json(&Output::ok(files));
    }
    if files.is_empty() {
        println!("No reports saved in {}.", storage.path().display());
    } else {
        for f in files {
            println!("{}", f);
        }
    }
    Ok(())
}

fn show(storage: &ReportStorage, file: &str, format: Format, json: bool) -> Result<()> {
    let (header, actions) = storage.load(file)?;
    if json {
        return print_json(&Output::ok(ReportData { header, actions: &actions }));
    }
    println!("{} ({})", header.title, header.generated);
    let report = Report::new(actions, header.recording)?;
    print_report(&report, format)
}

fn delete(storage: &ReportStorage, file: &str, json: bool) -> Result<()> {
    storage.delete(file)?;
    if json {
        return print_json(&Output::ok(serde_json::json!({ "deleted": file })));
    }
    println!("Deleted: {}", file);
    Ok(())
}
