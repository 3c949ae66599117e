//! steplog-recorder - the global action recorder
//!
//! Captures DOM interactions (click, input, change, context menu, double
//! click, drag start, drop) from pluggable event sources, sequences them into
//! an append-only log and notifies subscribers on every change.
//!
//! ## Sources
//!
//! - **Document**: synchronous, in-process
//! - **ChannelSource**: crossbeam channel, events from any thread
//! - anything implementing [`EventSource`]

pub mod classify;
pub mod config;
pub mod events;
pub mod recorder;
pub mod report;
pub mod source;
pub mod storage;

pub use classify::classify;
pub use config::RecorderConfig;
pub use events::*;
pub use recorder::{ActionRecorder, EventSink, RecordingSnapshot, Subscription};
pub use report::{Report, ReportHeader};
pub use source::{ChannelSource, Document, DocumentSource, EventSource, Receiver, Sender};
pub use storage::{ExportFormat, ReportStorage};

pub mod prelude {
    pub use crate::config::RecorderConfig;
    pub use crate::events::*;
    pub use crate::recorder::{ActionRecorder, EventSink, RecordingSnapshot, Subscription};
    pub use crate::report::Report;
    pub use crate::source::{ChannelSource, Document, EventSource};
    pub use crate::storage::{ExportFormat, ReportStorage};
}
