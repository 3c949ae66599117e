//! # steplog
//!
//! Record what a user does on a page, step by step.
//!
//! ## Features
//!
//! - **Recording**: one shared recorder for the whole app, start/stop/clear
//! - **Sources**: plug in anything that produces DOM events
//! - **Subscribers**: re-render on every change
//! - **Export**: Markdown, JSON lines, terminal tables
//!
//! ## Quick Start
//!
//! ```rust
//! use steplog::prelude::*;
//!
//! let recorder = ActionRecorder::new();
//! let document = Document::new();
//! recorder.attach_source(document.source());
//!
//! recorder.start_recording();
//! document.dispatch(&DomEvent::click(Element::new("button").with_id("submit-button"), "/forms"));
//! recorder.stop_recording();
//!
//! let actions = recorder.actions();
//! assert_eq!(actions[0].target_element(), "#submit-button");
//! # Ok::<(), anyhow::Error>(())
//! ```

// Re-export DOM primitives
pub use steplog_core::*;

// Re-export recorder module
pub use steplog_recorder as recorder;

pub use steplog_recorder::{
    ActionRecorder, ActionType, ChannelSource, Document, DomEvent, DomEventKind, EventSink,
    EventSource, ExportFormat, NewAction, RecordedAction, RecorderConfig, Report, ReportStorage,
    Subscription,
};

/// Prelude - import everything you need
pub mod prelude {
    pub use steplog_core::prelude::*;
    pub use steplog_recorder::prelude::*;
}
