//! The action recorder service
//!
//! Owns the recording flag, the ordered action log and the subscriber set.
//! One instance is created by the host and cloned wherever it is needed;
//! clones share state.
//!
//! Every operation is total: starting twice, stopping while idle or adding
//! while idle are silent no-ops, never errors.

use crate::classify::classify;
use crate::config::RecorderConfig;
use crate::events::{DomEvent, NewAction, RecordedAction};
use crate::source::{ChannelSource, EventSource, Sender};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, trace, warn};

type Subscriber = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`ActionRecorder::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Recording flag and log, read under one lock
#[derive(Debug, Clone)]
pub struct RecordingSnapshot {
    pub recording: bool,
    pub actions: Vec<RecordedAction>,
}

#[derive(Clone)]
pub struct ActionRecorder {
    inner: Arc<Inner>,
}

struct Inner {
    config: RecorderConfig,
    // Lock order: sources before state. Neither is held while subscribers run.
    sources: Mutex<Vec<Box<dyn EventSource>>>,
    state: Mutex<LogState>,
    subscribers: Mutex<BTreeMap<u64, Subscriber>>,
    next_subscription: AtomicU64,
}

struct LogState {
    recording: bool,
    actions: Vec<RecordedAction>,
    next_step: u32,
}

impl ActionRecorder {
    pub fn new() -> Self {
        Self::with_config(RecorderConfig::default())
    }

    /// An unusable `time_format` is replaced by the default one.
    pub fn with_config(mut config: RecorderConfig) -> Self {
        if let Err(e) = config.check_time_format() {
            warn!(error = %e, "falling back to the default time format");
            config.time_format = RecorderConfig::default().time_format;
        }
        Self {
            inner: Arc::new(Inner {
                config,
                sources: Mutex::new(Vec::new()),
                state: Mutex::new(LogState {
                    recording: false,
                    actions: Vec::new(),
                    next_step: 1,
                }),
                subscribers: Mutex::new(BTreeMap::new()),
                next_subscription: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.inner.config
    }

    /// Register an event source. Installed right away if recording.
    pub fn attach_source(&self, source: impl EventSource + 'static) {
        let mut source: Box<dyn EventSource> = Box::new(source);
        let mut sources = self.inner.sources.lock();
        let recording = self.inner.state.lock().recording;
        if recording {
            self.install(source.as_mut());
        }
        sources.push(source);
    }

    /// Attach a [`ChannelSource`] bounded by `channel_capacity` and return its sender
    pub fn channel(&self) -> anyhow::Result<Sender<DomEvent>> {
        let (source, tx) = ChannelSource::new(self.inner.config.channel_capacity)?;
        self.attach_source(source);
        Ok(tx)
    }

    /// Idle → Recording. Resumes numbering at `len + 1`.
    pub fn start_recording(&self) {
        let mut sources = self.inner.sources.lock();
        let next_step = {
            let mut state = self.inner.state.lock();
            if state.recording {
                trace!("start_recording while already recording");
                return;
            }
            state.recording = true;
            state.next_step = step_after(state.actions.len());
            state.next_step
        };
        for source in sources.iter_mut() {
            self.install(source.as_mut());
        }
        drop(sources);

        info!(next_step, "action recording started");
        self.notify();
    }

    /// Recording → Idle. Uninstalls every source.
    pub fn stop_recording(&self) {
        let mut sources = self.inner.sources.lock();
        let recorded = {
            let mut state = self.inner.state.lock();
            if !state.recording {
                trace!("stop_recording while idle");
                return;
            }
            state.recording = false;
            state.actions.len()
        };
        for source in sources.iter_mut() {
            source.uninstall();
        }
        drop(sources);

        info!(recorded, "action recording stopped");
        self.notify();
    }

    /// Empty the log and restart numbering at 1. The flag is untouched.
    pub fn clear_actions(&self) {
        let cleared = {
            let mut state = self.inner.state.lock();
            let cleared = state.actions.len();
            state.actions.clear();
            state.next_step = 1;
            cleared
        };
        info!(cleared, "recorded actions cleared");
        self.notify();
    }

    /// Append an action. No-op unless recording.
    pub fn add_action(&self, action: NewAction) {
        let (step_no, action_type) = {
            let mut state = self.inner.state.lock();
            if !state.recording {
                trace!(action = %action.action_type, "not recording, action dropped");
                return;
            }
            let step_no = state.next_step;
            state.next_step = step_no.saturating_add(1);
            let timestamp = self.timestamp();
            let action_type = action.action_type;
            state
                .actions
                .push(RecordedAction::new(action, step_no, timestamp));
            (step_no, action_type)
        };
        debug!(step_no, action = %action_type, "action recorded");
        self.notify();
    }

    /// Classify a DOM event and record it if it maps to an action
    pub fn record_event(&self, event: &DomEvent) {
        match classify(event, &self.inner.config) {
            Some(action) => self.add_action(action),
            None => trace!(kind = ?event.kind, page = %event.page, "event not recorded"),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.inner.state.lock().recording
    }

    /// Copy of the log; never the live container
    pub fn actions(&self) -> Vec<RecordedAction> {
        self.inner.state.lock().actions.clone()
    }

    pub fn action_count(&self) -> usize {
        self.inner.state.lock().actions.len()
    }

    pub fn snapshot(&self) -> RecordingSnapshot {
        let state = self.inner.state.lock();
        RecordingSnapshot {
            recording: state.recording,
            actions: state.actions.clone(),
        }
    }

    /// Register a callback invoked once after every mutation
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers.lock().insert(id, Arc::new(callback));
        Subscription(id)
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        self.inner.subscribers.lock().remove(&subscription.0);
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }

    /// Handle for event sources. Does not keep the recorder alive.
    pub fn sink(&self) -> EventSink {
        EventSink {
            recorder: Arc::downgrade(&self.inner),
        }
    }

    fn timestamp(&self) -> String {
        let now = chrono::Local::now();
        let mut ts = String::new();
        if write!(ts, "{}", now.format(&self.inner.config.time_format)).is_err() {
            return now.format("%H:%M:%S").to_string();
        }
        ts
    }

    fn install(&self, source: &mut dyn EventSource) {
        if let Err(e) = source.install(self.sink()) {
            warn!(error = %e, "event source failed to install, continuing without it");
        }
    }

    fn notify(&self) {
        // Snapshot so callbacks may (un)subscribe while we iterate.
        let subscribers: Vec<Subscriber> =
            self.inner.subscribers.lock().values().cloned().collect();
        for subscriber in subscribers {
            subscriber();
        }
    }
}

/// Step number following a log of `len` actions, saturating at `u32::MAX`
fn step_after(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX).saturating_add(1)
}

impl Default for ActionRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActionRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ActionRecorder")
            .field("recording", &state.recording)
            .field("actions", &state.actions.len())
            .field("next_step", &state.next_step)
            .finish()
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for source in self.sources.get_mut().iter_mut() {
            source.uninstall();
        }
    }
}

/// Where event sources deliver DOM events
#[derive(Clone)]
pub struct EventSink {
    recorder: Weak<Inner>,
}

impl EventSink {
    /// Classify and record. Does nothing once the recorder is gone.
    pub fn dispatch(&self, event: &DomEvent) {
        if let Some(inner) = self.recorder.upgrade() {
            ActionRecorder { inner }.record_event(event);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.recorder.strong_count() > 0
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("connected", &self.is_connected())
            .finish()
    }
}
