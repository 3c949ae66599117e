//! Event sources - where DOM events come from
//!
//! A source is installed while the recorder is recording and uninstalled when
//! it stops, the way document listeners are added and removed in a browser.

use crate::events::DomEvent;
use crate::recorder::EventSink;
use anyhow::Result;
pub use crossbeam_channel::{Receiver, Sender};
use crossbeam_channel::{bounded, RecvTimeoutError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

/// Anything that can observe interactions and report them to a sink
pub trait EventSource: Send {
    /// Start delivering events to `sink`. Installing again replaces the sink.
    fn install(&mut self, sink: EventSink) -> Result<()>;

    /// Stop delivering events. No-op if not installed.
    fn uninstall(&mut self);
}

// ============================================================================
// Document
// ============================================================================

/// In-process document: events dispatched on it reach the recorder only while
/// its listener is installed
#[derive(Clone, Default)]
pub struct Document {
    listener: Arc<Mutex<Option<EventSink>>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// The source to attach to a recorder
    pub fn source(&self) -> DocumentSource {
        DocumentSource {
            listener: self.listener.clone(),
        }
    }

    /// Dispatch an event synchronously. Returns whether anything was listening.
    pub fn dispatch(&self, event: &DomEvent) -> bool {
        // Clone out so the sink runs without our lock held.
        let sink = self.listener.lock().clone();
        match sink {
            Some(sink) => {
                sink.dispatch(event);
                true
            }
            None => {
                trace!(kind = ?event.kind, "no listener installed");
                false
            }
        }
    }

    pub fn is_observed(&self) -> bool {
        self.listener.lock().is_some()
    }
}

pub struct DocumentSource {
    listener: Arc<Mutex<Option<EventSink>>>,
}

impl EventSource for DocumentSource {
    fn install(&mut self, sink: EventSink) -> Result<()> {
        *self.listener.lock() = Some(sink);
        Ok(())
    }

    fn uninstall(&mut self) {
        self.listener.lock().take();
    }
}

// ============================================================================
// Channel source
// ============================================================================

/// Producers on any thread send events; one pump thread, alive as long as the
/// source, forwards them while installed and discards them otherwise.
///
/// Interactions sent while the recorder is idle are dropped, never replayed
/// into the next session, and producers are never blocked by an idle recorder.
/// Uninstalling only clears the sink, so it never waits on the pump.
pub struct ChannelSource {
    listener: Arc<Mutex<Option<EventSink>>>,
    discarded: Arc<AtomicUsize>,
    stop: Arc<AtomicBool>,
    pump: Option<thread::JoinHandle<()>>,
}

impl ChannelSource {
    /// Create the source, start its pump and return the sender producers use
    pub fn new(capacity: usize) -> Result<(Self, Sender<DomEvent>)> {
        let (tx, rx) = bounded(capacity.max(1));
        let listener = Arc::new(Mutex::new(None));
        let discarded = Arc::new(AtomicUsize::new(0));
        let stop = Arc::new(AtomicBool::new(false));

        let pump = Pump {
            rx,
            listener: listener.clone(),
            discarded: discarded.clone(),
            stop: stop.clone(),
        };
        let handle = thread::Builder::new()
            .name("steplog-pump".to_string())
            .spawn(move || pump.run())?;

        let source = Self {
            listener,
            discarded,
            stop,
            pump: Some(handle),
        };
        Ok((source, tx))
    }

    pub fn is_installed(&self) -> bool {
        self.listener.lock().is_some()
    }

    /// Events dropped because nothing was installed when they arrived
    pub fn discarded(&self) -> usize {
        self.discarded.load(Ordering::SeqCst)
    }
}

impl EventSource for ChannelSource {
    fn install(&mut self, sink: EventSink) -> Result<()> {
        *self.listener.lock() = Some(sink);
        Ok(())
    }

    fn uninstall(&mut self) {
        self.listener.lock().take();
    }
}

impl Drop for ChannelSource {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        let Some(pump) = self.pump.take() else {
            return;
        };
        // The last recorder handle may be released by the pump itself.
        if pump.thread().id() != thread::current().id() {
            let _ = pump.join();
        }
    }
}

struct Pump {
    rx: Receiver<DomEvent>,
    listener: Arc<Mutex<Option<EventSink>>>,
    discarded: Arc<AtomicUsize>,
    stop: Arc<AtomicBool>,
}

impl Pump {
    fn run(self) {
        debug!("event pump started");
        while !self.stop.load(Ordering::Relaxed) {
            match self.rx.recv_timeout(Duration::from_millis(50)) {
                Ok(event) => {
                    let sink = self.listener.lock().clone();
                    match sink {
                        Some(sink) => sink.dispatch(&event),
                        None => {
                            self.discarded.fetch_add(1, Ordering::SeqCst);
                            trace!(kind = ?event.kind, "not installed, event discarded");
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!("event pump stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ActionType;
    use crate::recorder::ActionRecorder;
    use std::time::Instant;
    use steplog_core::Element;

    fn wait_until(done: impl Fn() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < Duration::from_secs(5) {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }

    fn wait_for(recorder: &ActionRecorder, count: usize) -> bool {
        wait_until(|| recorder.action_count() >= count)
    }

    #[test]
    fn document_only_delivers_while_recording() {
        let recorder = ActionRecorder::new();
        let document = Document::new();
        recorder.attach_source(document.source());

        let click = DomEvent::click(Element::new("button").with_id("go"), "/links");
        assert!(!document.dispatch(&click));

        recorder.start_recording();
        assert!(document.is_observed());
        assert!(document.dispatch(&click));

        recorder.stop_recording();
        assert!(!document.is_observed());
        assert!(!document.dispatch(&click));

        assert_eq!(recorder.action_count(), 1);
        assert_eq!(recorder.actions()[0].target_element(), "#go");
    }

    #[test]
    fn source_attached_mid_recording_is_installed() {
        let recorder = ActionRecorder::new();
        recorder.start_recording();
        let document = Document::new();
        recorder.attach_source(document.source());
        assert!(document.is_observed());
    }

    #[test]
    fn channel_source_forwards_from_other_threads() {
        let recorder = ActionRecorder::new();
        let (source, tx) = ChannelSource::new(16).unwrap();
        recorder.attach_source(source);
        recorder.start_recording();

        let producer = thread::spawn(move || {
            for id in ["a", "b", "c"] {
                let target = Element::new("li").with_id(id);
                tx.send(DomEvent::new(crate::events::DomEventKind::DragStart, target, "/drag"))
                    .unwrap();
            }
        });
        producer.join().unwrap();

        assert!(wait_for(&recorder, 3));
        recorder.stop_recording();

        let actions = recorder.actions();
        let targets: Vec<_> = actions.iter().map(|a| a.target_element()).collect();
        assert_eq!(targets, vec!["#a", "#b", "#c"]);
        assert!(actions.iter().all(|a| a.action_type() == ActionType::DragStart));
    }

    #[test]
    fn recorder_channel_uses_configured_capacity() {
        let recorder = ActionRecorder::with_config(crate::config::RecorderConfig {
            channel_capacity: 2,
            ..Default::default()
        });
        let tx = recorder.channel().unwrap();
        assert_eq!(tx.capacity(), Some(2));

        recorder.start_recording();
        tx.send(DomEvent::click(Element::new("a").with_id("home"), "/")).unwrap();
        assert!(wait_for(&recorder, 1));
        recorder.stop_recording();
        assert_eq!(recorder.actions()[0].target_element(), "#home");
    }

    #[test]
    fn idle_events_are_not_carried_into_next_session() {
        let recorder = ActionRecorder::new();
        let (mut source, tx) = ChannelSource::new(8).unwrap();
        let click = |id: &str| DomEvent::click(Element::new("button").with_id(id), "/forms");

        recorder.start_recording();
        source.install(recorder.sink()).unwrap();
        tx.send(click("first")).unwrap();
        assert!(wait_for(&recorder, 1));

        source.uninstall();
        recorder.stop_recording();
        tx.send(click("while-idle")).unwrap();
        assert!(wait_until(|| source.discarded() == 1));

        recorder.start_recording();
        source.install(recorder.sink()).unwrap();
        tx.send(click("live")).unwrap();
        assert!(wait_for(&recorder, 2));
        recorder.stop_recording();

        let targets: Vec<String> = recorder.actions().iter().map(|a| a.target_element().to_string()).collect();
        assert_eq!(targets, vec!["#first", "#live"]);
    }

    #[test]
    fn producers_are_not_blocked_while_uninstalled() {
        let (source, tx) = ChannelSource::new(1).unwrap();
        let done = Arc::new(AtomicBool::new(false));

        let d = done.clone();
        let producer = thread::spawn(move || {
            for id in ["a", "b", "c"] {
                tx.send(DomEvent::click(Element::new("li").with_id(id), "/")).unwrap();
            }
            d.store(true, Ordering::SeqCst);
        });

        assert!(wait_until(|| done.load(Ordering::SeqCst)));
        producer.join().unwrap();
        assert!(wait_until(|| source.discarded() == 3));
        assert!(!source.is_installed());
    }

    #[test]
    fn subscriber_on_pump_may_stop_recording() {
        let recorder = ActionRecorder::new();
        let tx = recorder.channel().unwrap();
        let r = recorder.clone();
        let sub = recorder.subscribe(move || {
            if r.action_count() >= 1 {
                r.stop_recording();
            }
        });

        recorder.start_recording();
        for id in ["one", "two"] {
            tx.send(DomEvent::click(Element::new("a").with_id(id), "/")).unwrap();
        }
        assert!(wait_until(|| !recorder.is_recording()));
        recorder.unsubscribe(sub);
        // Attaching from this thread must not wait on the pump either.
        recorder.attach_source(Document::new().source());
        assert_eq!(recorder.action_count(), 1);
    }

    #[test]
    fn uninstall_only_clears_the_sink() {
        let (mut source, _tx) = ChannelSource::new(4).unwrap();
        let recorder = ActionRecorder::new();
        source.install(recorder.sink()).unwrap();
        assert!(source.is_installed());
        source.uninstall();
        assert!(!source.is_installed());
        source.uninstall();
    }
}
