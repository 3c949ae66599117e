//! Integration tests for the recorder contract: numbering, idle no-ops,
//! clearing, idempotent start and subscriber notification.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use steplog_core::Element;
use steplog_recorder::prelude::*;

fn action(kind: ActionType, target: &str, value: &str, page: &str) -> NewAction {
    NewAction::new(kind, target, page).with_value(value)
}

fn steps(recorder: &ActionRecorder) -> Vec<u32> {
    recorder.actions().iter().map(|a| a.step_no()).collect()
}

fn counting_subscriber(recorder: &ActionRecorder) -> (Arc<AtomicUsize>, Subscription) {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    let sub = recorder.subscribe(move || {
        c.fetch_add(1, Ordering::SeqCst);
    });
    (calls, sub)
}

#[test]
fn forms_scenario() {
    let recorder = ActionRecorder::new();
    recorder.clear_actions();
    recorder.start_recording();
    recorder.add_action(action(ActionType::Click, "#submit-button", "", "/forms"));
    recorder.add_action(action(ActionType::Type, "#email-input", "a@b.com", "/forms"));
    recorder.stop_recording();

    let actions = recorder.actions();
    assert_eq!(actions.len(), 2);

    assert_eq!(actions[0].step_no(), 1);
    assert_eq!(actions[0].action_type(), ActionType::Click);
    assert_eq!(actions[0].target_element(), "#submit-button");
    assert_eq!(actions[0].value(), "");
    assert_eq!(actions[0].page(), "/forms");

    assert_eq!(actions[1].step_no(), 2);
    assert_eq!(actions[1].action_type(), ActionType::Type);
    assert_eq!(actions[1].target_element(), "#email-input");
    assert_eq!(actions[1].value(), "a@b.com");
    assert_eq!(actions[1].page(), "/forms");

    assert!(actions.iter().all(|a| !a.timestamp().is_empty()));
    assert_ne!(actions[0].id(), actions[1].id());
}

#[test]
fn add_without_start_leaves_log_empty() {
    let recorder = ActionRecorder::new();
    recorder.add_action(action(ActionType::Click, "#x", "", "/"));
    assert!(recorder.actions().is_empty());
}

#[test]
fn idle_adds_never_change_length() {
    let recorder = ActionRecorder::new();
    recorder.start_recording();
    recorder.add_action(action(ActionType::Click, "#a", "", "/"));
    recorder.stop_recording();

    for kind in ActionType::ALL {
        recorder.add_action(action(kind, "#idle", "", "/"));
        assert_eq!(recorder.actions().len(), 1);
    }
}

#[test]
fn numbering_is_strictly_increasing_in_call_order() {
    let recorder = ActionRecorder::new();
    recorder.start_recording();
    let targets: Vec<String> = (0..25).map(|i| format!("#item-{}", i)).collect();
    for t in &targets {
        recorder.add_action(action(ActionType::Click, t, "", "/tables"));
    }

    let actions = recorder.actions();
    let recorded: Vec<&str> = actions.iter().map(|a| a.target_element()).collect();
    assert_eq!(recorded, targets.iter().map(String::as_str).collect::<Vec<_>>());
    assert_eq!(steps(&recorder), (1..=25).collect::<Vec<u32>>());
}

#[test]
fn restart_without_clear_continues_numbering() {
    let recorder = ActionRecorder::new();
    recorder.start_recording();
    recorder.add_action(action(ActionType::Click, "#first", "", "/"));
    recorder.stop_recording();
    recorder.start_recording();
    recorder.add_action(action(ActionType::Click, "#second", "", "/"));

    assert_eq!(steps(&recorder), vec![1, 2]);
}

#[test]
fn clear_resets_numbering_from_any_state() {
    let recorder = ActionRecorder::new();
    recorder.start_recording();
    for _ in 0..3 {
        recorder.add_action(action(ActionType::DoubleClick, "#cell", "", "/tables"));
    }
    recorder.stop_recording();

    recorder.clear_actions();
    assert_eq!(recorder.actions().len(), 0);

    recorder.start_recording();
    recorder.add_action(action(ActionType::Drop, "#bin", "", "/drag-drop"));
    assert_eq!(steps(&recorder), vec![1]);
}

#[test]
fn actions_returns_a_snapshot() {
    let recorder = ActionRecorder::new();
    recorder.start_recording();
    recorder.add_action(action(ActionType::Click, "#a", "", "/"));

    let mut snapshot = recorder.actions();
    snapshot.clear();
    assert_eq!(recorder.actions().len(), 1);
}

#[test]
fn double_start_is_single_start() {
    let recorder = ActionRecorder::new();
    let document = Document::new();
    recorder.attach_source(document.source());

    recorder.start_recording();
    let len_before = recorder.actions().len();
    recorder.start_recording();
    assert_eq!(recorder.actions().len(), len_before);

    document.dispatch(&DomEvent::click(Element::new("button").with_id("once"), "/"));
    assert_eq!(recorder.actions().len(), 1);
}

#[test]
fn one_notification_per_mutation() {
    let recorder = ActionRecorder::new();
    let (calls, sub) = counting_subscriber(&recorder);

    recorder.start_recording();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    recorder.add_action(action(ActionType::Click, "#a", "", "/"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    recorder.stop_recording();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    recorder.clear_actions();
    assert_eq!(calls.load(Ordering::SeqCst), 4);

    recorder.unsubscribe(sub);
    recorder.start_recording();
    recorder.add_action(action(ActionType::Click, "#b", "", "/"));
    recorder.clear_actions();
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn document_events_are_classified() {
    let recorder = ActionRecorder::new();
    let document = Document::new();
    recorder.attach_source(document.source());
    recorder.start_recording();

    let controls = Element::new("div").with_class("flex gap-4 action-recorder-controls");
    let events = [
        DomEvent::click(Element::new("button").with_id("stop-recording-btn").within(controls), "/recorded-actions"),
        DomEvent::input(Element::new("input").with_id("username").with_value("tomsmith"), "/login"),
        DomEvent::change(Element::new("input").with_id("remember").with_value("on"), "/login"),
        DomEvent::change(Element::new("select").with_class("form-select").with_value("2"), "/dropdowns"),
        DomEvent::new(DomEventKind::ContextMenu, Element::new("div").with_id("hot-spot"), "/advanced"),
        DomEvent::new(DomEventKind::DragStart, Element::new("div").with_id("column-a"), "/drag-drop"),
        DomEvent::new(DomEventKind::Drop, Element::new("div").with_id("column-b"), "/drag-drop"),
    ];
    for event in &events {
        document.dispatch(event);
    }

    let summary: Vec<(u32, ActionType, String, String)> = recorder
        .actions()
        .iter()
        .map(|a| (a.step_no(), a.action_type(), a.target_element().to_string(), a.value().to_string()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, ActionType::Type, "#username".to_string(), "tomsmith".to_string()),
            (2, ActionType::Select, ".form-select".to_string(), "2".to_string()),
            (3, ActionType::RightClick, "#hot-spot".to_string(), String::new()),
            (4, ActionType::DragStart, "#column-a".to_string(), String::new()),
            (5, ActionType::Drop, "#column-b".to_string(), String::new()),
        ]
    );
}

#[test]
fn target_descriptor_is_computed_per_event() {
    let recorder = ActionRecorder::new();
    let document = Document::new();
    recorder.attach_source(document.source());
    recorder.start_recording();

    // Same node, attributes changed between events.
    let node = Element::new("button").with_class("btn");
    document.dispatch(&DomEvent::click(node.clone(), "/dynamic"));
    document.dispatch(&DomEvent::click(node.with_id("enabled-button"), "/dynamic"));

    let targets: Vec<String> = recorder.actions().iter().map(|a| a.target_element().to_string()).collect();
    assert_eq!(targets, vec![".btn", "#enabled-button"]);
}

#[test]
fn report_from_live_recorder() {
    let recorder = ActionRecorder::new();
    assert!(Report::from_snapshot(recorder.snapshot()).is_err());

    recorder.start_recording();
    recorder.add_action(action(ActionType::Select, "#country", "fr", "/dropdowns"));
    let report = Report::from_snapshot(recorder.snapshot()).unwrap();
    assert_eq!(report.status(), "Active");
    assert!(report.to_markdown().contains("| 1 | Select | #country | fr | /dropdowns |"));
}
