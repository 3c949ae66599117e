//! Event classification: which DOM events become which actions

use crate::config::RecorderConfig;
use crate::events::{ActionType, DomEvent, DomEventKind, NewAction};
use steplog_core::locator;

/// Map a DOM event to an action, or `None` if it is not recorded
pub fn classify(event: &DomEvent, config: &RecorderConfig) -> Option<NewAction> {
    let target = &event.target;

    let action_type = match event.kind {
        DomEventKind::Click => {
            if config.ignore_within.iter().any(|s| target.closest(s).is_some()) {
                return None;
            }
            ActionType::Click
        }
        DomEventKind::Input => ActionType::Type,
        DomEventKind::Change => {
            if !config.selection_targets.iter().any(|s| s.matches(target)) {
                return None;
            }
            ActionType::Select
        }
        DomEventKind::ContextMenu => ActionType::RightClick,
        DomEventKind::DblClick => ActionType::DoubleClick,
        DomEventKind::DragStart => ActionType::DragStart,
        DomEventKind::Drop => ActionType::Drop,
        DomEventKind::Other => return None,
    };

    let value = if action_type.captures_value() {
        target.value.clone().unwrap_or_default()
    } else {
        String::new()
    };

    Some(NewAction {
        action_type,
        target_element: locator::describe(target),
        value,
        page: event.page.clone(),
    })
}
