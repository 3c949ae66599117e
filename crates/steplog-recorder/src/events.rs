//! Recorded actions and the DOM events they are derived from
//!
//! Actions serialize in camelCase so exported logs keep the field names the
//! review table uses (`stepNo`, `actionType`, `targetElement`).

use serde::{Deserialize, Serialize};
use steplog_core::Element;

/// Fixed action taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    Click,
    Type,
    Select,
    RightClick,
    DoubleClick,
    DragStart,
    Drop,
}

impl ActionType {
    pub const ALL: [ActionType; 7] = [
        ActionType::Click,
        ActionType::Type,
        ActionType::Select,
        ActionType::RightClick,
        ActionType::DoubleClick,
        ActionType::DragStart,
        ActionType::Drop,
    ];

    /// Label shown in reports
    pub fn label(self) -> &'static str {
        match self {
            ActionType::Click => "Click",
            ActionType::Type => "Type",
            ActionType::Select => "Select",
            ActionType::RightClick => "Right Click",
            ActionType::DoubleClick => "Double Click",
            ActionType::DragStart => "Drag Start",
            ActionType::Drop => "Drop",
        }
    }

    /// Whether the action carries the target's value
    pub fn captures_value(self) -> bool {
        matches!(self, ActionType::Type | ActionType::Select)
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Caller-supplied part of an action; the recorder fills in the rest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAction {
    pub action_type: ActionType,
    pub target_element: String,
    #[serde(default)]
    pub value: String,
    pub page: String,
}

impl NewAction {
    pub fn new(action_type: ActionType, target_element: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            action_type,
            target_element: target_element.into(),
            value: String::new(),
            page: page.into(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

/// One captured interaction. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedAction {
    id: String,
    step_no: u32,
    action_type: ActionType,
    target_element: String,
    value: String,
    timestamp: String,
    page: String,
}

impl RecordedAction {
    pub(crate) fn new(action: NewAction, step_no: u32, timestamp: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            step_no,
            action_type: action.action_type,
            target_element: action.target_element,
            value: action.value,
            timestamp,
            page: action.page,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn step_no(&self) -> u32 {
        self.step_no
    }

    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    pub fn target_element(&self) -> &str {
        &self.target_element
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn page(&self) -> &str {
        &self.page
    }
}

/// DOM event kinds, named as the browser names them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomEventKind {
    Click,
    Input,
    Change,
    ContextMenu,
    DblClick,
    DragStart,
    Drop,
    /// Anything else (focus, keydown, ...). Never recorded.
    #[serde(other)]
    Other,
}

/// A dispatched DOM event: what happened, on which element, on which page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomEvent {
    #[serde(rename = "type")]
    pub kind: DomEventKind,
    pub target: Element,
    #[serde(default)]
    pub page: String,
}

impl DomEvent {
    pub fn new(kind: DomEventKind, target: Element, page: impl Into<String>) -> Self {
        Self {
            kind,
            target,
            page: page.into(),
        }
    }

    pub fn click(target: Element, page: impl Into<String>) -> Self {
        Self::new(DomEventKind::Click, target, page)
    }

    pub fn input(target: Element, page: impl Into<String>) -> Self {
        Self::new(DomEventKind::Input, target, page)
    }

    pub fn change(target: Element, page: impl Into<String>) -> Self {
        Self::new(DomEventKind::Change, target, page)
    }
}
