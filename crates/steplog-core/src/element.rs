//! DOM element representation
//!
//! An owned snapshot of the element an event was dispatched on, with its
//! ancestor chain. Events carry their own copy, so identifying attributes are
//! always read as they were at dispatch time.

use crate::error::{Error, Result};
use crate::selector::{Attribute, Selector};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Raw `class` attribute, space separated
    #[serde(default, rename = "class", skip_serializing_if = "String::is_empty")]
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Current value for form controls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<Element>>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            class_name: String::new(),
            role: None,
            value: None,
            parent: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Append one or more space separated class names
    pub fn with_class(mut self, class: &str) -> Self {
        if !self.class_name.is_empty() {
            self.class_name.push(' ');
        }
        self.class_name.push_str(class);
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Place this element inside `parent`
    pub fn within(mut self, parent: Element) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.class_name.split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// The element itself followed by its ancestors, nearest first
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// Nearest element (self included) matching the selector
    pub fn closest(&self, selector: &Selector) -> Option<&Element> {
        self.ancestors().find(|e| selector.matches(e))
    }

    /// Parse the compact notation used by scripts and the interactive host:
    ///
    /// `input#email.form-control in form#signup in div.card=a@b.com`
    ///
    /// The first compound selector describes the element and each ` in `
    /// adds an ancestor. An optional trailing `=value` sets its value; the
    /// value is taken verbatim, ` in ` included.
    pub fn parse_spec(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(Error::selector_invalid(spec, "empty element"));
        }

        let (chain, value) = split_value(spec);
        let mut parts = chain.trim_end().split(" in ").map(str::trim);
        let target = parts.next().unwrap_or_default();
        let mut element = Self::from_selector(&Selector::parse(target)?);
        element.value = value.map(str::to_string);

        let ancestors = parts
            .map(|p| Selector::parse(p).map(|s| Self::from_selector(&s)))
            .collect::<Result<Vec<_>>>()?;

        // Build the chain from the outermost ancestor inwards.
        let parent = ancestors
            .into_iter()
            .rev()
            .reduce(|outer, inner| inner.within(outer));
        element.parent = parent.map(Box::new);

        Ok(element)
    }

    fn from_selector(selector: &Selector) -> Self {
        let mut element = Self::new("div");
        for c in &selector.conditions {
            match c.attr {
                Attribute::Tag => element.tag = c.value.clone(),
                Attribute::Id => element.id = Some(c.value.clone()),
                Attribute::Class => element = element.with_class(&c.value),
                Attribute::Role => element.role = Some(c.value.clone()),
            }
        }
        element
    }
}

/// Split `selector=value`, ignoring any `=` inside `[...]`
fn split_value(s: &str) -> (&str, Option<&str>) {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '=' if depth == 0 => return (&s[..i], Some(&s[i + 1..])),
            _ => {}
        }
    }
    (s, None)
}

pub struct Ancestors<'a> {
    next: Option<&'a Element>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent.as_deref();
        Some(current)
    }
}
