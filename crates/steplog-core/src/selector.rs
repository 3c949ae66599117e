//! Selector parsing for matching DOM elements
//!
//! Syntax (one compound selector, no combinators):
//!   select                       - tag name (case-insensitive)
//!   #submit-button               - id
//!   .action-recorder-controls    - class
//!   [role=listbox]               - ARIA role
//!   div.card.action-bar#toolbar  - compound, every part must match

use crate::element::Element;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Selector {
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub attr: Attribute,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Tag,
    Id,
    Class,
    Role,
}

impl Selector {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::selector_invalid(s, "empty selector"));
        }
        if s.contains(char::is_whitespace) {
            return Err(Error::selector_invalid(s, "combinators are not supported")
                .with_suggestions(vec![
                    "Use a single compound selector such as div.toolbar".to_string(),
                ]));
        }

        let mut conditions = Vec::new();
        let mut rest = s;

        let tag_len = ident_len(rest);
        if tag_len > 0 {
            conditions.push(Condition::new(Attribute::Tag, &rest[..tag_len]));
            rest = &rest[tag_len..];
        }

        while let Some(c) = rest.chars().next() {
            match c {
                '#' | '.' => {
                    let len = ident_len(&rest[1..]);
                    if len == 0 {
                        return Err(Error::selector_invalid(
                            s,
                            &format!("expected a name after '{}'", c),
                        ));
                    }
                    let attr = if c == '#' { Attribute::Id } else { Attribute::Class };
                    conditions.push(Condition::new(attr, &rest[1..=len]));
                    rest = &rest[len + 1..];
                }
                '[' => {
                    let end = rest
                        .find(']')
                        .ok_or_else(|| Error::selector_invalid(s, "unterminated '['"))?;
                    conditions.push(Condition::parse_attribute(s, &rest[1..end])?);
                    rest = &rest[end + 1..];
                }
                _ => {
                    return Err(Error::selector_invalid(
                        s,
                        &format!("unexpected character '{}'", c),
                    ))
                }
            }
        }

        Ok(Self { conditions })
    }

    pub fn tag(tag: &str) -> Self {
        Self {
            conditions: vec![Condition::new(Attribute::Tag, tag)],
        }
    }

    pub fn id(id: &str) -> Self {
        Self {
            conditions: vec![Condition::new(Attribute::Id, id)],
        }
    }

    pub fn class(class: &str) -> Self {
        Self {
            conditions: vec![Condition::new(Attribute::Class, class)],
        }
    }

    pub fn role(role: &str) -> Self {
        Self {
            conditions: vec![Condition::new(Attribute::Role, role)],
        }
    }

    pub fn and(mut self, other: Selector) -> Self {
        self.conditions.extend(other.conditions);
        self
    }

    /// True if the element itself satisfies every condition
    pub fn matches(&self, element: &Element) -> bool {
        self.conditions.iter().all(|c| c.matches(element))
    }
}

impl Condition {
    pub fn new(attr: Attribute, value: &str) -> Self {
        Self {
            attr,
            value: value.to_string(),
        }
    }

    fn parse_attribute(selector: &str, body: &str) -> Result<Self> {
        let (name, value) = body.split_once('=').ok_or_else(|| {
            Error::selector_invalid(selector, "expected format '[role=value]'")
        })?;
        if name.trim() != "role" {
            return Err(Error::selector_invalid(
                selector,
                &format!("unsupported attribute '{}'", name.trim()),
            ));
        }
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        if value.is_empty() {
            return Err(Error::selector_invalid(selector, "empty role value"));
        }
        Ok(Self::new(Attribute::Role, value))
    }

    pub fn matches(&self, element: &Element) -> bool {
        match self.attr {
            Attribute::Tag => element.tag.eq_ignore_ascii_case(&self.value),
            Attribute::Id => element.id.as_deref() == Some(self.value.as_str()),
            Attribute::Class => element.has_class(&self.value),
            Attribute::Role => element
                .role
                .as_deref()
                .is_some_and(|r| r.eq_ignore_ascii_case(&self.value)),
        }
    }
}

fn ident_len(s: &str) -> usize {
    s.find(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(s.len())
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for c in &self.conditions {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.attr {
            Attribute::Tag => write!(f, "{}", self.value),
            Attribute::Id => write!(f, "#{}", self.value),
            Attribute::Class => write!(f, ".{}", self.value),
            Attribute::Role => write!(f, "[role={}]", self.value),
        }
    }
}

impl std::str::FromStr for Selector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Selector {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Selector> for String {
    fn from(s: Selector) -> Self {
        s.to_string()
    }
}
