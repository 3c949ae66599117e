//! steplog-core - DOM primitives for the action recorder
//!
//! Element snapshots, compound selectors, short locators and the structured
//! error type shared by the recorder and its hosts.

pub mod element;
pub mod error;
pub mod locator;
pub mod selector;

pub use element::Element;
pub use error::{Error, ErrorCode, Result};
pub use selector::Selector;

pub mod prelude {
    pub use crate::element::Element;
    pub use crate::error::{Error, ErrorCode, Result};
    pub use crate::locator::describe;
    pub use crate::selector::Selector;
}
