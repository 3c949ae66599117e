//! Locator - short human-readable descriptors for elements
//!
//! Not a full selector: `#id`, else the first class, else the tag name.

use crate::element::Element;

pub fn describe(element: &Element) -> String {
    if let Some(id) = element.id.as_deref().filter(|id| !id.is_empty()) {
        return format!("#{}", id);
    }
    if let Some(class) = element.classes().next() {
        return format!(".{}", class);
    }
    element.tag.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_wins() {
        let el = Element::new("BUTTON").with_id("submit-button").with_class("btn primary");
        assert_eq!(describe(&el), "#submit-button");
    }

    #[test]
    fn first_class_next() {
        let el = Element::new("div").with_class("  draggable item");
        assert_eq!(describe(&el), ".draggable");
    }

    #[test]
    fn empty_id_falls_through() {
        let el = Element::new("SPAN").with_id("");
        assert_eq!(describe(&el), "span");
    }
}
