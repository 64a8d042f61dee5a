//! Thin view layer over the page's existing DOM.
//!
//! Components are written against [`ViewNode`] so their state machines can be
//! exercised without a browser; [`DomNode`] is the real implementation.

use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlElement};

pub trait ViewNode: Clone + PartialEq {
    fn find(&self, selector: &str) -> Option<Self>;
    fn find_all(&self, selector: &str) -> Vec<Self>;
    fn set_attribute(&self, name: &str, value: &str);
    fn add_class(&self, name: &str);
    fn remove_class(&self, name: &str);
    fn has_class(&self, name: &str) -> bool;
    fn attribute(&self, name: &str) -> Option<String>;
    fn set_style(&self, property: &str, value: &str);
}

#[derive(Clone, PartialEq, Debug)]
pub struct DomNode(Element);

impl DomNode {
    pub fn new(element: Element) -> Self {
        Self(element)
    }

    pub fn element(&self) -> &Element {
        &self.0
    }

    pub fn html(&self) -> Option<&HtmlElement> {
        self.0.dyn_ref::<HtmlElement>()
    }

    pub fn target(&self) -> &EventTarget {
        self.0.as_ref()
    }

    pub fn focus(&self) {
        if let Some(el) = self.html() {
            let _ = el.focus();
        }
    }

    /// True when any part of the node's box is inside the viewport vertically.
    pub fn in_viewport(&self) -> bool {
        let Some(window) = web_sys::window() else {
            return false;
        };
        let viewport = window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0);
        let rect = self.0.get_bounding_client_rect();
        intersects_viewport(rect.top(), rect.bottom(), viewport)
    }

    pub fn contains(&self, target: Option<&EventTarget>) -> bool {
        let node = target.and_then(|t| t.dyn_ref::<web_sys::Node>());
        self.0.contains(node)
    }
}

pub fn intersects_viewport(top: f64, bottom: f64, viewport_height: f64) -> bool {
    top < viewport_height && bottom > 0.0
}

fn log_failure(op: &str, name: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        debug!("{} {} failed: {:?}", op, name, e);
    }
}

impl ViewNode for DomNode {
    fn find(&self, selector: &str) -> Option<Self> {
        match self.0.query_selector(selector) {
            Ok(found) => found.map(DomNode),
            Err(e) => {
                warn!("Invalid selector: {} ({:?})", selector, e);
                None
            }
        }
    }

    fn find_all(&self, selector: &str) -> Vec<Self> {
        match self.0.query_selector_all(selector) {
            Ok(list) => collect_elements(&list),
            Err(e) => {
                warn!("Invalid selector: {} ({:?})", selector, e);
                Vec::new()
            }
        }
    }

    fn set_attribute(&self, name: &str, value: &str) {
        log_failure("set_attribute", name, self.0.set_attribute(name, value));
    }

    fn add_class(&self, name: &str) {
        log_failure("add_class", name, self.0.class_list().add_1(name));
    }

    fn remove_class(&self, name: &str) {
        log_failure("remove_class", name, self.0.class_list().remove_1(name));
    }

    fn has_class(&self, name: &str) -> bool {
        self.0.class_list().contains(name)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn set_style(&self, property: &str, value: &str) {
        match self.html() {
            Some(el) => log_failure("set_style", property, el.style().set_property(property, value)),
            None => debug!("set_style {} on non-HTML element ignored", property),
        }
    }
}

fn collect_elements(list: &web_sys::NodeList) -> Vec<DomNode> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .map(DomNode)
        .collect()
}

pub fn document() -> Option<Document> {
    web_sys::window().and_then(|w| w.document())
}

/// Document-level query that logs instead of failing on a bad selector.
pub fn safe_query(selector: &str) -> Option<DomNode> {
    let document = document()?;
    match document.query_selector(selector) {
        Ok(found) => found.map(DomNode),
        Err(e) => {
            warn!("Invalid selector: {} ({:?})", selector, e);
            None
        }
    }
}

pub fn safe_query_all(selector: &str) -> Vec<DomNode> {
    let Some(document) = document() else {
        return Vec::new();
    };
    match document.query_selector_all(selector) {
        Ok(list) => collect_elements(&list),
        Err(e) => {
            warn!("Invalid selector: {} ({:?})", selector, e);
            Vec::new()
        }
    }
}

/// A registered DOM listener. Dropping it removes the listener and frees the
/// closure.
pub struct EventListener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    pub fn new<F>(target: &EventTarget, event: &'static str, handler: F) -> Self
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        log_failure(
            "add_event_listener",
            event,
            target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref()),
        );
        Self { target: target.clone(), event, callback }
    }

    /// Registers with `{ passive: true }` so scrolling is never blocked.
    pub fn passive<F>(target: &EventTarget, event: &'static str, handler: F) -> Self
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        log_failure(
            "add_event_listener",
            event,
            target.add_event_listener_with_callback_and_add_event_listener_options(
                event,
                callback.as_ref().unchecked_ref(),
                &options,
            ),
        );
        Self { target: target.clone(), event, callback }
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        log_failure(
            "remove_event_listener",
            self.event,
            self.target
                .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref()),
        );
    }
}

impl std::fmt::Debug for EventListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventListener").field("event", &self.event).finish()
    }
}

pub fn window_target() -> Option<EventTarget> {
    web_sys::window().map(Into::into)
}

pub fn document_target() -> Option<EventTarget> {
    document().map(Into::into)
}

/// Keyboard shortcuts must not fire while the user is typing.
pub fn is_editable_target(event: &Event) -> bool {
    let Some(element) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return false;
    };
    let tag = element.tag_name().to_ascii_lowercase();
    matches!(tag.as_str(), "input" | "textarea" | "select")
        || element
            .dyn_ref::<HtmlElement>()
            .map_or(false, |el| el.is_content_editable())
}


#[cfg(test)]
mod tests {
    use super::testing::MockNode;
    use super::*;

    #[test]
    fn viewport_intersection() {
        assert!(intersects_viewport(-100.0, 50.0, 800.0));
        assert!(intersects_viewport(700.0, 1200.0, 800.0));
        assert!(!intersects_viewport(800.0, 1200.0, 800.0));
        assert!(!intersects_viewport(-300.0, 0.0, 800.0));
    }

    #[test]
    fn mock_finds_descendants_by_class() {
        let root = MockNode::default();
        let outer = root.append(MockNode::with_class("panel"));
        let inner = outer.append(MockNode::with_class("panel"));
        outer.append(MockNode::with_class("other"));
        let link = inner.append(MockNode::with_tag("a"));

        let found = root.find_all(".panel");
        assert_eq!(found.len(), 2);
        assert!(found[0] == outer);
        assert!(found[1] == inner);
        assert!(root.find("div > .panel").is_none());
        assert!(root.find("a") == Some(link));
    }
}
