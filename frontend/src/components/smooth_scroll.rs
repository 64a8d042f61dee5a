use gloo_timers::callback::Timeout;
use log::debug;
use wasm_bindgen::JsValue;
use web_sys::{Element, Event, ScrollBehavior, ScrollToOptions};

use crate::view::{self, safe_query_all, EventListener, ViewNode};

const HEADER_OFFSET: f64 = 80.0;
const INITIAL_HASH_DELAY_MS: u32 = 100;

/// Element id named by an in-page link, e.g. `#contact` or `#our%20work`.
pub fn anchor_fragment(href: &str) -> Option<String> {
    let fragment = href.strip_prefix('#')?;
    if fragment.is_empty() {
        return None;
    }
    match urlencoding::decode(fragment) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(_) => Some(fragment.to_string()),
    }
}

fn find_target(href: &str) -> Option<Element> {
    let id = anchor_fragment(href)?;
    view::document()?.get_element_by_id(&id)
}

fn scroll_to(target: &Element) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let top = target.get_bounding_client_rect().top() + window.page_y_offset().unwrap_or(0.0) - HEADER_OFFSET;
    let options = ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&options);
}

/// Smooth scrolling for `#fragment` links, and for a fragment present at
/// load time.
pub struct SmoothScroll {
    _listeners: Vec<EventListener>,
    _initial: Option<Timeout>,
}

impl SmoothScroll {
    pub fn install() -> Self {
        let anchors = safe_query_all("a[href^=\"#\"]");
        let listeners = anchors
            .iter()
            .map(|anchor| {
                let link = anchor.clone();
                EventListener::new(anchor.target(), "click", move |event: Event| {
                    let Some(href) = link.attribute("href") else { return };
                    if anchor_fragment(&href).is_none() {
                        return;
                    }
                    event.prevent_default();
                    if let Some(target) = find_target(&href) {
                        scroll_to(&target);
                        push_hash(&href);
                    }
                })
            })
            .collect::<Vec<_>>();
        debug!("smooth scroll: {} anchors", listeners.len());

        let initial = web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .and_then(|hash| find_target(&hash))
            .map(|target| Timeout::new(INITIAL_HASH_DELAY_MS, move || scroll_to(&target)));

        Self { _listeners: listeners, _initial: initial }
    }
}

fn push_hash(href: &str) {
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
        let _ = history.push_state_with_url(&JsValue::NULL, "", Some(href));
    }
}

/// Drops the `_next` query string the static export sometimes leaves behind.
pub fn strip_export_query() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let location = window.location();
    let search = location.search().unwrap_or_default();
    if !search.contains("_next") {
        return;
    }
    let path = location.pathname().unwrap_or_else(|_| "/".to_string());
    let title = view::document().map(|d| d.title()).unwrap_or_default();
    if let Ok(history) = window.history() {
        let _ = history.replace_state_with_url(&JsValue::NULL, &title, Some(&path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_are_decoded() {
        assert_eq!(anchor_fragment("#contact").as_deref(), Some("contact"));
        assert_eq!(anchor_fragment("#our%20work").as_deref(), Some("our work"));
    }

    #[test]
    fn bare_or_external_links_are_ignored() {
        assert_eq!(anchor_fragment("#"), None);
        assert_eq!(anchor_fragment(""), None);
        assert_eq!(anchor_fragment("/about-us#team"), None);
    }
}
