use log::{info, warn};
use stylist::GlobalStyle;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlElement};

use crate::view::{self, safe_query, EventListener};

const MAIN_ID: &str = "main-content";

const FOCUS_CSS: &str = r#"
*:focus-visible {
    outline: 2px solid #4A90E2;
    outline-offset: 2px;
}
.skip-link {
    position: absolute;
    top: -40px;
    left: 0;
    background: #000;
    color: #fff;
    padding: 8px;
    text-decoration: none;
    z-index: 100;
}
.skip-link:focus {
    top: 0 !important;
}
"#;

/// Skip link and a visible focus ring.
pub struct Accessibility {
    skip_link: Option<Element>,
    style: Option<GlobalStyle>,
    _listeners: Vec<EventListener>,
}

impl Accessibility {
    pub fn install() -> Self {
        let style = match GlobalStyle::new(FOCUS_CSS) {
            Ok(style) => Some(style),
            Err(e) => {
                warn!("accessibility: focus style rejected: {}", e);
                None
            }
        };

        if let Some(main) = safe_query("main").or_else(|| safe_query("[role=\"main\"]")) {
            if main.element().id().is_empty() {
                main.element().set_id(MAIN_ID);
            }
        }

        let mut listeners = Vec::new();
        let skip_link = insert_skip_link();
        if let Some(link) = &skip_link {
            let focused = link.clone();
            listeners.push(EventListener::new(link.as_ref(), "focus", move |_: Event| {
                set_top(&focused, "0");
            }));
            let blurred = link.clone();
            listeners.push(EventListener::new(link.as_ref(), "blur", move |_: Event| {
                set_top(&blurred, "-40px");
            }));
            info!("accessibility: skip link added");
        }

        Self { skip_link, style, _listeners: listeners }
    }
}

fn insert_skip_link() -> Option<Element> {
    let document = view::document()?;
    let body = document.body()?;
    let link = document.create_element("a").ok()?;
    link.set_attribute("href", &format!("#{MAIN_ID}")).ok()?;
    link.set_class_name("skip-link");
    link.set_text_content(Some("Skip to main content"));
    body.insert_before(&link, body.first_child().as_ref()).ok()?;
    Some(link)
}

fn set_top(link: &Element, value: &str) {
    if let Some(link) = link.dyn_ref::<HtmlElement>() {
        let _ = link.style().set_property("top", value);
    }
}

impl Drop for Accessibility {
    fn drop(&mut self) {
        if let Some(link) = self.skip_link.take() {
            link.remove();
        }
        if let Some(style) = &self.style {
            style.unregister();
        }
    }
}
