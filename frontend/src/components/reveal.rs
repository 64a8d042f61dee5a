//! One-shot scroll reveals driven by `IntersectionObserver`.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::{debug, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::config::selectors;
use crate::view::{safe_query_all, DomNode, ViewNode};

const REVEAL_ROOT_MARGIN: &str = "0px 0px -50px 0px";
const FEATURE_ROOT_MARGIN: &str = "0px 0px -100px 0px";
const THRESHOLD: f64 = 0.1;
const STAGGER_MS: u32 = 100;
const OVERLAY_MS: u32 = 600;

/// Stagger for the `index`-th element of a reveal group.
pub fn reveal_transition(index: usize) -> String {
    let delay = index as u32 * STAGGER_MS;
    format!("opacity 0.6s ease {delay}ms, transform 0.6s ease {delay}ms")
}

/// Observer that disconnects when dropped.
struct Observer {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl Observer {
    /// `on_enter` runs once per element the first time it intersects; the
    /// element is unobserved afterwards.
    fn new<F>(root_margin: &str, mut on_enter: F) -> Option<Self>
    where
        F: FnMut(Element) + 'static,
    {
        let callback = Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let entry: IntersectionObserverEntry = entry.unchecked_into();
                if entry.is_intersecting() {
                    let target = entry.target();
                    observer.unobserve(&target);
                    on_enter(target);
                }
            }
        }) as Box<dyn FnMut(Array, IntersectionObserver)>);

        let init = IntersectionObserverInit::new();
        init.set_root_margin(root_margin);
        init.set_threshold(&JsValue::from_f64(THRESHOLD));
        match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
            Ok(observer) => Some(Self { observer, _callback: callback }),
            Err(e) => {
                warn!("IntersectionObserver unavailable: {:?}", e);
                None
            }
        }
    }

    fn observe(&self, node: &DomNode) {
        self.observer.observe(node.element());
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Fade-up reveal for the configured element groups.
pub struct ScrollReveal {
    _observer: Observer,
}

impl ScrollReveal {
    pub fn install(groups: &[&str]) -> Option<Self> {
        let observer = Observer::new(REVEAL_ROOT_MARGIN, |element| {
            let node = DomNode::new(element);
            node.add_class("animated");
            node.set_style("opacity", "1");
            node.set_style("transform", "translateY(0)");
        })?;

        let mut count = 0;
        for selector in groups {
            for (index, node) in safe_query_all(selector).iter().enumerate() {
                node.set_style("opacity", "0");
                node.set_style("transform", "translateY(75px)");
                node.set_style("transition", &reveal_transition(index));
                observer.observe(node);
                count += 1;
            }
        }
        if count == 0 {
            debug!("scroll reveal: nothing to animate");
            return None;
        }
        debug!("scroll reveal: observing {} elements", count);
        Some(Self { _observer: observer })
    }
}

/// Overlay wipe on the services feature sections.
pub struct FeatureReveal {
    _observer: Observer,
    timers: Rc<RefCell<Vec<Timeout>>>,
}

impl FeatureReveal {
    pub fn install() -> Option<Self> {
        let sections = safe_query_all(selectors::FEATURES_FEATURE);
        if sections.is_empty() {
            warn!("feature reveal: no feature sections found");
            return None;
        }
        info!("feature reveal: found {} feature sections", sections.len());

        let timers: Rc<RefCell<Vec<Timeout>>> = Rc::default();
        let pending = timers.clone();
        let observer = Observer::new(FEATURE_ROOT_MARGIN, move |element| {
            reveal_section(&DomNode::new(element), &pending);
        })?;
        for section in &sections {
            observer.observe(section);
        }
        Some(Self { _observer: observer, timers })
    }
}

impl Drop for FeatureReveal {
    fn drop(&mut self) {
        self.timers.borrow_mut().clear();
    }
}

fn reveal_section(section: &DomNode, timers: &Rc<RefCell<Vec<Timeout>>>) {
    let containers = section.find_all(selectors::FEATURE_REVEAL_CONTAINER);
    if containers.is_empty() {
        warn!("feature reveal: no animation containers in section");
        return;
    }
    for (index, container) in containers.iter().enumerate() {
        let (Some(overlay), Some(content)) = (
            container.find(selectors::FEATURE_REVEAL_OVERLAY),
            container.find(selectors::FEATURE_REVEAL_CONTENT),
        ) else {
            warn!("feature reveal: container {} is missing its overlay or content", index);
            continue;
        };
        let later = timers.clone();
        let timeout = Timeout::new(index as u32 * STAGGER_MS, move || {
            slide_overlay(&overlay, &content);
            let hide = Timeout::new(OVERLAY_MS + 50, move || overlay.set_style("display", "none"));
            later.borrow_mut().push(hide);
        });
        timers.borrow_mut().push(timeout);
    }
}

fn slide_overlay(overlay: &DomNode, content: &DomNode) {
    content.set_style(
        "transition",
        &format!("opacity {OVERLAY_MS}ms ease-out, transform {OVERLAY_MS}ms ease-out"),
    );
    content.set_style("opacity", "1");
    content.set_style("transform", "translateY(0) translateZ(0)");

    overlay.set_style("transform-origin", "bottom");
    overlay.set_style(
        "transition",
        &format!("transform {OVERLAY_MS}ms cubic-bezier(0.65, 0, 0.35, 1)"),
    );
    // Read layout so the transition starts from the current transform.
    if let Some(el) = overlay.html() {
        let _ = el.offset_height();
    }
    overlay.set_style("transform", "scaleY(0)");
}
