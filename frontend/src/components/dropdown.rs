use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Event, KeyboardEvent};

use crate::config::selectors;
use crate::timing::AnimationFrame;
use crate::view::{self, safe_query, DomNode, EventListener, ViewNode};

const WIDE_VIEWPORT: &str = "(min-width: 768px)";
const HIDE_DELAY_MS: u32 = 200;
const HOVER_GRACE_MS: u32 = 300;

struct Menu {
    link: DomNode,
    panel: DomNode,
    open: Cell<bool>,
    pending: RefCell<Option<Timeout>>,
    frame: RefCell<Option<AnimationFrame>>,
}

impl Menu {
    fn open(&self) {
        self.pending.replace(None);
        self.open.set(true);
        self.panel.set_style("display", "block");
        self.panel.set_attribute("aria-hidden", "false");
        self.link.set_attribute("aria-expanded", "true");

        // Let the display change land before starting the fade.
        let panel = self.panel.clone();
        let frame = AnimationFrame::request(move || {
            panel.set_style("opacity", "1");
            panel.set_style("transform", "translateY(0)");
        });
        self.frame.replace(frame);
    }

    fn close(&self, immediate: bool) {
        self.open.set(false);
        self.frame.replace(None);
        self.link.set_attribute("aria-expanded", "false");
        self.panel.set_attribute("aria-hidden", "true");
        self.panel.set_style("opacity", "0");
        self.panel.set_style("transform", "translateY(-10px)");

        let panel = self.panel.clone();
        let delay = if immediate { 0 } else { HIDE_DELAY_MS };
        let timeout = Timeout::new(delay, move || panel.set_style("display", "none"));
        self.pending.replace(Some(timeout));
    }

    fn close_later(self: &Rc<Self>, delay: u32) {
        let weak = Rc::downgrade(self);
        let timeout = Timeout::new(delay, move || {
            if let Some(menu) = weak.upgrade() {
                menu.close(false);
            }
        });
        self.pending.replace(Some(timeout));
    }
}

/// Desktop services dropdown in the header.
pub struct ServicesDropdown {
    menu: Rc<Menu>,
    _listeners: Vec<EventListener>,
}

impl ServicesDropdown {
    pub fn install() -> Option<Self> {
        let link = safe_query(selectors::SERVICES_LINK)?;
        let panel = safe_query(selectors::SERVICES_DROPDOWN)?;
        let menu = Rc::new(Menu {
            link,
            panel,
            open: Cell::new(false),
            pending: RefCell::new(None),
            frame: RefCell::new(None),
        });
        let mut listeners = Vec::new();

        let m = menu.clone();
        listeners.push(EventListener::new(menu.link.target(), "click", move |event: Event| {
            event.prevent_default();
            event.stop_propagation();
            if m.open.get() {
                m.close(false);
            } else {
                m.open();
            }
        }));

        if is_wide_viewport() {
            let m = menu.clone();
            listeners.push(EventListener::new(menu.link.target(), "mouseenter", move |_| m.open()));
            let m = menu.clone();
            listeners.push(EventListener::new(menu.link.target(), "mouseleave", move |_| {
                m.close_later(HOVER_GRACE_MS)
            }));
            let m = menu.clone();
            listeners.push(EventListener::new(menu.panel.target(), "mouseenter", move |_| {
                m.pending.replace(None);
            }));
            let m = menu.clone();
            listeners.push(EventListener::new(menu.panel.target(), "mouseleave", move |_| m.close(false)));
        }

        if let Some(document) = view::document_target() {
            let m = menu.clone();
            listeners.push(EventListener::new(&document, "click", move |event: Event| {
                let target = event.target();
                if !m.link.contains(target.as_ref()) && !m.panel.contains(target.as_ref()) {
                    m.close(true);
                }
            }));
        }

        let m = menu.clone();
        listeners.push(EventListener::new(menu.link.target(), "keydown", move |event: Event| {
            if event.dyn_ref::<KeyboardEvent>().map_or(false, |e| e.key() == "Escape") {
                m.close(true);
                m.link.focus();
            }
        }));

        debug!("services dropdown: installed");
        Some(Self { menu, _listeners: listeners })
    }
}

impl Drop for ServicesDropdown {
    fn drop(&mut self) {
        self.menu.pending.replace(None);
        self.menu.frame.replace(None);
    }
}

fn is_wide_viewport() -> bool {
    web_sys::window()
        .and_then(|w| w.match_media(WIDE_VIEWPORT).ok().flatten())
        .map_or(false, |mq| mq.matches())
}
