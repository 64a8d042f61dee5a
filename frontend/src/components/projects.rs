use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::{debug, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{Event, KeyboardEvent, TouchEvent};

use crate::components::carousel::{nav_key_for, Carousel, CarouselConfig, NavArrows, Transition};
use crate::config::selectors;
use crate::view::{self, is_editable_target, safe_query, safe_query_all, DomNode, EventListener, ViewNode};

/// Runs a callback once after a delay. Dropping the handle cancels it.
pub trait Scheduler {
    type Handle;
    fn after(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Self::Handle;
}

/// Browser timers via `gloo-timers`.
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    type Handle = Timeout;

    fn after(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(delay_ms, callback)
    }
}

struct Shared<N, S: Scheduler> {
    carousel: RefCell<Carousel<N>>,
    settle: RefCell<Option<S::Handle>>,
    scheduler: S,
}

impl<N: ViewNode + 'static, S: Scheduler + 'static> Shared<N, S> {
    fn new(carousel: Carousel<N>, scheduler: S) -> Rc<Self> {
        Rc::new(Self { carousel: RefCell::new(carousel), settle: RefCell::new(None), scheduler })
    }

    /// Applies `op`; a started transition closes its window after
    /// `transition_ms`.
    fn run(self: &Rc<Self>, op: impl FnOnce(&mut Carousel<N>) -> Transition) -> Transition {
        let (outcome, transition_ms) = {
            let mut carousel = self.carousel.borrow_mut();
            let outcome = op(&mut carousel);
            (outcome, carousel.config().transition_ms)
        };
        if outcome == Transition::Started {
            let weak = Rc::downgrade(self);
            let handle = self.scheduler.after(
                transition_ms,
                Box::new(move || {
                    if let Some(shared) = weak.upgrade() {
                        shared.carousel.borrow_mut().finish_transition();
                    }
                }),
            );
            self.settle.replace(Some(handle));
        }
        outcome
    }
}

/// The projects accordion wired to the page. Dropping it releases every
/// listener and cancels the pending end-of-transition timer.
pub struct ProjectsCarousel {
    shared: Rc<Shared<DomNode, TimeoutScheduler>>,
    _listeners: Vec<EventListener>,
}

impl ProjectsCarousel {
    pub fn install(config: CarouselConfig) -> Option<Self> {
        let host = safe_query(selectors::PROJECTS_ACCORDION)?;
        let icons = safe_query_all(selectors::PROJECTS_NAV_ICON);
        let arrows = match icons.as_slice() {
            [previous, next, ..] => Some(NavArrows { previous: previous.clone(), next: next.clone() }),
            _ => {
                debug!("projects: navigation arrows not found");
                None
            }
        };
        let carousel = Carousel::from_host(&host, arrows.clone(), config)?;
        info!(
            "projects: {} panels, starting at {}",
            carousel.len(),
            carousel.active_index()
        );

        let shared = Shared::new(carousel, TimeoutScheduler);
        let mut listeners = Vec::new();

        let panels: Vec<DomNode> = shared.carousel.borrow().panels().iter().map(|p| p.root.clone()).collect();
        for panel in panels {
            let s = shared.clone();
            let node = panel.clone();
            listeners.push(EventListener::new(panel.target(), "click", move |_| {
                s.run(|c| c.activate_by_pointer(&node));
            }));
        }

        let triggers: Vec<(usize, DomNode)> = shared
            .carousel
            .borrow()
            .panels()
            .iter()
            .filter_map(|p| p.trigger.clone().map(|t| (p.index, t)))
            .collect();
        for (index, trigger) in triggers {
            // The trigger is a link with its own meaning; keep it from also
            // activating the surrounding panel.
            listeners.push(EventListener::new(trigger.target(), "click", |event: Event| {
                event.stop_propagation();
            }));
            let s = shared.clone();
            listeners.push(EventListener::new(trigger.target(), "keydown", move |event: Event| {
                let Some(key) = event.dyn_ref::<KeyboardEvent>().map(|e| e.key()) else {
                    return;
                };
                if key == "Enter" || key == " " {
                    if s.carousel.borrow().is_active(index) {
                        return;
                    }
                    event.prevent_default();
                    s.run(|c| c.activate(index));
                }
            }));
        }

        let links: Vec<(usize, DomNode)> = shared
            .carousel
            .borrow()
            .panels()
            .iter()
            .filter_map(|p| p.link.clone().map(|l| (p.index, l)))
            .collect();
        for (index, link) in links {
            let s = shared.clone();
            listeners.push(EventListener::new(link.target(), "click", move |event: Event| {
                // Collapsed panels swallow the navigation and let the click
                // bubble up to activate the panel instead.
                event.prevent_default();
                let href = s.carousel.borrow().active_link(index);
                if let Some(href) = href {
                    event.stop_propagation();
                    open_in_new_tab(&href);
                }
            }));
        }

        if let Some(arrows) = arrows {
            let s = shared.clone();
            listeners.push(EventListener::new(arrows.previous.target(), "click", move |_| {
                s.run(|c| c.previous());
            }));
            let s = shared.clone();
            listeners.push(EventListener::new(arrows.next.target(), "click", move |_| {
                s.run(|c| c.next());
            }));
        }

        if let Some(document) = view::document_target() {
            let s = shared.clone();
            let region = host.clone();
            listeners.push(EventListener::new(&document, "keydown", move |event: Event| {
                let Some(key) = event.dyn_ref::<KeyboardEvent>().map(|e| e.key()) else {
                    return;
                };
                let Some(key) = nav_key_for(&key, is_editable_target(&event), region.in_viewport()) else {
                    return;
                };
                event.prevent_default();
                s.run(|c| c.handle_key(key));
            }));
        }

        let touch_start = Rc::new(Cell::new(None::<f64>));
        {
            let touch_start = touch_start.clone();
            listeners.push(EventListener::passive(host.target(), "touchstart", move |event: Event| {
                touch_start.set(first_touch_x(&event));
            }));
        }
        {
            let s = shared.clone();
            listeners.push(EventListener::passive(host.target(), "touchend", move |event: Event| {
                if let (Some(start), Some(end)) = (touch_start.take(), first_touch_x(&event)) {
                    s.run(|c| c.handle_swipe(start, end));
                }
            }));
        }

        Some(Self { shared, _listeners: listeners })
    }
}

impl Drop for ProjectsCarousel {
    fn drop(&mut self) {
        self.shared.settle.replace(None);
        let carousel = self.shared.carousel.borrow();
        debug!(
            "projects: torn down at panel {} (mid-transition: {})",
            carousel.active_index(),
            carousel.is_transitioning()
        );
    }
}

fn open_in_new_tab(href: &str) {
    let Some(window) = web_sys::window() else { return };
    if let Err(e) = window.open_with_url_and_target(href, "_blank") {
        warn!("projects: could not open {}: {:?}", href, e);
    }
}

fn first_touch_x(event: &Event) -> Option<f64> {
    let touch = event.dyn_ref::<TouchEvent>()?.changed_touches().get(0)?;
    Some(f64::from(touch.screen_x()))
}
