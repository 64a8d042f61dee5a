use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::selectors;
use crate::timing::AnimationFrame;
use crate::view::{self, safe_query, DomNode, EventListener, ViewNode};

const SCROLLED_AFTER: f64 = 100.0;
const HIDE_AFTER: f64 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderPose {
    pub scrolled: bool,
    pub hidden: bool,
}

/// Header state for a scroll from `last` to `current`.
pub fn header_pose(last: f64, current: f64) -> HeaderPose {
    HeaderPose {
        scrolled: current > SCROLLED_AFTER,
        hidden: current > last && current > HIDE_AFTER,
    }
}

struct Tracker {
    header: DomNode,
    last: Cell<f64>,
    ticking: Cell<bool>,
    frame: RefCell<Option<AnimationFrame>>,
}

impl Tracker {
    fn apply(&self) {
        let current = web_sys::window().and_then(|w| w.scroll_y().ok()).unwrap_or(0.0);
        let pose = header_pose(self.last.get(), current);
        if pose.scrolled {
            self.header.add_class("scrolled");
        } else {
            self.header.remove_class("scrolled");
        }
        self.header
            .set_style("transform", if pose.hidden { "translateY(-100%)" } else { "translateY(0)" });
        self.last.set(current);
        self.ticking.set(false);
    }
}

/// Compacts the header once the page scrolls and tucks it away while the
/// user scrolls down.
pub struct HeaderScroll {
    tracker: Rc<Tracker>,
    _listener: EventListener,
}

impl HeaderScroll {
    pub fn install() -> Option<Self> {
        let header = safe_query(selectors::HEADER)?;
        let tracker = Rc::new(Tracker {
            header,
            last: Cell::new(0.0),
            ticking: Cell::new(false),
            frame: RefCell::new(None),
        });
        let window = view::window_target()?;
        let t = tracker.clone();
        let listener = EventListener::passive(&window, "scroll", move |_| {
            if t.ticking.get() {
                return;
            }
            t.ticking.set(true);
            let weak = Rc::downgrade(&t);
            let frame = AnimationFrame::request(move || {
                if let Some(tracker) = weak.upgrade() {
                    tracker.apply();
                }
            });
            if frame.is_none() {
                t.ticking.set(false);
            }
            t.frame.replace(frame);
        });
        Some(Self { tracker, _listener: listener })
    }
}

impl Drop for HeaderScroll {
    fn drop(&mut self) {
        self.tracker.frame.replace(None);
    }
}
