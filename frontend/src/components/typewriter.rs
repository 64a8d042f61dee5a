use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::{debug, warn};
use stylist::GlobalStyle;

use crate::config::selectors;
use crate::route::Route;
use crate::view::{self, safe_query, DomNode, ViewNode};

#[derive(Debug, Clone, PartialEq)]
pub struct TypewriterConfig {
    pub type_ms: u32,
    pub delete_ms: u32,
    pub hold_ms: u32,
    pub next_ms: u32,
    pub start_ms: u32,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self { type_ms: 100, delete_ms: 50, hold_ms: 2000, next_ms: 500, start_ms: 500 }
    }
}

/// Types each headline out, holds it, deletes it, then moves on.
#[derive(Debug, Clone)]
pub struct Typewriter {
    headlines: Vec<String>,
    config: TypewriterConfig,
    headline: usize,
    chars: usize,
    deleting: bool,
}

impl Typewriter {
    pub fn new(headlines: &[&str], config: TypewriterConfig) -> Option<Self> {
        if headlines.is_empty() {
            return None;
        }
        Some(Self {
            headlines: headlines.iter().map(|s| s.to_string()).collect(),
            config,
            headline: 0,
            chars: 0,
            deleting: false,
        })
    }

    /// Advances one step, returning the text to show and the delay before
    /// the next step.
    pub fn tick(&mut self) -> (String, u32) {
        let current = &self.headlines[self.headline];
        let len = current.chars().count();

        let mut delay = if self.deleting {
            self.chars = self.chars.saturating_sub(1);
            self.config.delete_ms
        } else {
            self.chars = (self.chars + 1).min(len);
            self.config.type_ms
        };
        let visible: String = current.chars().take(self.chars).collect();

        if !self.deleting && self.chars == len {
            self.deleting = true;
            delay = self.config.hold_ms;
        } else if self.deleting && self.chars == 0 {
            self.deleting = false;
            self.headline = (self.headline + 1) % self.headlines.len();
            delay = self.config.next_ms;
        }
        (visible, delay)
    }
}

const CURSOR_CSS: &str = r#"
@keyframes blink {
    0%, 50% { opacity: 1; }
    51%, 100% { opacity: 0; }
}
.typed-cursor {
    animation: blink 1s infinite;
    margin-left: 2px;
}
"#;

struct Runner {
    machine: RefCell<Typewriter>,
    target: DomNode,
    pending: RefCell<Option<Timeout>>,
}

impl Runner {
    fn schedule(self: &Rc<Self>, delay: u32) {
        let weak = Rc::downgrade(self);
        let timeout = Timeout::new(delay, move || {
            if let Some(runner) = weak.upgrade() {
                let (text, next) = runner.machine.borrow_mut().tick();
                runner.target.element().set_text_content(Some(&text));
                runner.schedule(next);
            }
        });
        self.pending.replace(Some(timeout));
    }
}

/// Hero headline typing effect for the current page.
pub struct TypedHeadline {
    runner: Rc<Runner>,
    style: Option<GlobalStyle>,
}

impl TypedHeadline {
    pub fn install(route: &Route, config: TypewriterConfig) -> Option<Self> {
        let title = safe_query(selectors::HERO_TITLE)?;
        let start_ms = config.start_ms;
        let Some(machine) = Typewriter::new(route.headlines(), config) else {
            debug!("typewriter: no headline for {:?}", route);
            return None;
        };
        // The export wraps the text in a leading span when it has a cursor.
        let target = title.find("span:first-child").unwrap_or_else(|| title.clone());
        let style = ensure_cursor(&title);

        let runner = Rc::new(Runner {
            machine: RefCell::new(machine),
            target,
            pending: RefCell::new(None),
        });
        runner.schedule(start_ms);
        Some(Self { runner, style })
    }
}

impl Drop for TypedHeadline {
    fn drop(&mut self) {
        self.runner.pending.replace(None);
        if let Some(style) = &self.style {
            style.unregister();
        }
    }
}

fn ensure_cursor(title: &DomNode) -> Option<GlobalStyle> {
    if title.find(selectors::TYPED_CURSOR).is_some() || safe_query(selectors::TYPED_CURSOR).is_some() {
        return None;
    }
    let document = view::document()?;
    let parent = title.element().parent_node()?;
    let cursor = document.create_element("span").ok()?;
    cursor.set_class_name("typed-cursor");
    cursor.set_text_content(Some("|"));
    if let Err(e) = parent.append_child(&cursor) {
        warn!("typewriter: could not add cursor: {:?}", e);
        return None;
    }
    match GlobalStyle::new(CURSOR_CSS) {
        Ok(style) => Some(style),
        Err(e) => {
            warn!("typewriter: cursor style rejected: {}", e);
            None
        }
    }
}
