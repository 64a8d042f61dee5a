use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlImageElement};

use crate::config::selectors;
use crate::timing::{AnimationFrame, Throttle};
use crate::view::{self, safe_query, safe_query_all, DomNode, EventListener, ViewNode};

const SELECTED_ICON: &str = "/images/selected.svg";
const UNSELECTED_ICON: &str = "/images/unselected.svg";
const THROTTLE_MS: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepProgress {
    /// Fraction of the section scrolled past the viewport midline, 0..=1.
    pub progress: f64,
    pub active: usize,
}

/// Where the viewport `midline` sits inside a section of `steps`
/// features. `None` while the midline is outside the section.
pub fn step_progress(midline: f64, top: f64, height: f64, steps: usize) -> Option<StepProgress> {
    if steps == 0 || height <= 0.0 || midline <= top || midline >= top + height {
        return None;
    }
    let progress = ((midline - top) / height).clamp(0.0, 1.0);
    let active = ((progress * steps as f64).floor() as usize).min(steps - 1);
    Some(StepProgress { progress, active })
}

struct Steps {
    section: DomNode,
    line: Option<DomNode>,
    steps: Vec<DomNode>,
    features: Vec<DomNode>,
    throttle: RefCell<Throttle>,
    frame: RefCell<Option<AnimationFrame>>,
}

impl Steps {
    fn update(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(section) = self.section.html() else {
            return;
        };
        let viewport = window.inner_height().ok().and_then(|h| h.as_f64()).unwrap_or(0.0);
        let midline = window.scroll_y().unwrap_or(0.0) + viewport / 2.0;
        let Some(state) = step_progress(
            midline,
            f64::from(section.offset_top()),
            f64::from(section.offset_height()),
            self.features.len(),
        ) else {
            return;
        };

        if let Some(line) = &self.line {
            let line = line.clone();
            let height = format!("{}%", state.progress * 100.0);
            let frame = AnimationFrame::request(move || line.set_style("height", &height));
            self.frame.replace(frame);
        }

        for (index, step) in self.steps.iter().enumerate() {
            let Some(img) = step.find("img") else { continue };
            let Some(img) = img.element().dyn_ref::<HtmlImageElement>() else { continue };
            let should_select = index <= state.active;
            let selected = img.src().ends_with(SELECTED_ICON);
            if should_select && !selected {
                img.set_src(SELECTED_ICON);
                img.set_alt("selected");
            } else if !should_select && selected {
                img.set_src(UNSELECTED_ICON);
                img.set_alt("unselected");
            }
        }

        for (index, feature) in self.features.iter().enumerate() {
            if index == state.active {
                feature.add_class("active");
            } else {
                feature.remove_class("active");
            }
        }
    }
}

/// Scroll-driven progress line and step markers in the services section.
pub struct ProgressStepper {
    steps: Rc<Steps>,
    _listener: EventListener,
}

impl ProgressStepper {
    pub fn install() -> Option<Self> {
        let section = safe_query(selectors::FEATURES_CONTAINER)?;
        let features = safe_query_all(selectors::FEATURES_FEATURE);
        if features.is_empty() {
            return None;
        }
        let steps = Rc::new(Steps {
            section,
            line: safe_query(selectors::FEATURES_LINE_INNER),
            steps: safe_query_all(selectors::FEATURES_STEP),
            features,
            throttle: RefCell::new(Throttle::new(THROTTLE_MS)),
            frame: RefCell::new(None),
        });

        let window = view::window_target()?;
        let s = steps.clone();
        let listener = EventListener::passive(&window, "scroll", move |event: Event| {
            if s.throttle.borrow_mut().ready(event.time_stamp()) {
                s.update();
            }
        });
        steps.update();
        debug!("progress stepper: {} features", steps.features.len());
        Some(Self { steps, _listener: listener })
    }
}

impl Drop for ProgressStepper {
    fn drop(&mut self) {
        self.steps.frame.replace(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn outside_the_section_nothing_changes() {
        assert_eq!(step_progress(100.0, 100.0, 400.0, 4), None);
        assert_eq!(step_progress(500.0, 100.0, 400.0, 4), None);
        assert_eq!(step_progress(50.0, 100.0, 400.0, 4), None);
    }

    #[test]
    fn progress_picks_the_matching_step() {
        let state = step_progress(200.0, 100.0, 400.0, 4).unwrap();
        assert_eq!(state, StepProgress { progress: 0.25, active: 1 });

        let state = step_progress(150.0, 100.0, 400.0, 4).unwrap();
        assert_eq!(state.active, 0);

        let state = step_progress(499.0, 100.0, 400.0, 4).unwrap();
        assert_eq!(state.active, 3);
    }

    #[test]
    fn no_features_no_progress() {
        assert_eq!(step_progress(200.0, 100.0, 400.0, 0), None);
    }
}
