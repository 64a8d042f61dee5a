use log::{debug, info};

use crate::view::{self, EventListener};

/// Logs how long the page took to load once the `load` event fires, or
/// right away when the bundle starts after it already has.
pub struct LoadTiming {
    _listener: Option<EventListener>,
}

impl LoadTiming {
    pub fn install() -> Option<Self> {
        let ready_state = view::document()?.ready_state();
        if load_already_fired(&ready_state) {
            report_after_load_handlers();
            return Some(Self { _listener: None });
        }
        let window = view::window_target()?;
        let listener = EventListener::new(&window, "load", |_| report_after_load_handlers());
        Some(Self { _listener: Some(listener) })
    }
}

fn load_already_fired(ready_state: &str) -> bool {
    ready_state == "complete"
}

// loadEventEnd is only set after the load handlers return.
fn report_after_load_handlers() {
    wasm_bindgen_futures::spawn_local(async {
        gloo_timers::future::TimeoutFuture::new(0).await;
        match page_load_ms() {
            Some(ms) => info!("Page load time: {}ms", ms),
            None => debug!("navigation timing unavailable"),
        }
    });
}

fn page_load_ms() -> Option<f64> {
    let timing = web_sys::window()?.performance()?.timing();
    load_duration(timing.navigation_start(), timing.load_event_end())
}

fn load_duration(navigation_start: f64, load_event_end: f64) -> Option<f64> {
    let elapsed = load_event_end - navigation_start;
    (elapsed > 0.0).then_some(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn late_start_reports_immediately() {
        assert!(load_already_fired("complete"));
        assert!(!load_already_fired("interactive"));
        assert!(!load_already_fired("loading"));
    }

    #[test]
    fn duration_needs_a_finished_load() {
        assert_eq!(load_duration(1_000.0, 1_850.0), Some(850.0));
        assert_eq!(load_duration(1_000.0, 0.0), None);
    }
}
