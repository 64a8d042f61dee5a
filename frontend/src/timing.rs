use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Leading-edge throttle keyed on event timestamps (milliseconds).
#[derive(Debug, Clone)]
pub struct Throttle {
    limit_ms: f64,
    last: Option<f64>,
}

impl Throttle {
    pub fn new(limit_ms: f64) -> Self {
        Self { limit_ms, last: None }
    }

    /// Returns true if a call at `now_ms` should run.
    pub fn ready(&mut self, now_ms: f64) -> bool {
        match self.last {
            Some(last) if now_ms - last < self.limit_ms => false,
            _ => {
                self.last = Some(now_ms);
                true
            }
        }
    }
}

/// A pending `requestAnimationFrame` callback, cancelled when dropped.
pub struct AnimationFrame {
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

impl AnimationFrame {
    pub fn request<F>(callback: F) -> Option<Self>
    where
        F: FnOnce() + 'static,
    {
        let window = web_sys::window()?;
        let mut callback = Some(callback);
        let closure = Closure::wrap(Box::new(move || {
            if let Some(f) = callback.take() {
                f();
            }
        }) as Box<dyn FnMut()>);
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => Some(Self { id, _callback: closure }),
            Err(e) => {
                debug!("requestAnimationFrame failed: {:?}", e);
                None
            }
        }
    }
}

impl Drop for AnimationFrame {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_lets_first_call_through_then_waits_out_the_window() {
        let mut throttle = Throttle::new(16.0);
        assert!(throttle.ready(100.0));
        assert!(!throttle.ready(105.0));
        assert!(!throttle.ready(115.9));
        assert!(throttle.ready(116.0));
        assert!(!throttle.ready(120.0));
    }
}
