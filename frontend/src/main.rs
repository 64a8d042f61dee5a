use yew::prelude::*;
use log::{info, warn, Level};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

mod config;
mod relay;
mod route;
mod site;
mod timing;
mod view;
mod components {
    pub mod accessibility;
    pub mod carousel;
    pub mod contact;
    pub mod dropdown;
    pub mod header;
    pub mod mobile_menu;
    pub mod performance;
    pub mod projects;
    pub mod reveal;
    pub mod smooth_scroll;
    pub mod stepper;
    pub mod typewriter;
}

use site::Site;

const HOST_ID: &str = "codefort-app";

/// Headless root: renders nothing, owns the page enhancements for as long as
/// it is mounted.
#[function_component]
fn App() -> Html {
    use_effect_with_deps(
        move |_| {
            let site = Site::install();
            move || drop(site)
        },
        (),
    );

    html! {}
}

fn mount() {
    let Some(document) = view::document() else {
        warn!("no document, nothing to enhance");
        return;
    };
    let host = match document.get_element_by_id(HOST_ID) {
        Some(host) => host,
        None => {
            let Ok(host) = document.create_element("div") else { return };
            host.set_id(HOST_ID);
            let _ = host.set_attribute("hidden", "");
            match document.body() {
                Some(body) if body.append_child(&host).is_ok() => host,
                _ => {
                    warn!("could not attach application host");
                    return;
                }
            }
        }
    };
    yew::Renderer::<App>::with_root(host).render();
}

fn document_loading() -> bool {
    view::document().map_or(false, |d| d.ready_state() == "loading")
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    let level = if cfg!(debug_assertions) { Level::Debug } else { Level::Info };
    let _ = console_log::init_with_level(level);

    info!("Starting application");

    if !document_loading() {
        mount();
        return;
    }
    let Some(document) = view::document() else { return };
    let on_ready = Closure::wrap(Box::new(mount) as Box<dyn FnMut()>);
    let options = web_sys::AddEventListenerOptions::new();
    options.set_once(true);
    if document
        .add_event_listener_with_callback_and_add_event_listener_options(
            "DOMContentLoaded",
            on_ready.as_ref().unchecked_ref(),
            &options,
        )
        .is_err()
    {
        warn!("could not wait for DOMContentLoaded, mounting now");
        mount();
        return;
    }
    // Fires once, for the lifetime of the page.
    on_ready.forget();
}
