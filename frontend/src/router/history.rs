use leptos::*;

use super::routes::{RouteMatch, DEFAULT_TITLE};

/// Browser session history.
#[cfg_attr(test, mockall::automock)]
pub trait History {
    fn push(&self, url: &str);
    fn replace(&self, url: &str);
    fn back(&self);
    fn forward(&self);
    /// Pathname of the current entry.
    fn current_path(&self) -> String;
}

/// Where a resolved route is shown.
#[cfg_attr(test, mockall::automock)]
pub trait Outlet {
    fn render(&self, matched: &RouteMatch) -> Result<(), String>;
    fn set_title(&self, title: &str);
    fn scroll_to_top(&self);
}

#[cfg(target_arch = "wasm32")]
pub struct BrowserHistory;

#[cfg(target_arch = "wasm32")]
impl BrowserHistory {
    fn history() -> Option<web_sys::History> {
        web_sys::window().and_then(|w| w.history().ok())
    }
}

#[cfg(target_arch = "wasm32")]
impl History for BrowserHistory {
    fn push(&self, url: &str) {
        if let Some(history) = Self::history() {
            let state = wasm_bindgen::JsValue::from_str(url);
            if history.push_state_with_url(&state, "", Some(url)).is_err() {
                log::warn!("pushState rejected {}", url);
            }
        }
    }

    fn replace(&self, url: &str) {
        if let Some(history) = Self::history() {
            let state = wasm_bindgen::JsValue::from_str(url);
            if history.replace_state_with_url(&state, "", Some(url)).is_err() {
                log::warn!("replaceState rejected {}", url);
            }
        }
    }

    fn back(&self) {
        if let Some(history) = Self::history() {
            let _ = history.back();
        }
    }

    fn forward(&self) {
        if let Some(history) = Self::history() {
            let _ = history.forward();
        }
    }

    fn current_path(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().pathname().ok())
            .unwrap_or_else(|| "/".to_string())
    }
}

/// Reactive outlet: the app shell renders whatever match it holds.
#[derive(Clone, Copy)]
pub struct SignalOutlet {
    pub current: RwSignal<Option<RouteMatch>>,
    pub title: RwSignal<String>,
}

impl SignalOutlet {
    pub fn new() -> Self {
        Self {
            current: create_rw_signal(None),
            title: create_rw_signal(DEFAULT_TITLE.to_string()),
        }
    }
}

impl Outlet for SignalOutlet {
    fn render(&self, matched: &RouteMatch) -> Result<(), String> {
        self.current.set(Some(matched.clone()));
        Ok(())
    }

    fn set_title(&self, title: &str) {
        self.title.set(title.to_string());
        #[cfg(target_arch = "wasm32")]
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            document.set_title(title);
        }
    }

    fn scroll_to_top(&self) {
        #[cfg(target_arch = "wasm32")]
        if let Some(window) = web_sys::window() {
            window.scroll_to_with_x_and_y(0.0, 0.0);
        }
    }
}
