//! Client mirror of the backend configuration, and the theme it implies.

use crate::models::{AppConfig, Shortcuts};
use crate::storage::{load_json_from_storage, save_json_to_storage, CONFIG_KEY};
use futures::channel::oneshot;
use leptos::logging::warn;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Window event the backend dispatches after a settings change.
pub(crate) const CONFIG_CHANGED_EVENT: &str = "config-changed";

pub(crate) const THEME_LINK_ID: &str = "theme-stylesheet";

type ConfigListener = Box<dyn Fn(&AppConfig)>;

/// Shared, subscribable config. Readers always see the latest replace.
#[derive(Clone)]
pub(crate) struct ConfigStore {
    config: Rc<RefCell<AppConfig>>,
    listeners: Rc<RefCell<Vec<ConfigListener>>>,
    persist: bool,
}

impl ConfigStore {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Rc::new(RefCell::new(config)),
            listeners: Rc::new(RefCell::new(vec![])),
            persist: false,
        }
    }

    /// Starts from the localStorage snapshot and keeps it updated.
    pub fn cached() -> Self {
        let config = load_json_from_storage::<AppConfig>(CONFIG_KEY).unwrap_or_default();
        Self {
            persist: true,
            ..Self::new(config)
        }
    }

    pub fn get(&self) -> AppConfig {
        self.config.borrow().clone()
    }

    pub fn shortcuts(&self) -> Shortcuts {
        self.config.borrow().shortcuts.clone()
    }

    pub fn scroll_amount(&self) -> f64 {
        self.config.borrow().effective_scroll_amount()
    }

    pub fn subscribe(&self, listener: impl Fn(&AppConfig) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    pub fn replace(&self, config: AppConfig) {
        if self.persist {
            save_json_to_storage(CONFIG_KEY, &config);
        }
        *self.config.borrow_mut() = config.clone();

        for listener in self.listeners.borrow().iter() {
            listener(&config);
        }
    }

    /// Payload of a backend change event. Invalid JSON leaves the config as is.
    pub fn apply_json(&self, json: &str) -> Result<(), serde_json::Error> {
        let config = serde_json::from_str::<AppConfig>(json)?;
        self.replace(config);
        Ok(())
    }
}

/// `CustomEvent.detail` is either the JSON text or the config object itself.
pub(crate) fn detail_to_json(detail: &JsValue) -> Option<String> {
    if let Some(s) = detail.as_string() {
        return Some(s);
    }
    if detail.is_object() {
        return js_sys::JSON::stringify(detail).ok()?.as_string();
    }
    None
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ThemeRequest {
    pub href: String,
    pub variables: Vec<(&'static str, String)>,
}

impl ThemeRequest {
    pub fn from_config(config: &AppConfig) -> Self {
        let valid = !config.theme.is_empty()
            && config
                .theme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        let name = if valid { config.theme.as_str() } else { "light" };

        let mut variables = vec![];
        if let Some(family) = config.fonts.family.as_deref().filter(|s| !s.trim().is_empty()) {
            variables.push(("--font-family", family.to_string()));
        }
        if let Some(size) = config.fonts.size_px.filter(|s| s.is_finite() && *s > 0.0) {
            variables.push(("--font-size", format!("{size}px")));
        }
        if let Some(code) = config
            .fonts
            .code_family
            .as_deref()
            .filter(|s| !s.trim().is_empty())
        {
            variables.push(("--code-font-family", code.to_string()));
        }

        Self {
            href: format!("themes/{name}.css"),
            variables,
        }
    }
}

/// Remembers the last applied request so repeated config pushes that do not
/// touch the theme skip the stylesheet swap.
#[derive(Default)]
pub(crate) struct ThemeApplier {
    applied: Option<ThemeRequest>,
}

impl ThemeApplier {
    pub fn update(&mut self, config: &AppConfig) -> Option<ThemeRequest> {
        let next = ThemeRequest::from_config(config);
        if self.applied.as_ref() == Some(&next) {
            return None;
        }
        self.applied = Some(next.clone());
        Some(next)
    }
}

/// Sets the font variables and swaps the theme stylesheet. Resolves once the
/// new sheet fires `load` or `error`; a failed load is not an error.
pub(crate) async fn apply_theme(request: ThemeRequest) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if let Some(root) = document
        .document_element()
        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
    {
        let style = root.style();
        for (name, value) in &request.variables {
            style.set_property(name, value)?;
        }
    }

    let link = match document.get_element_by_id(THEME_LINK_ID) {
        Some(el) => el.dyn_into::<web_sys::HtmlLinkElement>()?,
        None => {
            let link = document
                .create_element("link")?
                .dyn_into::<web_sys::HtmlLinkElement>()?;
            link.set_id(THEME_LINK_ID);
            link.set_rel("stylesheet");
            let head = document
                .head()
                .ok_or_else(|| JsValue::from_str("no <head>"))?;
            head.append_child(&link)?;
            link
        }
    };

    if link.get_attribute("href").as_deref() == Some(request.href.as_str()) {
        return Ok(());
    }

    let (tx, rx) = oneshot::channel::<()>();
    let tx = Rc::new(RefCell::new(Some(tx)));
    let on_settled = Closure::<dyn FnMut()>::new(move || {
        if let Some(tx) = tx.borrow_mut().take() {
            let _ = tx.send(());
        }
    });
    link.set_onload(Some(on_settled.as_ref().unchecked_ref()));
    link.set_onerror(Some(on_settled.as_ref().unchecked_ref()));
    link.set_href(&request.href);

    if rx.await.is_err() {
        warn!("theme load for {} never settled", request.href);
    }

    link.set_onload(None);
    link.set_onerror(None);
    drop(on_settled);
    Ok(())
}
