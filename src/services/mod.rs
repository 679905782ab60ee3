//! Capability traits for everything the core calls out to.
//!
//! Managers receive these as `Rc<dyn ...>` at construction; nothing here is a
//! global.

use crate::api::ApiResult;
use crate::models::Notification;
use futures::future::{FutureExt, LocalBoxFuture};
use leptos::logging::{error, log};
use wasm_bindgen::{JsCast, JsValue};

pub(crate) trait NoteService {
    fn search(&self, query: &str) -> LocalBoxFuture<'static, ApiResult<Vec<String>>>;
    fn get_content(&self, note_id: &str) -> LocalBoxFuture<'static, ApiResult<String>>;
    fn open_in_editor(&self, note_id: &str) -> LocalBoxFuture<'static, ApiResult<()>>;
    fn open_folder(&self, note_id: &str) -> LocalBoxFuture<'static, ApiResult<()>>;
}

/// Visibility toggles for the modal dialogs. Fire and forget.
pub(crate) trait DialogManager {
    fn open_create_dialog(&self);
    fn open_rename_dialog(&self, note_id: &str);
    fn open_delete_dialog(&self);
    fn open_unsaved_changes_dialog(&self);
    fn is_any_open(&self) -> bool;
}

pub(crate) trait ExternalOpener {
    fn open_url(&self, url: &str) -> LocalBoxFuture<'static, ApiResult<()>>;
    fn open_path(&self, path: &str) -> LocalBoxFuture<'static, ApiResult<()>>;
}

pub(crate) trait Notifier {
    fn notify(&self, notification: Notification);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ClipboardError(pub String);

impl std::fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to write clipboard: {}", self.0)
    }
}

pub(crate) trait Clipboard {
    fn write_text(&self, text: &str) -> LocalBoxFuture<'static, Result<(), ClipboardError>>;
}

/// `navigator.clipboard.writeText`, looked up dynamically so a webview without
/// the async clipboard API fails the write instead of trapping.
pub(crate) struct BrowserClipboard;

impl BrowserClipboard {
    fn write_promise(text: &str) -> Result<js_sys::Promise, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let clipboard = js_sys::Reflect::get(&window.navigator(), &"clipboard".into())?;
        if clipboard.is_undefined() || clipboard.is_null() {
            return Err(JsValue::from_str("clipboard unavailable"));
        }
        let write = js_sys::Reflect::get(&clipboard, &"writeText".into())?
            .dyn_into::<js_sys::Function>()?;
        write
            .call1(&clipboard, &JsValue::from_str(text))?
            .dyn_into::<js_sys::Promise>()
    }
}

fn js_error_message(e: &JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

impl Clipboard for BrowserClipboard {
    fn write_text(&self, text: &str) -> LocalBoxFuture<'static, Result<(), ClipboardError>> {
        let promise = Self::write_promise(text);
        async move {
            let promise = promise.map_err(|e| ClipboardError(js_error_message(&e)))?;
            wasm_bindgen_futures::JsFuture::from(promise)
                .await
                .map(|_| ())
                .map_err(|e| ClipboardError(js_error_message(&e)))
        }
        .boxed_local()
    }
}

/// Notifier that only logs.
pub(crate) struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            crate::models::NotificationKind::Info => log!("{}", notification.message),
            crate::models::NotificationKind::Error => error!("{}", notification.message),
        }
    }
}
