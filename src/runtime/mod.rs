//! Timers and local task spawning.
//!
//! The core only schedules through [`EventLoop`], so debounce timing and
//! out-of-order completions can be driven deterministically in tests.

use futures::future::LocalBoxFuture;
use wasm_bindgen::JsCast;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TimerHandle(pub i32);

pub(crate) trait EventLoop {
    fn set_timeout(&self, delay_ms: i32, callback: Box<dyn FnOnce()>) -> TimerHandle;
    fn clear_timeout(&self, handle: TimerHandle);
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

/// `window.setTimeout` plus `leptos::task::spawn_local`.
pub(crate) struct BrowserEventLoop;

impl EventLoop for BrowserEventLoop {
    fn set_timeout(&self, delay_ms: i32, callback: Box<dyn FnOnce()>) -> TimerHandle {
        let Some(win) = web_sys::window() else {
            return TimerHandle(0);
        };

        let cb = wasm_bindgen::closure::Closure::once_into_js(move || callback());
        let tid = win
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                delay_ms,
            )
            .unwrap_or(0);
        TimerHandle(tid)
    }

    fn clear_timeout(&self, handle: TimerHandle) {
        if let Some(win) = web_sys::window() {
            win.clear_timeout_with_handle(handle.0);
        }
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        leptos::task::spawn_local(task);
    }
}
