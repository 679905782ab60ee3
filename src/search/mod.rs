//! Debounced search input.
//!
//! Every keystroke cancels the pending debounce timer and aborts the search
//! in flight. Only the newest search may write `filtered_notes`; an older
//! request that resolves late sees its own abort flag and is dropped.

use crate::runtime::{EventLoop, TimerHandle};
use crate::services::NoteService;
use futures::future::FutureExt;
use leptos::logging::warn;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Shorter input is still debounced but commits as the empty query.
pub(crate) const MIN_QUERY_CHARS: usize = 3;

pub(crate) const DEBOUNCE_MS: i32 = 100;

/// Cooperative cancellation flag, one per search attempt.
#[derive(Clone, Default)]
struct AbortSignal(Rc<Cell<bool>>);

impl AbortSignal {
    fn abort(&self) {
        self.0.set(true);
    }

    fn is_aborted(&self) -> bool {
        self.0.get()
    }
}

#[derive(Default)]
pub(crate) struct SearchState {
    pub search_input: String,
    pub query: String,
    pub filtered_notes: Vec<String>,
    pending_timer: Option<TimerHandle>,
    request_controller: Option<AbortSignal>,
}

type ResultsListener = Box<dyn Fn(&[String])>;

/// The raw input text as it will be committed.
pub(crate) fn committed_query(search_input: &str) -> String {
    let trimmed = search_input.trim();
    if trimmed.chars().count() >= MIN_QUERY_CHARS {
        trimmed.to_string()
    } else {
        String::new()
    }
}

#[derive(Clone)]
pub(crate) struct SearchCoordinator {
    state: Rc<RefCell<SearchState>>,
    notes: Rc<dyn NoteService>,
    runtime: Rc<dyn EventLoop>,
    listeners: Rc<RefCell<Vec<ResultsListener>>>,
}

impl SearchCoordinator {
    pub fn new(notes: Rc<dyn NoteService>, runtime: Rc<dyn EventLoop>) -> Self {
        Self {
            state: Rc::new(RefCell::new(SearchState::default())),
            notes,
            runtime,
            listeners: Rc::new(RefCell::new(vec![])),
        }
    }

    pub fn search_input(&self) -> String {
        self.state.borrow().search_input.clone()
    }

    pub fn query(&self) -> String {
        self.state.borrow().query.clone()
    }

    pub fn filtered_notes(&self) -> Vec<String> {
        self.state.borrow().filtered_notes.clone()
    }

    pub fn result_count(&self) -> usize {
        self.state.borrow().filtered_notes.len()
    }

    pub fn note_at(&self, index: usize) -> Option<String> {
        self.state.borrow().filtered_notes.get(index).cloned()
    }

    pub fn is_searching(&self) -> bool {
        let s = self.state.borrow();
        s.pending_timer.is_some() || s.request_controller.is_some()
    }

    /// Called with the result list every time a search's results are applied.
    pub fn subscribe(&self, listener: impl Fn(&[String]) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    /// One keystroke. Restarts the debounce window.
    pub fn on_input(&self, text: &str) {
        self.cancel_pending();
        self.state.borrow_mut().search_input = text.to_string();

        let this = self.clone();
        let handle = self
            .runtime
            .set_timeout(DEBOUNCE_MS, Box::new(move || this.commit()));
        self.state.borrow_mut().pending_timer = Some(handle);
    }

    /// Drops input, query and any pending work, then reloads the default
    /// listing.
    pub fn clear(&self) {
        self.cancel_pending();
        {
            let mut s = self.state.borrow_mut();
            s.search_input.clear();
            s.query.clear();
        }
        self.run_search(String::new());
    }

    /// Issues a backend search for `query`, superseding the one in flight.
    pub fn run_search(&self, query: String) {
        let signal = AbortSignal::default();
        if let Some(prev) = self
            .state
            .borrow_mut()
            .request_controller
            .replace(signal.clone())
        {
            prev.abort();
        }

        let request = self.notes.search(&query);
        let this = self.clone();
        self.runtime.spawn(
            async move {
                let result = request.await;
                if signal.is_aborted() {
                    return;
                }
                this.state.borrow_mut().request_controller = None;

                match result {
                    Ok(ids) => this.apply_results(ids),
                    Err(e) => warn!("search for {query:?} failed: {e}"),
                }
            }
            .boxed_local(),
        );
    }

    fn commit(&self) {
        let query = {
            let mut s = self.state.borrow_mut();
            s.pending_timer = None;
            s.query = committed_query(&s.search_input);
            s.query.clone()
        };
        self.run_search(query);
    }

    fn cancel_pending(&self) {
        let (timer, controller) = {
            let mut s = self.state.borrow_mut();
            (s.pending_timer.take(), s.request_controller.take())
        };
        if let Some(timer) = timer {
            self.runtime.clear_timeout(timer);
        }
        if let Some(controller) = controller {
            controller.abort();
        }
    }

    fn apply_results(&self, ids: Vec<String>) {
        self.state.borrow_mut().filtered_notes = ids.clone();
        for listener in self.listeners.borrow().iter() {
            listener(&ids);
        }
    }
}
