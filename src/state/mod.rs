use crate::api::ApiError;
use crate::config::ConfigStore;
use crate::dom::ContentElement;
use crate::focus::FocusRegistry;
use crate::models::{LoadedNote, Notification};
use crate::navigation::NavigationManager;
use crate::runtime::EventLoop;
use crate::search::SearchCoordinator;
use crate::services::{Clipboard, DialogManager, ExternalOpener, NoteService, Notifier};
use futures::future::FutureExt;
use leptos::logging::warn;
use std::cell::RefCell;
use std::rc::Rc;

/// App-level UI state that is not owned by a manager.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct AppState {
    pub selected_index: Option<usize>,
    pub selected_note: Option<String>,
    pub edit_mode: bool,
    pub editor_dirty: bool,
    pub settings_open: bool,
    pub content: Option<LoadedNote>,
}

#[derive(Clone, Debug)]
pub(crate) enum ActionError {
    /// The named manager is already borrowed (an action re-entered dispatch).
    Busy(&'static str),
    Api(ApiError),
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy(what) => write!(f, "{what} is busy"),
            Self::Api(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ActionError {}

impl From<ApiError> for ActionError {
    fn from(e: ApiError) -> Self {
        Self::Api(e)
    }
}

pub(crate) type ActionResult = Result<(), ActionError>;

/// Collaborators injected at startup.
#[derive(Clone)]
pub(crate) struct Services {
    pub notes: Rc<dyn NoteService>,
    pub dialogs: Rc<dyn DialogManager>,
    pub clipboard: Rc<dyn Clipboard>,
    pub opener: Rc<dyn ExternalOpener>,
    pub notifier: Rc<dyn Notifier>,
    pub runtime: Rc<dyn EventLoop>,
}

type StateListener = Box<dyn Fn(&AppState)>;

/// Everything an action function can reach.
pub(crate) struct AppContext<E> {
    pub state: Rc<RefCell<AppState>>,
    pub navigation: Rc<RefCell<NavigationManager<E>>>,
    pub focus: Rc<RefCell<FocusRegistry<E>>>,
    pub search: SearchCoordinator,
    pub config: ConfigStore,
    pub services: Services,
    listeners: Rc<RefCell<Vec<StateListener>>>,
}

impl<E> Clone for AppContext<E> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            navigation: self.navigation.clone(),
            focus: self.focus.clone(),
            search: self.search.clone(),
            config: self.config.clone(),
            services: self.services.clone(),
            listeners: self.listeners.clone(),
        }
    }
}

impl<E: ContentElement + 'static> AppContext<E> {
    pub fn new(services: Services, config: ConfigStore) -> Self {
        let search = SearchCoordinator::new(services.notes.clone(), services.runtime.clone());
        let ctx = Self {
            state: Rc::new(RefCell::new(AppState::default())),
            navigation: Rc::new(RefCell::new(NavigationManager::new())),
            focus: Rc::new(RefCell::new(FocusRegistry::new())),
            search,
            config,
            services,
            listeners: Rc::new(RefCell::new(vec![])),
        };

        let on_results = ctx.clone();
        ctx.search.subscribe(move |ids| on_results.apply_search_results(ids));
        ctx
    }

    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self, listener: impl Fn(&AppState) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    pub fn update_state(&self, f: impl FnOnce(&mut AppState)) -> ActionResult {
        {
            let mut state = self
                .state
                .try_borrow_mut()
                .map_err(|_| ActionError::Busy("app state"))?;
            f(&mut state);
        }
        self.notify();
        Ok(())
    }

    pub fn with_navigation<R>(
        &self,
        f: impl FnOnce(&mut NavigationManager<E>) -> R,
    ) -> Result<R, ActionError> {
        let mut nav = self
            .navigation
            .try_borrow_mut()
            .map_err(|_| ActionError::Busy("navigation"))?;
        Ok(f(&mut nav))
    }

    pub fn with_focus<R>(
        &self,
        f: impl FnOnce(&mut FocusRegistry<E>) -> R,
    ) -> Result<R, ActionError> {
        let mut focus = self
            .focus
            .try_borrow_mut()
            .map_err(|_| ActionError::Busy("focus"))?;
        Ok(f(&mut focus))
    }

    /// A settings pane or any dialog is covering the panes.
    pub fn overlay_open(&self) -> bool {
        self.state.borrow().settings_open || self.services.dialogs.is_any_open()
    }

    pub fn notify_user(&self, notification: Notification) {
        self.services.notifier.notify(notification);
    }

    /// Selects the result at `index` and loads its content. No-op (returns
    /// `false`) when there is no note at that index.
    pub fn select_note(&self, index: usize) -> Result<bool, ActionError> {
        let Some(note_id) = self.search.note_at(index) else {
            return Ok(false);
        };

        let unchanged = {
            let state = self
                .state
                .try_borrow()
                .map_err(|_| ActionError::Busy("app state"))?;
            state.selected_index == Some(index) && state.selected_note.as_ref() == Some(&note_id)
        };
        if unchanged {
            return Ok(true);
        }

        self.update_state(|s| {
            s.selected_index = Some(index);
            s.selected_note = Some(note_id.clone());
        })?;
        self.with_focus(|f| f.scroll_list_to(index))?;
        self.load_content(note_id);
        Ok(true)
    }

    /// Fetches a note body. Overlapping loads are not cancelled; whichever
    /// completes last is what the pane shows.
    pub fn load_content(&self, note_id: String) {
        let request = self.services.notes.get_content(&note_id);
        let ctx = self.clone();
        self.services.runtime.spawn(
            async move {
                match request.await {
                    Ok(content) => {
                        if let Ok(mut nav) = ctx.navigation.try_borrow_mut() {
                            nav.reset_navigation();
                        }
                        let loaded = LoadedNote {
                            id: note_id,
                            content,
                        };
                        if let Err(e) = ctx.update_state(|s| s.content = Some(loaded)) {
                            warn!("dropping loaded content: {e}");
                        }
                    }
                    Err(e) => {
                        warn!("failed to load note {note_id}: {e}");
                        ctx.notify_user(Notification::error(format!(
                            "Failed to load note: {e}"
                        )));
                    }
                }
            }
            .boxed_local(),
        );
    }

    /// New results: select the first one and show highlights for the new
    /// query.
    fn apply_search_results(&self, ids: &[String]) {
        if let Ok(mut nav) = self.navigation.try_borrow_mut() {
            nav.show_highlights();
        }

        let result = if ids.is_empty() {
            self.update_state(|s| {
                s.selected_index = None;
                s.selected_note = None;
                s.content = None;
            })
        } else {
            self.select_note(0).map(|_| ())
        };
        if let Err(e) = result {
            warn!("failed to apply search results: {e}");
        }
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        for listener in self.listeners.borrow().iter() {
            listener(&snapshot);
        }
    }
}
