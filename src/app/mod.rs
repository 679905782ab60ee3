use crate::api::ApiClient;
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, SearchField, Spinner, ToastStack,
};
use crate::config::{apply_theme, detail_to_json, ConfigStore, ThemeApplier, CONFIG_CHANGED_EVENT};
use crate::focus::FocusTarget;
use crate::keyboard::{unknown_shortcut_names, DispatchOutcome, KeyPress, KeyboardDispatcher};
use crate::models::{AppConfig, Notification};
use crate::navigation::NavigationManager;
use crate::render::render_note_html;
use crate::runtime::BrowserEventLoop;
use crate::services::{BrowserClipboard, DialogManager, LogNotifier, Notifier};
use crate::state::{AppContext, Services};
use icons::X;
use leptos::ev;
use leptos::html;
use leptos::logging::{error, warn};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

const TOAST_MS: u64 = 4000;

#[derive(Clone, Debug, PartialEq, Eq)]
enum OpenDialog {
    Create,
    Rename(String),
    Delete,
    UnsavedChanges,
}

/// Dialog visibility lives in a signal so the overlay can render from it.
#[derive(Clone, Copy)]
struct SignalDialogs {
    open: RwSignal<Option<OpenDialog>>,
}

impl SignalDialogs {
    fn new() -> Self {
        Self {
            open: RwSignal::new(None),
        }
    }

    fn close(&self) {
        self.open.set(None);
    }
}

impl DialogManager for SignalDialogs {
    fn open_create_dialog(&self) {
        self.open.set(Some(OpenDialog::Create));
    }

    fn open_rename_dialog(&self, note_id: &str) {
        self.open.set(Some(OpenDialog::Rename(note_id.to_string())));
    }

    fn open_delete_dialog(&self) {
        self.open.set(Some(OpenDialog::Delete));
    }

    fn open_unsaved_changes_dialog(&self) {
        self.open.set(Some(OpenDialog::UnsavedChanges));
    }

    fn is_any_open(&self) -> bool {
        self.open.with_untracked(|d| d.is_some())
    }
}

/// Logs every notification and shows it as a toast for a few seconds.
#[derive(Clone, Copy)]
struct ToastNotifier {
    toasts: RwSignal<Vec<(u64, Notification)>>,
    next_id: StoredValue<u64>,
}

impl ToastNotifier {
    fn new() -> Self {
        Self {
            toasts: RwSignal::new(vec![]),
            next_id: StoredValue::new(0),
        }
    }

    fn dismiss(&self, id: u64) {
        self.toasts.update(|t| t.retain(|(i, _)| *i != id));
    }
}

impl Notifier for ToastNotifier {
    fn notify(&self, notification: Notification) {
        LogNotifier.notify(notification.clone());

        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);
        self.toasts.update(|t| t.push((id, notification)));

        let this = *self;
        set_timeout(move || this.dismiss(id), Duration::from_millis(TOAST_MS));
    }
}

fn overlay_title(dialog: Option<OpenDialog>, settings_open: bool) -> String {
    match dialog {
        Some(OpenDialog::Create) => "New note".to_string(),
        Some(OpenDialog::Rename(id)) => format!("Rename {id}"),
        Some(OpenDialog::Delete) => "Delete this note?".to_string(),
        Some(OpenDialog::UnsavedChanges) => "Discard unsaved changes?".to_string(),
        None if settings_open => "Settings".to_string(),
        None => String::new(),
    }
}

/// Replaces whatever the user typed into the article with `markup` and points
/// navigation at the fresh nodes.
fn restore_markup(
    navigation: &RefCell<NavigationManager<web_sys::Element>>,
    article: web_sys::Element,
    scroll: Option<web_sys::Element>,
    markup: &str,
) {
    article.set_inner_html(markup);
    match navigation.try_borrow_mut() {
        Ok(mut nav) => nav.attach(article, scroll),
        Err(_) => warn!("navigation busy; restored content not attached"),
    }
}

#[component]
pub fn App() -> impl IntoView {
    let dialogs = SignalDialogs::new();
    let toasts = ToastNotifier::new();
    let api = Rc::new(ApiClient::from_env());
    let config = ConfigStore::cached();

    let services = Services {
        notes: api.clone(),
        dialogs: Rc::new(dialogs),
        clipboard: Rc::new(BrowserClipboard),
        opener: api.clone(),
        notifier: Rc::new(toasts),
        runtime: Rc::new(BrowserEventLoop),
    };
    let ctx: AppContext<web_sys::Element> = AppContext::new(services, config.clone());

    // View mirrors of core state, pushed by subscriptions.
    let app_state = RwSignal::new(ctx.snapshot());
    let results = RwSignal::new(Vec::<String>::new());
    let query = RwSignal::new(String::new());
    let search_text = RwSignal::new(String::new());
    let searching = RwSignal::new(true);

    ctx.subscribe(move |s| app_state.set(s.clone()));
    {
        let search = ctx.search.clone();
        ctx.search.subscribe(move |ids| {
            results.set(ids.to_vec());
            query.set(search.query());
            searching.set(false);
        });
    }

    let theme = Rc::new(RefCell::new(ThemeApplier::default()));
    let on_config = move |cfg: &AppConfig| {
        for name in unknown_shortcut_names(&cfg.shortcuts) {
            warn!("config names an unknown shortcut action: {name}");
        }
        if let Some(request) = theme.borrow_mut().update(cfg) {
            spawn_local(async move {
                if let Err(e) = apply_theme(request).await {
                    warn!("failed to apply theme: {e:?}");
                }
            });
        }
    };
    on_config(&config.get());
    config.subscribe(on_config);

    // Backend pushes config edits as a window CustomEvent.
    let store = config.clone();
    let closure = Closure::<dyn FnMut(web_sys::CustomEvent)>::new(move |e: web_sys::CustomEvent| {
        let Some(json) = detail_to_json(&e.detail()) else {
            return;
        };
        if let Err(err) = store.apply_json(&json) {
            warn!("ignoring invalid config payload: {err}");
        }
    });
    let _ = window()
        .add_event_listener_with_callback(CONFIG_CHANGED_EVENT, closure.as_ref().unchecked_ref());
    closure.forget();

    {
        let store = config.clone();
        spawn_local(async move {
            match api.get_config().await {
                Ok(cfg) => store.replace(cfg),
                Err(e) => warn!("config fetch failed, keeping cached config: {e}"),
            }
        });
    }
    ctx.search.run_search(String::new());

    let search_ref: NodeRef<html::Input> = NodeRef::new();
    let list_ref: NodeRef<html::Div> = NodeRef::new();
    let scroll_ref: NodeRef<html::Main> = NodeRef::new();
    let content_ref: NodeRef<html::Article> = NodeRef::new();

    let dispatcher = StoredValue::new_local(KeyboardDispatcher::new(ctx.clone()));
    let ctx = StoredValue::new_local(ctx);

    Effect::new(move |_| {
        let (Some(input), Some(list), Some(scroll)) =
            (search_ref.get(), list_ref.get(), scroll_ref.get())
        else {
            return;
        };
        ctx.with_value(|c| match c.focus.try_borrow_mut() {
            Ok(mut focus) => {
                focus.set_search_input(Some(input.into()));
                focus.set_list(Some(list.into()));
                focus.set_content(Some(scroll.into()));
            }
            Err(_) => warn!("focus registry busy; panes not registered"),
        });
    });

    let rendered = Memo::new(move |_| {
        let q = query.get();
        app_state.with(|s| {
            s.content
                .as_ref()
                .map(|note| render_note_html(&note.content, &q))
                .unwrap_or_default()
        })
    });

    let attach_navigation = move || {
        let (Some(root), Some(scroll)) = (content_ref.get_untracked(), scroll_ref.get_untracked())
        else {
            return;
        };
        ctx.with_value(|c| match c.navigation.try_borrow_mut() {
            Ok(mut nav) => nav.attach(root.into(), Some(scroll.into())),
            Err(_) => warn!("navigation busy; content pane not attached"),
        });
    };

    // New markup means new elements: re-attach navigation once it is in the DOM.
    Effect::new(move |_| {
        rendered.track();
        request_animation_frame(move || {
            attach_navigation();
            ctx.with_value(|c| {
                if let Ok(focus) = c.focus.try_borrow() {
                    focus.scroll_content_to_top();
                }
            });
        });
    });

    Effect::new(move |_| {
        let text = search_text.get();
        ctx.with_value(|c| {
            if c.search.search_input() != text {
                searching.set(true);
                c.search.on_input(&text);
            }
        });
    });

    let focus_changed = move |target: FocusTarget, focused: bool| {
        ctx.with_value(|c| {
            if let Ok(mut focus) = c.focus.try_borrow_mut() {
                if focused {
                    focus.set_focused(target);
                } else {
                    focus.release(target);
                }
            }
        });
    };

    let close_overlays = move || {
        dialogs.close();
        ctx.with_value(|c| {
            if let Err(e) = c.update_state(|s| s.settings_open = false) {
                warn!("failed to close settings: {e}");
            }
        });
    };

    // `inner_html` only re-runs when the memo changes; restore edited markup by hand.
    let discard_edits = move || {
        dialogs.close();
        ctx.with_value(|c| {
            if let Err(e) = c.update_state(|s| {
                s.edit_mode = false;
                s.editor_dirty = false;
            }) {
                warn!("failed to leave edit mode: {e}");
            }
        });
        let Some(article) = content_ref.get_untracked() else {
            return;
        };
        let scroll: Option<web_sys::Element> = scroll_ref.get_untracked().map(Into::into);
        ctx.with_value(|c| {
            restore_markup(&c.navigation, article.into(), scroll, &rendered.get_untracked());
        });
    };

    let select = move |index: usize| {
        ctx.with_value(|c| {
            if let Err(e) = c.select_note(index) {
                warn!("failed to select note {index}: {e}");
            }
        });
    };

    let mark_dirty = move || {
        if app_state.with_untracked(|s| s.edit_mode && !s.editor_dirty) {
            ctx.with_value(|c| {
                if let Err(e) = c.update_state(|s| s.editor_dirty = true) {
                    warn!("failed to mark editor dirty: {e}");
                }
            });
        }
    };

    // Action errors stop here: logged, never rethrown into the DOM.
    let _key_handle = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        let key = KeyPress::from_event(&ev);
        match dispatcher.with_value(|d| d.dispatch(&key)) {
            Ok(outcome) => {
                if outcome.prevents_default() {
                    ev.prevent_default();
                }
                if outcome == DispatchOutcome::Suppressed && key.key == "Escape" {
                    close_overlays();
                }
            }
            Err(e) => error!("keyboard action failed for {}: {e}", key.combo()),
        }

        let (typed, busy) = ctx.with_value(|c| (c.search.search_input(), c.search.is_searching()));
        if search_text.with_untracked(|t| *t != typed) {
            search_text.set(typed);
        } else if !busy && searching.get_untracked() {
            // Failed searches never reach the results subscriber.
            searching.set(false);
        }
    });

    view! {
        <div class="flex h-screen w-full overflow-hidden bg-background text-foreground">
            <aside class="flex w-72 shrink-0 flex-col border-r">
                <div class="flex items-center gap-2 p-2">
                    <SearchField
                        bind_value=search_text
                        node_ref=search_ref
                        placeholder="Search notes..."
                        on_focus=move |_| focus_changed(FocusTarget::SearchInput, true)
                        on_blur=move |_| focus_changed(FocusTarget::SearchInput, false)
                    />
                    <Show when=move || searching.get()>
                        <Spinner />
                    </Show>
                </div>
                <div
                    node_ref=list_ref
                    tabindex="0"
                    class="flex-1 overflow-y-auto outline-none"
                    on:focus=move |_| focus_changed(FocusTarget::List, true)
                    on:blur=move |_| focus_changed(FocusTarget::List, false)
                >
                    <For
                        each=move || results.get().into_iter().enumerate()
                        key=|(i, id)| (*i, id.clone())
                        children=move |(i, id)| {
                            let selected = move || app_state.with(|s| s.selected_index == Some(i));
                            view! {
                                <div
                                    class="cursor-pointer truncate px-3 py-1.5 text-sm hover:bg-accent/50"
                                    class:bg-accent=selected
                                    on:click=move |_| select(i)
                                >
                                    {id}
                                </div>
                            }
                        }
                    />
                </div>
            </aside>

            <main
                node_ref=scroll_ref
                tabindex="0"
                class="relative flex-1 overflow-y-auto outline-none"
                on:focus=move |_| focus_changed(FocusTarget::Content, true)
                on:blur=move |_| focus_changed(FocusTarget::Content, false)
            >
                <Show when=move || app_state.with(|s| s.content.is_none())>
                    <div class="px-8 py-6 text-sm text-muted-foreground">"No note selected"</div>
                </Show>
                <article
                    node_ref=content_ref
                    class="note-content max-w-none px-8 py-6"
                    class:editing=move || app_state.with(|s| s.edit_mode)
                    contenteditable=move || if app_state.with(|s| s.edit_mode) { "true" } else { "false" }
                    on:input=move |_| mark_dirty()
                    inner_html=move || rendered.get()
                />
            </main>

            <Show when=move || dialogs.open.with(|d| d.is_some()) || app_state.with(|s| s.settings_open)>
                <div class="fixed inset-0 z-40 flex items-center justify-center bg-black/40">
                    <div class="w-96 rounded-lg border bg-background p-4 shadow-lg">
                        <div class="flex items-center justify-between gap-2">
                            <h3 class="text-sm font-semibold">
                                {move || overlay_title(dialogs.open.get(), app_state.with(|s| s.settings_open))}
                            </h3>
                            <Button variant=ButtonVariant::Ghost size=ButtonSize::Icon on:click=move |_| close_overlays()>
                                <X />
                            </Button>
                        </div>
                        <Show when=move || dialogs.open.with(|d| *d == Some(OpenDialog::UnsavedChanges))>
                            <div class="mt-4 flex justify-end gap-2">
                                <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| close_overlays()>
                                    "Keep editing"
                                </Button>
                                <Button variant=ButtonVariant::Destructive size=ButtonSize::Sm on:click=move |_| discard_edits()>
                                    "Discard"
                                </Button>
                            </div>
                        </Show>
                    </div>
                </div>
            </Show>

            <ToastStack>
                <For
                    each=move || toasts.toasts.get()
                    key=|(id, _)| *id
                    children=move |(id, notification)| {
                        view! {
                            <Alert kind=notification.kind>
                                <AlertDescription class="flex-1">{notification.message}</AlertDescription>
                                <button class="opacity-60 hover:opacity-100" on:click=move |_| toasts.dismiss(id)>
                                    <X class="size-3.5" />
                                </button>
                            </Alert>
                        }
                    }
                />
            </ToastStack>
        </div>
    }
}
