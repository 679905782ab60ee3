//! The action registry: `category -> action name -> function`.
//!
//! Action functions are plain `fn` pointers over the context bundle. Anything
//! async is spawned on the context's event loop; the function itself returns
//! as soon as the work is scheduled.

use crate::dom::ContentElement;
use crate::models::Notification;
use crate::navigation::{
    copy_current_section, step_index, Direction, EscapeOutcome, LinkTarget, SearchSnapshot,
};
use crate::state::{ActionResult, AppContext};
use futures::future::{FutureExt, LocalBoxFuture};
use leptos::logging::warn;
use std::collections::HashMap;

pub(crate) type ActionFn<E> = fn(&AppContext<E>) -> ActionResult;

pub(crate) struct ActionRegistry<E> {
    categories: HashMap<&'static str, HashMap<&'static str, ActionFn<E>>>,
}

impl<E: ContentElement + 'static> ActionRegistry<E> {
    pub fn new() -> Self {
        let mut registry = Self {
            categories: HashMap::new(),
        };

        let navigation: [(&'static str, ActionFn<E>); 4] = [
            ("moveUp", move_up),
            ("moveDown", move_down),
            ("moveToTop", move_to_top),
            ("moveToBottom", move_to_bottom),
        ];
        registry.register("navigation", &navigation);

        let content: [(&'static str, ActionFn<E>); 11] = [
            ("nextSection", next_section),
            ("previousSection", previous_section),
            ("nextCodeBlock", next_code_block),
            ("previousCodeBlock", previous_code_block),
            ("nextLink", next_link),
            ("previousLink", previous_link),
            ("openLink", open_link),
            ("copySection", copy_section),
            ("scrollDown", scroll_down),
            ("scrollUp", scroll_up),
            ("toggleHighlights", toggle_highlights),
        ];
        registry.register("content", &content);

        let editing: [(&'static str, ActionFn<E>); 3] = [
            ("enterEdit", enter_edit),
            ("exitEdit", exit_edit),
            ("smartExitEdit", smart_exit_edit),
        ];
        registry.register("editing", &editing);

        let notes: [(&'static str, ActionFn<E>); 5] = [
            ("createNote", create_note),
            ("deleteNote", delete_note),
            ("renameNote", rename_note),
            ("openInEditor", open_in_editor),
            ("openFolder", open_folder),
        ];
        registry.register("notes", &notes);

        let search: [(&'static str, ActionFn<E>); 3] = [
            ("handleEscape", handle_escape),
            ("focusSearch", focus_search),
            ("clearSearch", clear_search),
        ];
        registry.register("search", &search);

        let focus: [(&'static str, ActionFn<E>); 2] =
            [("focusContent", focus_content), ("focusList", focus_list)];
        registry.register("focus", &focus);

        let app: [(&'static str, ActionFn<E>); 1] = [("openSettings", open_settings)];
        registry.register("app", &app);

        registry
    }

    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self {
            categories: HashMap::new(),
        }
    }

    fn register(&mut self, category: &'static str, actions: &[(&'static str, ActionFn<E>)]) {
        let entry = self.categories.entry(category).or_default();
        for (name, f) in actions {
            entry.insert(*name, *f);
        }
    }

    /// `"category.action"` to its function.
    pub fn resolve(&self, path: &str) -> Option<ActionFn<E>> {
        let (category, action) = path.split_once('.')?;
        self.categories.get(category)?.get(action).copied()
    }
}

impl<E: ContentElement + 'static> Default for ActionRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn spawn<E>(ctx: &AppContext<E>, task: LocalBoxFuture<'static, ()>) {
    ctx.services.runtime.spawn(task);
}

// navigation

fn move_selection<E: ContentElement + 'static>(
    ctx: &AppContext<E>,
    direction: Direction,
) -> ActionResult {
    let count = ctx.search.result_count();
    let current = ctx.snapshot().selected_index;
    if let Some(index) = step_index(current, count, direction) {
        ctx.select_note(index)?;
    }
    Ok(())
}

fn move_up<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    move_selection(ctx, Direction::Previous)
}

fn move_down<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    move_selection(ctx, Direction::Next)
}

fn move_to_top<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    ctx.select_note(0)?;
    Ok(())
}

fn move_to_bottom<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    if let Some(last) = ctx.search.result_count().checked_sub(1) {
        ctx.select_note(last)?;
    }
    Ok(())
}

// content

fn next_section<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    let query = ctx.search.query();
    ctx.with_navigation(|nav| nav.navigate_next(&query))
}

fn previous_section<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    let query = ctx.search.query();
    ctx.with_navigation(|nav| nav.navigate_previous(&query))
}

fn next_code_block<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    ctx.with_navigation(|nav| nav.navigate_next_code_block())
}

fn previous_code_block<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    ctx.with_navigation(|nav| nav.navigate_previous_code_block())
}

fn next_link<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    ctx.with_navigation(|nav| nav.navigate_next_link())
}

fn previous_link<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    ctx.with_navigation(|nav| nav.navigate_previous_link())
}

/// Section jumps happen inside the navigator; files and URLs go to the
/// external opener. Every failure becomes a notification.
fn open_link<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    let target = match ctx.with_navigation(|nav| nav.open_current_link())? {
        Ok(target) => target,
        Err(e) => {
            ctx.notify_user(Notification::error(e.to_string()));
            return Ok(());
        }
    };

    let (request, what) = match target {
        LinkTarget::Section(_) => return Ok(()),
        LinkTarget::File(path) => (ctx.services.opener.open_path(&path), path),
        LinkTarget::Url(url) => (ctx.services.opener.open_url(&url), url),
    };

    let notifier = ctx.services.notifier.clone();
    spawn(
        ctx,
        async move {
            if let Err(e) = request.await {
                warn!("failed to open {what}: {e}");
                notifier.notify(Notification::error(format!("Failed to open {what}: {e}")));
            }
        }
        .boxed_local(),
    );
    Ok(())
}

fn copy_section<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    let navigation = ctx.navigation.clone();
    let clipboard = ctx.services.clipboard.clone();
    let notifier = ctx.services.notifier.clone();
    spawn(
        ctx,
        async move {
            if copy_current_section(&navigation, clipboard.as_ref()).await {
                notifier.notify(Notification::info("Section copied"));
            }
        }
        .boxed_local(),
    );
    Ok(())
}

fn scroll_down<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    let amount = ctx.config.scroll_amount();
    ctx.with_navigation(|nav| nav.scroll_by_page(Direction::Next, amount))
}

fn scroll_up<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    let amount = ctx.config.scroll_amount();
    ctx.with_navigation(|nav| nav.scroll_by_page(Direction::Previous, amount))
}

fn toggle_highlights<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    ctx.with_navigation(|nav| nav.toggle_highlights())
}

// editing

/// With a link selected, the edit key opens the link instead.
fn enter_edit<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    if ctx.with_navigation(|nav| nav.has_active_link())? {
        return open_link(ctx);
    }

    if ctx.snapshot().selected_note.is_none() || ctx.search.result_count() == 0 {
        return Ok(());
    }
    ctx.update_state(|s| s.edit_mode = true)
}

fn exit_edit<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    ctx.update_state(|s| {
        s.edit_mode = false;
        s.editor_dirty = false;
    })?;
    ctx.with_focus(|f| f.focus_content())?;
    Ok(())
}

fn smart_exit_edit<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    if ctx.snapshot().editor_dirty {
        ctx.services.dialogs.open_unsaved_changes_dialog();
        return Ok(());
    }
    exit_edit(ctx)
}

// notes

fn create_note<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    ctx.services.dialogs.open_create_dialog();
    Ok(())
}

fn delete_note<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    if ctx.snapshot().selected_note.is_some() {
        ctx.services.dialogs.open_delete_dialog();
    }
    Ok(())
}

fn rename_note<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    if let Some(note_id) = ctx.snapshot().selected_note {
        ctx.services.dialogs.open_rename_dialog(&note_id);
    }
    Ok(())
}

fn open_in_editor<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    let Some(note_id) = ctx.snapshot().selected_note else {
        return Ok(());
    };
    let request = ctx.services.notes.open_in_editor(&note_id);
    spawn_notified(ctx, request, "Failed to open in editor");
    Ok(())
}

fn open_folder<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    let Some(note_id) = ctx.snapshot().selected_note else {
        return Ok(());
    };
    let request = ctx.services.notes.open_folder(&note_id);
    spawn_notified(ctx, request, "Failed to open folder");
    Ok(())
}

fn spawn_notified<E>(
    ctx: &AppContext<E>,
    request: LocalBoxFuture<'static, crate::api::ApiResult<()>>,
    context: &'static str,
) {
    let notifier = ctx.services.notifier.clone();
    spawn(
        ctx,
        async move {
            if let Err(e) = request.await {
                warn!("{context}: {e}");
                notifier.notify(Notification::error(format!("{context}: {e}")));
            }
        }
        .boxed_local(),
    );
}

// search

/// Navigation decides what Escape means; focus is moved here, never by the
/// navigator.
fn handle_escape<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    let query = ctx.search.query();
    let search_input = ctx.search.search_input();
    let outcome = ctx.with_navigation(|nav| {
        nav.handle_escape(SearchSnapshot {
            query: &query,
            search_input: &search_input,
        })
    })?;

    match outcome {
        EscapeOutcome::SearchCleared => ctx.search.clear(),
        EscapeOutcome::FocusSearch => {
            ctx.with_focus(|f| f.focus_search())?;
        }
        EscapeOutcome::NavigationCleared | EscapeOutcome::HighlightsCleared => {}
    }
    Ok(())
}

fn focus_search<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    ctx.with_focus(|f| f.focus_search())?;
    Ok(())
}

fn clear_search<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    ctx.search.clear();
    Ok(())
}

// focus

fn focus_content<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    ctx.with_focus(|f| f.focus_content())?;
    Ok(())
}

fn focus_list<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    ctx.with_focus(|f| f.focus_list())?;
    Ok(())
}

// app

fn open_settings<E: ContentElement + 'static>(ctx: &AppContext<E>) -> ActionResult {
    ctx.update_state(|s| s.settings_open = true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::fake::{el, root, FakeElement};
    use crate::keyboard::mappings::{build_mapping, UiContext, SHORTCUT_ACTIONS};
    use crate::models::{NotificationKind, Shortcuts};
    use crate::navigation::NavigationMode;
    use crate::services::testing::FakeNotes;
    use crate::state::testing::Harness;

    fn run(h: &Harness, path: &str) {
        let registry = ActionRegistry::<FakeElement>::new();
        let action = registry.resolve(path).expect("action should resolve");
        action(&h.ctx).expect("action should succeed");
        h.event_loop.run_until_stalled();
    }

    fn listing() -> FakeNotes {
        FakeNotes::default()
            .with_results("", &["a.md", "b.md", "c.md"])
            .with_content("a.md", "# A")
            .with_content("b.md", "# B")
            .with_content("c.md", "# C")
    }

    #[test]
    fn test_every_mapped_path_resolves() {
        let registry = ActionRegistry::<FakeElement>::new();
        for context in [
            UiContext::SearchInput,
            UiContext::EditMode,
            UiContext::NoteContent,
            UiContext::Default,
        ] {
            for path in build_mapping(context, &Shortcuts::default()).values() {
                assert!(registry.resolve(path).is_some(), "{path} in {context}");
            }
        }
        for (_, path, _) in SHORTCUT_ACTIONS {
            assert!(registry.resolve(path).is_some(), "{path}");
        }
        assert!(registry.resolve("content").is_none());
        assert!(registry.resolve("content.fly").is_none());
    }

    #[test]
    fn test_move_selection_clamps_and_loads() {
        let h = Harness::new(listing());
        h.load_listing();
        assert_eq!(h.ctx.snapshot().selected_index, Some(0));

        run(&h, "navigation.moveUp");
        assert_eq!(h.ctx.snapshot().selected_index, Some(0));

        for _ in 0..5 {
            run(&h, "navigation.moveDown");
        }
        let state = h.ctx.snapshot();
        assert_eq!(state.selected_index, Some(2));
        assert_eq!(state.content.map(|c| c.id).as_deref(), Some("c.md"));
        assert_eq!(
            *h.notes.content_calls.borrow(),
            vec!["a.md".to_string(), "b.md".to_string(), "c.md".to_string()]
        );

        run(&h, "navigation.moveToTop");
        assert_eq!(h.ctx.snapshot().selected_note.as_deref(), Some("a.md"));
        run(&h, "navigation.moveToBottom");
        assert_eq!(h.ctx.snapshot().selected_note.as_deref(), Some("c.md"));
    }

    #[test]
    fn test_move_without_results_is_noop() {
        let h = Harness::new(FakeNotes::default());
        run(&h, "navigation.moveDown");
        run(&h, "navigation.moveToBottom");
        assert_eq!(h.ctx.snapshot().selected_index, None);
        assert!(h.notes.content_calls.borrow().is_empty());
    }

    #[test]
    fn test_enter_edit_requires_selection() {
        let h = Harness::new(listing());
        run(&h, "editing.enterEdit");
        assert!(!h.ctx.snapshot().edit_mode);

        h.load_listing();
        run(&h, "editing.enterEdit");
        assert!(h.ctx.snapshot().edit_mode);
    }

    #[test]
    fn test_enter_edit_opens_active_link_instead() {
        let h = Harness::new(listing());
        h.load_listing();
        let doc = root(vec![
            el("h1", "Intro"),
            el("p", "see ").with_child(el("a", "docs").with_attr("href", "https://example.com/")),
        ]);
        h.attach(&doc);

        run(&h, "content.nextLink");
        run(&h, "editing.enterEdit");

        assert!(!h.ctx.snapshot().edit_mode);
        assert_eq!(
            *h.opener.opened.borrow(),
            vec!["url:https://example.com/".to_string()]
        );
    }

    #[test]
    fn test_open_link_failures_notify() {
        let h = Harness::new(listing());
        let doc = root(vec![
            el("a", "bad").with_attr("href", "gopher://x"),
            el("a", "file").with_attr("href", "./notes/todo.md"),
        ]);
        h.attach(&doc);

        run(&h, "content.nextLink");
        run(&h, "content.openLink");
        {
            let seen = h.notifier.seen.borrow();
            assert_eq!(seen[0].kind, NotificationKind::Error);
            assert_eq!(seen[0].message, "Unsupported link format: gopher://x");
        }

        h.opener.fail.set(true);
        run(&h, "content.nextLink");
        run(&h, "content.openLink");
        assert_eq!(
            *h.opener.opened.borrow(),
            vec!["path:./notes/todo.md".to_string()]
        );
        assert_eq!(h.notifier.seen.borrow().len(), 2);
    }

    #[test]
    fn test_smart_exit_edit_branches_on_dirty() {
        let h = Harness::new(listing());
        h.ctx
            .update_state(|s| {
                s.edit_mode = true;
                s.editor_dirty = true;
            })
            .expect("update");

        run(&h, "editing.smartExitEdit");
        assert!(h.ctx.snapshot().edit_mode);
        assert_eq!(*h.dialogs.opened.borrow(), vec!["unsaved".to_string()]);

        h.ctx.update_state(|s| s.editor_dirty = false).expect("update");
        run(&h, "editing.smartExitEdit");
        assert!(!h.ctx.snapshot().edit_mode);
        assert_eq!(h.dialogs.opened.borrow().len(), 1);
    }

    #[test]
    fn test_note_dialogs_need_selection_except_create() {
        let h = Harness::new(listing());
        run(&h, "notes.deleteNote");
        run(&h, "notes.renameNote");
        run(&h, "notes.createNote");
        assert_eq!(*h.dialogs.opened.borrow(), vec!["create".to_string()]);

        h.load_listing();
        run(&h, "notes.renameNote");
        run(&h, "notes.deleteNote");
        run(&h, "notes.openInEditor");
        assert_eq!(
            *h.dialogs.opened.borrow(),
            vec!["create".to_string(), "rename:a.md".to_string(), "delete".to_string()]
        );
        assert_eq!(*h.notes.editor_calls.borrow(), vec!["editor:a.md".to_string()]);
    }

    #[test]
    fn test_handle_escape_walks_the_cascade() {
        let h = Harness::new(listing());
        let doc = root(vec![el("h1", "A"), el("h1", "B")]);
        h.attach(&doc);

        run(&h, "content.nextSection");
        assert_eq!(h.ctx.navigation.borrow().mode(), NavigationMode::Headers);

        run(&h, "search.handleEscape");
        assert_eq!(h.ctx.navigation.borrow().mode(), NavigationMode::Inactive);

        // Nothing left: focus moves to the search field (none registered here).
        run(&h, "search.handleEscape");
        assert_eq!(h.ctx.navigation.borrow().mode(), NavigationMode::Inactive);
    }

    #[test]
    fn test_handle_escape_clears_short_search_input() {
        let h = Harness::new(listing());
        h.ctx.search.on_input("ab");
        h.event_loop.advance(200);
        assert_eq!(h.ctx.search.search_input(), "ab");

        run(&h, "search.handleEscape");
        assert_eq!(h.ctx.search.search_input(), "");
    }

    #[test]
    fn test_copy_section_notifies_on_success() {
        let h = Harness::new(listing());
        let doc = root(vec![el("h2", "Title"), el("p", "Body"), el("h2", "Next")]);
        h.attach(&doc);

        run(&h, "content.nextSection");
        run(&h, "content.copySection");
        assert_eq!(h.clipboard.last().as_deref(), Some("Title\n\nBody"));
        assert_eq!(h.notifier.seen.borrow()[0], Notification::info("Section copied"));
    }

    #[test]
    fn test_scroll_uses_configured_amount() {
        let h = Harness::new(listing());
        let doc = root(vec![el("p", "x")]);
        let container = FakeElement::new("div").with_height(1000.0);
        h.ctx
            .navigation
            .borrow_mut()
            .attach(doc.clone(), Some(container.clone()));
        h.ctx
            .config
            .apply_json(r#"{"scrollAmount": 0.5}"#)
            .expect("config");

        run(&h, "content.scrollDown");
        assert_eq!(container.scroll_targets(), vec![500.0]);
    }
}
