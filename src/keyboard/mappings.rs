//! Per-context key tables.
//!
//! Tables are rebuilt from the live shortcut config on every dispatch, so an
//! edited shortcut applies on the next keypress.

use crate::models::Shortcuts;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub(crate) enum UiContext {
    SearchInput,
    EditMode,
    NoteContent,
    Default,
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct UiFlags {
    pub search_focused: bool,
    pub edit_mode: bool,
    pub content_focused: bool,
    pub has_results: bool,
}

impl UiContext {
    /// First match wins. With nothing focused and no results there is no
    /// table at all.
    pub fn resolve(flags: UiFlags) -> Option<Self> {
        if flags.search_focused {
            Some(Self::SearchInput)
        } else if flags.edit_mode {
            Some(Self::EditMode)
        } else if flags.content_focused {
            Some(Self::NoteContent)
        } else if flags.has_results {
            Some(Self::Default)
        } else {
            None
        }
    }
}

/// Canonical combo -> `"category.action"`.
pub(crate) type KeyMapping = HashMap<String, String>;

const SEARCH_INPUT_KEYS: &[(&str, &str)] = &[
    ("ArrowDown", "navigation.moveDown"),
    ("ArrowUp", "navigation.moveUp"),
    ("Enter", "focus.focusContent"),
    ("Escape", "search.handleEscape"),
];

const EDIT_MODE_KEYS: &[(&str, &str)] = &[("Escape", "editing.smartExitEdit")];

const NOTE_CONTENT_KEYS: &[(&str, &str)] = &[
    ("ArrowDown", "content.scrollDown"),
    ("ArrowUp", "content.scrollUp"),
    ("Enter", "editing.enterEdit"),
    ("Escape", "search.handleEscape"),
    ("/", "search.focusSearch"),
];

const DEFAULT_KEYS: &[(&str, &str)] = &[
    ("ArrowDown", "navigation.moveDown"),
    ("ArrowUp", "navigation.moveUp"),
    ("Home", "navigation.moveToTop"),
    ("End", "navigation.moveToBottom"),
    ("Enter", "focus.focusContent"),
    ("Escape", "search.handleEscape"),
    ("/", "search.focusSearch"),
];

use UiContext::{Default as Dflt, EditMode, NoteContent, SearchInput};

const GLOBAL: &[UiContext] = &[SearchInput, NoteContent, Dflt];
const BROWSING: &[UiContext] = &[NoteContent, Dflt];

/// Configurable action name -> action path and the contexts it binds in.
/// Bare-key actions never bind in the search input.
pub(crate) const SHORTCUT_ACTIONS: &[(&str, &str, &[UiContext])] = &[
    ("createNote", "notes.createNote", GLOBAL),
    ("deleteNote", "notes.deleteNote", BROWSING),
    ("renameNote", "notes.renameNote", BROWSING),
    ("openInEditor", "notes.openInEditor", GLOBAL),
    ("openFolder", "notes.openFolder", GLOBAL),
    ("focusSearch", "search.focusSearch", GLOBAL),
    ("clearSearch", "search.clearSearch", GLOBAL),
    ("focusList", "focus.focusList", GLOBAL),
    ("enterEdit", "editing.enterEdit", BROWSING),
    ("exitEdit", "editing.exitEdit", &[EditMode]),
    ("nextSection", "content.nextSection", BROWSING),
    ("previousSection", "content.previousSection", BROWSING),
    ("nextCodeBlock", "content.nextCodeBlock", BROWSING),
    ("previousCodeBlock", "content.previousCodeBlock", BROWSING),
    ("nextLink", "content.nextLink", BROWSING),
    ("previousLink", "content.previousLink", BROWSING),
    ("openLink", "content.openLink", BROWSING),
    ("copySection", "content.copySection", BROWSING),
    ("toggleHighlights", "content.toggleHighlights", BROWSING),
    ("scrollDown", "content.scrollDown", BROWSING),
    ("scrollUp", "content.scrollUp", BROWSING),
];

/// Fixed keys first; configured shortcuts are layered on top and win on
/// conflict.
pub(crate) fn build_mapping(context: UiContext, shortcuts: &Shortcuts) -> KeyMapping {
    let fixed = match context {
        SearchInput => SEARCH_INPUT_KEYS,
        EditMode => EDIT_MODE_KEYS,
        NoteContent => NOTE_CONTENT_KEYS,
        Dflt => DEFAULT_KEYS,
    };

    let mut mapping: KeyMapping = fixed
        .iter()
        .map(|(combo, path)| (combo.to_string(), path.to_string()))
        .collect();

    for (name, path, contexts) in SHORTCUT_ACTIONS {
        if !contexts.contains(&context) {
            continue;
        }
        if let Some(combo) = shortcuts.get(name).filter(|c| !c.is_empty()) {
            mapping.insert(combo.to_string(), path.to_string());
        }
    }
    mapping
}

/// Configured names with no action behind them.
pub(crate) fn unknown_shortcut_names(shortcuts: &Shortcuts) -> Vec<String> {
    shortcuts
        .0
        .keys()
        .filter(|name| !SHORTCUT_ACTIONS.iter().any(|(n, _, _)| n == name))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(search: bool, edit: bool, content: bool, results: bool) -> UiFlags {
        UiFlags {
            search_focused: search,
            edit_mode: edit,
            content_focused: content,
            has_results: results,
        }
    }

    #[test]
    fn test_context_priority() {
        assert_eq!(UiContext::resolve(flags(true, true, true, true)), Some(SearchInput));
        assert_eq!(UiContext::resolve(flags(false, true, true, true)), Some(EditMode));
        assert_eq!(UiContext::resolve(flags(false, false, true, false)), Some(NoteContent));
        assert_eq!(UiContext::resolve(flags(false, false, false, true)), Some(Dflt));
        assert_eq!(UiContext::resolve(flags(false, false, false, false)), None);
        assert_eq!(SearchInput.to_string(), "searchInput");
    }

    #[test]
    fn test_search_input_does_not_bind_bare_letters() {
        let map = build_mapping(SearchInput, &Shortcuts::default());
        assert_eq!(map.get("ArrowDown").map(String::as_str), Some("navigation.moveDown"));
        assert_eq!(map.get("Ctrl+n").map(String::as_str), Some("notes.createNote"));
        assert!(map.get("j").is_none());
        assert!(map.get("Tab").is_none());
    }

    #[test]
    fn test_user_override_replaces_default_combo() {
        let mut shortcuts = Shortcuts::default();
        shortcuts.0.insert("nextSection".to_string(), "n".to_string());

        let map = build_mapping(NoteContent, &shortcuts);
        assert_eq!(map.get("n").map(String::as_str), Some("content.nextSection"));
        assert!(map.get("j").is_none());
        assert_eq!(map.get("k").map(String::as_str), Some("content.previousSection"));
    }

    #[test]
    fn test_edit_mode_table_is_minimal() {
        let map = build_mapping(EditMode, &Shortcuts::default());
        assert_eq!(map.get("Escape").map(String::as_str), Some("editing.smartExitEdit"));
        assert_eq!(map.get("Ctrl+Enter").map(String::as_str), Some("editing.exitEdit"));
        assert!(map.get("e").is_none());
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_unknown_shortcut_names() {
        let mut shortcuts = Shortcuts::default();
        assert!(unknown_shortcut_names(&shortcuts).is_empty());
        shortcuts.0.insert("launchRocket".to_string(), "r".to_string());
        assert_eq!(unknown_shortcut_names(&shortcuts), vec!["launchRocket".to_string()]);
    }
}
