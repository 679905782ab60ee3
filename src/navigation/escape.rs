use super::{HighlightVisibility, NavigationManager, NavigationMode};
use crate::dom::ContentElement;
use crate::search::MIN_QUERY_CHARS;

/// What a press of Escape did. The tag strings are what the UI layer keys on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum EscapeOutcome {
    NavigationCleared,
    HighlightsCleared,
    SearchCleared,
    /// Nothing left to unwind; the caller moves focus to the search field.
    FocusSearch,
}

/// Search state the cascade reads. The cascade never mutates search itself;
/// on `SearchCleared` the caller clears the search input.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SearchSnapshot<'a> {
    pub query: &'a str,
    pub search_input: &'a str,
}

impl<E: ContentElement> NavigationManager<E> {
    /// First match wins:
    /// 1. link navigation
    /// 2. code block navigation
    /// 3. highlights mode
    /// 4. any other primary mode
    /// 5. search state (hide highlights, then clear search, then focus search)
    pub fn handle_escape(&mut self, search: SearchSnapshot<'_>) -> EscapeOutcome {
        if self.state.mode == NavigationMode::Links {
            self.reset_navigation();
            return EscapeOutcome::NavigationCleared;
        }

        if self.state.code_block_element.is_some() {
            self.clear_code_block();
            self.state.link_index = None;
            return EscapeOutcome::NavigationCleared;
        }

        match self.state.mode {
            NavigationMode::Highlights => {
                self.reset_navigation();
                self.hide_highlights();
                return EscapeOutcome::HighlightsCleared;
            }
            NavigationMode::Inactive => {}
            _ => {
                self.reset_navigation();
                return EscapeOutcome::NavigationCleared;
            }
        }

        let has_query = !search.query.trim().is_empty();
        let visible = self.state.highlight_visibility == HighlightVisibility::Visible;

        if has_query && visible {
            self.hide_highlights();
            return EscapeOutcome::HighlightsCleared;
        }

        if has_query {
            self.show_highlights();
            return EscapeOutcome::SearchCleared;
        }

        let typed = search.search_input.chars().count();
        if typed > 0 && typed < MIN_QUERY_CHARS {
            self.show_highlights();
            return EscapeOutcome::SearchCleared;
        }

        EscapeOutcome::FocusSearch
    }
}
