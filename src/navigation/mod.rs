//! Content navigation over the rendered note.
//!
//! Three independent axes share one manager:
//! - the primary axis (`NavigationMode`): headers, search highlights, or
//!   links; the mode is one field so these are mutually exclusive
//! - code blocks, with their own index and current element
//! - links, with their own index and current element; entering link
//!   navigation resets the primary axis first
//!
//! Element lists are re-queried from the live DOM on every move.

mod accordion;
mod escape;
mod links;
mod section;

pub(crate) use escape::{EscapeOutcome, SearchSnapshot};
pub(crate) use links::LinkTarget;
pub(crate) use section::copy_current_section;

use crate::dom::{
    get_code_blocks, get_headers, get_highlights, ContentElement, CODE_BLOCK_CURRENT_CLASS,
    HEADER_CURRENT_CLASS, HIGHLIGHTS_HIDDEN_CLASS, HIGHLIGHT_CURRENT_CLASS, LINK_CURRENT_CLASS,
};

/// Fraction of the container height left above a navigated element.
const SCROLL_ANCHOR: f64 = 0.25;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum NavigationMode {
    #[default]
    Inactive,
    Highlights,
    Headers,
    Links,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum HighlightVisibility {
    #[default]
    Visible,
    Hidden,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Next,
    Previous,
}

#[derive(Clone, Debug)]
pub(crate) struct NavigationState<E> {
    pub current_index: Option<usize>,
    pub mode: NavigationMode,
    pub highlight_visibility: HighlightVisibility,
    pub current_element: Option<E>,

    pub code_block_index: Option<usize>,
    pub code_block_element: Option<E>,

    pub link_index: Option<usize>,
    pub link_element: Option<E>,

    /// Headers collapsed by the accordion; rebuilt on every header move.
    pub collapsed_sections: Vec<E>,
}

impl<E> Default for NavigationState<E> {
    fn default() -> Self {
        Self {
            current_index: None,
            mode: NavigationMode::Inactive,
            highlight_visibility: HighlightVisibility::Visible,
            current_element: None,
            code_block_index: None,
            code_block_element: None,
            link_index: None,
            link_element: None,
            collapsed_sections: vec![],
        }
    }
}

pub(crate) struct NavigationManager<E> {
    state: NavigationState<E>,
    root: Option<E>,
    scroll_container: Option<E>,
}

impl<E> Default for NavigationManager<E> {
    fn default() -> Self {
        Self {
            state: NavigationState::default(),
            root: None,
            scroll_container: None,
        }
    }
}

/// Clamped step, never wraps. An unset index always lands on 0.
pub(crate) fn step_index(current: Option<usize>, len: usize, direction: Direction) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let last = len - 1;
    Some(match (current, direction) {
        (None, _) => 0,
        (Some(i), Direction::Next) => i.saturating_add(1).min(last),
        (Some(i), Direction::Previous) => i.saturating_sub(1).min(last),
    })
}

impl<E: ContentElement> NavigationManager<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content pane mounted (or remounted with new content).
    pub fn attach(&mut self, root: E, scroll_container: Option<E>) {
        self.reset_navigation();
        self.root = Some(root);
        self.scroll_container = scroll_container;
        self.apply_highlight_visibility();
    }

    pub fn detach(&mut self) {
        self.reset_navigation();
        self.root = None;
        self.scroll_container = None;
    }

    pub fn state(&self) -> &NavigationState<E> {
        &self.state
    }

    pub fn mode(&self) -> NavigationMode {
        self.state.mode
    }

    pub fn current_index(&self) -> Option<usize> {
        self.state.current_index
    }

    pub fn highlight_visibility(&self) -> HighlightVisibility {
        self.state.highlight_visibility
    }

    pub fn has_active_link(&self) -> bool {
        self.state.mode == NavigationMode::Links && self.state.link_element.is_some()
    }

    /// Highlights when there is a query, highlights are shown and at least one
    /// mark is rendered; headers otherwise. Evaluated on every call.
    pub fn determine_navigation_mode(&self, query: &str) -> NavigationMode {
        let has_marks = self
            .root
            .as_ref()
            .is_some_and(|root| !get_highlights(root).is_empty());

        if !query.trim().is_empty()
            && self.state.highlight_visibility == HighlightVisibility::Visible
            && has_marks
        {
            NavigationMode::Highlights
        } else {
            NavigationMode::Headers
        }
    }

    pub fn navigate_next(&mut self, query: &str) {
        self.navigate_primary(query, Direction::Next);
    }

    pub fn navigate_previous(&mut self, query: &str) {
        self.navigate_primary(query, Direction::Previous);
    }

    fn navigate_primary(&mut self, query: &str, direction: Direction) {
        let Some(root) = self.root.clone() else {
            return;
        };

        let mode = self.determine_navigation_mode(query);
        if self.state.mode != mode {
            self.switch_primary_mode(mode);
        }

        let elements = match mode {
            NavigationMode::Highlights => get_highlights(&root),
            _ => get_headers(&root),
        };
        let Some(index) = step_index(self.state.current_index, elements.len(), direction) else {
            return;
        };
        self.select_primary(&root, &elements[index], index);
    }

    /// Leaves the old mode's styling behind before the new set is touched.
    fn switch_primary_mode(&mut self, mode: NavigationMode) {
        match self.state.mode {
            NavigationMode::Links => self.clear_link(),
            NavigationMode::Headers => self.clear_accordion(),
            _ => {}
        }
        self.clear_primary_current();
        self.state.current_index = None;
        self.state.mode = mode;
    }

    fn select_primary(&mut self, root: &E, el: &E, index: usize) {
        let class = match self.state.mode {
            NavigationMode::Highlights => HIGHLIGHT_CURRENT_CLASS,
            _ => HEADER_CURRENT_CLASS,
        };

        self.clear_primary_current();
        el.add_class(class);
        self.state.current_element = Some(el.clone());
        self.state.current_index = Some(index);

        if self.state.mode == NavigationMode::Headers {
            accordion::apply(root, el, &mut self.state.collapsed_sections);
        }

        self.scroll_to_element(el);
    }

    pub fn navigate_next_code_block(&mut self) {
        self.navigate_code_block(Direction::Next);
    }

    pub fn navigate_previous_code_block(&mut self) {
        self.navigate_code_block(Direction::Previous);
    }

    fn navigate_code_block(&mut self, direction: Direction) {
        let Some(root) = self.root.clone() else {
            return;
        };
        let blocks = get_code_blocks(&root);
        let Some(index) = step_index(self.state.code_block_index, blocks.len(), direction) else {
            return;
        };

        self.clear_code_block();
        let el = &blocks[index];
        el.add_class(CODE_BLOCK_CURRENT_CLASS);
        self.state.code_block_index = Some(index);
        self.state.code_block_element = Some(el.clone());
        self.scroll_to_element(el);
    }

    /// Clears all three axes and the accordion. Highlight visibility survives.
    pub fn reset_navigation(&mut self) {
        self.clear_primary_current();
        self.clear_code_block();
        self.clear_link();
        self.clear_accordion();
        self.state.current_index = None;
        self.state.mode = NavigationMode::Inactive;
    }

    pub fn hide_highlights(&mut self) {
        self.state.highlight_visibility = HighlightVisibility::Hidden;
        self.apply_highlight_visibility();
    }

    pub fn show_highlights(&mut self) {
        self.state.highlight_visibility = HighlightVisibility::Visible;
        self.apply_highlight_visibility();
    }

    /// Hides highlights and leaves highlights mode if it was active.
    pub fn clear_highlights(&mut self) {
        if self.state.mode == NavigationMode::Highlights {
            self.reset_navigation();
        }
        self.hide_highlights();
    }

    pub fn toggle_highlights(&mut self) {
        match self.state.highlight_visibility {
            HighlightVisibility::Visible => self.clear_highlights(),
            HighlightVisibility::Hidden => self.show_highlights(),
        }
    }

    /// Places `el` at 25% from the top of the scroll container.
    pub fn scroll_to_element(&self, el: &E) {
        match &self.scroll_container {
            Some(container) => {
                let top = container.scroll_offset() + (el.rect_top() - container.rect_top())
                    - SCROLL_ANCHOR * container.viewport_height();
                container.smooth_scroll_to(top);
            }
            None => el.scroll_into_view_start(),
        }
    }

    /// Scrolls by `amount` of the container height.
    pub fn scroll_by_page(&self, direction: Direction, amount: f64) {
        let Some(container) = &self.scroll_container else {
            return;
        };
        let delta = container.viewport_height() * amount;
        let top = match direction {
            Direction::Next => container.scroll_offset() + delta,
            Direction::Previous => (container.scroll_offset() - delta).max(0.0),
        };
        container.smooth_scroll_to(top);
    }

    fn apply_highlight_visibility(&self) {
        let Some(root) = &self.root else {
            return;
        };
        match self.state.highlight_visibility {
            HighlightVisibility::Visible => root.remove_class(HIGHLIGHTS_HIDDEN_CLASS),
            HighlightVisibility::Hidden => root.add_class(HIGHLIGHTS_HIDDEN_CLASS),
        }
    }

    fn clear_primary_current(&mut self) {
        if let Some(el) = self.state.current_element.take() {
            el.remove_class(HEADER_CURRENT_CLASS);
            el.remove_class(HIGHLIGHT_CURRENT_CLASS);
        }
    }

    fn clear_code_block(&mut self) {
        if let Some(el) = self.state.code_block_element.take() {
            el.remove_class(CODE_BLOCK_CURRENT_CLASS);
        }
        self.state.code_block_index = None;
    }

    fn clear_link(&mut self) {
        if let Some(el) = self.state.link_element.take() {
            el.remove_class(LINK_CURRENT_CLASS);
        }
        self.state.link_index = None;
    }

    fn clear_accordion(&mut self) {
        match &self.root {
            Some(root) => accordion::clear(root, &mut self.state.collapsed_sections),
            None => self.state.collapsed_sections.clear(),
        }
    }
}
