use crate::dom::ContentElement;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum FocusTarget {
    #[default]
    None,
    SearchInput,
    Content,
    List,
}

/// References to the three focusable panes plus which one holds focus.
///
/// `focused` is kept in sync by the pane's focus/blur listeners and by the
/// imperative focus calls below.
pub(crate) struct FocusRegistry<E> {
    search_input: Option<E>,
    content: Option<E>,
    list: Option<E>,
    focused: FocusTarget,
}

impl<E> Default for FocusRegistry<E> {
    fn default() -> Self {
        Self {
            search_input: None,
            content: None,
            list: None,
            focused: FocusTarget::None,
        }
    }
}

impl<E: ContentElement> FocusRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_search_input(&mut self, el: Option<E>) {
        self.search_input = el;
    }

    pub fn set_content(&mut self, el: Option<E>) {
        self.content = el;
    }

    pub fn set_list(&mut self, el: Option<E>) {
        self.list = el;
    }

    pub fn content(&self) -> Option<&E> {
        self.content.as_ref()
    }

    pub fn focused(&self) -> FocusTarget {
        self.focused
    }

    pub fn set_focused(&mut self, target: FocusTarget) {
        self.focused = target;
    }

    /// Blur listener: only clears when `target` still owns focus.
    pub fn release(&mut self, target: FocusTarget) {
        if self.focused == target {
            self.focused = FocusTarget::None;
        }
    }

    pub fn focus_search(&mut self) -> bool {
        self.focus(FocusTarget::SearchInput)
    }

    pub fn focus_content(&mut self) -> bool {
        self.focus(FocusTarget::Content)
    }

    pub fn focus_list(&mut self) -> bool {
        self.focus(FocusTarget::List)
    }

    pub fn blur_search(&mut self) {
        if let Some(input) = &self.search_input {
            input.blur_element();
        }
        self.release(FocusTarget::SearchInput);
    }

    /// Keep the selected row visible in the result list.
    pub fn scroll_list_to(&self, index: usize) {
        if let Some(row) = self
            .list
            .as_ref()
            .and_then(|list| list.child_elements().into_iter().nth(index))
        {
            row.scroll_into_view_start();
        }
    }

    pub fn scroll_content_to_top(&self) {
        if let Some(content) = &self.content {
            content.smooth_scroll_to(0.0);
        }
    }

    fn focus(&mut self, target: FocusTarget) -> bool {
        let el = match target {
            FocusTarget::SearchInput => self.search_input.as_ref(),
            FocusTarget::Content => self.content.as_ref(),
            FocusTarget::List => self.list.as_ref(),
            FocusTarget::None => None,
        };

        let Some(el) = el else {
            return false;
        };
        el.focus_element();
        self.focused = target;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::fake::{el, root, FakeElement};

    #[test]
    fn test_focus_moves_between_panes() {
        let input = FakeElement::new("input");
        let content = FakeElement::new("div");
        let mut reg = FocusRegistry::new();
        reg.set_search_input(Some(input.clone()));
        reg.set_content(Some(content.clone()));

        assert!(reg.focus_search());
        assert!(input.is_focused());
        assert_eq!(reg.focused(), FocusTarget::SearchInput);

        assert!(reg.focus_content());
        assert_eq!(reg.focused(), FocusTarget::Content);

        // No list mounted.
        assert!(!reg.focus_list());
        assert_eq!(reg.focused(), FocusTarget::Content);
    }

    #[test]
    fn test_release_ignores_stale_blur() {
        let mut reg: FocusRegistry<FakeElement> = FocusRegistry::new();
        reg.set_focused(FocusTarget::Content);
        reg.release(FocusTarget::SearchInput);
        assert_eq!(reg.focused(), FocusTarget::Content);
        reg.release(FocusTarget::Content);
        assert_eq!(reg.focused(), FocusTarget::None);
    }

    #[test]
    fn test_scroll_list_to_row() {
        let list = root(vec![el("li", "a"), el("li", "b")]);
        let rows = list.child_elements();
        let mut reg = FocusRegistry::new();
        reg.set_list(Some(list.clone()));
        reg.scroll_list_to(1);
        assert_eq!(rows[1].into_view_calls(), 1);
        assert_eq!(rows[0].into_view_calls(), 0);
        reg.scroll_list_to(9);
    }
}
