use crate::dom::{
    get_headers, header_level, section_content, ContentElement, CONTENT_COLLAPSED_CLASS,
    HEADER_COLLAPSED_CLASS, HEADER_EXPANDED_CLASS,
};

/// Expands the headers on the path to `current` and collapses every other
/// section. Recomputed from scratch on each call.
///
/// A header is on the path when it is `current` or its section (content up to
/// the next same-or-higher header) contains `current`. Collapsed sections hide
/// their content but keep nested header tags visible.
pub(super) fn apply<E: ContentElement>(root: &E, current: &E, collapsed: &mut Vec<E>) {
    clear(root, collapsed);

    for header in get_headers(root) {
        let section = section_content(&header);
        let on_path = &header == current || section.contains(current);

        if on_path {
            header.add_class(HEADER_EXPANDED_CLASS);
            continue;
        }

        header.add_class(HEADER_COLLAPSED_CLASS);
        for el in section.iter().filter(|el| header_level(*el).is_none()) {
            el.add_class(CONTENT_COLLAPSED_CLASS);
        }
        collapsed.push(header);
    }
}

pub(super) fn clear<E: ContentElement>(root: &E, collapsed: &mut Vec<E>) {
    for header in get_headers(root) {
        header.remove_class(HEADER_EXPANDED_CLASS);
        header.remove_class(HEADER_COLLAPSED_CLASS);
    }
    for el in root.query_all(&format!(".{CONTENT_COLLAPSED_CLASS}")) {
        el.remove_class(CONTENT_COLLAPSED_CLASS);
    }
    collapsed.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::fake::{el, root};

    #[test]
    fn test_path_to_current_stays_expanded() {
        let intro = el("h1", "Intro");
        let intro_body = el("p", "intro body");
        let setup = el("h2", "Setup");
        let setup_body = el("p", "setup body");
        let install = el("h2", "Install");
        let install_body = el("p", "install body");
        let deep = el("h3", "Deep");
        let deep_body = el("p", "deep body");
        let other = el("h1", "Other");
        let other_body = el("p", "other body");
        let doc = root(vec![
            intro.clone(),
            intro_body.clone(),
            setup.clone(),
            setup_body.clone(),
            install.clone(),
            install_body.clone(),
            deep.clone(),
            deep_body.clone(),
            other.clone(),
            other_body.clone(),
        ]);

        let mut collapsed = vec![];
        apply(&doc, &install, &mut collapsed);

        assert!(intro.has_class(HEADER_EXPANDED_CLASS));
        assert!(install.has_class(HEADER_EXPANDED_CLASS));
        assert!(setup.has_class(HEADER_COLLAPSED_CLASS));
        assert!(deep.has_class(HEADER_COLLAPSED_CLASS));
        assert!(other.has_class(HEADER_COLLAPSED_CLASS));
        assert_eq!(collapsed, vec![setup.clone(), deep.clone(), other.clone()]);

        assert!(!intro_body.has_class(CONTENT_COLLAPSED_CLASS));
        assert!(!install_body.has_class(CONTENT_COLLAPSED_CLASS));
        assert!(setup_body.has_class(CONTENT_COLLAPSED_CLASS));
        assert!(deep_body.has_class(CONTENT_COLLAPSED_CLASS));
        assert!(other_body.has_class(CONTENT_COLLAPSED_CLASS));
        // Nested header tags are never hidden themselves.
        assert!(!deep.has_class(CONTENT_COLLAPSED_CLASS));
    }

    #[test]
    fn test_moving_recomputes_from_scratch() {
        let a = el("h2", "A");
        let a_body = el("p", "a");
        let b = el("h2", "B");
        let b_body = el("p", "b");
        let doc = root(vec![a.clone(), a_body.clone(), b.clone(), b_body.clone()]);

        let mut collapsed = vec![];
        apply(&doc, &a, &mut collapsed);
        assert!(b_body.has_class(CONTENT_COLLAPSED_CLASS));

        apply(&doc, &b, &mut collapsed);
        assert!(!b_body.has_class(CONTENT_COLLAPSED_CLASS));
        assert!(a_body.has_class(CONTENT_COLLAPSED_CLASS));
        assert!(!a.has_class(HEADER_EXPANDED_CLASS));
        assert_eq!(collapsed, vec![a.clone()]);

        clear(&doc, &mut collapsed);
        assert!(collapsed.is_empty());
        assert!(!a_body.has_class(CONTENT_COLLAPSED_CLASS));
        assert!(!a.has_class(HEADER_COLLAPSED_CLASS));
    }
}
