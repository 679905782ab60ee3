use super::{step_index, Direction, NavigationManager, NavigationMode};
use crate::dom::{classify_link, get_headers, get_links, slugify, ContentElement, LinkKind, LINK_CURRENT_CLASS};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum LinkTarget {
    /// Jumped to the header at this index; navigation is now in headers mode.
    Section(usize),
    File(String),
    Url(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum LinkError {
    NoActiveLink,
    MissingUrl,
    SectionNotFound(String),
    InvalidUrl(String),
    Unsupported(String),
}

impl std::fmt::Display for LinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoActiveLink => write!(f, "No link selected"),
            Self::MissingUrl => write!(f, "Link has no URL"),
            Self::SectionNotFound(s) => write!(f, "Section not found: {s}"),
            Self::InvalidUrl(s) => write!(f, "Invalid URL: {s}"),
            Self::Unsupported(s) => write!(f, "Unsupported link format: {s}"),
        }
    }
}

impl<E: ContentElement> NavigationManager<E> {
    pub fn navigate_next_link(&mut self) {
        self.navigate_link(Direction::Next);
    }

    pub fn navigate_previous_link(&mut self) {
        self.navigate_link(Direction::Previous);
    }

    fn navigate_link(&mut self, direction: Direction) {
        let Some(root) = self.root.clone() else {
            return;
        };

        if self.state.mode != NavigationMode::Links {
            self.reset_navigation();
            self.state.mode = NavigationMode::Links;
        }

        let links = get_links(&root);
        let Some(index) = step_index(self.state.link_index, links.len(), direction) else {
            return;
        };

        if let Some(prev) = self.state.link_element.take() {
            prev.remove_class(LINK_CURRENT_CLASS);
        }
        let el = &links[index];
        el.add_class(LINK_CURRENT_CLASS);
        self.state.link_index = Some(index);
        self.state.link_element = Some(el.clone());
        self.scroll_to_element(el);
    }

    /// Resolves the current link.
    ///
    /// Section jumps are applied here. File and URL targets are returned for
    /// the caller to hand to the external opener.
    pub fn open_current_link(&mut self) -> Result<LinkTarget, LinkError> {
        let Some(link) = self.state.link_element.clone() else {
            return Err(LinkError::NoActiveLink);
        };
        let href = link.attr("href").unwrap_or_default();

        match classify_link(&href) {
            LinkKind::Empty => Err(LinkError::MissingUrl),
            LinkKind::Section(fragment) => self.jump_to_section(&fragment).map(LinkTarget::Section),
            LinkKind::File(path) => Ok(LinkTarget::File(path)),
            LinkKind::Url(url) => match reqwest::Url::parse(&url) {
                Ok(_) => Ok(LinkTarget::Url(url)),
                Err(_) => Err(LinkError::InvalidUrl(url)),
            },
            LinkKind::Unsupported => Err(LinkError::Unsupported(href)),
        }
    }

    fn jump_to_section(&mut self, fragment: &str) -> Result<usize, LinkError> {
        let not_found = || LinkError::SectionNotFound(fragment.to_string());
        let root = self.root.clone().ok_or_else(not_found)?;
        let headers = get_headers(&root);
        let index = find_section(&headers, fragment).ok_or_else(not_found)?;

        self.reset_navigation();
        self.state.mode = NavigationMode::Headers;
        self.select_primary(&root, &headers[index], index);
        Ok(index)
    }
}

/// Exact case-insensitive match on text or slug first, then a substring match
/// in either direction.
fn find_section<E: ContentElement>(headers: &[E], target: &str) -> Option<usize> {
    let target = target.trim().to_lowercase();
    if target.is_empty() {
        return None;
    }
    let target_slug = slugify(&target);

    let keys: Vec<(String, String)> = headers
        .iter()
        .map(|h| {
            let text = h.text().trim().to_lowercase();
            (slugify(&text), text)
        })
        .collect();

    let exact = keys
        .iter()
        .position(|(slug, text)| *text == target || (!slug.is_empty() && *slug == target_slug));
    if exact.is_some() {
        return exact;
    }

    keys.iter().position(|(slug, text)| {
        let by_text = !text.is_empty() && (text.contains(&target) || target.contains(text.as_str()));
        let by_slug = !slug.is_empty()
            && !target_slug.is_empty()
            && (slug.contains(&target_slug) || target_slug.contains(slug.as_str()));
        by_text || by_slug
    })
}
