use super::{NavigationManager, NavigationMode};
use crate::dom::{formatted_text, section_content, ContentElement};
use crate::services::Clipboard;
use leptos::logging::warn;
use std::cell::RefCell;

impl<E: ContentElement> NavigationManager<E> {
    /// Text for "copy current section", by active axis:
    /// - current code block: its raw text
    /// - highlights mode: the current mark's formatted text
    /// - headers mode: the header plus its section, blocks joined by a blank line
    pub fn current_section_text(&self) -> Option<String> {
        if let Some(block) = &self.state.code_block_element {
            return Some(block.text());
        }

        let current = self.state.current_element.as_ref()?;
        match self.state.mode {
            NavigationMode::Highlights => Some(formatted_text(current)),
            NavigationMode::Headers => {
                let mut parts = vec![current.text().trim().to_string()];
                parts.extend(
                    section_content(current)
                        .iter()
                        .map(formatted_text)
                        .filter(|t| !t.is_empty()),
                );
                Some(parts.join("\n\n"))
            }
            _ => None,
        }
    }
}

/// Copies the current section to the clipboard. Never fails loudly: a missing
/// section or a rejected clipboard write both yield `false`.
///
/// The manager borrow is released before the clipboard write is awaited.
pub(crate) async fn copy_current_section<E: ContentElement>(
    nav: &RefCell<NavigationManager<E>>,
    clipboard: &dyn Clipboard,
) -> bool {
    let text = match nav.try_borrow() {
        Ok(nav) => nav.current_section_text(),
        Err(_) => None,
    };
    let Some(text) = text else {
        return false;
    };

    match clipboard.write_text(&text).await {
        Ok(()) => true,
        Err(e) => {
            warn!("copy section failed: {e}");
            false
        }
    }
}
