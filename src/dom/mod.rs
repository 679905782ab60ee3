//! DOM seam for the content pane.
//!
//! Navigation never caches element lists: every move re-queries the live
//! tree through [`ContentElement`]. The browser implementation is
//! `web_sys::Element`; tests use the in-memory tree in `fake`.

mod query;

#[cfg(test)]
pub(crate) mod fake;

pub(crate) use query::{
    classify_link, formatted_text, get_code_blocks, get_headers, get_highlights, get_links,
    header_level, section_content, slugify, LinkKind,
};

use wasm_bindgen::JsCast;

pub(crate) const HEADER_SELECTOR: &str = "h1, h2, h3, h4, h5, h6";
pub(crate) const HIGHLIGHT_SELECTOR: &str = "mark";
pub(crate) const CODE_BLOCK_SELECTOR: &str = "pre";
pub(crate) const LINK_SELECTOR: &str = "a";

pub(crate) const HIGHLIGHT_CURRENT_CLASS: &str = "highlight-current";
pub(crate) const HEADER_CURRENT_CLASS: &str = "header-current";
pub(crate) const CODE_BLOCK_CURRENT_CLASS: &str = "code-block-current";
pub(crate) const LINK_CURRENT_CLASS: &str = "link-current";
pub(crate) const HEADER_EXPANDED_CLASS: &str = "header-expanded";
pub(crate) const HEADER_COLLAPSED_CLASS: &str = "header-collapsed";
pub(crate) const CONTENT_COLLAPSED_CLASS: &str = "content-collapsed";
pub(crate) const HIGHLIGHTS_HIDDEN_CLASS: &str = "highlights-hidden";

/// A direct child of an element: either raw text or a nested element.
#[derive(Clone, Debug)]
pub(crate) enum ChildNode<E> {
    Text(String),
    Element(E),
}

/// The slice of the DOM API the navigation core needs.
///
/// Handles are cheap clones of a reference to a live node; equality is node
/// identity, never structural.
pub(crate) trait ContentElement: Clone + PartialEq {
    /// Lowercase tag name (`"h2"`, `"pre"`, ...).
    fn tag(&self) -> String;
    fn text(&self) -> String;
    fn attr(&self, name: &str) -> Option<String>;

    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;

    /// Descendants matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Vec<Self>;
    fn child_elements(&self) -> Vec<Self>;
    fn contents(&self) -> Vec<ChildNode<Self>>;
    fn next_sibling_element(&self) -> Option<Self>;

    /// Top edge relative to the viewport.
    fn rect_top(&self) -> f64;
    fn viewport_height(&self) -> f64;
    fn scroll_offset(&self) -> f64;
    fn smooth_scroll_to(&self, top: f64);
    fn scroll_into_view_start(&self);

    fn focus_element(&self);
    fn blur_element(&self);
}

impl ContentElement for web_sys::Element {
    fn tag(&self) -> String {
        web_sys::Element::tag_name(self).to_ascii_lowercase()
    }

    fn text(&self) -> String {
        web_sys::Node::text_content(self).unwrap_or_default()
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.get_attribute(name)
    }

    fn add_class(&self, class: &str) {
        let _ = self.class_list().add_1(class);
    }

    fn remove_class(&self, class: &str) {
        let _ = self.class_list().remove_1(class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.class_list().contains(class)
    }

    fn query_all(&self, selector: &str) -> Vec<Self> {
        let Ok(list) = self.query_selector_all(selector) else {
            return vec![];
        };

        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
            .collect()
    }

    fn child_elements(&self) -> Vec<Self> {
        let mut out = vec![];
        let mut next = self.first_element_child();
        while let Some(el) = next {
            next = el.next_element_sibling();
            out.push(el);
        }
        out
    }

    fn contents(&self) -> Vec<ChildNode<Self>> {
        let nodes = self.child_nodes();
        let mut out = vec![];
        for i in 0..nodes.length() {
            let Some(node) = nodes.item(i) else {
                continue;
            };
            match node.node_type() {
                web_sys::Node::TEXT_NODE => {
                    out.push(ChildNode::Text(node.text_content().unwrap_or_default()));
                }
                web_sys::Node::ELEMENT_NODE => {
                    if let Ok(el) = node.dyn_into::<web_sys::Element>() {
                        out.push(ChildNode::Element(el));
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.next_element_sibling()
    }

    fn rect_top(&self) -> f64 {
        self.get_bounding_client_rect().top()
    }

    fn viewport_height(&self) -> f64 {
        self.client_height() as f64
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll_top() as f64
    }

    fn smooth_scroll_to(&self, top: f64) {
        let opts = web_sys::ScrollToOptions::new();
        opts.set_top(top);
        opts.set_behavior(web_sys::ScrollBehavior::Smooth);
        self.scroll_to_with_scroll_to_options(&opts);
    }

    fn scroll_into_view_start(&self) {
        let opts = web_sys::ScrollIntoViewOptions::new();
        opts.set_block(web_sys::ScrollLogicalPosition::Start);
        self.scroll_into_view_with_scroll_into_view_options(&opts);
    }

    fn focus_element(&self) {
        if let Some(el) = self.dyn_ref::<web_sys::HtmlElement>() {
            let _ = el.focus();
        }
    }

    fn blur_element(&self) {
        if let Some(el) = self.dyn_ref::<web_sys::HtmlElement>() {
            let _ = el.blur();
        }
    }
}
