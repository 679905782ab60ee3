//! In-memory element tree used by native tests.

use super::{ChildNode, ContentElement};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

enum FakeChild {
    Text(String),
    Element(FakeElement),
}

struct FakeNode {
    tag: String,
    attrs: RefCell<Vec<(String, String)>>,
    classes: RefCell<Vec<String>>,
    children: RefCell<Vec<FakeChild>>,
    parent: RefCell<Weak<FakeNode>>,
    top: Cell<f64>,
    height: Cell<f64>,
    scroll_top: Cell<f64>,
    scroll_targets: RefCell<Vec<f64>>,
    into_view_calls: Cell<u32>,
    focused: Cell<bool>,
}

#[derive(Clone)]
pub(crate) struct FakeElement(Rc<FakeNode>);

impl PartialEq for FakeElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for FakeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>{:?}", self.0.tag, self.text())
    }
}

impl FakeElement {
    pub fn new(tag: &str) -> Self {
        Self(Rc::new(FakeNode {
            tag: tag.to_ascii_lowercase(),
            attrs: RefCell::new(vec![]),
            classes: RefCell::new(vec![]),
            children: RefCell::new(vec![]),
            parent: RefCell::new(Weak::new()),
            top: Cell::new(0.0),
            height: Cell::new(0.0),
            scroll_top: Cell::new(0.0),
            scroll_targets: RefCell::new(vec![]),
            into_view_calls: Cell::new(0),
            focused: Cell::new(false),
        }))
    }

    pub fn with_text(self, text: &str) -> Self {
        self.0.children.borrow_mut().push(FakeChild::Text(text.to_string()));
        self
    }

    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.0
            .attrs
            .borrow_mut()
            .push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_child(self, child: FakeElement) -> Self {
        self.append(child);
        self
    }

    pub fn with_top(self, top: f64) -> Self {
        self.0.top.set(top);
        self
    }

    pub fn with_height(self, height: f64) -> Self {
        self.0.height.set(height);
        self
    }

    pub fn append(&self, child: FakeElement) {
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.children.borrow_mut().push(FakeChild::Element(child));
    }

    pub fn set_scroll_top(&self, top: f64) {
        self.0.scroll_top.set(top);
    }

    pub fn scroll_targets(&self) -> Vec<f64> {
        self.0.scroll_targets.borrow().clone()
    }

    pub fn into_view_calls(&self) -> u32 {
        self.0.into_view_calls.get()
    }

    pub fn is_focused(&self) -> bool {
        self.0.focused.get()
    }

    fn parent(&self) -> Option<FakeElement> {
        self.0.parent.borrow().upgrade().map(FakeElement)
    }

    fn collect_matching(&self, selector: &Selector, out: &mut Vec<FakeElement>) {
        for child in self.child_elements() {
            if selector.matches(&child) {
                out.push(child.clone());
            }
            child.collect_matching(selector, out);
        }
    }
}

/// Shorthand: `el("h2", "Title")`.
pub(crate) fn el(tag: &str, text: &str) -> FakeElement {
    FakeElement::new(tag).with_text(text)
}

/// A content root holding `children` in order.
pub(crate) fn root(children: Vec<FakeElement>) -> FakeElement {
    let root = FakeElement::new("div");
    for child in children {
        root.append(child);
    }
    root
}

impl ContentElement for FakeElement {
    fn tag(&self) -> String {
        self.0.tag.clone()
    }

    fn text(&self) -> String {
        let mut out = String::new();
        for child in self.0.children.borrow().iter() {
            match child {
                FakeChild::Text(t) => out.push_str(t),
                FakeChild::Element(e) => out.push_str(&e.text()),
            }
        }
        out
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.0
            .attrs
            .borrow()
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn add_class(&self, class: &str) {
        let mut classes = self.0.classes.borrow_mut();
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&self, class: &str) {
        self.0.classes.borrow_mut().retain(|c| c != class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.classes.borrow().iter().any(|c| c == class)
    }

    fn query_all(&self, selector: &str) -> Vec<Self> {
        let mut out = vec![];
        for part in selector.split(',') {
            let sel = Selector::parse(part.trim());
            let mut found = vec![];
            self.collect_matching(&sel, &mut found);
            for f in found {
                if !out.contains(&f) {
                    out.push(f);
                }
            }
        }
        // Keep document order across selector groups.
        let order = self.document_order();
        out.sort_by_key(|e| order.iter().position(|o| o == e).unwrap_or(usize::MAX));
        out
    }

    fn child_elements(&self) -> Vec<Self> {
        self.0
            .children
            .borrow()
            .iter()
            .filter_map(|c| match c {
                FakeChild::Element(e) => Some(e.clone()),
                FakeChild::Text(_) => None,
            })
            .collect()
    }

    fn contents(&self) -> Vec<ChildNode<Self>> {
        self.0
            .children
            .borrow()
            .iter()
            .map(|c| match c {
                FakeChild::Text(t) => ChildNode::Text(t.clone()),
                FakeChild::Element(e) => ChildNode::Element(e.clone()),
            })
            .collect()
    }

    fn next_sibling_element(&self) -> Option<Self> {
        let parent = self.parent()?;
        let siblings = parent.child_elements();
        let idx = siblings.iter().position(|s| s == self)?;
        siblings.get(idx + 1).cloned()
    }

    fn rect_top(&self) -> f64 {
        self.0.top.get()
    }

    fn viewport_height(&self) -> f64 {
        self.0.height.get()
    }

    fn scroll_offset(&self) -> f64 {
        self.0.scroll_top.get()
    }

    fn smooth_scroll_to(&self, top: f64) {
        // Recorded only; a smooth scroll has not landed yet.
        self.0.scroll_targets.borrow_mut().push(top);
    }

    fn scroll_into_view_start(&self) {
        self.0.into_view_calls.set(self.0.into_view_calls.get() + 1);
    }

    fn focus_element(&self) {
        self.0.focused.set(true);
    }

    fn blur_element(&self) {
        self.0.focused.set(false);
    }
}

impl FakeElement {
    fn document_order(&self) -> Vec<FakeElement> {
        let mut out = vec![];
        self.collect_matching(&Selector::any(), &mut out);
        out
    }
}

/// `tag`, `.class`, `tag.class` and `tag[attr]`; enough for the selectors
/// the core uses.
struct Selector {
    tag: Option<String>,
    class: Option<String>,
    attr: Option<String>,
}

impl Selector {
    fn any() -> Self {
        Self {
            tag: None,
            class: None,
            attr: None,
        }
    }

    fn parse(s: &str) -> Self {
        let (rest, attr) = match s.split_once('[') {
            Some((head, tail)) => (head, Some(tail.trim_end_matches(']').to_string())),
            None => (s, None),
        };
        let (tag, class) = match rest.split_once('.') {
            Some((t, c)) => (t, Some(c.to_string())),
            None => (rest, None),
        };
        Self {
            tag: (!tag.is_empty()).then(|| tag.to_ascii_lowercase()),
            class,
            attr,
        }
    }

    fn matches(&self, el: &FakeElement) -> bool {
        if let Some(tag) = &self.tag {
            if &el.0.tag != tag {
                return false;
            }
        }
        if let Some(class) = &self.class {
            if !el.has_class(class) {
                return false;
            }
        }
        if let Some(attr) = &self.attr {
            if el.attr(attr).is_none() {
                return false;
            }
        }
        true
    }
}
