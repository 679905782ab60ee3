use super::{
    ChildNode, ContentElement, CODE_BLOCK_SELECTOR, HEADER_SELECTOR, HIGHLIGHT_SELECTOR,
    LINK_SELECTOR,
};

const URL_PREFIXES: &[&str] = &["http://", "https://", "mailto:", "tel:", "ftp://", "ftps://"];

const FILE_EXTENSIONS: &[&str] = &[
    "md", "markdown", "txt", "pdf", "png", "jpg", "jpeg", "gif", "svg", "webp", "html", "json",
    "csv", "doc", "docx", "xls", "xlsx", "zip",
];

pub(crate) fn get_headers<E: ContentElement>(root: &E) -> Vec<E> {
    root.query_all(HEADER_SELECTOR)
}

pub(crate) fn get_highlights<E: ContentElement>(root: &E) -> Vec<E> {
    root.query_all(HIGHLIGHT_SELECTOR)
}

pub(crate) fn get_code_blocks<E: ContentElement>(root: &E) -> Vec<E> {
    root.query_all(CODE_BLOCK_SELECTOR)
}

pub(crate) fn get_links<E: ContentElement>(root: &E) -> Vec<E> {
    root.query_all(LINK_SELECTOR)
}

/// `Some(1..=6)` for `h1`..`h6`.
pub(crate) fn header_level<E: ContentElement>(el: &E) -> Option<u8> {
    let tag = el.tag();
    let digit = tag.strip_prefix('h')?;
    match digit.parse::<u8>() {
        Ok(n @ 1..=6) => Some(n),
        _ => None,
    }
}

/// Siblings after `header` up to (not including) the next header of the same
/// or a higher level. Nested, deeper headers are part of the section.
pub(crate) fn section_content<E: ContentElement>(header: &E) -> Vec<E> {
    let Some(level) = header_level(header) else {
        return vec![];
    };

    let mut out = vec![];
    let mut next = header.next_sibling_element();
    while let Some(el) = next {
        if header_level(&el).is_some_and(|l| l <= level) {
            break;
        }
        next = el.next_sibling_element();
        out.push(el);
    }
    out
}

/// Plain text of `el`, reconstructing bullets and numbering for lists.
pub(crate) fn formatted_text<E: ContentElement>(el: &E) -> String {
    match el.tag().as_str() {
        "ul" | "ol" => format_list(el, 0),
        "li" => format_item(el, "- ", 0),
        _ => el.text().trim().to_string(),
    }
}

fn format_list<E: ContentElement>(list: &E, depth: usize) -> String {
    let ordered = list.tag() == "ol";
    let start = list
        .attr("start")
        .and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(1);

    list.child_elements()
        .into_iter()
        .filter(|c| c.tag() == "li")
        .enumerate()
        .map(|(i, item)| {
            let marker = if ordered {
                format!("{}. ", start + i)
            } else {
                "- ".to_string()
            };
            format_item(&item, &marker, depth)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_item<E: ContentElement>(item: &E, marker: &str, depth: usize) -> String {
    let mut own = String::new();
    let mut nested = vec![];
    for child in item.contents() {
        match child {
            ChildNode::Text(t) => own.push_str(&t),
            ChildNode::Element(e) => match e.tag().as_str() {
                "ul" | "ol" => nested.push(e),
                _ => own.push_str(&e.text()),
            },
        }
    }

    let own = own.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut lines = vec![format!("{}{}{}", "  ".repeat(depth), marker, own)];
    for list in nested {
        lines.push(format_list(&list, depth + 1));
    }
    lines.join("\n")
}

/// Lowercase, whitespace collapsed to `-`, punctuation dropped.
pub(crate) fn slugify(text: &str) -> String {
    let mut slug = String::new();
    for c in text.trim().to_lowercase().chars() {
        if c.is_alphanumeric() || c == '_' {
            slug.push(c);
        } else if (c.is_whitespace() || c == '-') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum LinkKind {
    Empty,
    /// Fragment without the leading `#`, percent-decoded.
    Section(String),
    File(String),
    Url(String),
    Unsupported,
}

pub(crate) fn classify_link(href: &str) -> LinkKind {
    let href = href.trim();
    if href.is_empty() {
        return LinkKind::Empty;
    }

    if let Some(fragment) = href.strip_prefix('#') {
        let decoded = urlencoding::decode(fragment)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| fragment.to_string());
        return LinkKind::Section(decoded);
    }

    if let Some(path) = file_target(href) {
        return LinkKind::File(path);
    }

    let lower = href.to_ascii_lowercase();
    if URL_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return LinkKind::Url(href.to_string());
    }

    LinkKind::Unsupported
}

fn file_target(href: &str) -> Option<String> {
    if let Some(rest) = href.strip_prefix("file://") {
        return Some(decode(rest));
    }
    if has_scheme(href) {
        return None;
    }

    let bytes = href.as_bytes();
    let windows_drive = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/');

    let path_like = href.starts_with('/')
        || href.starts_with("./")
        || href.starts_with("../")
        || href.starts_with("~/")
        || windows_drive;

    let path_part = href.split(['?', '#']).next().unwrap_or(href);
    let known_extension = path_part
        .rsplit_once('.')
        .map(|(stem, ext)| !stem.is_empty() && FILE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);

    (path_like || known_extension).then(|| decode(path_part))
}

/// `scheme:` with a scheme of two or more characters (so `C:\` is a path).
fn has_scheme(href: &str) -> bool {
    match href.split_once(':') {
        Some((scheme, _)) => {
            scheme.len() > 1
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        }
        None => false,
    }
}

fn decode(s: &str) -> String {
    urlencoding::decode(s)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::fake::{el, root, FakeElement};

    #[test]
    fn test_queries_return_document_order() {
        let doc = root(vec![
            el("h1", "A"),
            el("p", "x").with_child(el("mark", "m1")),
            el("h2", "B"),
            el("pre", "code"),
            FakeElement::new("p").with_child(el("a", "link").with_attr("href", "#b")),
            el("mark", "m2"),
        ]);

        let headers: Vec<String> = get_headers(&doc).iter().map(|h| h.text()).collect();
        assert_eq!(headers, vec!["A", "B"]);
        assert_eq!(get_highlights(&doc).len(), 2);
        assert_eq!(get_code_blocks(&doc).len(), 1);
        assert_eq!(get_links(&doc)[0].attr("href").as_deref(), Some("#b"));
    }

    #[test]
    fn test_header_level() {
        assert_eq!(header_level(&el("h3", "x")), Some(3));
        assert_eq!(header_level(&el("p", "x")), None);
        assert_eq!(header_level(&el("hr", "")), None);
    }

    #[test]
    fn test_section_content_stops_at_same_or_higher_level() {
        let intro = el("h2", "Intro");
        let _doc = root(vec![
            intro.clone(),
            el("p", "one"),
            el("h3", "Nested"),
            el("p", "two"),
            el("h2", "Next"),
            el("p", "three"),
        ]);

        let texts: Vec<String> = section_content(&intro).iter().map(|e| e.text()).collect();
        assert_eq!(texts, vec!["one", "Nested", "two"]);
    }

    #[test]
    fn test_formatted_text_lists() {
        let ul = FakeElement::new("ul")
            .with_child(el("li", "first"))
            .with_child(
                el("li", "second")
                    .with_child(FakeElement::new("ol").with_child(el("li", "inner"))),
            );
        assert_eq!(formatted_text(&ul), "- first\n- second\n  1. inner");

        let ol = FakeElement::new("ol")
            .with_attr("start", "3")
            .with_child(el("li", "c"))
            .with_child(el("li", "d"));
        assert_eq!(formatted_text(&ol), "3. c\n4. d");

        assert_eq!(formatted_text(&el("p", "  Body \n")), "Body");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Getting Started!"), "getting-started");
        assert_eq!(slugify("  A -- B "), "a-b");
    }

    #[test]
    fn test_classify_link() {
        assert_eq!(classify_link(""), LinkKind::Empty);
        assert_eq!(classify_link("   "), LinkKind::Empty);
        assert_eq!(
            classify_link("#getting%20started"),
            LinkKind::Section("getting started".to_string())
        );
        assert_eq!(
            classify_link("./notes/todo.md"),
            LinkKind::File("./notes/todo.md".to_string())
        );
        assert_eq!(
            classify_link("C:\\docs\\a.txt"),
            LinkKind::File("C:\\docs\\a.txt".to_string())
        );
        assert_eq!(
            classify_link("report.pdf"),
            LinkKind::File("report.pdf".to_string())
        );
        assert_eq!(
            classify_link("file:///tmp/a%20b.md"),
            LinkKind::File("/tmp/a b.md".to_string())
        );
        assert_eq!(
            classify_link("https://example.com/file.pdf"),
            LinkKind::Url("https://example.com/file.pdf".to_string())
        );
        assert_eq!(
            classify_link("mailto:a@b.c"),
            LinkKind::Url("mailto:a@b.c".to_string())
        );
        assert_eq!(classify_link("javascript:alert(1)"), LinkKind::Unsupported);
        assert_eq!(classify_link("just words"), LinkKind::Unsupported);
    }
}
