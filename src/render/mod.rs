use crate::search::MIN_QUERY_CHARS;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

pub(crate) const SEARCH_MARK_OPEN: &str = r#"<mark class="search-highlight">"#;

/// Markdown to HTML. Occurrences of `query` in prose (not in code) are wrapped
/// in `<mark>` so the navigator can step through them. Matching ignores ASCII
/// case.
///
/// Raw HTML in the note is escaped and shown as text; the only markup not
/// produced by markdown itself is the search marks.
pub(crate) fn render_note_html(markdown: &str, query: &str) -> String {
    let query = query.trim();
    let needle = (query.chars().count() >= MIN_QUERY_CHARS).then(|| query.to_ascii_lowercase());

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut in_code = false;
    let mut events = Vec::new();
    for event in Parser::new_ext(markdown, options).map(escape_raw_html) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => {
                in_code = true;
                events.push(event);
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code = false;
                events.push(event);
            }
            Event::Text(text) if !in_code => match &needle {
                Some(needle) => push_marked(&mut events, text, needle),
                None => events.push(Event::Text(text)),
            },
            other => events.push(other),
        }
    }

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

fn escape_raw_html(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    }
}

fn push_marked<'a>(events: &mut Vec<Event<'a>>, text: CowStr<'a>, needle: &str) {
    let lower = text.to_ascii_lowercase();
    if !lower.contains(needle) {
        events.push(Event::Text(text));
        return;
    }

    let mut last = 0;
    for (start, _) in lower.match_indices(needle) {
        let end = start + needle.len();
        if start > last {
            events.push(Event::Text(CowStr::from(text[last..start].to_string())));
        }
        events.push(Event::InlineHtml(CowStr::Borrowed(SEARCH_MARK_OPEN)));
        events.push(Event::Text(CowStr::from(text[start..end].to_string())));
        events.push(Event::InlineHtml(CowStr::Borrowed("</mark>")));
        last = end;
    }
    if last < text.len() {
        events.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}
