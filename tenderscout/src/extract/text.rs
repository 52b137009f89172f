//! Visible-text helpers, detail-page parsing and label fallback.

use scraper::{ElementRef, Html, Selector};

use super::models::DetailText;

const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Collapses runs of whitespace into single spaces and trims the ends.
#[must_use]
pub fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-joined text of an element, skipping script and style content.
///
/// Adjacent text nodes are always separated by a space, even when the markup
/// has none between them: `Solar<b>PV</b>` reads "Solar PV". Labels can
/// therefore differ from the raw concatenation, and word-boundary term
/// matching never sees two words glued across an inline tag.
#[must_use]
pub fn visible_text(root: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_TAGS.contains(&el.name()))
        });
        if !hidden {
            parts.push(&**text);
        }
    }
    normalize_ws(&parts.join(" "))
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next().map(visible_text)
}

/// Best-effort title and body of a detail page, without running scripts.
///
/// Title: first `h1`, else first `[role=heading]`, else `<title>`; an empty
/// heading falls back to `<title>`. Body: text of `<main>` when present,
/// otherwise of the whole document.
#[must_use]
pub fn parse_detail(body: &str) -> DetailText {
    if body.trim().is_empty() {
        return DetailText::default();
    }
    let document = Html::parse_document(body);

    let heading = first_text(&document, "h1")
        .or_else(|| first_text(&document, "[role=\"heading\"]"))
        .or_else(|| first_text(&document, "title"))
        .unwrap_or_default();
    let title = if heading.is_empty() {
        first_text(&document, "title").unwrap_or_default()
    } else {
        heading
    };

    let text = first_text(&document, "main")
        .unwrap_or_else(|| visible_text(document.root_element()));

    DetailText { title, body: text }
}

/// Label for an opportunity when no detail title is available.
///
/// The link text wins unless it is empty or one of the site's generic
/// labels ("details", "view tender", ...). Then the last path segment of
/// the URL is used, and finally `Untitled`.
#[must_use]
pub fn label_for(url: &str, link_text: &str, generic_labels: &[String]) -> String {
    let text = link_text.trim();
    let is_generic = generic_labels
        .iter()
        .any(|generic| generic.eq_ignore_ascii_case(text));
    if !text.is_empty() && !is_generic {
        return text.to_string();
    }

    url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.rfind(|s| !s.is_empty()).map(String::from))
        })
        .unwrap_or_else(|| "Untitled".to_string())
}
