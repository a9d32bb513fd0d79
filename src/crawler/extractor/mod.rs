
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_TITLE: &str = "No title available";
pub const DEFAULT_DESCRIPTION: &str = "No description available";
pub const DEFAULT_SNIPPET_LENGTH: usize = 300;

/// Metadata pulled out of one fetched page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedPage {
    /// The URL exactly as it appeared in the user's message
    pub url: String,
    /// Trimmed `<title>` text, or [`DEFAULT_TITLE`]
    pub title: String,
    /// `<meta name="description">` content, or [`DEFAULT_DESCRIPTION`]
    pub description: String,
    /// Whitespace-collapsed visible body text, cut to the configured length
    pub snippet: String,
}

/// Extract title, description and a body snippet from an HTML document
#[inline]
pub fn extract_page(url: &str, html: &str, snippet_length: usize) -> ScrapedPage {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let description = extract_description(&document);
    let snippet = truncate_chars(&collapse_whitespace(&body_text(document)), snippet_length);

    debug!(
        "Extracted page {}: title='{}', {} snippet chars",
        url,
        title,
        snippet.chars().count()
    );

    ScrapedPage {
        url: url.to_string(),
        title,
        description,
        snippet,
    }
}

fn extract_title(document: &Html) -> String {
    let selector = Selector::parse("title").expect("valid selector");

    document
        .select(&selector)
        .next()
        .map(|title| title.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

fn extract_description(document: &Html) -> String {
    let selector = Selector::parse(r#"meta[name="description"]"#).expect("valid selector");

    document
        .select(&selector)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .filter(|content| !content.is_empty())
        .map_or_else(|| DEFAULT_DESCRIPTION.to_string(), str::to_string)
}

/// Concatenated text of `<body>` with non-rendered elements removed
fn body_text(mut document: Html) -> String {
    let hidden_selector =
        Selector::parse("script, style, noscript, template").expect("valid selector");
    let body_selector = Selector::parse("body").expect("valid selector");

    // The selection borrows the tree, so collect ids before detaching
    let hidden_node_ids: Vec<_> = document
        .select(&hidden_selector)
        .map(|element| element.id())
        .collect();

    for node_id in hidden_node_ids {
        if let Some(mut node) = document.tree.get_mut(node_id) {
            node.detach();
        }
    }

    document
        .select(&body_selector)
        .next()
        .map(|body| body.text().collect::<String>())
        .unwrap_or_default()
}

/// Collapse every run of whitespace into a single space and trim both ends
#[inline]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep at most `max_chars` characters, never splitting a code point
#[inline]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
