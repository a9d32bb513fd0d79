//! URL detection in free-form chat text.

#[cfg(test)]
mod tests;

use std::sync::LazyLock;

use fancy_regex::Regex;
use tracing::warn;

/// Scheme is required; `www.` is optional; the trailing path/query may be empty.
///
/// The word boundary after the top-level domain is ASCII-only, so a URL
/// running straight into CJK or accented text still matches.
const URL_PATTERN: &str = concat!(
    r"https?://(www\.)?[-a-zA-Z0-9:%._\+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}",
    r"(?:(?<=[A-Za-z0-9_])(?![A-Za-z0-9_])|(?<![A-Za-z0-9_])(?=[A-Za-z0-9_]))",
    r"([-a-zA-Z0-9()@:%_\+.~#?&/=]*)"
);

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(URL_PATTERN).expect("URL pattern must compile"));

/// Return every URL-shaped substring of `text` in order of appearance.
///
/// Matches are leftmost-first and non-overlapping. Duplicates are kept so
/// callers see exactly what the user typed.
#[inline]
pub fn extract_urls(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    URL_REGEX
        .find_iter(text)
        .filter_map(|found| match found {
            Ok(m) => Some(m.as_str().to_string()),
            Err(e) => {
                warn!("URL scan stopped early: {}", e);
                None
            }
        })
        .collect()
}
