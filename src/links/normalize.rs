use crate::links::table::LinkTable;
use std::collections::HashSet;
use url::Url;

/// Ellipsis that truncated link texts leak into hrefs
pub const ELLIPSIS: char = '\u{2026}';

/// Flattens a link table into the list of links worth requesting
///
/// # Normalization Steps
///
/// 1. Walk every entry in table order, every link in entry order
/// 2. Keep links starting with `http` that do not point at `//localhost`
/// 3. Remove every ellipsis character
/// 4. Keep the first occurrence of each resulting link
///
/// The output depends only on the table's contents and order.
///
/// # Examples
///
/// ```
/// use article_linkcheck::links::{normalize, LinkTable};
///
/// let mut table = LinkTable::new();
/// table.insert("Post", "https://example.com/a");
/// table.insert("Post", "/relative");
/// table.insert("Other", "https://example.com/a");
/// assert_eq!(normalize(&table), vec!["https://example.com/a"]);
/// ```
pub fn normalize(table: &LinkTable) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::new();

    for (_, entry) in table.iter() {
        for link in entry.links() {
            if !is_requestable(link) {
                continue;
            }
            let cleaned = link.replace(ELLIPSIS, "");
            if seen.insert(cleaned.clone()) {
                normalized.push(cleaned);
            }
        }
    }

    tracing::debug!(
        "Reduced {} links to {} requestable links",
        table.total_links(),
        normalized.len()
    );

    normalized
}

/// Returns true for absolute http(s) links not pointing at localhost
fn is_requestable(link: &str) -> bool {
    link.starts_with("http") && !link.contains("//localhost")
}

/// Percent-decodes a link, leaving it as-is when it does not decode to UTF-8
pub fn decode_link(link: &str) -> String {
    urlencoding::decode(link)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| link.to_string())
}

/// Decodes a raw href and strips one trailing `?`, `#` or ellipsis
pub fn trim_href(href: &str) -> String {
    let mut decoded = decode_link(href);
    if decoded.ends_with(['?', '#', ELLIPSIS]) {
        decoded.pop();
    }
    decoded
}

/// Makes a trimmed href absolute against the page it was found on
///
/// Absolute hrefs (any scheme) and hrefs that fail to parse for reasons
/// other than being relative are returned unchanged.
pub fn resolve_href(href: &str, base: &Url) -> String {
    if href.is_empty() {
        return String::new();
    }

    match Url::parse(href) {
        Err(url::ParseError::RelativeUrlWithoutBase) => base
            .join(href)
            .map(|url| decode_link(url.as_str()))
            .unwrap_or_else(|_| href.to_string()),
        _ => href.to_string(),
    }
}

/// Key used to correlate a verified link back to its scan results
pub fn correlation_key(link: &str) -> String {
    decode_link(link).replace(ELLIPSIS, "")
}
