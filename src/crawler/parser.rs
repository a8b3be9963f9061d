//! HTML query adapter
//!
//! The crawler only ever asks three things of a parsed page:
//! - `find`: the first element matching a [`Level`]
//! - `find_all`: every element matching a [`Level`]
//! - `anchors_of`: the `(text, href)` pairs inside a matched element
//!
//! Everything else about the document stays behind [`PageDocument`].

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// An HTML element class identified by `(tag, attribute, value)`
///
/// Two levels are the same level when all three parts are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Level {
    pub tag: String,
    pub attribute: String,
    pub value: String,
}

impl Level {
    /// Creates a new level
    pub fn new(
        tag: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Returns true if the element carries this level's tag and attribute value
    ///
    /// `class` is a multi-valued attribute, so it matches when `value` is any
    /// one of the element's classes.
    fn matches(&self, element: &ElementRef<'_>) -> bool {
        let element = element.value();
        if !element.name().eq_ignore_ascii_case(&self.tag) {
            return false;
        }

        if self.attribute.eq_ignore_ascii_case("class") {
            element.classes().any(|class| class == self.value)
        } else {
            element.attr(&self.attribute) == Some(self.value.as_str())
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} {}='{}'>", self.tag, self.attribute, self.value)
    }
}

/// An anchor found inside a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Visible text of the anchor, trimmed
    pub text: String,
    /// The raw `href` attribute, if any
    pub href: Option<String>,
}

/// A matched element that links can be extracted from
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    element: ElementRef<'a>,
}

/// A parsed HTML page
pub struct PageDocument {
    html: Html,
}

fn anchor_selector() -> &'static Selector {
    static ANCHOR: OnceLock<Selector> = OnceLock::new();
    ANCHOR.get_or_init(|| Selector::parse("a").expect("'a' is a valid selector"))
}

impl PageDocument {
    /// Parses an HTML document
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Returns the first element matching the level, in document order
    pub fn find(&self, level: &Level) -> Option<Frame<'_>> {
        self.matching(level).into_iter().next()
    }

    /// Returns every element matching the level, in document order
    pub fn find_all(&self, level: &Level) -> Vec<Frame<'_>> {
        self.matching(level)
    }

    /// Returns every anchor nested inside the frame, in document order
    pub fn anchors_of(&self, frame: &Frame<'_>) -> Vec<Anchor> {
        frame
            .element
            .select(anchor_selector())
            .map(|element| Anchor {
                text: element.text().collect::<String>().trim().to_string(),
                href: element.value().attr("href").map(str::to_string),
            })
            .collect()
    }

    fn matching(&self, level: &Level) -> Vec<Frame<'_>> {
        let Ok(selector) = Selector::parse(&level.tag) else {
            tracing::warn!("Tag '{}' of level {} is not a valid selector", level.tag, level);
            return Vec::new();
        };

        self.html
            .select(&selector)
            .filter(|element| level.matches(element))
            .map(|element| Frame { element })
            .collect()
    }
}
