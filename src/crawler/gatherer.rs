//! Gather phase: list the articles linked from an index page

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_page, RequestSettings};
use crate::crawler::parser::{Level, PageDocument};
use crate::crawler::progress;
use crate::ScanError;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Timeout for the single index page request
const GATHER_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything the gatherer needs to know about its target
#[derive(Debug, Clone)]
pub struct GatherSettings {
    pub domain: String,
    pub verify_tls: bool,
    /// Page listing every article
    pub root_page: String,
    /// Element containing the article anchors
    pub parent_level: Level,
    /// Log per-article progress at info level instead of debug
    pub verbose: bool,
    pub request: RequestSettings,
}

impl GatherSettings {
    pub fn new(
        domain: impl Into<String>,
        verify_tls: bool,
        root_page: impl Into<String>,
        parent_level: Level,
    ) -> Self {
        Self {
            domain: domain.into(),
            verify_tls,
            root_page: root_page.into(),
            parent_level,
            verbose: false,
            request: RequestSettings::new(verify_tls),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let target = &config.target;
        let mut settings = Self::new(
            target.domain.clone(),
            target.verify_tls,
            target.root_page.clone(),
            target.parent_level.clone(),
        );
        settings.verbose = target.verbose;
        settings.request.user_agent = config.request.user_agent.clone();
        settings.request.headers = config.request.headers.clone();
        settings
    }
}

/// An article found on the index page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleEntry {
    pub text: String,
    /// Absolute URL of the article
    pub link: String,
}

impl fmt::Display for ArticleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.text, self.link)
    }
}

/// The articles listed on an index page
///
/// Construction fetches the index page and extracts the articles; a
/// `Gatherer` that exists always holds a validated article list.
#[derive(Debug)]
pub struct Gatherer {
    settings: GatherSettings,
    articles: Vec<ArticleEntry>,
}

impl Gatherer {
    /// Fetches the root page and extracts its articles
    ///
    /// # Errors
    ///
    /// * [`ScanError::InvalidTarget`] - the root page could not be fetched or
    ///   did not answer with a success status
    /// * [`ScanError::InvalidParentLevel`] - the parent level matched nothing
    pub async fn new(settings: GatherSettings) -> crate::Result<Self> {
        progress(
            settings.verbose,
            format_args!("Validating URL: {}", settings.root_page),
        );
        let root_url = Url::parse(&settings.root_page).map_err(|e| ScanError::InvalidTarget {
            url: settings.root_page.clone(),
            reason: e.to_string(),
        })?;

        let client = build_http_client(&settings.request, GATHER_TIMEOUT)?;
        let (status_code, body) =
            fetch_page(&client, root_url.as_str())
                .await
                .map_err(|e| ScanError::InvalidTarget {
                    url: settings.root_page.clone(),
                    reason: e.to_string(),
                })?;

        if !(200..300).contains(&status_code) {
            return Err(ScanError::InvalidTarget {
                url: settings.root_page.clone(),
                reason: format!("HTTP {}", status_code),
            });
        }

        progress(
            settings.verbose,
            format_args!("Validating parent level: {}", settings.parent_level),
        );
        let articles = extract_articles(&body, &root_url, &settings.parent_level)?;

        tracing::info!(
            "Gathered {} articles from {}",
            articles.len(),
            settings.root_page
        );

        Ok(Self { settings, articles })
    }

    pub fn articles(&self) -> &[ArticleEntry] {
        &self.articles
    }

    pub fn number_of_articles(&self) -> usize {
        self.articles.len()
    }

    pub fn settings(&self) -> &GatherSettings {
        &self.settings
    }
}

/// Extracts every anchor with an href inside the parent level
fn extract_articles(
    body: &str,
    root_url: &Url,
    parent_level: &Level,
) -> crate::Result<Vec<ArticleEntry>> {
    let document = PageDocument::parse(body);
    let parent = document
        .find(parent_level)
        .ok_or_else(|| ScanError::InvalidParentLevel {
            level: parent_level.to_string(),
        })?;

    let mut articles = Vec::new();
    for anchor in document.anchors_of(&parent) {
        let Some(href) = anchor.href else {
            continue;
        };

        match root_url.join(href.trim()) {
            Ok(link) => articles.push(ArticleEntry {
                text: anchor.text,
                link: link.to_string(),
            }),
            Err(e) => tracing::warn!("Skipping article '{}' ({}): {}", anchor.text, href, e),
        }
    }

    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Url {
        Url::parse("http://127.0.0.1:8999/simple_website.html").unwrap()
    }

    #[test]
    fn test_extract_articles_in_document_order() {
        let body = r#"
            <ul id="articleList">
                <li><a href="/posts/one.html">One</a></li>
                <li><a>Draft</a></li>
                <li><a href="https://other.example/two">Two</a></li>
            </ul>
        "#;

        let articles = extract_articles(body, &root(), &Level::new("ul", "id", "articleList")).unwrap();
        assert_eq!(
            articles,
            vec![
                ArticleEntry {
                    text: "One".to_string(),
                    link: "http://127.0.0.1:8999/posts/one.html".to_string(),
                },
                ArticleEntry {
                    text: "Two".to_string(),
                    link: "https://other.example/two".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_missing_parent_level() {
        let body = r#"<ul id="articleList"><li><a href="/a">A</a></li></ul>"#;
        let result = extract_articles(body, &root(), &Level::new("x", "id", "nope"));
        assert!(matches!(result, Err(ScanError::InvalidParentLevel { .. })));
    }

    #[test]
    fn test_empty_parent_level_is_valid() {
        let body = r#"<ul id="articleList"></ul>"#;
        let articles = extract_articles(body, &root(), &Level::new("ul", "id", "articleList")).unwrap();
        assert!(articles.is_empty());
    }

    #[test]
    fn test_article_display() {
        let article = ArticleEntry {
            text: "Post".to_string(),
            link: "https://blog/post".to_string(),
        };
        assert_eq!(article.to_string(), "Post @ https://blog/post");
    }

    #[test]
    fn test_settings_from_config() {
        let config = crate::config::parse_config(
            r#"
[target]
domain = "pybit.es"
root-page = "https://pybit.es/pages/articles.html"
verify-tls = false
verbose = true
parent-level = { tag = "ul", attribute = "id", value = "articleList" }

[request]
user-agent = "linkcheck/1.0"
"#,
        )
        .unwrap();

        let settings = GatherSettings::from_config(&config);
        assert!(!settings.verify_tls);
        assert!(!settings.request.verify_tls);
        assert!(settings.verbose);
        assert_eq!(settings.request.user_agent.as_deref(), Some("linkcheck/1.0"));
    }
}
