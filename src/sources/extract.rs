use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::domain::{Article, SourceConfig};
use crate::errors::{FeederError, FeederResult};

/// Listing elements whose text contains this are dropped when `exclude_sponsored` is set.
pub const SPONSORED_MARKER: &str = "Sponsored Content";

/// A compiled CSS selector together with the configuration string it came from.
#[derive(Debug, Clone)]
pub struct SelectorRule {
    raw: String,
    selector: Selector,
}

impl SelectorRule {
    pub fn parse(raw: &str) -> FeederResult<Self> {
        let selector = Selector::parse(raw).map_err(|e| FeederError::Selector {
            selector: raw.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            raw: raw.to_string(),
            selector,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn first<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        scope.select(&self.selector).next()
    }

    pub fn within<'a>(&'a self, scope: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        scope.select(&self.selector)
    }

    pub fn all<'a>(&'a self, document: &'a Html) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        document.select(&self.selector)
    }
}

/// Pulls an optional text value out of a candidate element. Blank text counts as no match.
pub trait TextRule {
    fn select_text(&self, scope: ElementRef<'_>) -> Option<String>;
}

impl TextRule for SelectorRule {
    fn select_text(&self, scope: ElementRef<'_>) -> Option<String> {
        self.first(scope)
            .map(|element| element_text(element).trim().to_string())
            .filter(|text| !text.is_empty())
    }
}

impl<T: TextRule> TextRule for Option<T> {
    fn select_text(&self, scope: ElementRef<'_>) -> Option<String> {
        self.as_ref()?.select_text(scope)
    }
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Every selector of a source, compiled once per extraction.
#[derive(Debug, Clone)]
pub struct SourceRules {
    article: SelectorRule,
    title: SelectorRule,
    category: Option<SelectorRule>,
    description: Option<SelectorRule>,
    author: Option<SelectorRule>,
    date: Option<SelectorRule>,
    link_prefix: String,
    exclude_sponsored: bool,
}

impl SourceRules {
    /// The article and title selectors must parse. A broken optional selector only blanks its field.
    pub fn compile(source: &SourceConfig) -> FeederResult<Self> {
        Ok(Self {
            article: SelectorRule::parse(&source.article_selector)?,
            title: SelectorRule::parse(&source.title_selector)?,
            category: optional_rule(source, source.category_selector.as_deref()),
            description: optional_rule(source, source.description_selector.as_deref()),
            author: optional_rule(source, source.author_selector.as_deref()),
            date: optional_rule(source, source.date_selector.as_deref()),
            link_prefix: source.link_prefix().to_string(),
            exclude_sponsored: source.exclude_sponsored,
        })
    }

    /// Candidates are capped at `max_articles` before sponsored filtering, so a
    /// sponsored entry still uses up one slot.
    pub fn extract(&self, html: &str, max_articles: usize) -> Vec<Article> {
        let document = Html::parse_document(html);
        let mut articles = Vec::new();

        for element in self.article.all(&document).take(max_articles) {
            if self.exclude_sponsored && element_text(element).contains(SPONSORED_MARKER) {
                debug!(selector = self.article.as_str(), "Skipping sponsored element");
                continue;
            }

            let Some(title_element) = self.title.first(element) else {
                continue;
            };

            let title = element_text(title_element).trim().to_string();
            if title.is_empty() {
                continue;
            }

            let href = title_element.value().attr("href").unwrap_or("");
            let link = if href.starts_with("http") {
                href.to_string()
            } else {
                format!("{}{}", self.link_prefix, href)
            };

            articles.push(
                Article::new(title, link)
                    .with_category(self.category.select_text(element))
                    .with_description(self.description.select_text(element))
                    .with_author(self.author.select_text(element))
                    .with_published_date(self.date.select_text(element)),
            );
        }

        articles
    }
}

fn optional_rule(source: &SourceConfig, raw: Option<&str>) -> Option<SelectorRule> {
    match SelectorRule::parse(raw?) {
        Ok(rule) => Some(rule),
        Err(e) => {
            warn!(source = %source.name, error = %e, "Ignoring unusable selector");
            None
        }
    }
}

/// Extract up to `max_articles` articles from a listing page.
pub fn extract_articles(
    html: &str,
    source: &SourceConfig,
    max_articles: usize,
) -> FeederResult<Vec<Article>> {
    Ok(SourceRules::compile(source)?.extract(html, max_articles))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing_source() -> SourceConfig {
        SourceConfig {
            category_selector: Some("span.category".to_string()),
            description_selector: Some("p.teaser".to_string()),
            author_selector: Some("span.author".to_string()),
            date_selector: Some("time".to_string()),
            link_prefix: Some("https://example.com".to_string()),
            ..SourceConfig::new("Example", "https://example.com/news", "li.story", "h4 a")
        }
    }

    fn story(n: usize, sponsored: bool) -> String {
        let badge = if sponsored {
            "<span class=\"badge\">Sponsored Content</span>"
        } else {
            ""
        };
        format!(
            r#"<li class="story">{badge}
                <h4><a href="/article/{n}">  Story {n}  </a></h4>
                <span class="category">Security</span>
                <span class="author">Author {n}</span>
                <time>Jan {n}, 2024</time>
                <p class="teaser">Teaser {n}</p>
            </li>"#
        )
    }

    fn listing(stories: &[String]) -> String {
        format!("<html><body><ul>{}</ul></body></html>", stories.join("\n"))
    }

    #[test]
    fn test_extracts_all_fields() {
        let html = listing(&[story(1, false)]);
        let articles = extract_articles(&html, &listing_source(), 5).unwrap();

        assert_eq!(articles.len(), 1);
        let article = &articles[0];
        assert_eq!(article.title, "Story 1");
        assert_eq!(article.link, "https://example.com/article/1");
        assert_eq!(article.category.as_deref(), Some("Security"));
        assert_eq!(article.author.as_deref(), Some("Author 1"));
        assert_eq!(article.published_date.as_deref(), Some("Jan 1, 2024"));
        assert_eq!(article.description.as_deref(), Some("Teaser 1"));
        assert!(article.summary.is_none());
    }

    #[test]
    fn test_sponsored_counts_against_cap() {
        let stories: Vec<String> = (1..=6).map(|n| story(n, n == 3)).collect();
        let articles = extract_articles(&listing(&stories), &listing_source(), 5).unwrap();

        let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Story 1", "Story 2", "Story 4", "Story 5"]);
    }

    #[test]
    fn test_sponsored_kept_when_not_excluded() {
        let mut source = listing_source();
        source.exclude_sponsored = false;
        let html = listing(&[story(1, true), story(2, false)]);

        let articles = extract_articles(&html, &source, 5).unwrap();
        assert_eq!(articles.len(), 2);
    }

    #[test]
    fn test_never_exceeds_max_articles() {
        let stories: Vec<String> = (1..=10).map(|n| story(n, false)).collect();
        let articles = extract_articles(&listing(&stories), &listing_source(), 3).unwrap();
        assert_eq!(articles.len(), 3);
    }

    #[test]
    fn test_absolute_href_is_not_prefixed() {
        let html = r#"<ul><li class="story"><h4><a href="https://other.com/x">Elsewhere</a></h4></li></ul>"#;
        let articles = extract_articles(html, &listing_source(), 5).unwrap();
        assert_eq!(articles[0].link, "https://other.com/x");
    }

    #[test]
    fn test_relative_href_without_prefix() {
        let mut source = listing_source();
        source.link_prefix = None;
        let html = r#"<ul><li class="story"><h4><a href="/article/123">Local</a></h4></li></ul>"#;

        let articles = extract_articles(html, &source, 5).unwrap();
        assert_eq!(articles[0].link, "/article/123");
    }

    #[test]
    fn test_missing_or_blank_title_skips_candidate() {
        let html = r#"<ul>
            <li class="story"><h3>No title link</h3></li>
            <li class="story"><h4><a href="/blank">   </a></h4></li>
            <li class="story"><h4><a href="/ok">Kept</a></h4></li>
        </ul>"#;

        let articles = extract_articles(html, &listing_source(), 5).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Kept");
    }

    #[test]
    fn test_missing_optional_fields_are_none() {
        let html = r#"<ul><li class="story"><h4><a href="/a">Bare</a></h4></li></ul>"#;
        let articles = extract_articles(html, &listing_source(), 5).unwrap();

        let article = &articles[0];
        assert!(article.category.is_none());
        assert!(article.author.is_none());
        assert!(article.published_date.is_none());
        assert!(article.description.is_none());
    }

    #[test]
    fn test_blank_optional_fields_are_none() {
        let html = r#"<ul><li class="story">
            <h4><a href="/a">Blank metadata</a></h4>
            <span class="category"> </span><span class="author"></span><time></time>
        </li></ul>"#;
        let articles = extract_articles(html, &listing_source(), 5).unwrap();

        let article = &articles[0];
        assert!(article.category.is_none());
        assert!(article.author.is_none());
        assert!(article.published_date.is_none());
    }

    #[test]
    fn test_invalid_optional_selector_blanks_field() {
        let mut source = listing_source();
        source.author_selector = Some("span[[".to_string());
        let html = listing(&[story(1, false)]);

        let articles = extract_articles(&html, &source, 5).unwrap();
        assert!(articles[0].author.is_none());
        assert_eq!(articles[0].category.as_deref(), Some("Security"));
    }

    #[test]
    fn test_invalid_article_selector_is_error() {
        let mut source = listing_source();
        source.article_selector = "li[[".to_string();

        let result = extract_articles("<ul></ul>", &source, 5);
        assert!(matches!(result, Err(FeederError::Selector { .. })));
    }

    #[test]
    fn test_no_matches_yields_empty() {
        let articles = extract_articles("<p>nothing here</p>", &listing_source(), 5).unwrap();
        assert!(articles.is_empty());
    }
}
