use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use scraper::Html;
use tracing::debug;

use crate::errors::FeederResult;
use crate::sources::extract::{element_text, SelectorRule};
use crate::sources::traits::PageFetcher;

/// Sentence terminator followed by whitespace. The terminator belongs to the sentence before it.
static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("sentence boundary pattern is valid"));

/// Builds a short extractive summary from an article page.
pub struct Summarizer<'a, F: PageFetcher + ?Sized> {
    fetcher: &'a F,
    timeout: Duration,
}

impl<'a, F: PageFetcher + ?Sized> Summarizer<'a, F> {
    pub fn new(fetcher: &'a F, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    pub fn summarize(
        &self,
        url: &str,
        body_selector: &str,
        sentence_count: usize,
    ) -> FeederResult<Option<String>> {
        debug!(url, "Generating summary");
        let html = self.fetcher.fetch(url, self.timeout)?;
        summarize_html(&html, body_selector, sentence_count)
    }
}

/// First `sentence_count` sentences of the page's paragraph text, or `None` if there is none.
pub fn summarize_html(
    html: &str,
    body_selector: &str,
    sentence_count: usize,
) -> FeederResult<Option<String>> {
    let body = SelectorRule::parse(body_selector)?;
    let paragraph = SelectorRule::parse("p")?;

    let Some(text) = paragraph_text(html, &body, &paragraph) else {
        return Ok(None);
    };

    let summary = split_sentences(&text)
        .into_iter()
        .take(sentence_count)
        .collect::<Vec<_>>()
        .join(" ");

    Ok(Some(summary).filter(|s| !s.is_empty()))
}

/// Paragraphs inside the body container, or every paragraph on the page when there is no container.
fn paragraph_text(html: &str, body: &SelectorRule, paragraph: &SelectorRule) -> Option<String> {
    let document = Html::parse_document(html);

    let paragraphs: Vec<String> = match body.all(&document).next() {
        Some(container) => paragraph
            .within(container)
            .map(|p| element_text(p).trim().to_string())
            .collect(),
        None => paragraph
            .all(&document)
            .map(|p| element_text(p).trim().to_string())
            .collect(),
    };

    let text = paragraphs
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Some(text).filter(|t| !t.is_empty())
}

pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        sentences.push(&text[start..boundary.start() + 1]);
        start = boundary.end();
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }

    sentences
}
