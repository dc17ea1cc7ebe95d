use chrono::{DateTime, SecondsFormat, Utc};
use webhook::{Embed, EmbedField, EmbedFooter, WebhookMessage};

use super::Article;

pub const EMBED_COLOR: u32 = 5814783;
pub const DEFAULT_FOOTER: &str = "Cyber Security News Feed";

const MISSING_VALUE: &str = "N/A";
const MAX_TITLE_CHARS: usize = 256;
const MAX_DESCRIPTION_CHARS: usize = 4096;
const MAX_FIELD_CHARS: usize = 1024;
const MAX_FOOTER_CHARS: usize = 2048;

/// One article rendered as a webhook embed.
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub link: String,
    pub description: String,
    pub category: String,
    pub author: String,
    pub summary: Option<String>,
    pub footer: String,
}

impl Notification {
    /// Empty optional values count as missing; the sink rejects empty field values.
    pub fn from_article(article: &Article) -> Self {
        let footer = match non_empty(&article.published_date) {
            Some(date) => format!("Published: {}", date),
            None => DEFAULT_FOOTER.to_string(),
        };

        Self {
            title: article.title.clone(),
            link: article.link.clone(),
            description: non_empty(&article.description).unwrap_or_default().to_string(),
            category: non_empty(&article.category)
                .unwrap_or(MISSING_VALUE)
                .to_string(),
            author: non_empty(&article.author)
                .unwrap_or(MISSING_VALUE)
                .to_string(),
            summary: non_empty(&article.summary).map(str::to_string),
            footer,
        }
    }

    /// Build the webhook body, truncating text to the provider's embed limits.
    pub fn to_message(&self, sent_at: DateTime<Utc>) -> WebhookMessage {
        let mut fields = vec![
            EmbedField {
                name: "Category".to_string(),
                value: truncate_to_char_boundary(&self.category, MAX_FIELD_CHARS),
                inline: true,
            },
            EmbedField {
                name: "Author".to_string(),
                value: truncate_to_char_boundary(&self.author, MAX_FIELD_CHARS),
                inline: true,
            },
        ];

        if let Some(summary) = self.summary.as_deref().filter(|s| !s.is_empty()) {
            fields.push(EmbedField {
                name: "Summary".to_string(),
                value: truncate_to_char_boundary(summary, MAX_FIELD_CHARS),
                inline: false,
            });
        }

        WebhookMessage::with_embed(Embed {
            title: truncate_to_char_boundary(&self.title, MAX_TITLE_CHARS),
            url: self.link.clone(),
            color: EMBED_COLOR,
            description: truncate_to_char_boundary(&self.description, MAX_DESCRIPTION_CHARS),
            fields,
            footer: EmbedFooter {
                text: truncate_to_char_boundary(&self.footer, MAX_FOOTER_CHARS),
            },
            timestamp: sent_at.to_rfc3339_opts(SecondsFormat::Millis, false),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Truncate string to at most `max_chars` characters, respecting char boundaries
fn truncate_to_char_boundary(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SourceConfig;
    use crate::sources::extract_articles;
    use chrono::TimeZone;

    fn sent_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_message_with_all_fields() {
        let article = Article::new(
            "New ransomware strain".to_string(),
            "https://example.com/news/1".to_string(),
        )
        .with_category(Some("Security".to_string()))
        .with_author(Some("Jane Doe".to_string()))
        .with_description(Some("A short teaser".to_string()))
        .with_published_date(Some("May 1, 2024".to_string()))
        .with_summary(Some("First sentence. Second sentence.".to_string()));

        let message = Notification::from_article(&article).to_message(sent_at());
        let json = serde_json::to_value(&message).unwrap();

        assert!(json["content"].is_null());
        let embed = &json["embeds"][0];
        assert_eq!(embed["title"], "New ransomware strain");
        assert_eq!(embed["url"], "https://example.com/news/1");
        assert_eq!(embed["color"], 5814783);
        assert_eq!(embed["description"], "A short teaser");
        assert_eq!(embed["fields"][0]["name"], "Category");
        assert_eq!(embed["fields"][0]["value"], "Security");
        assert_eq!(embed["fields"][1]["value"], "Jane Doe");
        assert_eq!(embed["fields"][2]["name"], "Summary");
        assert_eq!(embed["fields"][2]["inline"], false);
        assert_eq!(embed["footer"]["text"], "Published: May 1, 2024");
        assert_eq!(embed["timestamp"], "2024-05-01T12:00:00.000+00:00");
    }

    #[test]
    fn test_message_defaults_for_missing_fields() {
        let article = Article::new("Title".to_string(), "https://example.com/2".to_string());

        let message = Notification::from_article(&article).to_message(sent_at());
        let embed = &message.embeds[0];

        assert_eq!(embed.description, "");
        assert_eq!(embed.fields.len(), 2);
        assert_eq!(embed.fields[0].value, "N/A");
        assert_eq!(embed.fields[1].value, "N/A");
        assert_eq!(embed.footer.text, DEFAULT_FOOTER);
    }

    #[test]
    fn test_blank_extracted_fields_fall_back_to_defaults() {
        let source = SourceConfig {
            category_selector: Some("span.cat".to_string()),
            author_selector: Some("span.author".to_string()),
            date_selector: Some("time".to_string()),
            ..SourceConfig::new("Test", "https://example.com/", "li", "a")
        };
        let html = r#"<ul><li>
            <a href="https://example.com/4">Blank metadata</a>
            <span class="cat"> </span><span class="author"></span><time></time>
        </li></ul>"#;
        let articles = extract_articles(html, &source, 5).unwrap();

        let message = Notification::from_article(&articles[0]).to_message(sent_at());
        let embed = &message.embeds[0];

        assert_eq!(embed.fields[0].value, "N/A");
        assert_eq!(embed.fields[1].value, "N/A");
        assert_eq!(embed.footer.text, DEFAULT_FOOTER);
    }

    #[test]
    fn test_empty_strings_count_as_missing() {
        let article = Article::new("Title".to_string(), "https://example.com/6".to_string())
            .with_category(Some(String::new()))
            .with_author(Some("  ".to_string()))
            .with_published_date(Some(String::new()))
            .with_summary(Some(String::new()));

        let message = Notification::from_article(&article).to_message(sent_at());
        let embed = &message.embeds[0];

        assert_eq!(embed.fields.len(), 2);
        assert_eq!(embed.fields[0].value, "N/A");
        assert_eq!(embed.fields[1].value, "N/A");
        assert_eq!(embed.footer.text, DEFAULT_FOOTER);
    }

    #[test]
    fn test_long_footer_is_truncated() {
        let article = Article::new("Title".to_string(), "https://example.com/5".to_string())
            .with_published_date(Some("x".repeat(5000)));

        let message = Notification::from_article(&article).to_message(sent_at());
        assert_eq!(message.embeds[0].footer.text.chars().count(), MAX_FOOTER_CHARS);
    }

    #[test]
    fn test_long_title_is_truncated() {
        let title = "é".repeat(300);
        let article = Article::new(title, "https://example.com/3".to_string());

        let message = Notification::from_article(&article).to_message(sent_at());
        assert_eq!(message.embeds[0].title.chars().count(), MAX_TITLE_CHARS);
    }
}
