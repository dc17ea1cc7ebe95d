use serde::{Deserialize, Serialize};

/// A listing entry scraped from a source. Two articles are the same iff their `link`s are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub category: Option<String>,
    pub author: Option<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
}

impl Article {
    pub fn new(title: String, link: String) -> Self {
        Self {
            title,
            link,
            category: None,
            author: None,
            published_date: None,
            description: None,
            summary: None,
        }
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    pub fn with_published_date(mut self, published_date: Option<String>) -> Self {
        self.published_date = published_date;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_summary(mut self, summary: Option<String>) -> Self {
        self.summary = summary;
        self
    }
}
