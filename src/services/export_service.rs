use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::Article;
use crate::errors::{FeederError, FeederResult};

pub const CSV_HEADER: [&str; 7] = [
    "title",
    "link",
    "category",
    "author",
    "published_date",
    "description",
    "summary",
];

/// Appends delivered articles to a CSV file.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row per article, writing the header first if the file is new or empty
    pub fn append(&self, articles: &[Article]) -> FeederResult<usize> {
        if articles.is_empty() {
            return Ok(0);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.export_error(e))?;
        }

        let needs_header = fs::metadata(&self.path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true);

        let mut out = String::new();
        if needs_header {
            push_row(&mut out, CSV_HEADER.iter().copied());
        }
        for article in articles {
            push_row(&mut out, article_cells(article));
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.export_error(e))?;
        file.write_all(out.as_bytes())
            .map_err(|e| self.export_error(e))?;

        Ok(articles.len())
    }

    fn export_error(&self, e: std::io::Error) -> FeederError {
        FeederError::Export(format!("{}: {}", self.path.display(), e))
    }
}

fn article_cells(article: &Article) -> [&str; 7] {
    [
        article.title.as_str(),
        article.link.as_str(),
        cell(&article.category),
        cell(&article.author),
        cell(&article.published_date),
        cell(&article.description),
        cell(&article.summary),
    ]
}

fn cell(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn push_row<'a>(out: &mut String, cells: impl IntoIterator<Item = &'a str>) {
    for (i, cell) in cells.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_cell(cell));
    }
    out.push_str("\r\n");
}

/// Quote a cell when it holds a separator, quote or line break; inner quotes are doubled.
pub fn escape_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, CsvExporter) {
        let dir = TempDir::new().unwrap();
        let exporter = CsvExporter::new(dir.path().join("data").join("cyber_news_feed.csv"));
        (dir, exporter)
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("plain"), "plain");
        assert_eq!(escape_cell("a, b"), "\"a, b\"");
        assert_eq!(escape_cell("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_cell("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_header_written_once() {
        let (_dir, exporter) = setup();

        exporter
            .append(&[Article::new("First".to_string(), "https://a.com/1".to_string())])
            .unwrap();
        exporter
            .append(&[Article::new("Second".to_string(), "https://a.com/2".to_string())])
            .unwrap();

        let content = fs::read_to_string(exporter.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "title,link,category,author,published_date,description,summary",
                "First,https://a.com/1,,,,,",
                "Second,https://a.com/2,,,,,",
            ]
        );
    }

    #[test]
    fn test_optional_fields_and_quoting() {
        let (_dir, exporter) = setup();
        let article = Article::new("Patch now, seriously".to_string(), "https://a.com/x".to_string())
            .with_category(Some("Security".to_string()))
            .with_author(Some("Jane \"JD\" Doe".to_string()))
            .with_summary(Some("One. Two.".to_string()));

        assert_eq!(exporter.append(&[article]).unwrap(), 1);

        let content = fs::read_to_string(exporter.path()).unwrap();
        assert!(content.ends_with(
            "\"Patch now, seriously\",https://a.com/x,Security,\"Jane \"\"JD\"\" Doe\",,,One. Two.\r\n"
        ));
    }

    #[test]
    fn test_empty_batch_creates_nothing() {
        let (_dir, exporter) = setup();
        assert_eq!(exporter.append(&[]).unwrap(), 0);
        assert!(!exporter.path().exists());
    }

    #[test]
    fn test_existing_empty_file_gets_header() {
        let (_dir, exporter) = setup();
        fs::create_dir_all(exporter.path().parent().unwrap()).unwrap();
        fs::write(exporter.path(), "").unwrap();

        exporter
            .append(&[Article::new("T".to_string(), "L".to_string())])
            .unwrap();

        let content = fs::read_to_string(exporter.path()).unwrap();
        assert!(content.starts_with("title,link,"));
    }
}
