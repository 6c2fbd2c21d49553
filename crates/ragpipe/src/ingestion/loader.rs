//! Document loaders for each supported source kind
//!
//! One trait, one implementation per source, selected by configuration.
//! Every loader fails loudly on an unreachable or malformed source; none
//! retries or recovers partially.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::types::{Document, SourceKind, SourceRef};

/// Loads documents from a single configured source
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Fetch the source and produce its documents
    async fn load(&self) -> Result<Vec<Document>>;
}

/// Select the loader for a configured source
pub fn loader_for(config: &SourceConfig) -> Result<Box<dyn DocumentLoader>> {
    let location = config.location.clone();
    Ok(match config.kind {
        SourceKind::Web => Box::new(WebLoader::new(location)),
        SourceKind::Csv => Box::new(CsvLoader::new(location)),
        SourceKind::Directory => Box::new(
            DirectoryLoader::new(location)
                .with_json_selectors(config.json_pointer.clone(), config.json_field.clone()),
        ),
        SourceKind::Json => Box::new(JsonLoader::new(
            location,
            config.json_pointer.clone(),
            config.json_field.clone(),
        )),
        SourceKind::Markdown => Box::new(MarkdownLoader::new(location)),
        SourceKind::Pdf => Box::new(PdfLoader::new(location)),
        SourceKind::Text => {
            return Err(Error::UnsupportedSource(
                "plain text is only loaded through directory sources".to_string(),
            ))
        }
    })
}

/// Loader for an HTTP-fetchable web page
pub struct WebLoader {
    url: String,
}

impl WebLoader {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl DocumentLoader for WebLoader {
    async fn load(&self) -> Result<Vec<Document>> {
        let response = reqwest::get(&self.url).await?.error_for_status()?;
        let html = response.text().await?;
        let content = extract_body_text(&html);

        if content.trim().is_empty() {
            return Err(Error::loader(&self.url, "page has no visible text"));
        }

        let doc = Document::new(content, SourceRef::new(&self.url, SourceKind::Web));
        tracing::info!(url = %self.url, "loaded web page");
        Ok(vec![doc])
    }
}

/// Extract visible text from the HTML body
fn extract_body_text(html: &str) -> String {
    let document = scraper::Html::parse_document(html);
    let body_selector = scraper::Selector::parse("body").expect("static selector");

    let mut content = String::new();
    if let Some(body) = document.select(&body_selector).next() {
        for text in body.text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                if !content.is_empty() {
                    content.push('\n');
                }
                content.push_str(trimmed);
            }
        }
    }
    content
}

/// Loader for CSV files: one document per row
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DocumentLoader for CsvLoader {
    async fn load(&self) -> Result<Vec<Document>> {
        let location = self.path.to_string_lossy().to_string();
        let mut reader = csv::Reader::from_path(&self.path)?;
        let headers = reader.headers()?.clone();

        let mut docs = Vec::new();
        for (row_idx, record) in reader.records().enumerate() {
            let record = record?;
            let content = headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| format!("{}: {}", header, value))
                .collect::<Vec<_>>()
                .join("\n");

            docs.push(Document::new(
                content,
                SourceRef::csv_row(&location, row_idx as u32 + 1),
            ));
        }

        if docs.is_empty() {
            return Err(Error::loader(&location, "CSV has no data rows"));
        }

        tracing::info!(path = %location, rows = docs.len(), "loaded CSV");
        Ok(docs)
    }
}

/// Loader that walks a directory and dispatches files by extension
///
/// Supported extensions: md, txt, csv, json, pdf. Anything else is skipped;
/// a failure loading any supported file aborts the whole walk. Documents with
/// a content hash already seen during the walk are dropped as duplicates.
pub struct DirectoryLoader {
    path: PathBuf,
    json_pointer: String,
    json_field: String,
}

impl DirectoryLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            json_pointer: "/messages".to_string(),
            json_field: "content".to_string(),
        }
    }

    /// Override the pointer and field used for JSON files in the walk
    pub fn with_json_selectors(mut self, pointer: String, field: String) -> Self {
        self.json_pointer = pointer;
        self.json_field = field;
        self
    }
}

#[async_trait]
impl DocumentLoader for DirectoryLoader {
    async fn load(&self) -> Result<Vec<Document>> {
        let location = self.path.to_string_lossy().to_string();
        if !self.path.is_dir() {
            return Err(Error::loader(&location, "not a directory"));
        }

        let mut docs = Vec::new();
        for entry in WalkDir::new(&self.path).follow_links(true) {
            let entry = entry.map_err(|e| Error::loader(&location, e.to_string()))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let kind = path
                .extension()
                .and_then(|ext| SourceKind::from_extension(&ext.to_string_lossy()));

            match kind {
                Some(SourceKind::Markdown) => {
                    docs.extend(MarkdownLoader::new(path).load().await?);
                }
                Some(SourceKind::Text) => {
                    docs.push(load_text_file(path).await?);
                }
                Some(SourceKind::Csv) => {
                    docs.extend(CsvLoader::new(path).load().await?);
                }
                Some(SourceKind::Json) => {
                    docs.extend(
                        JsonLoader::new(path, self.json_pointer.clone(), self.json_field.clone())
                            .load()
                            .await?,
                    );
                }
                Some(SourceKind::Pdf) => {
                    docs.extend(PdfLoader::new(path).load().await?);
                }
                _ => {}
            }
        }

        // Drop duplicate content (same file reachable twice, copied files).
        let mut seen = std::collections::HashSet::new();
        let before = docs.len();
        docs.retain(|doc| seen.insert(doc.content_hash.clone()));
        if docs.len() < before {
            tracing::debug!(dropped = before - docs.len(), "deduplicated directory documents");
        }

        if docs.is_empty() {
            return Err(Error::loader(&location, "no supported files in directory"));
        }

        tracing::info!(path = %location, documents = docs.len(), "loaded directory");
        Ok(docs)
    }
}

/// Load a plain text file as a single document
async fn load_text_file(path: &Path) -> Result<Document> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(Document::new(
        content,
        SourceRef::new(path.to_string_lossy(), SourceKind::Text),
    ))
}

/// Loader for a JSON file extracting a fixed field path
///
/// `pointer` is a JSON Pointer to an array; `field` is read from each array
/// element. Non-string field values are serialized to JSON text.
pub struct JsonLoader {
    path: PathBuf,
    pointer: String,
    field: String,
}

impl JsonLoader {
    pub fn new(path: impl Into<PathBuf>, pointer: String, field: String) -> Self {
        Self {
            path: path.into(),
            pointer,
            field,
        }
    }
}

#[async_trait]
impl DocumentLoader for JsonLoader {
    async fn load(&self) -> Result<Vec<Document>> {
        let location = self.path.to_string_lossy().to_string();
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;

        let records = value
            .pointer(&self.pointer)
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                Error::loader(
                    &location,
                    format!("JSON pointer {} does not address an array", self.pointer),
                )
            })?;

        let mut docs = Vec::new();
        for record in records {
            let field_value = record.get(&self.field).ok_or_else(|| {
                Error::loader(
                    &location,
                    format!("record is missing field {:?}", self.field),
                )
            })?;

            let content = match field_value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };

            docs.push(Document::new(
                content,
                SourceRef::new(&location, SourceKind::Json),
            ));
        }

        if docs.is_empty() {
            return Err(Error::loader(&location, "JSON array is empty"));
        }

        tracing::info!(path = %location, records = docs.len(), "loaded JSON");
        Ok(docs)
    }
}

/// Loader for Markdown files, stripped to plain text
pub struct MarkdownLoader {
    path: PathBuf,
}

impl MarkdownLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DocumentLoader for MarkdownLoader {
    async fn load(&self) -> Result<Vec<Document>> {
        let location = self.path.to_string_lossy().to_string();
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let content = markdown_to_text(&raw);

        if content.trim().is_empty() {
            return Err(Error::loader(&location, "Markdown file has no text"));
        }

        let doc = Document::new(content, SourceRef::new(&location, SourceKind::Markdown));
        tracing::info!(path = %location, "loaded Markdown");
        Ok(vec![doc])
    }
}

/// Strip Markdown formatting, keeping text, code, and block structure
fn markdown_to_text(markdown: &str) -> String {
    use pulldown_cmark::{Event, Parser, Tag, TagEnd};

    let mut text = String::new();
    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push('\n'),
            Event::Start(Tag::Item) => text.push_str("- "),
            Event::End(TagEnd::Paragraph)
            | Event::End(TagEnd::Heading(_))
            | Event::End(TagEnd::Item)
            | Event::End(TagEnd::CodeBlock) => {
                if !text.ends_with("\n\n") {
                    text.push_str("\n\n");
                }
            }
            _ => {}
        }
    }
    text.trim_end().to_string()
}

/// Loader for PDF files
pub struct PdfLoader {
    path: PathBuf,
}

impl PdfLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DocumentLoader for PdfLoader {
    async fn load(&self) -> Result<Vec<Document>> {
        let location = self.path.to_string_lossy().to_string();
        let data = tokio::fs::read(&self.path).await?;

        let raw = pdf_extract::extract_text_from_mem(&data)
            .map_err(|e| Error::Pdf(format!("{}: {}", location, e)))?;

        // Drop NULs and blank lines left behind by extraction.
        let content = raw
            .replace('\0', "")
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        if content.is_empty() {
            return Err(Error::Pdf(format!(
                "{}: no extractable text (image-based or encrypted PDF?)",
                location
            )));
        }

        let page_count = lopdf::Document::load_mem(&data)
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(1);

        let mut source = SourceRef::new(&location, SourceKind::Pdf);
        source.page_count = Some(page_count);

        let doc = Document::new(content, source);
        tracing::info!(path = %location, pages = page_count, "loaded PDF");
        Ok(vec![doc])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn csv_loader_yields_one_document_per_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "people.csv", "name,city\nAda,London\nLin,Oslo\n");

        let docs = CsvLoader::new(&path).load().await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].content, "name: Ada\ncity: London");
        assert_eq!(docs[0].source.row, Some(1));
        assert_eq!(docs[1].source.row, Some(2));
    }

    #[tokio::test]
    async fn csv_loader_missing_file_is_an_error() {
        let result = CsvLoader::new("/nonexistent/people.csv").load().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn json_loader_extracts_field_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            "chat.json",
            r#"{"messages": [{"content": "hola"}, {"content": {"nested": 1}}]}"#,
        );

        let loader = JsonLoader::new(&path, "/messages".to_string(), "content".to_string());
        let docs = loader.load().await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].content, "hola");
        assert_eq!(docs[1].content, r#"{"nested":1}"#);
    }

    #[tokio::test]
    async fn json_loader_rejects_malformed_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "bad.json", "{not json");

        let loader = JsonLoader::new(&path, "/messages".to_string(), "content".to_string());
        assert!(loader.load().await.is_err());
    }

    #[tokio::test]
    async fn json_loader_rejects_wrong_pointer() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "chat.json", r#"{"messages": {"content": "x"}}"#);

        let loader = JsonLoader::new(&path, "/messages".to_string(), "content".to_string());
        assert!(loader.load().await.is_err());
    }

    #[tokio::test]
    async fn markdown_loader_strips_formatting() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            "notes.md",
            "# Title\n\nSome *emphasis* and `code`.\n\n- item one\n- item two\n",
        );

        let docs = MarkdownLoader::new(&path).load().await.unwrap();
        assert_eq!(docs.len(), 1);
        let text = &docs[0].content;
        assert!(text.contains("Title"));
        assert!(text.contains("Some emphasis and code."));
        assert!(text.contains("- item one"));
        assert!(!text.contains('#'));
        assert!(!text.contains('*'));
    }

    #[tokio::test]
    async fn directory_loader_walks_supported_files() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(&dir, "a.md", "# Doc A\n\ncontent a\n");
        write_fixture(&dir, "b.txt", "content b");
        write_fixture(&dir, "ignored.rs", "fn main() {}");

        let docs = DirectoryLoader::new(dir.path()).load().await.unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[tokio::test]
    async fn directory_loader_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DirectoryLoader::new(dir.path()).load().await.is_err());
    }

    fn write_pdf_fixture(dir: &tempfile::TempDir, name: &str, text: Option<&str>) -> PathBuf {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Object, Stream};

        let mut pdf = lopdf::Document::with_version("1.5");
        let pages_id = pdf.new_object_id();
        let font_id = pdf.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = pdf.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut operations = Vec::new();
        if let Some(text) = text {
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ]);
        }
        let content_id = pdf.add_object(Stream::new(
            dictionary! {},
            Content { operations }.encode().unwrap(),
        ));
        let page_id = pdf.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        pdf.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = pdf.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        pdf.trailer.set("Root", catalog_id);

        let path = dir.path().join(name);
        pdf.save(&path).unwrap();
        path
    }

    #[tokio::test]
    async fn pdf_loader_extracts_text_and_page_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf_fixture(&dir, "doc.pdf", Some("Hola tetrarquia"));

        let docs = PdfLoader::new(&path).load().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].content.contains("Hola tetrarquia"));
        assert_eq!(docs[0].source.page_count, Some(1));
        assert_eq!(docs[0].source.kind, SourceKind::Pdf);
    }

    #[tokio::test]
    async fn pdf_loader_rejects_pdf_without_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf_fixture(&dir, "blank.pdf", None);
        assert!(PdfLoader::new(&path).load().await.is_err());
    }

    #[tokio::test]
    async fn pdf_loader_rejects_non_pdf_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "fake.pdf", "this is not a pdf");
        assert!(PdfLoader::new(&path).load().await.is_err());
    }

    #[tokio::test]
    async fn web_loader_invalid_url_is_an_error() {
        assert!(WebLoader::new("not a url").load().await.is_err());
    }

    #[tokio::test]
    async fn web_loader_unreachable_host_is_an_error() {
        // Port 1 is never bound in the test environment.
        assert!(WebLoader::new("http://127.0.0.1:1/").load().await.is_err());
    }

    #[tokio::test]
    async fn directory_loader_honors_json_selectors() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(
            &dir,
            "log.json",
            r#"{"entries": [{"body": "primera"}, {"body": "segunda"}]}"#,
        );

        let docs = DirectoryLoader::new(dir.path())
            .with_json_selectors("/entries".to_string(), "body".to_string())
            .load()
            .await
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].content, "primera");
    }

    #[tokio::test]
    async fn directory_loader_drops_duplicate_content() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(&dir, "a.txt", "same content");
        write_fixture(&dir, "b.txt", "same content");
        write_fixture(&dir, "c.txt", "different content");

        let docs = DirectoryLoader::new(dir.path()).load().await.unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn body_text_extraction() {
        let html = "<html><head><title>t</title></head>\
                    <body><h1>Heading</h1><p>First.</p><p>Second.</p></body></html>";
        let text = extract_body_text(html);
        assert_eq!(text, "Heading\nFirst.\nSecond.");
    }

    #[test]
    fn loader_factory_rejects_bare_text_sources() {
        let config = SourceConfig {
            kind: SourceKind::Text,
            location: "notes.txt".to_string(),
            json_pointer: "/messages".to_string(),
            json_field: "content".to_string(),
        };
        assert!(loader_for(&config).is_err());
    }
}
