//! Document ingestion: loading and splitting

mod json_splitter;
mod loader;
mod splitter;

pub use json_splitter::RecursiveJsonSplitter;
pub use loader::{
    loader_for, CsvLoader, DirectoryLoader, DocumentLoader, JsonLoader, MarkdownLoader, PdfLoader,
    WebLoader,
};
pub use splitter::{char_count, LengthFn, RecursiveCharacterSplitter, TextSplitter};
