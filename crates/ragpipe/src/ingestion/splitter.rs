//! Recursive character-based text splitting
//!
//! Splits on an ordered separator list, recursing to finer separators for any
//! piece still over `chunk_size`, then merges pieces into windows that share
//! up to `chunk_overlap` trailing characters. Pieces keep their separators, so
//! concatenating the chunks minus their overlaps reconstructs the input.

use std::collections::VecDeque;

use crate::error::Result;
use crate::types::{Chunk, Document};

/// Measures chunk length; defaults to Unicode scalar count
pub type LengthFn = fn(&str) -> usize;

/// Default length function
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Splits documents into bounded, overlapping chunks
pub trait TextSplitter: Send + Sync {
    /// Split every document, preserving in-document chunk order
    fn process(&self, documents: &[Document]) -> Result<Vec<Chunk>>;
}

/// Character-based recursive splitter
pub struct RecursiveCharacterSplitter {
    separators: Vec<String>,
    chunk_size: usize,
    chunk_overlap: usize,
    length_function: LengthFn,
}

impl RecursiveCharacterSplitter {
    /// Create a splitter with the default separator list
    ///
    /// `chunk_overlap` is expected to be smaller than `chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            separators: vec![
                "\n\n".to_string(),
                "\n".to_string(),
                " ".to_string(),
                String::new(),
            ],
            chunk_size,
            chunk_overlap,
            length_function: char_count,
        }
    }

    /// Replace the separator list (tried in order, coarse to fine)
    pub fn with_separators(mut self, separators: Vec<String>) -> Self {
        self.separators = separators;
        self
    }

    /// Replace the length function
    pub fn with_length_function(mut self, length_function: LengthFn) -> Self {
        self.length_function = length_function;
        self
    }

    fn measure(&self, text: &str) -> usize {
        (self.length_function)(text)
    }

    /// Split raw text into chunks of measured length <= `chunk_size`
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        let pieces = self.split_recursive(text, &self.separators);
        self.merge_pieces(pieces)
    }

    /// Break text into pieces no longer than `chunk_size`, recursing through
    /// ever finer separators; every piece retains its trailing separator
    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        if self.measure(text) <= self.chunk_size {
            return vec![text.to_string()];
        }

        let (separator, rest) = match separators.split_first() {
            Some((sep, rest)) if sep.is_empty() || text.contains(sep.as_str()) => (sep, rest),
            Some((_, rest)) if !rest.is_empty() => return self.split_recursive(text, rest),
            _ => return vec![text.to_string()],
        };

        let mut pieces = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if self.measure(&piece) <= self.chunk_size || rest.is_empty() {
                pieces.push(piece);
            } else {
                pieces.extend(self.split_recursive(&piece, rest));
            }
        }
        pieces
    }

    /// Merge ordered pieces into chunks, carrying at most `chunk_overlap`
    /// trailing characters into the next chunk
    fn merge_pieces(&self, pieces: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<String> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let piece_len = self.measure(&piece);

            if total + piece_len > self.chunk_size && !window.is_empty() {
                chunks.push(window.iter().map(String::as_str).collect::<String>());

                // Keep a tail of the window as overlap for the next chunk.
                while total > self.chunk_overlap
                    || (total + piece_len > self.chunk_size && total > 0)
                {
                    let dropped = window.pop_front().expect("window is non-empty");
                    total -= self.measure(&dropped);
                }
            }

            total += piece_len;
            window.push_back(piece);
        }

        // The window always holds at least the piece pushed after the last
        // emit, so the final chunk is never pure overlap.
        if !window.is_empty() {
            chunks.push(window.iter().map(String::as_str).collect());
        }

        chunks
    }
}

/// Lossless split: each piece keeps its trailing separator; an empty
/// separator splits into single characters
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }

    let mut pieces = Vec::new();
    let mut rest = text;
    while let Some(pos) = rest.find(separator) {
        let end = pos + separator.len();
        pieces.push(rest[..end].to_string());
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        pieces.push(rest.to_string());
    }
    pieces
}

impl TextSplitter for RecursiveCharacterSplitter {
    fn process(&self, documents: &[Document]) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        for doc in documents {
            for (idx, text) in self.split_text(&doc.content).into_iter().enumerate() {
                chunks.push(Chunk::new(doc.id, idx as u32, text, doc.source.clone()));
            }
        }
        tracing::info!(chunks = chunks.len(), documents = documents.len(), "split documents");
        Ok(chunks)
    }
}
