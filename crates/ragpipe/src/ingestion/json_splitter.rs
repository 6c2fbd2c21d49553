//! Recursive JSON splitting along structural boundaries
//!
//! Walks nested objects depth-first and packs key paths into fragments whose
//! serialized length stays under `max_chunk_size`. A key-value pair is never
//! cut in half: a subtree that does not fit is recursed into, and a scalar is
//! moved whole into a fresh fragment.

use serde_json::{Map, Value};

use crate::error::Result;
use crate::types::{Chunk, Document};

use super::splitter::TextSplitter;

/// JSON-based recursive splitter
pub struct RecursiveJsonSplitter {
    max_chunk_size: usize,
}

impl RecursiveJsonSplitter {
    pub fn new(max_chunk_size: usize) -> Self {
        Self { max_chunk_size }
    }

    /// Split a JSON value into fragments, each a valid JSON object whose
    /// serialized length is at most `max_chunk_size` (a single scalar larger
    /// than the limit still becomes its own fragment)
    pub fn split_json(&self, data: &Value) -> Vec<Value> {
        let data = convert_lists(data);
        let mut fragments: Vec<Map<String, Value>> = vec![Map::new()];

        match &data {
            Value::Object(map) => self.walk(map, &mut Vec::new(), &mut fragments),
            scalar => {
                fragments.last_mut().expect("at least one fragment").insert(
                    "value".to_string(),
                    scalar.clone(),
                );
            }
        }

        fragments
            .into_iter()
            .filter(|m| !m.is_empty())
            .map(Value::Object)
            .collect()
    }

    fn walk(
        &self,
        map: &Map<String, Value>,
        path: &mut Vec<String>,
        fragments: &mut Vec<Map<String, Value>>,
    ) {
        for (key, value) in map {
            path.push(key.clone());

            let current_size = json_size(&Value::Object(
                fragments.last().expect("non-empty").clone(),
            ));
            let addition = nested_size(path, value);

            if current_size + addition <= self.max_chunk_size {
                set_nested(fragments.last_mut().expect("non-empty"), path, value.clone());
            } else {
                if !fragments.last().expect("non-empty").is_empty() {
                    fragments.push(Map::new());
                }
                match value {
                    Value::Object(inner) => self.walk(inner, path, fragments),
                    scalar => {
                        set_nested(fragments.last_mut().expect("non-empty"), path, scalar.clone())
                    }
                }
            }

            path.pop();
        }
    }
}

/// Serialized length of a value
fn json_size(value: &Value) -> usize {
    serde_json::to_string(value).map(|s| s.len()).unwrap_or(0)
}

/// Serialized length of `value` nested under the whole key path
fn nested_size(path: &[String], value: &Value) -> usize {
    let mut nested = value.clone();
    for key in path.iter().rev() {
        let mut wrapper = Map::new();
        wrapper.insert(key.clone(), nested);
        nested = Value::Object(wrapper);
    }
    json_size(&nested)
}

/// Insert `value` at the key path, creating intermediate objects
fn set_nested(fragment: &mut Map<String, Value>, path: &[String], value: Value) {
    debug_assert!(!path.is_empty());
    let mut cursor = fragment;
    for key in &path[..path.len() - 1] {
        cursor = cursor
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .expect("intermediate path entries are objects");
    }
    cursor.insert(path[path.len() - 1].clone(), value);
}

/// Convert arrays to index-keyed objects, recursively, so splitting only ever
/// deals with objects and scalars
fn convert_lists(value: &Value) -> Value {
    match value {
        Value::Array(items) => {
            let map = items
                .iter()
                .enumerate()
                .map(|(idx, item)| (idx.to_string(), convert_lists(item)))
                .collect();
            Value::Object(map)
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), convert_lists(v)))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

impl TextSplitter for RecursiveJsonSplitter {
    /// Parse each document as JSON and emit one chunk per fragment
    ///
    /// Malformed JSON is a parse error surfaced to the caller.
    fn process(&self, documents: &[Document]) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        for doc in documents {
            let data: Value = serde_json::from_str(&doc.content)?;
            for (idx, fragment) in self.split_json(&data).into_iter().enumerate() {
                chunks.push(Chunk::new(
                    doc.id,
                    idx as u32,
                    serde_json::to_string(&fragment)?,
                    doc.source.clone(),
                ));
            }
        }
        tracing::info!(chunks = chunks.len(), documents = documents.len(), "split JSON documents");
        Ok(chunks)
    }
}
