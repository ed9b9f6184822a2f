//! Content-hash keyed cache of parsed files.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHasher};
use tracing::debug;

use super::ProtoFile;
use crate::parser;

/// Fx hash of a source text.
pub fn content_hash(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Per-URI cache of the most recent parse.
///
/// Parsing is a pure function of `(text, uri)`, so an entry is reused as long
/// as the hash of the new text matches the hash recorded on the cached file.
#[derive(Debug, Default)]
pub struct ParseCache {
    files: FxHashMap<Arc<str>, Arc<ProtoFile>>,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached file for `uri` if `text` is unchanged, otherwise
    /// parse and replace the entry.
    pub fn get_or_parse(&mut self, uri: &str, text: &str) -> Arc<ProtoFile> {
        let hash = content_hash(text);
        if let Some(file) = self.files.get(uri).filter(|f| f.content_hash == hash) {
            debug!(uri, "parse cache hit");
            return file.clone();
        }
        debug!(uri, "parse cache miss");
        let file = Arc::new(parser::parse(text, uri));
        self.files.insert(file.uri.clone(), file.clone());
        file
    }

    pub fn get(&self, uri: &str) -> Option<Arc<ProtoFile>> {
        self.files.get(uri).cloned()
    }

    pub fn invalidate(&mut self, uri: &str) {
        self.files.remove(uri);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
