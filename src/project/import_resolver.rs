//! Mapping import paths to document URIs.
//!
//! The library never touches the file system: an import resolves only to a
//! URI the host has already handed to the analyzer. Candidates are tried in
//! order: relative to the importing file, then under each configured import
//! root, and finally a unique suffix match among the known URIs.

use std::sync::Arc;

use tracing::trace;

/// Resolves `import "a/b.proto"` statements against known documents.
#[derive(Debug, Clone, Default)]
pub struct ImportResolver {
    roots: Vec<String>,
}

impl ImportResolver {
    pub fn new(roots: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut resolver = Self::default();
        resolver.set_roots(roots);
        resolver
    }

    /// Replace the search roots. Plain paths are turned into `file://` URIs.
    pub fn set_roots(&mut self, roots: impl IntoIterator<Item = impl Into<String>>) {
        self.roots = roots
            .into_iter()
            .map(Into::into)
            .map(|root| to_uri(&root).trim_end_matches('/').to_string())
            .collect();
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Resolve `path` imported from `from_uri` to one of `known` URIs.
    pub fn resolve<'k>(
        &self,
        from_uri: &str,
        path: &str,
        known: impl IntoIterator<Item = &'k Arc<str>> + Clone,
    ) -> Option<Arc<str>> {
        let find = |candidate: &str| {
            known
                .clone()
                .into_iter()
                .find(|uri| uri.as_ref() == candidate)
                .cloned()
        };

        if let Some(dir) = parent(from_uri) {
            let candidate = join(dir, path);
            trace!(%candidate, "import candidate (relative)");
            if let Some(uri) = find(&candidate) {
                return Some(uri);
            }
        }
        for root in &self.roots {
            let candidate = join(root, path);
            trace!(%candidate, "import candidate (root)");
            if let Some(uri) = find(&candidate) {
                return Some(uri);
            }
        }
        if let Some(uri) = find(path) {
            return Some(uri);
        }

        let suffix = format!("/{}", normalize(path));
        let mut matches: Vec<&Arc<str>> = known
            .into_iter()
            .filter(|uri| uri.ends_with(&suffix))
            .collect();
        matches.sort();
        matches.dedup();
        match matches.as_slice() {
            [only] => Some(Arc::clone(only)),
            _ => None,
        }
    }
}

fn to_uri(path: &str) -> String {
    if path.contains("://") {
        path.to_string()
    } else if path.starts_with('/') {
        format!("file://{path}")
    } else {
        format!("file:///{path}")
    }
}

/// Directory part of a URI, without the trailing slash.
fn parent(uri: &str) -> Option<&str> {
    let idx = uri.rfind('/')?;
    Some(&uri[..idx])
}

fn join(base: &str, path: &str) -> String {
    let (scheme, rest) = match base.find("://") {
        Some(idx) => base.split_at(idx + 3),
        None => ("", base),
    };
    let joined = format!("{rest}/{path}");
    let leading = if joined.starts_with('/') { "/" } else { "" };
    format!("{scheme}{leading}{}", normalize(&joined))
}

/// Resolve `.` and `..` segments and collapse repeated slashes.
fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}
