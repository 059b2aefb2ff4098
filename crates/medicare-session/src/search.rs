//! Research topic search view state.

use medicare_core::types::ResearchResult;

use crate::slot::Slot;

#[derive(Debug, Default)]
pub struct SearchSession {
    query: String,
    results: Slot<Vec<ResearchResult>>,
    last_query: Option<String>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn results(&self) -> &[ResearchResult] {
        self.results.get().map(Vec::as_slice).unwrap_or(&[])
    }

    /// The query whose results are shown, if any.
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// Replace every result with `results` for `query`.
    pub fn complete(&mut self, query: String, results: Vec<ResearchResult>) {
        tracing::debug!(query = %query, count = results.len(), "Research results replaced");
        self.results.replace(results);
        self.last_query = Some(query);
    }

    /// Clipboard text for result `index`: its summary.
    pub fn copy_text(&self, index: usize) -> Option<&str> {
        self.results().get(index).map(|r| r.summary.as_str())
    }
}
