//! Document and image analysis view state.

use std::collections::BTreeSet;

use medicare_core::types::{AnalysisResult, SectionId, SourceBlob};

use crate::slot::Slot;

/// One collapsible section as rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionView<'a> {
    pub id: SectionId,
    pub expanded: bool,
    pub lines: Vec<&'a str>,
}

#[derive(Debug)]
pub struct AnalysisSession {
    selected: Option<SourceBlob>,
    result: Slot<AnalysisResult>,
    expanded: BTreeSet<SectionId>,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self {
            selected: None,
            result: Slot::new(),
            expanded: Self::default_sections(),
        }
    }
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn default_sections() -> BTreeSet<SectionId> {
        BTreeSet::from([SectionId::Summary])
    }

    pub fn selected(&self) -> Option<&SourceBlob> {
        self.selected.as_ref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.get()
    }

    pub fn has_result(&self) -> bool {
        !self.result.is_empty()
    }

    pub fn expanded(&self) -> &BTreeSet<SectionId> {
        &self.expanded
    }

    pub fn is_expanded(&self, id: SectionId) -> bool {
        self.expanded.contains(&id)
    }

    /// Record the source being analyzed.
    pub fn select(&mut self, source: SourceBlob) {
        tracing::debug!(file = %source.name, bytes = source.len(), "Source selected");
        self.selected = Some(source);
    }

    pub fn complete(&mut self, result: AnalysisResult) {
        self.result.replace(result);
    }

    /// The analysis failed; go back to choosing a source.
    pub fn fail(&mut self) {
        self.selected = None;
    }

    pub fn reset(&mut self) {
        self.result.clear();
        self.selected = None;
        self.expanded = Self::default_sections();
    }

    /// Flip `id`. Returns whether it is now expanded.
    pub fn toggle_section(&mut self, id: SectionId) -> bool {
        if self.expanded.remove(&id) {
            false
        } else {
            self.expanded.insert(id);
            true
        }
    }

    /// Sections in display order. Extracted text is not a section and is
    /// always shown, see [`AnalysisResult::extracted_text`].
    pub fn sections(&self) -> Vec<SectionView<'_>> {
        let Some(result) = self.result.get() else {
            return Vec::new();
        };
        SectionId::ALL
            .into_iter()
            .map(|id| {
                let lines = match id {
                    SectionId::Summary => vec![result.summary.as_str()],
                    SectionId::KeyFindings => result.key_findings.iter().map(String::as_str).collect(),
                    SectionId::Recommendations => {
                        result.recommendations.iter().map(String::as_str).collect()
                    }
                    SectionId::NextSteps => result.next_steps.iter().map(String::as_str).collect(),
                };
                SectionView {
                    id,
                    expanded: self.is_expanded(id),
                    lines,
                }
            })
            .collect()
    }
}
