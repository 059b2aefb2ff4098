use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Display language. Selects the string table and the locale hint sent to
/// the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    /// The tag sent to the backend (`"en"` / `"fr"`).
    pub fn tag(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }

    /// The other language.
    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Fr,
            Language::Fr => Language::En,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::str::FromStr for Language {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            other => Err(format!("Unknown language: {}", other)),
        }
    }
}

/// Top-level navigation tab.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Welcome,
    Chat,
    Analysis,
    Research,
}

impl Tab {
    /// All tabs in display order.
    pub const ALL: [Tab; 4] = [Tab::Welcome, Tab::Chat, Tab::Analysis, Tab::Research];
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tab::Welcome => write!(f, "welcome"),
            Tab::Chat => write!(f, "chat"),
            Tab::Analysis => write!(f, "analysis"),
            Tab::Research => write!(f, "research"),
        }
    }
}

impl std::str::FromStr for Tab {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "welcome" => Ok(Tab::Welcome),
            "chat" => Ok(Tab::Chat),
            "analysis" => Ok(Tab::Analysis),
            "research" => Ok(Tab::Research),
            other => Err(format!("Unknown tab: {}", other)),
        }
    }
}

/// Author of a transcript message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// The three remote operation kinds. Each has its own pending flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Chat,
    Analysis,
    Search,
}

impl OperationKind {
    pub const ALL: [OperationKind; 3] = [
        OperationKind::Chat,
        OperationKind::Analysis,
        OperationKind::Search,
    ];
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Chat => write!(f, "chat"),
            OperationKind::Analysis => write!(f, "analysis"),
            OperationKind::Search => write!(f, "search"),
        }
    }
}

/// Publisher of a research result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResearchSource {
    #[default]
    #[serde(rename = "PubMed")]
    PubMed,
    #[serde(rename = "WHO")]
    Who,
    #[serde(rename = "CDC")]
    Cdc,
}

impl ResearchSource {
    /// Parse a backend source label. Matching ignores case.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "pubmed" => Some(ResearchSource::PubMed),
            "who" => Some(ResearchSource::Who),
            "cdc" => Some(ResearchSource::Cdc),
            _ => None,
        }
    }
}

impl fmt::Display for ResearchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResearchSource::PubMed => write!(f, "PubMed"),
            ResearchSource::Who => write!(f, "WHO"),
            ResearchSource::Cdc => write!(f, "CDC"),
        }
    }
}

/// Collapsible section of an analysis result. `extractedText` is not a
/// section: it is always shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionId {
    Summary,
    KeyFindings,
    Recommendations,
    NextSteps,
}

impl SectionId {
    /// Sections in display order.
    pub const ALL: [SectionId; 4] = [
        SectionId::Summary,
        SectionId::KeyFindings,
        SectionId::Recommendations,
        SectionId::NextSteps,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionId::Summary => "summary",
            SectionId::KeyFindings => "keyFindings",
            SectionId::Recommendations => "recommendations",
            SectionId::NextSteps => "nextSteps",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SectionId {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown section: {}", s))
    }
}

// =============================================================================
// Value objects
// =============================================================================

/// One transcript entry. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// A message authored by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// A message authored by the assistant.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Structured result of a document or image analysis. Every field is
/// populated; missing backend fields are filled at the gateway boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub extracted_text: String,
    pub summary: String,
    pub key_findings: Vec<String>,
    pub recommendations: Vec<String>,
    pub next_steps: Vec<String>,
}

/// One entry of a topic search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchResult {
    pub title: String,
    pub source: ResearchSource,
    pub summary: String,
    pub url: String,
}

/// Binary input for analysis: an uploaded file or a captured frame.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceBlob {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SourceBlob {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Byte payloads are elided so logs stay readable.
impl fmt::Debug for SourceBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceBlob")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Guess a MIME type from a file name extension.
pub fn mime_for_file_name(name: &str) -> &'static str {
    let lower = name.to_ascii_lowercase();
    let ext = lower.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_toggle_round_trip() {
        assert_eq!(Language::En.toggled(), Language::Fr);
        assert_eq!(Language::Fr.toggled(), Language::En);
        assert_eq!(Language::En.toggled().toggled(), Language::En);
    }

    #[test]
    fn test_language_tag_and_parse() {
        assert_eq!(Language::En.tag(), "en");
        assert_eq!(Language::Fr.to_string(), "fr");
        assert_eq!("FR".parse::<Language>().unwrap(), Language::Fr);
        assert!("de".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_serde() {
        assert_eq!(serde_json::to_string(&Language::Fr).unwrap(), "\"fr\"");
        let lang: Language = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(lang, Language::En);
    }

    #[test]
    fn test_tab_parse() {
        for tab in Tab::ALL {
            assert_eq!(tab.to_string().parse::<Tab>().unwrap(), tab);
        }
        assert!("settings".parse::<Tab>().is_err());
    }

    #[test]
    fn test_research_source_labels() {
        assert_eq!(
            serde_json::to_string(&ResearchSource::Who).unwrap(),
            "\"WHO\""
        );
        assert_eq!(ResearchSource::from_label("cdc"), Some(ResearchSource::Cdc));
        assert_eq!(
            ResearchSource::from_label(" PubMed "),
            Some(ResearchSource::PubMed)
        );
        assert_eq!(ResearchSource::from_label("NIH"), None);
    }

    #[test]
    fn test_section_id_parse() {
        assert_eq!(
            "keyFindings".parse::<SectionId>().unwrap(),
            SectionId::KeyFindings
        );
        assert_eq!(
            "nextsteps".parse::<SectionId>().unwrap(),
            SectionId::NextSteps
        );
        assert!("extractedText".parse::<SectionId>().is_err());
    }

    #[test]
    fn test_message_constructors() {
        let user = Message::user("hello");
        let assistant = Message::assistant("hi");
        assert_eq!(user.role, Role::User);
        assert_eq!(assistant.role, Role::Assistant);
        assert_ne!(user.id, assistant.id);
    }

    #[test]
    fn test_analysis_result_camel_case() {
        let result = AnalysisResult {
            extracted_text: "t".into(),
            summary: "s".into(),
            key_findings: vec!["k".into()],
            recommendations: vec![],
            next_steps: vec![],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("extractedText").is_some());
        assert!(json.get("keyFindings").is_some());
    }

    #[test]
    fn test_source_blob_debug_elides_bytes() {
        let blob = SourceBlob::new("scan.png", "image/png", vec![1, 2, 3]);
        let debug = format!("{:?}", blob);
        assert!(debug.contains("len: 3"));
        assert!(!debug.contains("[1, 2, 3]"));
    }

    #[test]
    fn test_mime_for_file_name() {
        assert_eq!(mime_for_file_name("report.PDF"), "application/pdf");
        assert_eq!(mime_for_file_name("captured-image.jpg"), "image/jpeg");
        assert_eq!(mime_for_file_name("noext"), "application/octet-stream");
    }
}
