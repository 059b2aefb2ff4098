//! Wire-level request and response shapes, and the [`RemoteService`] seam.
//!
//! Response fields are all optional: the backend omits or nulls fields
//! freely, and defaults are filled in by [`crate::mapping`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use medicare_core::types::{Language, SourceBlob};

use crate::error::GatewayError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub language: Language,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
}

/// Sent as multipart form data: `file` and `language`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeRequest {
    pub file: SourceBlob,
    pub language: Language,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub extracted_text: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub key_findings: Option<Vec<String>>,
    #[serde(default)]
    pub recommendations: Option<Vec<String>>,
    #[serde(default)]
    pub next_steps: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResearchRequest {
    pub query: String,
    pub language: Language,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResearchResponse {
    #[serde(default)]
    pub results: Option<Vec<ResearchItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResearchItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// The analysis backend.
///
/// One call is one network attempt; implementations never retry.
#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, GatewayError>;

    async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalyzeResponse, GatewayError>;

    async fn research(&self, request: ResearchRequest) -> Result<ResearchResponse, GatewayError>;
}
