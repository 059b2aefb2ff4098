//! Scripted in-memory backend.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use medicare_core::types::{Language, OperationKind};

use crate::error::GatewayError;
use crate::service::{
    AnalyzeRequest, AnalyzeResponse, ChatRequest, ChatResponse, RemoteService, ResearchItem,
    ResearchRequest, ResearchResponse,
};

/// A request as the mock saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Chat { message: String, language: Language },
    Analyze { file_name: String, bytes: usize, language: Language },
    Research { query: String, language: Language },
}

impl RecordedCall {
    pub fn kind(&self) -> OperationKind {
        match self {
            RecordedCall::Chat { .. } => OperationKind::Chat,
            RecordedCall::Analyze { .. } => OperationKind::Analysis,
            RecordedCall::Research { .. } => OperationKind::Search,
        }
    }
}

#[derive(Default)]
struct Script {
    chat: VecDeque<Result<ChatResponse, GatewayError>>,
    analyze: VecDeque<Result<AnalyzeResponse, GatewayError>>,
    research: VecDeque<Result<ResearchResponse, GatewayError>>,
    calls: Vec<RecordedCall>,
}

/// [`RemoteService`] that replays queued responses.
///
/// With nothing queued, chat echoes the message, analysis returns a fully
/// populated result and research returns one WHO entry.
#[derive(Default)]
pub struct MockService {
    script: Mutex<Script>,
    delay: Option<Duration>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait `delay` before answering each call.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    fn script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push_chat(&self, response: Result<ChatResponse, GatewayError>) {
        self.script().chat.push_back(response);
    }

    pub fn push_analysis(&self, response: Result<AnalyzeResponse, GatewayError>) {
        self.script().analyze.push_back(response);
    }

    pub fn push_research(&self, response: Result<ResearchResponse, GatewayError>) {
        self.script().research.push_back(response);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script().calls.clone()
    }

    pub fn call_count(&self, kind: OperationKind) -> usize {
        self.script()
            .calls
            .iter()
            .filter(|call| call.kind() == kind)
            .count()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl RemoteService for MockService {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, GatewayError> {
        let scripted = {
            let mut script = self.script();
            script.calls.push(RecordedCall::Chat {
                message: request.message.clone(),
                language: request.language,
            });
            script.chat.pop_front()
        };
        self.pause().await;
        scripted.unwrap_or_else(|| {
            Ok(ChatResponse {
                response: Some(format!("Mock reply to: {}", request.message)),
            })
        })
    }

    async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalyzeResponse, GatewayError> {
        let scripted = {
            let mut script = self.script();
            script.calls.push(RecordedCall::Analyze {
                file_name: request.file.name.clone(),
                bytes: request.file.len(),
                language: request.language,
            });
            script.analyze.pop_front()
        };
        self.pause().await;
        scripted.unwrap_or_else(|| {
            Ok(AnalyzeResponse {
                extracted_text: Some(format!("Text from {}", request.file.name)),
                summary: Some("Values within normal range.".to_string()),
                key_findings: Some(vec!["No abnormalities".to_string()]),
                recommendations: Some(vec!["Routine follow-up".to_string()]),
                next_steps: Some(vec!["Repeat in 12 months".to_string()]),
            })
        })
    }

    async fn research(&self, request: ResearchRequest) -> Result<ResearchResponse, GatewayError> {
        let scripted = {
            let mut script = self.script();
            script.calls.push(RecordedCall::Research {
                query: request.query.clone(),
                language: request.language,
            });
            script.research.pop_front()
        };
        self.pause().await;
        scripted.unwrap_or_else(|| {
            Ok(ResearchResponse {
                results: Some(vec![ResearchItem {
                    title: Some(format!("{} overview", request.query)),
                    source: Some("WHO".to_string()),
                    summary: Some("Current guidance.".to_string()),
                    url: Some("https://www.who.int".to_string()),
                }]),
            })
        })
    }
}
