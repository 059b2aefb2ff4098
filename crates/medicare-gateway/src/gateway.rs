//! The remote operation gateway.
//!
//! Every operation runs in two steps. `begin_*` is synchronous: it rejects
//! blank input and a busy kind, then returns the [`PendingGuard`] that keeps
//! the kind busy. The async call takes the guard and hands it back inside a
//! [`Settled`], so the caller decides when the flag clears relative to
//! applying the result.

use std::sync::Arc;

use medicare_core::config::MedicareConfig;
use medicare_core::context::ViewContext;
use medicare_core::events::EventBus;
use medicare_core::types::{
    AnalysisResult, Language, Message, OperationKind, ResearchResult, SourceBlob,
};
use medicare_notify::NotificationChannel;

use crate::error::GatewayError;
use crate::mapping;
use crate::pending::{PendingFlag, PendingGuard};
use crate::service::{AnalyzeRequest, ChatRequest, RemoteService, ResearchRequest};

/// Why an operation was not started. None of these issue a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Input empty after trimming.
    Blank,
    /// An operation of the same kind is in flight.
    Pending,
    /// An analysis result is still on screen.
    ResultDisplayed,
    /// Upload exceeds the configured limit.
    TooLarge { size: usize, limit: usize },
}

/// Outcome of a remote call, carrying the guard that kept its kind busy.
#[derive(Debug)]
pub struct Settled<T> {
    pub outcome: Result<T, GatewayError>,
    pub guard: PendingGuard,
}

impl<T> Settled<T> {
    pub fn kind(&self) -> OperationKind {
        self.guard.kind()
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

pub struct Gateway {
    service: Arc<dyn RemoteService>,
    chat: PendingFlag,
    analysis: PendingFlag,
    search: PendingFlag,
    max_upload_bytes: usize,
    context: ViewContext,
    notifier: NotificationChannel,
}

impl Gateway {
    pub fn new(
        service: Arc<dyn RemoteService>,
        config: &MedicareConfig,
        context: ViewContext,
        notifier: NotificationChannel,
        events: EventBus,
    ) -> Self {
        Self {
            service,
            chat: PendingFlag::new(OperationKind::Chat, events.clone()),
            analysis: PendingFlag::new(OperationKind::Analysis, events.clone()),
            search: PendingFlag::new(OperationKind::Search, events),
            max_upload_bytes: config.analysis.max_upload_bytes,
            context,
            notifier,
        }
    }

    fn flag(&self, kind: OperationKind) -> &PendingFlag {
        match kind {
            OperationKind::Chat => &self.chat,
            OperationKind::Analysis => &self.analysis,
            OperationKind::Search => &self.search,
        }
    }

    pub fn is_pending(&self, kind: OperationKind) -> bool {
        self.flag(kind).is_pending()
    }

    /// Start a chat or search for `text`.
    pub fn begin_text(&self, kind: OperationKind, text: &str) -> Result<PendingGuard, SkipReason> {
        if text.trim().is_empty() {
            tracing::debug!(%kind, "Blank input ignored");
            return Err(SkipReason::Blank);
        }
        self.acquire(kind)
    }

    /// Start an analysis of `blob`.
    pub fn begin_upload(&self, blob: &SourceBlob) -> Result<PendingGuard, SkipReason> {
        if blob.is_empty() {
            tracing::debug!(file = %blob.name, "Empty upload ignored");
            return Err(SkipReason::Blank);
        }
        if blob.len() > self.max_upload_bytes {
            tracing::warn!(
                file = %blob.name,
                size = blob.len(),
                limit = self.max_upload_bytes,
                "Upload rejected"
            );
            self.notifier.notify(self.context.strings().file_too_large);
            return Err(SkipReason::TooLarge {
                size: blob.len(),
                limit: self.max_upload_bytes,
            });
        }
        self.acquire(OperationKind::Analysis)
    }

    fn acquire(&self, kind: OperationKind) -> Result<PendingGuard, SkipReason> {
        self.flag(kind).try_acquire().ok_or_else(|| {
            tracing::debug!(%kind, "Already pending");
            SkipReason::Pending
        })
    }

    pub async fn converse(
        &self,
        guard: PendingGuard,
        text: String,
        language: Language,
    ) -> Settled<Message> {
        let request = ChatRequest {
            message: text,
            language,
        };
        let outcome = self
            .service
            .chat(request)
            .await
            .map(mapping::assistant_message);
        self.finish(OperationKind::Chat, &outcome);
        Settled { outcome, guard }
    }

    pub async fn analyze(
        &self,
        guard: PendingGuard,
        blob: SourceBlob,
        language: Language,
    ) -> Settled<AnalysisResult> {
        let request = AnalyzeRequest {
            file: blob,
            language,
        };
        let outcome = self
            .service
            .analyze(request)
            .await
            .map(mapping::analysis_result);
        self.finish(OperationKind::Analysis, &outcome);
        Settled { outcome, guard }
    }

    pub async fn search(
        &self,
        guard: PendingGuard,
        query: String,
        language: Language,
    ) -> Settled<Vec<ResearchResult>> {
        let request = ResearchRequest {
            query: query.clone(),
            language,
        };
        let outcome = self
            .service
            .research(request)
            .await
            .map(|raw| mapping::research_results(raw, &query));
        self.finish(OperationKind::Search, &outcome);
        Settled { outcome, guard }
    }

    fn finish<T>(&self, kind: OperationKind, outcome: &Result<T, GatewayError>) {
        match outcome {
            Ok(_) => tracing::info!(%kind, "Remote operation succeeded"),
            Err(e) => {
                tracing::error!(%kind, error = %e, "Remote operation failed");
                let strings = self.context.strings();
                let notice = match kind {
                    OperationKind::Chat => strings.chat_failed,
                    OperationKind::Analysis => strings.analysis_failed,
                    OperationKind::Search => strings.research_failed,
                };
                self.notifier.notify(notice);
            }
        }
    }
}
