//! The view coordinator: single owner of client state.
//!
//! User intents go through [`Coordinator::dispatch`]. Remote calls and
//! camera requests run on spawned tasks and report back as
//! [`Completion`]s, which the owner feeds to [`Coordinator::apply`]. Only
//! `dispatch` and `apply` mutate state, so every transition happens on the
//! owner's task in a well-defined order.
//!
//! `dispatch` spawns tasks and must be called inside a tokio runtime.

use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use medicare_capture::{CaptureDevice, CaptureManager, StreamGuard};
use medicare_core::config::MedicareConfig;
use medicare_core::context::ViewContext;
use medicare_core::error::MedicareError;
use medicare_core::events::{ClientEvent, EventBus};
use medicare_core::types::{
    AnalysisResult, Message, OperationKind, ResearchResult, Role, SectionId, SourceBlob, Tab,
};
use medicare_gateway::{Gateway, RemoteService, Settled, SkipReason};
use medicare_notify::{Clipboard, CopyTracker, NotificationChannel};

use crate::analysis::AnalysisSession;
use crate::conversation::ConversationSession;
use crate::search::SearchSession;

/// Copy target id for the extracted text of an analysis.
pub const EXTRACTED_ITEM: &str = "extracted";

/// Copy target id for research result `index`.
pub fn research_item(index: usize) -> String {
    format!("research-{}", index)
}

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SelectTab(Tab),
    ToggleLanguage,
    EditChatInput(String),
    /// Send the current chat input.
    SubmitChatInput,
    SendChat(String),
    /// Send localized suggested question `n`.
    SendSuggestion(usize),
    UploadFile(SourceBlob),
    StartCamera,
    /// Take a snapshot and analyze it.
    CaptureSnapshot,
    StopCamera,
    ResetAnalysis,
    ToggleSection(SectionId),
    EditSearchQuery(String),
    /// Search the current query.
    SubmitSearch,
    /// Search localized suggested topic `n`.
    SearchTopic(usize),
    /// Copy `extracted` or `research-<n>` to the clipboard.
    Copy(String),
}

/// What `dispatch` did with an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// State changed synchronously.
    Applied,
    /// A remote call or camera request is running.
    Started(OperationKind),
    CameraRequested,
    Skipped(SkipReason),
    /// Nothing to act on (unknown target, inactive camera, ...).
    Ignored,
}

/// Result of work that ran off the owner's task.
pub enum Completion {
    Chat {
        user_id: Uuid,
        settled: Settled<Message>,
    },
    Analysis(Settled<AnalysisResult>),
    Search {
        query: String,
        settled: Settled<Vec<ResearchResult>>,
    },
    Camera(Result<StreamGuard, MedicareError>),
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Completion::Chat { user_id, settled } => f
                .debug_struct("Chat")
                .field("user_id", user_id)
                .field("ok", &settled.is_ok())
                .finish(),
            Completion::Analysis(settled) => {
                f.debug_struct("Analysis").field("ok", &settled.is_ok()).finish()
            }
            Completion::Search { query, settled } => f
                .debug_struct("Search")
                .field("query", query)
                .field("ok", &settled.is_ok())
                .finish(),
            Completion::Camera(result) => {
                f.debug_struct("Camera").field("ok", &result.is_ok()).finish()
            }
        }
    }
}

pub struct Coordinator<D> {
    context: ViewContext,
    events: EventBus,
    notifier: NotificationChannel,
    copies: CopyTracker,
    gateway: Arc<Gateway>,
    capture: CaptureManager<D>,
    conversation: ConversationSession,
    analysis: AnalysisSession,
    search: SearchSession,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl<D: CaptureDevice + 'static> Coordinator<D> {
    pub fn new(
        config: &MedicareConfig,
        service: Arc<dyn RemoteService>,
        device: D,
        clipboard: Arc<dyn Clipboard>,
        events: EventBus,
    ) -> Self {
        let context = ViewContext::new(config.general.language);
        let notifier =
            NotificationChannel::new(config.notifications.toast_duration(), events.clone());
        let copies = CopyTracker::new(
            clipboard,
            config.notifications.copy_ack_duration(),
            events.clone(),
        );
        let gateway = Arc::new(Gateway::new(
            service,
            config,
            context.clone(),
            notifier.clone(),
            events.clone(),
        ));
        let capture = CaptureManager::new(
            device,
            &config.capture,
            context.clone(),
            notifier.clone(),
            events.clone(),
        );
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        Self {
            context,
            events,
            notifier,
            copies,
            gateway,
            capture,
            conversation: ConversationSession::new(),
            analysis: AnalysisSession::new(),
            search: SearchSession::new(),
            completion_tx,
            completion_rx,
            in_flight: 0,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn context(&self) -> &ViewContext {
        &self.context
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn notifier(&self) -> &NotificationChannel {
        &self.notifier
    }

    pub fn copies(&self) -> &CopyTracker {
        &self.copies
    }

    pub fn capture(&self) -> &CaptureManager<D> {
        &self.capture
    }

    pub fn conversation(&self) -> &ConversationSession {
        &self.conversation
    }

    pub fn analysis(&self) -> &AnalysisSession {
        &self.analysis
    }

    pub fn search(&self) -> &SearchSession {
        &self.search
    }

    pub fn is_pending(&self, kind: OperationKind) -> bool {
        self.gateway.is_pending(kind)
    }

    /// Remote calls and camera requests not yet applied.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    // =========================================================================
    // Intents
    // =========================================================================

    pub fn dispatch(&mut self, intent: Intent) -> Dispatch {
        tracing::debug!(?intent, "Dispatch");
        match intent {
            Intent::SelectTab(tab) => self.select_tab(tab),
            Intent::ToggleLanguage => {
                let language = self.context.language().toggled();
                self.context.set_language(language);
                tracing::info!(%language, "Language changed");
                self.events.emit(ClientEvent::LanguageChanged { language });
                Dispatch::Applied
            }
            Intent::EditChatInput(text) => {
                self.conversation.set_input(text);
                Dispatch::Applied
            }
            Intent::SubmitChatInput => {
                let text = self.conversation.input().to_string();
                self.send_chat(text)
            }
            Intent::SendChat(text) => self.send_chat(text),
            Intent::SendSuggestion(n) => {
                match self.context.strings().suggested_questions.get(n) {
                    Some(question) => self.send_chat(question.to_string()),
                    None => Dispatch::Ignored,
                }
            }
            Intent::UploadFile(blob) => self.submit_analysis(blob),
            Intent::StartCamera => self.start_camera(),
            Intent::CaptureSnapshot => {
                if let Some(reason) = self.analysis_busy() {
                    return Dispatch::Skipped(reason);
                }
                match self.capture.snapshot() {
                    Some(blob) => self.submit_analysis(blob),
                    None => Dispatch::Ignored,
                }
            }
            Intent::StopCamera => {
                self.capture.stop();
                Dispatch::Applied
            }
            Intent::ResetAnalysis => {
                self.analysis.reset();
                self.events.emit(ClientEvent::AnalysisCleared);
                Dispatch::Applied
            }
            Intent::ToggleSection(id) => {
                self.analysis.toggle_section(id);
                Dispatch::Applied
            }
            Intent::EditSearchQuery(query) => {
                self.search.set_query(query);
                Dispatch::Applied
            }
            Intent::SubmitSearch => {
                let query = self.search.query().to_string();
                self.submit_search(query)
            }
            Intent::SearchTopic(n) => match self.context.strings().research_topics.get(n) {
                Some(topic) => self.submit_search(topic.to_string()),
                None => Dispatch::Ignored,
            },
            Intent::Copy(item_id) => self.copy(&item_id),
        }
    }

    fn select_tab(&mut self, tab: Tab) -> Dispatch {
        let previous = self.context.active_tab();
        if !self.context.set_tab(tab) {
            return Dispatch::Applied;
        }
        if previous == Tab::Analysis {
            self.capture.teardown();
        }
        tracing::info!(%tab, "Tab changed");
        self.events.emit(ClientEvent::TabChanged { tab });
        Dispatch::Applied
    }

    fn send_chat(&mut self, text: String) -> Dispatch {
        let guard = match self.gateway.begin_text(OperationKind::Chat, &text) {
            Ok(guard) => guard,
            Err(reason) => return Dispatch::Skipped(reason),
        };
        let user = self.conversation.begin(&text);
        let user_id = user.id;
        let content = user.content.clone();
        self.events.emit(ClientEvent::MessageAppended {
            message_id: user_id,
            role: Role::User,
        });

        let gateway = self.gateway.clone();
        let language = self.context.language();
        self.spawn(async move {
            let settled = gateway.converse(guard, content, language).await;
            Completion::Chat { user_id, settled }
        });
        Dispatch::Started(OperationKind::Chat)
    }

    fn submit_analysis(&mut self, blob: SourceBlob) -> Dispatch {
        if self.analysis.has_result() {
            return Dispatch::Skipped(SkipReason::ResultDisplayed);
        }
        let guard = match self.gateway.begin_upload(&blob) {
            Ok(guard) => guard,
            Err(reason) => return Dispatch::Skipped(reason),
        };
        self.analysis.select(blob.clone());

        let gateway = self.gateway.clone();
        let language = self.context.language();
        self.spawn(async move { Completion::Analysis(gateway.analyze(guard, blob, language).await) });
        Dispatch::Started(OperationKind::Analysis)
    }

    fn submit_search(&mut self, query: String) -> Dispatch {
        let guard = match self.gateway.begin_text(OperationKind::Search, &query) {
            Ok(guard) => guard,
            Err(reason) => return Dispatch::Skipped(reason),
        };
        let query = query.trim().to_string();
        self.search.set_query(query.clone());

        let gateway = self.gateway.clone();
        let language = self.context.language();
        self.spawn(async move {
            let settled = gateway.search(guard, query.clone(), language).await;
            Completion::Search { query, settled }
        });
        Dispatch::Started(OperationKind::Search)
    }

    fn start_camera(&mut self) -> Dispatch {
        if self.context.active_tab() != Tab::Analysis {
            return Dispatch::Ignored;
        }
        if let Some(reason) = self.analysis_busy() {
            return Dispatch::Skipped(reason);
        }
        match self.capture.request_stream() {
            Some(request) => {
                self.spawn(async move { Completion::Camera(request.run().await) });
                Dispatch::CameraRequested
            }
            None => Dispatch::Ignored,
        }
    }

    /// Why the upload/capture choice is unavailable, if it is.
    fn analysis_busy(&self) -> Option<SkipReason> {
        if self.analysis.has_result() {
            Some(SkipReason::ResultDisplayed)
        } else if self.is_pending(OperationKind::Analysis) {
            Some(SkipReason::Pending)
        } else {
            None
        }
    }

    fn copy(&mut self, item_id: &str) -> Dispatch {
        let text = if item_id == EXTRACTED_ITEM {
            self.analysis.result().map(|r| r.extracted_text.clone())
        } else {
            item_id
                .strip_prefix("research-")
                .and_then(|n| n.parse::<usize>().ok())
                .and_then(|n| self.search.copy_text(n))
                .map(str::to_string)
        };
        match text {
            Some(text) => {
                self.copies.copy(item_id, &text);
                Dispatch::Applied
            }
            None => {
                tracing::debug!(item_id, "Nothing to copy");
                Dispatch::Ignored
            }
        }
    }

    fn spawn<F>(&mut self, work: F)
    where
        F: std::future::Future<Output = Completion> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let completion = work.await;
            // The receiver lives as long as the coordinator.
            let _ = tx.send(completion);
        });
    }

    // =========================================================================
    // Completions
    // =========================================================================

    /// Wait for the next finished remote call or camera request.
    ///
    /// Pends forever when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.completion_rx.recv().await
    }

    /// Apply a finished operation. The pending flag of its kind clears
    /// after the result is in place.
    pub fn apply(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match completion {
            Completion::Chat { user_id, settled } => {
                let Settled { outcome, guard } = settled;
                match outcome {
                    Ok(reply) => {
                        let message_id = reply.id;
                        self.conversation.confirm(user_id, reply);
                        self.events.emit(ClientEvent::MessageAppended {
                            message_id,
                            role: Role::Assistant,
                        });
                    }
                    Err(_) => self.conversation.fail(user_id),
                }
                drop(guard);
            }
            Completion::Analysis(settled) => {
                let Settled { outcome, guard } = settled;
                match outcome {
                    Ok(result) => {
                        self.analysis.complete(result);
                        self.events.emit(ClientEvent::AnalysisCompleted);
                    }
                    Err(_) => self.analysis.fail(),
                }
                drop(guard);
            }
            Completion::Search { query, settled } => {
                let Settled { outcome, guard } = settled;
                if let Ok(results) = outcome {
                    let count = results.len();
                    self.search.complete(query, results);
                    self.events.emit(ClientEvent::ResearchUpdated { count });
                }
                drop(guard);
            }
            Completion::Camera(result) => {
                self.capture.install(result);
            }
        }
    }

    /// Apply completions until nothing is in flight.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.next_completion().await {
                Some(completion) => self.apply(completion),
                None => break,
            }
        }
    }
}
