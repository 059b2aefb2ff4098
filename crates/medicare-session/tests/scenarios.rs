//! End-to-end client scenarios driven through the coordinator.
//!
//! Every test builds its own coordinator over the scripted backend, the
//! mock camera and the in-memory clipboard.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use medicare_capture::{CaptureState, MockCaptureDevice};
use medicare_core::config::MedicareConfig;
use medicare_core::events::{ClientEvent, EventBus, ReleaseReason};
use medicare_core::types::{Language, OperationKind, Role, SectionId, SourceBlob, Tab};
use medicare_gateway::service::{AnalyzeResponse, ChatResponse, ResearchItem, ResearchResponse};
use medicare_gateway::{GatewayError, MockService, RecordedCall, SkipReason};
use medicare_notify::{CopyState, MemoryClipboard};
use medicare_session::{research_item, Coordinator, Delivery, Dispatch, Intent, EXTRACTED_ITEM};

// =============================================================================
// Helpers
// =============================================================================

struct Harness {
    client: Coordinator<MockCaptureDevice>,
    backend: Arc<MockService>,
    camera: MockCaptureDevice,
    clipboard: Arc<MemoryClipboard>,
    events: EventBus,
}

fn harness() -> Harness {
    let mut config = MedicareConfig::default();
    config.capture.width = 32;
    config.capture.height = 24;

    let backend = Arc::new(MockService::new());
    let camera = MockCaptureDevice::new();
    let clipboard = Arc::new(MemoryClipboard::new());
    let events = EventBus::new(256);
    let client = Coordinator::new(
        &config,
        backend.clone(),
        camera.clone(),
        clipboard.clone(),
        events.clone(),
    );
    Harness {
        client,
        backend,
        camera,
        clipboard,
        events,
    }
}

fn report(text: &str) -> SourceBlob {
    SourceBlob::new("report.txt", "text/plain", text.as_bytes().to_vec())
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<ClientEvent>) -> Vec<ClientEvent> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

// =============================================================================
// Conversation
// =============================================================================

#[tokio::test]
async fn test_exchanges_alternate_user_and_assistant() {
    let mut h = harness();
    let questions = ["Symptoms of malaria?", "What causes headaches?", "Diabetes tips"];

    for question in questions {
        h.client.dispatch(Intent::EditChatInput(question.to_string()));
        assert_eq!(
            h.client.dispatch(Intent::SubmitChatInput),
            Dispatch::Started(OperationKind::Chat)
        );
        h.client.settle().await;
    }

    let messages: Vec<_> = h.client.conversation().messages().collect();
    assert_eq!(messages.len(), 2 * questions.len());
    for (i, message) in messages.iter().enumerate() {
        let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
        assert_eq!(message.role, expected);
    }
    assert_eq!(messages[2].content, "What causes headaches?");
    assert_eq!(messages[3].content, "Mock reply to: What causes headaches?");
    assert!(h
        .client
        .conversation()
        .transcript()
        .iter()
        .all(|entry| entry.delivery == Delivery::Confirmed));
}

#[tokio::test]
async fn test_second_submit_while_pending_is_noop() {
    let mut h = harness();
    h.client.dispatch(Intent::SendChat("first".to_string()));
    assert_eq!(
        h.client.dispatch(Intent::SendChat("second".to_string())),
        Dispatch::Skipped(SkipReason::Pending)
    );
    assert_eq!(h.client.conversation().len(), 1);

    h.client.settle().await;
    assert_eq!(h.backend.call_count(OperationKind::Chat), 1);
    assert_eq!(h.client.conversation().len(), 2);
}

#[tokio::test]
async fn test_chat_failure_marks_message_unanswered() {
    let mut h = harness();
    h.backend.push_chat(Err(GatewayError::Transport(
        "connection reset".to_string(),
    )));

    h.client.dispatch(Intent::SendChat("Is this contagious?".to_string()));
    h.client.settle().await;

    let transcript = h.client.conversation().transcript();
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].delivery, Delivery::Unanswered);
    assert_eq!(transcript[0].message.content, "Is this contagious?");
    assert!(!h.client.is_pending(OperationKind::Chat));
    assert_eq!(
        h.client.notifier().current().unwrap().message,
        "Error sending message. Please try again."
    );

    // Retry is allowed after a failure.
    h.client.dispatch(Intent::SendChat("Is this contagious?".to_string()));
    h.client.settle().await;
    assert_eq!(h.client.conversation().len(), 3);
}

#[tokio::test]
async fn test_empty_reply_shows_apology() {
    let mut h = harness();
    h.backend.push_chat(Ok(ChatResponse {
        response: Some(String::new()),
    }));
    h.client.dispatch(Intent::SendChat("hello".to_string()));
    h.client.settle().await;
    let last = h.client.conversation().messages().last().unwrap();
    assert_eq!(
        last.content,
        "I apologize, but I couldn't process your request. Please try again."
    );
}

#[tokio::test]
async fn test_language_toggle_mid_request() {
    let mut h = harness();
    h.client.dispatch(Intent::SendChat("Symptoms of malaria?".to_string()));
    h.client.dispatch(Intent::ToggleLanguage);
    h.client.settle().await;

    let messages: Vec<_> = h.client.conversation().messages().collect();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(h.client.context().language(), Language::Fr);
    assert_eq!(h.client.context().strings().chat_placeholder, "Posez une question médicale...");

    // The request kept the language it was issued with.
    assert_eq!(
        h.backend.calls(),
        vec![RecordedCall::Chat {
            message: "Symptoms of malaria?".to_string(),
            language: Language::En,
        }]
    );
}

// =============================================================================
// Analysis
// =============================================================================

#[tokio::test]
async fn test_missing_summary_gets_placeholder() {
    let mut h = harness();
    h.backend.push_analysis(Ok(AnalyzeResponse {
        extracted_text: Some("Blood pressure 150/95".to_string()),
        key_findings: Some(vec!["Stage 1 hypertension".to_string()]),
        ..AnalyzeResponse::default()
    }));

    h.client.dispatch(Intent::SelectTab(Tab::Analysis));
    assert_eq!(
        h.client.dispatch(Intent::UploadFile(report("BP 150/95"))),
        Dispatch::Started(OperationKind::Analysis)
    );
    h.client.settle().await;

    let result = h.client.analysis().result().unwrap();
    assert_eq!(result.summary, "Analysis completed");
    assert_eq!(result.key_findings, vec!["Stage 1 hypertension"]);
    assert_eq!(result.next_steps, vec!["Consult with a healthcare professional"]);
}

#[tokio::test]
async fn test_analysis_failure_returns_to_choice() {
    let mut h = harness();
    h.backend.push_analysis(Err(GatewayError::Status {
        status: 500,
        body: "Internal Server Error".to_string(),
    }));

    h.client.dispatch(Intent::UploadFile(report("x")));
    assert!(h.client.analysis().selected().is_some());
    h.client.settle().await;

    assert!(h.client.analysis().selected().is_none());
    assert!(!h.client.analysis().has_result());
    assert!(!h.client.is_pending(OperationKind::Analysis));
    assert_eq!(
        h.client.notifier().current().unwrap().message,
        "Error analyzing document. Please try again."
    );
}

#[tokio::test]
async fn test_toggle_section_twice_round_trips() {
    let mut h = harness();
    h.client.dispatch(Intent::ToggleSection(SectionId::KeyFindings));
    assert!(h.client.analysis().is_expanded(SectionId::KeyFindings));
    h.client.dispatch(Intent::ToggleSection(SectionId::KeyFindings));
    assert_eq!(
        h.client.analysis().expanded(),
        &BTreeSet::from([SectionId::Summary])
    );
}

#[tokio::test]
async fn test_reset_restores_defaults() {
    let mut h = harness();
    h.client.dispatch(Intent::UploadFile(report("LDL 190")));
    h.client.settle().await;
    h.client.dispatch(Intent::ToggleSection(SectionId::Summary));
    h.client.dispatch(Intent::ToggleSection(SectionId::Recommendations));
    assert!(h.client.analysis().has_result());

    h.client.dispatch(Intent::ResetAnalysis);
    assert!(h.client.analysis().result().is_none());
    assert!(h.client.analysis().selected().is_none());
    assert_eq!(
        h.client.analysis().expanded(),
        &BTreeSet::from([SectionId::Summary])
    );

    // A new analysis can start again.
    assert_eq!(
        h.client.dispatch(Intent::UploadFile(report("LDL 120"))),
        Dispatch::Started(OperationKind::Analysis)
    );
}

// =============================================================================
// Camera
// =============================================================================

#[tokio::test]
async fn test_snapshot_releases_camera_and_stop_is_idempotent() {
    let mut h = harness();
    h.client.dispatch(Intent::SelectTab(Tab::Analysis));
    h.client.dispatch(Intent::StartCamera);
    h.client.settle().await;
    assert_eq!(h.client.capture().state(), CaptureState::Active);
    let preview = h.client.capture().preview().unwrap();
    assert_eq!((preview.width, preview.height), (32, 24));

    h.client.dispatch(Intent::CaptureSnapshot);
    assert_eq!(h.client.capture().state(), CaptureState::Inactive);
    assert!(!h.client.analysis().selected().unwrap().is_empty());

    h.client.dispatch(Intent::StopCamera);
    h.client.dispatch(Intent::StopCamera);
    assert_eq!(h.client.capture().state(), CaptureState::Inactive);
    assert_eq!(h.camera.opened(), 1);
    assert_eq!(h.camera.released(), 1);
}

#[tokio::test]
async fn test_leaving_analysis_tab_stops_camera() {
    let mut h = harness();
    let mut rx = h.events.subscribe();
    h.client.dispatch(Intent::SelectTab(Tab::Analysis));
    h.client.dispatch(Intent::StartCamera);
    h.client.settle().await;
    assert!(h.client.capture().is_active());

    h.client.dispatch(Intent::SelectTab(Tab::Research));
    assert!(!h.client.capture().is_active());
    assert_eq!(h.camera.live_streams(), 0);

    let released = drain(&mut rx).into_iter().any(|event| {
        matches!(
            event,
            ClientEvent::CaptureReleased {
                reason: ReleaseReason::Teardown,
                ..
            }
        )
    });
    assert!(released);
}

#[tokio::test]
async fn test_denied_camera_notifies() {
    let config = MedicareConfig::default();
    let mut client = Coordinator::new(
        &config,
        Arc::new(MockService::new()),
        MockCaptureDevice::denied(),
        Arc::new(MemoryClipboard::new()),
        EventBus::default(),
    );
    client.dispatch(Intent::SelectTab(Tab::Analysis));
    client.dispatch(Intent::StartCamera);
    client.settle().await;
    assert!(!client.capture().is_active());
    assert_eq!(
        client.notifier().current().unwrap().message,
        "Camera access denied. Please enable camera permissions."
    );
}

// =============================================================================
// Research
// =============================================================================

#[tokio::test]
async fn test_blank_search_issues_no_call() {
    let mut h = harness();
    h.client.dispatch(Intent::SearchTopic(0));
    h.client.settle().await;
    let before = h.client.search().results().to_vec();
    assert_eq!(before.len(), 1);

    for blank in ["", "   "] {
        h.client.dispatch(Intent::EditSearchQuery(blank.to_string()));
        assert_eq!(
            h.client.dispatch(Intent::SubmitSearch),
            Dispatch::Skipped(SkipReason::Blank)
        );
    }
    assert_eq!(h.backend.call_count(OperationKind::Search), 1);
    assert_eq!(h.client.search().results(), before.as_slice());
}

#[tokio::test]
async fn test_identical_search_is_not_cached() {
    let mut h = harness();
    h.backend.push_research(Ok(ResearchResponse {
        results: Some(vec![ResearchItem {
            title: Some("CDC flu guidance".to_string()),
            source: Some("CDC".to_string()),
            ..ResearchItem::default()
        }]),
    }));
    h.backend.push_research(Ok(ResearchResponse::default()));

    for _ in 0..2 {
        h.client.dispatch(Intent::EditSearchQuery("influenza".to_string()));
        h.client.dispatch(Intent::SubmitSearch);
        h.client.settle().await;
    }

    assert_eq!(h.backend.call_count(OperationKind::Search), 2);
    let results = h.client.search().results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "influenza");
    assert_eq!(results[0].url, "#");
}

#[tokio::test]
async fn test_search_failure_keeps_previous_results() {
    let mut h = harness();
    h.client.dispatch(Intent::SearchTopic(1));
    h.client.settle().await;
    let before = h.client.search().results().to_vec();

    h.backend
        .push_research(Err(GatewayError::Decode("expected value".to_string())));
    h.client.dispatch(Intent::SearchTopic(2));
    h.client.settle().await;

    assert_eq!(h.client.search().results(), before.as_slice());
    assert_eq!(
        h.client.notifier().current().unwrap().message,
        "Error fetching research. Please try again."
    );
}

// =============================================================================
// Cross-cutting
// =============================================================================

#[tokio::test]
async fn test_operation_kinds_run_independently() {
    let mut h = harness();
    assert_eq!(
        h.client.dispatch(Intent::SendChat("hi".to_string())),
        Dispatch::Started(OperationKind::Chat)
    );
    assert_eq!(
        h.client.dispatch(Intent::SearchTopic(0)),
        Dispatch::Started(OperationKind::Search)
    );
    assert_eq!(
        h.client.dispatch(Intent::UploadFile(report("a"))),
        Dispatch::Started(OperationKind::Analysis)
    );
    assert_eq!(h.client.in_flight(), 3);

    h.client.settle().await;
    for kind in OperationKind::ALL {
        assert!(!h.client.is_pending(kind));
    }
}

#[tokio::test(start_paused = true)]
async fn test_copy_acknowledged_for_two_seconds() {
    let mut h = harness();
    h.client.dispatch(Intent::UploadFile(report("Ferritin 8 ng/mL")));
    h.client.settle().await;

    assert_eq!(
        h.client.dispatch(Intent::Copy(EXTRACTED_ITEM.to_string())),
        Dispatch::Applied
    );
    assert_eq!(
        h.clipboard.contents().as_deref(),
        Some("Text from report.txt")
    );
    let label = h
        .client
        .copies()
        .state(EXTRACTED_ITEM)
        .label(h.client.context().strings());
    assert_eq!(label, "Copied!");

    tokio::time::sleep(Duration::from_millis(1999)).await;
    assert_eq!(h.client.copies().state(EXTRACTED_ITEM), CopyState::Copied);
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(h.client.copies().state(EXTRACTED_ITEM), CopyState::Copy);

    // Nothing to copy for a research entry that does not exist.
    assert_eq!(
        h.client.dispatch(Intent::Copy(research_item(0))),
        Dispatch::Ignored
    );
}

#[tokio::test]
async fn test_events_serialize_for_display() {
    let mut h = harness();
    let mut rx = h.events.subscribe();
    h.client.dispatch(Intent::SelectTab(Tab::Chat));
    h.client.dispatch(Intent::SendChat("hi".to_string()));
    h.client.settle().await;

    let names: Vec<String> = drain(&mut rx)
        .iter()
        .map(|event| serde_json::to_value(event).unwrap()["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "tab_changed",
            "pending_changed",
            "message_appended",
            "message_appended",
            "pending_changed",
        ]
    );
}
