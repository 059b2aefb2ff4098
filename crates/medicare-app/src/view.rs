//! Plain-text rendering of the active tab and of client events.

use std::fmt::Write;

use medicare_capture::CaptureDevice;
use medicare_core::events::ClientEvent;
use medicare_core::i18n::Strings;
use medicare_core::types::{OperationKind, Role, Tab};
use medicare_session::{research_item, Coordinator, Delivery, EXTRACTED_ITEM};

/// Render the header, tab bar and active tab.
pub fn render<D: CaptureDevice + 'static>(client: &Coordinator<D>) -> String {
    let strings = client.context().strings();
    let active = client.context().active_tab();
    let mut out = String::new();

    let _ = writeln!(out, "Medicare AI | {}", strings.hero_subtitle);
    let tabs: Vec<String> = Tab::ALL
        .into_iter()
        .map(|tab| {
            let label = strings.tab_label(tab);
            if tab == active {
                format!("[{}]", label)
            } else {
                format!(" {} ", label)
            }
        })
        .collect();
    let _ = writeln!(out, "{}  ({})", tabs.join(" "), client.context().language());
    let _ = writeln!(out);

    match active {
        Tab::Welcome => render_welcome(&mut out, strings),
        Tab::Chat => render_chat(&mut out, client, strings),
        Tab::Analysis => render_analysis(&mut out, client, strings),
        Tab::Research => render_research(&mut out, client, strings),
    }

    if let Some(toast) = client.notifier().current() {
        let _ = writeln!(out, "\n! {}", toast.message);
    }
    out
}

fn render_welcome(out: &mut String, strings: &Strings) {
    let _ = writeln!(out, "{}", strings.hero_title);
    let _ = writeln!(out, "{}", strings.hero_subtitle);
    for feature in strings.features {
        let _ = writeln!(out, "  * {}", feature);
    }
    let _ = writeln!(out, "\n{} -> /tab chat", strings.get_started);
    let _ = writeln!(out, "\n{}", strings.disclaimer);
}

fn render_chat<D: CaptureDevice + 'static>(
    out: &mut String,
    client: &Coordinator<D>,
    strings: &Strings,
) {
    let conversation = client.conversation();
    if conversation.is_empty() {
        for (i, question) in strings.suggested_questions.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, question);
        }
    }
    for entry in conversation.transcript() {
        let marker = match (entry.message.role, entry.delivery) {
            (Role::User, Delivery::Unanswered) => "> (!)",
            (Role::User, _) => ">",
            (Role::Assistant, _) => "<",
        };
        let _ = writeln!(
            out,
            "{} {} {}",
            entry.message.timestamp.format("%H:%M"),
            marker,
            entry.message.content
        );
    }
    if client.is_pending(OperationKind::Chat) {
        let _ = writeln!(out, "  {}", strings.thinking);
    }
    let _ = writeln!(out, "\n{}", strings.chat_placeholder);
}

fn render_analysis<D: CaptureDevice + 'static>(
    out: &mut String,
    client: &Coordinator<D>,
    strings: &Strings,
) {
    let analysis = client.analysis();

    if let Some(result) = analysis.result() {
        let copy = client.copies().state(EXTRACTED_ITEM).label(strings);
        let _ = writeln!(out, "{}  [{}: /copy {}]", strings.extracted_text, copy, EXTRACTED_ITEM);
        let _ = writeln!(out, "  {}", result.extracted_text);
        for section in analysis.sections() {
            let sign = if section.expanded { '-' } else { '+' };
            let _ = writeln!(
                out,
                "{} {}  (/toggle {})",
                sign,
                strings.section_label(section.id),
                section.id
            );
            if section.expanded {
                for line in section.lines {
                    let _ = writeln!(out, "    {}", line);
                }
            }
        }
        let _ = writeln!(out, "\n{} -> /reset", strings.new_analysis);
        return;
    }

    if client.is_pending(OperationKind::Analysis) {
        let name = analysis.selected().map(|s| s.name.as_str()).unwrap_or("");
        let _ = writeln!(out, "{} {}", strings.analyzing, name);
    } else if let Some(preview) = client.capture().preview() {
        let _ = writeln!(out, "{} {}x{}", strings.capture_image, preview.width, preview.height);
        let _ = writeln!(out, "  {} -> /snap", strings.take_photo);
        let _ = writeln!(out, "  {} -> /stop", strings.stop_camera);
    } else {
        let _ = writeln!(out, "{}", strings.upload_or_capture);
        let _ = writeln!(out, "  {} -> /upload <path>", strings.drag_drop);
        let _ = writeln!(out, "  {} -> /camera", strings.capture_image);
    }
}

fn render_research<D: CaptureDevice + 'static>(
    out: &mut String,
    client: &Coordinator<D>,
    strings: &Strings,
) {
    let search = client.search();
    let query = if search.query().is_empty() {
        strings.search_placeholder
    } else {
        search.query()
    };
    let _ = writeln!(out, "? {}", query);

    if client.is_pending(OperationKind::Search) {
        let _ = writeln!(out, "  {}", strings.searching);
    }
    if search.results().is_empty() {
        for (i, topic) in strings.research_topics.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, topic);
        }
        return;
    }
    if let Some(last) = search.last_query() {
        let _ = writeln!(out, "= {} ({})", last, search.results().len());
    }
    for (i, result) in search.results().iter().enumerate() {
        let item = research_item(i);
        let copy = client.copies().state(&item).label(strings);
        let _ = writeln!(out, "{}. [{}] {}", i + 1, result.source, result.title);
        let _ = writeln!(out, "   {}: {}", strings.ai_summary, result.summary);
        let _ = writeln!(out, "   {}  [{}: /copy {}]", result.url, copy, item);
    }
}

/// One status line for events that are not visible in the redrawn view.
pub fn render_event(event: &ClientEvent, strings: &Strings) -> Option<String> {
    match event {
        ClientEvent::ToastShown { message } => Some(format!("! {}", message)),
        ClientEvent::CopyAcknowledged { item_id } => {
            Some(format!("[{}] {}", item_id, strings.copied))
        }
        ClientEvent::PendingChanged {
            kind,
            pending: true,
        } => Some(
            match kind {
                OperationKind::Chat => strings.thinking,
                OperationKind::Analysis => strings.analyzing,
                OperationKind::Search => strings.searching,
            }
            .to_string(),
        ),
        ClientEvent::SnapshotTaken { bytes } => Some(format!("{} ({} bytes)", strings.capture_image, bytes)),
        _ => None,
    }
}
