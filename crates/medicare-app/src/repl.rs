//! Terminal command parsing.
//!
//! Lines starting with `/` are commands; anything else is sent to chat.
//! Suggestion and topic numbers are 1-based, as printed in the view.

use std::path::PathBuf;

use medicare_core::types::{SectionId, Tab};
use medicare_session::Intent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Intents to dispatch in order.
    Dispatch(Vec<Intent>),
    /// Read a file and analyze it.
    Upload(PathBuf),
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  /tab <welcome|chat|analysis|research>
  /lang                    toggle English / French
  /chat <text>             send a chat message (plain text works too)
  /ask <n>                 send suggested question n
  /upload <path>           analyze a document or image
  /camera  /snap  /stop    camera preview, capture and analyze, stop
  /reset                   start a new analysis
  /toggle <section>        summary, keyFindings, recommendations, nextSteps
  /search <query>          search medical research
  /topic <n>               search suggested topic n
  /copy <item>             extracted, research-<n>
  /help  /quit";

/// Parse one input line. Returns `Ok(None)` for an empty line.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(chat(line)));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match name {
        "tab" => {
            let tab: Tab = arg.parse()?;
            Command::Dispatch(vec![Intent::SelectTab(tab)])
        }
        "lang" => Command::Dispatch(vec![Intent::ToggleLanguage]),
        "chat" => chat(arg),
        "ask" => Command::Dispatch(vec![Intent::SendSuggestion(index(arg)?)]),
        "upload" => {
            if arg.is_empty() {
                return Err("usage: /upload <path>".to_string());
            }
            Command::Upload(PathBuf::from(arg))
        }
        "camera" => Command::Dispatch(vec![Intent::StartCamera]),
        "snap" => Command::Dispatch(vec![Intent::CaptureSnapshot]),
        "stop" => Command::Dispatch(vec![Intent::StopCamera]),
        "reset" => Command::Dispatch(vec![Intent::ResetAnalysis]),
        "toggle" => {
            let section: SectionId = arg.parse()?;
            Command::Dispatch(vec![Intent::ToggleSection(section)])
        }
        "search" => Command::Dispatch(vec![
            Intent::EditSearchQuery(arg.to_string()),
            Intent::SubmitSearch,
        ]),
        "topic" => Command::Dispatch(vec![Intent::SearchTopic(index(arg)?)]),
        "copy" => {
            if arg.is_empty() {
                return Err("usage: /copy <extracted|research-n>".to_string());
            }
            Command::Dispatch(vec![Intent::Copy(arg.to_string())])
        }
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("Unknown command: /{}", other)),
    };
    Ok(Some(command))
}

fn chat(text: &str) -> Command {
    Command::Dispatch(vec![
        Intent::EditChatInput(text.to_string()),
        Intent::SubmitChatInput,
    ])
}

fn index(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("Expected a number from 1, got: {:?}", arg)),
    }
}
