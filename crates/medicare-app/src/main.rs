mod cli;
mod repl;
mod view;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter};

use medicare_capture::CaptureDevice;
use medicare_core::config::MedicareConfig;
use medicare_core::events::EventBus;
use medicare_core::types::{mime_for_file_name, SourceBlob};
use medicare_gateway::HttpService;
use medicare_notify::{Clipboard, MemoryClipboard, SystemClipboard};
use medicare_session::{Coordinator, Dispatch, Intent};

use cli::{CliArgs, ClipboardKind};
use repl::Command;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Tracing goes to stderr; stdout belongs to the view. RUST_LOG wins;
    // otherwise the level is set again once the config file is read.
    let rust_log = std::env::var_os("RUST_LOG").is_some();
    let initial = args.log_level.clone().unwrap_or_else(|| "info".to_string());
    let (filter, filter_handle) = reload::Layer::new(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&initial)),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Medicare v{}", env!("CARGO_PKG_VERSION"));

    let config_path = args.resolve_config_path();
    let mut config = MedicareConfig::load_or_default(&config_path);
    args.apply(&mut config);
    config.validate()?;

    if !rust_log {
        let level = args.resolve_log_level(&config);
        if let Err(e) = filter_handle.reload(EnvFilter::new(&level)) {
            tracing::warn!(error = %e, "Failed to apply log level");
        }
    }

    if args.save_config {
        config.save(&config_path)?;
        println!("{}", config_path.display());
        return Ok(());
    }

    let service = HttpService::new(config.backend.clone())?;
    tracing::info!(base_url = %config.backend.base_url, "Backend configured");

    let camera = args.camera_backend()?;
    let clipboard: Arc<dyn Clipboard> = match args.clipboard {
        ClipboardKind::System => Arc::new(SystemClipboard::new()),
        ClipboardKind::Memory => Arc::new(MemoryClipboard::new()),
    };

    let events = EventBus::default();
    let client = Coordinator::new(&config, Arc::new(service), camera, clipboard, events.clone());

    run(client, &events, config.analysis.max_upload_bytes).await?;
    tracing::info!("Medicare stopped");
    Ok(())
}

/// Read commands from stdin until EOF or `/quit`, applying completions and
/// printing events as they arrive.
async fn run<D: CaptureDevice + 'static>(
    mut client: Coordinator<D>,
    events: &EventBus,
    max_upload_bytes: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut rx = events.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", view::render(&client));
    println!("{}", repl::HELP);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match repl::parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(Command::Help)) => println!("{}", repl::HELP),
                    Ok(Some(Command::Upload(path))) => match read_upload(&path, max_upload_bytes).await {
                        Ok(Some(blob)) => {
                            report(client.dispatch(Intent::UploadFile(blob)));
                            println!("{}", view::render(&client));
                        }
                        Ok(None) => {
                            tracing::warn!(path = %path.display(), limit = max_upload_bytes, "Upload rejected");
                            client.notifier().notify(client.context().strings().file_too_large);
                        }
                        Err(e) => println!("{}: {}", path.display(), e),
                    },
                    Ok(Some(Command::Dispatch(intents))) => {
                        for intent in intents {
                            report(client.dispatch(intent));
                        }
                        println!("{}", view::render(&client));
                    }
                    Err(message) => println!("{}", message),
                }
            }
            Some(completion) = client.next_completion() => {
                client.apply(completion);
                println!("{}", view::render(&client));
            }
            event = rx.recv() => match event {
                Ok(event) => {
                    if let Some(line) = view::render_event(&event, client.context().strings()) {
                        println!("{}", line);
                    }
                }
                Err(RecvError::Lagged(n)) => tracing::warn!(skipped = n, "Event stream lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    // Give the camera back before exiting.
    client.dispatch(Intent::StopCamera);
    Ok(())
}

fn report(outcome: Dispatch) {
    tracing::debug!(?outcome, "Intent handled");
}

/// Read `path` for analysis. Returns `Ok(None)` without reading the
/// contents when the file is over `limit` bytes.
async fn read_upload(path: &Path, limit: usize) -> std::io::Result<Option<SourceBlob>> {
    let size = tokio::fs::metadata(path).await?.len();
    if size > limit as u64 {
        return Ok(None);
    }
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let mime_type = mime_for_file_name(&name);
    Ok(Some(SourceBlob::new(name, mime_type, bytes)))
}
