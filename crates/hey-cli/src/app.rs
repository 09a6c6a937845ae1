use anyhow::Result;
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use hey_core::{
    ChatClient, ChatSession, ConversationStore, DuckChatClient, HeyError, Settings, TurnEvent,
    TurnResponse,
};
use std::io::{self, Write};
use tokio::sync::mpsc;

use crate::commands::exit;
use crate::theme::Theme;

/// How the terminal should report a turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Skip the progress line on stderr.
    pub quiet: bool,
}

// ── Single turn ─────────────────────────────────────────────────────────

/// Ask `query` against DuckDuckGo, printing the answer as it streams.
/// Returns the process exit status.
pub async fn run_query(
    settings: &Settings,
    store: &ConversationStore,
    query: &str,
    options: OutputOptions,
) -> Result<u8> {
    let http = match settings.build_http_client() {
        Ok(http) => http,
        Err(e) => {
            eprintln!("{}", Theme::detect().error(&e.to_string()));
            return Ok(exit::REQUEST_FAILED);
        }
    };
    let client = DuckChatClient::new(http);
    run_query_with(Box::new(client), settings, store, query, options).await
}

/// Same as [`run_query`] with an explicit backend.
pub async fn run_query_with(
    client: Box<dyn ChatClient>,
    settings: &Settings,
    store: &ConversationStore,
    query: &str,
    options: OutputOptions,
) -> Result<u8> {
    let theme = Theme::detect();
    let session = ChatSession::new(client, store, settings.model.clone())
        .with_system_prompt(settings.prompt.clone());

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<TurnEvent>();

    let printer = async {
        let mut progress = ProgressLine::new(options.quiet, &theme);
        while let Some(event) = event_rx.recv().await {
            match event {
                TurnEvent::Started { resumed } => progress.show(resumed),
                TurnEvent::TextDelta(text) => {
                    progress.clear();
                    print!("{text}");
                    let _ = io::stdout().flush();
                }
                TurnEvent::Complete => println!(),
                TurnEvent::Error(_) => progress.clear(),
            }
        }
        progress.clear();
    };

    let turn = async {
        let (result, ()) = tokio::join!(session.handle_turn(query, event_tx), printer);
        result
    };

    let result = tokio::select! {
        result = turn => result,
        _ = tokio::signal::ctrl_c() => Err(HeyError::Cancelled),
    };

    Ok(report(result, &theme))
}

fn report(result: Result<TurnResponse, HeyError>, theme: &Theme) -> u8 {
    match result {
        Ok(response) => {
            if let Some(e) = response.persist_error {
                eprintln!(
                    "{}",
                    theme.warning(&format!("Warning: conversation not saved: {e}"))
                );
            }
            exit::OK
        }
        Err(HeyError::Cancelled) => {
            eprintln!();
            eprintln!("{}", theme.muted("Interrupted."));
            exit::INTERRUPTED
        }
        Err(e) => {
            eprintln!("{}", theme.error(&e.to_string()));
            exit::REQUEST_FAILED
        }
    }
}

/// Transient "waiting" line on stderr, removed once text arrives.
struct ProgressLine<'t> {
    enabled: bool,
    visible: bool,
    theme: &'t Theme,
}

impl<'t> ProgressLine<'t> {
    fn new(quiet: bool, theme: &'t Theme) -> Self {
        Self {
            enabled: !quiet,
            visible: false,
            theme,
        }
    }

    fn show(&mut self, resumed: bool) {
        if !self.enabled {
            return;
        }
        let label = if resumed {
            "Continuing conversation..."
        } else {
            "Asking DuckDuckGo AI..."
        };
        eprint!("{}", self.theme.muted(label));
        let _ = io::stderr().flush();
        self.visible = true;
    }

    fn clear(&mut self) {
        if !self.visible {
            return;
        }
        let mut stderr = io::stderr();
        if self.theme.enabled {
            let _ = execute!(stderr, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine));
        } else {
            let _ = writeln!(stderr);
        }
        self.visible = false;
    }
}

// ── Clear ───────────────────────────────────────────────────────────────

pub fn run_clear(store: &ConversationStore) -> Result<u8> {
    let theme = Theme::detect();
    match store.clear() {
        Ok(()) => {
            println!("{}", theme.success("Conversation history cleared."));
            Ok(exit::OK)
        }
        Err(e) => {
            eprintln!("{}", theme.error(&e.to_string()));
            Ok(exit::REQUEST_FAILED)
        }
    }
}
