//! Terminal chat client.
//!
//! # Usage
//!
//! ```bash
//! # The token is read from the environment
//! export CHATLINE_TOKEN=...
//! chatline
//!
//! # Desktop notifications with a custom geometry
//! chatline --notify --notify-geometry 0,0,300,80
//!
//! # Plain output, no timestamps
//! chatline --no-color --no-timestamps
//! ```
//!
//! # Commands
//!
//! While chatting, lines starting with a colon are commands:
//! - `:h` - Show available commands
//! - `:g`, `:c`, `:p` - Choose a community, a channel, or a direct message
//! - `:me <text>` - Send an action message
//! - `:q` or an empty line - Exit
//!
//! Set `CHATLINE_LOG` (e.g. `CHATLINE_LOG=debug`) for diagnostics on stderr.

use std::io::IsTerminal;
use std::sync::Arc;

use arrrg::CommandLine;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use chatline::chat::{
    ChatArgs, ChatConfig, ChatSession, Console, EVENT_QUEUE_DEPTH, EditorSource, LineSource,
    ReaderSource, spawn_poller, spawn_printer,
};
use chatline::{Presence, RestClient, Transport};

/// Exit status used when interrupted, as a shell would report SIGINT.
const EXIT_INTERRUPTED: i32 = 130;

/// Main entry point for the chatline application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("chatline [OPTIONS]");
    let config = ChatConfig::from(args);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CHATLINE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // The editor handles Ctrl+C at the prompt; this covers a stalled request.
    ctrlc::set_handler(|| std::process::exit(EXIT_INTERRUPTED))?;

    // On a terminal all output goes through the line editor so it is redrawn
    // around the prompt rather than written over it.
    let (mut input, console): (Box<dyn LineSource>, Console) = if std::io::stdin().is_terminal()
    {
        let mut editor = EditorSource::new("> ")?;
        let writer = editor.console_writer()?;
        let console = Console::with_writer(writer, config.use_color, config.show_timestamps);
        (Box::new(editor) as Box<dyn LineSource>, console)
    } else {
        let reader = ReaderSource::new(BufReader::new(tokio::io::stdin()));
        let console = Console::stdout(config.use_color, config.show_timestamps);
        (Box::new(reader) as Box<dyn LineSource>, console)
    };

    let client = match RestClient::with_options(None, config.base_url.clone(), config.timeout) {
        Ok(client) => Arc::new(client),
        Err(err) => fatal(&console, &err),
    };

    let me = match client.current_user().await {
        Ok(user) => user,
        Err(err) => fatal(&console, &err),
    };
    console.print_header(&format!("chatline: signed in as {}", me.display_name()));
    console.print_info("Type :h for commands, :q or an empty line to exit\n");

    let presence = Presence::online().with_text(config.status_text.clone());
    if let Err(err) = client.set_presence(&presence).await {
        tracing::warn!(%err, "could not set presence");
    }

    let mut session = ChatSession::new(client.clone(), console.clone());
    if let Err(err) = session.start(input.as_mut()).await {
        fatal(&console, &err);
    }

    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    let poller = spawn_poller(
        client,
        session.subscribe(),
        config.backlog,
        config.poll_interval,
        events_tx,
    );
    let printer = spawn_printer(events_rx, console.clone(), config.notifier(), me.id);

    session.run(input.as_mut()).await?;

    poller.abort();
    printer.abort();
    Ok(())
}

fn fatal(console: &Console, err: &chatline::Error) -> ! {
    console.print_error(&err.to_string());
    std::process::exit(1);
}
