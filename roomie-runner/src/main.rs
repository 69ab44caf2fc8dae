mod command;
mod render;

use anyhow::Result;
use command::Command;
use roomie_client::{MessageApi, MessageService};
use roomie_core::Config;
use roomie_messaging::{MessagingSession, SessionError, SessionEvent};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing;
use tracing_subscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Roomie messaging client");

    // Load configuration
    let config = Config::from_env();
    config.validate()?;
    let api = Arc::new(MessageService::new(&config.api)?);

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let session = MessagingSession::new(api, &config.session).with_events(event_tx);

    let session_clone = session.clone();
    tokio::spawn(async move {
        render_events(session_clone, event_rx).await;
    });

    session.load_conversations().await;
    println!("{}", render::conversations(&session.snapshot().await));
    println!("type /help for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        let command = match command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        if command == Command::Quit {
            break;
        }
        handle(&session, command).await;
    }

    tracing::info!("Bye");
    Ok(())
}

async fn handle<A: MessageApi>(session: &MessagingSession<A>, command: Command) {
    match command {
        Command::List => {
            session.load_conversations().await;
            println!("{}", render::conversations(&session.snapshot().await));
        }
        Command::Open(arg) => {
            let state = session.snapshot().await;
            let Some(id) = render::resolve_conversation(&state, &arg) else {
                println!("no conversation `{}`", arg);
                return;
            };
            // messages are rendered by the scroll event once the page lands
            if let Err(e) = session.select(&id).await {
                println!("{}", e);
            }
        }
        Command::Back => {
            session.deselect().await;
            println!("{}", render::conversations(&session.snapshot().await));
        }
        Command::Older => {
            if session.load_older().await {
                println!("{}", render::messages(&session.snapshot().await));
            } else {
                println!("no older messages");
            }
        }
        Command::Send(text) => {
            session.set_draft(text).await;
            match session.send_draft().await {
                Ok(Some(_)) => {}
                Ok(None) => println!("nothing to send"),
                // API failures are already reported by the SendFailed event
                Err(SessionError::Api(e)) => tracing::debug!("Send failed: {}", e),
                Err(e) => println!("{}", e),
            }
        }
        Command::Unread => {
            session.refresh_unread_total().await;
            println!("{} unread", session.snapshot().await.total_unread);
        }
        Command::Help => println!("{}", command::HELP),
        Command::Quit => {}
    }
}

async fn render_events<A: MessageApi>(
    session: MessagingSession<A>,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
) {
    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::ScrollToBottom => {
                println!("{}", render::messages(&session.snapshot().await));
            }
            SessionEvent::SendFailed(reason) => {
                eprintln!("!! message could not be sent: {}", reason);
            }
            SessionEvent::UnreadTotalChanged(total) => {
                println!("({} unread)", total);
            }
            SessionEvent::ConversationRead(id) => {
                tracing::debug!("Conversation {} marked read", id);
            }
        }
    }
}
