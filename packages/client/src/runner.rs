//! Client event loop.
//!
//! One task processes operator input and socket events one at a time, so the
//! session needs no locking. Readline runs on its own thread and feeds lines
//! through a channel, as the socket tasks feed their events.

use std::time::Duration;

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::{mpsc, watch};

use crate::{
    config::ClientConfig,
    connection::Transport,
    error::ClientError,
    formatter::MessageFormatter,
    infrastructure::WebSocketTransport,
    session::Session,
    ui::{InputAction, TranscriptPrinter, parse_input, prompt, redisplay_prompt},
};

/// How long `/quit` waits for the socket's final close signal; longer than
/// the transport's own close handshake timeout
const CLOSE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Run the interactive client until the operator quits
pub async fn run_client(config: ClientConfig) -> Result<(), ClientError> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut session = Session::from_config(&config, WebSocketTransport::new(event_tx));
    let mut printer = TranscriptPrinter::default();

    print!("{}", MessageFormatter::format_banner(&config));

    let (prompt_tx, prompt_rx) = watch::channel(prompt(session.state(), session.room_id()));
    let mut input_rx = spawn_readline(prompt_rx)?;

    if config.auto_connect {
        session.connect();
    }

    loop {
        refresh(&session, &mut printer, &prompt_tx);

        tokio::select! {
            line = input_rx.recv() => {
                // Readline thread ended (Ctrl+C / Ctrl+D)
                let Some(line) = line else { break };
                let (flow, output) = apply_input(&mut session, parse_input(&line));
                print!("{}", output);
                if flow == Flow::Quit {
                    break;
                }
            }
            Some(event) = event_rx.recv() => session.handle_event(event),
        }
    }

    if session.disconnect() {
        let drained = tokio::time::timeout(CLOSE_TIMEOUT, async {
            while let Some(event) = event_rx.recv().await {
                session.handle_event(event);
                if session.state().is_disconnected() {
                    break;
                }
            }
        })
        .await;
        if drained.is_err() {
            tracing::warn!("Close handshake did not finish within {:?}", CLOSE_TIMEOUT);
        }
        print!("{}", printer.render(session.transcript()));
    }

    tracing::info!("Client session ended");
    Ok(())
}

/// Print new transcript entries and publish the current prompt
fn refresh<T: Transport>(
    session: &Session<T>,
    printer: &mut TranscriptPrinter,
    prompt_tx: &watch::Sender<String>,
) {
    let current = prompt(session.state(), session.room_id());
    let output = printer.render(session.transcript());
    if !output.is_empty() {
        print!("\n{}", output);
        redisplay_prompt(&current);
    }
    prompt_tx.send_replace(current);
}

/// Apply one parsed input line; returns local output that is not part of the transcript
fn apply_input<T: Transport>(session: &mut Session<T>, action: InputAction) -> (Flow, String) {
    let output = match action {
        InputAction::Connect => {
            if !session.connect() {
                tracing::debug!("Already {}", session.state());
            }
            String::new()
        }
        InputAction::Disconnect => {
            session.disconnect();
            String::new()
        }
        InputAction::Hello(version) => {
            session.hello(version);
            String::new()
        }
        InputAction::Goodbye => {
            session.goodbye();
            String::new()
        }
        InputAction::Join => {
            session.join();
            String::new()
        }
        InputAction::Part => {
            session.part();
            String::new()
        }
        InputAction::Chat(text) => {
            session.chat(&text);
            String::new()
        }
        InputAction::Room(room_id) => match session.set_room(&room_id) {
            Ok(()) => String::new(),
            Err(e) => MessageFormatter::format_error(&e.to_string()),
        },
        InputAction::Status => MessageFormatter::format_status(
            session.state(),
            session.manager().endpoint(),
            session.room_id(),
        ),
        InputAction::Help => MessageFormatter::format_help().to_string(),
        InputAction::Unknown(input) => MessageFormatter::format_unknown_command(&input),
        InputAction::Quit => return (Flow::Quit, String::new()),
    };
    (Flow::Continue, output)
}

/// Spawn a blocking thread for rustyline (synchronous readline)
fn spawn_readline(
    prompt_rx: watch::Receiver<String>,
) -> Result<mpsc::UnboundedReceiver<String>, ClientError> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::Builder::new()
        .name("readline".to_string())
        .spawn(move || {
            let mut rl = match DefaultEditor::new() {
                Ok(rl) => rl,
                Err(e) => {
                    tracing::error!("Failed to initialize readline: {}", e);
                    return;
                }
            };

            loop {
                let prompt = prompt_rx.borrow().clone();
                match rl.readline(&prompt) {
                    Ok(line) => {
                        // Chat content keeps its whitespace; only blank lines are skipped
                        if !line.trim().is_empty() {
                            rl.add_history_entry(line.as_str()).ok();
                            if input_tx.send(line).is_err() {
                                // Channel closed, exit thread
                                break;
                            }
                        }
                    }
                    Err(ReadlineError::Interrupted) => {
                        tracing::info!("Interrupted");
                        break;
                    }
                    Err(ReadlineError::Eof) => {
                        tracing::info!("EOF");
                        break;
                    }
                    Err(err) => {
                        tracing::error!("Readline error: {}", err);
                        break;
                    }
                }
            }
        })?;

    Ok(input_rx)
}
