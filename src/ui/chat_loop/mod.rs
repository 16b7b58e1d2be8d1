//! Main chat event loop.
//!
//! Terminal input is read on a background task and forwarded over an mpsc
//! channel. Each submitted prompt runs on its own task; its outcome comes back
//! over the same channel and is applied only if the conversation it belongs
//! to is still current.

mod keybindings;
mod lifecycle;

use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use self::keybindings::{handle_key, handle_paste, KeyContext, KeyResult};
use self::lifecycle::{restore_terminal, setup_terminal, ChatTerminal};
use crate::core::gateway::{GatewayError, ModelGateway};
use crate::core::session::PendingRequest;
use crate::ui::renderer::{chat_areas, ui};
use crate::ui::state::ChatApp;
use crate::utils::clipboard::{copy_with_fallback, ClipboardSink, SystemClipboard};

pub enum UiEvent {
    Crossterm(Event),
    Reply {
        pending: PendingRequest,
        result: Result<String, GatewayError>,
    },
}

const MAX_FPS: u64 = 30;

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

/// Run `pending` on its own task and report back, unless it was cancelled.
fn spawn_request(
    gateway: ModelGateway,
    pending: PendingRequest,
    event_tx: mpsc::UnboundedSender<UiEvent>,
) {
    tokio::spawn(async move {
        match pending.run(&gateway).await {
            Some(result) => {
                let _ = event_tx.send(UiEvent::Reply { pending, result });
            }
            None => debug!(request_id = pending.id, "request cancelled before completion"),
        }
    });
}

fn key_context(terminal: &ChatTerminal, input: &str) -> KeyContext {
    let size = terminal.size().unwrap_or_default();
    let areas = chat_areas(ratatui::layout::Rect::new(0, 0, size.width, size.height), input);
    KeyContext {
        transcript_width: areas.transcript.width,
        viewport_height: areas.transcript.height,
    }
}

/// Copy the targeted assistant message and record the outcome on `app`.
fn copy_selected(app: &mut ChatApp, sink: &dyn ClipboardSink) {
    let Some((index, message)) = app.copy_target() else {
        app.set_status("Nothing to copy yet", Instant::now());
        return;
    };
    let outcome = copy_with_fallback(sink, &message.content).map_err(|err| err.to_string());
    if let Ok(tier) = &outcome {
        info!(message = index, %tier, "copied assistant message");
    }
    app.record_copy(index, outcome, Instant::now());
}

struct EventOutcome {
    request_redraw: bool,
    events_processed: bool,
}

fn process_ui_events(
    app: &mut ChatApp,
    terminal: &ChatTerminal,
    gateway: &ModelGateway,
    clipboard: &dyn ClipboardSink,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    event_tx: &mpsc::UnboundedSender<UiEvent>,
) -> EventOutcome {
    let mut outcome = EventOutcome {
        request_redraw: false,
        events_processed: false,
    };

    while let Ok(ev) = event_rx.try_recv() {
        outcome.events_processed = true;
        match ev {
            UiEvent::Crossterm(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                let ctx = key_context(terminal, app.input_text());
                match handle_key(app, key, ctx) {
                    KeyResult::Submit(pending) => {
                        spawn_request(gateway.clone(), pending, event_tx.clone());
                        outcome.request_redraw = true;
                    }
                    KeyResult::Copy => {
                        copy_selected(app, clipboard);
                        outcome.request_redraw = true;
                    }
                    KeyResult::Exit => {
                        app.exit_requested = true;
                        break;
                    }
                    KeyResult::Handled => outcome.request_redraw = true,
                    KeyResult::Ignored => {}
                }
            }
            UiEvent::Crossterm(Event::Paste(text)) => {
                handle_paste(app, &text);
                outcome.request_redraw = true;
            }
            UiEvent::Crossterm(Event::Resize(_, _)) => outcome.request_redraw = true,
            UiEvent::Crossterm(_) => {}
            UiEvent::Reply { pending, result } => {
                if !app.apply_reply(&pending, result) {
                    warn!(request_id = pending.id, "dropped reply for a cleared conversation");
                }
                outcome.request_redraw = true;
            }
        }
    }
    outcome
}

fn try_draw_frame(
    app: &ChatApp,
    terminal: &mut ChatTerminal,
    request_redraw: &mut bool,
    last_draw: &mut Instant,
    frame_duration: Duration,
) -> io::Result<()> {
    if !*request_redraw {
        return Ok(());
    }
    let now = Instant::now();
    if now.duration_since(*last_draw) < frame_duration {
        return Ok(());
    }
    terminal.draw(|f| ui(f, app))?;
    *last_draw = now;
    *request_redraw = false;
    Ok(())
}

/// Run the full-screen chat until the user quits.
pub async fn run_chat(gateway: ModelGateway, mut app: ChatApp) -> Result<(), Box<dyn Error>> {
    let mut terminal = setup_terminal()?;
    info!(model = %app.model, keys = gateway.pool().len(), "chat session started");

    let clipboard = SystemClipboard::new();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx.clone());

    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut last_draw = Instant::now() - frame_duration;
    let mut request_redraw = true;

    let result: Result<(), Box<dyn Error>> = loop {
        if app.exit_requested {
            break Ok(());
        }

        if let Err(err) = try_draw_frame(
            &app,
            &mut terminal,
            &mut request_redraw,
            &mut last_draw,
            frame_duration,
        ) {
            break Err(err.into());
        }

        let outcome = process_ui_events(
            &mut app,
            &terminal,
            &gateway,
            &clipboard,
            &mut event_rx,
            &event_tx,
        );
        if outcome.request_redraw || app.is_animating(Instant::now()) {
            request_redraw = true;
        }

        if !outcome.events_processed {
            tokio::time::sleep(Duration::from_millis(16)).await;
        }
    };

    event_reader_handle.abort();
    restore_terminal(&mut terminal)?;
    info!("chat session ended");
    result
}
