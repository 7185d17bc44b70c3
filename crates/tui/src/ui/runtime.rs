//! Runtime: terminal lifecycle and the event loop.
//!
//! Responsibilities
//! - Own the terminal lifecycle (raw mode, alternate screen, mouse capture).
//! - Drive a single loop over terminal input, animation ticks and Ctrl+C.
//! - Route input to [`MainView`] and apply the returned [`Effect`]s.
//! - Re-derive the route from the store after every handled event.
//! - Rebuild the rat-focus ring before every frame.
//!
//! Ticking is fast (one upload step) while uploads are running or the
//! stepper title is waiting to collapse, and slow when idle.

use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::StreamExt;
use impugna_engine::upload::UPLOAD_TICK_MS;
use ratatui::{Terminal, prelude::CrosstermBackend};
use tokio::{
    signal,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::app::{App, Effect, ExitReason, Msg, SessionOutcome};
use crate::ui::components::Component;
use crate::ui::main_component::MainView;

type Backend = CrosstermBackend<Stdout>;

const IDLE_INTERVAL: Duration = Duration::from_millis(5000);

fn setup_terminal() -> Result<Terminal<Backend>> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture).context("failed to enter the alternate screen")?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout)).context("failed to create the terminal")?;
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

fn render(terminal: &mut Terminal<Backend>, app: &mut App, main_view: &mut MainView) -> Result<()> {
    // Rebuild focus just before rendering so step changes are reflected.
    app.rebuild_focus();
    terminal.draw(|frame| main_view.render(frame, frame.area(), app))?;
    Ok(())
}

fn is_interrupt(event: &Event) -> bool {
    matches!(
        event,
        Event::Key(key) if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
    )
}

fn handle_input_event(app: &mut App, main_view: &mut MainView, event: Event) -> Vec<Effect> {
    match event {
        // Windows reports presses and releases; act on presses only.
        Event::Key(key) if key.kind == KeyEventKind::Press => main_view.handle_key_events(app, key),
        Event::Key(_) => Vec::new(),
        Event::Mouse(mouse) => main_view.handle_mouse_events(app, mouse),
        Event::Resize(width, height) => main_view.handle_message(app, &Msg::Resize(width, height)),
        Event::FocusGained | Event::FocusLost | Event::Paste(_) => Vec::new(),
    }
}

/// Applies effects in order; stops at the first one that ends the session.
fn apply_effects(app: &mut App, effects: Vec<Effect>) -> Option<ExitReason> {
    effects.into_iter().find_map(|effect| app.apply_effect(effect))
}

/// Runs one wizard session to completion.
pub async fn run_app(mut app: App) -> Result<SessionOutcome> {
    let mut main_view = MainView::new();
    let mut terminal = setup_terminal()?;
    let outcome = event_loop(&mut terminal, &mut app, &mut main_view).await;
    // Restore the terminal even when the loop failed.
    let cleanup = cleanup_terminal(&mut terminal);
    let reason = outcome?;
    cleanup?;
    info!(?reason, "wizard session ended");
    Ok(app.finish(reason))
}

async fn event_loop(terminal: &mut Terminal<Backend>, app: &mut App, main_view: &mut MainView) -> Result<ExitReason> {
    let mut events = EventStream::new();

    let fast_interval = Duration::from_millis(UPLOAD_TICK_MS);
    let mut current_interval = IDLE_INTERVAL;
    let mut ticker = time::interval(current_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    render(terminal, app, main_view)?;

    // Some terminals drop resize notifications; compare sizes after each event.
    let mut last_size: Option<(u16, u16)> = crossterm::terminal::size().ok();

    loop {
        let target_interval = if app.needs_animation(Instant::now()) {
            fast_interval
        } else {
            IDLE_INTERVAL
        };
        if target_interval != current_interval {
            current_interval = target_interval;
            ticker = time::interval(current_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }

        let mut needs_render = false;
        let mut effects = Vec::new();
        tokio::select! {
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(event)) => {
                        if is_interrupt(&event) {
                            return Ok(ExitReason::Interrupted);
                        }
                        effects.extend(handle_input_event(app, main_view, event));
                        needs_render = true;
                    }
                    Some(Err(error)) => {
                        warn!(%error, "failed to read terminal event");
                        return Err(error).context("terminal input failed");
                    }
                    None => {
                        debug!("terminal event stream closed");
                        return Ok(ExitReason::Interrupted);
                    }
                }
            }
            _ = ticker.tick() => {
                let animating = current_interval == fast_interval;
                effects.extend(main_view.handle_message(app, &Msg::Tick));
                needs_render = animating;
            }
            _ = signal::ctrl_c() => {
                return Ok(ExitReason::Interrupted);
            }
        }

        if let Some(reason) = apply_effects(app, effects) {
            return Ok(reason);
        }
        if app.sync_route() {
            needs_render = true;
        }

        if let Ok(size) = crossterm::terminal::size()
            && last_size != Some(size)
        {
            last_size = Some(size);
            app.update(&Msg::Resize(size.0, size.1));
            needs_render = true;
        }

        if needs_render {
            render(terminal, app, main_view)?;
        }
    }
}
