// TUI: layout, input handling, and widget rendering.
//
// The TUI keeps a `ViewState` holding the latest `AppSnapshot` plus purely
// local state (focus, chip cursor, grid cursor). The event loop pushes snapshots over an
// mpsc channel; the TUI re-renders at ~30 fps and reports what it learned
// while rendering (list viewport sizes, wrapped row heights) back as
// commands.

pub mod input;
pub mod layout;
pub mod widgets;

use std::collections::HashMap;
use std::time::Duration;

use coverscout_app::protocol::{
    AppSnapshot, PickerAction, PickerKind, UiUpdate, UserCommand, View,
};
use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::{debug, info};

use layout::build_layout;
use widgets::picker::PickerFeedback;

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

/// Which part of the form receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Picker(PickerKind),
    Controls,
}

impl Focus {
    const ORDER: [Focus; 4] = [
        Focus::Picker(PickerKind::Games),
        Focus::Picker(PickerKind::Teams),
        Focus::Picker(PickerKind::Tournaments),
        Focus::Controls,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// Row heights already reported for one picker, keyed by sequence position.
/// Only valid for the window generation they were measured under.
#[derive(Debug, Default)]
struct ReportLog {
    generation: u64,
    heights: HashMap<usize, u32>,
}

/// TUI-local state for rendering.
///
/// `snapshot` is replaced wholesale by every update from the event loop;
/// everything else survives across snapshots.
pub struct ViewState {
    pub snapshot: AppSnapshot,
    pub focus: Focus,
    /// Chip under the cursor in the focused picker, if the user is walking
    /// the chips.
    pub chip_cursor: Option<usize>,
    /// Selected row of the results grid.
    pub grid_cursor: usize,
    viewports: HashMap<PickerKind, u32>,
    reported: HashMap<PickerKind, ReportLog>,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            snapshot: AppSnapshot::default(),
            focus: Focus::Picker(PickerKind::Games),
            chip_cursor: None,
            grid_cursor: 0,
            viewports: HashMap::new(),
            reported: HashMap::new(),
        }
    }
}

impl ViewState {
    pub fn apply_snapshot(&mut self, snapshot: AppSnapshot) {
        if snapshot.view != self.snapshot.view {
            self.grid_cursor = 0;
        }
        let rows = snapshot.grid.as_ref().map_or(0, |g| g.rows.len());
        self.grid_cursor = self.grid_cursor.min(rows.saturating_sub(1));
        self.chip_cursor = match self.focus {
            Focus::Picker(kind) if snapshot.view == View::Form => {
                let chips = snapshot.picker(kind).chosen.len();
                self.chip_cursor
                    .filter(|_| chips > 0)
                    .map(|i| i.min(chips - 1))
            }
            _ => None,
        };
        self.snapshot = snapshot;
    }

    /// Turn render-time observations into commands, dropping anything the
    /// event loop has already been told.
    pub fn feedback_commands(&mut self, feedback: Vec<PickerFeedback>) -> Vec<UserCommand> {
        let mut commands = Vec::new();
        for fb in feedback {
            if let Some(viewport) = fb.viewport {
                if self.viewports.get(&fb.kind) != Some(&viewport) {
                    self.viewports.insert(fb.kind, viewport);
                    commands.push(UserCommand::Picker {
                        kind: fb.kind,
                        action: PickerAction::SetViewport(viewport),
                    });
                }
            }

            let log = self.reported.entry(fb.kind).or_default();
            if log.generation != fb.generation {
                log.generation = fb.generation;
                log.heights.clear();
            }
            let heights: Vec<(usize, u32)> = fb
                .heights
                .into_iter()
                .filter(|(position, height)| log.heights.get(position) != Some(height))
                .collect();
            if heights.is_empty() {
                continue;
            }
            for &(position, height) in &heights {
                log.heights.insert(position, height);
            }
            commands.push(UserCommand::Picker {
                kind: fb.kind,
                action: PickerAction::Measured {
                    generation: fb.generation,
                    heights,
                },
            });
        }
        commands
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Snapshot(snapshot) => state.apply_snapshot(*snapshot),
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete frame and return what the pickers measured.
pub fn render_frame(frame: &mut Frame, state: &ViewState) -> Vec<PickerFeedback> {
    let layout = build_layout(frame.area());
    let mut feedback = Vec::new();

    widgets::status_bar::render(frame, layout.status_bar, state);
    match state.snapshot.view {
        View::Form => {
            for (kind, area) in PickerKind::ALL.into_iter().zip(layout.pickers) {
                let focused = state.focus == Focus::Picker(kind);
                feedback.push(widgets::picker::render(
                    frame,
                    area,
                    state.snapshot.picker(kind),
                    focused,
                    state.chip_cursor.filter(|_| focused),
                ));
            }
            widgets::controls::render(frame, layout.controls, state);
        }
        View::Results => {
            widgets::grid::render(frame, layout.main, state);
            widgets::grid::render_summary(frame, layout.controls, state);
        }
    }
    widgets::status_bar::render_message(frame, layout.message, state);
    widgets::status_bar::render_help(frame, layout.help_bar, state);

    feedback
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on clean exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    // 1. Initialize terminal
    let mut terminal = ratatui::init();

    // 2. Chain a restoring panic hook before the original one.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    // 3. Main loop
    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    None => {
                        info!("UI channel closed");
                        break;
                    }
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {
                        // Resize is picked up by the next render tick.
                    }
                    Some(Err(e)) => {
                        debug!("input error: {}", e);
                        break;
                    }
                    None => break,
                }
            }

            _ = render_tick.tick() => {
                let mut feedback = Vec::new();
                terminal.draw(|frame| feedback = render_frame(frame, &view_state))?;
                for cmd in view_state.feedback_commands(feedback) {
                    let _ = cmd_tx.send(cmd).await;
                }
            }
        }
    }

    // 4. Restore terminal
    ratatui::restore();

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
