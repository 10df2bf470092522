// Application state and orchestration logic.
//
// The central event loop that coordinates user commands from the UI and
// results from the coverage service. Owns the comparison form, the result
// grid and the error line, and pushes a fresh snapshot to the UI after every
// change.

use std::sync::Arc;

use coverscout_core::error::Failure;
use coverscout_core::grid::ComparisonGrid;
use coverscout_core::model::{BillingInterval, Game, SolverResponse};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::{CoverageSolver, FetchError, OptionSource};
use crate::config::Config;
use crate::form::ComparisonForm;
use crate::protocol::{
    AppSnapshot, ColumnView, GridRowView, GridSnapshot, PickerAction, PickerKind, UiUpdate,
    UserCommand, View,
};

// ---------------------------------------------------------------------------
// Fetch events
// ---------------------------------------------------------------------------

/// Results of background requests, delivered back to the event loop.
#[derive(Debug)]
pub enum FetchEvent {
    Games(Result<Vec<Game>, FetchError>),
    Teams(Result<Vec<String>, FetchError>),
    Tournaments(Result<Vec<String>, FetchError>),
    Solved {
        generation: u64,
        outcome: Result<SolverResponse, FetchError>,
    },
}

/// Fetch all three option lists concurrently and report each one.
pub fn spawn_option_fetch(
    source: Arc<dyn OptionSource>,
    tx: mpsc::Sender<FetchEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let (games, teams, tournaments) =
            tokio::join!(source.games(), source.teams(), source.tournaments());
        for event in [
            FetchEvent::Games(games),
            FetchEvent::Teams(teams),
            FetchEvent::Tournaments(tournaments),
        ] {
            if tx.send(event).await.is_err() {
                debug!("event loop gone before option lists arrived");
                return;
            }
        }
    })
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub form: ComparisonForm,
    pub view: View,
    /// The current result, replaced wholesale on every successful solve.
    pub grid: Option<ComparisonGrid>,
    pub error: Option<String>,
    /// Monotonically increasing counter identifying the latest solver
    /// request. Bumped on every submit and every reset; responses from older
    /// generations are discarded in `handle_fetch_event`.
    pub solve_generation: u64,
    pub current_solve: Option<JoinHandle<()>>,
    solver: Arc<dyn CoverageSolver>,
    fetch_tx: mpsc::Sender<FetchEvent>,
}

impl AppState {
    pub fn new(
        config: &Config,
        solver: Arc<dyn CoverageSolver>,
        fetch_tx: mpsc::Sender<FetchEvent>,
    ) -> Self {
        Self::with_form(ComparisonForm::new(config), solver, fetch_tx)
    }

    pub fn with_form(
        form: ComparisonForm,
        solver: Arc<dyn CoverageSolver>,
        fetch_tx: mpsc::Sender<FetchEvent>,
    ) -> Self {
        AppState {
            form,
            view: View::Form,
            grid: None,
            error: None,
            solve_generation: 0,
            current_solve: None,
            solver,
            fetch_tx,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.current_solve
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Validate the form and send its query to the solver, superseding any
    /// request still in flight.
    pub fn submit(&mut self) {
        let query = match self.form.build_query() {
            Ok(query) => query,
            Err(e) => {
                info!("Submit rejected: {}", e);
                self.error = Some(e.to_string());
                return;
            }
        };

        self.cancel_solve();
        self.solve_generation += 1;
        let generation = self.solve_generation;
        info!(
            generation,
            games = query.games.len(),
            teams = query.teams.len(),
            tournaments = query.tournaments.len(),
            all_games = query.all_games,
            "Submitting coverage query"
        );

        let solver = Arc::clone(&self.solver);
        let tx = self.fetch_tx.clone();
        self.current_solve = Some(tokio::spawn(async move {
            let outcome = solver.solve(&query).await;
            let _ = tx.send(FetchEvent::Solved { generation, outcome }).await;
        }));
    }

    /// "New comparison": drop the result and the error and blank the form.
    pub fn reset(&mut self) {
        self.cancel_solve();
        self.solve_generation += 1;
        self.form.reset();
        self.grid = None;
        self.error = None;
        self.view = View::Form;
    }

    /// Abort the in-flight solver request, if any.
    pub fn cancel_solve(&mut self) {
        if let Some(task) = self.current_solve.take() {
            task.abort();
        }
    }

    /// Build an `AppSnapshot` from the current application state.
    pub fn build_snapshot(&self) -> AppSnapshot {
        let billing = self.form.billing();
        AppSnapshot {
            view: self.view,
            games: self.form.snapshot(PickerKind::Games),
            teams: self.form.snapshot(PickerKind::Teams),
            tournaments: self.form.snapshot(PickerKind::Tournaments),
            all_games: self.form.all_games(),
            billing,
            formats: self.form.formats(),
            error: self.error.clone(),
            submitting: self.is_submitting(),
            grid: self.grid.as_ref().map(|g| grid_snapshot(g, billing)),
        }
    }
}

/// Render-ready copy of the grid's visible rows and price summary.
pub fn grid_snapshot(grid: &ComparisonGrid, billing: BillingInterval) -> GridSnapshot {
    let schema = grid.schema();
    let columns = schema
        .columns
        .iter()
        .map(|c| ColumnView {
            name: c.name.clone(),
            yearly_price: c.yearly_price.clone(),
            monthly_price: c.monthly_price.clone(),
            is_highlighted: c.is_highlighted,
            band: c.band,
        })
        .collect();
    let rows = grid
        .visible_rows()
        .into_iter()
        .map(|r| GridRowView {
            key: r.row.key.clone(),
            path: r.path.clone(),
            depth: r.depth,
            expandable: r.expandable,
            expanded: r.expanded,
            cells: schema
                .columns
                .iter()
                .map(|c| {
                    [
                        c.cell(r.row, c.leaves[0].format),
                        c.cell(r.row, c.leaves[1].format),
                    ]
                })
                .collect(),
        })
        .collect();
    GridSnapshot {
        key_header: schema.key_header.to_string(),
        columns,
        rows,
        summary: grid.price_summary(billing),
        games_not_covered: grid.games_not_covered().map(<[Game]>::len),
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on two channels using `tokio::select!`:
/// 1. User commands from the UI
/// 2. Results of option-list and solver requests
///
/// Pushes UI updates through `ui_tx` for the render loop.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut fetch_rx: mpsc::Receiver<FetchEvent>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");
    send_snapshot(&state, &ui_tx).await;

    let mut fetch_open = true;

    loop {
        tokio::select! {
            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- Fetch results (only poll while the channel is open) ---
            event = fetch_rx.recv(), if fetch_open => {
                match event {
                    Some(event) => {
                        handle_fetch_event(&mut state, event, &ui_tx).await;
                    }
                    None => {
                        info!("Fetch channel closed");
                        fetch_open = false;
                    }
                }
            }
        }
    }

    state.cancel_solve();
    info!("Application event loop exiting");
    Ok(())
}

async fn send_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let snapshot = state.build_snapshot();
    let _ = ui_tx.send(UiUpdate::Snapshot(Box::new(snapshot))).await;
}

/// Handle a user command from the UI.
async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let changed = match cmd {
        UserCommand::Picker { kind, action } => {
            if matches!(action, PickerAction::Open | PickerAction::Type(_)) {
                state.form.close_others(kind);
            }
            state.form.apply(kind, action)
        }
        UserCommand::ToggleAllGames => {
            state.form.toggle_all_games();
            info!("All games: {}", state.form.all_games());
            true
        }
        UserCommand::ToggleBilling => {
            state.form.toggle_billing();
            info!("Billing interval: {:?}", state.form.billing());
            true
        }
        UserCommand::ToggleFormat(format) => {
            state.form.toggle_format(format);
            debug!(?format, formats = ?state.form.formats(), "format toggled");
            true
        }
        UserCommand::Submit => {
            state.submit();
            true
        }
        UserCommand::NewComparison => {
            info!("New comparison");
            state.reset();
            true
        }
        UserCommand::ToggleRow(path) => match state.grid.as_mut() {
            Some(grid) => grid.toggle(&path),
            None => false,
        },
        UserCommand::SetRowExpanded { path, expanded } => match state.grid.as_mut() {
            Some(grid) => {
                let was = grid.is_expanded(&path);
                grid.set_expanded(&path, expanded) && was != expanded
            }
            None => false,
        },
        UserCommand::Quit => {
            // Handled in the main loop
            false
        }
    };

    if changed {
        send_snapshot(state, ui_tx).await;
    }
}

/// Handle the result of a background request.
async fn handle_fetch_event(
    state: &mut AppState,
    event: FetchEvent,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match event {
        FetchEvent::Games(Ok(games)) => {
            info!("Loaded {} games", games.len());
            state.form.load_games(games);
        }
        FetchEvent::Teams(Ok(teams)) => {
            info!("Loaded {} teams", teams.len());
            state.form.load_names(PickerKind::Teams, teams);
        }
        FetchEvent::Tournaments(Ok(tournaments)) => {
            info!("Loaded {} tournaments", tournaments.len());
            state.form.load_names(PickerKind::Tournaments, tournaments);
        }
        FetchEvent::Games(Err(e)) | FetchEvent::Teams(Err(e)) | FetchEvent::Tournaments(Err(e)) => {
            // Option-source failures leave the picker as it was.
            warn!("Failed to load options: {}", e);
            return;
        }
        FetchEvent::Solved {
            generation,
            outcome,
        } => {
            if generation != state.solve_generation {
                debug!(
                    "Discarding stale solver response (response gen: {}, current gen: {})",
                    generation, state.solve_generation
                );
                return;
            }
            state.current_solve = None;
            handle_solver_outcome(state, outcome);
        }
    }
    send_snapshot(state, ui_tx).await;
}

fn handle_solver_outcome(state: &mut AppState, outcome: Result<SolverResponse, FetchError>) {
    let failure = match outcome {
        Ok(response) if response.result.is_empty() => Failure::EmptyResult,
        Ok(response) => {
            info!(
                packages = response.packages.len(),
                rows = response.rows.len(),
                result = response.result.len(),
                "Solver returned a result"
            );
            if let Some(missing) = &response.games_not_covered {
                if !missing.is_empty() {
                    info!("{} selected games are not covered by any package", missing.len());
                }
            }
            state.grid = Some(ComparisonGrid::new(response));
            state.view = View::Results;
            state.error = None;
            return;
        }
        Err(e) => {
            warn!("Solver request failed: {}", e);
            e.into_solver_failure()
        }
    };
    state.error = failure.user_message();
}
