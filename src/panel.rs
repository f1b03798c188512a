//! The panel loop: periodic status reads and toggle dispatch.
//!
//! One task owns the [`ViewState`] and awaits every request inline, so no
//! two requests can be in flight at once and no response can be applied
//! after shutdown. Snapshots go out through a stateful pipe.
use std::time::Duration;

use chrono::Local;
use lightwatch_common::controller::ViewState;
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error};

use crate::pipes::{self, Receiver};
use crate::{api, spawn, PIPE_SIZE};

/// A request from the user interface.
#[derive(Debug)]
pub enum Command {
    /// Read the status now, outside the regular poll.
    Refresh,

    /// Flip the power state, then read the status back.
    Toggle,

    /// Stop polling and end the panel task.
    Shutdown,
}

/// Start the panel.
///
/// Returns the pipe of state snapshots and the command channel. The task
/// polls once immediately, then every `poll_interval`. Sending
/// [`Command::Shutdown`] or dropping every command sender stops it; the
/// timer dies with the task.
#[must_use]
pub fn run(
    config: api::Config,
    poll_interval: Duration,
) -> (Receiver<ViewState>, mpsc::Sender<Command>) {
    let (tx_state, rx_state) = pipes::create_stateful_entity("panel_state");
    let (tx_cmd, mut rx_cmd) = mpsc::channel::<Command>(PIPE_SIZE);

    spawn("panel", async move {
        let mut state = ViewState::new();
        tx_state.try_send(state.clone());

        let mut timer = interval(poll_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            select! {
                _ = timer.tick() => {
                    fetch_status(&config, &mut state, &tx_state).await;
                }
                cmd = rx_cmd.recv() => {
                    match cmd {
                        Some(Command::Refresh) => {
                            fetch_status(&config, &mut state, &tx_state).await;
                        }
                        Some(Command::Toggle) => {
                            toggle_light(&config, &mut state, &tx_state).await;
                        }
                        Some(Command::Shutdown) | None => break,
                    }
                }
            }
        }

        debug!("panel: shutting down");
    });

    (rx_state, tx_cmd)
}

async fn fetch_status(config: &api::Config, state: &mut ViewState, tx: &pipes::Sender<ViewState>) {
    state.request_started();
    tx.try_send(state.clone());

    match api::get_status(config).await {
        Ok(status) => state.status_received(status, Local::now()),
        Err(err) => {
            error!("status read failed: {err}");
            state.status_failed();
        }
    }

    tx.try_send(state.clone());
}

async fn toggle_light(config: &api::Config, state: &mut ViewState, tx: &pipes::Sender<ViewState>) {
    state.request_started();
    tx.try_send(state.clone());

    match api::toggle(config).await {
        Ok(()) => {
            // The dispatcher holds no belief about the new state; the
            // follow-up read is the only source of truth.
            fetch_status(config, state, tx).await;
        }
        Err(err) => {
            error!("toggle failed: {err}");
            state.toggle_failed();
            tx.try_send(state.clone());
        }
    }
}
