//! Command orchestration helpers from UI actions to backend command queue.

use std::{collections::VecDeque, time::Instant};

use crossbeam_channel::{Sender, TrySendError};
use dashboard_core::{Command, DashboardState};
use shared::error::DashboardError;

use crate::backend_bridge::commands::BackendCommand;

/// Queues `cmd` without blocking the frame. On failure `status` is set and
/// the reason is returned so the caller can unwind whatever it started.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> Result<(), DashboardError> {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => {
            tracing::warn!(command = cmd_name, "backend command queue full");
            *status = "UI command queue is full; please retry".to_string();
            Err(DashboardError::Transport("UI command queue is full".into()))
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::error!(command = cmd_name, "backend command processor disconnected");
            *status =
                "Backend command processor disconnected (possible startup/runtime failure); restart the dashboard"
                    .to_string();
            Err(DashboardError::Transport(
                "backend command processor disconnected".into(),
            ))
        }
    }
}

/// Queues every gateway call the reducer asked for, in order. A command that
/// cannot be queued is fed back to `state` as a failed completion so no view
/// is left waiting on a result that will never arrive.
pub fn dispatch_dashboard_commands(
    cmd_tx: &Sender<BackendCommand>,
    state: &mut DashboardState,
    commands: Vec<Command>,
    status: &mut String,
    now: Instant,
) {
    let mut pending: VecDeque<Command> = commands.into();
    while let Some(command) = pending.pop_front() {
        let retained = command.clone();
        if let Err(err) =
            dispatch_backend_command(cmd_tx, BackendCommand::Dashboard(command), status)
        {
            pending.extend(state.apply(retained.into_failure(err), now));
        }
    }
}
