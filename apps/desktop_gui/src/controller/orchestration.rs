//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues a command for the backend worker. Returns `false` when the
/// command was dropped (queue full or worker gone), so callers must not
/// record it as in flight.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = match &cmd {
        BackendCommand::Refresh => "refresh",
        BackendCommand::LoadForEdit { .. } => "load_for_edit",
        BackendCommand::Create { .. } => "create",
        BackendCommand::Update { .. } => "update",
        BackendCommand::Delete { .. } => "delete",
    };

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status =
                "Backend command processor disconnected (possible startup/runtime failure); restart the app"
                    .to_string();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::EmployeeId;

    #[test]
    fn dispatch_reports_enqueued_command() {
        let (cmd_tx, _cmd_rx) = crossbeam_channel::bounded(1);
        let mut status = String::new();
        assert!(dispatch_backend_command(
            &cmd_tx,
            BackendCommand::Refresh,
            &mut status
        ));
        assert!(status.is_empty());
    }

    #[test]
    fn dispatch_reports_full_queue() {
        let (cmd_tx, _cmd_rx) = crossbeam_channel::bounded(0);
        let mut status = String::new();
        assert!(!dispatch_backend_command(
            &cmd_tx,
            BackendCommand::Delete { id: EmployeeId(1) },
            &mut status
        ));
        assert!(status.contains("queue is full"));
    }

    #[test]
    fn dispatch_reports_disconnected_worker() {
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded::<BackendCommand>(1);
        drop(cmd_rx);
        let mut status = String::new();
        assert!(!dispatch_backend_command(
            &cmd_tx,
            BackendCommand::Refresh,
            &mut status
        ));
        assert!(status.contains("disconnected"));
    }
}
