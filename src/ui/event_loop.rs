use std::time::Duration;

use crate::core::{ConnectivityState, TranslationService};
use crate::domain::ports::{FileSelector, Presenter};
use crate::ui::controller::{Controller, JobOutcome};
use tokio::sync::{mpsc, watch};

/// How long quitting waits for a cancelled job to remove its partial output.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The presentation loop. Every presenter call happens on this task.
pub async fn run_event_loop<S, P, F>(
    mut controller: Controller<S, P, F>,
    mut connectivity: watch::Receiver<ConnectivityState>,
    mut commands: mpsc::Receiver<String>,
    mut outcomes: mpsc::UnboundedReceiver<JobOutcome>,
) where
    S: TranslationService + 'static,
    P: Presenter,
    F: FileSelector,
{
    let initial = *connectivity.borrow_and_update();
    controller.render();
    controller.on_connectivity(initial);

    let mut monitor_alive = true;
    loop {
        tokio::select! {
            changed = connectivity.changed(), if monitor_alive => match changed {
                Ok(()) => {
                    let state = *connectivity.borrow_and_update();
                    controller.on_connectivity(state);
                }
                Err(_) => {
                    tracing::warn!("Connectivity monitor stopped");
                    monitor_alive = false;
                    controller.on_connectivity(ConnectivityState::Disconnected);
                }
            },
            Some(outcome) = outcomes.recv() => controller.finish(outcome),
            line = commands.recv() => match line {
                Some(line) => {
                    if controller.handle_line(&line).is_break() {
                        break;
                    }
                }
                None => {
                    tracing::debug!("Input closed");
                    break;
                }
            },
        }
    }

    if controller.shutdown() {
        match tokio::time::timeout(SHUTDOWN_GRACE, outcomes.recv()).await {
            Ok(Some(outcome)) => controller.finish(outcome),
            Ok(None) => {}
            Err(_) => tracing::warn!("Translation did not stop within {:?}", SHUTDOWN_GRACE),
        }
    }
}
