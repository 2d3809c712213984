use std::time::Duration;

use crate::core::{ConnectivityState, ReachabilityProbe};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(5);

/// Polls a [`ReachabilityProbe`] at a fixed interval and publishes the result.
pub struct ConnectivityMonitor<P: ReachabilityProbe> {
    probe: P,
    interval: Duration,
}

impl<P: ReachabilityProbe + 'static> ConnectivityMonitor<P> {
    pub fn new(probe: P, interval: Duration) -> Self {
        Self { probe, interval }
    }

    /// Starts polling on a background task. The receiver starts at `Checking`
    /// and is only notified when the state actually changes.
    pub fn spawn(self) -> (watch::Receiver<ConnectivityState>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(ConnectivityState::Checking);
        let handle = tokio::spawn(self.run(tx));
        (rx, handle)
    }

    async fn run(self, tx: watch::Sender<ConnectivityState>) {
        tracing::debug!("Connectivity monitor started, interval {:?}", self.interval);
        loop {
            let state = ConnectivityState::from_probe(self.probe.probe().await);

            let changed = tx.send_if_modified(|current| {
                if *current == state {
                    false
                } else {
                    *current = state;
                    true
                }
            });
            if changed {
                tracing::info!("Connectivity changed to {:?}", state);
            }

            if tx.is_closed() {
                tracing::debug!("Connectivity monitor stopped, no receivers left");
                break;
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}
