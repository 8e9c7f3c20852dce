use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::MonitorSession;
use crate::error::Error;
use crate::tracing::prelude::*;

/// Edge detector for read failures, so a fault that persists across ticks
/// is reported when it starts and when it clears rather than on every poll.
#[derive(Debug, Default)]
struct ReadHealth {
    failing: bool,
}

impl ReadHealth {
    /// Record a failed read; true if reads were healthy until now.
    fn failed(&mut self) -> bool {
        !std::mem::replace(&mut self.failing, true)
    }

    /// Record a successful read; true if reads were failing until now.
    fn recovered(&mut self) -> bool {
        std::mem::replace(&mut self.failing, false)
    }
}

/// Poll `session` every `poll_interval` until `running` is cancelled.
///
/// Each tick runs one [`MonitorSession::poll`] to completion before the
/// next is considered; late ticks are skipped rather than bunched. Sink
/// and read errors are logged and monitoring continues. Releasing the
/// session is left to the caller, which owns it.
pub async fn run(session: &mut MonitorSession, poll_interval: Duration, running: CancellationToken) {
    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        pin = session.pin(),
        listeners = session.listener_count(),
        interval = ?poll_interval,
        "Waiting for events"
    );

    let mut health = ReadHealth::default();
    loop {
        tokio::select! {
            _ = running.cancelled() => {
                info!("Monitor shutdown requested");
                break;
            }
            _ = interval.tick() => {
                let result = session.poll().await;
                if let Err(Error::Hardware(e)) = &result {
                    if health.failed() {
                        error!(error = %e, "Failed to read signal");
                    } else {
                        trace!(error = %e, "Signal still unreadable");
                    }
                    continue;
                }
                if health.recovered() {
                    info!("Signal readable again");
                }
                if let Err(e) = result {
                    warn!(error = %e, "State change not fully delivered");
                }
            }
        }
    }

    trace!("Monitor loop stopped.");
}
