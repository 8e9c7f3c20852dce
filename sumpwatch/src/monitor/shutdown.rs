use std::future;
use std::io;

use crate::tracing::prelude::*;

/// Resolve once `signal` has been delivered.
///
/// A handler that can't be installed resolves `signal` with an error. That
/// is logged and this future then never completes, so a broken handler is
/// never mistaken for a shutdown request.
pub async fn wait_for_signal<F>(name: &str, signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Received {name}"),
        Err(e) => {
            error!(signal = name, error = %e, "Can't listen for signal");
            future::pending::<()>().await;
        }
    }
}

/// Resolve on SIGINT or, on Unix, SIGTERM.
pub async fn wait_for_shutdown() {
    let interrupt = wait_for_signal("SIGINT", tokio::signal::ctrl_c());

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let terminate = wait_for_signal("SIGTERM", async {
            let mut stream = signal(SignalKind::terminate())?;
            stream
                .recv()
                .await
                .ok_or_else(|| io::Error::other("SIGTERM stream closed"))
        });

        tokio::select! {
            _ = interrupt => {}
            _ = terminate => {}
        }
    }

    #[cfg(not(unix))]
    interrupt.await;
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn delivered_signal_resolves() {
        let waited = tokio::time::timeout(
            Duration::from_secs(1),
            wait_for_signal("SIGINT", async { Ok(()) }),
        )
        .await;

        assert!(waited.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_handler_never_resolves() {
        let waited = tokio::time::timeout(
            Duration::from_secs(3600),
            wait_for_signal("SIGINT", async { Err(io::Error::other("no handler")) }),
        )
        .await;

        assert!(waited.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn signal_arriving_later_resolves() {
        let waited = tokio::time::timeout(
            Duration::from_secs(10),
            wait_for_signal("SIGTERM", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            }),
        )
        .await;

        assert!(waited.is_ok());
    }
}
