//! Concrete signal sources.
//!
//! [`open`] picks the backend named in the configuration. With no backend
//! configured the monitor runs against a [`NullSource`], which keeps the
//! loop alive but never reports a state.

mod simulated;
mod sysfs;

use clap::ValueEnum;
use rand::SeedableRng;
use rand::rngs::StdRng;
use strum::Display;
use time::OffsetDateTime;

pub use simulated::SimulatedSource;
pub use sysfs::SysfsGpio;

use crate::config::{SourceConfig, SourceKind};
use crate::hw_trait::{NullSource, Result, SignalSource};
use crate::synthetic;
use crate::tracing::prelude::*;

/// Hardware access backends selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display)]
#[strum(serialize_all = "lowercase")]
pub enum GpioBackend {
    /// Linux sysfs GPIO interface (`/sys/class/gpio`).
    Sysfs,
    /// Synthetic pump activity, no hardware required.
    Simulated,
}

/// Open the signal source described by `config`.
///
/// Failure here is fatal for the daemon: the monitor must not start
/// without its line.
pub fn open(config: &SourceConfig) -> Result<Box<dyn SignalSource>> {
    let source: Box<dyn SignalSource> = match &config.kind {
        SourceKind::Null => {
            info!(pin = config.pin, "GPIO disabled, no readings will be reported");
            Box::new(NullSource::new(config.pin))
        }
        SourceKind::Sysfs { root, active_low } => {
            info!(pin = config.pin, root = %root.display(), "Using sysfs GPIO");
            Box::new(SysfsGpio::open(root, config.pin, *active_low)?)
        }
        SourceKind::Simulated {
            events,
            repeat,
            time_scale,
            seed,
        } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(*seed),
                None => StdRng::from_entropy(),
            };
            let start = OffsetDateTime::now_utc();
            let stream = synthetic::generate_with(&mut rng, start, *events);
            info!(
                pin = config.pin,
                events = stream.len(),
                repeat = *repeat,
                time_scale = ?time_scale,
                "Using simulated pump activity"
            );
            let source = SimulatedSource::new(config.pin, stream, *repeat);
            Box::new(match time_scale {
                Some(scale) => source.paced(start, *scale),
                None => source,
            })
        }
    };

    Ok(source)
}

/// [`open`] on the blocking thread pool.
///
/// Sysfs setup sleeps while the kernel creates the pin, which must not
/// stall the async runtime.
pub async fn open_blocking(config: SourceConfig) -> Result<Box<dyn SignalSource>> {
    tokio::task::spawn_blocking(move || open(&config)).await?
}
