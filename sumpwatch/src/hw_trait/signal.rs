use super::Result;
use crate::types::{RawReading, Reading};

/// Instantaneous reader of the monitored line.
///
/// A source is exclusively owned by one [`MonitorSession`] for the
/// lifetime of the process. `read` reports whatever the line shows right
/// now; mapping to a pump state happens in the monitor.
///
/// [`MonitorSession`]: crate::monitor::MonitorSession
pub trait SignalSource: Send {
    /// Short backend name for log output.
    fn name(&self) -> &str;

    /// The line this source is attached to.
    fn pin(&self) -> u32;

    /// Read the current raw value of the line.
    fn read(&mut self) -> Result<RawReading>;

    /// Release any resources held for reading the line.
    ///
    /// Must be idempotent: calling it again, or on a source whose setup
    /// only partially completed, is not an error.
    fn release(&mut self) -> Result<()>;
}

/// Source used when no hardware backend is configured.
///
/// Every read reports [`Reading::RAW_UNKNOWN`], so a monitor driven by it
/// never fans out.
#[derive(Debug)]
pub struct NullSource {
    pin: u32,
}

impl NullSource {
    pub fn new(pin: u32) -> Self {
        Self { pin }
    }
}

impl SignalSource for NullSource {
    fn name(&self) -> &str {
        "null"
    }

    fn pin(&self) -> u32 {
        self.pin
    }

    fn read(&mut self) -> Result<RawReading> {
        Ok(Reading::RAW_UNKNOWN)
    }

    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}
