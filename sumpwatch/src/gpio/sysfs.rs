//! GPIO input via the Linux sysfs interface.
//!
//! The pin is exported through `<root>/export` if it isn't already, set to
//! input, and read from `<root>/gpio<N>/value`. Only a pin this process
//! exported is unexported on release, so a line set up by someone else
//! (e.g. a boot script) is left alone.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::hw_trait::{HwError, Result, SignalSource};
use crate::tracing::prelude::*;
use crate::types::RawReading;

/// The kernel creates the pin directory asynchronously after an export,
/// and udev may still be fixing permissions when it appears.
const EXPORT_SETTLE_ATTEMPTS: u32 = 20;
const EXPORT_SETTLE_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub struct SysfsGpio {
    root: PathBuf,
    pin: u32,
    exported_by_us: bool,
    released: bool,
}

impl SysfsGpio {
    /// Export (if needed) and configure `pin` as an input under `root`.
    pub fn open(root: &Path, pin: u32, active_low: bool) -> Result<Self> {
        let mut gpio = Self {
            root: root.to_path_buf(),
            pin,
            exported_by_us: false,
            released: false,
        };

        // On error `gpio` is dropped here, which unexports anything we
        // exported before the failure.
        gpio.configure(active_low)?;
        Ok(gpio)
    }

    fn pin_dir(&self) -> PathBuf {
        self.root.join(format!("gpio{}", self.pin))
    }

    fn configure(&mut self, active_low: bool) -> Result<()> {
        let dir = self.pin_dir();

        if !dir.exists() {
            write_attr(&self.root.join("export"), &self.pin.to_string())?;
            self.exported_by_us = true;
            debug!(pin = self.pin, "Exported GPIO pin");
        }

        let direction = dir.join("direction");
        let mut attempt = 0;
        loop {
            match write_attr(&direction, "in") {
                Ok(()) => break,
                Err(e) if attempt + 1 < EXPORT_SETTLE_ATTEMPTS => {
                    trace!(pin = self.pin, attempt, error = %e, "Pin not ready yet");
                    attempt += 1;
                    thread::sleep(EXPORT_SETTLE_DELAY);
                }
                Err(e) => return Err(e),
            }
        }

        write_attr(&dir.join("active_low"), if active_low { "1" } else { "0" })?;

        // Fail at startup rather than on the first poll if the value
        // can't be read.
        self.read_value()?;
        Ok(())
    }

    fn read_value(&self) -> Result<RawReading> {
        let path = self.pin_dir().join("value");
        let text = fs::read_to_string(&path).map_err(|e| HwError::io(path.display(), e))?;
        text.trim().parse().map_err(|_| {
            HwError::InvalidParameter(format!(
                "unexpected value {:?} in {}",
                text.trim(),
                path.display()
            ))
        })
    }
}

fn write_attr(path: &Path, value: &str) -> Result<()> {
    fs::write(path, value).map_err(|e| HwError::io(path.display(), e))
}

impl SignalSource for SysfsGpio {
    fn name(&self) -> &str {
        "sysfs"
    }

    fn pin(&self) -> u32 {
        self.pin
    }

    fn read(&mut self) -> Result<RawReading> {
        if self.released {
            return Err(HwError::Released);
        }
        self.read_value()
    }

    fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        if self.exported_by_us {
            write_attr(&self.root.join("unexport"), &self.pin.to_string())?;
            debug!(pin = self.pin, "Unexported GPIO pin");
        }
        self.released = true;
        Ok(())
    }
}

impl Drop for SysfsGpio {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(pin = self.pin, error = %e, "Failed to release GPIO pin");
        }
    }
}
