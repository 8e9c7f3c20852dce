//! Sump pump monitor.
//!
//! Watches a single digital input wired to a sump pump, debounces noisy
//! re-reads into genuine on/off transitions, and fans each transition out
//! to a list of logging sinks (console, ThingSpeak, Healthchecks).
//!
//! The [`synthetic`] module generates plausible pump activity so the
//! monitor can be exercised without hardware.

pub mod config;
pub mod error;
pub mod gpio;
pub mod hw_trait;
pub mod monitor;
pub mod sink;
pub mod synthetic;
pub mod tracing;
pub mod types;
