use serde::Serialize;
use strum::Display;

/// Platform-defined raw value of the monitored line.
pub type RawReading = i32;

/// Stable state of the pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PumpState {
    On,
    Off,
}

impl PumpState {
    pub const RAW_ON: RawReading = 1;
    pub const RAW_OFF: RawReading = 0;

    /// Raw line value for this state, as reported by the hardware and
    /// pushed to numeric sinks.
    pub fn raw(self) -> RawReading {
        match self {
            PumpState::On => Self::RAW_ON,
            PumpState::Off => Self::RAW_OFF,
        }
    }
}

/// A raw reading mapped into the pump's state space.
///
/// `Unknown` covers anything that isn't a recognized on/off value,
/// including [`Reading::RAW_UNKNOWN`] from sources with no hardware
/// attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Reading {
    On,
    Off,
    Unknown,
}

impl Reading {
    pub const RAW_UNKNOWN: RawReading = -1;

    /// The stable state this reading represents, if any.
    pub fn state(self) -> Option<PumpState> {
        match self {
            Reading::On => Some(PumpState::On),
            Reading::Off => Some(PumpState::Off),
            Reading::Unknown => None,
        }
    }
}

impl From<RawReading> for Reading {
    fn from(raw: RawReading) -> Self {
        match raw {
            PumpState::RAW_ON => Reading::On,
            PumpState::RAW_OFF => Reading::Off,
            _ => Reading::Unknown,
        }
    }
}

impl From<PumpState> for Reading {
    fn from(state: PumpState) -> Self {
        match state {
            PumpState::On => Reading::On,
            PumpState::Off => Reading::Off,
        }
    }
}
