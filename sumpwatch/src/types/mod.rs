mod event;
mod pump_state;

pub use event::{Event, WallClock, format_timestamp};
pub use pump_state::{PumpState, RawReading, Reading};
