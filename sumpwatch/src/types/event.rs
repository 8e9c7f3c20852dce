use std::fmt;

use serde::{Serialize, Serializer};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use super::PumpState;

const WALL_CLOCK: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second] UTC");

/// An instant displayed as `YYYY-MM-DD HH:MM:SS UTC`.
///
/// This is the wall-clock form used whenever a timestamp leaves the
/// process (sink output, generated streams). Sub-second precision is
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock(OffsetDateTime);

impl fmt::Display for WallClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.0.format(WALL_CLOCK).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// Wall-clock form of `at`, converted to UTC.
pub fn format_timestamp(at: OffsetDateTime) -> WallClock {
    WallClock(at.to_offset(UtcOffset::UTC))
}

fn serialize_timestamp<S: Serializer>(at: &OffsetDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&format_timestamp(*at))
}

/// A pump state observed (or synthesized) at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Event {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: OffsetDateTime,
    /// Position in the stream, starting at 1.
    pub sequence_id: u64,
    pub state: PumpState,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} #{} {}",
            format_timestamp(self.timestamp),
            self.sequence_id,
            self.state
        )
    }
}
