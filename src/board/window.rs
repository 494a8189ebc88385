use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{CiboardError, Result};

pub const DEFAULT_TIMEZONE: &str = "Europe/Paris";
pub const DEFAULT_CUTOFF_HOUR: u32 = 8;

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| CiboardError::Config(format!("Unknown time zone '{name}': {e}")))
}

/// Start of today's board: `hour`:00 wall-clock time in `zone`, on the
/// calendar day `now` falls on in that zone.
pub fn cutoff_at(now: DateTime<Utc>, zone: Tz, hour: u32) -> Result<DateTime<Utc>> {
    let today = now.with_timezone(&zone).date_naive();
    let wall_clock = today
        .and_hms_opt(hour, 0, 0)
        .ok_or_else(|| CiboardError::InvalidCutoff(format!("hour {hour} is out of range")))?;

    zone.from_local_datetime(&wall_clock)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| CiboardError::InvalidCutoff(format!("{wall_clock} in {zone}")))
}

/// Pipelines updated strictly before the cutoff are off the board.
pub fn is_on_board(updated_at: DateTime<Utc>, cutoff: DateTime<Utc>) -> bool {
    updated_at >= cutoff
}
