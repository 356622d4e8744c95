use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use super::{Millis, MAX_MILLIS};
use crate::error::{Entity, PlanError, Result};

/// Structured `HH:MM:SS,mmm` timestamp as written in subtitle files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub hours: u64,
    pub minutes: u8,
    pub seconds: u8,
    pub millis: u16,
}

impl Timestamp {
    /// Build from signed components, rejecting negatives and overflowing fields.
    pub fn new(hours: i64, minutes: i64, seconds: i64, millis: i64) -> Result<Self> {
        for (label, value) in [
            ("hours", hours),
            ("minutes", minutes),
            ("seconds", seconds),
            ("milliseconds", millis),
        ] {
            if value < 0 {
                return Err(invalid(format!("{} component {} is negative", label, value)));
            }
        }
        if minutes > 59 {
            return Err(invalid(format!("minutes {} exceed 59", minutes)));
        }
        if seconds > 59 {
            return Err(invalid(format!("seconds {} exceed 59", seconds)));
        }
        if millis > 999 {
            return Err(invalid(format!("milliseconds {} exceed 999", millis)));
        }
        let total = (hours as u64)
            .checked_mul(3_600_000)
            .and_then(|ms| ms.checked_add((minutes * 60_000 + seconds * 1000 + millis) as u64))
            .filter(|&ms| ms <= MAX_MILLIS);
        if total.is_none() {
            return Err(invalid(format!("{} hours is out of range", hours)));
        }
        Ok(Self {
            hours: hours as u64,
            minutes: minutes as u8,
            seconds: seconds as u8,
            millis: millis as u16,
        })
    }

    pub fn from_millis(time: Millis) -> Self {
        let total = time.as_millis();
        let total_secs = total / 1000;
        Self {
            hours: total_secs / 3600,
            minutes: ((total_secs % 3600) / 60) as u8,
            seconds: (total_secs % 60) as u8,
            millis: (total % 1000) as u16,
        }
    }

    /// Saturates for hand-built values past the range `new` accepts.
    pub fn to_millis(self) -> Millis {
        Millis::from_millis(
            self.hours
                .saturating_mul(3_600_000)
                .saturating_add(self.minutes as u64 * 60_000)
                .saturating_add(self.seconds as u64 * 1000)
                .saturating_add(self.millis as u64),
        )
    }
}

impl From<Millis> for Timestamp {
    fn from(time: Millis) -> Self {
        Self::from_millis(time)
    }
}

impl From<Timestamp> for Millis {
    fn from(stamp: Timestamp) -> Self {
        stamp.to_millis()
    }
}

impl FromStr for Timestamp {
    type Err = PlanError;

    /// Accepts `HH:MM:SS,mmm` and `HH:MM:SS.mmm`.
    fn from_str(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let parts: Vec<&str> = raw.split(':').collect();
        if parts.len() != 3 {
            return Err(invalid(format!("'{}' is not HH:MM:SS,mmm", raw)));
        }
        let (secs_part, millis_part) = match parts[2].split_once([',', '.']) {
            Some((secs, frac)) => (secs, frac),
            None => (parts[2], "0"),
        };
        if millis_part.is_empty() || millis_part.len() > 3 {
            return Err(invalid(format!(
                "'{}' needs one to three millisecond digits",
                raw
            )));
        }
        // ",5" means 500ms, not 5ms
        let millis = parse_component(millis_part, "milliseconds")?
            * 10_i64.pow(3 - millis_part.len() as u32);

        Timestamp::new(
            parse_component(parts[0], "hours")?,
            parse_component(parts[1], "minutes")?,
            parse_component(secs_part, "seconds")?,
            millis,
        )
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02},{:03}",
            self.hours, self.minutes, self.seconds, self.millis
        )
    }
}

fn parse_component(raw: &str, label: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| invalid(format!("{} component '{}' is not a number", label, raw)))
}

fn invalid(reason: String) -> PlanError {
    PlanError::invalid_timestamp(Entity::Field, reason)
}
