//! Hours/minutes/seconds wall clock advanced by the scheduler.

use core::str::FromStr;

/// Time of day with one-second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WallTime {
    hour: u8,
    minute: u8,
    second: u8,
}

/// Wall clock errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// Hour, minute or second outside 0..24 / 0..60 / 0..60.
    OutOfRange,

    /// Text is not `HH:MM:SS`, optionally preceded by a date and a space.
    Malformed,
}

impl core::fmt::Display for ClockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ClockError::OutOfRange => write!(f, "time of day out of range"),
            ClockError::Malformed => write!(f, "expected time formatted as HH:MM:SS"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ClockError {}

impl WallTime {
    /// Midnight.
    pub const MIDNIGHT: Self = Self {
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// Creates a validated time of day.
    ///
    /// # Errors
    /// Returns `OutOfRange` unless `hour < 24`, `minute < 60` and `second < 60`.
    pub const fn new(hour: u8, minute: u8, second: u8) -> Result<Self, ClockError> {
        if hour >= 24 || minute >= 60 || second >= 60 {
            return Err(ClockError::OutOfRange);
        }
        Ok(Self {
            hour,
            minute,
            second,
        })
    }

    /// Hour of the day, `0..24`.
    #[inline]
    pub const fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute of the hour, `0..60`.
    #[inline]
    pub const fn minute(&self) -> u8 {
        self.minute
    }

    /// Second of the minute, `0..60`.
    #[inline]
    pub const fn second(&self) -> u8 {
        self.second
    }

    /// Advances by one second, wrapping 60 s → 1 min, 60 min → 1 h, 24 h → 0.
    ///
    /// Returns true when the clock wrapped past midnight.
    pub fn advance_second(&mut self) -> bool {
        self.second += 1;
        if self.second < 60 {
            return false;
        }
        self.second = 0;

        self.minute += 1;
        if self.minute < 60 {
            return false;
        }
        self.minute = 0;

        self.hour += 1;
        if self.hour < 24 {
            return false;
        }
        self.hour = 0;
        true
    }

    /// Seconds elapsed since midnight.
    pub const fn seconds_since_midnight(&self) -> u32 {
        self.hour as u32 * 3600 + self.minute as u32 * 60 + self.second as u32
    }
}

impl core::fmt::Display for WallTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// Parses `HH:MM:SS`, or `YYYY-MM-DD HH:MM:SS` as sent by the weather host,
/// in which case the date part is ignored.
impl FromStr for WallTime {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let time = match s.rsplit_once(' ') {
            Some((_date, time)) => time,
            None => s,
        };

        let mut fields = time.split(':');
        let hour = parse_field(fields.next())?;
        let minute = parse_field(fields.next())?;
        let second = parse_field(fields.next())?;
        if fields.next().is_some() {
            return Err(ClockError::Malformed);
        }

        WallTime::new(hour, minute, second)
    }
}

fn parse_field(field: Option<&str>) -> Result<u8, ClockError> {
    let field = field.ok_or(ClockError::Malformed)?;
    if field.is_empty() || field.len() > 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClockError::Malformed);
    }
    field.parse::<u8>().map_err(|_| ClockError::Malformed)
}
