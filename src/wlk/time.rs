//! Absolute times for records.
//!
//! Records only store minutes past midnight. The day comes from the day index and the year and
//! month from the file name, so a file must be named `<year>-<month>.wlk`.

use std::{fmt, path::Path, str::FromStr};

use chrono::{NaiveDate, TimeZone, Utc};

use crate::errors::WlkDataErr;

/// Minutes in a day, the largest valid packed time.
pub const MINUTES_PER_DAY: i16 = 1440;

/// The year and month a file covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileIdentity {
    /// Calendar year.
    pub year: i32,
    /// Month of the year, 1 through 12.
    pub month: u32,
}

impl FileIdentity {
    /// Take the identity from the stem of a file name.
    pub fn from_path(path: &Path) -> Result<Self, WlkDataErr> {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| WlkDataErr::InvalidFileIdentity(path.display().to_string()))?;

        stem.parse()
    }
}

impl FromStr for FileIdentity {
    type Err = WlkDataErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || WlkDataErr::InvalidFileIdentity(s.to_owned());

        let mut parts = s.splitn(2, '-');
        let year = parts.next().ok_or_else(bad)?;
        let month = parts.next().ok_or_else(bad)?;

        if year.is_empty() || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        if month.is_empty() || !month.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }

        let year: i32 = year.parse().map_err(|_| bad())?;
        let month: u32 = month.parse().map_err(|_| bad())?;
        if !(1..=12).contains(&month) {
            return Err(bad());
        }

        Ok(FileIdentity { year, month })
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Seconds since the Unix epoch for `packed` minutes past midnight UTC of the given day.
///
/// A packed time of 1440 is the following midnight.
pub fn decode_time(year: i32, month: u32, day: u32, packed: i16) -> Result<i64, WlkDataErr> {
    if !(0..=MINUTES_PER_DAY).contains(&packed) {
        return Err(WlkDataErr::InvalidPackedTime(packed));
    }

    let midnight = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or(WlkDataErr::InvalidDate { year, month, day })?;

    let midnight = Utc.from_utc_datetime(&midnight).timestamp();

    Ok(midnight + i64::from(packed) * 60)
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
