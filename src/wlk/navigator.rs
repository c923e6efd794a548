//! Turn day index entries into byte ranges of the file.

use super::{HeaderBlock, HEADER_SIZE, NUM_DAY_INDEXES, RECORD_SIZE};

use crate::errors::WlkDataErr;

/// The contiguous run of records for one day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayRun {
    /// Day of the month, 1 through 31.
    pub day: u32,
    /// Number of records, daily summaries included.
    pub records: usize,
    /// Byte offset of the first record from the start of the file.
    pub offset: u64,
}

impl HeaderBlock {
    /// Byte offset of the record at `start_pos`.
    pub fn day_offset(start_pos: u32) -> u64 {
        HEADER_SIZE as u64 + RECORD_SIZE as u64 * u64::from(start_pos)
    }

    /// Locate the records for `day`.
    ///
    /// Days outside 1 through 31 and days without records give `None`.
    pub fn day_run(&self, day: u32) -> Result<Option<DayRun>, WlkDataErr> {
        if day == 0 || day as usize >= NUM_DAY_INDEXES {
            return Ok(None);
        }

        let entry = &self.day_index[day as usize];
        if entry.day_in_month != day {
            return Err(WlkDataErr::LogicError("day index out of step with day of month"));
        }

        if entry.records_in_day <= 0 {
            return Ok(None);
        }

        if entry.start_pos < 0 {
            return Err(WlkDataErr::InvalidDayIndex {
                day,
                start_pos: entry.start_pos,
            });
        }

        Ok(Some(DayRun {
            day,
            records: entry.records_in_day as usize,
            offset: Self::day_offset(entry.start_pos as u32),
        }))
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
