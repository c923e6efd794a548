//! Module for errors.
use std::path::PathBuf;

use thiserror::Error;

/// Error from decoding a file or from the archive interface.
#[derive(Debug, Error)]
pub enum WlkDataErr {
    // Inherited errors from std
    /// Error forwarded from std
    #[error("std lib io error: {0}")]
    IO(#[from] std::io::Error),

    // Other forwarded errors
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Invalid glob pattern for selecting input files.
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    // Errors in the file format.
    /// Not enough bytes for a complete header block.
    #[error("malformed header: needed {needed} bytes, found {found}")]
    MalformedHeader {
        /// Bytes required for a header block.
        needed: usize,
        /// Bytes actually available.
        found: usize,
    },
    /// The id code at the start of the file is not a known format.
    #[error("unrecognized file format, id code: {0:02x?}")]
    UnrecognizedFormat([u8; 16]),
    /// A day index entry for a non-empty day points before the first record.
    #[error("invalid index for day {day}: start position {start_pos}")]
    InvalidDayIndex {
        /// Day of the month.
        day: u32,
        /// The start position found in the header.
        start_pos: i32,
    },
    /// A record had a type tag other than weather data or daily summary.
    #[error("unknown record type {record_type} at record {index} of day {day}")]
    UnknownRecordType {
        /// The type tag found in byte 0.
        record_type: u8,
        /// Day of the month being read.
        day: u32,
        /// Position of the record within the day.
        index: usize,
    },
    /// The rain field carried a collector type code with no known bucket size.
    #[error("unknown rain collector type: {0:#06x}")]
    UnknownRainCollectorType(u16),
    /// Minutes past midnight outside 0..=1440.
    #[error("invalid packed time: {0}")]
    InvalidPackedTime(i16),
    /// Year, month, and day do not form a calendar date.
    #[error("invalid date: {year}-{month:02}-{day:02}")]
    InvalidDate {
        /// Year from the file identity.
        year: i32,
        /// Month from the file identity.
        month: u32,
        /// Day from the day index.
        day: u32,
    },
    /// The file name does not carry a `<year>-<month>` stem.
    #[error("invalid file identity, expected a <year>-<month> file name: {0}")]
    InvalidFileIdentity(String),
    /// The file ended in the middle of a day.
    #[error("file truncated on day {day}, read {read} of {expected} records")]
    TruncatedFile {
        /// Day of the month being read.
        day: u32,
        /// Records read before the end of the file.
        read: usize,
        /// Records the day index promised.
        expected: usize,
    },

    // My own errors from this crate
    /// The database structure is wrong.
    #[error("invalid archive schema")]
    InvalidSchema,
    /// None of the sources named any files.
    #[error("no input files found")]
    NoInputFiles,
    /// A source directory does not exist or is not a directory.
    #[error("invalid source directory: {}", .0.display())]
    InvalidSourceDirectory(PathBuf),
    /// There was an internal logic error.
    #[error("internal logic error: {0}")]
    LogicError(&'static str),
}

impl WlkDataErr {
    /// True for errors that mean the byte offsets in a file can no longer be trusted, so the rest
    /// of that file must be abandoned.
    pub fn is_format_error(&self) -> bool {
        use crate::errors::WlkDataErr::*;

        matches!(
            self,
            MalformedHeader { .. }
                | UnrecognizedFormat(_)
                | InvalidDayIndex { .. }
                | UnknownRecordType { .. }
                | UnknownRainCollectorType(_)
                | InvalidPackedTime(_)
                | InvalidDate { .. }
                | InvalidFileIdentity(_)
        )
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_format_errors() {
        assert!(WlkDataErr::InvalidPackedTime(1441).is_format_error());
        assert!(WlkDataErr::UnknownRainCollectorType(0x4000).is_format_error());
        assert!(!WlkDataErr::NoInputFiles.is_format_error());
        assert!(!WlkDataErr::TruncatedFile {
            day: 3,
            read: 1,
            expected: 4
        }
        .is_format_error());
    }

    #[test]
    fn test_display() {
        let err = WlkDataErr::UnknownRainCollectorType(0x4000);
        assert_eq!(err.to_string(), "unknown rain collector type: 0x4000");

        let err = WlkDataErr::InvalidDate {
            year: 2024,
            month: 2,
            day: 30,
        };
        assert_eq!(err.to_string(), "invalid date: 2024-02-30");
    }
}
