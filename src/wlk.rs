//! Reader for WeatherLink `.wlk` monthly archive files.
//!
//! A file is a 212 byte header block followed by 88 byte records. The header holds an index entry
//! for each day of the month giving the number of records for that day and the position of the
//! first one. Records of a day are contiguous, but there is no delimiter between days, so the only
//! way to find a day is through its index entry.

use std::{
    fs::File,
    io::{BufReader, ErrorKind, Read, Seek, SeekFrom},
    path::Path,
};

use tracing::debug;

use crate::{errors::WlkDataErr, observation::WeatherObservation};

pub use self::{
    fields::{reception_quality, CompassPoint, Field, FieldRule, RainCollector, StationModel},
    header::{DayIndex, HeaderBlock},
    navigator::DayRun,
    record::{Dispatched, RawRecord, RecordType, WeatherDataRecord},
    time::{decode_time, FileIdentity},
};

mod fields;
mod header;
mod navigator;
mod record;
mod time;

/// Size of the id code at the start of the header.
pub const ID_CODE_SIZE: usize = 16;
/// Id codes of supported files start with this.
pub const ID_CODE_PREFIX: &[u8] = b"WDAT5.";
/// Number of entries in the day index, entry 0 is unused.
pub const NUM_DAY_INDEXES: usize = 32;
/// Size of one day index entry.
pub const DAY_INDEX_SIZE: usize = 6;
/// Size of the header block.
pub const HEADER_SIZE: usize = ID_CODE_SIZE + 4 + NUM_DAY_INDEXES * DAY_INDEX_SIZE;
/// Size of every record.
pub const RECORD_SIZE: usize = 88;

/// Where a file ended early.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Truncation {
    /// Day of the month being read.
    pub day: u32,
    /// Records of that day read before the end of the file.
    pub read: usize,
    /// Records the day index promised.
    pub expected: usize,
}

/// Everything decoded from a single file.
#[derive(Debug)]
pub struct DecodedFile {
    /// Year and month of the file.
    pub identity: FileIdentity,
    /// Observations in file order.
    pub observations: Vec<WeatherObservation>,
    /// Set if the file ended before the last day was complete.
    pub truncated: Option<Truncation>,
}

/// Decodes the weather records of one `.wlk` file.
#[derive(Debug)]
pub struct WlkReader<R> {
    reader: R,
    identity: FileIdentity,
    header: HeaderBlock,
}

impl WlkReader<BufReader<File>> {
    /// Open a file, taking the year and month from its name.
    pub fn open(path: &dyn AsRef<Path>) -> Result<Self, WlkDataErr> {
        let identity = FileIdentity::from_path(path.as_ref())?;
        let file = File::open(path.as_ref())?;

        Self::new(BufReader::new(file), identity)
    }
}

impl<R: Read + Seek> WlkReader<R> {
    /// Read the header block from the start of `reader`.
    pub fn new(mut reader: R, identity: FileIdentity) -> Result<Self, WlkDataErr> {
        let header = HeaderBlock::read_from(&mut reader)?;

        debug!(
            year = identity.year,
            month = identity.month,
            total_records = header.total_records,
            "read header"
        );

        Ok(WlkReader {
            reader,
            identity,
            header,
        })
    }

    /// The header block of this file.
    pub fn header(&self) -> &HeaderBlock {
        &self.header
    }

    /// The year and month of this file.
    pub fn identity(&self) -> FileIdentity {
        self.identity
    }

    /// Iterate over the weather observations in day order.
    ///
    /// The iterator ends after the first error. A file that ends in the middle of a day yields a
    /// `TruncatedFile` error as its last item.
    pub fn observations(&mut self) -> Observations<'_, R> {
        Observations {
            wlk: self,
            next_day: 1,
            current: None,
            index: 0,
            done: false,
        }
    }

    /// Decode the whole file.
    ///
    /// Truncation is not an error, the observations read before the end are kept. Any other
    /// error abandons the file.
    pub fn decode_all(&mut self) -> Result<DecodedFile, WlkDataErr> {
        let identity = self.identity;
        let mut observations = vec![];
        let mut truncated = None;

        for obs in self.observations() {
            match obs {
                Ok(obs) => observations.push(obs),
                Err(WlkDataErr::TruncatedFile {
                    day,
                    read,
                    expected,
                }) => {
                    truncated = Some(Truncation {
                        day,
                        read,
                        expected,
                    })
                }
                Err(err) => return Err(err),
            }
        }

        Ok(DecodedFile {
            identity,
            observations,
            truncated,
        })
    }
}

/// Iterator over the observations in a file, see `WlkReader::observations`.
#[derive(Debug)]
pub struct Observations<'a, R> {
    wlk: &'a mut WlkReader<R>,
    next_day: u32,
    current: Option<DayRun>,
    index: usize,
    done: bool,
}

impl<'a, R: Read + Seek> Observations<'a, R> {
    fn fail(&mut self, err: WlkDataErr) -> Option<Result<WeatherObservation, WlkDataErr>> {
        self.done = true;
        Some(Err(err))
    }
}

impl<'a, R: Read + Seek> Iterator for Observations<'a, R> {
    type Item = Result<WeatherObservation, WlkDataErr>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let run = match self.current {
                Some(run) if self.index < run.records => run,
                Some(_) => {
                    self.current = None;
                    continue;
                }
                None => {
                    if self.next_day as usize >= NUM_DAY_INDEXES {
                        self.done = true;
                        break;
                    }

                    let day = self.next_day;
                    self.next_day += 1;

                    match self.wlk.header.day_run(day) {
                        Ok(Some(run)) => {
                            debug!(day, records = run.records, offset = run.offset, "reading day");
                            if let Err(err) = self.wlk.reader.seek(SeekFrom::Start(run.offset)) {
                                return self.fail(err.into());
                            }
                            self.current = Some(run);
                            self.index = 0;
                        }
                        Ok(None) => {}
                        Err(err) => return self.fail(err),
                    }
                    continue;
                }
            };

            let mut buf = [0u8; RECORD_SIZE];
            match read_fully(&mut self.wlk.reader, &mut buf) {
                Ok(RECORD_SIZE) => {}
                Ok(_) => {
                    return self.fail(WlkDataErr::TruncatedFile {
                        day: run.day,
                        read: self.index,
                        expected: run.records,
                    })
                }
                Err(err) => return self.fail(err.into()),
            }

            let index = self.index;
            self.index += 1;

            match RawRecord::new(buf).dispatch(run.day, index) {
                Ok(Dispatched::Weather(record)) => {
                    let obs = WeatherObservation::from_record(&record, self.wlk.identity, run.day);
                    if obs.is_err() {
                        self.done = true;
                    }
                    return Some(obs);
                }
                Ok(Dispatched::Summary(kind)) => {
                    debug!(day = run.day, index, ?kind, "skipping daily summary");
                }
                Err(err) => return self.fail(err),
            }
        }

        None
    }
}

/// Fill as much of `buf` as the reader allows, returning how many bytes were read. Only a short
/// count at the end of the stream is less than `buf.len()`.
pub(crate) fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }

    Ok(filled)
}

//
// Little-endian field access, callers guarantee the offsets are in bounds.
//
pub(crate) fn le_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

pub(crate) fn le_i16(buf: &[u8], at: usize) -> i16 {
    i16::from_le_bytes([buf[at], buf[at + 1]])
}

pub(crate) fn le_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

pub(crate) fn le_i32(buf: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

pub(crate) fn put(buf: &mut [u8], at: usize, bytes: &[u8]) {
    buf[at..at + bytes.len()].copy_from_slice(bytes);
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
pub(crate) mod unit {
    use super::*;

    use std::io::{Cursor, SeekFrom};

    // Build a file image from (day, records) pairs, laying the days out back to back.
    pub(crate) fn build_file(days: &[(u32, Vec<[u8; RECORD_SIZE]>)]) -> Vec<u8> {
        let mut header = HeaderBlock::new(b"WDAT5.0\0\0\0\0\0\0\0\x05\0");
        let mut records = vec![];

        for (day, day_records) in days {
            header.day_index[*day as usize].records_in_day = day_records.len() as i16;
            header.day_index[*day as usize].start_pos = records.len() as i32;
            records.extend(day_records.iter().cloned());
        }
        header.total_records = records.len() as u32;

        let mut data = header.to_bytes().to_vec();
        for record in records {
            data.extend_from_slice(&record);
        }

        data
    }

    pub(crate) fn weather_record(packed_time: i16) -> WeatherDataRecord {
        WeatherDataRecord {
            interval: 30,
            packed_time,
            out_temp: 452,
            high_out_temp: 460,
            low_out_temp: 441,
            in_temp: 688,
            barometer: 30_012,
            out_humidity: 655,
            in_humidity: 402,
            rain: 0x1003,
            high_rain_rate: 0x1000,
            wind_speed: 52,
            high_wind_speed: 120,
            wind_direction: 4,
            high_wind_direction: 5,
            wind_samples: 600,
            solar_rad: 0x7FFF,
            high_solar_rad: 0x7FFF,
            uv: 0xFF,
            high_uv: 0xFF,
            leaf_temp: [0xFF; 4],
            forecast: 193,
            soil_temp: [0xFF; 6],
            soil_moisture: [0xFF; 6],
            leaf_wetness: [0xFF; 4],
            extra_temp: [140, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
            extra_humidity: [55, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
            ..WeatherDataRecord::default()
        }
    }

    fn summary_record(record_type: RecordType) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        buf[0] = record_type as u8;
        buf
    }

    fn identity() -> FileIdentity {
        FileIdentity {
            year: 2024,
            month: 3,
        }
    }

    // Counts bytes read and seeks made.
    struct CountingReader {
        inner: Cursor<Vec<u8>>,
        bytes_read: usize,
        seeks: usize,
    }

    impl Read for CountingReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.inner.read(buf)?;
            self.bytes_read += n;
            Ok(n)
        }
    }

    impl Seek for CountingReader {
        fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
            self.seeks += 1;
            self.inner.seek(pos)
        }
    }

    #[test]
    fn test_two_records_on_day_one() {
        let data = build_file(&[(
            1,
            vec![weather_record(30).to_bytes(), weather_record(60).to_bytes()],
        )]);

        let mut wlk = WlkReader::new(Cursor::new(data), identity()).unwrap();
        let decoded = wlk.decode_all().unwrap();

        assert!(decoded.truncated.is_none());
        assert_eq!(decoded.observations.len(), 2);

        let first = &decoded.observations[0];
        let second = &decoded.observations[1];
        assert_eq!(first.timestamp, 1_709_251_200 + 30 * 60);
        assert_eq!(second.timestamp - first.timestamp, 30 * 60);
        assert_eq!(first.interval, 30);
    }

    #[test]
    fn test_empty_days_are_not_visited() {
        let data = build_file(&[(
            1,
            vec![weather_record(30).to_bytes(), weather_record(60).to_bytes()],
        )]);

        let mut reader = CountingReader {
            inner: Cursor::new(data),
            bytes_read: 0,
            seeks: 0,
        };

        {
            let mut wlk = WlkReader::new(&mut reader, identity()).unwrap();
            assert_eq!(wlk.observations().count(), 2);
        }

        assert_eq!(reader.seeks, 1);
        assert_eq!(reader.bytes_read, HEADER_SIZE + 2 * RECORD_SIZE);
    }

    #[test]
    fn test_summary_records_are_skipped_and_counted() {
        let data = build_file(&[
            (
                2,
                vec![
                    summary_record(RecordType::DailySummary1),
                    summary_record(RecordType::DailySummary2),
                    weather_record(5).to_bytes(),
                ],
            ),
            (31, vec![weather_record(1440).to_bytes()]),
        ]);

        let mut wlk = WlkReader::new(Cursor::new(data), identity()).unwrap();
        let obs: Vec<_> = wlk.observations().collect::<Result<_, _>>().unwrap();

        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].timestamp, 1_709_251_200 + 86_400 + 5 * 60);
        // The last day of the month is read, and 1440 minutes rolls into the next day.
        assert_eq!(obs[1].timestamp, 1_709_251_200 + 31 * 86_400);
    }

    #[test]
    fn test_unknown_record_type_aborts_file() {
        let mut bad = weather_record(90).to_bytes();
        bad[0] = 9;

        let data = build_file(&[
            (1, vec![weather_record(30).to_bytes(), bad]),
            (2, vec![weather_record(30).to_bytes()]),
        ]);

        let mut wlk = WlkReader::new(Cursor::new(data), identity()).unwrap();
        let results: Vec<_> = wlk.observations().collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        match &results[1] {
            Err(WlkDataErr::UnknownRecordType {
                record_type: 9,
                day: 1,
                index: 1,
            }) => {}
            other => panic!("unexpected result: {:?}", other),
        }

        let mut wlk = WlkReader::new(Cursor::new(build_file(&[(1, vec![bad])])), identity()).unwrap();
        assert!(wlk.decode_all().is_err());
    }

    #[test]
    fn test_truncated_file_keeps_earlier_records() {
        let mut data = build_file(&[(
            4,
            vec![
                weather_record(30).to_bytes(),
                weather_record(60).to_bytes(),
                weather_record(90).to_bytes(),
            ],
        )]);
        data.truncate(HEADER_SIZE + 2 * RECORD_SIZE + 10);

        let mut wlk = WlkReader::new(Cursor::new(data), identity()).unwrap();
        let decoded = wlk.decode_all().unwrap();

        assert_eq!(decoded.observations.len(), 2);
        assert_eq!(
            decoded.truncated,
            Some(Truncation {
                day: 4,
                read: 2,
                expected: 3
            })
        );
    }

    #[test]
    fn test_invalid_packed_time_aborts_file() {
        let data = build_file(&[(
            1,
            vec![weather_record(1441).to_bytes(), weather_record(30).to_bytes()],
        )]);

        let mut wlk = WlkReader::new(Cursor::new(data), identity()).unwrap();
        let results: Vec<_> = wlk.observations().collect();

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(WlkDataErr::InvalidPackedTime(1441))));
    }

    #[test]
    fn test_day_past_end_of_month_is_an_error() {
        let data = build_file(&[(31, vec![weather_record(30).to_bytes()])]);
        let april = FileIdentity {
            year: 2024,
            month: 4,
        };

        let mut wlk = WlkReader::new(Cursor::new(data), april).unwrap();
        assert!(matches!(
            wlk.decode_all(),
            Err(WlkDataErr::InvalidDate {
                year: 2024,
                month: 4,
                day: 31
            })
        ));
    }

    #[test]
    fn test_short_header() {
        let data = build_file(&[]);
        let err = WlkReader::new(Cursor::new(data[..100].to_vec()), identity()).unwrap_err();

        assert!(matches!(
            err,
            WlkDataErr::MalformedHeader {
                needed: HEADER_SIZE,
                found: 100
            }
        ));
    }

    #[test]
    fn test_header_size() {
        assert_eq!(HEADER_SIZE, 212);
    }
}
