use std::io::Read;

use super::{
    le_i16, le_i32, le_u32, put, read_fully, DAY_INDEX_SIZE, HEADER_SIZE, ID_CODE_PREFIX,
    ID_CODE_SIZE, NUM_DAY_INDEXES,
};

use crate::errors::WlkDataErr;

const TOTAL_RECORDS_OFFSET: usize = ID_CODE_SIZE;
const DAY_INDEX_OFFSET: usize = TOTAL_RECORDS_OFFSET + 4;

/// Index entry for a single day of the month.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DayIndex {
    /// Number of records for the day, daily summaries included.
    pub records_in_day: i16,
    /// Position of the first record of the day, counted in records from the end of the header.
    pub start_pos: i32,
    /// The day this entry was parsed for, equal to its position in the index.
    pub day_in_month: u32,
}

/// The header at the start of every file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderBlock {
    /// Identifies the file format.
    pub id_code: [u8; ID_CODE_SIZE],
    /// Total number of records in the file. Informational only.
    pub total_records: u32,
    /// One entry per day, entry 0 is not used.
    pub day_index: [DayIndex; NUM_DAY_INDEXES],
}

impl HeaderBlock {
    /// Create an empty header with the given id code.
    pub fn new(id_code: &[u8; ID_CODE_SIZE]) -> Self {
        let mut day_index = [DayIndex::default(); NUM_DAY_INDEXES];
        for (day, entry) in day_index.iter_mut().enumerate() {
            entry.day_in_month = day as u32;
        }

        HeaderBlock {
            id_code: *id_code,
            total_records: 0,
            day_index,
        }
    }

    /// Parse a header from the first bytes of a file.
    pub fn parse(buf: &[u8]) -> Result<Self, WlkDataErr> {
        if buf.len() < HEADER_SIZE {
            return Err(WlkDataErr::MalformedHeader {
                needed: HEADER_SIZE,
                found: buf.len(),
            });
        }

        let mut id_code = [0u8; ID_CODE_SIZE];
        id_code.copy_from_slice(&buf[..ID_CODE_SIZE]);
        if !id_code.starts_with(ID_CODE_PREFIX) {
            return Err(WlkDataErr::UnrecognizedFormat(id_code));
        }

        let mut header = HeaderBlock::new(&id_code);
        header.total_records = le_u32(buf, TOTAL_RECORDS_OFFSET);

        for (day, entry) in header.day_index.iter_mut().enumerate() {
            let offset = DAY_INDEX_OFFSET + day * DAY_INDEX_SIZE;
            entry.records_in_day = le_i16(buf, offset);
            entry.start_pos = le_i32(buf, offset + 2);
        }

        Ok(header)
    }

    /// Read and parse a header from the current position of `reader`.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, WlkDataErr> {
        let mut buf = [0u8; HEADER_SIZE];
        let found = read_fully(reader, &mut buf)?;

        Self::parse(&buf[..found])
    }

    /// Serialize the header in file layout.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];

        put(&mut buf, 0, &self.id_code);
        put(&mut buf, TOTAL_RECORDS_OFFSET, &self.total_records.to_le_bytes());

        for (day, entry) in self.day_index.iter().enumerate() {
            let offset = DAY_INDEX_OFFSET + day * DAY_INDEX_SIZE;
            put(&mut buf, offset, &entry.records_in_day.to_le_bytes());
            put(&mut buf, offset + 2, &entry.start_pos.to_le_bytes());
        }

        buf
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    const ID_CODE: &[u8; ID_CODE_SIZE] = b"WDAT5.0\0\0\0\0\0\0\0\x05\0";

    #[test]
    fn test_parse_day_index() {
        let mut buf = [0u8; HEADER_SIZE];
        put(&mut buf, 0, ID_CODE);
        put(&mut buf, 16, &578u32.to_le_bytes());
        // Day 3 has 290 records starting at record 288.
        put(&mut buf, 20 + 3 * 6, &290i16.to_le_bytes());
        put(&mut buf, 20 + 3 * 6 + 2, &288i32.to_le_bytes());

        let header = HeaderBlock::parse(&buf).unwrap();

        assert_eq!(header.total_records, 578);
        assert_eq!(
            header.day_index[3],
            DayIndex {
                records_in_day: 290,
                start_pos: 288,
                day_in_month: 3
            }
        );
        assert_eq!(header.day_index[4].records_in_day, 0);
        assert_eq!(header.day_index[31].day_in_month, 31);
    }

    #[test]
    fn test_short_buffer() {
        match HeaderBlock::parse(&[0u8; 20]) {
            Err(WlkDataErr::MalformedHeader {
                needed: HEADER_SIZE,
                found: 20,
            }) => {}
            other => panic!("unexpected result: {:?}", other),
        }

        let mut empty: &[u8] = &[];
        assert!(matches!(
            HeaderBlock::read_from(&mut empty),
            Err(WlkDataErr::MalformedHeader { found: 0, .. })
        ));
    }

    #[test]
    fn test_bad_id_code() {
        let mut buf = [0u8; HEADER_SIZE];
        put(&mut buf, 0, b"WDAT4.0\0\0\0\0\0\0\0\x04\0");

        assert!(matches!(
            HeaderBlock::parse(&buf),
            Err(WlkDataErr::UnrecognizedFormat(_))
        ));
    }

    #[test]
    fn test_bytes_round_trip() {
        let mut header = HeaderBlock::new(ID_CODE);
        header.total_records = 12;
        header.day_index[1].records_in_day = 12;
        header.day_index[1].start_pos = 0;

        let bytes = header.to_bytes();
        assert_eq!(HeaderBlock::parse(&bytes).unwrap(), header);
    }
}
