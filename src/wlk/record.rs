//! Raw records and the weather data record layout.

use strum_macros::{EnumIter, IntoStaticStr};

use super::{le_i16, le_u16, put, RECORD_SIZE};

use crate::errors::WlkDataErr;

// Byte offsets of the weather data record fields.
const INTERVAL: usize = 1;
const ICON_FLAGS: usize = 2;
const MORE_FLAGS: usize = 3;
const PACKED_TIME: usize = 4;
const OUT_TEMP: usize = 6;
const HIGH_OUT_TEMP: usize = 8;
const LOW_OUT_TEMP: usize = 10;
const IN_TEMP: usize = 12;
const BAROMETER: usize = 14;
const OUT_HUMIDITY: usize = 16;
const IN_HUMIDITY: usize = 18;
const RAIN: usize = 20;
const HIGH_RAIN_RATE: usize = 22;
const WIND_SPEED: usize = 24;
const HIGH_WIND_SPEED: usize = 26;
const WIND_DIRECTION: usize = 28;
const HIGH_WIND_DIRECTION: usize = 29;
const WIND_SAMPLES: usize = 30;
const SOLAR_RAD: usize = 32;
const HIGH_SOLAR_RAD: usize = 34;
const UV: usize = 36;
const HIGH_UV: usize = 37;
const LEAF_TEMP: usize = 38;
const EXTRA_RAD: usize = 42;
const NEW_SENSORS: usize = 44;
const FORECAST: usize = 56;
const ET: usize = 57;
const SOIL_TEMP: usize = 58;
const SOIL_MOISTURE: usize = 64;
const LEAF_WETNESS: usize = 70;
const EXTRA_TEMP: usize = 74;
const EXTRA_HUMIDITY: usize = 81;

/// The type tag in byte 0 of every record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoStaticStr, EnumIter)]
#[repr(u8)]
pub enum RecordType {
    /// An archive interval worth of observations.
    #[strum(to_string = "weather data")]
    WeatherData = 1,
    /// First of the two summary records that start each day.
    #[strum(to_string = "daily summary 1")]
    DailySummary1 = 2,
    /// Second of the two summary records that start each day.
    #[strum(to_string = "daily summary 2")]
    DailySummary2 = 3,
}

impl RecordType {
    /// Map a type tag to a record type.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(RecordType::WeatherData),
            2 => Some(RecordType::DailySummary1),
            3 => Some(RecordType::DailySummary2),
            _ => None,
        }
    }

    /// Get a static string representation.
    pub fn as_static_str(self) -> &'static str {
        self.into()
    }
}

/// What a raw record turned out to be.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatched {
    /// A weather data record, ready for field decoding.
    Weather(WeatherDataRecord),
    /// A daily summary record, not decoded.
    Summary(RecordType),
}

/// A single undecoded record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawRecord([u8; RECORD_SIZE]);

impl RawRecord {
    /// Wrap the bytes of a record.
    pub fn new(bytes: [u8; RECORD_SIZE]) -> Self {
        RawRecord(bytes)
    }

    /// The record type, if the tag is a known one.
    pub fn record_type(&self) -> Option<RecordType> {
        RecordType::from_tag(self.0[0])
    }

    /// Route the record by its type tag. `day` and `index` locate the record for error reports.
    pub fn dispatch(&self, day: u32, index: usize) -> Result<Dispatched, WlkDataErr> {
        match self.record_type() {
            Some(RecordType::WeatherData) => {
                Ok(Dispatched::Weather(WeatherDataRecord::from_bytes(&self.0)))
            }
            Some(kind) => Ok(Dispatched::Summary(kind)),
            None => Err(WlkDataErr::UnknownRecordType {
                record_type: self.0[0],
                day,
                index,
            }),
        }
    }
}

/// The fields of a weather data record, still in raw form.
///
/// Temperatures are tenths of a degree F, except the leaf, soil, and extra temperatures which are
/// whole degrees F plus 90. Humidities are tenths of a percent for the outside and inside sensors,
/// whole percent for the extra sensors. The barometer is thousandths of an inch Hg, wind speeds
/// tenths of a mph, and directions are compass codes 0-15 with 255 for no data. Rain and rain rate
/// carry the rain collector type in their high nibble.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeatherDataRecord {
    pub interval: u8,
    pub icon_flags: u8,
    pub more_flags: u8,
    pub packed_time: i16,
    pub out_temp: i16,
    pub high_out_temp: i16,
    pub low_out_temp: i16,
    pub in_temp: i16,
    pub barometer: i16,
    pub out_humidity: i16,
    pub in_humidity: i16,
    pub rain: u16,
    pub high_rain_rate: u16,
    pub wind_speed: i16,
    pub high_wind_speed: i16,
    pub wind_direction: u8,
    pub high_wind_direction: u8,
    pub wind_samples: i16,
    pub solar_rad: u16,
    pub high_solar_rad: u16,
    pub uv: u8,
    pub high_uv: u8,
    pub leaf_temp: [u8; 4],
    pub extra_rad: i16,
    pub new_sensors: [i16; 6],
    pub forecast: u8,
    pub et: u8,
    pub soil_temp: [u8; 6],
    pub soil_moisture: [u8; 6],
    pub leaf_wetness: [u8; 4],
    pub extra_temp: [u8; 7],
    pub extra_humidity: [u8; 7],
}

impl WeatherDataRecord {
    /// Unpack a record. The type tag is not checked.
    pub fn from_bytes(buf: &[u8; RECORD_SIZE]) -> Self {
        let mut new_sensors = [0i16; 6];
        for (i, val) in new_sensors.iter_mut().enumerate() {
            *val = le_i16(buf, NEW_SENSORS + 2 * i);
        }

        WeatherDataRecord {
            interval: buf[INTERVAL],
            icon_flags: buf[ICON_FLAGS],
            more_flags: buf[MORE_FLAGS],
            packed_time: le_i16(buf, PACKED_TIME),
            out_temp: le_i16(buf, OUT_TEMP),
            high_out_temp: le_i16(buf, HIGH_OUT_TEMP),
            low_out_temp: le_i16(buf, LOW_OUT_TEMP),
            in_temp: le_i16(buf, IN_TEMP),
            barometer: le_i16(buf, BAROMETER),
            out_humidity: le_i16(buf, OUT_HUMIDITY),
            in_humidity: le_i16(buf, IN_HUMIDITY),
            rain: le_u16(buf, RAIN),
            high_rain_rate: le_u16(buf, HIGH_RAIN_RATE),
            wind_speed: le_i16(buf, WIND_SPEED),
            high_wind_speed: le_i16(buf, HIGH_WIND_SPEED),
            wind_direction: buf[WIND_DIRECTION],
            high_wind_direction: buf[HIGH_WIND_DIRECTION],
            wind_samples: le_i16(buf, WIND_SAMPLES),
            solar_rad: le_u16(buf, SOLAR_RAD),
            high_solar_rad: le_u16(buf, HIGH_SOLAR_RAD),
            uv: buf[UV],
            high_uv: buf[HIGH_UV],
            leaf_temp: bytes_at(buf, LEAF_TEMP),
            extra_rad: le_i16(buf, EXTRA_RAD),
            new_sensors,
            forecast: buf[FORECAST],
            et: buf[ET],
            soil_temp: bytes_at(buf, SOIL_TEMP),
            soil_moisture: bytes_at(buf, SOIL_MOISTURE),
            leaf_wetness: bytes_at(buf, LEAF_WETNESS),
            extra_temp: bytes_at(buf, EXTRA_TEMP),
            extra_humidity: bytes_at(buf, EXTRA_HUMIDITY),
        }
    }

    /// Pack the record in file layout, type tag included.
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];

        buf[0] = RecordType::WeatherData as u8;
        buf[INTERVAL] = self.interval;
        buf[ICON_FLAGS] = self.icon_flags;
        buf[MORE_FLAGS] = self.more_flags;
        put(&mut buf, PACKED_TIME, &self.packed_time.to_le_bytes());
        put(&mut buf, OUT_TEMP, &self.out_temp.to_le_bytes());
        put(&mut buf, HIGH_OUT_TEMP, &self.high_out_temp.to_le_bytes());
        put(&mut buf, LOW_OUT_TEMP, &self.low_out_temp.to_le_bytes());
        put(&mut buf, IN_TEMP, &self.in_temp.to_le_bytes());
        put(&mut buf, BAROMETER, &self.barometer.to_le_bytes());
        put(&mut buf, OUT_HUMIDITY, &self.out_humidity.to_le_bytes());
        put(&mut buf, IN_HUMIDITY, &self.in_humidity.to_le_bytes());
        put(&mut buf, RAIN, &self.rain.to_le_bytes());
        put(&mut buf, HIGH_RAIN_RATE, &self.high_rain_rate.to_le_bytes());
        put(&mut buf, WIND_SPEED, &self.wind_speed.to_le_bytes());
        put(&mut buf, HIGH_WIND_SPEED, &self.high_wind_speed.to_le_bytes());
        buf[WIND_DIRECTION] = self.wind_direction;
        buf[HIGH_WIND_DIRECTION] = self.high_wind_direction;
        put(&mut buf, WIND_SAMPLES, &self.wind_samples.to_le_bytes());
        put(&mut buf, SOLAR_RAD, &self.solar_rad.to_le_bytes());
        put(&mut buf, HIGH_SOLAR_RAD, &self.high_solar_rad.to_le_bytes());
        buf[UV] = self.uv;
        buf[HIGH_UV] = self.high_uv;
        put(&mut buf, LEAF_TEMP, &self.leaf_temp);
        put(&mut buf, EXTRA_RAD, &self.extra_rad.to_le_bytes());
        for (i, val) in self.new_sensors.iter().enumerate() {
            put(&mut buf, NEW_SENSORS + 2 * i, &val.to_le_bytes());
        }
        buf[FORECAST] = self.forecast;
        buf[ET] = self.et;
        put(&mut buf, SOIL_TEMP, &self.soil_temp);
        put(&mut buf, SOIL_MOISTURE, &self.soil_moisture);
        put(&mut buf, LEAF_WETNESS, &self.leaf_wetness);
        put(&mut buf, EXTRA_TEMP, &self.extra_temp);
        put(&mut buf, EXTRA_HUMIDITY, &self.extra_humidity);

        buf
    }
}

fn bytes_at<const N: usize>(buf: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[at..at + N]);
    out
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    use strum::IntoEnumIterator;

    #[test]
    fn test_layout_fills_record() {
        assert_eq!(EXTRA_HUMIDITY + 7, RECORD_SIZE);
        assert_eq!(NEW_SENSORS + 12, FORECAST);
    }

    #[test]
    fn test_record_type_tags() {
        for kind in RecordType::iter() {
            assert_eq!(RecordType::from_tag(kind as u8), Some(kind));
        }
        assert_eq!(RecordType::from_tag(0), None);
        assert_eq!(RecordType::from_tag(4), None);
        assert_eq!(RecordType::DailySummary2.as_static_str(), "daily summary 2");
    }

    #[test]
    fn test_dispatch() {
        let mut buf = [0u8; RECORD_SIZE];

        buf[0] = 2;
        assert_eq!(
            RawRecord::new(buf).dispatch(1, 0).unwrap(),
            Dispatched::Summary(RecordType::DailySummary1)
        );

        buf[0] = 3;
        assert_eq!(
            RawRecord::new(buf).dispatch(1, 1).unwrap(),
            Dispatched::Summary(RecordType::DailySummary2)
        );

        buf[0] = 0xFF;
        assert!(matches!(
            RawRecord::new(buf).dispatch(5, 7),
            Err(WlkDataErr::UnknownRecordType {
                record_type: 0xFF,
                day: 5,
                index: 7
            })
        ));
    }

    #[test]
    fn test_field_offsets() {
        let mut buf = [0u8; RECORD_SIZE];
        buf[0] = 1;
        buf[1] = 5;
        put(&mut buf, 4, &90i16.to_le_bytes());
        put(&mut buf, 6, &(-125i16).to_le_bytes());
        put(&mut buf, 20, &0x1013u16.to_le_bytes());
        buf[28] = 15;
        buf[74] = 160;
        buf[87] = 42;

        let record = match RawRecord::new(buf).dispatch(1, 0).unwrap() {
            Dispatched::Weather(record) => record,
            other => panic!("unexpected dispatch: {:?}", other),
        };

        assert_eq!(record.interval, 5);
        assert_eq!(record.packed_time, 90);
        assert_eq!(record.out_temp, -125);
        assert_eq!(record.rain, 0x1013);
        assert_eq!(record.wind_direction, 15);
        assert_eq!(record.extra_temp[0], 160);
        assert_eq!(record.extra_humidity[6], 42);

        assert_eq!(record.to_bytes()[..], buf[..]);
    }
}
