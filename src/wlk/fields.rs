//! Conversion of raw record fields to physical units.
//!
//! Every observation field has a fixed `FieldRule`. Fields of the record with no entry in `Field`
//! (icon flags, transmitter flags, extra radiation, the reserved sensor slots) are never decoded.

use strum_macros::{EnumIter, EnumString, IntoStaticStr};

use super::WeatherDataRecord;

use crate::errors::WlkDataErr;

/// How a raw value becomes a physical value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldRule {
    /// Divide by `factor`, the raw `sentinel` means no data.
    Scaled {
        /// Raw units per physical unit.
        factor: f64,
        /// Raw value used for missing data.
        sentinel: Option<i32>,
    },
    /// Add `offset`, the raw `sentinel` means no data.
    Offset {
        /// Added to the raw value.
        offset: i32,
        /// Raw value used for missing data.
        sentinel: Option<i32>,
    },
    /// A compass code, decoded to degrees.
    Compass,
    /// Rain collector type in the high nibble, bucket tips in the low 12 bits, decoded to inches.
    RainClicks,
}

impl FieldRule {
    const TEMP_TENTHS: FieldRule = FieldRule::Scaled {
        factor: 10.0,
        sentinel: Some(0x7FFF),
    };
    const BYTE_TENTHS: FieldRule = FieldRule::Scaled {
        factor: 10.0,
        sentinel: Some(0xFF),
    };
    const BYTE_WHOLE: FieldRule = FieldRule::Scaled {
        factor: 1.0,
        sentinel: Some(0xFF),
    };
    const BYTE_TEMP: FieldRule = FieldRule::Offset {
        offset: -90,
        sentinel: Some(0xFF),
    };

    /// Apply the rule to a raw value.
    pub fn decode(self, raw: i32) -> Result<Option<f64>, WlkDataErr> {
        use FieldRule::*;

        let val = match self {
            Scaled { sentinel, .. } | Offset { sentinel, .. } if sentinel == Some(raw) => None,
            Scaled { factor, .. } => Some(f64::from(raw) / factor),
            Offset { offset, .. } => Some(f64::from(raw + offset)),
            Compass => CompassPoint::from_code(raw).map(CompassPoint::degrees),
            RainClicks => Some(decode_rain((raw & 0xFFFF) as u16)?),
        };

        Ok(val)
    }
}

/// Observation fields decoded from a weather data record.
///
/// The string form is the archive column name.
#[allow(missing_docs)]
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumString, IntoStaticStr,
)]
pub enum Field {
    #[strum(to_string = "barometer")]
    Barometer,
    #[strum(to_string = "outTemp")]
    OutTemp,
    #[strum(to_string = "highOutTemp")]
    HighOutTemp,
    #[strum(to_string = "lowOutTemp")]
    LowOutTemp,
    #[strum(to_string = "inTemp")]
    InTemp,
    #[strum(to_string = "outHumidity")]
    OutHumidity,
    #[strum(to_string = "inHumidity")]
    InHumidity,
    #[strum(to_string = "rain")]
    Rain,
    #[strum(to_string = "rainRate")]
    RainRate,
    #[strum(to_string = "windSpeed")]
    WindSpeed,
    #[strum(to_string = "windDir")]
    WindDir,
    #[strum(to_string = "windGust")]
    WindGust,
    #[strum(to_string = "windGustDir")]
    WindGustDir,
    #[strum(to_string = "radiation")]
    Radiation,
    #[strum(to_string = "highRadiation")]
    HighRadiation,
    #[strum(to_string = "UV")]
    UV,
    #[strum(to_string = "highUV")]
    HighUV,
    #[strum(to_string = "ET")]
    ET,
    #[strum(to_string = "forecastRule")]
    ForecastRule,
    #[strum(to_string = "leafTemp1")]
    LeafTemp1,
    #[strum(to_string = "leafTemp2")]
    LeafTemp2,
    #[strum(to_string = "leafTemp3")]
    LeafTemp3,
    #[strum(to_string = "leafTemp4")]
    LeafTemp4,
    #[strum(to_string = "soilTemp1")]
    SoilTemp1,
    #[strum(to_string = "soilTemp2")]
    SoilTemp2,
    #[strum(to_string = "soilTemp3")]
    SoilTemp3,
    #[strum(to_string = "soilTemp4")]
    SoilTemp4,
    #[strum(to_string = "soilTemp5")]
    SoilTemp5,
    #[strum(to_string = "soilTemp6")]
    SoilTemp6,
    #[strum(to_string = "soilMoist1")]
    SoilMoist1,
    #[strum(to_string = "soilMoist2")]
    SoilMoist2,
    #[strum(to_string = "soilMoist3")]
    SoilMoist3,
    #[strum(to_string = "soilMoist4")]
    SoilMoist4,
    #[strum(to_string = "soilMoist5")]
    SoilMoist5,
    #[strum(to_string = "soilMoist6")]
    SoilMoist6,
    #[strum(to_string = "leafWet1")]
    LeafWet1,
    #[strum(to_string = "leafWet2")]
    LeafWet2,
    #[strum(to_string = "leafWet3")]
    LeafWet3,
    #[strum(to_string = "leafWet4")]
    LeafWet4,
    #[strum(to_string = "extraTemp1")]
    ExtraTemp1,
    #[strum(to_string = "extraTemp2")]
    ExtraTemp2,
    #[strum(to_string = "extraTemp3")]
    ExtraTemp3,
    #[strum(to_string = "extraTemp4")]
    ExtraTemp4,
    #[strum(to_string = "extraTemp5")]
    ExtraTemp5,
    #[strum(to_string = "extraTemp6")]
    ExtraTemp6,
    #[strum(to_string = "extraTemp7")]
    ExtraTemp7,
    #[strum(to_string = "extraHumid1")]
    ExtraHumid1,
    #[strum(to_string = "extraHumid2")]
    ExtraHumid2,
    #[strum(to_string = "extraHumid3")]
    ExtraHumid3,
    #[strum(to_string = "extraHumid4")]
    ExtraHumid4,
    #[strum(to_string = "extraHumid5")]
    ExtraHumid5,
    #[strum(to_string = "extraHumid6")]
    ExtraHumid6,
    #[strum(to_string = "extraHumid7")]
    ExtraHumid7,
}

impl Field {
    /// Get a static string representation, the archive column name.
    pub fn as_static_str(self) -> &'static str {
        self.into()
    }

    /// The decoding rule for this field.
    pub fn rule(self) -> FieldRule {
        use Field::*;

        match self {
            OutTemp | HighOutTemp | LowOutTemp | InTemp => FieldRule::TEMP_TENTHS,
            Barometer => FieldRule::Scaled {
                factor: 1000.0,
                sentinel: Some(0),
            },
            OutHumidity | InHumidity | WindSpeed | WindGust => FieldRule::BYTE_TENTHS,
            Rain | RainRate => FieldRule::RainClicks,
            WindDir | WindGustDir => FieldRule::Compass,
            Radiation | HighRadiation => FieldRule::Scaled {
                factor: 1.0,
                sentinel: Some(0x7FFF),
            },
            UV | HighUV => FieldRule::BYTE_TENTHS,
            ET => FieldRule::Scaled {
                factor: 1000.0,
                sentinel: None,
            },
            ForecastRule => FieldRule::Scaled {
                factor: 1.0,
                sentinel: None,
            },
            LeafTemp1 | LeafTemp2 | LeafTemp3 | LeafTemp4 => FieldRule::BYTE_TEMP,
            SoilTemp1 | SoilTemp2 | SoilTemp3 | SoilTemp4 | SoilTemp5 | SoilTemp6 => {
                FieldRule::BYTE_TEMP
            }
            ExtraTemp1 | ExtraTemp2 | ExtraTemp3 | ExtraTemp4 | ExtraTemp5 | ExtraTemp6
            | ExtraTemp7 => FieldRule::BYTE_TEMP,
            SoilMoist1 | SoilMoist2 | SoilMoist3 | SoilMoist4 | SoilMoist5 | SoilMoist6 => {
                FieldRule::BYTE_WHOLE
            }
            LeafWet1 | LeafWet2 | LeafWet3 | LeafWet4 => FieldRule::BYTE_WHOLE,
            ExtraHumid1 | ExtraHumid2 | ExtraHumid3 | ExtraHumid4 | ExtraHumid5 | ExtraHumid6
            | ExtraHumid7 => FieldRule::BYTE_WHOLE,
        }
    }

    /// The raw value of this field in a record.
    pub fn raw(self, rec: &WeatherDataRecord) -> i32 {
        use Field::*;

        match self {
            Barometer => i32::from(rec.barometer),
            OutTemp => i32::from(rec.out_temp),
            HighOutTemp => i32::from(rec.high_out_temp),
            LowOutTemp => i32::from(rec.low_out_temp),
            InTemp => i32::from(rec.in_temp),
            OutHumidity => i32::from(rec.out_humidity),
            InHumidity => i32::from(rec.in_humidity),
            Rain => i32::from(rec.rain),
            RainRate => i32::from(rec.high_rain_rate),
            WindSpeed => i32::from(rec.wind_speed),
            WindDir => i32::from(rec.wind_direction),
            WindGust => i32::from(rec.high_wind_speed),
            WindGustDir => i32::from(rec.high_wind_direction),
            Radiation => i32::from(rec.solar_rad),
            HighRadiation => i32::from(rec.high_solar_rad),
            UV => i32::from(rec.uv),
            HighUV => i32::from(rec.high_uv),
            ET => i32::from(rec.et),
            ForecastRule => i32::from(rec.forecast),
            LeafTemp1 => i32::from(rec.leaf_temp[0]),
            LeafTemp2 => i32::from(rec.leaf_temp[1]),
            LeafTemp3 => i32::from(rec.leaf_temp[2]),
            LeafTemp4 => i32::from(rec.leaf_temp[3]),
            SoilTemp1 => i32::from(rec.soil_temp[0]),
            SoilTemp2 => i32::from(rec.soil_temp[1]),
            SoilTemp3 => i32::from(rec.soil_temp[2]),
            SoilTemp4 => i32::from(rec.soil_temp[3]),
            SoilTemp5 => i32::from(rec.soil_temp[4]),
            SoilTemp6 => i32::from(rec.soil_temp[5]),
            SoilMoist1 => i32::from(rec.soil_moisture[0]),
            SoilMoist2 => i32::from(rec.soil_moisture[1]),
            SoilMoist3 => i32::from(rec.soil_moisture[2]),
            SoilMoist4 => i32::from(rec.soil_moisture[3]),
            SoilMoist5 => i32::from(rec.soil_moisture[4]),
            SoilMoist6 => i32::from(rec.soil_moisture[5]),
            LeafWet1 => i32::from(rec.leaf_wetness[0]),
            LeafWet2 => i32::from(rec.leaf_wetness[1]),
            LeafWet3 => i32::from(rec.leaf_wetness[2]),
            LeafWet4 => i32::from(rec.leaf_wetness[3]),
            ExtraTemp1 => i32::from(rec.extra_temp[0]),
            ExtraTemp2 => i32::from(rec.extra_temp[1]),
            ExtraTemp3 => i32::from(rec.extra_temp[2]),
            ExtraTemp4 => i32::from(rec.extra_temp[3]),
            ExtraTemp5 => i32::from(rec.extra_temp[4]),
            ExtraTemp6 => i32::from(rec.extra_temp[5]),
            ExtraTemp7 => i32::from(rec.extra_temp[6]),
            ExtraHumid1 => i32::from(rec.extra_humidity[0]),
            ExtraHumid2 => i32::from(rec.extra_humidity[1]),
            ExtraHumid3 => i32::from(rec.extra_humidity[2]),
            ExtraHumid4 => i32::from(rec.extra_humidity[3]),
            ExtraHumid5 => i32::from(rec.extra_humidity[4]),
            ExtraHumid6 => i32::from(rec.extra_humidity[5]),
            ExtraHumid7 => i32::from(rec.extra_humidity[6]),
        }
    }

    /// Decode this field of a record.
    pub fn decode(self, rec: &WeatherDataRecord) -> Result<Option<f64>, WlkDataErr> {
        self.rule().decode(self.raw(rec))
    }
}

/// The bucket size of the rain gauge, stored in the high nibble of the rain fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum RainCollector {
    /// 0.1 inch bucket.
    #[strum(to_string = "0.1 in")]
    TenthInch,
    /// 0.01 inch bucket.
    #[strum(to_string = "0.01 in")]
    HundredthInch,
    /// 0.2 mm bucket.
    #[strum(to_string = "0.2 mm")]
    FifthMm,
    /// 1.0 mm bucket.
    #[strum(to_string = "1.0 mm")]
    OneMm,
}

impl RainCollector {
    /// Map the high nibble of a rain field to a collector.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x0 => Some(RainCollector::TenthInch),
            0x1 => Some(RainCollector::HundredthInch),
            0x2 => Some(RainCollector::FifthMm),
            0x3 => Some(RainCollector::OneMm),
            _ => None,
        }
    }

    /// The collector type code.
    pub fn code(self) -> u8 {
        match self {
            RainCollector::TenthInch => 0x0,
            RainCollector::HundredthInch => 0x1,
            RainCollector::FifthMm => 0x2,
            RainCollector::OneMm => 0x3,
        }
    }

    /// Rain per bucket tip in inches.
    pub fn bucket_size(self) -> f64 {
        match self {
            RainCollector::TenthInch => 0.1,
            RainCollector::HundredthInch => 0.01,
            RainCollector::FifthMm => 0.007_874,
            RainCollector::OneMm => 0.039_370_1,
        }
    }

    /// Get a static string representation.
    pub fn as_static_str(self) -> &'static str {
        self.into()
    }
}

/// Decode a rain field to inches, or inches per hour for the rain rate.
pub(crate) fn decode_rain(raw: u16) -> Result<f64, WlkDataErr> {
    let code = (raw >> 12) as u8;
    let clicks = raw & 0x0FFF;

    let collector =
        RainCollector::from_code(code).ok_or(WlkDataErr::UnknownRainCollectorType(raw & 0xF000))?;

    Ok(f64::from(clicks) * collector.bucket_size())
}

/// The sixteen points of the compass, in code order.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr)]
pub enum CompassPoint {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

impl CompassPoint {
    const ALL: [CompassPoint; 16] = [
        CompassPoint::N,
        CompassPoint::NNE,
        CompassPoint::NE,
        CompassPoint::ENE,
        CompassPoint::E,
        CompassPoint::ESE,
        CompassPoint::SE,
        CompassPoint::SSE,
        CompassPoint::S,
        CompassPoint::SSW,
        CompassPoint::SW,
        CompassPoint::WSW,
        CompassPoint::W,
        CompassPoint::WNW,
        CompassPoint::NW,
        CompassPoint::NNW,
    ];

    /// Map a direction code to a compass point. 255, and anything else past 15, means no data.
    pub fn from_code(code: i32) -> Option<Self> {
        if (0..16).contains(&code) {
            Some(Self::ALL[code as usize])
        } else {
            None
        }
    }

    /// Center of the sector in degrees clockwise from north.
    pub fn degrees(self) -> f64 {
        self as u8 as f64 * 22.5
    }

    /// Get a static string representation.
    pub fn as_static_str(self) -> &'static str {
        self.into()
    }
}

/// Station models with a known wind packet rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum StationModel {
    /// Vantage Pro.
    VantagePro,
    /// Vantage Pro2.
    VantagePro2,
}

impl StationModel {
    /// The model that wrote the files this crate reads.
    pub const DEFAULT: StationModel = StationModel::VantagePro2;
    /// The transmitter id of the integrated sensor suite.
    pub const DEFAULT_TRANSMITTER: u8 = 1;

    /// Number of wind packets a transmitter sends during `interval` minutes.
    pub fn expected_packets(self, interval: u8, transmitter_id: u8) -> f64 {
        let seconds = f64::from(interval) * 60.0;
        let id = f64::from(transmitter_id) - 1.0;

        match self {
            StationModel::VantagePro => seconds / (2.5 + id / 16.0) - seconds / (50.0 + id * 1.25),
            StationModel::VantagePro2 => 960.0 * f64::from(interval) / (41.0 + id),
        }
    }
}

/// Percent of the expected wind packets that were received, clamped to 0 through 100.
///
/// A zero length interval has no expected packets, so there is no answer.
pub fn reception_quality(
    model: StationModel,
    transmitter_id: u8,
    interval: u8,
    wind_samples: i16,
) -> Option<f64> {
    let expected = model.expected_packets(interval, transmitter_id);
    if expected <= 0.0 {
        return None;
    }

    let percent = f64::from(wind_samples) * 100.0 / expected;
    Some(percent.max(0.0).min(100.0))
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
