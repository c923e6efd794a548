//! The decoded form of a weather data record.
use std::{collections::BTreeMap, fmt};

use chrono::{TimeZone, Utc};
use strum::IntoEnumIterator;

use crate::{
    derived::{dewpoint, heat_index, wind_chill},
    errors::WlkDataErr,
    wlk::{decode_time, reception_quality, Field, FileIdentity, StationModel, WeatherDataRecord},
};

/// Unit system code for US customary units: degrees F, inches, inHg, and mph.
pub const US_UNITS: i32 = 1;

/// One archive interval of observations in physical units.
#[derive(Clone, Debug, PartialEq)]
pub struct WeatherObservation {
    /// End of the archive interval, seconds since the Unix epoch.
    pub timestamp: i64,
    /// Length of the archive interval in minutes.
    pub interval: u32,
    values: BTreeMap<Field, f64>,
    /// Dew point, degrees F.
    pub dewpoint: Option<f64>,
    /// Wind chill, degrees F.
    pub windchill: Option<f64>,
    /// Heat index, degrees F.
    pub heatindex: Option<f64>,
    /// Percent of the expected wind packets received from the transmitter.
    pub rx_check_percent: Option<f64>,
}

impl WeatherObservation {
    /// An observation with no values.
    pub fn new(timestamp: i64, interval: u32) -> Self {
        WeatherObservation {
            timestamp,
            interval,
            values: BTreeMap::new(),
            dewpoint: None,
            windchill: None,
            heatindex: None,
            rx_check_percent: None,
        }
    }

    /// Decode a weather data record from `day` of the month the file covers.
    pub fn from_record(
        rec: &WeatherDataRecord,
        identity: FileIdentity,
        day: u32,
    ) -> Result<Self, WlkDataErr> {
        let timestamp = decode_time(identity.year, identity.month, day, rec.packed_time)?;
        let mut obs = WeatherObservation::new(timestamp, u32::from(rec.interval));

        for field in Field::iter() {
            obs.set(field, field.decode(rec)?);
        }

        obs.calculate_derived();
        obs.rx_check_percent = reception_quality(
            StationModel::DEFAULT,
            StationModel::DEFAULT_TRANSMITTER,
            rec.interval,
            rec.wind_samples,
        );

        Ok(obs)
    }

    /// Fill in the dew point, wind chill, and heat index from the current values.
    pub fn calculate_derived(&mut self) {
        let t = self.get(Field::OutTemp);
        let rh = self.get(Field::OutHumidity);
        let wind = self.get(Field::WindSpeed);

        self.dewpoint = dewpoint(t, rh);
        self.windchill = wind_chill(t, wind);
        self.heatindex = heat_index(t, rh);
    }

    /// The value of a field, if there was one.
    pub fn get(&self, field: Field) -> Option<f64> {
        self.values.get(&field).copied()
    }

    /// Set or clear the value of a field.
    pub fn set(&mut self, field: Field, value: Option<f64>) {
        match value {
            Some(val) => {
                self.values.insert(field, val);
            }
            None => {
                self.values.remove(&field);
            }
        }
    }

    /// Iterate over the fields that have values, in field order.
    pub fn values(&self) -> impl Iterator<Item = (Field, f64)> + '_ {
        self.values.iter().map(|(&field, &val)| (field, val))
    }
}

impl fmt::Display for WeatherObservation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match Utc.timestamp_opt(self.timestamp, 0).single() {
            Some(time) => write!(f, "{}", time.format("%Y-%m-%d %H:%M:%S UTC"))?,
            None => write!(f, "{}", self.timestamp)?,
        }
        write!(f, " interval={}", self.interval)?;

        for (field, val) in self.values() {
            write!(f, " {}={}", field.as_static_str(), val)?;
        }

        let derived = [
            ("dewpoint", self.dewpoint),
            ("windchill", self.windchill),
            ("heatindex", self.heatindex),
            ("rxCheckPercent", self.rx_check_percent),
        ];
        for (name, val) in derived.iter() {
            if let Some(val) = val {
                write!(f, " {}={:.1}", name, val)?;
            }
        }

        Ok(())
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
