use strum::IntoEnumIterator;

use super::{column_list, Archive, KEY_COLUMNS};

use crate::{errors::WlkDataErr, observation::WeatherObservation, wlk::Field};

impl Archive {
    /// Number of observations in the archive.
    pub fn count(&self) -> Result<usize, WlkDataErr> {
        let num: i64 =
            self.db_conn
                .query_row("SELECT COUNT(*) FROM archive", rusqlite::NO_PARAMS, |row| {
                    row.get(0)
                })?;

        Ok(num as usize)
    }

    /// Retrieve the observation for a time, if there is one.
    pub fn observation(&self, timestamp: i64) -> Result<Option<WeatherObservation>, WlkDataErr> {
        let sql = format!(
            "SELECT {} FROM archive WHERE dateTime = ?1",
            column_list()
        );

        let obs = self
            .db_conn
            .query_row(&sql, &[&timestamp], Self::parse_row_to_observation);

        match obs {
            Ok(obs) => Ok(Some(obs)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(x) => Err(WlkDataErr::Database(x)),
        }
    }

    fn parse_row_to_observation(row: &rusqlite::Row) -> Result<WeatherObservation, rusqlite::Error> {
        let timestamp: i64 = row.get(0)?;
        let interval: u32 = row.get(2)?;

        let mut obs = WeatherObservation::new(timestamp, interval);

        let mut idx = KEY_COLUMNS.len();
        for field in Field::iter() {
            obs.set(field, row.get(idx)?);
            idx += 1;
        }

        obs.dewpoint = row.get(idx)?;
        obs.windchill = row.get(idx + 1)?;
        obs.heatindex = row.get(idx + 2)?;
        obs.rx_check_percent = row.get(idx + 3)?;

        Ok(obs)
    }

    /// Times of the observations from `start` through `end` inclusive, in order.
    pub fn timestamps_between(&self, start: i64, end: i64) -> Result<Vec<i64>, WlkDataErr> {
        let mut stmt = self.db_conn.prepare(
            "
                SELECT dateTime
                FROM archive
                WHERE dateTime >= ?1 AND dateTime <= ?2
                ORDER BY dateTime ASC
            ",
        )?;

        let vals: Result<Vec<i64>, WlkDataErr> = stmt
            .query_map(&[&start, &end], |row| row.get::<_, i64>(0))?
            .map(|res| res.map_err(WlkDataErr::Database))
            .collect();

        vals
    }

    /// Time of the latest observation, `None` if the archive is empty.
    pub fn most_recent_time(&self) -> Result<Option<i64>, WlkDataErr> {
        let time: Option<i64> = self.db_conn.query_row(
            "SELECT MAX(dateTime) FROM archive",
            rusqlite::NO_PARAMS,
            |row| row.get(0),
        )?;

        Ok(time)
    }
}
