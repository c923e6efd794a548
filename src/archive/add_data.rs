use rusqlite::types::Value;
use strum::IntoEnumIterator;
use tracing::trace;

use super::Archive;

use crate::{
    errors::WlkDataErr,
    observation::{WeatherObservation, US_UNITS},
    wlk::Field,
};

/// The result of adding one observation to the archive.
#[derive(Debug)]
pub enum AddObsResult {
    /// A new row was stored.
    Inserted,
    /// There was already a row for this time, nothing changed.
    Duplicate,
    /// The row could not be stored.
    Error(WlkDataErr),
}

impl AddObsResult {
    /// True if a new row was stored.
    pub fn is_inserted(&self) -> bool {
        matches!(self, AddObsResult::Inserted)
    }
}

/// A group of additions committed together.
///
/// Dropping the batch without calling `commit` discards everything added through it.
pub struct ArchiveBatch<'a> {
    tx: rusqlite::Transaction<'a>,
    insert_sql: &'a str,
}

impl<'a> ArchiveBatch<'a> {
    /// Add an observation to the batch.
    pub fn add(&self, obs: &WeatherObservation) -> AddObsResult {
        insert(&self.tx, self.insert_sql, obs)
    }

    /// Make the additions permanent.
    pub fn commit(self) -> Result<(), WlkDataErr> {
        self.tx.commit().map_err(WlkDataErr::from)
    }
}

impl Archive {
    /// Add a single observation to the archive.
    pub fn add(&self, obs: &WeatherObservation) -> AddObsResult {
        insert(&self.db_conn, &self.insert_sql, obs)
    }

    /// Start a batch of additions.
    pub fn batch(&mut self) -> Result<ArchiveBatch<'_>, WlkDataErr> {
        let tx = self.db_conn.transaction()?;

        Ok(ArchiveBatch {
            tx,
            insert_sql: &self.insert_sql,
        })
    }
}

fn insert(db_conn: &rusqlite::Connection, sql: &str, obs: &WeatherObservation) -> AddObsResult {
    let values = row_values(obs);

    let res = db_conn
        .prepare_cached(sql)
        .and_then(|mut stmt| stmt.execute(&values));

    match res {
        Ok(_) => AddObsResult::Inserted,
        Err(rusqlite::Error::SqliteFailure(err, _)) if is_duplicate(&err) => {
            trace!(timestamp = obs.timestamp, "duplicate observation");
            AddObsResult::Duplicate
        }
        Err(err) => AddObsResult::Error(err.into()),
    }
}

fn is_duplicate(err: &rusqlite::ffi::Error) -> bool {
    err.code == rusqlite::ErrorCode::ConstraintViolation
        && (err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
}

// Values in the same order as `columns`.
fn row_values(obs: &WeatherObservation) -> Vec<Value> {
    let real = |val: Option<f64>| val.map(Value::Real).unwrap_or(Value::Null);

    let mut values = Vec::with_capacity(64);
    values.push(Value::Integer(obs.timestamp));
    values.push(Value::Integer(i64::from(US_UNITS)));
    values.push(Value::Integer(i64::from(obs.interval)));

    values.extend(Field::iter().map(|field| real(obs.get(field))));

    values.push(real(obs.dewpoint));
    values.push(real(obs.windchill));
    values.push(real(obs.heatindex));
    values.push(real(obs.rx_check_percent));

    values
}
