//! An archive of weather observations.
//!
//! The archive is a SQLite database with a single `archive` table laid out the way wview and
//! weewx lay theirs out: one row per archive interval keyed by `dateTime` in epoch seconds, and
//! one nullable column per observation type.

use std::path::PathBuf;

use strum::IntoEnumIterator;

use crate::wlk::Field;

pub use self::add_data::{AddObsResult, ArchiveBatch};

/// The archive.
#[derive(Debug)]
pub struct Archive {
    root: PathBuf,                 // The root directory.
    db_conn: rusqlite::Connection, // An sqlite connection.
    insert_sql: String,            // Built once, the column list never changes.
}

mod add_data;
mod query;
mod root;

const KEY_COLUMNS: [&str; 3] = ["dateTime", "usUnits", "interval"];
const DERIVED_COLUMNS: [&str; 4] = ["dewpoint", "windchill", "heatindex", "rxCheckPercent"];

/// All columns of the archive table in row order.
fn columns() -> impl Iterator<Item = &'static str> {
    KEY_COLUMNS
        .iter()
        .copied()
        .chain(Field::iter().map(Field::as_static_str))
        .chain(DERIVED_COLUMNS.iter().copied())
}

fn column_list() -> String {
    columns().collect::<Vec<_>>().join(", ")
}

fn insert_sql() -> String {
    let placeholders = columns().map(|_| "?").collect::<Vec<_>>().join(", ");

    format!(
        "INSERT INTO archive ({}) VALUES ({})",
        column_list(),
        placeholders
    )
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    use crate::{
        errors::WlkDataErr,
        observation::WeatherObservation,
        wlk::{unit::weather_record, FileIdentity},
    };

    use tempdir::TempDir;

    // struct to hold temporary data for tests.
    struct TestArchive {
        tmp: TempDir,
        arch: Archive,
    }

    // Function to create a new archive to test.
    fn create_test_archive() -> Result<TestArchive, WlkDataErr> {
        let tmp = TempDir::new("wlk-data-test-archive")?;
        let arch = Archive::create(&tmp.path())?;

        Ok(TestArchive { tmp, arch })
    }

    fn test_observation(packed_time: i16) -> WeatherObservation {
        let identity = FileIdentity {
            year: 2024,
            month: 3,
        };

        WeatherObservation::from_record(&weather_record(packed_time), identity, 15)
            .expect("Error decoding test record.")
    }

    #[test]
    fn test_archive_create_new() {
        assert!(create_test_archive().is_ok());
    }

    #[test]
    fn test_archive_connect() {
        let TestArchive { tmp, arch } =
            create_test_archive().expect("Failed to create test archive.");
        drop(arch);

        assert!(Archive::connect(&tmp.path()).is_ok());
        assert!(Archive::connect(&"unlikely_directory_in_my_project").is_err());
    }

    #[test]
    fn test_archive_open() {
        let tmp = TempDir::new("wlk-data-test-archive").expect("Failed to create temp dir.");
        let root = tmp.path().join("nested").join("archive");

        let arch = Archive::open(&root).expect("Failed to create archive.");
        assert!(arch.db_file().is_file());
        arch.add(&test_observation(30));
        drop(arch);

        let arch = Archive::open(&root).expect("Failed to reopen archive.");
        assert_eq!(arch.count().unwrap(), 1);
    }

    #[test]
    fn test_get_root() {
        let TestArchive { tmp, arch } =
            create_test_archive().expect("Failed to create test archive.");

        let root = arch.root();
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn test_connect_rejects_other_databases() {
        let tmp = TempDir::new("wlk-data-test-archive").expect("Failed to create temp dir.");
        {
            let conn = rusqlite::Connection::open(tmp.path().join(Archive::DB_FILE)).unwrap();
            conn.execute_batch("CREATE TABLE archive (dateTime INTEGER PRIMARY KEY, outTemp REAL);")
                .unwrap();
        }

        assert!(matches!(
            Archive::connect(&tmp.path()),
            Err(WlkDataErr::InvalidSchema)
        ));
    }

    #[test]
    fn test_columns_match_row_layout() {
        assert_eq!(columns().count(), 3 + Field::iter().count() + 4);
        assert!(insert_sql().starts_with("INSERT INTO archive (dateTime, usUnits, interval, "));
    }

    #[test]
    fn test_insert_sql_built_once() {
        let TestArchive { tmp, arch } =
            create_test_archive().expect("Failed to create test archive.");
        assert_eq!(arch.insert_sql, insert_sql());

        drop(arch);
        let arch = Archive::connect(&tmp.path()).expect("Failed to connect to archive.");
        assert_eq!(arch.insert_sql, insert_sql());
    }

    #[test]
    fn test_observation_round_trip() {
        let TestArchive { tmp: _tmp, arch } =
            create_test_archive().expect("Failed to create test archive.");

        let obs = test_observation(90);
        assert!(arch.add(&obs).is_inserted());

        let retrieved = arch
            .observation(obs.timestamp)
            .expect("Error querying archive.")
            .expect("Observation not in archive.");
        assert_eq!(retrieved, obs);

        assert!(arch.observation(obs.timestamp + 1).unwrap().is_none());
    }

    #[test]
    fn test_adding_duplicates() {
        let TestArchive { tmp: _tmp, arch } =
            create_test_archive().expect("Failed to create test archive.");

        let obs = test_observation(90);

        assert!(matches!(arch.add(&obs), AddObsResult::Inserted));
        assert!(matches!(arch.add(&obs), AddObsResult::Duplicate));
        assert_eq!(arch.count().unwrap(), 1);
    }

    #[test]
    fn test_batch_commit_and_rollback() {
        let TestArchive {
            tmp: _tmp,
            mut arch,
        } = create_test_archive().expect("Failed to create test archive.");

        {
            let batch = arch.batch().expect("Error starting batch.");
            assert!(batch.add(&test_observation(30)).is_inserted());
            assert!(batch.add(&test_observation(60)).is_inserted());
            assert!(matches!(
                batch.add(&test_observation(60)),
                AddObsResult::Duplicate
            ));
            batch.commit().expect("Error committing.");
        }
        assert_eq!(arch.count().unwrap(), 2);

        {
            let batch = arch.batch().expect("Error starting batch.");
            assert!(batch.add(&test_observation(90)).is_inserted());
            // Dropped without a commit.
        }
        assert_eq!(arch.count().unwrap(), 2);
    }

    #[test]
    fn test_time_queries() {
        let TestArchive { tmp: _tmp, arch } =
            create_test_archive().expect("Failed to create test archive.");

        assert_eq!(arch.most_recent_time().unwrap(), None);

        let times: Vec<i64> = [120, 30, 90, 60]
            .iter()
            .map(|&minutes| {
                let obs = test_observation(minutes);
                arch.add(&obs);
                obs.timestamp
            })
            .collect();

        let midnight = 1_710_460_800;
        assert_eq!(
            arch.timestamps_between(midnight + 60 * 60, midnight + 120 * 60)
                .unwrap(),
            vec![midnight + 60 * 60, midnight + 90 * 60, midnight + 120 * 60]
        );
        assert_eq!(arch.most_recent_time().unwrap(), Some(times[0]));
        assert_eq!(arch.count().unwrap(), 4);
    }
}
