use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use super::{columns, insert_sql, Archive};

use crate::errors::WlkDataErr;

impl Archive {
    pub(crate) const DB_FILE: &'static str = "wview-archive.sdb";

    /// Initialize a new archive.
    pub fn create(root: &dyn AsRef<Path>) -> Result<Self, WlkDataErr> {
        let db_file = root.as_ref().join(Archive::DB_FILE);
        let root = root.as_ref().to_path_buf();

        std::fs::create_dir_all(&root)?;

        // Create and set up the archive
        let db_conn = rusqlite::Connection::open_with_flags(
            db_file,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE | rusqlite::OpenFlags::SQLITE_OPEN_CREATE,
        )?;

        db_conn.execute_batch(include_str!("root/create_archive.sql"))?;
        Self::validate_db_structure(&db_conn)?;

        Ok(Archive {
            root,
            db_conn,
            insert_sql: insert_sql(),
        })
    }

    /// Open an existing archive.
    pub fn connect(root: &dyn AsRef<Path>) -> Result<Self, WlkDataErr> {
        let db_file = root.as_ref().join(Archive::DB_FILE);
        let root = root.as_ref().to_path_buf();

        let db_conn = rusqlite::Connection::open_with_flags(
            db_file,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE,
        )?;

        Self::validate_db_structure(&db_conn)?;

        Ok(Archive {
            root,
            db_conn,
            insert_sql: insert_sql(),
        })
    }

    /// Open the archive in `root`, creating it if there isn't one yet.
    pub fn open(root: &dyn AsRef<Path>) -> Result<Self, WlkDataErr> {
        if Self::db_file_in(root.as_ref()).is_file() {
            Self::connect(root)
        } else {
            Self::create(root)
        }
    }

    /// Retrieve a path to the root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the database file.
    pub fn db_file(&self) -> PathBuf {
        Self::db_file_in(&self.root)
    }

    fn db_file_in(root: &Path) -> PathBuf {
        root.join(Archive::DB_FILE)
    }

    /// Validate the database structure is correct.
    fn validate_db_structure(db_conn: &rusqlite::Connection) -> Result<(), WlkDataErr> {
        let num_tables: i64 = db_conn.query_row(
            "SELECT COUNT(name) FROM sqlite_master WHERE type='table' AND name='archive'",
            rusqlite::NO_PARAMS,
            |row| row.get(0),
        )?;

        if num_tables != 1 {
            return Err(WlkDataErr::InvalidSchema);
        }

        // Check every column we write is there, extra columns are fine.
        let mut stmt = db_conn.prepare("PRAGMA table_info(archive)")?;
        let found: HashSet<String> = stmt
            .query_map(rusqlite::NO_PARAMS, |row: &rusqlite::Row| row.get(1))?
            .collect::<Result<_, _>>()?;

        if columns().all(|col| found.contains(col)) {
            Ok(())
        } else {
            Err(WlkDataErr::InvalidSchema)
        }
    }
}
