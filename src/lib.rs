#![deny(missing_docs)]
//! Package to decode WeatherLink `.wlk` archive files and store the observations in an archive.

//
// Public API
//
pub use crate::archive::{AddObsResult, Archive, ArchiveBatch};
pub use crate::cmd_line::CommonCmdLineArgs;
pub use crate::derived::{dewpoint, heat_index, wind_chill};
pub use crate::errors::WlkDataErr;
pub use crate::import::{
    decode_file, import_file, import_files, FileOutcome, FileSummary, RunSummary,
};
pub use crate::observation::{WeatherObservation, US_UNITS};
pub use crate::sources::{is_wlk_file, resolve_sources};
pub use crate::wlk::{
    decode_time, reception_quality, CompassPoint, DayIndex, DayRun, DecodedFile, Dispatched,
    Field, FieldRule, FileIdentity, HeaderBlock, Observations, RainCollector, RawRecord,
    RecordType, StationModel, Truncation, WeatherDataRecord, WlkReader, HEADER_SIZE, RECORD_SIZE,
};

//
// Implementation only
//
mod archive;
mod cmd_line;
mod derived;
mod errors;
mod import;
mod observation;
mod sources;
mod wlk;
