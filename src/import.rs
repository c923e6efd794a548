//! Move observations from files into the archive.
//!
//! Each file is decoded completely before anything from it is stored, then its observations are
//! added in one batch. A file that fails to decode stores nothing. A truncated file stores the
//! observations read before the end.
//!
//! With more than one job the files are decoded on worker threads while the calling thread does
//! all the writing, one file at a time in the order the files were given.

use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc,
    },
    time::{Duration, Instant},
};

use tracing::{info, warn};

use crate::{
    archive::{AddObsResult, Archive},
    errors::WlkDataErr,
    wlk::{DecodedFile, Truncation, WlkReader},
};

/// How far processing of a file got.
#[derive(Debug)]
pub enum FileOutcome {
    /// Every record was read.
    Complete,
    /// The file ended early, everything before the end was kept.
    Truncated(Truncation),
    /// Nothing from the file was stored.
    Failed(WlkDataErr),
}

/// What happened to a single file.
#[derive(Debug)]
pub struct FileSummary {
    /// The file.
    pub path: PathBuf,
    /// Observations decoded from the file.
    pub decoded: usize,
    /// Observations stored.
    pub inserted: usize,
    /// Observations already in the archive.
    pub duplicates: usize,
    /// Observations that could not be stored.
    pub errors: usize,
    /// How far processing got.
    pub outcome: FileOutcome,
    /// Time spent decoding and storing.
    pub elapsed: Duration,
}

impl FileSummary {
    fn new(path: PathBuf) -> Self {
        FileSummary {
            path,
            decoded: 0,
            inserted: 0,
            duplicates: 0,
            errors: 0,
            outcome: FileOutcome::Complete,
            elapsed: Duration::default(),
        }
    }

    /// True if the file was abandoned.
    pub fn failed(&self) -> bool {
        matches!(self.outcome, FileOutcome::Failed(_))
    }

    /// True if the file was abandoned because its contents could not be decoded, as opposed to
    /// not being readable or storable at all.
    pub fn bad_format(&self) -> bool {
        match &self.outcome {
            FileOutcome::Failed(err) => err.is_format_error(),
            _ => false,
        }
    }

    /// Decoded observations per second.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.decoded as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for FileSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {} inserted, {} duplicates, {} errors",
            self.path.display(),
            self.inserted,
            self.duplicates,
            self.errors
        )?;

        match &self.outcome {
            FileOutcome::Complete => {}
            FileOutcome::Truncated(trunc) => write!(
                f,
                " (truncated on day {} after {} of {} records)",
                trunc.day, trunc.read, trunc.expected
            )?,
            FileOutcome::Failed(err) => write!(f, " (failed: {})", err)?,
        }

        write!(
            f,
            " in {:.3}s, {:.0} records/s",
            self.elapsed.as_secs_f64(),
            self.rate()
        )
    }
}

/// What happened to every file of a run, in input order.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// One entry per input file.
    pub files: Vec<FileSummary>,
    /// Wall clock time for the whole run.
    pub elapsed: Duration,
}

impl RunSummary {
    /// Total observations stored.
    pub fn inserted(&self) -> usize {
        self.files.iter().map(|f| f.inserted).sum()
    }

    /// Total duplicate observations.
    pub fn duplicates(&self) -> usize {
        self.files.iter().map(|f| f.duplicates).sum()
    }

    /// Total observations that could not be stored.
    pub fn errors(&self) -> usize {
        self.files.iter().map(|f| f.errors).sum()
    }

    /// Number of files abandoned.
    pub fn failed_files(&self) -> usize {
        self.files.iter().filter(|f| f.failed()).count()
    }

    /// Number of files abandoned because of their contents.
    pub fn bad_format_files(&self) -> usize {
        self.files.iter().filter(|f| f.bad_format()).count()
    }

    /// Number of files that ended early.
    pub fn truncated_files(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Truncated(_)))
            .count()
    }

    /// True if at least one file was processed without being abandoned.
    pub fn any_success(&self) -> bool {
        self.files.iter().any(|f| !f.failed())
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} files ({} failed, {} truncated): {} inserted, {} duplicates, {} errors in {:.3}s",
            self.files.len(),
            self.failed_files(),
            self.truncated_files(),
            self.inserted(),
            self.duplicates(),
            self.errors(),
            self.elapsed.as_secs_f64()
        )
    }
}

/// Decode every observation in a file.
pub fn decode_file(path: &Path) -> Result<DecodedFile, WlkDataErr> {
    WlkReader::open(&path)?.decode_all()
}

/// Decode a file and store its observations.
pub fn import_file(arch: &mut Archive, path: &Path) -> FileSummary {
    let start = Instant::now();
    let decoded = decode_file(path);

    store(arch, path.to_path_buf(), decoded, start)
}

/// Import files, decoding with up to `jobs` threads.
///
/// A file that fails never stops the run, see the summary for what happened to each file.
pub fn import_files(arch: &mut Archive, paths: &[PathBuf], jobs: usize) -> RunSummary {
    let start = Instant::now();
    let jobs = jobs.max(1).min(paths.len());

    let files = if jobs <= 1 {
        paths
            .iter()
            .map(|path| import_file(arch, path))
            .collect()
    } else {
        import_parallel(arch, paths, jobs)
    };

    let summary = RunSummary {
        files,
        elapsed: start.elapsed(),
    };

    info!(
        files = summary.files.len(),
        failed = summary.failed_files(),
        inserted = summary.inserted(),
        duplicates = summary.duplicates(),
        errors = summary.errors(),
        "import finished"
    );

    summary
}

fn import_parallel(arch: &mut Archive, paths: &[PathBuf], jobs: usize) -> Vec<FileSummary> {
    let next_path = AtomicUsize::new(0);
    let mut files = Vec::with_capacity(paths.len());

    std::thread::scope(|scope| {
        let (tx, rx) = mpsc::channel();

        for _ in 0..jobs {
            let tx = tx.clone();
            let next_path = &next_path;

            scope.spawn(move || loop {
                let idx = next_path.fetch_add(1, Ordering::Relaxed);
                if idx >= paths.len() {
                    break;
                }

                let start = Instant::now();
                let decoded = decode_file(&paths[idx]);
                if tx.send((idx, decoded, start)).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        // Decoding finishes out of order, storing happens in input order.
        let mut pending = BTreeMap::new();
        for (idx, decoded, start) in rx {
            pending.insert(idx, (decoded, start));

            while let Some((decoded, start)) = pending.remove(&files.len()) {
                let path = paths[files.len()].clone();
                files.push(store(arch, path, decoded, start));
            }
        }
    });

    files
}

#[derive(Default)]
struct Counts {
    inserted: usize,
    duplicates: usize,
    errors: usize,
}

fn store(
    arch: &mut Archive,
    path: PathBuf,
    decoded: Result<DecodedFile, WlkDataErr>,
    start: Instant,
) -> FileSummary {
    let mut summary = FileSummary::new(path);

    match decoded {
        Ok(decoded) => {
            summary.decoded = decoded.observations.len();

            match add_all(arch, &decoded) {
                Ok(counts) => {
                    summary.inserted = counts.inserted;
                    summary.duplicates = counts.duplicates;
                    summary.errors = counts.errors;
                    if let Some(trunc) = decoded.truncated {
                        summary.outcome = FileOutcome::Truncated(trunc);
                    }
                }
                Err(err) => summary.outcome = FileOutcome::Failed(err),
            }
        }
        Err(err) => summary.outcome = FileOutcome::Failed(err),
    }

    summary.elapsed = start.elapsed();

    match &summary.outcome {
        FileOutcome::Complete => info!(
            file = %summary.path.display(),
            inserted = summary.inserted,
            duplicates = summary.duplicates,
            errors = summary.errors,
            "imported"
        ),
        FileOutcome::Truncated(trunc) => warn!(
            file = %summary.path.display(),
            day = trunc.day,
            read = trunc.read,
            expected = trunc.expected,
            inserted = summary.inserted,
            "file truncated"
        ),
        FileOutcome::Failed(err) if err.is_format_error() => warn!(
            file = %summary.path.display(),
            error = %err,
            "bad file format, skipped"
        ),
        FileOutcome::Failed(err) => warn!(
            file = %summary.path.display(),
            error = %err,
            "file could not be imported, skipped"
        ),
    }

    summary
}

fn add_all(arch: &mut Archive, decoded: &DecodedFile) -> Result<Counts, WlkDataErr> {
    let mut counts = Counts::default();
    let batch = arch.batch()?;

    for obs in &decoded.observations {
        match batch.add(obs) {
            AddObsResult::Inserted => counts.inserted += 1,
            AddObsResult::Duplicate => counts.duplicates += 1,
            AddObsResult::Error(err) => {
                warn!(timestamp = obs.timestamp, error = %err, "failed to store observation");
                counts.errors += 1;
            }
        }
    }

    batch.commit()?;

    Ok(counts)
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
