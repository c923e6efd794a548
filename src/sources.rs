//! Turn the sources named on the command line into a list of files.
//!
//! A source is a file, a directory, or a glob pattern. A leading `~` is the home directory.
//! Directories are not searched recursively.

use std::path::{Path, PathBuf};

use dirs::home_dir;
use tracing::debug;

use crate::errors::WlkDataErr;

const WLK_EXTENSION: &str = "wlk";

/// Expand each source to the files it names, keeping the order of the sources.
///
/// Files found in a directory are sorted by name. A path that is named explicitly is kept even if
/// it does not end in `.wlk`.
pub fn resolve_sources<S: AsRef<str>>(sources: &[S]) -> Result<Vec<PathBuf>, WlkDataErr> {
    let mut files = vec![];

    for source in sources {
        let source = expand_home(source.as_ref());

        if source.is_dir() {
            files.extend(scan_directory(&source)?);
        } else if source.is_file() {
            files.push(source);
        } else if is_pattern(&source) {
            files.extend(expand_pattern(&source)?);
        } else {
            return Err(WlkDataErr::InvalidSourceDirectory(source));
        }
    }

    if files.is_empty() {
        return Err(WlkDataErr::NoInputFiles);
    }

    debug!(count = files.len(), "resolved input files");

    Ok(files)
}

/// True if the file has a `.wlk` extension, ignoring case.
pub fn is_wlk_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(WLK_EXTENSION))
        .unwrap_or(false)
}

fn expand_home(source: &str) -> PathBuf {
    if source == "~" {
        if let Some(home) = home_dir() {
            return home;
        }
    } else if let Some(rest) = source.strip_prefix("~/") {
        if let Some(home) = home_dir() {
            return home.join(rest);
        }
    }

    PathBuf::from(source)
}

fn is_pattern(source: &Path) -> bool {
    source
        .to_str()
        .map(|s| s.contains(|c| c == '*' || c == '?' || c == '['))
        .unwrap_or(false)
}

fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>, WlkDataErr> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_wlk_file(path))
        .collect();

    files.sort();

    Ok(files)
}

fn expand_pattern(pattern: &Path) -> Result<Vec<PathBuf>, WlkDataErr> {
    let pattern = pattern.to_string_lossy();

    let mut files: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();

    files.sort();

    Ok(files)
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
