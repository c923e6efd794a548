//! Command line options that are used across applications.

use std::path::{Path, PathBuf};

use clap::{App, Arg, ArgMatches};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{errors::WlkDataErr, sources::resolve_sources};

/// Struct to package up command line arguments.
#[derive(Clone, Debug)]
pub struct CommonCmdLineArgs {
    // Files, directories, or patterns to read.
    sources: Vec<String>,
    // Path to the root of the archive
    root: PathBuf,
    // Number of threads used for decoding.
    jobs: usize,
    // 0 is warnings only, each -v adds a level, -q is errors only.
    verbosity: i8,
}

impl<'a, 'b> CommonCmdLineArgs {
    /// Create a new set of args.
    pub fn new_app(app_name: &'static str, about: &'static str) -> App<'a, 'b> {
        App::new(app_name)
            .author("Ryan Leach <clumsycodemonkey@gmail.com>")
            .about(about)
            .version(clap::crate_version!())
            .arg(
                Arg::with_name("sources")
                    .index(1)
                    .multiple(true)
                    .required(true)
                    .takes_value(true)
                    .help("Files, directories, or glob patterns to read.")
                    .long_help(concat!(
                        "Files, directories, or glob patterns to read. Directories are searched ",
                        "for files ending in .wlk, and file names must look like 2024-03.wlk."
                    )),
            )
            .arg(
                Arg::with_name("root")
                    .short("r")
                    .long("root")
                    .takes_value(true)
                    .help("Path to the archive.")
                    .long_help("Path to the archive. Defaults to the current directory."),
            )
            .arg(
                Arg::with_name("jobs")
                    .short("j")
                    .long("jobs")
                    .takes_value(true)
                    .help("Number of files to decode at once.")
                    .long_help("Number of files to decode at once. Defaults to the number of CPUs."),
            )
            .arg(
                Arg::with_name("verbose")
                    .short("v")
                    .long("verbose")
                    .multiple(true)
                    .help("Log more, repeat for even more."),
            )
            .arg(
                Arg::with_name("quiet")
                    .short("q")
                    .long("quiet")
                    .conflicts_with("verbose")
                    .help("Only log errors."),
            )
            .after_help(concat!(
                "Logging can also be configured with the RUST_LOG environment variable, which ",
                "overrides -v and -q."
            ))
    }

    /// Process an `App` to get the parsed values out of it and the matches object so an application
    /// can continue with further argument parsing.
    pub fn matches(app: App<'a, 'b>) -> Result<(Self, ArgMatches<'a>), WlkDataErr> {
        let matches = app.get_matches();
        let cmd_line_opts = Self::from_matches(&matches)?;

        Ok((cmd_line_opts, matches))
    }

    fn from_matches(matches: &ArgMatches) -> Result<Self, WlkDataErr> {
        let sources: Vec<String> = matches
            .values_of("sources")
            .into_iter()
            .flat_map(|source_iter| source_iter.map(|arg_val| arg_val.to_owned()))
            .collect();

        let root = match matches.value_of("root") {
            Some(root) => PathBuf::from(root),
            None => std::env::current_dir()?,
        };

        let jobs = match matches.value_of("jobs") {
            Some(jobs) => jobs
                .parse::<usize>()
                .map_err(|_| WlkDataErr::LogicError("jobs must be a positive integer"))?
                .max(1),
            None => Self::default_jobs(),
        };

        let verbosity = if matches.is_present("quiet") {
            -1
        } else {
            matches.occurrences_of("verbose").min(3) as i8
        };

        Ok(CommonCmdLineArgs {
            sources,
            root,
            jobs,
            verbosity,
        })
    }

    fn default_jobs() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// Get the sources as given on the command line.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Expand the sources into a list of files.
    pub fn input_files(&self) -> Result<Vec<PathBuf>, WlkDataErr> {
        resolve_sources(&self.sources)
    }

    /// Get the root of the archive
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the number of decoding threads.
    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// The log level selected with -v and -q.
    pub fn log_level(&self) -> &'static str {
        match self.verbosity {
            i8::MIN..=-1 => "error",
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Install a subscriber that logs to stderr.
    ///
    /// `RUST_LOG` takes precedence over the level from the command line.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("wlk_data={}", self.log_level())));

        // A subscriber may already be installed, keep that one.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init();
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
