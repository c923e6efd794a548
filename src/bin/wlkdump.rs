//! Print the observations in WeatherLink .wlk files.

use std::io::{stdout, Write};

use anyhow::{bail, Error};

use wlk_data::{decode_file, CommonCmdLineArgs};

fn main() {
    if let Err(ref e) = run() {
        println!("error: {}", e);

        for cause in e.chain().skip(1) {
            println!("caused by: {}", cause);
        }

        ::std::process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let app = CommonCmdLineArgs::new_app(
        "wlkdump",
        "Print the observations in WeatherLink .wlk files, one per line.",
    );
    let (args, _matches) = CommonCmdLineArgs::matches(app)?;
    args.init_logging();

    let files = args.input_files()?;

    let stdout = stdout();
    let mut out = stdout.lock();
    let mut failed = 0;

    for path in &files {
        writeln!(out, "# {}", path.display())?;

        let decoded = match decode_file(path) {
            Ok(decoded) => decoded,
            Err(err) => {
                writeln!(out, "# skipped: {}", err)?;
                failed += 1;
                continue;
            }
        };

        for obs in &decoded.observations {
            writeln!(out, "{}", obs)?;
        }

        if let Some(trunc) = decoded.truncated {
            writeln!(
                out,
                "# truncated on day {} after {} of {} records",
                trunc.day, trunc.read, trunc.expected
            )?;
        }
    }

    if failed == files.len() {
        bail!("none of the {} files could be decoded", files.len());
    }

    Ok(())
}
