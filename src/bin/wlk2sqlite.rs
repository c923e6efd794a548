//! Import WeatherLink .wlk files into a wview style SQLite archive.

use anyhow::{bail, Context, Error};

use wlk_data::{import_files, Archive, CommonCmdLineArgs};

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
        "wlk2sqlite",
        "Import WeatherLink .wlk files into a SQLite archive.",
    );
    let (args, _matches) = CommonCmdLineArgs::matches(app)?;
    args.init_logging();

    let files = args.input_files()?;

    let mut arch = Archive::open(&args.root())
        .with_context(|| format!("unable to open archive in {}", args.root().display()))?;

    let summary = import_files(&mut arch, &files, args.jobs());

    for file in &summary.files {
        println!("{}", file);
    }
    println!("{}", summary);

    if !summary.any_success() {
        bail!("none of the {} files could be imported", summary.files.len());
    }

    Ok(())
}
