#![deny(clippy::all)]
#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use env_logger::Env;
use log::{error, info};
use structopt::StructOpt;

mod compiler;
mod converter;
mod error;
mod geo;
mod igc;
mod stats;
mod txt_data;

use converter::Converter;
use txt_data::Encoding;

/// Convert IGC flight logs into KML track documents.
#[derive(StructOpt)]
#[structopt(name = "igc2kml")]
struct Args {
    #[structopt(name = "input", parse(from_os_str), required = true)]
    inputs: Vec<PathBuf>,
    /// Output directory, defaults to the directory of each input file
    #[structopt(short = "d", long = "dest", parse(from_os_str))]
    dest: Option<PathBuf>,
    /// Clamp the track to the ground
    #[structopt(short = "c", long = "clamp")]
    clamp: bool,
    /// Extrude the track to the ground
    #[structopt(short = "e", long = "extrude")]
    extrude: bool,
    /// Use GPS altitude instead of pressure altitude
    #[structopt(short = "g", long = "gps")]
    gps: bool,
    /// Encoding of the input files (ISO-8859-1 or UTF-8)
    #[structopt(long = "encoding", default_value = "ISO-8859-1")]
    encoding: Encoding,
}

fn convert(args: &Args, input: &Path) -> error::Result<PathBuf> {
    let mut converter = Converter::new();
    converter.parse(input, args.encoding)?;
    converter.compile(args.clamp, args.extrude, args.gps)?;
    converter.export(args.dest.as_deref())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::from_args();
    let mut failed = 0;

    for input in &args.inputs {
        match convert(&args, input) {
            Ok(dest) => info!("Converted {} -> {}", input.display(), dest.display()),
            Err(e) => {
                error!("{}: {}", input.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        error!("{} of {} conversions failed", failed, args.inputs.len());
        std::process::exit(1);
    }
}
