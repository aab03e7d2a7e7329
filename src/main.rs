extern crate heatcompare;

use anyhow::anyhow;
use clap::Parser;
use heatcompare::output::FileOutput;
use heatcompare::run_comparison;
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct CompareArgs {
    input_file: String,
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = CompareArgs::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let input_file = Path::new(args.input_file.as_str());
    let input_file_stem = input_file
        .file_stem()
        .and_then(OsStr::to_str)
        .ok_or_else(|| anyhow!("Could not determine a file name from {}", args.input_file))?;
    let output_directory = input_file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let output = FileOutput::new(output_directory, format!("{input_file_stem}_{{}}.{{}}"));

    info!("running comparison for {}", args.input_file);
    let run = run_comparison(BufReader::new(File::open(input_file)?), &output)?;

    for (position, system) in ["A", "B"].into_iter().zip(run.summary.systems()) {
        info!(
            system = position,
            archetype = %system.archetype,
            input_kwh = system.input_kwh,
            dumped_kwh = system.dumped_kwh,
            purges = system.purge_count,
            "day summary"
        );
    }

    Ok(())
}
