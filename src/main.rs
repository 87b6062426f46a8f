extern crate campus_energy;

use campus_energy::output::FileOutput;
use campus_energy::{run_dashboard, BuildingManager, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct DashboardArgs {
    #[arg(
        default_value = DEFAULT_INPUT_DIR,
        help = "Directory containing one CSV of meter readings per building"
    )]
    input_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = DashboardArgs::parse();

    let tracing_subscriber = tracing_subscriber::fmt::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(tracing_subscriber)?;

    let output = FileOutput::create(DEFAULT_OUTPUT_DIR)?;
    let mut manager = BuildingManager::new();

    let run = run_dashboard(
        &args.input_dir,
        &output,
        &mut manager,
        Local::now().naive_local(),
    )?;

    info!(
        "Analysed {} buildings from {} records ({} files found)",
        run.summary.buildings_analyzed, run.summary.records_processed, run.files_found
    );

    Ok(())
}
