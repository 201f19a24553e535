//! Maintenance Report CLI

use clap::Parser;
use report::{ReportConfig, ReportGenerator, DEFAULT_FIGURES_DIR, DEFAULT_OUTPUT_PATH};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "maintenance-report", version, about = "Generate the predictive maintenance PDF report")]
struct Cli {
    /// Feature table CSV
    #[arg(long, env = "MAINTENANCE_DATA_PATH", default_value = feature_store::DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// Directory for the chart image
    #[arg(long, default_value = DEFAULT_FIGURES_DIR)]
    figures_dir: PathBuf,

    /// Output PDF path
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only the confirmation line
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let config = ReportConfig {
        data_path: cli.data,
        figures_dir: cli.figures_dir,
        output_path: cli.output,
        ..Default::default()
    };

    let outline = ReportGenerator::new(config).generate()?;
    println!("Report generated at: {}", outline.pdf_path.display());
    Ok(())
}
