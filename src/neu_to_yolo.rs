use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use defect2yolo::{convert_dataset, ClassMapping, NeuArgs, VocReader};

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = NeuArgs::parse();

    if !args.src_dir.exists() {
        anyhow::bail!(
            "The specified src_dir does not exist: {}",
            args.src_dir.display()
        );
    }

    info!("Starting NEU-DET conversion...");
    let config = args.to_pipeline_config();
    let summary = convert_dataset(&VocReader::new(), &ClassMapping::neu_det(), &config)
        .with_context(|| format!("Failed to convert {}", args.src_dir.display()))?;

    println!("{}", summary);
    info!("NEU-DET conversion completed.");
    Ok(())
}
