use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use defect2yolo::{convert_dataset, ClassMapping, Gc10Args, SuperviselyReader};

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Gc10Args::parse();

    if !args.src_dir.exists() {
        anyhow::bail!(
            "The specified src_dir does not exist: {}",
            args.src_dir.display()
        );
    }

    info!("Starting GC10-DET conversion...");
    let classes = ClassMapping::from_meta_file(&args.meta_file(), args.class_offset)
        .context("Failed to build the GC10-DET class mapping")?;
    info!("Loaded {} classes from {}", classes.len(), args.meta_file().display());

    let config = args.to_pipeline_config();
    let summary = convert_dataset(&SuperviselyReader::new(), &classes, &config)
        .with_context(|| format!("Failed to convert {}", args.src_dir.display()))?;

    println!("{}", summary);
    info!("GC10-DET conversion completed.");
    Ok(())
}
