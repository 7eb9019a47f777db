use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use crate::classes::GC10_CLASS_OFFSET;

pub const DEFAULT_TRAIN_RATIO: f64 = 0.8;
pub const DEFAULT_SEED: u64 = 42;

/// Everything one conversion run needs. Built by the binaries from their
/// command-line arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub annotation_dir: PathBuf,
    pub image_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub train_ratio: f64,
    pub seed: u64,
    /// Delete the destination tree before converting.
    pub clean: bool,
    pub show_progress: bool,
}

impl PipelineConfig {
    pub fn new(
        annotation_dir: impl Into<PathBuf>,
        image_dir: impl Into<PathBuf>,
        dest_dir: impl Into<PathBuf>,
    ) -> Self {
        PipelineConfig {
            annotation_dir: annotation_dir.into(),
            image_dir: image_dir.into(),
            dest_dir: dest_dir.into(),
            train_ratio: DEFAULT_TRAIN_RATIO,
            seed: DEFAULT_SEED,
            clean: false,
            show_progress: true,
        }
    }
}

/// Convert the GC10-DET dataset (Supervisely JSON) to YOLO format.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Gc10Args {
    /// Root of the GC10-DET dataset, containing meta.json and ds/
    #[arg(
        long = "src_dir",
        default_value = "/mnt/hdd/datasets/steel-surface-defect-sample/GC10-DET"
    )]
    pub src_dir: PathBuf,

    /// Output directory of the YOLO dataset
    #[arg(long = "dst_dir", default_value = "datasets/GC10-DET")]
    pub dst_dir: PathBuf,

    /// Proportion of the dataset to use for training
    #[arg(long = "train_ratio", default_value_t = DEFAULT_TRAIN_RATIO, value_parser = validate_ratio)]
    pub train_ratio: f64,

    /// Seed for random shuffling
    #[arg(long = "seed", default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Id given to the first class in meta.json
    #[arg(long = "class_offset", default_value_t = GC10_CLASS_OFFSET)]
    pub class_offset: u32,

    /// Delete the output directory before converting
    #[arg(long = "clean")]
    pub clean: bool,
}

impl Gc10Args {
    pub fn meta_file(&self) -> PathBuf {
        self.src_dir.join("meta.json")
    }

    pub fn to_pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            train_ratio: self.train_ratio,
            seed: self.seed,
            clean: self.clean,
            ..PipelineConfig::new(
                self.src_dir.join("ds/ann"),
                self.src_dir.join("ds/img"),
                &self.dst_dir,
            )
        }
    }
}

/// Convert the NEU-DET dataset (Pascal VOC XML) to YOLO format.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct NeuArgs {
    /// Root of the NEU-DET dataset, containing annotations/ and images/
    pub src_dir: PathBuf,

    /// Proportion of the dataset to use for training
    #[arg(long = "train_ratio", default_value_t = DEFAULT_TRAIN_RATIO, value_parser = validate_ratio)]
    pub train_ratio: f64,

    /// Output directory of the YOLO dataset
    #[arg(long = "dst_dir", default_value = "datasets/NEU-DET")]
    pub dst_dir: PathBuf,

    /// Seed for random shuffling
    #[arg(long = "seed", default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Delete the output directory before converting
    #[arg(long = "clean")]
    pub clean: bool,
}

impl NeuArgs {
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            train_ratio: self.train_ratio,
            seed: self.seed,
            clean: self.clean,
            ..PipelineConfig::new(
                self.src_dir.join("annotations"),
                self.src_dir.join("images"),
                &self.dst_dir,
            )
        }
    }
}

// Validate that the ratio is between 0.0 and 1.0
pub fn validate_ratio(s: &str) -> Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if (0.0..=1.0).contains(&val) => Ok(val),
        _ => Err("RATIO must be between 0.0 and 1.0".to_string()),
    }
}
