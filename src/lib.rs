//! Steel surface defect datasets to YOLO format converter
//!
//! This library converts the GC10-DET (Supervisely JSON) and NEU-DET (Pascal
//! VOC XML) annotation sets into one YOLO bounding-box dataset layout that an
//! object detection trainer can consume. Class ids of the two datasets share a
//! single id space.

pub mod classes;
pub mod config;
pub mod conversion;
pub mod dataset;
pub mod error;
pub mod io;
pub mod reader;
pub mod supervisely;
pub mod types;
pub mod utils;
pub mod voc;
pub mod yolo_dataset;

// Re-export commonly used types and functions
pub use classes::ClassMapping;
pub use config::{Gc10Args, NeuArgs, PipelineConfig};
pub use conversion::normalize_box;
pub use dataset::{split_ids, DatasetSplit};
pub use error::{ConvertError, ObjectError, SkipReason};
pub use io::{Materialized, Materializer};
pub use reader::AnnotationReader;
pub use supervisely::SuperviselyReader;
pub use types::{
    AbsoluteBox, ConversionSummary, NormalizedBox, OutputDirs, OutputRecord, SourceObject,
    SourceRecord, Subset,
};
pub use voc::VocReader;
pub use yolo_dataset::convert_dataset;
