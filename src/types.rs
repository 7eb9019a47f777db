use std::fmt;
use std::path::PathBuf;

use crate::error::{ObjectError, SkipReason};

// Image extensions tried, in order, when looking up the image for an annotation
pub const IMG_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Returns true when `ext` is one of the supported image extensions.
pub fn is_image_extension(ext: &str) -> bool {
    IMG_EXTENSIONS
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(ext))
}

// Axis-aligned box in absolute pixel coordinates, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsoluteBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl AbsoluteBox {
    /// Build a box from two opposite corners given in any order.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Result<Self, ObjectError> {
        let (x_min, x_max) = (a.0.min(b.0), a.0.max(b.0));
        let (y_min, y_max) = (a.1.min(b.1), a.1.max(b.1));

        if !(x_min.is_finite() && y_min.is_finite() && x_max.is_finite() && y_max.is_finite()) {
            return Err(ObjectError::malformed("box corner is not a finite number"));
        }
        if x_min == x_max || y_min == y_max {
            return Err(ObjectError::malformed(format!(
                "box ({}, {}, {}, {}) has zero area",
                x_min, y_min, x_max, y_max
            )));
        }

        Ok(AbsoluteBox {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }
}

// One annotated object before class resolution
#[derive(Debug, Clone, PartialEq)]
pub struct SourceObject {
    pub class_name: String,
    pub bbox: AbsoluteBox,
}

// One annotation unit as read from the source dataset
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub image_id: String,
    pub image_width: u32,
    pub image_height: u32,
    pub objects: Vec<SourceObject>,
    /// Objects the reader could not turn into a box; already logged.
    pub dropped: Vec<ObjectError>,
}

// Normalized YOLO box. Only built by `conversion::normalize_box`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub(crate) class_id: u32,
    pub(crate) x_center: f64,
    pub(crate) y_center: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
}

impl NormalizedBox {
    pub fn class_id(&self) -> u32 {
        self.class_id
    }

    /// Render as a YOLO label line, without the trailing newline.
    pub fn to_label_line(&self) -> String {
        format!(
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.x_center, self.y_center, self.width, self.height
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subset {
    Train,
    Val,
}

impl Subset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subset::Train => "train",
            Subset::Val => "val",
        }
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// A record that made it into the output dataset
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub image_path: PathBuf,
    pub label_path: PathBuf,
    pub boxes: Vec<NormalizedBox>,
}

// Struct to hold the paths to the output directories for the train/val splits
#[derive(Debug, Clone)]
pub struct OutputDirs {
    pub root: PathBuf,
    pub train_labels_dir: PathBuf,
    pub val_labels_dir: PathBuf,
    pub train_images_dir: PathBuf,
    pub val_images_dir: PathBuf,
}

impl OutputDirs {
    pub fn images_dir(&self, subset: Subset) -> &PathBuf {
        match subset {
            Subset::Train => &self.train_images_dir,
            Subset::Val => &self.val_images_dir,
        }
    }

    pub fn labels_dir(&self, subset: Subset) -> &PathBuf {
        match subset {
            Subset::Train => &self.train_labels_dir,
            Subset::Val => &self.val_labels_dir,
        }
    }
}

// Per-subset counters
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SubsetStats {
    pub assigned: usize,
    pub successful: usize,
    pub skipped: usize,
}

// Struct to hold processing statistics for one conversion run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub total_files: usize,
    pub skipped_missing_dimensions: usize,
    pub skipped_parse_error: usize,
    pub skipped_duplicate_id: usize,
    pub skipped_missing_image: usize,
    pub dropped_unknown_class: usize,
    pub dropped_malformed_box: usize,
    pub train: SubsetStats,
    pub val: SubsetStats,
}

impl ConversionSummary {
    /// Count a skipped record. `subset` is set once the record was assigned
    /// to train or val.
    pub fn record_skip(&mut self, reason: &SkipReason, subset: Option<Subset>) {
        match reason {
            SkipReason::MissingDimensions => self.skipped_missing_dimensions += 1,
            SkipReason::ParseError(_) => self.skipped_parse_error += 1,
            SkipReason::DuplicateImageId => self.skipped_duplicate_id += 1,
            SkipReason::ImageNotFound => self.skipped_missing_image += 1,
        }
        if let Some(subset) = subset {
            self.subset_mut(subset).skipped += 1;
        }
    }

    pub fn record_dropped_object(&mut self, error: &ObjectError) {
        match error {
            ObjectError::UnknownClass { .. } => self.dropped_unknown_class += 1,
            ObjectError::MalformedBox { .. } => self.dropped_malformed_box += 1,
        }
    }

    pub fn subset(&self, subset: Subset) -> &SubsetStats {
        match subset {
            Subset::Train => &self.train,
            Subset::Val => &self.val,
        }
    }

    pub fn subset_mut(&mut self, subset: Subset) -> &mut SubsetStats {
        match subset {
            Subset::Train => &mut self.train,
            Subset::Val => &mut self.val,
        }
    }

    pub fn successful(&self) -> usize {
        self.train.successful + self.val.successful
    }

    pub fn skipped(&self) -> usize {
        self.skipped_missing_dimensions
            + self.skipped_parse_error
            + self.skipped_duplicate_id
            + self.skipped_missing_image
    }
}

impl fmt::Display for ConversionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Conversion Summary ===")?;
        writeln!(f, "Total annotation files: {}", self.total_files)?;
        writeln!(f, "Successful: {}", self.successful())?;
        writeln!(
            f,
            "Skipped: {} (missing dimensions: {}, parse errors: {}, duplicate ids: {}, missing image: {})",
            self.skipped(),
            self.skipped_missing_dimensions,
            self.skipped_parse_error,
            self.skipped_duplicate_id,
            self.skipped_missing_image
        )?;
        writeln!(
            f,
            "Dropped objects: unknown class: {}, malformed box: {}",
            self.dropped_unknown_class, self.dropped_malformed_box
        )?;
        for subset in [Subset::Train, Subset::Val] {
            let stats = self.subset(subset);
            writeln!(
                f,
                "{}: assigned={}, successful={}, skipped={}",
                subset, stats.assigned, stats.successful, stats.skipped
            )?;
        }
        Ok(())
    }
}
