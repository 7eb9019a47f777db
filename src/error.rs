use std::path::PathBuf;
use thiserror::Error;

/// Why a whole annotation record was left out of the output dataset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("image size is missing or zero")]
    MissingDimensions,
    #[error("failed to parse annotation: {0}")]
    ParseError(String),
    #[error("no image file found for the annotation")]
    ImageNotFound,
    #[error("image id was already taken by an earlier annotation")]
    DuplicateImageId,
}

/// Why a single object was dropped from an otherwise valid record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    #[error("unknown class `{name}`")]
    UnknownClass { name: String },
    #[error("malformed bounding box: {detail}")]
    MalformedBox { detail: String },
}

impl ObjectError {
    pub fn malformed(detail: impl Into<String>) -> Self {
        ObjectError::MalformedBox {
            detail: detail.into(),
        }
    }
}

/// Errors that either abort the run or are reported by the normalizer.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to load class metadata from {}: {source}", .path.display())]
    MetadataLoadFailure {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("image size {width}x{height} cannot be used for normalization")]
    InvalidImageSize { width: u32, height: u32 },
    #[error("box ({x_min}, {y_min}, {x_max}, {y_max}) lies outside the {width}x{height} image")]
    BoxOutOfBounds {
        x_min: f64,
        y_min: f64,
        x_max: f64,
        y_max: f64,
        width: u32,
        height: u32,
    },
    #[error("destination {} already contains files; pass --clean to replace it", .path.display())]
    DestinationNotEmpty { path: PathBuf },
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}
