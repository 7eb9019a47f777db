use std::path::Path;

use crate::error::SkipReason;
use crate::types::{is_image_extension, SourceRecord};

/// Parses one annotation file of a source dataset into a `SourceRecord`.
pub trait AnnotationReader {
    /// Extension of the annotation files this reader understands, without the dot.
    fn extension(&self) -> &'static str;

    fn parse(&self, path: &Path) -> Result<SourceRecord, SkipReason>;
}

/// Strip the extension from an image file name, the way the annotation formats
/// reference images (`crazing_1.jpg` -> `crazing_1`).
pub fn image_id_from_file_name(file_name: &str) -> String {
    let path = Path::new(file_name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(_)) => stem.to_string_lossy().into_owned(),
        _ => file_name.to_string(),
    }
}

/// Image id for an annotation file named after its image, such as
/// `img_01.jpg.json` or `img_01.json`.
pub fn image_id_from_annotation_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let inner = Path::new(&stem);
    match inner.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if is_image_extension(ext) => inner
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(stem),
        _ => stem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_id_from_file_name() {
        assert_eq!(image_id_from_file_name("crazing_1.jpg"), "crazing_1");
        assert_eq!(image_id_from_file_name("crazing_1"), "crazing_1");
        assert_eq!(image_id_from_file_name("a.b.png"), "a.b");
    }

    #[test]
    fn test_image_id_from_annotation_path() {
        assert_eq!(
            image_id_from_annotation_path(Path::new("ann/img_01.jpg.json")),
            "img_01"
        );
        assert_eq!(
            image_id_from_annotation_path(Path::new("ann/img_01.json")),
            "img_01"
        );
        assert_eq!(
            image_id_from_annotation_path(Path::new("ann/scan.v2.json")),
            "scan.v2"
        );
    }
}
