//! Reader for Supervisely JSON annotations (GC10-DET).
//!
//! Each image has one `<image>.json` file holding the image size and a list of
//! objects; rectangles store their two corners under `points.exterior`.

use log::warn;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{ObjectError, SkipReason};
use crate::reader::{image_id_from_annotation_path, AnnotationReader};
use crate::types::{AbsoluteBox, SourceObject, SourceRecord};

#[derive(Debug, Deserialize)]
pub struct SuperviselyAnnotation {
    #[serde(default)]
    pub size: Option<ImageSize>,
    #[serde(default)]
    pub objects: Vec<SuperviselyObject>,
}

#[derive(Debug, Deserialize)]
pub struct ImageSize {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuperviselyObject {
    pub class_title: Option<String>,
    #[serde(default)]
    pub points: Option<Points>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Points {
    #[serde(default)]
    pub exterior: Vec<Vec<f64>>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SuperviselyReader;

impl SuperviselyReader {
    pub fn new() -> Self {
        Self
    }

    /// Build a record from an already deserialized annotation.
    fn to_record(
        &self,
        image_id: String,
        annotation: SuperviselyAnnotation,
    ) -> Result<SourceRecord, SkipReason> {
        let (image_width, image_height) = match annotation.size {
            Some(ImageSize {
                width: Some(w),
                height: Some(h),
            }) if w > 0 && h > 0 => (w, h),
            _ => return Err(SkipReason::MissingDimensions),
        };

        let mut objects = Vec::with_capacity(annotation.objects.len());
        let mut dropped = Vec::new();
        for object in annotation.objects {
            match parse_object(object) {
                Ok(parsed) => objects.push(parsed),
                Err(e) => {
                    warn!("Object in {} skipped: {}", image_id, e);
                    dropped.push(e);
                }
            }
        }

        Ok(SourceRecord {
            image_id,
            image_width,
            image_height,
            objects,
            dropped,
        })
    }
}

fn parse_object(object: SuperviselyObject) -> Result<SourceObject, ObjectError> {
    let class_name = object
        .class_title
        .ok_or_else(|| ObjectError::malformed("object has no classTitle"))?;
    let exterior = object.points.unwrap_or_default().exterior;

    if exterior.len() != 2 {
        return Err(ObjectError::malformed(format!(
            "`{}` has {} exterior points, expected 2",
            class_name,
            exterior.len()
        )));
    }
    let corner = |point: &[f64]| match point {
        [x, y] => Ok((*x, *y)),
        _ => Err(ObjectError::malformed(format!(
            "`{}` has a corner with {} coordinates",
            class_name,
            point.len()
        ))),
    };
    let bbox = AbsoluteBox::from_corners(
        corner(exterior[0].as_slice())?,
        corner(exterior[1].as_slice())?,
    )?;

    Ok(SourceObject { class_name, bbox })
}

impl AnnotationReader for SuperviselyReader {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn parse(&self, path: &Path) -> Result<SourceRecord, SkipReason> {
        let file = File::open(path).map_err(|e| SkipReason::ParseError(e.to_string()))?;
        let annotation: SuperviselyAnnotation = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| SkipReason::ParseError(e.to_string()))?;
        self.to_record(image_id_from_annotation_path(path), annotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(content: &str) -> Result<SourceRecord, SkipReason> {
        let annotation: SuperviselyAnnotation = serde_json::from_str(content).unwrap();
        SuperviselyReader::new().to_record("img_01".to_string(), annotation)
    }

    #[test]
    fn test_parse_rectangle() {
        let record = parse_str(
            r#"{
                "description": "",
                "tags": [],
                "size": {"height": 200, "width": 100},
                "objects": [
                    {"id": 1, "classTitle": "A", "geometryType": "rectangle",
                     "points": {"exterior": [[10, 20], [50, 80]], "interior": []}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(record.image_id, "img_01");
        assert_eq!((record.image_width, record.image_height), (100, 200));
        assert_eq!(record.objects.len(), 1);
        assert_eq!(record.objects[0].class_name, "A");
        assert_eq!(
            record.objects[0].bbox,
            AbsoluteBox {
                x_min: 10.0,
                y_min: 20.0,
                x_max: 50.0,
                y_max: 80.0
            }
        );
    }

    #[test]
    fn test_missing_or_zero_size_skips_record() {
        assert_eq!(
            parse_str(r#"{"objects": []}"#),
            Err(SkipReason::MissingDimensions)
        );
        assert_eq!(
            parse_str(r#"{"size": {"width": 0, "height": 10}, "objects": []}"#),
            Err(SkipReason::MissingDimensions)
        );
    }

    #[test]
    fn test_bad_exterior_drops_only_that_object() {
        let record = parse_str(
            r#"{
                "size": {"height": 10, "width": 10},
                "objects": [
                    {"classTitle": "A", "points": {"exterior": [[1, 1], [2, 2], [3, 3]]}},
                    {"classTitle": "B", "points": {"exterior": [[1, 1], [4, 4]]}},
                    {"classTitle": "C", "points": {"exterior": [[1], [4, 4]]}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(record.objects.len(), 1);
        assert_eq!(record.objects[0].class_name, "B");
        assert_eq!(record.dropped.len(), 2);
    }

    #[test]
    fn test_empty_object_list_is_valid() {
        let record = parse_str(r#"{"size": {"height": 10, "width": 10}, "objects": []}"#).unwrap();
        assert!(record.objects.is_empty());
        assert!(record.dropped.is_empty());
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("broken.jpg.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = SuperviselyReader::new().parse(&path);
        assert!(matches!(result, Err(SkipReason::ParseError(_))));
    }
}
