use log::warn;

use crate::classes::ClassMapping;
use crate::error::{ConvertError, ObjectError};
use crate::types::{AbsoluteBox, NormalizedBox, SourceRecord};

/// Convert an absolute pixel box to the normalized YOLO center/size form.
pub fn normalize_box(
    class_id: u32,
    bbox: &AbsoluteBox,
    image_width: u32,
    image_height: u32,
) -> Result<NormalizedBox, ConvertError> {
    if image_width == 0 || image_height == 0 {
        return Err(ConvertError::InvalidImageSize {
            width: image_width,
            height: image_height,
        });
    }

    let width = image_width as f64;
    let height = image_height as f64;
    if bbox.x_min < 0.0 || bbox.y_min < 0.0 || bbox.x_max > width || bbox.y_max > height {
        return Err(ConvertError::BoxOutOfBounds {
            x_min: bbox.x_min,
            y_min: bbox.y_min,
            x_max: bbox.x_max,
            y_max: bbox.y_max,
            width: image_width,
            height: image_height,
        });
    }

    Ok(NormalizedBox {
        class_id,
        x_center: (bbox.x_min + bbox.x_max) / 2.0 / width,
        y_center: (bbox.y_min + bbox.y_max) / 2.0 / height,
        width: (bbox.x_max - bbox.x_min) / width,
        height: (bbox.y_max - bbox.y_min) / height,
    })
}

/// Resolve and normalize every object of a record, keeping source order.
///
/// Objects that cannot be converted are logged and returned separately; the
/// record itself is never rejected here.
pub fn convert_objects(
    record: &SourceRecord,
    classes: &ClassMapping,
) -> (Vec<NormalizedBox>, Vec<ObjectError>) {
    let mut boxes = Vec::with_capacity(record.objects.len());
    let mut dropped = Vec::new();

    for object in &record.objects {
        let Some(class_id) = classes.resolve(&object.class_name) else {
            warn!(
                "Unknown class `{}` in {}, object skipped",
                object.class_name, record.image_id
            );
            dropped.push(ObjectError::UnknownClass {
                name: object.class_name.clone(),
            });
            continue;
        };

        match normalize_box(
            class_id,
            &object.bbox,
            record.image_width,
            record.image_height,
        ) {
            Ok(normalized) => boxes.push(normalized),
            Err(e) => {
                warn!(
                    "Object `{}` in {} skipped: {}",
                    object.class_name, record.image_id, e
                );
                dropped.push(ObjectError::malformed(e.to_string()));
            }
        }
    }

    (boxes, dropped)
}

/// Render boxes as the contents of a YOLO label file.
pub fn to_label_file_contents(boxes: &[NormalizedBox]) -> String {
    let mut yolo_data = String::with_capacity(boxes.len() * 48);
    for normalized in boxes {
        yolo_data.push_str(&normalized.to_label_line());
        yolo_data.push('\n');
    }
    yolo_data
}
