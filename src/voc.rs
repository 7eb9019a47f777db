//! Reader for Pascal VOC style XML annotations (NEU-DET).

use log::warn;
use roxmltree::{Document, Node};
use std::fs;
use std::path::Path;

use crate::error::{ObjectError, SkipReason};
use crate::reader::{image_id_from_file_name, AnnotationReader};
use crate::types::{AbsoluteBox, SourceObject, SourceRecord};

#[derive(Debug, Default, Clone, Copy)]
pub struct VocReader;

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

impl VocReader {
    pub fn new() -> Self {
        Self
    }

    /// Parse the text of one VOC annotation document.
    pub fn parse_str(&self, content: &str) -> Result<SourceRecord, SkipReason> {
        let doc = Document::parse(content).map_err(|e| SkipReason::ParseError(e.to_string()))?;
        let root = doc.root_element();

        let filename = child_text(root, "filename")
            .ok_or_else(|| SkipReason::ParseError("missing <filename>".to_string()))?;
        let image_id = image_id_from_file_name(filename);

        let size = child(root, "size").ok_or(SkipReason::MissingDimensions)?;
        let image_width = parse_dimension(size, "width")?;
        let image_height = parse_dimension(size, "height")?;

        let mut objects = Vec::new();
        let mut dropped = Vec::new();
        for object_node in root.children().filter(|n| n.has_tag_name("object")) {
            match parse_object(object_node) {
                Ok(object) => objects.push(object),
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

fn parse_dimension(size: Node, name: &str) -> Result<u32, SkipReason> {
    let text = child_text(size, name).ok_or(SkipReason::MissingDimensions)?;
    match text.parse::<u32>() {
        Ok(0) => Err(SkipReason::MissingDimensions),
        Ok(value) => Ok(value),
        Err(_) => Err(SkipReason::ParseError(format!(
            "invalid <{}> value `{}`",
            name, text
        ))),
    }
}

fn parse_object(object: Node) -> Result<SourceObject, ObjectError> {
    // NEU-DET mixes the case of class names
    let class_name = child_text(object, "name")
        .ok_or_else(|| ObjectError::malformed("object has no <name>"))?
        .to_lowercase();
    let bndbox = child(object, "bndbox")
        .ok_or_else(|| ObjectError::malformed(format!("`{}` has no <bndbox>", class_name)))?;

    let coordinate = |name: &str| {
        child_text(bndbox, name)
            .and_then(|text| text.parse::<f64>().ok())
            .ok_or_else(|| {
                ObjectError::malformed(format!("`{}` has a missing or invalid <{}>", class_name, name))
            })
    };
    let x_min = coordinate("xmin")?;
    let y_min = coordinate("ymin")?;
    let x_max = coordinate("xmax")?;
    let y_max = coordinate("ymax")?;
    let bbox = AbsoluteBox::from_corners((x_min, y_min), (x_max, y_max))?;

    Ok(SourceObject { class_name, bbox })
}

impl AnnotationReader for VocReader {
    fn extension(&self) -> &'static str {
        "xml"
    }

    fn parse(&self, path: &Path) -> Result<SourceRecord, SkipReason> {
        let content = fs::read_to_string(path).map_err(|e| SkipReason::ParseError(e.to_string()))?;
        self.parse_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<annotation>
    <folder>cr</folder>
    <filename>crazing_1.jpg</filename>
    <source><database>NEU-DET</database></source>
    <size>
        <width>200</width>
        <height>200</height>
        <depth>1</depth>
    </size>
    <segmented>0</segmented>
    <object>
        <name>Crazing</name>
        <pose>Unspecified</pose>
        <truncated>0</truncated>
        <difficult>0</difficult>
        <bndbox>
            <xmin>2</xmin>
            <ymin>2</ymin>
            <xmax>193</xmax>
            <ymax>194</ymax>
        </bndbox>
    </object>
    <object>
        <name>patches</name>
        <bndbox>
            <xmin>10</xmin>
            <ymin>oops</ymin>
            <xmax>20</xmax>
            <ymax>30</ymax>
        </bndbox>
    </object>
</annotation>"#;

    #[test]
    fn test_parse_voc_annotation() {
        let record = VocReader::new().parse_str(SAMPLE).unwrap();

        assert_eq!(record.image_id, "crazing_1");
        assert_eq!((record.image_width, record.image_height), (200, 200));
        assert_eq!(record.objects.len(), 1);
        assert_eq!(record.objects[0].class_name, "crazing");
        assert_eq!(
            record.objects[0].bbox,
            AbsoluteBox {
                x_min: 2.0,
                y_min: 2.0,
                x_max: 193.0,
                y_max: 194.0
            }
        );
        assert_eq!(record.dropped.len(), 1);
    }

    #[test]
    fn test_filename_without_extension() {
        let xml = "<annotation><filename>inclusion_7</filename>\
                   <size><width>200</width><height>200</height></size></annotation>";
        let record = VocReader::new().parse_str(xml).unwrap();
        assert_eq!(record.image_id, "inclusion_7");
        assert!(record.objects.is_empty());
    }

    #[test]
    fn test_missing_size_skips_record() {
        let xml = "<annotation><filename>a.jpg</filename></annotation>";
        assert_eq!(
            VocReader::new().parse_str(xml),
            Err(SkipReason::MissingDimensions)
        );

        let xml = "<annotation><filename>a.jpg</filename>\
                   <size><width>0</width><height>200</height></size></annotation>";
        assert_eq!(
            VocReader::new().parse_str(xml),
            Err(SkipReason::MissingDimensions)
        );
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            VocReader::new().parse_str("<annotation><filename>"),
            Err(SkipReason::ParseError(_))
        ));
        assert!(matches!(
            VocReader::new().parse_str(
                "<annotation><size><width>1</width><height>1</height></size></annotation>"
            ),
            Err(SkipReason::ParseError(_))
        ));
        assert!(matches!(
            VocReader::new().parse_str(
                "<annotation><filename>a.jpg</filename>\
                 <size><width>wide</width><height>1</height></size></annotation>"
            ),
            Err(SkipReason::ParseError(_))
        ));
    }
}
