//! Class name to class id mapping.
//!
//! A mapping is built once before conversion starts and only read afterwards.
//! The GC10-DET mapping is offset past the NEU-DET ids so both datasets can be
//! trained together in one id space.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::ConvertError;

/// NEU-DET classes, in id order.
pub const NEU_DET_CLASSES: &[&str] = &[
    "rolled-in_scale",
    "patches",
    "crazing",
    "pitted_surface",
    "inclusion",
    "scratches",
];

/// Id of the first GC10-DET class in the merged id space.
pub const GC10_CLASS_OFFSET: u32 = NEU_DET_CLASSES.len() as u32;

#[derive(Debug, Deserialize)]
struct MetaFile {
    classes: Vec<MetaClass>,
}

#[derive(Debug, Deserialize)]
struct MetaClass {
    title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMapping {
    ids: HashMap<String, u32>,
    // (id, name) sorted by id
    names: Vec<(u32, String)>,
}

impl ClassMapping {
    /// The fixed six-class NEU-DET table.
    pub fn neu_det() -> Self {
        Self::from_titles(NEU_DET_CLASSES.iter().copied(), 0)
    }

    /// Assign `offset + position` to each title.
    ///
    /// A repeated title keeps the id of its first occurrence. Later repeats
    /// are ignored but still use up their position, so every other title keeps
    /// the id matching its place in the list and the ids can have gaps.
    pub fn from_titles<I, S>(titles: I, offset: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids = HashMap::new();
        let mut names = Vec::new();
        for (position, title) in titles.into_iter().enumerate() {
            let title = title.into();
            let id = offset + position as u32;
            if ids.contains_key(&title) {
                log::warn!("Duplicate class title `{}` ignored", title);
                continue;
            }
            ids.insert(title.clone(), id);
            names.push((id, title));
        }
        ClassMapping { ids, names }
    }

    /// Load the ordered `classes[].title` list from a Supervisely `meta.json`.
    pub fn from_meta_file(path: &Path, offset: u32) -> Result<Self, ConvertError> {
        let file = File::open(path).map_err(|e| ConvertError::MetadataLoadFailure {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        let meta: MetaFile = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            ConvertError::MetadataLoadFailure {
                path: path.to_path_buf(),
                source: Box::new(e),
            }
        })?;
        Ok(Self::from_titles(
            meta.classes.into_iter().map(|class| class.title),
            offset,
        ))
    }

    pub fn resolve(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = (u32, &str)> {
        self.names.iter().map(|(id, name)| (*id, name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_neu_det_table() {
        let mapping = ClassMapping::neu_det();
        assert_eq!(mapping.len(), 6);
        assert_eq!(mapping.resolve("rolled-in_scale"), Some(0));
        assert_eq!(mapping.resolve("scratches"), Some(5));
        assert_eq!(mapping.resolve("Scratches"), None);
    }

    #[test]
    fn test_from_titles_with_offset() {
        let mapping = ClassMapping::from_titles(["punching", "weld_line", "punching"], 6);
        assert_eq!(mapping.resolve("punching"), Some(6));
        assert_eq!(mapping.resolve("weld_line"), Some(7));
        let names: Vec<_> = mapping.names().collect();
        assert_eq!(names, vec![(6, "punching"), (7, "weld_line")]);
    }

    #[test]
    fn test_repeated_title_keeps_first_id() {
        let mapping = ClassMapping::from_titles(["a", "a", "b"], 6);
        assert_eq!(mapping.resolve("a"), Some(6));
        assert_eq!(mapping.resolve("b"), Some(8));
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn test_from_meta_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let meta_path = temp_dir.path().join("meta.json");
        let mut file = File::create(&meta_path).unwrap();
        write!(
            file,
            r#"{{"classes": [{{"title": "A", "shape": "rectangle"}}, {{"title": "B"}}], "tags": []}}"#
        )
        .unwrap();

        let mapping = ClassMapping::from_meta_file(&meta_path, GC10_CLASS_OFFSET).unwrap();
        assert_eq!(mapping.resolve("A"), Some(6));
        assert_eq!(mapping.resolve("B"), Some(7));
    }

    #[test]
    fn test_missing_meta_file_is_fatal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = ClassMapping::from_meta_file(&temp_dir.path().join("meta.json"), 6);
        assert!(matches!(
            result,
            Err(ConvertError::MetadataLoadFailure { .. })
        ));
    }

    #[test]
    fn test_corrupt_meta_file_is_fatal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let meta_path = temp_dir.path().join("meta.json");
        std::fs::write(&meta_path, "{\"classes\": [").unwrap();
        let result = ClassMapping::from_meta_file(&meta_path, 6);
        assert!(matches!(
            result,
            Err(ConvertError::MetadataLoadFailure { .. })
        ));
    }
}
