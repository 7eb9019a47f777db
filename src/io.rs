use glob::{glob, Pattern};
use log::warn;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::classes::ClassMapping;
use crate::conversion::to_label_file_contents;
use crate::error::{ConvertError, SkipReason};
use crate::types::{NormalizedBox, OutputDirs, OutputRecord, Subset, IMG_EXTENSIONS};
use crate::utils::{contains_files, recreate_directory};

/// Set up the `images/{train,val}` and `labels/{train,val}` tree under `dest`.
///
/// With `clean` the whole destination is deleted first, including anything a
/// previous run left there. Without it a destination that already holds files
/// is refused.
pub fn setup_output_directories(dest: &Path, clean: bool) -> Result<OutputDirs, ConvertError> {
    if clean {
        recreate_directory(dest).map_err(|e| ConvertError::io(dest, e))?;
    } else if contains_files(dest).map_err(|e| ConvertError::io(dest, e))? {
        return Err(ConvertError::DestinationNotEmpty {
            path: dest.to_path_buf(),
        });
    }

    let dirs = OutputDirs {
        root: dest.to_path_buf(),
        train_labels_dir: dest.join("labels/train"),
        val_labels_dir: dest.join("labels/val"),
        train_images_dir: dest.join("images/train"),
        val_images_dir: dest.join("images/val"),
    };
    for dir in [
        &dirs.train_labels_dir,
        &dirs.val_labels_dir,
        &dirs.train_images_dir,
        &dirs.val_images_dir,
    ] {
        fs::create_dir_all(dir).map_err(|e| ConvertError::io(dir, e))?;
    }

    Ok(dirs)
}

fn glob_error(path: &Path, e: impl std::error::Error + Send + Sync + 'static) -> ConvertError {
    ConvertError::io(
        path,
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
    )
}

/// List `<dir>/*.<extension>`, sorted by path.
pub fn collect_annotation_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, ConvertError> {
    if !dir.is_dir() {
        return Err(ConvertError::io(
            dir,
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "annotation directory does not exist",
            ),
        ));
    }

    let pattern = format!(
        "{}/*.{}",
        Pattern::escape(&dir.to_string_lossy()),
        extension
    );
    let mut files = Vec::new();
    for entry in glob(&pattern).map_err(|e| glob_error(dir, e))? {
        let path = entry.map_err(|e| ConvertError::io(dir, e.into_error()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Find the image belonging to `image_id` in `image_dir`.
///
/// Tries the known extensions in order, then a file named exactly `image_id`,
/// then any `image_id.*`.
pub fn find_image_file(image_dir: &Path, image_id: &str) -> Option<PathBuf> {
    for ext in IMG_EXTENSIONS {
        let candidate = image_dir.join(format!("{}.{}", image_id, ext));
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    let exact = image_dir.join(image_id);
    if exact.is_file() {
        return Some(exact);
    }

    let pattern = format!(
        "{}/{}.*",
        Pattern::escape(&image_dir.to_string_lossy()),
        Pattern::escape(image_id)
    );
    glob(&pattern)
        .ok()?
        .filter_map(|entry| entry.ok())
        .find(|path| path.is_file())
}

/// Name of the label file written for `image_id`.
pub fn label_file_name(image_id: &str) -> String {
    format!("{}.txt", sanitize_filename::sanitize(image_id))
}

/// Outcome of materializing one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Materialized {
    Written(OutputRecord),
    Skipped(SkipReason),
}

/// Copies images and writes label files into the output tree.
///
/// Output names are tracked for the whole run, so a record whose label or
/// image name was already written is skipped instead of overwriting it.
pub struct Materializer<'a> {
    image_dir: &'a Path,
    output_dirs: &'a OutputDirs,
    used_labels: HashSet<String>,
    used_images: HashSet<String>,
}

impl<'a> Materializer<'a> {
    pub fn new(image_dir: &'a Path, output_dirs: &'a OutputDirs) -> Self {
        Materializer {
            image_dir,
            output_dirs,
            used_labels: HashSet::new(),
            used_images: HashSet::new(),
        }
    }

    /// Copy the image of a record into `subset` and write its label file.
    ///
    /// Nothing is written when the record is skipped.
    pub fn materialize(
        &mut self,
        image_id: &str,
        boxes: &[NormalizedBox],
        subset: Subset,
    ) -> Result<Materialized, ConvertError> {
        let Some(source_image) = find_image_file(self.image_dir, image_id) else {
            warn!(
                "Skipping {}: {} (searched {})",
                image_id,
                SkipReason::ImageNotFound,
                self.image_dir.display()
            );
            return Ok(Materialized::Skipped(SkipReason::ImageNotFound));
        };

        let file_name = source_image
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| image_id.to_string());
        let image_name = sanitize_filename::sanitize(&file_name);
        let label_name = label_file_name(image_id);
        if self.used_labels.contains(&label_name) || self.used_images.contains(&image_name) {
            warn!(
                "Skipping {}: output name {} or {} is already taken",
                image_id, label_name, image_name
            );
            return Ok(Materialized::Skipped(SkipReason::DuplicateImageId));
        }

        let image_path = self.output_dirs.images_dir(subset).join(&image_name);
        fs::copy(&source_image, &image_path).map_err(|e| ConvertError::io(&source_image, e))?;

        let label_path = self.output_dirs.labels_dir(subset).join(&label_name);
        fs::write(&label_path, to_label_file_contents(boxes))
            .map_err(|e| ConvertError::io(&label_path, e))?;

        self.used_labels.insert(label_name);
        self.used_images.insert(image_name);

        Ok(Materialized::Written(OutputRecord {
            image_path,
            label_path,
            boxes: boxes.to_vec(),
        }))
    }
}

/// Create the dataset.yaml file the detection library trains from
pub fn create_dataset_yaml(
    output_dirs: &OutputDirs,
    classes: &ClassMapping,
) -> Result<PathBuf, ConvertError> {
    let dataset_yaml_path = output_dirs.root.join("dataset.yaml");
    let absolute_path =
        fs::canonicalize(&output_dirs.root).map_err(|e| ConvertError::io(&output_dirs.root, e))?;

    let mut yaml_content = format!(
        "path: {}\ntrain: images/train\nval: images/val\n",
        absolute_path.to_string_lossy()
    );
    yaml_content.push_str("\nnames:\n");
    for (id, name) in classes.names() {
        yaml_content.push_str(&format!("    {}: {}\n", id, name));
    }

    let mut dataset_yaml = BufWriter::new(
        File::create(&dataset_yaml_path).map_err(|e| ConvertError::io(&dataset_yaml_path, e))?,
    );
    dataset_yaml
        .write_all(yaml_content.as_bytes())
        .and_then(|_| dataset_yaml.flush())
        .map_err(|e| ConvertError::io(&dataset_yaml_path, e))?;

    Ok(dataset_yaml_path)
}
