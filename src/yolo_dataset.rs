use indicatif::ProgressBar;
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};

use crate::classes::ClassMapping;
use crate::config::PipelineConfig;
use crate::conversion::convert_objects;
use crate::dataset::split_ids;
use crate::error::{ConvertError, SkipReason};
use crate::io::{
    collect_annotation_files, create_dataset_yaml, label_file_name, setup_output_directories,
    Materialized, Materializer,
};
use crate::reader::AnnotationReader;
use crate::types::{ConversionSummary, NormalizedBox, Subset};
use crate::utils::create_progress_bar;

/// Main dataset processing pipeline.
///
/// Reads every annotation with `reader`, converts the objects through
/// `classes`, splits the valid records and writes the YOLO dataset to
/// `config.dest_dir`. Per-object and per-record problems are logged and
/// counted in the returned summary; only I/O failures on the destination and
/// a missing annotation directory abort the run.
pub fn convert_dataset<R: AnnotationReader + ?Sized>(
    reader: &R,
    classes: &ClassMapping,
    config: &PipelineConfig,
) -> Result<ConversionSummary, ConvertError> {
    let output_dirs = setup_output_directories(&config.dest_dir, config.clean)?;

    let annotation_files = collect_annotation_files(&config.annotation_dir, reader.extension())?;
    info!(
        "Found {} annotation files in {}",
        annotation_files.len(),
        config.annotation_dir.display()
    );

    let mut summary = ConversionSummary {
        total_files: annotation_files.len(),
        ..Default::default()
    };

    // image id -> label boxes, for every record that survived parsing
    let mut converted: HashMap<String, Vec<NormalizedBox>> = HashMap::new();
    let mut label_names: HashSet<String> = HashSet::new();
    for path in &annotation_files {
        let record = match reader.parse(path) {
            Ok(record) => record,
            Err(reason) => {
                warn!("Skipping {}: {}", path.display(), reason);
                summary.record_skip(&reason, None);
                continue;
            }
        };

        // ids that only differ in characters dropped from file names would
        // share one label file
        if !label_names.insert(label_file_name(&record.image_id)) {
            warn!(
                "Skipping {}: image id {} is already used",
                path.display(),
                record.image_id
            );
            summary.record_skip(&SkipReason::DuplicateImageId, None);
            continue;
        }

        for error in &record.dropped {
            summary.record_dropped_object(error);
        }
        let (boxes, dropped) = convert_objects(&record, classes);
        for error in &dropped {
            summary.record_dropped_object(error);
        }
        converted.insert(record.image_id, boxes);
    }

    let mut ids: Vec<String> = converted.keys().cloned().collect();
    ids.sort();
    let split = split_ids(&ids, config.train_ratio, config.seed);
    info!(
        "Split {} records into {} train and {} val",
        split.len(),
        split.train.len(),
        split.val.len()
    );

    let mut materializer = Materializer::new(&config.image_dir, &output_dirs);
    for subset in [Subset::Train, Subset::Val] {
        let subset_ids = split.ids(subset);
        let pb = if config.show_progress {
            create_progress_bar(subset_ids.len() as u64, subset.as_str())
        } else {
            ProgressBar::hidden()
        };

        summary.subset_mut(subset).assigned = subset_ids.len();
        for image_id in subset_ids {
            let boxes = converted.get(image_id).map(Vec::as_slice).unwrap_or(&[]);
            match materializer.materialize(image_id, boxes, subset)? {
                Materialized::Written(output) => {
                    debug!(
                        "{} -> {} ({} objects)",
                        image_id,
                        output.label_path.display(),
                        output.boxes.len()
                    );
                    summary.subset_mut(subset).successful += 1;
                }
                Materialized::Skipped(reason) => summary.record_skip(&reason, Some(subset)),
            }
            pb.inc(1);
        }
        pb.finish_with_message(format!("{} processing complete", subset));
        let stats = summary.subset(subset);
        info!(
            "{} subset: successful={}, skipped={}",
            subset, stats.successful, stats.skipped
        );
    }

    info!("Creating dataset.yaml file...");
    let yaml_path = create_dataset_yaml(&output_dirs, classes)?;
    info!("Wrote {}", yaml_path.display());

    Ok(summary)
}
