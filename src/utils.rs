use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
            label
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Delete `path` if it exists, then create it again empty.
pub fn recreate_directory(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        log::warn!(
            "Directory {:?} already exists. Deleting and recreating it.",
            path
        );
        fs::remove_dir_all(path)?;
    }
    fs::create_dir_all(path)
}

/// True when `path` is a directory containing at least one regular file,
/// at any depth.
pub fn contains_files(path: &Path) -> std::io::Result<bool> {
    if !path.is_dir() {
        return Ok(false);
    }
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            if contains_files(&entry.path())? {
                return Ok(true);
            }
        } else {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        assert!(!contains_files(&root.join("missing")).unwrap());

        fs::create_dir_all(root.join("images/train")).unwrap();
        assert!(!contains_files(root).unwrap());

        fs::write(root.join("images/train/a.jpg"), b"x").unwrap();
        assert!(contains_files(root).unwrap());
    }

    #[test]
    fn test_recreate_directory_removes_contents() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("out");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("nested/old.txt"), b"old").unwrap();

        recreate_directory(&dir).unwrap();

        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }
}
