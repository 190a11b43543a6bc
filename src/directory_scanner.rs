// SPDX-License-Identifier: MPL-2.0
//! Directory scanner module for finding and sorting image files.
//!
//! This module scans a directory for supported image formats and sorts them
//! by file name, the order the batch tools pair and process files in.

use crate::error::Result;
use crate::media;
use std::path::{Path, PathBuf};

/// Image files of one directory, sorted by file name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageList {
    images: Vec<PathBuf>,
}

impl ImageList {
    /// Scans a directory for supported image files and sorts them.
    ///
    /// Returns an error if the directory cannot be read.
    pub fn scan_directory(directory: &Path) -> Result<Self> {
        let mut images = Vec::new();

        for entry in std::fs::read_dir(directory)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_file() && media::is_supported_image(&path) {
                images.push(path);
            }
        }

        images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        Ok(Self { images })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.images.iter().map(PathBuf::as_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn scan_filters_and_sorts_by_name() {
        let dir = tempdir().expect("temp dir");
        for name in ["c.png", "a.jpg", "notes.txt", "b.PNG"] {
            fs::write(dir.path().join(name), b"x").expect("write");
        }
        fs::create_dir(dir.path().join("d.png")).expect("mkdir");

        let list = ImageList::scan_directory(dir.path()).expect("scan");
        let names: Vec<_> = list
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.PNG", "c.png"]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn empty_directory_gives_empty_list() {
        let dir = tempdir().expect("temp dir");
        let list = ImageList::scan_directory(dir.path()).expect("scan");
        assert!(list.is_empty());
        assert_eq!(list.iter().count(), 0);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempdir().expect("temp dir");
        assert!(ImageList::scan_directory(&dir.path().join("nope")).is_err());
    }
}
