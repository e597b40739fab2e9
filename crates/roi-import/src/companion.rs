//! Image/annotation file pairing
//!
//! The viewer saves annotations for `slide.ndpi` as `slide.ndpi.ndpa`, so
//! either name identifies the pair.

use crate::error::{ImportError, ImportResult};
use std::path::{Path, PathBuf};

pub const ANNOTATION_EXTENSION: &str = ".ndpa";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub image: PathBuf,
    pub annotations: PathBuf,
}

impl FilePair {
    /// Pairs a path naming either the image or its annotation file.
    ///
    /// Surrounding whitespace, including a trailing line terminator, is
    /// ignored.
    pub fn from_entry(entry: &str) -> Self {
        let entry = entry.trim();

        match entry.strip_suffix(ANNOTATION_EXTENSION) {
            Some(image) if !image.is_empty() => {
                Self { image: PathBuf::from(image), annotations: PathBuf::from(entry) }
            }
            _ => Self {
                image: PathBuf::from(entry),
                annotations: PathBuf::from(format!("{entry}{ANNOTATION_EXTENSION}")),
            },
        }
    }

    /// File name the image is registered under in the repository.
    pub fn image_name(&self) -> String {
        self.image
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.image.display().to_string())
    }

    pub fn ensure_exists(&self) -> ImportResult<()> {
        ensure_file(&self.image)?;
        ensure_file(&self.annotations)
    }
}

/// Pairs for every non-blank line of a file list, in order.
pub fn parse_file_list(text: &str) -> Vec<FilePair> {
    text.lines().filter(|line| !line.trim().is_empty()).map(FilePair::from_entry).collect()
}

fn ensure_file(path: &Path) -> ImportResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ImportError::MissingFile(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn annotation_path_names_its_image() {
        let pair = FilePair::from_entry("/data/slides/case-1.ndpi.ndpa\n");

        assert_eq!(pair.image, PathBuf::from("/data/slides/case-1.ndpi"));
        assert_eq!(pair.annotations, PathBuf::from("/data/slides/case-1.ndpi.ndpa"));
        assert_eq!(pair.image_name(), "case-1.ndpi");
    }

    #[test]
    fn image_path_gets_annotation_suffix() {
        let pair = FilePair::from_entry("case-1.ndpi");

        assert_eq!(pair.image, PathBuf::from("case-1.ndpi"));
        assert_eq!(pair.annotations, PathBuf::from("case-1.ndpi.ndpa"));
    }

    #[test]
    fn file_list_skips_blank_lines() {
        let pairs = parse_file_list("a.ndpi\n\n  \nb.ndpi.ndpa\r\n");

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].annotations, PathBuf::from("a.ndpi.ndpa"));
        assert_eq!(pairs[1].image, PathBuf::from("b.ndpi"));
    }

    #[test]
    fn missing_companion_is_reported() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let image = temp.path().join("slide.ndpi");
        fs::write(&image, b"").expect("image should be written");

        let pair = FilePair::from_entry(&image.display().to_string());
        let err = pair.ensure_exists().expect_err("annotation file is missing");

        assert!(matches!(err, ImportError::MissingFile(path) if path == pair.annotations));

        fs::write(&pair.annotations, b"").expect("annotations should be written");
        pair.ensure_exists().expect("both files exist");
    }
}
