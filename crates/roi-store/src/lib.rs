//! Image repository access
//!
//! The importer talks to its image backend only through [`ImageRepository`].
//! [`LocalRepository`] keeps the catalog and registered ROIs as JSON files in
//! a directory; [`MemoryRepository`] holds everything in process.

mod local;
mod memory;

pub use local::LocalRepository;
pub use memory::MemoryRepository;

use roi_model::{ImageId, ImageMetadata, MetadataError, ScannerMetadata, Shape};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("no repository catalog at {0}")]
    MissingCatalog(PathBuf),
    #[error("unsupported repository schema version {0}")]
    UnsupportedVersion(u32),
    #[error("unknown image {0}")]
    UnknownImage(ImageId),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error("repository rejected write: {0}")]
    Rejected(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub trait ImageRepository {
    /// Looks an image up by file name.
    ///
    /// Containers are searched in order; the first one holding a match
    /// answers, with its numerically lowest matching id.
    fn find_image(&self, name: &str) -> Result<Option<ImageId>, RepositoryError>;

    fn image_metadata(&self, image: ImageId) -> Result<ImageMetadata, RepositoryError>;

    /// Free-form key/value metadata embedded by the scanner.
    fn original_metadata(&self, image: ImageId) -> Result<Vec<(String, String)>, RepositoryError>;

    fn list_shapes(&self, image: ImageId) -> Result<Vec<Shape>, RepositoryError>;

    fn persist_shape(
        &mut self,
        image: ImageId,
        shape: &Shape,
        description: &str,
    ) -> Result<(), RepositoryError>;

    fn scanner_metadata(&self, image: ImageId) -> Result<ScannerMetadata, RepositoryError> {
        let pairs = self.original_metadata(image)?;
        Ok(ScannerMetadata::from_pairs(&pairs)?)
    }
}

/// A container of images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub images: Vec<ImageEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub id: ImageId,
    pub metadata: ImageMetadata,
    #[serde(default)]
    pub original_metadata: Vec<(String, String)>,
}

/// Datasets and their images, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub datasets: Vec<Dataset>,
}

impl Catalog {
    pub fn find_image(&self, name: &str) -> Option<ImageId> {
        self.datasets.iter().find_map(|dataset| {
            dataset
                .images
                .iter()
                .filter(|image| image.metadata.name == name)
                .map(|image| image.id)
                .min()
        })
    }

    pub fn image(&self, id: ImageId) -> Option<&ImageEntry> {
        self.datasets.iter().flat_map(|dataset| dataset.images.iter()).find(|image| image.id == id)
    }

    fn entry(&self, id: ImageId) -> Result<&ImageEntry, RepositoryError> {
        self.image(id).ok_or(RepositoryError::UnknownImage(id))
    }
}
