use ndpa::NdpaError;
use roi_model::{ImageId, MetadataError};
use roi_store::RepositoryError;
use std::path::PathBuf;

/// Errors that stop the import of one image/annotation pair.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("file does not exist: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: NdpaError,
    },
    #[error("no image named {0:?} in the repository")]
    UnresolvedImage(String),
    #[error("image {image}: {source}")]
    MissingMetadata {
        image: ImageId,
        #[source]
        source: MetadataError,
    },
    #[error("pixel size must be positive, got {x_nm} x {y_nm} nm")]
    InvalidPixelSize { x_nm: f64, y_nm: f64 },
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub type ImportResult<T> = Result<T, ImportError>;
