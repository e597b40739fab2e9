use crate::{Catalog, ImageRepository, RepositoryError};
use directories::ProjectDirs;
use roi_model::{ImageId, ImageMetadata, RoiRecord, Shape};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SCHEMA_VERSION: u32 = 1;
const CATALOG_FILE: &str = "repository.json";
const ROI_DIR: &str = "rois";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogEnvelope {
    version: u32,
    #[serde(flatten)]
    catalog: Catalog,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RoiEnvelope {
    version: u32,
    image: ImageId,
    rois: Vec<RoiRecord>,
}

/// Repository stored as JSON files under a root directory.
///
/// `repository.json` holds the catalog; each image's ROIs live in
/// `rois/<image-id>.json` and are rewritten on every persisted shape.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
    catalog: Catalog,
}

impl LocalRepository {
    pub fn default_root() -> Result<PathBuf, RepositoryError> {
        let dirs = ProjectDirs::from("org", "ndpa-import", "ndpa-import")
            .ok_or(RepositoryError::NoDataDirectory)?;

        Ok(dirs.data_local_dir().to_path_buf())
    }

    pub fn open(root: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let root = root.into();
        let path = root.join(CATALOG_FILE);
        if !path.exists() {
            return Err(RepositoryError::MissingCatalog(path));
        }

        let bytes = fs::read(&path)?;
        let envelope: CatalogEnvelope = serde_json::from_slice(&bytes)?;
        if envelope.version != SCHEMA_VERSION {
            return Err(RepositoryError::UnsupportedVersion(envelope.version));
        }

        log::debug!(
            "opened repository {} with {} datasets",
            root.display(),
            envelope.catalog.datasets.len()
        );

        Ok(Self { root, catalog: envelope.catalog })
    }

    /// Writes a fresh catalog under `root` and opens it.
    pub fn create(root: impl Into<PathBuf>, catalog: Catalog) -> Result<Self, RepositoryError> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        let envelope = CatalogEnvelope { version: SCHEMA_VERSION, catalog };
        fs::write(root.join(CATALOG_FILE), serde_json::to_vec_pretty(&envelope)?)?;

        Self::open(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// All ROIs registered against an image, with descriptions.
    pub fn rois(&self, image: ImageId) -> Result<Vec<RoiRecord>, RepositoryError> {
        self.catalog.entry(image)?;

        let path = self.roi_path(image);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let bytes = fs::read(path)?;
        let envelope: RoiEnvelope = serde_json::from_slice(&bytes)?;
        if envelope.version != SCHEMA_VERSION {
            return Err(RepositoryError::UnsupportedVersion(envelope.version));
        }

        Ok(envelope.rois)
    }

    /// Ends the session.
    pub fn close(self) {
        log::debug!("closed repository {}", self.root.display());
    }

    fn roi_path(&self, image: ImageId) -> PathBuf {
        self.root.join(ROI_DIR).join(format!("{image}.json"))
    }
}

impl ImageRepository for LocalRepository {
    fn find_image(&self, name: &str) -> Result<Option<ImageId>, RepositoryError> {
        Ok(self.catalog.find_image(name))
    }

    fn image_metadata(&self, image: ImageId) -> Result<ImageMetadata, RepositoryError> {
        Ok(self.catalog.entry(image)?.metadata.clone())
    }

    fn original_metadata(&self, image: ImageId) -> Result<Vec<(String, String)>, RepositoryError> {
        Ok(self.catalog.entry(image)?.original_metadata.clone())
    }

    fn list_shapes(&self, image: ImageId) -> Result<Vec<Shape>, RepositoryError> {
        Ok(self.rois(image)?.into_iter().map(|roi| roi.shape).collect())
    }

    fn persist_shape(
        &mut self,
        image: ImageId,
        shape: &Shape,
        description: &str,
    ) -> Result<(), RepositoryError> {
        let mut rois = self.rois(image)?;
        rois.push(RoiRecord { shape: shape.clone(), description: description.to_owned() });

        fs::create_dir_all(self.root.join(ROI_DIR))?;
        let envelope = RoiEnvelope { version: SCHEMA_VERSION, image, rois };
        fs::write(self.roi_path(image), serde_json::to_vec_pretty(&envelope)?)?;

        Ok(())
    }
}
