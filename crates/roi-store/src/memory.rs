use crate::{Catalog, Dataset, ImageEntry, ImageRepository, RepositoryError};
use roi_model::{ImageId, ImageMetadata, RoiRecord, Shape};
use std::collections::HashMap;

/// In-process repository.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    catalog: Catalog,
    rois: HashMap<ImageId, Vec<RoiRecord>>,
    read_only: bool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_catalog(catalog: Catalog) -> Self {
        Self { catalog, ..Self::default() }
    }

    /// Appends an image to the dataset `dataset_id`, creating the dataset at
    /// the end of the search order if it does not exist yet.
    pub fn add_image(&mut self, dataset_id: u64, image: ImageEntry) {
        match self.catalog.datasets.iter_mut().find(|dataset| dataset.id == dataset_id) {
            Some(dataset) => dataset.images.push(image),
            None => self.catalog.datasets.push(Dataset {
                id: dataset_id,
                name: format!("dataset-{dataset_id}"),
                images: vec![image],
            }),
        }
    }

    /// Makes every subsequent write fail with [`RepositoryError::Rejected`].
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn rois(&self, image: ImageId) -> &[RoiRecord] {
        self.rois.get(&image).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl ImageRepository for MemoryRepository {
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
        self.catalog.entry(image)?;
        Ok(self.rois(image).iter().map(|roi| roi.shape.clone()).collect())
    }

    fn persist_shape(
        &mut self,
        image: ImageId,
        shape: &Shape,
        description: &str,
    ) -> Result<(), RepositoryError> {
        self.catalog.entry(image)?;
        if self.read_only {
            return Err(RepositoryError::Rejected(format!("image {image} is read-only")));
        }

        self.rois
            .entry(image)
            .or_default()
            .push(RoiRecord { shape: shape.clone(), description: description.to_owned() });
        Ok(())
    }
}
