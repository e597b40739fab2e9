//! Per-pair import driver
//!
//! Each image/annotation pair is handled on its own: the image is looked up,
//! its mapping computed, the annotation file converted, and every shape that
//! is not already on the image registered. Nothing is shared between pairs.

use crate::companion::FilePair;
use crate::convert::{convert, Conversion, ImportStats};
use crate::coordinates::{compute_mapping, CoordinateMapping};
use crate::duplicate::is_duplicate;
use crate::error::{ImportError, ImportResult};
use roi_model::{ImageId, RoiRecord};
use roi_store::{ImageRepository, RepositoryError};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Map and check duplicates without writing anything
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairReport {
    pub image: ImageId,
    pub mapping: CoordinateMapping,
    pub stats: ImportStats,
}

#[derive(Debug)]
pub struct PairOutcome {
    pub pair: FilePair,
    pub result: ImportResult<PairReport>,
}

/// Results of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<PairOutcome>,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.result.is_err()).count()
    }

    pub fn imported(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
            .map(|report| report.stats.imported)
            .sum()
    }
}

pub fn resolve_image<R>(repo: &R, image_name: &str) -> ImportResult<ImageId>
where
    R: ImageRepository + ?Sized,
{
    repo.find_image(image_name)?.ok_or_else(|| ImportError::UnresolvedImage(image_name.to_owned()))
}

/// Mapping for a repository image from its pixel and scanner metadata.
pub fn mapping_for<R>(repo: &R, image: ImageId) -> ImportResult<CoordinateMapping>
where
    R: ImageRepository + ?Sized,
{
    let metadata = repo.image_metadata(image)?;
    let scanner = repo.scanner_metadata(image).map_err(|err| match err {
        RepositoryError::Metadata(source) => ImportError::MissingMetadata { image, source },
        other => ImportError::Repository(other),
    })?;

    compute_mapping(&metadata, &scanner)
}

/// Resolves the image and converts the annotation file without writing.
pub fn preview<R>(
    repo: &R,
    image_name: &str,
    annotation_path: &Path,
) -> ImportResult<(ImageId, CoordinateMapping, Conversion)>
where
    R: ImageRepository + ?Sized,
{
    let image = resolve_image(repo, image_name)?;
    let mapping = mapping_for(repo, image)?;
    let conversion = convert(annotation_path, &mapping)?;

    Ok((image, mapping, conversion))
}

/// Imports one annotation file onto the image registered as `image_name`.
///
/// Shapes already on the image are skipped. A write failure stops the pair;
/// shapes written before it stay registered and are recognised as
/// duplicates on the next run.
pub fn process<R>(
    repo: &mut R,
    image_name: &str,
    annotation_path: &Path,
    options: ImportOptions,
) -> ImportResult<PairReport>
where
    R: ImageRepository + ?Sized,
{
    let (image, mapping, Conversion { rois, mut stats }) =
        preview(repo, image_name, annotation_path)?;
    log::debug!("image {image_name} is {image}, mapping {mapping:?}");

    let mut existing = repo.list_shapes(image)?;

    for RoiRecord { shape, description } in rois {
        if is_duplicate(&shape, &existing) {
            stats.duplicates += 1;
            log::debug!("{} already on image {image}", shape.geometry.kind());
            continue;
        }

        if !options.dry_run {
            repo.persist_shape(image, &shape, &description)?;
        }
        stats.imported += 1;
        existing.push(shape);
    }

    log::info!(
        "{}: {} imported, {} duplicates, {} skipped",
        annotation_path.display(),
        stats.imported,
        stats.duplicates,
        stats.skipped
    );

    Ok(PairReport { image, mapping, stats })
}

/// Checks that both files exist, then imports the pair.
pub fn process_pair<R>(
    repo: &mut R,
    pair: &FilePair,
    options: ImportOptions,
) -> ImportResult<PairReport>
where
    R: ImageRepository + ?Sized,
{
    pair.ensure_exists()?;
    process(repo, &pair.image_name(), &pair.annotations, options)
}

/// Imports pairs one after another; a failing pair does not stop the batch.
pub fn run_batch<R>(repo: &mut R, pairs: Vec<FilePair>, options: ImportOptions) -> BatchReport
where
    R: ImageRepository + ?Sized,
{
    let mut report = BatchReport::default();

    for pair in pairs {
        let result = process_pair(repo, &pair, options);
        if let Err(err) = &result {
            match err {
                ImportError::MissingFile(_) => log::warn!("skipping pair: {err}"),
                _ => log::error!("{}: {err}", pair.annotations.display()),
            }
        }
        report.outcomes.push(PairOutcome { pair, result });
    }

    report
}
