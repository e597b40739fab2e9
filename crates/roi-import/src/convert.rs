//! Annotation file conversion

use crate::coordinates::CoordinateMapping;
use crate::error::{ImportError, ImportResult};
use crate::mapper::{map_record, ShapeRule};
use ndpa::AnnotationRecord;
use roi_model::RoiRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Statistics about one converted annotation file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    /// Annotations found in the file
    pub total_found: usize,
    /// Shapes registered (or that would be, on a dry run)
    pub imported: usize,
    /// Shapes already present on the image
    pub duplicates: usize,
    /// Annotations that produced no shape
    pub skipped: usize,
    /// Count by `type/displayname`
    pub by_type: BTreeMap<String, usize>,
}

/// Shapes mapped from one file, each with its description
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversion {
    pub rois: Vec<RoiRecord>,
    pub stats: ImportStats,
}

/// Parses an annotation file and maps every record it can.
pub fn convert(path: &Path, mapping: &CoordinateMapping) -> ImportResult<Conversion> {
    let records = ndpa::read_document(path)
        .map_err(|source| ImportError::Parse { path: path.to_path_buf(), source })?;

    Ok(convert_records(&records, mapping))
}

pub fn convert_records(records: &[AnnotationRecord], mapping: &CoordinateMapping) -> Conversion {
    let mut conversion = Conversion::default();

    for record in records {
        let stats = &mut conversion.stats;
        stats.total_found += 1;
        *stats
            .by_type
            .entry(format!("{}/{}", record.annotation_type, record.display_name))
            .or_insert(0) += 1;

        match map_record(record, mapping) {
            Some(shape) => {
                conversion.rois.push(RoiRecord { shape, description: record.details.clone() })
            }
            None => {
                stats.skipped += 1;
                if ShapeRule::for_record(record) == ShapeRule::Unrecognized {
                    log::info!(
                        "skipping unrecognized annotation {}/{} ({:?})",
                        record.annotation_type,
                        record.display_name,
                        record.title.as_deref().unwrap_or("")
                    );
                }
            }
        }
    }

    conversion
}
