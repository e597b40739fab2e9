//! NDPA annotation import
//!
//! Converts slide-viewer annotations into image-space ROIs and registers the
//! ones an image does not already carry.

pub mod companion;
pub mod convert;
pub mod coordinates;
pub mod duplicate;
pub mod error;
pub mod mapper;
pub mod pipeline;

pub use companion::{parse_file_list, FilePair};
pub use convert::{convert, convert_records, Conversion, ImportStats};
pub use coordinates::{compute_mapping, resolve, CoordinateMapping};
pub use duplicate::is_duplicate;
pub use error::{ImportError, ImportResult};
pub use mapper::{map_record, ShapeRule};
pub use pipeline::{
    mapping_for, preview, process, process_pair, resolve_image, run_batch, BatchReport,
    ImportOptions, PairOutcome, PairReport,
};
