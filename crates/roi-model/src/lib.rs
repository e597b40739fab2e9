//! ROI data model
//!
//! Shapes are expressed in the pixel space of a slide image. Physical sizes
//! and scanner metadata describe how that pixel space relates to the
//! nanometer coordinates used by the slide scanner.

use serde::{Deserialize, Serialize};

/// Key of the slide center X coordinate in the scanner's original metadata.
pub const SLIDE_CENTER_X_KEY: &str = "Slide center X (nm)";
/// Key of the slide center Y coordinate in the scanner's original metadata.
pub const SLIDE_CENTER_Y_KEY: &str = "Slide center Y (nm)";
pub const IMAGE_WIDTH_KEY: &str = "ImageWidth";
pub const IMAGE_LENGTH_KEY: &str = "ImageLength";

/// Identifier of an image in the repository.
///
/// Ordered so that the lowest identifier can win a name lookup tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ImageId(pub u64);

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pixel-space coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// RGBA color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const TRANSPARENT_WHITE: Rgba = Rgba::new(255, 255, 255, 0);
}

/// Marker drawn at a line end. The repository's shape format only honours
/// an arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineMarker {
    Arrow,
}

/// Stroke and fill applied to a shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    pub stroke_color: Rgba,
    pub fill_color: Rgba,
    pub stroke_width: f64,
}

impl ShapeStyle {
    pub const STROKE_WIDTH: f64 = 1.0;

    /// Outline-only style: the given stroke, transparent fill, fixed width.
    pub fn outline(stroke_color: Rgba) -> Self {
        Self { stroke_color, fill_color: Rgba::TRANSPARENT, stroke_width: Self::STROKE_WIDTH }
    }
}

/// Shape geometry in image pixel coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeGeometry {
    /// Ellipse centered at (x, y)
    Ellipse { x: f64, y: f64, x_radius: f64, y_radius: f64 },

    /// Rectangle anchored at its top-left corner
    Rectangle { x: f64, y: f64, width: f64, height: f64 },

    /// Open path through the points in order
    Polyline { points: Vec<Point> },

    /// Closed path through the points in order
    Polygon { points: Vec<Point> },

    Line { x1: f64, y1: f64, x2: f64, y2: f64, marker_start: Option<LineMarker> },

    Point { x: f64, y: f64 },
}

impl ShapeGeometry {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ellipse { .. } => "ellipse",
            Self::Rectangle { .. } => "rectangle",
            Self::Polyline { .. } => "polyline",
            Self::Polygon { .. } => "polygon",
            Self::Line { .. } => "line",
            Self::Point { .. } => "point",
        }
    }
}

/// A region of interest ready to be registered against an image.
///
/// Equality is exact and field-by-field, including the style and label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub geometry: ShapeGeometry,
    pub style: ShapeStyle,
    pub label: Option<String>,
}

impl Shape {
    pub fn new(geometry: ShapeGeometry, style: ShapeStyle, label: Option<String>) -> Self {
        Self { geometry, style, label }
    }
}

/// A shape paired with its free-text description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiRecord {
    pub shape: Shape,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    Nanometer,
    Micrometer,
    Millimeter,
}

impl LengthUnit {
    fn nanometers_per_unit(self) -> f64 {
        match self {
            Self::Nanometer => 1.0,
            Self::Micrometer => 1_000.0,
            Self::Millimeter => 1_000_000.0,
        }
    }
}

/// A physical length with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalSize {
    pub value: f64,
    pub unit: LengthUnit,
}

impl PhysicalSize {
    pub fn new(value: f64, unit: LengthUnit) -> Self {
        Self { value, unit }
    }

    pub fn nanometers(value: f64) -> Self {
        Self::new(value, LengthUnit::Nanometer)
    }

    pub fn micrometers(value: f64) -> Self {
        Self::new(value, LengthUnit::Micrometer)
    }

    pub fn to_nanometers(self) -> f64 {
        self.value * self.unit.nanometers_per_unit()
    }
}

/// Pixel metadata of an image as reported by the repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub name: String,
    /// Width in pixels
    pub size_x: u32,
    /// Height in pixels
    pub size_y: u32,
    /// Physical width of one pixel
    pub physical_size_x: PhysicalSize,
    /// Physical height of one pixel
    pub physical_size_y: PhysicalSize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    #[error("scanner metadata has no {0:?} entry")]
    Missing(&'static str),
    #[error("scanner metadata entry {key:?} is not a number: {value:?}")]
    NotNumeric { key: &'static str, value: String },
}

/// Values read from the scanner-embedded key/value metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScannerMetadata {
    pub slide_center_x_nm: f64,
    pub slide_center_y_nm: f64,
    /// `ImageWidth` in pixels, when the scanner recorded it
    pub image_width: Option<f64>,
    /// `ImageLength` in pixels, when the scanner recorded it
    pub image_length: Option<f64>,
}

impl ScannerMetadata {
    /// Reads the slide center and, if present, the image dimensions.
    ///
    /// Both slide center keys are required; no default is substituted.
    pub fn from_pairs<K, V>(pairs: &[(K, V)]) -> Result<Self, MetadataError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let slide_center_x_nm =
            lookup(pairs, SLIDE_CENTER_X_KEY)?.ok_or(MetadataError::Missing(SLIDE_CENTER_X_KEY))?;
        let slide_center_y_nm =
            lookup(pairs, SLIDE_CENTER_Y_KEY)?.ok_or(MetadataError::Missing(SLIDE_CENTER_Y_KEY))?;

        Ok(Self {
            slide_center_x_nm,
            slide_center_y_nm,
            image_width: lookup(pairs, IMAGE_WIDTH_KEY)?,
            image_length: lookup(pairs, IMAGE_LENGTH_KEY)?,
        })
    }
}

fn lookup<K, V>(pairs: &[(K, V)], key: &'static str) -> Result<Option<f64>, MetadataError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let Some((_, value)) = pairs.iter().find(|(k, _)| k.as_ref() == key) else {
        return Ok(None);
    };

    let value = value.as_ref().trim();
    value
        .parse::<f64>()
        .map(Some)
        .map_err(|_| MetadataError::NotNumeric { key, value: value.to_owned() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner_pairs() -> Vec<(&'static str, &'static str)> {
        vec![
            ("Objective.Lens.Magnificant", "20"),
            (SLIDE_CENTER_X_KEY, "125000"),
            (SLIDE_CENTER_Y_KEY, " 100000 "),
            (IMAGE_WIDTH_KEY, "1000"),
            (IMAGE_LENGTH_KEY, "800"),
        ]
    }

    #[test]
    fn scanner_metadata_reads_exact_keys() {
        let meta = ScannerMetadata::from_pairs(&scanner_pairs()).expect("metadata should parse");

        assert_eq!(meta.slide_center_x_nm, 125000.0);
        assert_eq!(meta.slide_center_y_nm, 100000.0);
        assert_eq!(meta.image_width, Some(1000.0));
        assert_eq!(meta.image_length, Some(800.0));
    }

    #[test]
    fn missing_slide_center_is_an_error() {
        let pairs: Vec<_> =
            scanner_pairs().into_iter().filter(|(k, _)| *k != SLIDE_CENTER_Y_KEY).collect();

        let err = ScannerMetadata::from_pairs(&pairs).expect_err("should fail without center");
        assert_eq!(err, MetadataError::Missing(SLIDE_CENTER_Y_KEY));
    }

    #[test]
    fn image_dimensions_are_optional() {
        let pairs = vec![(SLIDE_CENTER_X_KEY, "1"), (SLIDE_CENTER_Y_KEY, "2")];
        let meta = ScannerMetadata::from_pairs(&pairs).expect("metadata should parse");

        assert_eq!(meta.image_width, None);
        assert_eq!(meta.image_length, None);
    }

    #[test]
    fn non_numeric_entry_is_rejected() {
        let pairs = vec![(SLIDE_CENTER_X_KEY, "left"), (SLIDE_CENTER_Y_KEY, "2")];
        let err = ScannerMetadata::from_pairs(&pairs).expect_err("should fail");

        assert!(matches!(err, MetadataError::NotNumeric { key: SLIDE_CENTER_X_KEY, .. }));
    }

    #[test]
    fn physical_sizes_normalize_to_nanometers() {
        assert_eq!(PhysicalSize::micrometers(0.25).to_nanometers(), 250.0);
        assert_eq!(PhysicalSize::nanometers(250.0).to_nanometers(), 250.0);
        assert_eq!(PhysicalSize::new(0.001, LengthUnit::Millimeter).to_nanometers(), 1000.0);
    }

    #[test]
    fn shape_equality_includes_label() {
        let style = ShapeStyle::outline(Rgba::rgb(255, 0, 0));
        let a = Shape::new(ShapeGeometry::Point { x: 1.0, y: 2.0 }, style, Some("a".into()));
        let b = Shape::new(ShapeGeometry::Point { x: 1.0, y: 2.0 }, style, Some("b".into()));

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn shape_json_is_tagged_by_kind() {
        let shape = Shape::new(
            ShapeGeometry::Line {
                x1: 0.0,
                y1: 0.0,
                x2: 1.0,
                y2: 1.0,
                marker_start: Some(LineMarker::Arrow),
            },
            ShapeStyle::outline(Rgba::rgb(0, 0, 0)),
            None,
        );

        let value = serde_json::to_value(&shape).expect("shape should serialize");
        assert_eq!(value["geometry"]["type"], "line");
        assert_eq!(value["geometry"]["marker_start"], "Arrow");

        let back: Shape = serde_json::from_value(value).expect("shape should deserialize");
        assert_eq!(back, shape);
    }
}
