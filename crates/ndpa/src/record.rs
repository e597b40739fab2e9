use roi_model::Rgba;
use std::fmt;
use std::str::FromStr;

/// Position on the slide in nanometers, relative to the slide center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlidePoint {
    pub x: f64,
    pub y: f64,
}

impl SlidePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Value of an annotation's `type` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnnotationType {
    Circle,
    Freehand,
    Pointer,
    Pin,
    Other(String),
}

impl AnnotationType {
    pub fn parse(value: &str) -> Self {
        match value {
            "circle" => Self::Circle,
            "freehand" => Self::Freehand,
            "pointer" => Self::Pointer,
            "pin" => Self::Pin,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Circle => "circle",
            Self::Freehand => "freehand",
            Self::Pointer => "pointer",
            Self::Pin => "pin",
            Self::Other(value) => value,
        }
    }
}

impl fmt::Display for AnnotationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the viewer drew, from the `type` and `displayname` pair.
///
/// Rectangles, freehand lines and freehand polygons are all stored as
/// `freehand` and told apart only by their display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    Circle,
    Rectangle,
    FreehandLine,
    Freehand,
    Pointer,
    Pin,
    /// Any other pair; its payload is never read
    Unrecognized,
}

impl AnnotationKind {
    pub fn classify(annotation_type: &AnnotationType, display_name: &str) -> Self {
        match (annotation_type, display_name) {
            (AnnotationType::Circle, _) => Self::Circle,
            (AnnotationType::Freehand, "AnnotateRectangle") => Self::Rectangle,
            (AnnotationType::Freehand, "AnnotateFreehandLine") => Self::FreehandLine,
            (AnnotationType::Freehand, "AnnotateFreehand") => Self::Freehand,
            (AnnotationType::Pointer, "AnnotatePointer") => Self::Pointer,
            (AnnotationType::Pin, "AnnotatePin") => Self::Pin,
            _ => Self::Unrecognized,
        }
    }
}

/// Geometry payload, shaped by the annotation kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Circle { center: SlidePoint, radius: f64 },
    /// Ordered `pointlist` of a freehand annotation
    PointList(Vec<SlidePoint>),
    Segment { start: SlidePoint, end: SlidePoint },
    Pin(SlidePoint),
    /// Unrecognized annotation, payload not read
    Unsupported,
}

/// A `#RRGGBB` color that has already been validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    /// Opaque RGBA equivalent.
    pub fn to_rgba(self) -> Rgba {
        Rgba::rgb(self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidColor;

impl FromStr for HexColor {
    type Err = InvalidColor;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let digits = value.trim().strip_prefix('#').unwrap_or(value.trim());
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InvalidColor);
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| InvalidColor)
        };

        Ok(Self { r: channel(0..2)?, g: channel(2..4)?, b: channel(4..6)? })
    }
}

/// One `ndpviewstate` entry of an NDPA document.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    /// `id` attribute of the `ndpviewstate`, when present
    pub id: Option<u32>,
    pub annotation_type: AnnotationType,
    pub display_name: String,
    pub color: HexColor,
    /// Trimmed `title` text, `None` when absent or empty
    pub title: Option<String>,
    /// Trimmed `details` text, empty when absent
    pub details: String,
    pub geometry: Geometry,
}
