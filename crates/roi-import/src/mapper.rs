//! Annotation record to shape conversion
//!
//! Which shape an annotation becomes depends on both its `type` and its
//! `displayname`: the viewer stores rectangles, freehand lines and freehand
//! polygons all as `freehand`.

use crate::coordinates::CoordinateMapping;
use ndpa::{AnnotationKind, AnnotationRecord, AnnotationType, Geometry, SlidePoint};
use roi_model::{LineMarker, Point, Rgba, Shape, ShapeGeometry, ShapeStyle};

/// Number of corner points the viewer writes for a rectangle.
pub const RECTANGLE_CORNERS: usize = 4;

/// Pins cannot be colored in the target format and are stored invisible.
pub const PIN_STROKE: Rgba = Rgba::TRANSPARENT_WHITE;

/// Shape produced for a `(type, displayname)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeRule {
    Ellipse,
    Rectangle,
    Polyline,
    Polygon,
    /// Line with an arrow at its start
    ArrowLine,
    Point,
    Unrecognized,
}

impl ShapeRule {
    pub fn classify(annotation_type: &AnnotationType, display_name: &str) -> Self {
        match AnnotationKind::classify(annotation_type, display_name) {
            AnnotationKind::Circle => Self::Ellipse,
            AnnotationKind::Rectangle => Self::Rectangle,
            AnnotationKind::FreehandLine => Self::Polyline,
            AnnotationKind::Freehand => Self::Polygon,
            AnnotationKind::Pointer => Self::ArrowLine,
            AnnotationKind::Pin => Self::Point,
            AnnotationKind::Unrecognized => Self::Unrecognized,
        }
    }

    pub fn for_record(record: &AnnotationRecord) -> Self {
        Self::classify(&record.annotation_type, &record.display_name)
    }
}

/// Converts one record into a pixel-space shape.
///
/// Returns `None` for unrecognized `(type, displayname)` pairs and for
/// rectangles that do not carry exactly four corners.
pub fn map_record(record: &AnnotationRecord, mapping: &CoordinateMapping) -> Option<Shape> {
    let rule = ShapeRule::for_record(record);

    let geometry = match (rule, &record.geometry) {
        (ShapeRule::Ellipse, Geometry::Circle { center, radius }) => ShapeGeometry::Ellipse {
            x: mapping.map_x(center.x),
            y: mapping.map_y(center.y),
            x_radius: mapping.length_x(*radius),
            y_radius: mapping.length_y(*radius),
        },
        (ShapeRule::Rectangle, Geometry::PointList(corners)) => {
            rectangle(record, corners, mapping)?
        }
        (ShapeRule::Polyline, Geometry::PointList(points)) => {
            ShapeGeometry::Polyline { points: map_points(points, mapping) }
        }
        (ShapeRule::Polygon, Geometry::PointList(points)) => {
            ShapeGeometry::Polygon { points: map_points(points, mapping) }
        }
        (ShapeRule::ArrowLine, Geometry::Segment { start, end }) => ShapeGeometry::Line {
            x1: mapping.map_x(start.x),
            y1: mapping.map_y(start.y),
            x2: mapping.map_x(end.x),
            y2: mapping.map_y(end.y),
            marker_start: Some(LineMarker::Arrow),
        },
        (ShapeRule::Point, Geometry::Pin(point)) => {
            ShapeGeometry::Point { x: mapping.map_x(point.x), y: mapping.map_y(point.y) }
        }
        _ => return None,
    };

    let stroke = match rule {
        ShapeRule::Point => PIN_STROKE,
        _ => record.color.to_rgba(),
    };

    Some(Shape::new(geometry, ShapeStyle::outline(stroke), record.title.clone()))
}

// The corners are assumed axis-aligned and in the viewer's fixed winding,
// so the first point is the top-left and the third the opposite corner.
fn rectangle(
    record: &AnnotationRecord,
    corners: &[SlidePoint],
    mapping: &CoordinateMapping,
) -> Option<ShapeGeometry> {
    let [first, _, third, _] = corners else {
        log::warn!(
            "rectangle annotation {:?} has {} corner points, expected {RECTANGLE_CORNERS}",
            record.title.as_deref().unwrap_or(""),
            corners.len()
        );
        return None;
    };

    Some(ShapeGeometry::Rectangle {
        x: mapping.map_x(first.x),
        y: mapping.map_y(first.y),
        width: mapping.length_x(third.x - first.x).abs(),
        height: mapping.length_y(third.y - first.y).abs(),
    })
}

fn map_points(points: &[SlidePoint], mapping: &CoordinateMapping) -> Vec<Point> {
    points.iter().map(|point| mapping.map_point(*point)).collect()
}
