//! NDPA annotation document reader
//!
//! An NDPA file is the XML sidecar a slide viewer writes next to an `.ndpi`
//! image. Its root `annotations` element holds one or more `ndpviewstate`
//! entries, each carrying a single `annotation` in slide nanometers.

mod record;

pub use record::{
    AnnotationKind, AnnotationRecord, AnnotationType, Geometry, HexColor, InvalidColor, SlidePoint,
};

use roxmltree::Node;
use std::fs;
use std::path::Path;

const ROOT: &str = "annotations";
const VIEW_STATE: &str = "ndpviewstate";
const ANNOTATION: &str = "annotation";

#[derive(Debug, thiserror::Error)]
pub enum NdpaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("root element is <{0}>, expected <annotations>")]
    UnexpectedRoot(String),
    #[error("missing <{0}> element")]
    MissingElement(String),
    #[error("annotation {index} is missing the {name:?} attribute")]
    MissingAttribute { index: usize, name: &'static str },
    #[error("annotation {index} has a non-numeric <{field}>: {value:?}")]
    InvalidNumber { index: usize, field: &'static str, value: String },
    #[error("annotation {index} has an invalid color {value:?}")]
    InvalidColor { index: usize, value: String },
}

/// Reads and parses an NDPA file.
pub fn read_document(path: &Path) -> Result<Vec<AnnotationRecord>, NdpaError> {
    let bytes = fs::read(path)?;
    parse_document(&bytes)
}

/// Parses NDPA bytes into records in document order.
///
/// A document with a single `ndpviewstate` and one with several both come
/// back as a plain sequence. Any structural problem fails the whole
/// document.
pub fn parse_document(bytes: &[u8]) -> Result<Vec<AnnotationRecord>, NdpaError> {
    let text = std::str::from_utf8(bytes)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let doc = roxmltree::Document::parse(text)?;

    let root = doc.root_element();
    if root.tag_name().name() != ROOT {
        return Err(NdpaError::UnexpectedRoot(root.tag_name().name().to_owned()));
    }

    let view_states: Vec<Node<'_, '_>> = children(root, VIEW_STATE).collect();
    if view_states.is_empty() {
        return Err(NdpaError::MissingElement(format!("{ROOT}/{VIEW_STATE}")));
    }

    view_states.into_iter().enumerate().map(|(index, node)| parse_view_state(index, node)).collect()
}

fn parse_view_state(index: usize, node: Node<'_, '_>) -> Result<AnnotationRecord, NdpaError> {
    let annotation = child(node, ANNOTATION)
        .ok_or_else(|| NdpaError::MissingElement(format!("{VIEW_STATE}[{index}]/{ANNOTATION}")))?;

    let attribute = |name: &'static str| {
        annotation.attribute(name).ok_or(NdpaError::MissingAttribute { index, name })
    };

    let annotation_type = AnnotationType::parse(attribute("type")?);
    let display_name = attribute("displayname")?.to_owned();
    let color_value = attribute("color")?;
    let color = color_value
        .parse::<HexColor>()
        .map_err(|_| NdpaError::InvalidColor { index, value: color_value.to_owned() })?;

    let title = child_text(node, "title").filter(|title| !title.is_empty());
    let details = child_text(node, "details").unwrap_or_default();
    let id = node.attribute("id").and_then(|id| id.trim().parse().ok());

    let kind = AnnotationKind::classify(&annotation_type, &display_name);
    let geometry = parse_geometry(index, annotation, kind)?;

    Ok(AnnotationRecord { id, annotation_type, display_name, color, title, details, geometry })
}

fn parse_geometry(
    index: usize,
    annotation: Node<'_, '_>,
    kind: AnnotationKind,
) -> Result<Geometry, NdpaError> {
    let at = format!("{VIEW_STATE}[{index}]/{ANNOTATION}");
    let field = |name: &'static str| number(index, annotation, &at, name);

    let geometry = match kind {
        AnnotationKind::Circle => Geometry::Circle {
            center: SlidePoint::new(field("x")?, field("y")?),
            radius: field("radius")?,
        },
        AnnotationKind::Rectangle | AnnotationKind::FreehandLine | AnnotationKind::Freehand => {
            let point_list = child(annotation, "pointlist")
                .ok_or_else(|| NdpaError::MissingElement(format!("{at}/pointlist")))?;
            let point_at = format!("{at}/pointlist/point");

            let points = children(point_list, "point")
                .map(|point| {
                    Ok(SlidePoint::new(
                        number(index, point, &point_at, "x")?,
                        number(index, point, &point_at, "y")?,
                    ))
                })
                .collect::<Result<Vec<_>, NdpaError>>()?;

            Geometry::PointList(points)
        }
        AnnotationKind::Pointer => Geometry::Segment {
            start: SlidePoint::new(field("x1")?, field("y1")?),
            end: SlidePoint::new(field("x2")?, field("y2")?),
        },
        AnnotationKind::Pin => Geometry::Pin(SlidePoint::new(field("x")?, field("y")?)),
        AnnotationKind::Unrecognized => Geometry::Unsupported,
    };

    Ok(geometry)
}

fn number(
    index: usize,
    node: Node<'_, '_>,
    at: &str,
    field: &'static str,
) -> Result<f64, NdpaError> {
    let text = child_text(node, field)
        .ok_or_else(|| NdpaError::MissingElement(format!("{at}/{field}")))?;
    text.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or(NdpaError::InvalidNumber { index, field, value: text })
}

fn children<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |child| child.is_element() && child.tag_name().name() == name)
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &'static str) -> Option<Node<'a, 'input>> {
    children(node, name).next()
}

fn child_text(node: Node<'_, '_>, name: &'static str) -> Option<String> {
    let element = child(node, name)?;
    let text: String =
        element.children().filter(|c| c.is_text()).filter_map(|c| c.text()).collect();
    Some(text.trim().to_owned())
}
