use roi_model::Shape;

/// True when `existing` already holds a shape equal to `shape`.
///
/// Equality is exact over every field, so shapes recomputed from the same
/// annotation and mapping match bit for bit while any difference, including
/// the label, makes the shape new.
pub fn is_duplicate(shape: &Shape, existing: &[Shape]) -> bool {
    existing.iter().any(|candidate| candidate == shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roi_model::{Rgba, ShapeGeometry, ShapeStyle};

    fn point(x: f64, y: f64, label: &str) -> Shape {
        Shape::new(
            ShapeGeometry::Point { x, y },
            ShapeStyle::outline(Rgba::TRANSPARENT_WHITE),
            Some(label.to_owned()),
        )
    }

    #[test]
    fn identical_point_is_duplicate() {
        let existing = vec![point(1.0, 1.0, "other"), point(4.0, 8.0, "pin")];
        assert!(is_duplicate(&point(4.0, 8.0, "pin"), &existing));
    }

    #[test]
    fn label_difference_is_not_duplicate() {
        let existing = vec![point(4.0, 8.0, "pin")];
        assert!(!is_duplicate(&point(4.0, 8.0, "moved pin"), &existing));
    }

    #[test]
    fn comparison_has_no_tolerance() {
        let existing = vec![point(4.0, 8.0, "pin")];
        assert!(!is_duplicate(&point(4.0 + f64::EPSILON * 4.0, 8.0, "pin"), &existing));
    }

    #[test]
    fn different_variant_is_not_duplicate() {
        let style = ShapeStyle::outline(Rgba::rgb(0, 0, 0));
        let ellipse = Shape::new(
            ShapeGeometry::Ellipse { x: 1.0, y: 2.0, x_radius: 3.0, y_radius: 4.0 },
            style,
            None,
        );
        let rectangle = Shape::new(
            ShapeGeometry::Rectangle { x: 1.0, y: 2.0, width: 3.0, height: 4.0 },
            style,
            None,
        );

        assert!(!is_duplicate(&ellipse, &[rectangle]));
        assert!(is_duplicate(&ellipse, &[ellipse.clone()]));
    }

    #[test]
    fn style_difference_is_not_duplicate() {
        let red = Shape::new(
            ShapeGeometry::Point { x: 0.0, y: 0.0 },
            ShapeStyle::outline(Rgba::rgb(255, 0, 0)),
            None,
        );
        let blue = Shape::new(
            ShapeGeometry::Point { x: 0.0, y: 0.0 },
            ShapeStyle::outline(Rgba::rgb(0, 0, 255)),
            None,
        );

        assert!(!is_duplicate(&red, &[blue]));
    }

    #[test]
    fn empty_set_has_no_duplicates() {
        assert!(!is_duplicate(&point(0.0, 0.0, "pin"), &[]));
    }
}
