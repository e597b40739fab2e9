//! Slide nanometers to image pixels
//!
//! The scanner records annotation positions relative to the physical center
//! of the slide, while shapes live in the image's own pixel grid. The
//! mapping divides by the pixel size and then shifts so that the slide
//! center lands on the image center.

use crate::error::{ImportError, ImportResult};
use ndpa::SlidePoint;
use roi_model::{ImageMetadata, Point, ScannerMetadata};
use serde::Serialize;

/// Per-image affine transform from slide nanometers to pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoordinateMapping {
    /// Nanometers per pixel along x
    pub scale_x: f64,
    /// Nanometers per pixel along y
    pub scale_y: f64,
    /// Pixel translation along x
    pub offset_x: f64,
    /// Pixel translation along y
    pub offset_y: f64,
}

impl CoordinateMapping {
    pub fn map_x(&self, nm: f64) -> f64 {
        nm / self.scale_x + self.offset_x
    }

    pub fn map_y(&self, nm: f64) -> f64 {
        nm / self.scale_y + self.offset_y
    }

    pub fn map_point(&self, point: SlidePoint) -> Point {
        Point::new(self.map_x(point.x), self.map_y(point.y))
    }

    /// Length along x in pixels; no offset applied.
    pub fn length_x(&self, nm: f64) -> f64 {
        nm / self.scale_x
    }

    /// Length along y in pixels; no offset applied.
    pub fn length_y(&self, nm: f64) -> f64 {
        nm / self.scale_y
    }
}

/// Builds the mapping from nanometer pixel sizes, pixel dimensions and the
/// slide center.
///
/// Zero pixel sizes are not checked here; see [`compute_mapping`].
pub fn resolve(
    pixel_size_x_nm: f64,
    pixel_size_y_nm: f64,
    width_px: f64,
    height_px: f64,
    slide_center_x_nm: f64,
    slide_center_y_nm: f64,
) -> CoordinateMapping {
    CoordinateMapping {
        scale_x: pixel_size_x_nm,
        scale_y: pixel_size_y_nm,
        offset_x: width_px / 2.0 - slide_center_x_nm / pixel_size_x_nm,
        offset_y: height_px / 2.0 - slide_center_y_nm / pixel_size_y_nm,
    }
}

/// Mapping for an image from repository and scanner metadata.
///
/// Pixel dimensions come from the scanner's `ImageWidth`/`ImageLength` when
/// recorded, otherwise from the repository's pixel size.
pub fn compute_mapping(
    image: &ImageMetadata,
    scanner: &ScannerMetadata,
) -> ImportResult<CoordinateMapping> {
    let x_nm = image.physical_size_x.to_nanometers();
    let y_nm = image.physical_size_y.to_nanometers();
    if !(x_nm.is_finite() && y_nm.is_finite() && x_nm > 0.0 && y_nm > 0.0) {
        return Err(ImportError::InvalidPixelSize { x_nm, y_nm });
    }

    let width = scanner.image_width.unwrap_or(f64::from(image.size_x));
    let height = scanner.image_length.unwrap_or(f64::from(image.size_y));

    Ok(resolve(x_nm, y_nm, width, height, scanner.slide_center_x_nm, scanner.slide_center_y_nm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roi_model::PhysicalSize;

    fn image(pixel_nm: PhysicalSize) -> ImageMetadata {
        ImageMetadata {
            name: "slide.ndpi".to_owned(),
            size_x: 1000,
            size_y: 800,
            physical_size_x: pixel_nm,
            physical_size_y: pixel_nm,
        }
    }

    fn scanner(x: f64, y: f64) -> ScannerMetadata {
        ScannerMetadata {
            slide_center_x_nm: x,
            slide_center_y_nm: y,
            image_width: None,
            image_length: None,
        }
    }

    #[test]
    fn centered_slide_has_zero_offset() {
        let mapping = resolve(250.0, 250.0, 1000.0, 800.0, 125000.0, 100000.0);

        assert_eq!(mapping.offset_x, 0.0);
        assert_eq!(mapping.offset_y, 0.0);
        assert_eq!(mapping.scale_x, 250.0);
    }

    #[test]
    fn offset_moves_slide_center_to_image_center() {
        let mapping = resolve(500.0, 250.0, 1000.0, 800.0, 0.0, 0.0);

        assert_eq!(mapping.offset_x, 500.0);
        assert_eq!(mapping.offset_y, 400.0);
        assert_eq!(mapping.map_point(SlidePoint::new(0.0, 0.0)), Point::new(500.0, 400.0));
        assert_eq!(mapping.map_point(SlidePoint::new(1000.0, -1000.0)), Point::new(502.0, 396.0));
        assert_eq!(mapping.length_x(1000.0), 2.0);
        assert_eq!(mapping.length_y(1000.0), 4.0);
    }

    #[test]
    fn micrometer_pixel_size_is_normalized() {
        let image = image(PhysicalSize::micrometers(0.25));
        let mapping =
            compute_mapping(&image, &scanner(125000.0, 100000.0)).expect("mapping should resolve");

        assert_eq!(mapping, resolve(250.0, 250.0, 1000.0, 800.0, 125000.0, 100000.0));
    }

    #[test]
    fn scanner_dimensions_take_precedence() {
        let mut scanner = scanner(0.0, 0.0);
        scanner.image_width = Some(2000.0);
        scanner.image_length = Some(1600.0);

        let mapping = compute_mapping(&image(PhysicalSize::nanometers(250.0)), &scanner)
            .expect("mapping should resolve");

        assert_eq!(mapping.offset_x, 1000.0);
        assert_eq!(mapping.offset_y, 800.0);
    }

    #[test]
    fn zero_pixel_size_is_rejected() {
        let err = compute_mapping(&image(PhysicalSize::nanometers(0.0)), &scanner(0.0, 0.0))
            .expect_err("mapping should fail");

        assert!(matches!(err, ImportError::InvalidPixelSize { .. }));
    }
}
