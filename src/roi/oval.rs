//! Oval rasterization and recovery of center/diameter from the raster.

use super::bbox::BoundingBox;
use super::point::Point;

/// Default cap on the pixels scanned when rasterizing an oval on read.
///
/// A 64-byte header can describe a box of up to 65536 x 65536 pixels; the
/// cap keeps decoding of such records to a few tens of megabytes.
pub const MAX_RASTER_PIXELS: u64 = 1 << 24;

/// Number of integer corners `rasterize` visits for `bbox`.
pub fn raster_size(bbox: &BoundingBox) -> u64 {
    let cols = (bbox.width() + 1).max(0) as u64;
    let rows = (bbox.height() + 1).max(0) as u64;
    cols * rows
}

/// Returns every pixel whose center lies inside the ellipse inscribed in `bbox`.
///
/// Integer corners `(cx, cy)` span `left..=right` and `top..=bottom`; the
/// pixel center `(cx + 0.5, cy + 0.5)` is tested against
/// `((x - center_x) / rx)^2 + ((y - center_y) / ry)^2 <= 1`. Points are
/// emitted as `(cy, cx)` with x in the outer loop, so the output is
/// column-major over the box.
///
/// A box with zero width or height yields no points.
pub fn rasterize(bbox: &BoundingBox) -> Vec<Point<i16>> {
    let rx = f64::from(bbox.width()) / 2.0;
    let ry = f64::from(bbox.height()) / 2.0;
    let center_x = f64::from(bbox.left) + rx;
    let center_y = f64::from(bbox.top) + ry;

    let mut points = Vec::new();
    for corner_x in bbox.left..=bbox.right {
        for corner_y in bbox.top..=bbox.bottom {
            let x = f64::from(corner_x) + 0.5;
            let y = f64::from(corner_y) + 0.5;
            let dx = x - center_x;
            let dy = y - center_y;
            // A zero radius divides to infinity and drops the pixel.
            if dx * dx / (rx * rx) + dy * dy / (ry * ry) <= 1.0 {
                points.push(Point::new(corner_y, corner_x));
            }
        }
    }
    points
}

/// Estimates the center and diameter of a rasterized oval.
///
/// Per axis the pixel extent is `max - min + 1` and the center is
/// `min + extent / 2`. The diameter is the mean of the row and column
/// extents. Returns `None` for an empty point set.
pub fn oval_points_center_diam(points: &[Point<i16>]) -> Option<(Point<f64>, f64)> {
    let bbox = BoundingBox::from_points(points)?;
    let row_extent = f64::from(bbox.height() + 1);
    let col_extent = f64::from(bbox.width() + 1);

    let center = Point::new(
        f64::from(bbox.top) + row_extent / 2.0,
        f64::from(bbox.left) + col_extent / 2.0,
    );
    Some((center, (row_extent + col_extent) / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_size() {
        assert_eq!(raster_size(&BoundingBox::new(0, 0, 16, 16)), 17 * 17);
        assert_eq!(raster_size(&BoundingBox::new(5, 5, 5, 9)), 5);
        // Inverted boxes scan nothing.
        assert_eq!(raster_size(&BoundingBox::new(10, 0, 2, 4)), 0);
        assert_eq!(
            raster_size(&BoundingBox::new(i16::MIN, i16::MIN, i16::MAX, i16::MAX)),
            1 << 32
        );
    }

    #[test]
    fn test_centered_16x16_oval() {
        let points = rasterize(&BoundingBox::new(0, 0, 16, 16));
        let (center, diameter) = oval_points_center_diam(&points).unwrap();
        assert_eq!(center, Point::new(8.0, 8.0));
        assert_eq!(diameter, 16.0);
    }

    #[test]
    fn test_scan_order_is_x_outer() {
        let points = rasterize(&BoundingBox::new(0, 0, 2, 2));
        // Centers (0.5, 0.5)..(1.5, 1.5) are inside, the 2.5 row/column is not.
        assert_eq!(
            points,
            vec![
                Point::new(0, 0),
                Point::new(1, 0),
                Point::new(0, 1),
                Point::new(1, 1),
            ]
        );
    }

    #[test]
    fn test_offset_box_stays_inside_bbox() {
        let bbox = BoundingBox::new(10, 20, 17, 31);
        let points = rasterize(&bbox);
        assert!(!points.is_empty());
        for p in &points {
            assert!(p.row >= bbox.top && p.row <= bbox.bottom);
            assert!(p.col >= bbox.left && p.col <= bbox.right);
        }
    }

    #[test]
    fn test_asymmetric_oval_center_diam() {
        let points = rasterize(&BoundingBox::new(4, 10, 12, 30));
        let (center, diameter) = oval_points_center_diam(&points).unwrap();
        assert_eq!(center, Point::new(8.0, 20.0));
        assert_eq!(diameter, 14.0);
    }

    #[test]
    fn test_degenerate_box_is_empty() {
        assert!(rasterize(&BoundingBox::new(3, 3, 3, 9)).is_empty());
        assert!(oval_points_center_diam(&[]).is_none());
    }
}
