//! Planar → device view transform.

use crate::coord::{project_range, PlanarPoint, Projection, TileRange};

use super::error::RenderError;

/// Scale-and-translate mapping from planar units to raster pixels.
///
/// `min` maps to the raster origin and `max` to `(width, height)`. When
/// `max.y < min.y`, as for tile corners where y grows southwards in tile
/// space but northwards in planar space, the y scale is negative.
///
/// Kept in `f64`: planar values reach ±3.2e8, where `f32` loses whole units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    min_x: f64,
    min_y: f64,
    scale_x: f64,
    scale_y: f64,
}

impl ViewTransform {
    /// Maps the box spanned by `min` and `max` onto a `width`×`height` raster.
    pub fn from_bounds(
        min: PlanarPoint,
        max: PlanarPoint,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        // Corners may sit near the ends of the i64 range, so subtract in f64
        let extent_x = max.x as f64 - min.x as f64;
        let extent_y = max.y as f64 - min.y as f64;
        if extent_x == 0.0 || extent_y == 0.0 {
            return Err(RenderError::DegenerateView(format!(
                "corners {} and {} span no area",
                min, max
            )));
        }

        Ok(Self {
            min_x: min.x as f64,
            min_y: min.y as f64,
            scale_x: width as f64 / extent_x,
            scale_y: height as f64 / extent_y,
        })
    }

    /// Projects two reference tile corners and frames the raster on them.
    pub fn from_tiles(
        range: &TileRange,
        projection: &Projection,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let (min, max) = project_range(range, projection);
        Self::from_bounds(min, max, width, height)
    }

    /// Device coordinates of a planar position.
    #[inline]
    pub fn apply(&self, x: i64, y: i64) -> (f32, f32) {
        (
            ((x as f64 - self.min_x) * self.scale_x) as f32,
            ((y as f64 - self.min_y) * self.scale_y) as f32,
        )
    }

    #[inline]
    pub fn apply_point(&self, point: PlanarPoint) -> (f32, f32) {
        self.apply(point.x, point.y)
    }

    /// Pixels per planar unit on each axis; negative when the axis flips.
    pub fn scale(&self) -> (f64, f64) {
        (self.scale_x, self.scale_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-3 && (a.1 - b.1).abs() < 1e-3
    }

    #[test]
    fn test_bounds_fill_raster() {
        let view =
            ViewTransform::from_bounds(PlanarPoint::new(0, 0), PlanarPoint::new(20, 20), 512, 512)
                .unwrap();

        assert!(close(view.apply(0, 0), (0.0, 0.0)));
        assert!(close(view.apply(10, 10), (256.0, 256.0)));
        assert!(close(view.apply(20, 20), (512.0, 512.0)));
    }

    #[test]
    fn test_non_square_raster() {
        let view = ViewTransform::from_bounds(
            PlanarPoint::new(-100, -50),
            PlanarPoint::new(100, 50),
            400,
            100,
        )
        .unwrap();

        assert!(close(view.apply(0, 0), (200.0, 50.0)));
        assert_eq!(view.scale(), (2.0, 1.0));
    }

    #[test]
    fn test_reference_tiles_flip_y() {
        let range = TileRange::new(8572, 5623, 8577, 5628, 14);
        let view = ViewTransform::from_tiles(&range, &Projection::default(), 512, 512).unwrap();

        let (sx, sy) = view.scale();
        assert!(sx > 0.0);
        assert!(sy < 0.0);

        // North-west tile corner lands on the origin, south-east on the far corner
        assert!(close(view.apply(14_793_042, 100_008_752), (0.0, 0.0)));
        assert!(close(view.apply(14_987_687, 99_814_106), (512.0, 512.0)));
    }

    #[test]
    fn test_extreme_corners_do_not_overflow() {
        let view = ViewTransform::from_bounds(
            PlanarPoint::new(i64::MIN, i64::MAX),
            PlanarPoint::new(i64::MAX, i64::MIN),
            512,
            512,
        )
        .unwrap();

        let (sx, sy) = view.scale();
        assert!(sx.is_finite() && sx > 0.0);
        assert!(sy.is_finite() && sy < 0.0);
        assert!(close(view.apply(0, 0), (256.0, 256.0)));
    }

    #[test]
    fn test_huge_projection_factor() {
        let range = TileRange::new(0, 0, 16383, 16383, 14);
        let projection = Projection::new(6378137.0, 1e300);
        let view = ViewTransform::from_tiles(&range, &projection, 512, 512).unwrap();
        assert!(view.scale().0.is_finite());
    }

    #[test]
    fn test_degenerate_bounds() {
        let err = ViewTransform::from_bounds(PlanarPoint::new(5, 0), PlanarPoint::new(5, 10), 512, 512)
            .unwrap_err();
        assert!(matches!(err, RenderError::DegenerateView(_)));
    }

    #[test]
    fn test_degenerate_tile_range() {
        let range = TileRange::new(3, 3, 3, 4, 5);
        let err = ViewTransform::from_tiles(&range, &Projection::default(), 512, 512).unwrap_err();
        assert!(matches!(err, RenderError::DegenerateView(_)));
    }
}
