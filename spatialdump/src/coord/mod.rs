//! Coordinate conversion module
//!
//! Projects slippy map tile addresses into the planar integer coordinates the
//! indexing engine writes into its debug dumps.

mod types;

pub use types::{
    PlanarPoint, Projection, TileAddress, TileRange, DEFAULT_FACTOR, EARTH_RADIUS, MAX_ZOOM,
};

/// Projects a tile address to planar engine coordinates.
///
/// Uses the forward transform
///
/// ```text
/// x =  (2·tx / 2^zoom − 1) · K
/// y = −(2·ty / 2^zoom − 1) · K      with K = factor · radius / 2
/// ```
///
/// and truncates toward zero. The north-west corner of the world maps to
/// `(-K, K)`, the south-east corner to `(K, -K)`.
///
/// Tiles outside `0..2^zoom` are not rejected; they project to points beyond
/// the world edge. Use [`TileAddress::is_in_range`] to check beforehand.
///
/// # Arguments
///
/// * `tile` - Tile address to project
/// * `projection` - Radius and unit factor
#[inline]
pub fn tile_to_planar(tile: &TileAddress, projection: &Projection) -> PlanarPoint {
    let n = 2.0_f64.powi(tile.zoom as i32);
    let norm = projection.norm();

    let x = (tile.x as f64 * 2.0 / n - 1.0) * norm;
    let y = -(tile.y as f64 * 2.0 / n - 1.0) * norm;

    // `as` truncates toward zero, which existing golden images rely on
    PlanarPoint::new(x as i64, y as i64)
}

/// Projects both corners of a tile range.
///
/// Returns `(min, max)` in the order the range stores them; `min` is not
/// necessarily component-wise smaller since the y axis flips.
pub fn project_range(range: &TileRange, projection: &Projection) -> (PlanarPoint, PlanarPoint) {
    (
        tile_to_planar(&range.min, projection),
        tile_to_planar(&range.max, projection),
    )
}
