//! Coordinate type definitions

use std::fmt;

/// Equatorial Earth radius in meters (WGS84).
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Unit scale applied by the indexing engine on top of the meter projection.
///
/// This is an engine convention rather than a property of Mercator: the
/// engine stores projected positions as integers in hundredths of a meter.
pub const DEFAULT_FACTOR: f64 = 100.0;

/// Highest zoom level the tile scheme is expected to use.
pub const MAX_ZOOM: u8 = 30;

/// Tile address in the slippy map tiling scheme.
///
/// `x` grows eastwards, `y` grows southwards, both in `0..2^zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileAddress {
    /// Column (east-west), 0 at the antimeridian
    pub x: u32,
    /// Row (north-south), 0 at the north edge
    pub y: u32,
    /// Zoom level
    pub zoom: u8,
}

impl TileAddress {
    /// Creates a tile address.
    #[inline]
    pub const fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }

    /// Returns true when both axes fall inside `0..2^zoom`.
    ///
    /// Projection accepts out-of-range tiles; this lets callers check first.
    pub fn is_in_range(&self) -> bool {
        if self.zoom >= 32 {
            return true;
        }
        let n = 1u64 << self.zoom;
        (self.x as u64) < n && (self.y as u64) < n
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// A projected position in engine units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PlanarPoint {
    pub x: i64,
    pub y: i64,
}

impl PlanarPoint {
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for PlanarPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Two opposite tile corners that frame the rendered area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    /// Corner whose projection becomes the raster origin
    pub min: TileAddress,
    /// Corner whose projection becomes the far raster edge
    pub max: TileAddress,
}

impl TileRange {
    /// Builds a range from column/row bounds sharing one zoom level.
    pub const fn new(min_x: u32, min_y: u32, max_x: u32, max_y: u32, zoom: u8) -> Self {
        Self {
            min: TileAddress::new(min_x, min_y, zoom),
            max: TileAddress::new(max_x, max_y, zoom),
        }
    }

    /// Corners that fall outside their zoom level's tile grid.
    pub fn stray_corners(&self) -> impl Iterator<Item = TileAddress> {
        [self.min, self.max].into_iter().filter(|c| !c.is_in_range())
    }
}

impl fmt::Display for TileRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

/// Parameters of the tile → planar forward projection.
///
/// The projected half-extent of the world is `factor * radius / 2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Sphere radius in meters
    pub radius: f64,
    /// Engine unit scale
    pub factor: f64,
}

impl Projection {
    pub const fn new(radius: f64, factor: f64) -> Self {
        Self { radius, factor }
    }

    /// Half the projected world width, `K` in the forward transform.
    #[inline]
    pub fn norm(&self) -> f64 {
        self.factor * self.radius / 2.0
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(EARTH_RADIUS, DEFAULT_FACTOR)
    }
}
