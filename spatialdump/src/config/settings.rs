//! Settings structs, one per INI section, and their defaults.

use crate::coord::{Projection, TileRange};
use crate::dump::Dialect;
use crate::render::{RenderError, Style, DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Log read when no input path is given.
pub const DEFAULT_INPUT: &str = "nodeTree.log";

/// Image written when no output path is given.
pub const DEFAULT_OUTPUT: &str = "nodeTree.png";

/// Reference corners framing tree dumps.
pub const DEFAULT_TREE_VIEW: TileRange = TileRange::new(8572, 5623, 8577, 5628, 14);

/// Reference corners framing leaf dumps.
pub const DEFAULT_LEAF_VIEW: TileRange = TileRange::new(267, 174, 271, 178, 9);

/// Complete render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// `[projection]`
    pub projection: Projection,
    /// `[canvas]`
    pub canvas: CanvasSettings,
    /// `[tree_view]`
    pub tree_view: TileRange,
    /// `[leaf_view]`
    pub leaf_view: TileRange,
    /// `[style]`
    pub style: StyleSettings,
}

impl ConfigFile {
    /// Reference corners for a dump dialect.
    pub fn view_for(&self, dialect: Dialect) -> &TileRange {
        match dialect {
            Dialect::Tree => &self.tree_view,
            Dialect::Leaves => &self.leaf_view,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            projection: Projection::default(),
            canvas: CanvasSettings::default(),
            tree_view: DEFAULT_TREE_VIEW,
            leaf_view: DEFAULT_LEAF_VIEW,
            style: StyleSettings::default(),
        }
    }
}

/// Raster size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Drawing sizes and opacities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleSettings {
    pub point_radius: f32,
    pub point_alpha: f32,
    pub line_width: f32,
    pub rect_alpha: f32,
}

impl StyleSettings {
    pub fn to_style(&self) -> Result<Style, RenderError> {
        Style::new(
            self.point_radius,
            self.point_alpha,
            self.line_width,
            self.rect_alpha,
        )
    }
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            point_radius: 1.0,
            point_alpha: 0.2,
            line_width: 2.0,
            rect_alpha: 0.1,
        }
    }
}
