//! Run configuration.
//!
//! Every tunable of a render lives in [`ConfigFile`]: the projection
//! constants, the raster size, the reference tile corners per dump dialect
//! and the drawing style. Values come from an INI file overlaid on defaults
//! that reproduce the reference rendering.
//!
//! ```ini
//! [projection]
//! radius = 6378137
//! factor = 100
//!
//! [canvas]
//! width = 512
//! height = 512
//!
//! [tree_view]
//! min_x = 8572
//! min_y = 5623
//! max_x = 8577
//! max_y = 5628
//! zoom = 14
//!
//! [style]
//! rect_alpha = 0.25
//! ```

mod file;
mod parser;
mod settings;

pub use file::ConfigFileError;
pub use settings::{
    CanvasSettings, ConfigFile, StyleSettings, DEFAULT_INPUT, DEFAULT_LEAF_VIEW, DEFAULT_OUTPUT,
    DEFAULT_TREE_VIEW,
};
