//! spatialdump - render spatial index debug dumps to PNG
//!
//! A geospatial indexing engine can dump the geometry of its spatial tree as
//! text: either the split points and lines of the tree, or the bounding
//! rectangles of every leaf. This crate parses those dumps, projects the
//! reference tile corners into the engine's planar units and draws the
//! geometry onto a fixed-size raster.
//!
//! ```no_run
//! use spatialdump::pipeline::{run, PipelineOptions};
//!
//! let summary = run(&PipelineOptions::default())?;
//! println!("{summary}");
//! # Ok::<(), spatialdump::pipeline::PipelineError>(())
//! ```

pub mod config;
pub mod coord;
pub mod dump;
pub mod logging;
pub mod pipeline;
pub mod render;

/// Crate version, for `--version` output and logs.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
