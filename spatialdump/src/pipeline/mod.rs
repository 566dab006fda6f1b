//! One dump file in, one PNG out.
//!
//! A run goes through its stages strictly in order:
//!
//! ```text
//! config → read → detect dialect → parse ┐
//!                                        ├→ draw → write
//!           view transform from corners ─┘
//! ```
//!
//! Tree dumps are drawn one body line at a time: the point list is parsed
//! and drawn, then dropped before the line list is read. The PNG is only
//! written once the whole file has parsed, so a corrupt log never produces
//! an image.

mod error;

pub use error::{PipelineError, Stage};

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::{ConfigFile, DEFAULT_INPUT, DEFAULT_OUTPUT};
use crate::dump::{
    detect_dialect, Detected, Dialect, Dump, DumpError, DumpResult, LeafDumpReader,
    TreeDumpReader,
};
use crate::render::{Canvas, RenderError, ViewTransform};

/// What to run on.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Forces a dialect instead of sniffing the input
    pub dialect: Option<Dialect>,
    /// Config file; built-in defaults when `None`
    pub config: Option<PathBuf>,
    /// Parse and count only, write nothing
    pub summary_only: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            dialect: None,
            config: None,
            summary_only: false,
        }
    }
}

/// Counts gathered during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub dialect: Dialect,
    /// Tree depth header, tree dumps only
    pub depth: Option<i64>,
    /// Leaf count header, tree dumps only
    pub leaf_count: Option<i64>,
    pub points: usize,
    pub lines: usize,
    pub leaves: usize,
    pub rects: usize,
    /// Inverted or zero-area rectangles left undrawn
    pub skipped_rects: usize,
    /// Image written, `None` in summary mode
    pub output: Option<PathBuf>,
}

impl RunSummary {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            depth: None,
            leaf_count: None,
            points: 0,
            lines: 0,
            leaves: 0,
            rects: 0,
            skipped_rects: 0,
            output: None,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "dialect:    {}", self.dialect)?;
        match self.dialect {
            Dialect::Tree => {
                let header = |v: Option<i64>| v.map_or("-".to_string(), |v| v.to_string());
                writeln!(f, "depth:      {}", header(self.depth))?;
                writeln!(f, "leaf count: {}", header(self.leaf_count))?;
                writeln!(f, "points:     {}", self.points)?;
                writeln!(f, "lines:      {}", self.lines)?;
            }
            Dialect::Leaves => {
                writeln!(f, "leaves:     {}", self.leaves)?;
                writeln!(f, "rects:      {}", self.rects)?;
                if self.skipped_rects > 0 {
                    writeln!(f, "skipped:    {}", self.skipped_rects)?;
                }
            }
        }
        if let Some(output) = &self.output {
            writeln!(f, "output:     {}", output.display())?;
        }
        Ok(())
    }
}

/// Runs the whole pipeline once.
pub fn run(options: &PipelineOptions) -> Result<RunSummary, PipelineError> {
    let started = Instant::now();
    let config = ConfigFile::load_optional(options.config.as_deref())?;

    let input = &options.input;
    let read_error = |offset: Option<u64>, source: io::Error| PipelineError::Read {
        path: input.clone(),
        offset,
        source,
    };
    let mut reader =
        BufReader::new(File::open(input).map_err(|source| read_error(None, source))?);

    let detected = match options.dialect {
        Some(dialect) => Detected { dialect, offset: 0 },
        None => detect_dialect(&mut reader).map_err(|source| read_error(None, source))?,
    };
    let dialect = detected.dialect;
    info!(path = %input.display(), %dialect, "Reading dump");

    let parse_error = |source| dump_error(input, source);

    let summary = if options.summary_only {
        summarize(reader, detected).map_err(parse_error)?
    } else {
        let mut canvas = new_canvas(&config, dialect).map_err(PipelineError::Render)?;
        let mut summary = draw(reader, detected, &mut canvas).map_err(parse_error)?;

        canvas
            .save_png(&options.output)
            .map_err(PipelineError::Write)?;
        info!(path = %options.output.display(), "Wrote image");
        summary.output = Some(options.output.clone());
        summary
    };

    info!(
        points = summary.points,
        lines = summary.lines,
        leaves = summary.leaves,
        rects = summary.rects,
        skipped = summary.skipped_rects,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Run complete"
    );
    Ok(summary)
}

/// Sorts a scan failure into the read or parse stage.
///
/// An I/O error mid-scan is still a read failure, but keeps its offset.
fn dump_error(input: &Path, source: DumpError) -> PipelineError {
    match source {
        DumpError::Io { offset, source } => PipelineError::Read {
            path: input.to_path_buf(),
            offset: Some(offset),
            source,
        },
        source => PipelineError::Parse {
            path: input.to_path_buf(),
            source,
        },
    }
}

/// Blank canvas framed on the configured corners for `dialect`.
pub fn new_canvas(config: &ConfigFile, dialect: Dialect) -> Result<Canvas, RenderError> {
    let range = config.view_for(dialect);
    for corner in range.stray_corners() {
        warn!(%corner, %dialect, "View corner lies outside the tile grid");
    }
    let view = ViewTransform::from_tiles(
        range,
        &config.projection,
        config.canvas.width,
        config.canvas.height,
    )?;
    debug!(%range, scale = ?view.scale(), "View transform");
    Canvas::new(
        config.canvas.width,
        config.canvas.height,
        view,
        config.style.to_style()?,
    )
}

/// Draws an already parsed dump.
///
/// Returns the number of rectangles skipped as empty.
pub fn render_dump(dump: &Dump, canvas: &mut Canvas) -> usize {
    match dump {
        Dump::Tree(tree) => {
            canvas.draw_points(&tree.points);
            canvas.draw_lines(&tree.lines);
            0
        }
        Dump::Leaves(leaves) => canvas.draw_leaves(&leaves.leaves),
    }
}

fn draw<R: BufRead>(reader: R, at: Detected, canvas: &mut Canvas) -> DumpResult<RunSummary> {
    let mut summary = RunSummary::new(at.dialect);
    match at.dialect {
        Dialect::Tree => {
            let mut tree = TreeDumpReader::starting_at(reader, at.offset);
            let header = tree.read_header()?;
            summary.depth = Some(header.depth);
            summary.leaf_count = Some(header.leaf_count);

            {
                let points = tree.read_points()?;
                summary.points = points.len();
                canvas.draw_points(&points);
            }
            {
                let lines = tree.read_lines()?;
                summary.lines = lines.len();
                canvas.draw_lines(&lines);
            }
            tree.finish()?;
        }
        Dialect::Leaves => {
            let leaves = LeafDumpReader::starting_at(reader, at.offset)
                .collect::<DumpResult<Vec<_>>>()?;
            summary.leaves = leaves.len();
            summary.rects = leaves.iter().map(|l| l.rects.len()).sum();
            summary.skipped_rects = canvas.draw_leaves(&leaves);
        }
    }
    Ok(summary)
}

fn summarize<R: BufRead>(reader: R, at: Detected) -> DumpResult<RunSummary> {
    let mut summary = RunSummary::new(at.dialect);
    match at.dialect {
        Dialect::Tree => {
            let mut tree = TreeDumpReader::starting_at(reader, at.offset);
            let header = tree.read_header()?;
            summary.depth = Some(header.depth);
            summary.leaf_count = Some(header.leaf_count);

            for point in tree.points()? {
                point?;
                summary.points += 1;
            }
            for line in tree.lines()? {
                line?;
                summary.lines += 1;
            }
            tree.finish()?;
        }
        Dialect::Leaves => {
            for leaf in LeafDumpReader::starting_at(reader, at.offset) {
                let leaf = leaf?;
                summary.leaves += 1;
                summary.rects += leaf.rects.len();
                summary.skipped_rects += leaf.rects.iter().filter(|r| r.is_empty()).count();
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::PlanarPoint;
    use crate::dump::parse_dump;

    const SCENARIO: &str = "2\n3\n(0,0)(10,10)(20,20)\n((0,0)(10,10))((10,10)(20,20))\n";

    fn at_start(dialect: Dialect) -> Detected {
        Detected { dialect, offset: 0 }
    }

    /// Hands out `data`, then fails.
    struct FailingReader {
        data: &'static [u8],
    }

    impl io::Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::new(io::ErrorKind::Other, "device lost"));
            }
            let n = self.data.len().min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_summarize_tree() {
        let summary = summarize(SCENARIO.as_bytes(), at_start(Dialect::Tree)).unwrap();

        assert_eq!(summary.depth, Some(2));
        assert_eq!(summary.leaf_count, Some(3));
        assert_eq!(summary.points, 3);
        assert_eq!(summary.lines, 2);
        assert_eq!(summary.output, None);
    }

    #[test]
    fn test_summarize_leaves_counts_empty_rects() {
        let text = "L(R(0, 0, 1, 1), R(5, 5, 2, 2), ) L(R(3, 3, 3, 9), ) ";
        let summary = summarize(text.as_bytes(), at_start(Dialect::Leaves)).unwrap();

        assert_eq!(summary.leaves, 2);
        assert_eq!(summary.rects, 3);
        assert_eq!(summary.skipped_rects, 2);
    }

    #[test]
    fn test_streamed_draw_matches_in_memory_render() {
        let config = ConfigFile::default();

        let mut streamed = new_canvas(&config, Dialect::Tree).unwrap();
        draw(SCENARIO.as_bytes(), at_start(Dialect::Tree), &mut streamed).unwrap();

        let dump = parse_dump(SCENARIO.as_bytes(), None).unwrap();
        let mut whole = new_canvas(&config, Dialect::Tree).unwrap();
        render_dump(&dump, &mut whole);

        assert_eq!(streamed.encode_png().unwrap(), whole.encode_png().unwrap());
    }

    #[test]
    fn test_new_canvas_uses_dialect_corners() {
        let config = ConfigFile::default();
        let tree = new_canvas(&config, Dialect::Tree).unwrap();
        let leaves = new_canvas(&config, Dialect::Leaves).unwrap();

        // North-west reference corners land on the origin
        let origin = |c: &Canvas, p: PlanarPoint| {
            let (x, y) = c.view().apply_point(p);
            x.abs() < 1e-3 && y.abs() < 1e-3
        };
        assert!(origin(&tree, PlanarPoint::new(14_793_042, 100_008_752)));
        assert!(origin(&leaves, PlanarPoint::new(13_703_028, 102_149_850)));
    }

    #[test]
    fn test_degenerate_corners_fail_at_render_stage() {
        let mut config = ConfigFile::default();
        config.tree_view.max.x = config.tree_view.min.x;

        let err = new_canvas(&config, Dialect::Tree).err().unwrap();
        assert!(matches!(err, RenderError::DegenerateView(_)));
    }

    #[test]
    fn test_read_failure_mid_scan_keeps_offset() {
        let reader = BufReader::new(FailingReader { data: b"2\n3\n(0,0)" });
        let source = summarize(reader, at_start(Dialect::Tree)).unwrap_err();

        let err = dump_error(Path::new("nodeTree.log"), source);
        assert_eq!(err.stage(), Stage::Read);
        assert_eq!(err.offset(), Some(9));
    }

    #[test]
    fn test_parse_failure_stays_in_parse_stage() {
        let source = summarize("2\n3\n(0,".as_bytes(), at_start(Dialect::Tree)).unwrap_err();

        let err = dump_error(Path::new("nodeTree.log"), source);
        assert_eq!(err.stage(), Stage::Parse);
        assert!(err.offset().is_some());
    }

    #[test]
    fn test_detected_offset_carries_into_diagnostics() {
        let detected = Detected {
            dialect: Dialect::Leaves,
            offset: 100,
        };
        let err = summarize("R(0, 0, 1, 1)".as_bytes(), detected).unwrap_err();
        assert_eq!(err.offset(), 100);
    }

    #[test]
    fn test_stray_corner_still_frames_canvas() {
        let mut config = ConfigFile::default();
        config.tree_view.max.x = 1 << config.tree_view.max.zoom;

        assert!(new_canvas(&config, Dialect::Tree).is_ok());
    }

    #[test]
    fn test_summary_display() {
        let summary = summarize(SCENARIO.as_bytes(), at_start(Dialect::Tree)).unwrap();
        let text = summary.to_string();

        assert!(text.contains("dialect:    tree"));
        assert!(text.contains("depth:      2"));
        assert!(text.contains("points:     3"));
        assert!(!text.contains("output"));
    }

    #[test]
    fn test_default_options() {
        let options = PipelineOptions::default();
        assert_eq!(options.input, PathBuf::from("nodeTree.log"));
        assert_eq!(options.output, PathBuf::from("nodeTree.png"));
    }
}
