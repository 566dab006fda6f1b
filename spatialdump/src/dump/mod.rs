//! Parsers for spatial tree debug dumps.
//!
//! The engine writes two kinds of debug text:
//!
//! ```text
//! tree dump                          leaf dump
//! ─────────                          ─────────
//! 2                    depth         L(R(x0, y0, x1, y1), R(...), ) L(...) ...
//! 3                    leaf count
//! (x,y)(x,y)...        points
//! ((x,y)(x,y))...      split lines
//! ```
//!
//! Both are built from parenthesised groups. Parsing runs in three layers:
//!
//! 1. [`token`] turns bytes into tokens straight off a [`BufRead`]
//! 2. [`group`] pairs delimiters with a depth stack, shape-agnostic
//! 3. [`grammar`] checks each group's shape and builds geometry
//!
//! Any error aborts the whole parse; there is no recovery.
//!
//! # Example
//!
//! ```
//! use spatialdump::dump::parse_tree_dump;
//!
//! let text = "2\n3\n(0,0)(10,10)(20,20)\n((0,0)(10,10))((10,10)(20,20))\n";
//! let dump = parse_tree_dump(text.as_bytes()).unwrap();
//!
//! assert_eq!(dump.points.len(), 3);
//! assert_eq!(dump.lines.len(), 2);
//! ```

mod error;
pub mod grammar;
pub mod group;
mod reader;
pub mod token;
mod types;

pub use error::{DumpError, DumpResult, EXCERPT_LEN};
pub use group::{scan_groups, Group, GroupKind, GroupScanner, Item, SectionEnd, MAX_DEPTH};
pub use reader::{
    detect_dialect, Detected, LeafDumpReader, Section, TreeDumpReader, TreeHeader,
};
pub use token::{Token, TokenKind, Tokenizer};
pub use types::{Dialect, Dump, Leaf, LeafDump, LineSegment, Rect, TreeDump};

use std::io::BufRead;

/// Parses a complete tree dump.
pub fn parse_tree_dump<R: BufRead>(reader: R) -> DumpResult<TreeDump> {
    read_tree(TreeDumpReader::new(reader))
}

/// Parses a complete leaf dump.
pub fn parse_leaf_dump<R: BufRead>(reader: R) -> DumpResult<LeafDump> {
    read_leaves(LeafDumpReader::new(reader))
}

/// Parses a dump of the given dialect, sniffing it when `None`.
pub fn parse_dump<R: BufRead>(mut reader: R, dialect: Option<Dialect>) -> DumpResult<Dump> {
    let detected = match dialect {
        Some(dialect) => Detected { dialect, offset: 0 },
        None => detect_dialect(&mut reader).map_err(|source| DumpError::Io { offset: 0, source })?,
    };
    match detected.dialect {
        Dialect::Tree => {
            read_tree(TreeDumpReader::starting_at(reader, detected.offset)).map(Dump::Tree)
        }
        Dialect::Leaves => {
            read_leaves(LeafDumpReader::starting_at(reader, detected.offset)).map(Dump::Leaves)
        }
    }
}

fn read_tree<R: BufRead>(mut reader: TreeDumpReader<R>) -> DumpResult<TreeDump> {
    let header = reader.read_header()?;
    let points = reader.read_points()?;
    let lines = reader.read_lines()?;
    reader.finish()?;

    Ok(TreeDump {
        depth: header.depth,
        leaf_count: header.leaf_count,
        points,
        lines,
    })
}

fn read_leaves<R: BufRead>(reader: LeafDumpReader<R>) -> DumpResult<LeafDump> {
    let leaves = reader.collect::<DumpResult<Vec<_>>>()?;
    Ok(LeafDump::new(leaves))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::PlanarPoint;

    const SCENARIO: &str = "2\n3\n(0,0)(10,10)(20,20)\n((0,0)(10,10))((10,10)(20,20))\n";

    #[test]
    fn test_scenario_tree_dump() {
        let dump = parse_tree_dump(SCENARIO.as_bytes()).unwrap();

        assert_eq!(dump.depth, 2);
        assert_eq!(dump.leaf_count, 3);
        assert_eq!(
            dump.points,
            vec![
                PlanarPoint::new(0, 0),
                PlanarPoint::new(10, 10),
                PlanarPoint::new(20, 20)
            ]
        );
        assert_eq!(
            dump.lines,
            vec![
                LineSegment::new(PlanarPoint::new(0, 0), PlanarPoint::new(10, 10)),
                LineSegment::new(PlanarPoint::new(10, 10), PlanarPoint::new(20, 20)),
            ]
        );
    }

    #[test]
    fn test_tree_dump_display_round_trip() {
        let dump = parse_tree_dump(SCENARIO.as_bytes()).unwrap();
        assert_eq!(dump.to_string(), SCENARIO);
    }

    #[test]
    fn test_engine_leaf_format() {
        let text = "L(R(100, 200, 300, 400), R(-1, -2, 3, 4), ) L(R(5, 5, 6, 6), ) ";
        let dump = parse_leaf_dump(text.as_bytes()).unwrap();

        assert_eq!(dump.leaves.len(), 2);
        assert_eq!(dump.leaves[0].rects[1], Rect::new(-1, -2, 3, 4));
        assert_eq!(dump.rect_count(), 3);
    }

    #[test]
    fn test_rect_after_closed_leaf_joins_it() {
        let text = "L(R(0, 0, 1, 1), ) R(2, 2, 3, 3) L(R(4, 4, 5, 5), ) ";
        let dump = parse_leaf_dump(text.as_bytes()).unwrap();

        assert_eq!(dump.leaves.len(), 2);
        assert_eq!(dump.leaves[0].rects.len(), 2);
        assert_eq!(dump.leaves[0].rects[1], Rect::new(2, 2, 3, 3));
    }

    #[test]
    fn test_empty_leaf_dump() {
        assert!(parse_leaf_dump("".as_bytes()).unwrap().leaves.is_empty());
    }

    #[test]
    fn test_truncated_point_list_fails() {
        // Unmatched open with a malformed trailing tuple
        let text = "2\n3\n(1,2)(3,";
        let err = parse_tree_dump(text.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DumpError::UnbalancedDelimiter { .. } | DumpError::MalformedTuple { .. }
        ));
    }

    #[test]
    fn test_truncated_bare_point_run_fails() {
        let err = scan_groups("(1,2)(3,".as_bytes()).unwrap_err();
        assert!(matches!(err, DumpError::UnbalancedDelimiter { offset: 5, .. }));
    }

    #[test]
    fn test_headerless_truncated_points_fail_whole_file() {
        let err = parse_dump("(1,2)(3,".as_bytes(), None).unwrap_err();
        assert!(matches!(
            err,
            DumpError::UnbalancedDelimiter { .. } | DumpError::MalformedTuple { .. }
        ));
    }

    #[test]
    fn test_parse_dump_sniffs_dialect() {
        let tree = parse_dump(SCENARIO.as_bytes(), None).unwrap();
        let leaves = parse_dump("L(R(0, 0, 1, 1), ) ".as_bytes(), None).unwrap();

        assert_eq!(tree.dialect(), Dialect::Tree);
        assert_eq!(leaves.dialect(), Dialect::Leaves);
    }

    #[test]
    fn test_parse_dump_respects_override() {
        let err = parse_dump("L(R(0, 0, 1, 1), ) ".as_bytes(), Some(Dialect::Tree)).unwrap_err();
        assert!(matches!(err, DumpError::MalformedTuple { offset: 0, .. }));
    }

    #[test]
    fn test_small_read_buffer_gives_same_result() {
        let reader = std::io::BufReader::with_capacity(3, SCENARIO.as_bytes());
        let streamed = parse_tree_dump(reader).unwrap();
        let whole = parse_tree_dump(SCENARIO.as_bytes()).unwrap();
        assert_eq!(streamed, whole);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn rect() -> impl Strategy<Value = Rect> {
            (
                -1_000_000i64..1_000_000,
                -1_000_000i64..1_000_000,
                -1_000_000i64..1_000_000,
                -1_000_000i64..1_000_000,
            )
                .prop_map(|(x0, y0, x1, y1)| Rect::new(x0, y0, x1, y1))
        }

        fn point() -> impl Strategy<Value = PlanarPoint> {
            (any::<i32>(), any::<i32>()).prop_map(|(x, y)| PlanarPoint::new(x as i64, y as i64))
        }

        proptest! {
            #[test]
            fn test_leaf_dump_round_trip(
                leaves in prop::collection::vec(prop::collection::vec(rect(), 0..6), 0..20)
            ) {
                let dump = LeafDump::new(leaves.into_iter().map(Leaf::new).collect());
                let text = dump.to_string();

                let parsed = parse_leaf_dump(text.as_bytes()).unwrap();
                prop_assert_eq!(parsed, dump);
            }

            #[test]
            fn test_tree_dump_counts(
                points in prop::collection::vec(point(), 0..50),
                pairs in prop::collection::vec((point(), point()), 0..50),
            ) {
                let dump = TreeDump {
                    depth: 7,
                    leaf_count: 11,
                    points,
                    lines: pairs.into_iter().map(|(a, b)| LineSegment::new(a, b)).collect(),
                };

                let parsed = parse_tree_dump(dump.to_string().as_bytes()).unwrap();
                prop_assert_eq!(parsed.points.len(), dump.points.len());
                prop_assert_eq!(parsed.lines.len(), dump.lines.len());
                prop_assert_eq!(parsed, dump);
            }

            #[test]
            fn test_cut_point_list_never_returns_partial(
                points in prop::collection::vec(point(), 1..20),
                cut in 1usize..1000,
            ) {
                let body: String = points.iter().map(|p| p.to_string()).collect();
                // Cut strictly inside the last group so it stays open
                let last_open = body.rfind('(').unwrap_or(0);
                let end = last_open + 1 + cut % (body.len() - last_open - 1);
                let text = format!("1\n1\n{}", &body[..end]);

                let result = parse_tree_dump(text.as_bytes());
                let rejected = matches!(
                    result,
                    Err(DumpError::UnbalancedDelimiter { .. }) | Err(DumpError::MalformedTuple { .. })
                );
                prop_assert!(rejected);
            }
        }
    }
}
