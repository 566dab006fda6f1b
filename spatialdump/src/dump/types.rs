//! Geometry summaries read from dumps.
//!
//! `Display` implementations write the same text the engine emits, which
//! keeps fixtures readable and lets a parsed dump be written back out.

use std::fmt;
use std::str::FromStr;

use crate::coord::PlanarPoint;

/// Axis-aligned rectangle in the log's native units.
///
/// `x0 <= x1` and `y0 <= y1` is expected but not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl Rect {
    pub const fn new(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// True for inverted or zero-area rectangles, which cover nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R({}, {}, {}, {})", self.x0, self.y0, self.x1, self.y1)
    }
}

/// The bounding rectangles owned by one leaf node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Leaf {
    pub rects: Vec<Rect>,
}

impl Leaf {
    pub fn new(rects: Vec<Rect>) -> Self {
        Self { rects }
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("L(")?;
        for rect in &self.rects {
            write!(f, "{}, ", rect)?;
        }
        f.write_str(")")
    }
}

/// All leaves of a leaf dump, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeafDump {
    pub leaves: Vec<Leaf>,
}

impl LeafDump {
    pub fn new(leaves: Vec<Leaf>) -> Self {
        Self { leaves }
    }

    /// Total number of rectangles across all leaves.
    pub fn rect_count(&self) -> usize {
        self.leaves.iter().map(|l| l.rects.len()).sum()
    }
}

impl fmt::Display for LeafDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for leaf in &self.leaves {
            write!(f, "{} ", leaf)?;
        }
        Ok(())
    }
}

/// A splitting line between two points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineSegment {
    pub p1: PlanarPoint,
    pub p2: PlanarPoint,
}

impl LineSegment {
    pub const fn new(p1: PlanarPoint, p2: PlanarPoint) -> Self {
        Self { p1, p2 }
    }
}

impl fmt::Display for LineSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}{})", self.p1, self.p2)
    }
}

/// A point/line tree dump: two header values and two geometry bodies.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeDump {
    pub depth: i64,
    pub leaf_count: i64,
    pub points: Vec<PlanarPoint>,
    pub lines: Vec<LineSegment>,
}

impl fmt::Display for TreeDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.depth)?;
        writeln!(f, "{}", self.leaf_count)?;
        for point in &self.points {
            write!(f, "{}", point)?;
        }
        writeln!(f)?;
        for line in &self.lines {
            write!(f, "{}", line)?;
        }
        writeln!(f)
    }
}

/// Which of the two dump formats a file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Header lines, then a point list and a line list
    Tree,
    /// A flat run of `L(...)` leaves
    Leaves,
}

impl Dialect {
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Tree => "tree",
            Dialect::Leaves => "leaves",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tree" => Ok(Dialect::Tree),
            "leaves" | "leaf" => Ok(Dialect::Leaves),
            other => Err(format!("unknown dialect '{}'", other)),
        }
    }
}

/// A parsed dump of either dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dump {
    Tree(TreeDump),
    Leaves(LeafDump),
}

impl Dump {
    pub fn dialect(&self) -> Dialect {
        match self {
            Dump::Tree(_) => Dialect::Tree,
            Dump::Leaves(_) => Dialect::Leaves,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_emptiness() {
        assert!(!Rect::new(0, 0, 1, 1).is_empty());
        assert!(Rect::new(0, 0, 0, 5).is_empty());
        assert!(Rect::new(5, 0, 1, 5).is_empty());
        assert!(Rect::new(0, 5, 5, 1).is_empty());
    }

    #[test]
    fn test_leaf_display_matches_engine_format() {
        let leaf = Leaf::new(vec![Rect::new(1, 2, 3, 4), Rect::new(-5, 6, 7, 8)]);
        assert_eq!(leaf.to_string(), "L(R(1, 2, 3, 4), R(-5, 6, 7, 8), )");
    }

    #[test]
    fn test_leaf_dump_display() {
        let dump = LeafDump::new(vec![Leaf::new(vec![Rect::new(0, 0, 1, 1)]), Leaf::default()]);
        assert_eq!(dump.to_string(), "L(R(0, 0, 1, 1), ) L() ");
        assert_eq!(dump.rect_count(), 1);
    }

    #[test]
    fn test_tree_dump_display() {
        let dump = TreeDump {
            depth: 2,
            leaf_count: 3,
            points: vec![PlanarPoint::new(0, 0), PlanarPoint::new(10, 10)],
            lines: vec![LineSegment::new(
                PlanarPoint::new(0, 0),
                PlanarPoint::new(10, 10),
            )],
        };
        assert_eq!(dump.to_string(), "2\n3\n(0,0)(10,10)\n((0,0)(10,10))\n");
    }

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("tree".parse::<Dialect>(), Ok(Dialect::Tree));
        assert_eq!(" Leaves ".parse::<Dialect>(), Ok(Dialect::Leaves));
        assert!("rtree".parse::<Dialect>().is_err());
    }
}
