//! Shape checks that turn scanned groups into geometry.

use super::error::{DumpError, DumpResult};
use super::group::{Group, GroupKind, Item};
use super::types::{Leaf, LineSegment, Rect};
use crate::coord::PlanarPoint;

/// Splits a group's items on separators and parses each field as an integer.
///
/// Every field must be exactly one scalar; `expected` is the required arity.
fn integer_fields(group: &Group, expected: usize) -> DumpResult<Vec<i64>> {
    let mut fields: Vec<Vec<&Item>> = vec![Vec::new()];
    for item in &group.items {
        match item {
            Item::Separator => fields.push(Vec::new()),
            other => {
                if let Some(field) = fields.last_mut() {
                    field.push(other);
                }
            }
        }
    }

    if fields.len() != expected {
        return Err(DumpError::malformed(
            group.offset,
            &group.to_string(),
            format!("expected {} fields, found {}", expected, fields.len()),
        ));
    }

    let mut values = Vec::with_capacity(expected);
    for (index, field) in fields.iter().enumerate() {
        let value = match field.as_slice() {
            [Item::Scalar { text, offset }] => text.parse::<i64>().map_err(|_| {
                DumpError::malformed(
                    *offset,
                    &group.to_string(),
                    format!("field {} '{}' is not an integer", index + 1, text),
                )
            })?,
            [] => {
                return Err(DumpError::malformed(
                    group.offset,
                    &group.to_string(),
                    format!("field {} is empty", index + 1),
                ))
            }
            _ => {
                return Err(DumpError::malformed(
                    group.offset,
                    &group.to_string(),
                    format!("field {} is not a single integer", index + 1),
                ))
            }
        };
        values.push(value);
    }
    Ok(values)
}

fn expect_kind(group: &Group, kind: GroupKind, what: &str) -> DumpResult<()> {
    if group.kind != kind {
        return Err(DumpError::malformed(
            group.offset,
            &group.to_string(),
            format!("expected {}", what),
        ));
    }
    Ok(())
}

/// `"(" integer "," integer ")"`
pub fn point_from_group(group: &Group) -> DumpResult<PlanarPoint> {
    expect_kind(group, GroupKind::Plain, "a point '(x,y)'")?;
    let values = integer_fields(group, 2)?;
    Ok(PlanarPoint::new(values[0], values[1]))
}

/// `"(" point point ")"`
pub fn line_from_group(group: &Group) -> DumpResult<LineSegment> {
    expect_kind(group, GroupKind::Plain, "a line '((x,y)(x,y))'")?;

    let mut points = Vec::with_capacity(2);
    for element in group.elements() {
        match element {
            Item::Group(inner) => points.push(point_from_group(inner)?),
            _ => {
                return Err(DumpError::malformed(
                    group.offset,
                    &group.to_string(),
                    "a line holds only point groups",
                ))
            }
        }
    }

    match points.as_slice() {
        [p1, p2] => Ok(LineSegment::new(*p1, *p2)),
        _ => Err(DumpError::malformed(
            group.offset,
            &group.to_string(),
            format!("expected 2 points, found {}", points.len()),
        )),
    }
}

/// `"R(" integer "," integer "," integer "," integer ")"`
pub fn rect_from_group(group: &Group) -> DumpResult<Rect> {
    expect_kind(group, GroupKind::Rect, "a rectangle 'R(x0, y0, x1, y1)'")?;
    let v = integer_fields(group, 4)?;
    Ok(Rect::new(v[0], v[1], v[2], v[3]))
}

/// `"L(" rect* ")"`; separators between rectangles are ignored.
pub fn leaf_from_group(group: &Group) -> DumpResult<Leaf> {
    expect_kind(group, GroupKind::Leaf, "a leaf 'L(...)'")?;

    let rects = group
        .elements()
        .map(|element| match element {
            Item::Group(inner) => rect_from_group(inner),
            _ => Err(DumpError::malformed(
                group.offset,
                &group.to_string(),
                "a leaf holds only rectangles",
            )),
        })
        .collect::<DumpResult<Vec<_>>>()?;

    Ok(Leaf::new(rects))
}
