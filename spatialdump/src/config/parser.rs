//! INI parsing: maps `[section] key` pairs onto [`ConfigFile`] fields.
//!
//! Starts from `ConfigFile::default()` and overlays whatever keys are set.
//! Unknown sections and keys are ignored.

use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::coord::{TileRange, MAX_ZOOM};

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parses `key` from `section` when present, leaving `slot` untouched otherwise.
fn overlay<T: FromStr>(
    props: &Properties,
    section: &str,
    key: &str,
    reason: &str,
    accept: impl Fn(&T) -> bool,
    slot: &mut T,
) -> Result<(), ConfigFileError> {
    if let Some(raw) = props.get(key) {
        let v = raw.trim();
        match v.parse::<T>() {
            Ok(parsed) if accept(&parsed) => *slot = parsed,
            _ => return Err(invalid(section, key, v, reason)),
        }
    }
    Ok(())
}

fn positive_f64(v: &f64) -> bool {
    v.is_finite() && *v > 0.0
}

fn positive_f32(v: &f32) -> bool {
    v.is_finite() && *v > 0.0
}

fn unit_f32(v: &f32) -> bool {
    (0.0..=1.0).contains(v)
}

fn parse_view(props: &Properties, section: &str, range: &mut TileRange) -> Result<(), ConfigFileError> {
    const TILE: &str = "must be a non-negative integer tile index";
    let any = |_: &u32| true;

    overlay(props, section, "min_x", TILE, any, &mut range.min.x)?;
    overlay(props, section, "min_y", TILE, any, &mut range.min.y)?;
    overlay(props, section, "max_x", TILE, any, &mut range.max.x)?;
    overlay(props, section, "max_y", TILE, any, &mut range.max.y)?;

    let mut zoom = range.min.zoom;
    overlay(
        props,
        section,
        "zoom",
        &format!("must be an integer zoom level 0..={}", MAX_ZOOM),
        |z: &u8| *z <= MAX_ZOOM,
        &mut zoom,
    )?;
    range.min.zoom = zoom;
    range.max.zoom = zoom;
    Ok(())
}

pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [projection] section
    if let Some(section) = ini.section(Some("projection")) {
        const REASON: &str = "must be a positive number";
        let p = &mut config.projection;
        overlay(section, "projection", "radius", REASON, positive_f64, &mut p.radius)?;
        overlay(section, "projection", "factor", REASON, positive_f64, &mut p.factor)?;

        // Projected corners are stored as i64
        if p.norm() > i64::MAX as f64 {
            let key = if section.contains_key("factor") { "factor" } else { "radius" };
            let value = section.get(key).unwrap_or_default();
            return Err(invalid(
                "projection",
                key,
                value.trim(),
                "radius × factor / 2 exceeds the planar coordinate range",
            ));
        }
    }

    // [canvas] section
    if let Some(section) = ini.section(Some("canvas")) {
        const REASON: &str = "must be a positive integer (pixels)";
        let c = &mut config.canvas;
        overlay(section, "canvas", "width", REASON, |w: &u32| *w > 0, &mut c.width)?;
        overlay(section, "canvas", "height", REASON, |h: &u32| *h > 0, &mut c.height)?;
    }

    // [tree_view] and [leaf_view] sections
    if let Some(section) = ini.section(Some("tree_view")) {
        parse_view(section, "tree_view", &mut config.tree_view)?;
    }
    if let Some(section) = ini.section(Some("leaf_view")) {
        parse_view(section, "leaf_view", &mut config.leaf_view)?;
    }

    // [style] section
    if let Some(section) = ini.section(Some("style")) {
        const SIZE: &str = "must be a positive number (pixels)";
        const ALPHA: &str = "must be a number between 0 and 1";
        let s = &mut config.style;
        overlay(section, "style", "point_radius", SIZE, positive_f32, &mut s.point_radius)?;
        overlay(section, "style", "point_alpha", ALPHA, unit_f32, &mut s.point_alpha)?;
        overlay(section, "style", "line_width", SIZE, positive_f32, &mut s.line_width)?;
        overlay(section, "style", "rect_alpha", ALPHA, unit_f32, &mut s.rect_alpha)?;
    }

    Ok(config)
}
