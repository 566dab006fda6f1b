//! Rasterization of dump geometry.
//!
//! A [`Canvas`] owns one tiny-skia pixmap on a white background. Geometry is
//! mapped through a [`ViewTransform`] in `f64` and drawn in device space:
//!
//! - points as small translucent black discs
//! - split lines as opaque red strokes
//! - leaf rectangles as translucent red fills, later leaves on top
//!
//! The finished raster is flattened to RGB and written as PNG.

mod error;
mod png;
mod view;

pub use error::RenderError;
pub use png::{encode_png, write_png};
pub use view::ViewTransform;

use std::path::Path;

use image::{Rgb, RgbImage};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};
use tracing::debug;

use crate::coord::PlanarPoint;
use crate::dump::{Leaf, LineSegment};

/// Reference raster width.
pub const DEFAULT_WIDTH: u32 = 512;

/// Reference raster height.
pub const DEFAULT_HEIGHT: u32 = 512;

/// Sizes and colors for each kind of geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    /// Disc radius in pixels
    pub point_radius: f32,
    pub point_color: Color,
    /// Stroke width in pixels
    pub line_width: f32,
    pub line_color: Color,
    pub rect_color: Color,
}

impl Style {
    /// Builds the reference palette with custom sizes and alphas.
    pub fn new(
        point_radius: f32,
        point_alpha: f32,
        line_width: f32,
        rect_alpha: f32,
    ) -> Result<Self, RenderError> {
        if !(point_radius.is_finite() && point_radius > 0.0) {
            return Err(RenderError::InvalidStyle(format!(
                "point radius {} must be positive",
                point_radius
            )));
        }
        if !(line_width.is_finite() && line_width > 0.0) {
            return Err(RenderError::InvalidStyle(format!(
                "line width {} must be positive",
                line_width
            )));
        }
        let alpha = |name: &str, a: f32| {
            if (0.0..=1.0).contains(&a) {
                Ok(a)
            } else {
                Err(RenderError::InvalidStyle(format!(
                    "{} {} must be within 0..=1",
                    name, a
                )))
            }
        };

        Ok(Self {
            point_radius,
            point_color: tinted(0, 0, 0, alpha("point alpha", point_alpha)?),
            line_width,
            line_color: tinted(255, 0, 0, 1.0),
            rect_color: tinted(255, 0, 0, alpha("rect alpha", rect_alpha)?),
        })
    }
}

fn tinted(r: u8, g: u8, b: u8, alpha: f32) -> Color {
    let mut color = Color::from_rgba8(r, g, b, 255);
    color.set_alpha(alpha);
    color
}

impl Default for Style {
    fn default() -> Self {
        Self {
            point_radius: 1.0,
            point_color: tinted(0, 0, 0, 0.2),
            line_width: 2.0,
            line_color: tinted(255, 0, 0, 1.0),
            rect_color: tinted(255, 0, 0, 0.1),
        }
    }
}

fn solid(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

/// A fixed-size raster surface with a view transform.
pub struct Canvas {
    pixmap: Pixmap,
    view: ViewTransform,
    style: Style,
}

impl Canvas {
    /// Allocates a white `width`×`height` canvas.
    pub fn new(width: u32, height: u32, view: ViewTransform, style: Style) -> Result<Self, RenderError> {
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RenderError::InvalidDimensions { width, height })?;
        pixmap.fill(Color::WHITE);
        Ok(Self {
            pixmap,
            view,
            style,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    /// Draws each point as a filled disc.
    ///
    /// Discs that cannot touch the raster are skipped.
    pub fn draw_points<'a>(&mut self, points: impl IntoIterator<Item = &'a PlanarPoint>) {
        let paint = solid(self.style.point_color);
        let r = self.style.point_radius;
        let (w, h) = (self.width() as f32, self.height() as f32);
        let mut drawn = 0usize;

        for point in points {
            let (x, y) = self.view.apply_point(*point);
            if x < -r || y < -r || x > w + r || y > h + r {
                continue;
            }
            if let Some(path) = PathBuilder::from_circle(x, y, r) {
                self.pixmap
                    .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                drawn += 1;
            }
        }
        debug!(drawn, "Drew points");
    }

    /// Strokes each line segment.
    pub fn draw_lines<'a>(&mut self, lines: impl IntoIterator<Item = &'a LineSegment>) {
        let paint = solid(self.style.line_color);
        let stroke = Stroke {
            width: self.style.line_width,
            ..Default::default()
        };
        let mut drawn = 0usize;

        for line in lines {
            let (x1, y1) = self.view.apply_point(line.p1);
            let (x2, y2) = self.view.apply_point(line.p2);

            let mut builder = PathBuilder::new();
            builder.move_to(x1, y1);
            builder.line_to(x2, y2);
            if let Some(path) = builder.finish() {
                self.pixmap
                    .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
                drawn += 1;
            }
        }
        debug!(drawn, "Drew lines");
    }

    /// Fills every rectangle of every leaf, in order.
    ///
    /// Inverted and zero-area rectangles cover nothing and are skipped as-is.
    /// Returns how many were skipped.
    pub fn draw_leaves<'a>(&mut self, leaves: impl IntoIterator<Item = &'a Leaf>) -> usize {
        let paint = solid(self.style.rect_color);
        let mut drawn = 0usize;
        let mut skipped = 0usize;

        for rect in leaves.into_iter().flat_map(|leaf| leaf.rects.iter()) {
            if rect.is_empty() {
                skipped += 1;
                continue;
            }
            let (ax, ay) = self.view.apply(rect.x0, rect.y0);
            let (bx, by) = self.view.apply(rect.x1, rect.y1);

            // A flipped view axis swaps the device edges, not the data
            let device = tiny_skia::Rect::from_ltrb(ax.min(bx), ay.min(by), ax.max(bx), ay.max(by));
            if let Some(device) = device {
                self.pixmap
                    .fill_rect(device, &paint, Transform::identity(), None);
                drawn += 1;
            }
        }
        debug!(drawn, skipped, "Drew leaf rectangles");
        skipped
    }

    /// RGB color at a pixel, if inside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue()]
        })
    }

    /// Flattens the raster to RGB.
    ///
    /// The background is opaque, so every pixel ends fully opaque and the
    /// alpha channel carries no information.
    pub fn to_rgb_image(&self) -> RgbImage {
        let mut image = RgbImage::new(self.width(), self.height());
        for (dst, src) in image.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgb([c.red(), c.green(), c.blue()]);
        }
        image
    }

    /// Encodes the raster as PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        encode_png(&self.to_rgb_image())
    }

    /// Writes the raster to `path` as PNG, replacing it atomically.
    pub fn save_png(&self, path: &Path) -> Result<(), RenderError> {
        write_png(&self.to_rgb_image(), path)
    }
}
