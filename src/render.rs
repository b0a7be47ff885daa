//! Cursor render state and render synchronisation.

use std::collections::HashSet;
use std::path::Path;

use glam::{Vec2, Vec3};
use image::{Rgba, RgbaImage};
use tracing::warn;

use crate::geometry::BrushCursorGeometry;
use crate::segmentation::Color;
use crate::viewport::{DrawStyle, RenderRequester, SvgDrawingHelper, Viewport};

pub const BRUSH_CURSOR_UID: &str = "brush-cursor";
const CIRCLE_UID: &str = "0";

/// Everything needed to draw the cursor besides its geometry
#[derive(Debug, Clone, PartialEq)]
pub struct CursorMetadata {
    pub view_plane_normal: Vec3,
    pub view_up: Vec3,
    pub frame_of_reference_uid: String,
    pub tool_name: String,
    pub segment_color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrushCursor {
    pub metadata: CursorMetadata,
    pub geometry: BrushCursorGeometry,
}

/// Screen-space circle of the cursor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorCircle {
    pub center: Vec2,
    pub radius: f32,
}

impl CursorCircle {
    /// Circle through the projected bottom and top cursor points, snapped to
    /// whole pixels
    pub fn from_canvas_points(bottom: Vec2, top: Vec2) -> Self {
        let center = ((bottom + top) / 2.0).floor();
        Self {
            center,
            radius: (bottom.y - center.y).abs(),
        }
    }
}

pub fn css_rgb(color: Color) -> String {
    format!("rgb({},{},{})", color[0], color[1], color[2])
}

/// Draw `cursor` on `viewport`. Returns `false` if the viewport lost its
/// rendering engine, in which case nothing is drawn.
pub fn draw_brush_cursor(
    viewport: &dyn Viewport,
    svg: &mut dyn SvgDrawingHelper,
    cursor: &BrushCursor,
) -> bool {
    let bottom = viewport.world_to_canvas(cursor.geometry.bottom());
    let top = viewport.world_to_canvas(cursor.geometry.top());
    let circle = CursorCircle::from_canvas_points(bottom, top);

    if !viewport.has_rendering_engine() {
        warn!(viewport = viewport.id(), "Rendering engine has been destroyed");
        return false;
    }

    let style = DrawStyle {
        color: css_rgb(cursor.metadata.segment_color),
        line_width: 1.0,
    };
    svg.draw_circle(BRUSH_CURSOR_UID, CIRCLE_UID, circle.center, circle.radius, &style);
    true
}

/// Request an annotation render of each viewport in `viewport_ids` once, in
/// the order given.
pub fn trigger_annotation_render_for_viewport_ids(
    requester: &mut dyn RenderRequester,
    viewport_ids: &[String],
) {
    let mut seen = HashSet::new();
    for viewport_id in viewport_ids {
        if seen.insert(viewport_id.as_str()) {
            requester.request_annotation_render(viewport_id);
        }
    }
}

/// Overlay that rasterises primitives into an RGBA image, for headless hosts
/// and snapshots.
#[derive(Debug, Clone)]
pub struct RasterOverlay {
    pub image: RgbaImage,
}

impl RasterOverlay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Write the overlay to `path`, format chosen by extension
    pub fn save(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        self.image.save(path)
    }

    fn put(&mut self, x: i64, y: i64, color: Rgba<u8>) {
        if x >= 0 && y >= 0 && x < self.image.width() as i64 && y < self.image.height() as i64 {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Parse `rgb(r,g,b)`, falling back to white
fn parse_css_rgb(color: &str) -> Rgba<u8> {
    let channels: Vec<u8> = color
        .trim()
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
        .map(|body| {
            body.split(',')
                .filter_map(|channel| channel.trim().parse().ok())
                .collect()
        })
        .unwrap_or_default();

    match channels.as_slice() {
        [r, g, b] => Rgba([*r, *g, *b, 255]),
        _ => Rgba([255, 255, 255, 255]),
    }
}

impl SvgDrawingHelper for RasterOverlay {
    /// Midpoint circle outline
    fn draw_circle(
        &mut self,
        _annotation_uid: &str,
        _circle_uid: &str,
        center: Vec2,
        radius: f32,
        style: &DrawStyle,
    ) {
        let color = parse_css_rgb(&style.color);
        let (cx, cy) = (center.x.round() as i64, center.y.round() as i64);
        let r = radius.round() as i64;
        if r <= 0 {
            self.put(cx, cy, color);
            return;
        }

        let (mut x, mut y, mut err) = (r, 0_i64, 1 - r);
        while x >= y {
            let octants = [
                (x, y),
                (y, x),
                (-y, x),
                (-x, y),
                (-x, -y),
                (-y, -x),
                (y, -x),
                (x, -y),
            ];
            for (dx, dy) in octants {
                self.put(cx + dx, cy + dy, color);
            }
            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingRequester(Vec<String>);

    impl RenderRequester for RecordingRequester {
        fn request_annotation_render(&mut self, viewport_id: &str) {
            self.0.push(viewport_id.to_string());
        }
    }

    #[test]
    fn test_trigger_render_requests_each_viewport_once() {
        let mut requester = RecordingRequester::default();
        let ids = ["axial", "sagittal", "axial"].map(String::from);

        trigger_annotation_render_for_viewport_ids(&mut requester, &ids);

        assert_eq!(requester.0, vec!["axial".to_string(), "sagittal".to_string()]);
    }

    #[test]
    fn test_cursor_circle_from_canvas_points() {
        let circle =
            CursorCircle::from_canvas_points(Vec2::new(50.0, 70.5), Vec2::new(50.0, 30.0));
        assert_eq!(circle.center, Vec2::new(50.0, 50.0));
        assert_eq!(circle.radius, 20.5);
    }

    #[test]
    fn test_css_colors() {
        assert_eq!(css_rgb([221, 84, 84, 255]), "rgb(221,84,84)");
        assert_eq!(parse_css_rgb("rgb(221, 84, 84)"), Rgba([221, 84, 84, 255]));
        assert_eq!(parse_css_rgb("red"), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_raster_overlay_draws_outline() {
        let mut overlay = RasterOverlay::new(32, 32);
        let style = DrawStyle {
            color: "rgb(10,20,30)".to_string(),
            line_width: 1.0,
        };
        overlay.draw_circle("a", "0", Vec2::new(16.0, 16.0), 5.0, &style);

        let ink = Rgba([10, 20, 30, 255]);
        assert_eq!(*overlay.image.get_pixel(21, 16), ink);
        assert_eq!(*overlay.image.get_pixel(16, 11), ink);
        assert_eq!(*overlay.image.get_pixel(16, 16), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_raster_overlay_clips_to_image() {
        let mut overlay = RasterOverlay::new(8, 8);
        let style = DrawStyle {
            color: "rgb(1,2,3)".to_string(),
            line_width: 1.0,
        };
        overlay.draw_circle("a", "0", Vec2::new(0.0, 0.0), 20.0, &style);
        assert!(overlay.image.pixels().all(|p| *p == Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn test_raster_overlay_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cursor.png");
        let mut overlay = RasterOverlay::new(16, 16);
        let style = DrawStyle {
            color: "rgb(200,0,0)".to_string(),
            line_width: 1.0,
        };
        overlay.draw_circle("a", "0", Vec2::new(8.0, 8.0), 4.0, &style);

        overlay.save(&path).unwrap();

        let reloaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(reloaded, overlay.image);
    }
}
