//! Interfaces the brush expects from the host viewer.

use glam::{Vec2, Vec3};

use crate::enums::PointerEventKind;
use crate::geometry::Camera;

/// Display surface a viewport renders into. The brush subscribes to pointer
/// events on it while a stroke is in progress.
pub trait Element {
    fn add_event_listener(&mut self, kind: PointerEventKind);
    fn remove_event_listener(&mut self, kind: PointerEventKind);
    fn hide_cursor(&mut self);
    fn reset_cursor(&mut self);
}

pub trait Viewport {
    fn id(&self) -> &str;
    fn camera(&self) -> Camera;
    fn canvas_to_world(&self, point: Vec2) -> Vec3;
    fn world_to_canvas(&self, point: Vec3) -> Vec2;
    /// Image shown by a stack viewport, `None` for volume viewports
    fn current_image_id(&self) -> Option<&str>;
    /// Ids of the volumes rendered by a volume viewport, in actor order
    fn actors(&self) -> Vec<String>;
    fn frame_of_reference_uid(&self) -> &str;
    /// `false` once the rendering engine behind the viewport has been torn down
    fn has_rendering_engine(&self) -> bool;
    fn element_mut(&mut self) -> &mut dyn Element;
}

/// Receives annotation render requests for individual viewports.
pub trait RenderRequester {
    fn request_annotation_render(&mut self, viewport_id: &str);
}

/// Style of an overlay primitive
#[derive(Debug, Clone, PartialEq)]
pub struct DrawStyle {
    /// CSS colour, e.g. `rgb(221,84,84)`
    pub color: String,
    pub line_width: f32,
}

/// Overlay drawing surface of one viewport.
pub trait SvgDrawingHelper {
    fn draw_circle(
        &mut self,
        annotation_uid: &str,
        circle_uid: &str,
        center: Vec2,
        radius: f32,
        style: &DrawStyle,
    );
}
