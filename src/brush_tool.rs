//! Pointer-driven brush tool.
//!
//! The tool is a state machine over [`BrushState`]. Hovering only moves the
//! cursor; a stroke starts on pointer-down, applies the active strategy on
//! every drag and once more on pointer-up, so the position the pointer was
//! released at is always committed even when drag events were coalesced.

use std::collections::BTreeSet;

use glam::Vec2;
use tracing::{debug, trace, warn};

use crate::config::BrushConfiguration;
use crate::context::{CursorContext, SegmentationContext};
use crate::enums::{BrushShape, PointerEventKind, ToolMode};
use crate::error::BrushError;
use crate::geometry::calculate_cursor;
use crate::render::{
    BrushCursor, CursorMetadata, draw_brush_cursor, trigger_annotation_render_for_viewport_ids,
};
use crate::segmentation::{Color, LabelmapRepresentation, SegmentationStore};
use crate::strategies::{EditTarget, OperationData, StrategyName};
use crate::viewport::{RenderRequester, SvgDrawingHelper, Viewport};
use crate::voxel_cache::{Label, VoxelCache};

pub const TOOL_NAME: &str = "Brush";

/// Events the tool listens to on the element while a stroke is in progress
const STROKE_EVENTS: [PointerEventKind; 3] = [
    PointerEventKind::Drag,
    PointerEventKind::Up,
    PointerEventKind::Click,
];

/// Collaborators a pointer event is handled against
pub struct ToolContext<'a> {
    pub viewport: &'a mut dyn Viewport,
    pub segmentations: &'a dyn SegmentationStore,
    pub voxels: &'a mut VoxelCache,
    pub renderer: &'a mut dyn RenderRequester,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    /// Pointer position on the canvas, in pixels
    pub canvas: Vec2,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, canvas: Vec2) -> Self {
        Self { kind, canvas }
    }
}

/// Cursor shown under the pointer
#[derive(Debug, Clone, PartialEq)]
pub struct HoverState {
    pub brush_cursor: BrushCursor,
    /// Kept so the geometry can be recomputed after an invalidation
    pub center_canvas: Vec2,
    pub segmentation_id: String,
    pub segmentation_representation_uid: String,
    pub segment_index: Label,
    pub segment_color: Color,
    pub viewport_ids_to_render: Vec<String>,
}

/// A stroke in progress
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub target: EditTarget,
    /// Locked segments when the stroke started
    pub segments_locked: BTreeSet<Label>,
    pub segmentation_representation_uid: String,
    pub viewport_id: String,
    /// Viewports that display the edited labelmap
    pub viewport_ids_to_render: Vec<String>,
    pub hover: HoverState,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum BrushState {
    #[default]
    Idle,
    Hovering(HoverState),
    Editing(EditSession),
}

#[derive(Debug)]
pub struct BrushTool {
    tool_group_id: String,
    mode: ToolMode,
    configuration: BrushConfiguration,
    /// Other viewports of the tool group that show the same segmentation
    viewport_ids: Vec<String>,
    state: BrushState,
    /// A stroke was abandoned by a mode change while its listeners were
    /// still attached to the element
    stale_listeners: bool,
}

impl BrushTool {
    pub fn new(tool_group_id: impl Into<String>, configuration: BrushConfiguration) -> Self {
        Self {
            tool_group_id: tool_group_id.into(),
            mode: ToolMode::default(),
            configuration,
            viewport_ids: Vec::new(),
            state: BrushState::Idle,
            stale_listeners: false,
        }
    }

    /// Viewports of the tool group that must be redrawn after an edit
    pub fn with_viewports(mut self, viewport_ids: impl IntoIterator<Item = String>) -> Self {
        self.viewport_ids = viewport_ids.into_iter().collect();
        self
    }

    pub fn tool_group_id(&self) -> &str {
        &self.tool_group_id
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn state(&self) -> &BrushState {
        &self.state
    }

    pub fn configuration(&self) -> &BrushConfiguration {
        &self.configuration
    }

    /// Configuration changes take effect on the next recomputed cursor and
    /// the next dispatch
    pub fn configuration_mut(&mut self) -> &mut BrushConfiguration {
        &mut self.configuration
    }

    pub fn hover(&self) -> Option<&HoverState> {
        match &self.state {
            BrushState::Idle => None,
            BrushState::Hovering(hover) => Some(hover),
            BrushState::Editing(session) => Some(&session.hover),
        }
    }

    fn hover_mut(&mut self) -> Option<&mut HoverState> {
        match &mut self.state {
            BrushState::Idle => None,
            BrushState::Hovering(hover) => Some(hover),
            BrushState::Editing(session) => Some(&mut session.hover),
        }
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        match &self.state {
            BrushState::Editing(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, BrushState::Editing(_))
    }

    /// Switch mode. Leaving `Active` drops the cursor and any stroke in
    /// progress without committing it.
    pub fn set_mode(&mut self, mode: ToolMode) {
        self.mode = mode;
        if mode == ToolMode::Active {
            return;
        }

        if let BrushState::Editing(session) = &self.state {
            debug!(viewport = %session.viewport_id, ?mode, "discarding brush stroke");
            self.stale_listeners = true;
        }
        self.state = BrushState::Idle;
    }

    pub fn set_brush_size(&mut self, brush_size: f32) -> Result<(), BrushError> {
        self.configuration.set_brush_size(brush_size)?;
        self.invalidate_brush_cursor();
        Ok(())
    }

    pub fn set_active_strategy(&mut self, name: StrategyName) -> Result<(), BrushError> {
        self.configuration.set_active_strategy(name)
    }

    /// Mark the cursor geometry stale so the next render recomputes it
    pub fn invalidate_brush_cursor(&mut self) {
        if let Some(hover) = self.hover_mut() {
            hover.brush_cursor.geometry.invalidated = true;
        }
    }

    /// Route `event` to its handler. Drag, up and click are only handled
    /// while a stroke is in progress. Returns `true` when the event was
    /// consumed and default pointer handling must be suppressed.
    pub fn handle(
        &mut self,
        ctx: &mut ToolContext<'_>,
        event: &PointerEvent,
    ) -> Result<bool, BrushError> {
        if self.stale_listeners {
            detach_stroke_listeners(ctx.viewport);
            self.stale_listeners = false;
        }

        match event.kind {
            PointerEventKind::Down => self.mouse_down(ctx, event.canvas),
            PointerEventKind::Move => {
                self.mouse_move(ctx, event.canvas);
                Ok(false)
            }
            PointerEventKind::Drag if self.is_editing() => {
                self.mouse_drag(ctx, event.canvas)?;
                Ok(true)
            }
            PointerEventKind::Up | PointerEventKind::Click if self.is_editing() => {
                self.mouse_up(ctx, event.canvas)?;
                Ok(true)
            }
            PointerEventKind::Drag | PointerEventKind::Up | PointerEventKind::Click => Ok(false),
        }
    }

    /// Start a stroke.
    ///
    /// Returns `Ok(false)` without starting one when the tool is not active,
    /// when the viewed stack image has no labelmap slice, or when a sphere
    /// strategy is selected for stack data.
    ///
    /// # Errors
    ///
    /// `NoActiveSegmentation` and `UnsupportedRepresentation` are returned
    /// before any listener is attached.
    pub fn mouse_down(
        &mut self,
        ctx: &mut ToolContext<'_>,
        canvas: Vec2,
    ) -> Result<bool, BrushError> {
        if self.mode != ToolMode::Active || self.is_editing() {
            return Ok(false);
        }

        let context = SegmentationContext::resolve(ctx.segmentations, &self.tool_group_id)?;
        let viewport_id = ctx.viewport.id().to_string();

        let target = match &context.labelmap {
            LabelmapRepresentation::Volume { volume_id } => EditTarget::Volume {
                volume_id: volume_id.clone(),
                referenced_volume_id: ctx.viewport.actors().into_iter().next(),
            },
            LabelmapRepresentation::Stack {
                image_id_reference_map,
            } => {
                let Some((image_id, labelmap_id)) = ctx
                    .viewport
                    .current_image_id()
                    .and_then(|image_id| image_id_reference_map.get_key_value(image_id))
                else {
                    debug!(viewport = %viewport_id, "no labelmap slice for the current image");
                    return Ok(false);
                };

                if self.configuration.active_strategy().shape() == BrushShape::Sphere {
                    warn!("Sphere manipulation is not supported for this stack of images yet");
                    return Ok(false);
                }

                EditTarget::Stack {
                    image_id: image_id.clone(),
                    labelmap_id: labelmap_id.clone(),
                }
            }
        };

        let cursor = CursorContext {
            segmentation_id: context.segmentation_id.clone(),
            segmentation_representation_uid: context.segmentation_representation_uid.clone(),
            segment_index: context.segment_index,
            segment_color: context.segment_color,
        };
        let hover = build_hover(&*ctx.viewport, canvas, cursor, self.configuration.brush_size());

        let mut viewport_ids_to_render = vec![viewport_id.clone()];
        for id in &self.viewport_ids {
            if !viewport_ids_to_render.contains(id) {
                viewport_ids_to_render.push(id.clone());
            }
        }

        let element = ctx.viewport.element_mut();
        for kind in STROKE_EVENTS {
            element.add_event_listener(kind);
        }
        element.hide_cursor();

        debug!(
            viewport = %viewport_id,
            labelmap = target.labelmap_id(),
            strategy = %self.configuration.active_strategy(),
            "brush stroke started"
        );

        self.stale_listeners = false;
        self.state = BrushState::Editing(EditSession {
            target,
            segments_locked: context.segments_locked,
            segmentation_representation_uid: context.segmentation_representation_uid,
            viewport_id: viewport_id.clone(),
            viewport_ids_to_render,
            hover,
        });

        trigger_annotation_render_for_viewport_ids(ctx.renderer, &[viewport_id]);

        Ok(true)
    }

    /// Move the cursor. Only the active tool shows a cursor.
    pub fn mouse_move(&mut self, ctx: &mut ToolContext<'_>, canvas: Vec2) {
        if self.mode != ToolMode::Active {
            return;
        }
        let Some(hover) = self.update_cursor(ctx, canvas) else {
            return;
        };

        trace!(x = canvas.x, y = canvas.y, "brush cursor moved");
        trigger_annotation_render_for_viewport_ids(ctx.renderer, &hover.viewport_ids_to_render);
        match &mut self.state {
            BrushState::Editing(session) => session.hover = hover,
            state => *state = BrushState::Hovering(hover),
        }
    }

    /// Continue the stroke at `canvas`
    pub fn mouse_drag(
        &mut self,
        ctx: &mut ToolContext<'_>,
        canvas: Vec2,
    ) -> Result<(), BrushError> {
        if !self.is_editing() {
            return Ok(());
        }
        let Some(hover) = self.update_cursor(ctx, canvas) else {
            return Ok(());
        };
        trigger_annotation_render_for_viewport_ids(ctx.renderer, &hover.viewport_ids_to_render);

        let BrushState::Editing(session) = &mut self.state else {
            return Ok(());
        };
        session.hover = hover;

        let viewport_ids =
            apply_active_strategy(&self.configuration, &self.tool_group_id, session, ctx)?;
        trigger_annotation_render_for_viewport_ids(ctx.renderer, &viewport_ids);
        Ok(())
    }

    /// Finish the stroke: detach listeners and commit the final position once
    pub fn mouse_up(
        &mut self,
        ctx: &mut ToolContext<'_>,
        canvas: Vec2,
    ) -> Result<(), BrushError> {
        let mut session = match std::mem::take(&mut self.state) {
            BrushState::Editing(session) => session,
            other => {
                self.state = other;
                return Ok(());
            }
        };

        detach_stroke_listeners(ctx.viewport);

        if let Some(hover) = self.update_cursor(ctx, canvas) {
            session.hover = hover;
        }
        debug!(viewport = %session.viewport_id, "brush stroke finished");

        let applied =
            apply_active_strategy(&self.configuration, &self.tool_group_id, &session, ctx);

        // the cursor left with the session, so the owning viewport is redrawn
        // even when nothing was painted
        let mut viewport_ids = vec![session.viewport_id];
        if let Ok(edited) = &applied {
            viewport_ids.extend(edited.iter().cloned());
        }
        trigger_annotation_render_for_viewport_ids(ctx.renderer, &viewport_ids);

        applied.map(|_| ())
    }

    pub fn mouse_click(
        &mut self,
        ctx: &mut ToolContext<'_>,
        canvas: Vec2,
    ) -> Result<(), BrushError> {
        self.mouse_up(ctx, canvas)
    }

    /// Draw the cursor on `viewport` if it is one the cursor belongs to.
    /// Returns whether anything was drawn.
    pub fn render_annotation(
        &mut self,
        viewport: &dyn Viewport,
        svg: &mut dyn SvgDrawingHelper,
    ) -> bool {
        let brush_size = self.configuration.brush_size();
        let Some(hover) = self.hover_mut() else {
            return false;
        };
        if !hover
            .viewport_ids_to_render
            .iter()
            .any(|id| id == viewport.id())
        {
            return false;
        }

        if hover.brush_cursor.geometry.invalidated {
            // brush size changed while the cursor was shown
            let camera = viewport.camera();
            hover.brush_cursor.geometry =
                calculate_cursor(hover.center_canvas, &camera, brush_size, |point| {
                    viewport.canvas_to_world(point)
                });
        }

        draw_brush_cursor(viewport, svg, &hover.brush_cursor)
    }

    /// Render the cursor on a batch of viewports. A viewport that cannot be
    /// drawn is skipped without affecting the others. Returns the number of
    /// viewports drawn to.
    pub fn render_annotations(
        &mut self,
        targets: &mut [(&dyn Viewport, &mut dyn SvgDrawingHelper)],
    ) -> usize {
        let mut drawn = 0;
        for (viewport, svg) in targets.iter_mut() {
            if self.render_annotation(*viewport, &mut **svg) {
                drawn += 1;
            }
        }
        drawn
    }

    /// Resolve the cursor for `canvas`, or `None` if there is no active
    /// segmentation to paint into
    fn update_cursor(&self, ctx: &ToolContext<'_>, canvas: Vec2) -> Option<HoverState> {
        match CursorContext::resolve(ctx.segmentations, &self.tool_group_id) {
            Ok(cursor) => Some(build_hover(
                &*ctx.viewport,
                canvas,
                cursor,
                self.configuration.brush_size(),
            )),
            Err(err) => {
                warn!("{err}");
                None
            }
        }
    }
}

fn build_hover(
    viewport: &dyn Viewport,
    canvas: Vec2,
    cursor: CursorContext,
    brush_size: f32,
) -> HoverState {
    let camera = viewport.camera();
    let geometry = calculate_cursor(canvas, &camera, brush_size, |point| {
        viewport.canvas_to_world(point)
    });

    HoverState {
        brush_cursor: BrushCursor {
            metadata: CursorMetadata {
                view_plane_normal: camera.view_plane_normal,
                view_up: camera.view_up,
                frame_of_reference_uid: viewport.frame_of_reference_uid().to_string(),
                tool_name: TOOL_NAME.to_string(),
                segment_color: cursor.segment_color,
            },
            geometry,
        },
        center_canvas: canvas,
        segmentation_id: cursor.segmentation_id,
        segmentation_representation_uid: cursor.segmentation_representation_uid,
        segment_index: cursor.segment_index,
        segment_color: cursor.segment_color,
        viewport_ids_to_render: vec![viewport.id().to_string()],
    }
}

fn detach_stroke_listeners(viewport: &mut dyn Viewport) {
    let element = viewport.element_mut();
    for kind in STROKE_EVENTS {
        element.remove_event_listener(kind);
    }
    element.reset_cursor();
}

/// Dispatch the active strategy for the session's current cursor. Returns the
/// viewports showing voxels it changed.
fn apply_active_strategy(
    configuration: &BrushConfiguration,
    tool_group_id: &str,
    session: &EditSession,
    ctx: &mut ToolContext<'_>,
) -> Result<Vec<String>, BrushError> {
    let strategy = configuration.active_strategy();
    if strategy.shape() == BrushShape::Sphere && !session.target.is_volume() {
        warn!(%strategy, "Sphere manipulation is not supported for this stack of images yet");
        return Ok(Vec::new());
    }

    let hover = &session.hover;
    let data = OperationData {
        strategy,
        target: &session.target,
        points: hover.brush_cursor.geometry.points,
        segment_index: hover.segment_index,
        segments_locked: &session.segments_locked,
        view_plane_normal: hover.brush_cursor.metadata.view_plane_normal,
        view_up: hover.brush_cursor.metadata.view_up,
        tool_group_id,
        segmentation_id: &hover.segmentation_id,
        segmentation_representation_uid: &session.segmentation_representation_uid,
        viewport_ids_to_render: &session.viewport_ids_to_render,
        strategy_specific_configuration: &configuration.strategy_specific_configuration,
    };

    let outcome = configuration.strategies.dispatch(&data, ctx.voxels)?;
    Ok(outcome.viewport_ids_to_render)
}
