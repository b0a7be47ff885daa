#![allow(dead_code)]

use std::cell::Cell;
use std::collections::HashMap;

use glam::{Vec2, Vec3};
use labelmap_brush::geometry::Camera;
use labelmap_brush::strategies::{OperationData, StrategyOutcome};
use labelmap_brush::viewport::{DrawStyle, Element, RenderRequester, SvgDrawingHelper, Viewport};
use labelmap_brush::{
    ActiveSegmentationRepresentation, BrushError, LabelmapRepresentation, PointerEventKind,
    RepresentationKind, Segmentation, SegmentationState, Volume, VoxelCache,
};

pub const TOOL_GROUP: &str = "tool-group";
pub const SEGMENTATION: &str = "segmentation";
pub const LABELMAP: &str = "labelmap";
pub const SOURCE: &str = "ct";
pub const SIZE: usize = 32;

#[derive(Debug, Default)]
pub struct MockElement {
    pub listeners: Vec<PointerEventKind>,
    pub cursor_hidden: bool,
}

impl Element for MockElement {
    fn add_event_listener(&mut self, kind: PointerEventKind) {
        self.listeners.push(kind);
    }

    fn remove_event_listener(&mut self, kind: PointerEventKind) {
        self.listeners.retain(|&k| k != kind);
    }

    fn hide_cursor(&mut self) {
        self.cursor_hidden = true;
    }

    fn reset_cursor(&mut self) {
        self.cursor_hidden = false;
    }
}

/// Axial viewport, one canvas pixel per millimetre, showing the slice at
/// `slice_z`
#[derive(Debug)]
pub struct MockViewport {
    pub id: String,
    pub slice_z: f32,
    pub current_image_id: Option<String>,
    pub actors: Vec<String>,
    pub alive: bool,
    pub element: MockElement,
}

impl MockViewport {
    pub fn volume(id: &str) -> Self {
        Self {
            id: id.to_string(),
            slice_z: (SIZE / 2) as f32,
            current_image_id: None,
            actors: vec![SOURCE.to_string()],
            alive: true,
            element: MockElement::default(),
        }
    }

    pub fn stack(id: &str, image_id: &str) -> Self {
        Self {
            slice_z: 0.0,
            current_image_id: Some(image_id.to_string()),
            actors: Vec::new(),
            ..Self::volume(id)
        }
    }
}

impl Viewport for MockViewport {
    fn id(&self) -> &str {
        &self.id
    }

    fn camera(&self) -> Camera {
        Camera::new(Vec3::Y, Vec3::Z)
    }

    fn canvas_to_world(&self, point: Vec2) -> Vec3 {
        point.extend(self.slice_z)
    }

    fn world_to_canvas(&self, point: Vec3) -> Vec2 {
        point.truncate()
    }

    fn current_image_id(&self) -> Option<&str> {
        self.current_image_id.as_deref()
    }

    fn actors(&self) -> Vec<String> {
        self.actors.clone()
    }

    fn frame_of_reference_uid(&self) -> &str {
        "1.2.3"
    }

    fn has_rendering_engine(&self) -> bool {
        self.alive
    }

    fn element_mut(&mut self) -> &mut dyn Element {
        &mut self.element
    }
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub requests: Vec<String>,
}

impl RenderRequester for RecordingRenderer {
    fn request_annotation_render(&mut self, viewport_id: &str) {
        self.requests.push(viewport_id.to_string());
    }
}

#[derive(Debug, Default)]
pub struct RecordingSvg {
    pub circles: Vec<(Vec2, f32, String)>,
}

impl SvgDrawingHelper for RecordingSvg {
    fn draw_circle(
        &mut self,
        _annotation_uid: &str,
        _circle_uid: &str,
        center: Vec2,
        radius: f32,
        style: &DrawStyle,
    ) {
        self.circles.push((center, radius, style.color.clone()));
    }
}

fn active_representation(kind: RepresentationKind) -> ActiveSegmentationRepresentation {
    ActiveSegmentationRepresentation {
        segmentation_id: SEGMENTATION.to_string(),
        segmentation_representation_uid: "representation".to_string(),
        kind,
    }
}

/// Segmentation backed by the labelmap volume `LABELMAP`
pub fn volume_segmentation() -> SegmentationState {
    let mut state = SegmentationState::new();
    state.add_segmentation(Segmentation::with_labelmap(
        SEGMENTATION,
        LabelmapRepresentation::Volume {
            volume_id: LABELMAP.to_string(),
        },
    ));
    state.set_active_segmentation_representation(
        TOOL_GROUP,
        active_representation(RepresentationKind::Labelmap),
    );
    state
}

/// Stack segmentation with a labelmap slice bound to `image-1` only
pub fn stack_segmentation() -> SegmentationState {
    let mut state = SegmentationState::new();
    state.add_segmentation(Segmentation::with_labelmap(
        SEGMENTATION,
        LabelmapRepresentation::Stack {
            image_id_reference_map: HashMap::from([(
                "image-1".to_string(),
                "label-1".to_string(),
            )]),
        },
    ));
    state.set_active_segmentation_representation(
        TOOL_GROUP,
        active_representation(RepresentationKind::Labelmap),
    );
    state
}

pub fn contour_segmentation() -> SegmentationState {
    let mut state = volume_segmentation();
    state.set_active_segmentation_representation(
        TOOL_GROUP,
        active_representation(RepresentationKind::Contour),
    );
    state
}

pub fn volume_voxels() -> VoxelCache {
    let mut voxels = VoxelCache::new();
    voxels.insert_labelmap(
        LABELMAP,
        Volume::zeros((SIZE, SIZE, SIZE), (1.0, 1.0, 1.0), Vec3::ZERO),
    );
    voxels.insert_source(
        SOURCE,
        Volume::zeros((SIZE, SIZE, SIZE), (1.0, 1.0, 1.0), Vec3::ZERO),
    );
    voxels
}

pub fn stack_voxels() -> VoxelCache {
    let mut voxels = VoxelCache::new();
    voxels.insert_labelmap(
        "label-1",
        Volume::zeros((1, SIZE, SIZE), (1.0, 1.0, 1.0), Vec3::ZERO),
    );
    voxels.insert_source(
        "image-1",
        Volume::zeros((1, SIZE, SIZE), (1.0, 1.0, 1.0), Vec3::ZERO),
    );
    voxels
}

thread_local! {
    static DISPATCHES: Cell<usize> = const { Cell::new(0) };
}

/// Strategy that only counts how often it was called on this thread
pub fn counting_strategy(
    _data: &OperationData<'_>,
    _voxels: &mut VoxelCache,
) -> Result<StrategyOutcome, BrushError> {
    DISPATCHES.with(|count| count.set(count.get() + 1));
    Ok(StrategyOutcome::default())
}

pub fn dispatch_count() -> usize {
    DISPATCHES.with(Cell::get)
}

pub fn reset_dispatches() {
    DISPATCHES.with(|count| count.set(0));
}
