use std::collections::HashSet;

use glam::{Vec2, Vec3};
use image::{GrayImage, Luma};
use labelmap_brush::{
    ActiveSegmentationRepresentation, BrushConfiguration, BrushTool, LabelmapRepresentation,
    PointerEvent, PointerEventKind, RepresentationKind, Segmentation, SegmentationState,
    StrategyName, ToolContext, ToolMode, Volume, VoxelCache,
    geometry::Camera,
    render::RasterOverlay,
    viewport::{Element, RenderRequester, Viewport},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const SIZE: usize = 64;

/// Axial viewport showing one slice at one canvas pixel per millimetre
struct AxialViewport {
    slice_z: f32,
    listeners: HashSet<PointerEventKind>,
}

impl Element for AxialViewport {
    fn add_event_listener(&mut self, kind: PointerEventKind) {
        self.listeners.insert(kind);
    }

    fn remove_event_listener(&mut self, kind: PointerEventKind) {
        self.listeners.remove(&kind);
    }

    fn hide_cursor(&mut self) {}

    fn reset_cursor(&mut self) {}
}

impl Viewport for AxialViewport {
    fn id(&self) -> &str {
        "axial"
    }

    fn camera(&self) -> Camera {
        Camera::new(Vec3::NEG_Y, Vec3::NEG_Z)
    }

    fn canvas_to_world(&self, point: Vec2) -> Vec3 {
        point.extend(self.slice_z)
    }

    fn world_to_canvas(&self, point: Vec3) -> Vec2 {
        point.truncate()
    }

    fn current_image_id(&self) -> Option<&str> {
        None
    }

    fn actors(&self) -> Vec<String> {
        vec!["ct".to_string()]
    }

    fn frame_of_reference_uid(&self) -> &str {
        "1.2.840.demo"
    }

    fn has_rendering_engine(&self) -> bool {
        true
    }

    fn element_mut(&mut self) -> &mut dyn Element {
        self
    }
}

struct LogRenderer;

impl RenderRequester for LogRenderer {
    fn request_annotation_render(&mut self, viewport_id: &str) {
        tracing::trace!(viewport_id, "render requested");
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// Water phantom with a fat ball in the middle
fn phantom() -> Volume<f32> {
    let mut ct = Volume::zeros((SIZE, SIZE, SIZE), (1.0, 1.0, 1.0), Vec3::ZERO);
    let center = Vec3::splat(SIZE as f32 / 2.0);
    for ((k, j, i), value) in ct.data.indexed_iter_mut() {
        let position = Vec3::new(i as f32, j as f32, k as f32);
        *value = if position.distance(center) < 12.0 { -100.0 } else { 0.0 };
    }
    ct
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let mut segmentations = SegmentationState::new();
    segmentations.add_segmentation(Segmentation::with_labelmap(
        "fat",
        LabelmapRepresentation::Volume {
            volume_id: "fat-labelmap".to_string(),
        },
    ));
    segmentations.set_active_segmentation_representation(
        "ct-tools",
        ActiveSegmentationRepresentation {
            segmentation_id: "fat".to_string(),
            segmentation_representation_uid: "fat-rep".to_string(),
            kind: RepresentationKind::Labelmap,
        },
    );

    let mut voxels = VoxelCache::new();
    voxels.insert_source("ct", phantom());
    voxels.insert_labelmap(
        "fat-labelmap",
        Volume::zeros((SIZE, SIZE, SIZE), (1.0, 1.0, 1.0), Vec3::ZERO),
    );

    let mut tool = BrushTool::new("ct-tools", BrushConfiguration::default());
    tool.set_mode(ToolMode::Active);
    tool.set_active_strategy(StrategyName::ThresholdInsideCircle)?;
    tool.set_brush_size(8.0)?;

    let slice = SIZE / 2;
    let mut viewport = AxialViewport {
        slice_z: slice as f32,
        listeners: HashSet::new(),
    };
    let mut renderer = LogRenderer;
    let mut ctx = ToolContext {
        viewport: &mut viewport,
        segmentations: &segmentations,
        voxels: &mut voxels,
        renderer: &mut renderer,
    };

    let stroke = std::iter::once(PointerEventKind::Down)
        .chain(std::iter::repeat_n(PointerEventKind::Drag, 8))
        .chain(std::iter::once(PointerEventKind::Up));
    for (step, kind) in stroke.enumerate() {
        let canvas = Vec2::new(16.0 + step as f32 * 4.0, 32.0);
        tool.handle(&mut ctx, &PointerEvent::new(kind, canvas))?;
    }
    tool.handle(
        &mut ctx,
        &PointerEvent::new(PointerEventKind::Move, Vec2::new(32.0, 32.0)),
    )?;

    let mut overlay = RasterOverlay::new(SIZE as u32, SIZE as u32);
    tool.render_annotation(&viewport, &mut overlay);
    overlay.save("brush_cursor.png")?;

    let labelmap = voxels.labelmap("fat-labelmap")?;
    let painted = labelmap.data().iter().filter(|&&label| label != 0).count();
    info!(painted, "stroke committed");

    if let Some(labels) = labelmap.axial_slice(slice) {
        let image = GrayImage::from_fn(SIZE as u32, SIZE as u32, |x, y| {
            Luma([if labels[[y as usize, x as usize]] != 0 { 255 } else { 0 }])
        });
        image.save("labelmap.png")?;
    }

    Ok(())
}
