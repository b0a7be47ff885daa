//! # Labelmap brush
//!
//! This crate implements the interactive brush used to paint, erase and
//! threshold-segment labelmaps in a medical image viewer.
//!
//! The host viewer feeds pointer events into a [`BrushTool`]. On every event
//! the tool decides whether a stroke starts, continues or ends, converts the
//! pointer position into a world-space brush footprint using the viewport
//! camera, and applies the active strategy to the labelmap. Strategies are
//! selected by name:
//!  - `FILL_INSIDE_CIRCLE` / `FILL_INSIDE_SPHERE`
//!  - `ERASE_INSIDE_CIRCLE` / `ERASE_INSIDE_SPHERE`
//!  - `THRESHOLD_INSIDE_CIRCLE` / `THRESHOLD_INSIDE_SPHERE`
//!
//! Segmentations are either backed by one labelmap volume or by a stack of
//! per-image labelmap slices. Circle strategies work on both, sphere
//! strategies need a volume. Voxels that carry a locked segment are never
//! overwritten.
//!
//! Rendering, camera handling and segmentation bookkeeping stay with the host
//! and are reached through the traits in [`viewport`] and
//! [`segmentation::SegmentationStore`]. Voxel buffers live in a
//! [`VoxelCache`] that is handed to the tool explicitly with every event.
//!
//! # Examples
//!
//! ## Painting a stroke into a labelmap volume
//!
//! ```no_run
//! # use labelmap_brush::*;
//! # fn stroke(viewport: &mut dyn viewport::Viewport, renderer: &mut dyn viewport::RenderRequester)
//! # -> Result<(), BrushError> {
//! let mut segmentations = SegmentationState::new();
//! segmentations.add_segmentation(Segmentation::with_labelmap(
//!     "liver",
//!     LabelmapRepresentation::Volume { volume_id: "liver-labelmap".to_string() },
//! ));
//! segmentations.set_active_segmentation_representation(
//!     "ct-tools",
//!     ActiveSegmentationRepresentation {
//!         segmentation_id: "liver".to_string(),
//!         segmentation_representation_uid: "liver-rep".to_string(),
//!         kind: RepresentationKind::Labelmap,
//!     },
//! );
//!
//! let mut voxels = VoxelCache::new();
//! voxels.insert_labelmap(
//!     "liver-labelmap",
//!     Volume::zeros((64, 256, 256), (0.8, 0.8, 2.5), glam::Vec3::ZERO),
//! );
//!
//! let mut tool = BrushTool::new("ct-tools", BrushConfiguration::default());
//! tool.set_mode(ToolMode::Active);
//!
//! let mut ctx = ToolContext {
//!     viewport,
//!     segmentations: &segmentations,
//!     voxels: &mut voxels,
//!     renderer,
//! };
//! for (kind, x) in [
//!     (PointerEventKind::Down, 100.0),
//!     (PointerEventKind::Drag, 110.0),
//!     (PointerEventKind::Up, 120.0),
//! ] {
//!     tool.handle(&mut ctx, &PointerEvent::new(kind, glam::Vec2::new(x, 128.0)))?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod brush_tool;
pub mod config;
pub mod context;
pub mod enums;
pub mod error;
pub mod geometry;
pub mod render;
pub mod segmentation;
pub mod strategies;
pub mod viewport;
pub mod volume;
pub mod voxel_cache;

pub use brush_tool::{BrushState, BrushTool, EditSession, HoverState, PointerEvent, ToolContext};
pub use config::{BrushConfiguration, BrushSettings, StrategyParameters};
pub use enums::{BrushShape, Operation, PointerEventKind, RepresentationKind, ToolMode};
pub use error::BrushError;
pub use segmentation::{
    ActiveSegmentationRepresentation, LabelmapRepresentation, Segmentation, SegmentationState,
};
pub use strategies::{StrategyName, StrategyRegistry};
pub use volume::Volume;
pub use voxel_cache::VoxelCache;
