use std::collections::BTreeSet;

use crate::enums::RepresentationKind;
use crate::error::BrushError;
use crate::segmentation::{Color, LabelmapRepresentation, SegmentationStore};
use crate::voxel_cache::Label;

/// Everything an edit needs to know about the segmentation a tool group is
/// working on, resolved in one go.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationContext {
    pub segmentation_id: String,
    pub segmentation_representation_uid: String,
    pub kind: RepresentationKind,
    pub labelmap: LabelmapRepresentation,
    pub segments_locked: BTreeSet<Label>,
    pub segment_index: Label,
    pub segment_color: Color,
}

impl SegmentationContext {
    /// Resolve the active segmentation of `tool_group_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool group has no active representation, the
    /// representation is not a labelmap, or the segmentation it points to has
    /// no labelmap data.
    pub fn resolve(
        store: &dyn SegmentationStore,
        tool_group_id: &str,
    ) -> Result<Self, BrushError> {
        let active = store
            .active_segmentation_representation(tool_group_id)
            .ok_or(BrushError::NoActiveSegmentation)?;

        if active.kind == RepresentationKind::Contour {
            return Err(BrushError::UnsupportedRepresentation(active.kind));
        }

        let segmentation = store
            .segmentation(&active.segmentation_id)
            .ok_or_else(|| BrushError::SegmentationNotFound(active.segmentation_id.clone()))?;
        let labelmap = segmentation
            .representation_data
            .labelmap
            .clone()
            .ok_or_else(|| BrushError::MissingLabelmap(active.segmentation_id.clone()))?;

        let segment_index = store.active_segment_index(&active.segmentation_id);

        Ok(Self {
            segmentation_id: active.segmentation_id.clone(),
            segmentation_representation_uid: active.segmentation_representation_uid.clone(),
            kind: active.kind,
            labelmap,
            segments_locked: store.locked_segments(&active.segmentation_id),
            segment_index,
            segment_color: store.color_for_segment_index(
                tool_group_id,
                &active.segmentation_representation_uid,
                segment_index,
            ),
        })
    }
}

/// The subset of the context the hover cursor needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorContext {
    pub segmentation_id: String,
    pub segmentation_representation_uid: String,
    pub segment_index: Label,
    pub segment_color: Color,
}

impl CursorContext {
    pub fn resolve(
        store: &dyn SegmentationStore,
        tool_group_id: &str,
    ) -> Result<Self, BrushError> {
        let active = store
            .active_segmentation_representation(tool_group_id)
            .ok_or(BrushError::NoActiveSegmentation)?;
        let segment_index = store.active_segment_index(&active.segmentation_id);

        Ok(Self {
            segmentation_id: active.segmentation_id.clone(),
            segmentation_representation_uid: active.segmentation_representation_uid.clone(),
            segment_index,
            segment_color: store.color_for_segment_index(
                tool_group_id,
                &active.segmentation_representation_uid,
                segment_index,
            ),
        })
    }
}
