//! Segmentation data model and the state store the brush reads it from.

use std::collections::{BTreeSet, HashMap};

use crate::enums::RepresentationKind;
use crate::voxel_cache::Label;

/// RGBA colour of a segment, 0-255 per channel
pub type Color = [u8; 4];

/// How the labelmap of a segmentation is stored. A representation keeps its
/// variant for its whole lifetime.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelmapRepresentation {
    /// One labelmap volume shared by every viewport displaying it
    Volume { volume_id: String },
    /// Independent 2D labelmap slices, keyed by the id of the image they
    /// annotate
    Stack {
        image_id_reference_map: HashMap<String, String>,
    },
}

impl LabelmapRepresentation {
    pub fn is_volume(&self) -> bool {
        matches!(self, LabelmapRepresentation::Volume { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepresentationData {
    pub labelmap: Option<LabelmapRepresentation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub segmentation_id: String,
    pub representation_data: RepresentationData,
}

impl Segmentation {
    pub fn with_labelmap(
        segmentation_id: impl Into<String>,
        labelmap: LabelmapRepresentation,
    ) -> Self {
        Self {
            segmentation_id: segmentation_id.into(),
            representation_data: RepresentationData {
                labelmap: Some(labelmap),
            },
        }
    }
}

/// The representation a tool group currently edits
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSegmentationRepresentation {
    pub segmentation_id: String,
    pub segmentation_representation_uid: String,
    pub kind: RepresentationKind,
}

/// Read access to segmentation state owned by the host application.
pub trait SegmentationStore {
    fn active_segmentation_representation(
        &self,
        tool_group_id: &str,
    ) -> Option<&ActiveSegmentationRepresentation>;

    fn segmentation(&self, segmentation_id: &str) -> Option<&Segmentation>;

    fn locked_segments(&self, segmentation_id: &str) -> BTreeSet<Label>;

    fn active_segment_index(&self, segmentation_id: &str) -> Label;

    fn color_for_segment_index(
        &self,
        tool_group_id: &str,
        segmentation_representation_uid: &str,
        segment_index: Label,
    ) -> Color;
}

const DEFAULT_COLOR_LUT: [Color; 12] = [
    [221, 84, 84, 255],
    [77, 228, 121, 255],
    [166, 70, 235, 255],
    [189, 180, 116, 255],
    [109, 182, 196, 255],
    [204, 101, 157, 255],
    [123, 211, 94, 255],
    [93, 87, 218, 255],
    [225, 128, 80, 255],
    [73, 232, 172, 255],
    [181, 119, 186, 255],
    [176, 193, 112, 255],
];

/// Colour used for a segment that has no explicit colour assigned
pub fn default_segment_color(segment_index: Label) -> Color {
    if segment_index == 0 {
        return [0, 0, 0, 0];
    }
    DEFAULT_COLOR_LUT[(segment_index as usize - 1) % DEFAULT_COLOR_LUT.len()]
}

/// In-memory segmentation state.
#[derive(Debug, Default)]
pub struct SegmentationState {
    segmentations: HashMap<String, Segmentation>,
    active_representations: HashMap<String, ActiveSegmentationRepresentation>,
    locked_segments: HashMap<String, BTreeSet<Label>>,
    active_segment_indices: HashMap<String, Label>,
    colors: HashMap<(String, Label), Color>,
}

impl SegmentationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_segmentation(&mut self, segmentation: Segmentation) {
        self.segmentations
            .insert(segmentation.segmentation_id.clone(), segmentation);
    }

    pub fn set_active_segmentation_representation(
        &mut self,
        tool_group_id: impl Into<String>,
        representation: ActiveSegmentationRepresentation,
    ) {
        self.active_representations
            .insert(tool_group_id.into(), representation);
    }

    pub fn clear_active_segmentation_representation(&mut self, tool_group_id: &str) {
        self.active_representations.remove(tool_group_id);
    }

    pub fn set_segment_locked(&mut self, segmentation_id: &str, segment_index: Label, locked: bool) {
        let locked_segments = self
            .locked_segments
            .entry(segmentation_id.to_string())
            .or_default();
        if locked {
            locked_segments.insert(segment_index);
        } else {
            locked_segments.remove(&segment_index);
        }
    }

    pub fn set_active_segment_index(&mut self, segmentation_id: &str, segment_index: Label) {
        self.active_segment_indices
            .insert(segmentation_id.to_string(), segment_index);
    }

    pub fn set_color_for_segment_index(
        &mut self,
        segmentation_representation_uid: &str,
        segment_index: Label,
        color: Color,
    ) {
        self.colors.insert(
            (segmentation_representation_uid.to_string(), segment_index),
            color,
        );
    }
}

impl SegmentationStore for SegmentationState {
    fn active_segmentation_representation(
        &self,
        tool_group_id: &str,
    ) -> Option<&ActiveSegmentationRepresentation> {
        self.active_representations.get(tool_group_id)
    }

    fn segmentation(&self, segmentation_id: &str) -> Option<&Segmentation> {
        self.segmentations.get(segmentation_id)
    }

    fn locked_segments(&self, segmentation_id: &str) -> BTreeSet<Label> {
        self.locked_segments
            .get(segmentation_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Segment 1 is active until another one is selected
    fn active_segment_index(&self, segmentation_id: &str) -> Label {
        self.active_segment_indices
            .get(segmentation_id)
            .copied()
            .unwrap_or(1)
    }

    fn color_for_segment_index(
        &self,
        _tool_group_id: &str,
        segmentation_representation_uid: &str,
        segment_index: Label,
    ) -> Color {
        self.colors
            .get(&(segmentation_representation_uid.to_string(), segment_index))
            .copied()
            .unwrap_or_else(|| default_segment_color(segment_index))
    }
}
