//! Errors raised by the brush engine.
//!
//! Only conditions that the caller must fix surface as errors. Preconditions
//! that are simply not met yet (no labelmap slice bound to the viewed image,
//! sphere brushes on stack data, lost render targets) are refused where they
//! are detected and logged instead.

use thiserror::Error;

use crate::enums::RepresentationKind;

#[derive(Debug, Error)]
pub enum BrushError {
    #[error("No active segmentation detected, create one before using the brush tool")]
    NoActiveSegmentation,

    #[error("Representation {0:?} is not supported by the brush tool")]
    UnsupportedRepresentation(RepresentationKind),

    #[error("Unknown brush strategy: {0}")]
    UnknownStrategy(String),

    #[error("Segmentation {0} not found")]
    SegmentationNotFound(String),

    #[error("Segmentation {0} has no labelmap data")]
    MissingLabelmap(String),

    #[error("Voxel data {0} is not loaded")]
    MissingVoxelData(String),

    #[error("Labelmap {labelmap} and source {source_id} have different dimensions")]
    DimensionMismatch { labelmap: String, source_id: String },

    #[error("Brush size must be a positive finite number, got {0}")]
    InvalidBrushSize(f32),

    #[error("No threshold range configured for {0}")]
    MissingThreshold(String),

    #[error("Threshold lower bound {lower} exceeds upper bound {upper}")]
    InvalidThreshold { lower: f32, upper: f32 },

    #[error("Invalid brush settings: {0}")]
    Settings(#[from] serde_json::Error),
}

impl BrushError {
    /// Configuration errors must be fixed by the caller and are never retried.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, BrushError::NoActiveSegmentation)
    }
}
