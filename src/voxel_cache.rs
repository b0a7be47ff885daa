use std::collections::HashMap;

use crate::error::BrushError;
use crate::volume::Volume;

/// Label value stored per voxel. `0` is background.
pub type Label = u16;

/// Owner of every voxel buffer the brush can touch.
///
/// Labelmaps (segmentation volumes and per-image stack slices) and source
/// intensity data are stored in separate arenas keyed by id, so a strategy can
/// write a labelmap while reading the source it is thresholded against. All
/// access goes through `&mut self`; a multi-threaded host has to wrap the cache
/// in its own lock.
#[derive(Debug, Default)]
pub struct VoxelCache {
    labelmaps: HashMap<String, Volume<Label>>,
    sources: HashMap<String, Volume<f32>>,
}

impl VoxelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_labelmap(&mut self, id: impl Into<String>, volume: Volume<Label>) {
        self.labelmaps.insert(id.into(), volume);
    }

    pub fn insert_source(&mut self, id: impl Into<String>, volume: Volume<f32>) {
        self.sources.insert(id.into(), volume);
    }

    pub fn labelmap(&self, id: &str) -> Result<&Volume<Label>, BrushError> {
        self.labelmaps
            .get(id)
            .ok_or_else(|| BrushError::MissingVoxelData(id.to_string()))
    }

    pub fn labelmap_mut(&mut self, id: &str) -> Result<&mut Volume<Label>, BrushError> {
        self.labelmaps
            .get_mut(id)
            .ok_or_else(|| BrushError::MissingVoxelData(id.to_string()))
    }

    pub fn source(&self, id: &str) -> Result<&Volume<f32>, BrushError> {
        self.sources
            .get(id)
            .ok_or_else(|| BrushError::MissingVoxelData(id.to_string()))
    }

    /// Borrow a labelmap for writing together with the source it was
    /// segmented from. Both grids must have the same dimensions.
    pub fn labelmap_with_source(
        &mut self,
        labelmap_id: &str,
        source_id: &str,
    ) -> Result<(&mut Volume<Label>, &Volume<f32>), BrushError> {
        let source = self
            .sources
            .get(source_id)
            .ok_or_else(|| BrushError::MissingVoxelData(source_id.to_string()))?;
        let labelmap = self
            .labelmaps
            .get_mut(labelmap_id)
            .ok_or_else(|| BrushError::MissingVoxelData(labelmap_id.to_string()))?;

        if labelmap.dim() != source.dim() {
            return Err(BrushError::DimensionMismatch {
                labelmap: labelmap_id.to_string(),
                source_id: source_id.to_string(),
            });
        }

        Ok((labelmap, source))
    }
}
