use super::footprint::{Footprint, paint};
use super::{OperationData, StrategyOutcome};
use crate::enums::BrushShape;
use crate::error::BrushError;
use crate::voxel_cache::VoxelCache;

pub(crate) fn fill_inside(
    shape: BrushShape,
    data: &OperationData<'_>,
    voxels: &mut VoxelCache,
) -> Result<StrategyOutcome, BrushError> {
    let labelmap = voxels.labelmap_mut(data.target.labelmap_id())?;
    let footprint = Footprint::new(shape, data, labelmap);
    let indices = footprint.voxels(labelmap);
    let modified = paint(labelmap, indices, data.segments_locked, data.segment_index);

    Ok(StrategyOutcome::from_modified(modified, data))
}

/// Paint the active segment into the disk under the cursor
pub fn fill_inside_circle(
    data: &OperationData<'_>,
    voxels: &mut VoxelCache,
) -> Result<StrategyOutcome, BrushError> {
    fill_inside(BrushShape::Circle, data, voxels)
}

/// Paint the active segment into the ball under the cursor
pub fn fill_inside_sphere(
    data: &OperationData<'_>,
    voxels: &mut VoxelCache,
) -> Result<StrategyOutcome, BrushError> {
    fill_inside(BrushShape::Sphere, data, voxels)
}
