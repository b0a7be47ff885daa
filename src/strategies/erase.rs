use super::footprint::{Footprint, paint};
use super::{OperationData, StrategyOutcome};
use crate::enums::BrushShape;
use crate::error::BrushError;
use crate::voxel_cache::VoxelCache;

const BACKGROUND: u16 = 0;

fn erase_inside(
    shape: BrushShape,
    data: &OperationData<'_>,
    voxels: &mut VoxelCache,
) -> Result<StrategyOutcome, BrushError> {
    let labelmap = voxels.labelmap_mut(data.target.labelmap_id())?;
    let indices = Footprint::new(shape, data, labelmap).voxels(labelmap);
    let modified = paint(labelmap, indices, data.segments_locked, BACKGROUND);

    Ok(StrategyOutcome::from_modified(modified, data))
}

pub fn erase_inside_circle(
    data: &OperationData<'_>,
    voxels: &mut VoxelCache,
) -> Result<StrategyOutcome, BrushError> {
    erase_inside(BrushShape::Circle, data, voxels)
}

pub fn erase_inside_sphere(
    data: &OperationData<'_>,
    voxels: &mut VoxelCache,
) -> Result<StrategyOutcome, BrushError> {
    erase_inside(BrushShape::Sphere, data, voxels)
}
