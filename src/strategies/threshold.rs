use super::footprint::{Footprint, paint};
use super::{OperationData, StrategyName, StrategyOutcome};
use crate::enums::BrushShape;
use crate::error::BrushError;
use crate::voxel_cache::VoxelCache;

/// Threshold range for `data.strategy`. Sphere thresholding shares the
/// circle's range unless it has one of its own.
fn threshold_range(data: &OperationData<'_>) -> Result<(f32, f32), BrushError> {
    let configuration = data.strategy_specific_configuration;
    let (lower, upper) = configuration
        .get(&data.strategy)
        .and_then(|parameters| parameters.threshold)
        .or_else(|| {
            configuration
                .get(&StrategyName::ThresholdInsideCircle)
                .and_then(|parameters| parameters.threshold)
        })
        .ok_or_else(|| BrushError::MissingThreshold(data.strategy.to_string()))?;

    if lower > upper {
        return Err(BrushError::InvalidThreshold { lower, upper });
    }
    Ok((lower, upper))
}

fn threshold_inside(
    shape: BrushShape,
    data: &OperationData<'_>,
    voxels: &mut VoxelCache,
) -> Result<StrategyOutcome, BrushError> {
    let (lower, upper) = threshold_range(data)?;
    let labelmap_id = data.target.labelmap_id();
    let source_id = data
        .target
        .source_id()
        .ok_or_else(|| BrushError::MissingVoxelData(format!("source of {labelmap_id}")))?;

    let (labelmap, source) = voxels.labelmap_with_source(labelmap_id, source_id)?;
    let source_data = source.data();
    let indices: Vec<_> = Footprint::new(shape, data, labelmap)
        .voxels(labelmap)
        .into_iter()
        .filter(|&[k, j, i]| {
            let value = source_data[[k, j, i]];
            value >= lower && value <= upper
        })
        .collect();
    let modified = paint(labelmap, indices, data.segments_locked, data.segment_index);

    Ok(StrategyOutcome::from_modified(modified, data))
}

/// Paint the active segment into voxels of the disk whose source intensity
/// lies within the configured range
pub fn threshold_inside_circle(
    data: &OperationData<'_>,
    voxels: &mut VoxelCache,
) -> Result<StrategyOutcome, BrushError> {
    threshold_inside(BrushShape::Circle, data, voxels)
}

pub fn threshold_inside_sphere(
    data: &OperationData<'_>,
    voxels: &mut VoxelCache,
) -> Result<StrategyOutcome, BrushError> {
    threshold_inside(BrushShape::Sphere, data, voxels)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::config::StrategyParameters;
    use crate::volume::Volume;
    use glam::Vec3;

    fn ct_with_ramp(size: usize) -> Volume<f32> {
        // intensity grows along x: -200, -150, -100, -70, -20, ...
        let mut ct = cube::<f32>(size);
        let ramp = [-200.0, -150.0, -100.0, -70.0, -20.0, 30.0, 80.0];
        for ((_, _, i), value) in ct.data_mut().indexed_iter_mut() {
            *value = ramp[i.min(ramp.len() - 1)];
        }
        ct
    }

    #[test]
    fn test_threshold_circle_includes_bounds() {
        let fixture = Fixture::volume();
        let mut cache = VoxelCache::new();
        cache.insert_labelmap("seg", cube(7));
        cache.insert_source("ct", ct_with_ramp(7));

        let data = fixture.data(StrategyName::ThresholdInsideCircle, Vec3::splat(3.0), 3.0);
        let outcome = threshold_inside_circle(&data, &mut cache).unwrap();

        let columns: Vec<usize> = outcome.modified.iter().map(|&[_, _, i]| i).collect();
        assert!(columns.iter().all(|&i| (1..=3).contains(&i)));
        assert!(columns.contains(&1));
        assert!(columns.contains(&3));

        let labelmap = cache.labelmap("seg").unwrap();
        assert_eq!(labelmap.data()[[3, 3, 0]], 0);
        assert_eq!(labelmap.data()[[3, 3, 1]], 1);
        assert_eq!(labelmap.data()[[3, 3, 3]], 1);
        assert_eq!(labelmap.data()[[3, 3, 4]], 0);
    }

    #[test]
    fn test_threshold_sphere_falls_back_to_circle_range() {
        let fixture = Fixture::volume();
        let mut cache = VoxelCache::new();
        cache.insert_labelmap("seg", cube(7));
        cache.insert_source("ct", ct_with_ramp(7));

        let data = fixture.data(StrategyName::ThresholdInsideSphere, Vec3::splat(3.0), 1.0);
        let outcome = threshold_inside_sphere(&data, &mut cache).unwrap();

        // of the 7 voxels in the ball only x = 4 falls outside [-150, -70]
        assert_eq!(outcome.modified.len(), 6);
        assert!(!outcome.modified.contains(&[3, 3, 4]));
    }

    #[test]
    fn test_threshold_respects_locked_segments() {
        let mut fixture = Fixture::volume();
        fixture.locked.insert(5);
        let mut labelmap = cube(7);
        labelmap.data_mut()[[3, 3, 2]] = 5;
        let mut cache = VoxelCache::new();
        cache.insert_labelmap("seg", labelmap);
        cache.insert_source("ct", ct_with_ramp(7));

        let data = fixture.data(StrategyName::ThresholdInsideCircle, Vec3::splat(3.0), 1.0);
        let outcome = threshold_inside_circle(&data, &mut cache).unwrap();

        assert!(!outcome.modified.contains(&[3, 3, 2]));
        assert_eq!(cache.labelmap("seg").unwrap().data()[[3, 3, 2]], 5);
    }

    #[test]
    fn test_threshold_without_range_is_an_error() {
        let mut fixture = Fixture::volume();
        fixture.parameters.clear();
        let mut cache = VoxelCache::new();
        cache.insert_labelmap("seg", cube(3));
        cache.insert_source("ct", cube(3));

        let data = fixture.data(StrategyName::ThresholdInsideCircle, Vec3::splat(1.0), 1.0);
        assert!(matches!(
            threshold_inside_circle(&data, &mut cache),
            Err(BrushError::MissingThreshold(_))
        ));
    }

    #[test]
    fn test_threshold_on_stack_reads_the_image() {
        let mut fixture = Fixture::stack();
        fixture.parameters.insert(
            StrategyName::ThresholdInsideCircle,
            StrategyParameters {
                threshold: Some((0.0, 10.0)),
            },
        );
        let mut image = Volume::<f32>::zeros((1, 3, 3), (1.0, 1.0, 1.0), Vec3::ZERO);
        image.data_mut()[[0, 1, 2]] = 50.0;
        let mut cache = VoxelCache::new();
        cache.insert_labelmap(
            "label-1",
            Volume::zeros((1, 3, 3), (1.0, 1.0, 1.0), Vec3::ZERO),
        );
        cache.insert_source("image-1", image);

        let center = Vec3::new(1.0, 1.0, 0.0);
        let data = fixture.data(StrategyName::ThresholdInsideCircle, center, 1.0);
        let outcome = threshold_inside_circle(&data, &mut cache).unwrap();

        assert_eq!(outcome.modified.len(), 4);
        assert!(!outcome.modified.contains(&[0, 1, 2]));
    }
}
