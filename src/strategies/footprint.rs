use std::collections::BTreeSet;

use glam::Vec3;
use rayon::prelude::*;

use super::OperationData;
use crate::enums::BrushShape;
use crate::volume::Volume;
use crate::voxel_cache::Label;

// Absorbs f32 error so voxels exactly on the brush boundary count as inside.
const BOUNDARY_EPSILON: f32 = 1e-4;

/// Region of world space covered by one brush dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Footprint {
    Circle {
        center: Vec3,
        radius: f32,
        normal: Vec3,
        /// Maximum distance from the view plane. `None` for single stack
        /// slices, which are the plane.
        plane_tolerance: Option<f32>,
    },
    Sphere {
        center: Vec3,
        radius: f32,
    },
}

impl Footprint {
    pub(crate) fn new<T>(shape: BrushShape, data: &OperationData<'_>, volume: &Volume<T>) -> Self {
        let center = data.center();
        let radius = data.radius();

        match shape {
            BrushShape::Sphere => Footprint::Sphere { center, radius },
            BrushShape::Circle => {
                let normal = data.view_plane_normal.normalize_or_zero();
                let plane_tolerance = data.target.is_volume().then(|| {
                    // half the voxel extent seen along the normal
                    0.5 * normal.abs().dot(volume.spacing_vec())
                });
                Footprint::Circle {
                    center,
                    radius,
                    normal,
                    plane_tolerance,
                }
            }
        }
    }

    fn contains(&self, point: Vec3) -> bool {
        match *self {
            Footprint::Sphere { center, radius } => {
                point.distance(center) <= radius + BOUNDARY_EPSILON
            }
            Footprint::Circle {
                center,
                radius,
                normal,
                plane_tolerance,
            } => {
                let offset = point - center;
                let along_normal = offset.dot(normal);
                let in_plane = offset - normal * along_normal;

                // half-open slab so a cursor between two slices edits one
                in_plane.length() <= radius + BOUNDARY_EPSILON
                    && plane_tolerance.is_none_or(|tolerance| {
                        along_normal > -tolerance && along_normal <= tolerance
                    })
            }
        }
    }

    fn world_bounds(&self) -> (Vec3, Vec3) {
        let (center, extent) = match *self {
            Footprint::Sphere { center, radius } => (center, radius),
            Footprint::Circle {
                center,
                radius,
                plane_tolerance,
                ..
            } => (center, radius + plane_tolerance.unwrap_or(0.0)),
        };
        (center - Vec3::splat(extent), center + Vec3::splat(extent))
    }

    /// Indices `[k, j, i]` of the voxels of `volume` inside the footprint, in
    /// row-major order.
    pub(crate) fn voxels<T: Sync>(&self, volume: &Volume<T>) -> Vec<[usize; 3]> {
        let (mut min, mut max) = self.world_bounds();
        // A stack slice is the edited plane wherever the cursor sits along
        // its normal.
        if let Footprint::Circle {
            plane_tolerance: None,
            ..
        } = self
        {
            min.z = volume.origin.z;
            max.z = volume.origin.z;
        }
        let Some([(k0, k1), (j0, j1), (i0, i1)]) = volume.index_bounds(min, max) else {
            return Vec::new();
        };

        (k0..=k1)
            .into_par_iter()
            .flat_map_iter(|k| {
                (j0..=j1).flat_map(move |j| (i0..=i1).map(move |i| [k, j, i]))
            })
            .filter(|&index| self.contains(volume.index_to_world(index)))
            .collect()
    }
}

/// Write `value` to every voxel in `indices` whose current label is not
/// locked. Returns the voxels that actually changed.
pub(crate) fn paint(
    labelmap: &mut Volume<Label>,
    indices: impl IntoIterator<Item = [usize; 3]>,
    segments_locked: &BTreeSet<Label>,
    value: Label,
) -> Vec<[usize; 3]> {
    let data = labelmap.data_mut();
    indices
        .into_iter()
        .filter(|&[k, j, i]| {
            let current = data[[k, j, i]];
            if current == value || segments_locked.contains(&current) {
                return false;
            }
            data[[k, j, i]] = value;
            true
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::StrategyName;
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_circle_stays_in_view_plane() {
        let fixture = Fixture::volume();
        let volume = cube::<Label>(9);
        let data = fixture.data(StrategyName::FillInsideCircle, Vec3::splat(4.0), 2.0);

        let voxels = Footprint::new(BrushShape::Circle, &data, &volume).voxels(&volume);

        assert!(voxels.iter().all(|&[k, _, _]| k == 4));
        // 13 voxels of a radius 2 disk on a unit grid
        assert_eq!(voxels.len(), 13);
    }

    #[test]
    fn test_circle_between_slices_edits_one_plane() {
        let fixture = Fixture::volume();
        let volume = cube::<Label>(9);
        let data = fixture.data(
            StrategyName::FillInsideCircle,
            Vec3::new(4.0, 4.0, 4.5),
            1.0,
        );

        let voxels = Footprint::new(BrushShape::Circle, &data, &volume).voxels(&volume);

        assert_eq!(voxels.len(), 5);
        assert!(voxels.iter().all(|&[k, _, _]| k == 5));
    }

    #[test]
    fn test_sphere_covers_neighbouring_slices() {
        let fixture = Fixture::volume();
        let volume = cube::<Label>(9);
        let data = fixture.data(StrategyName::FillInsideSphere, Vec3::splat(4.0), 1.0);

        let voxels = Footprint::new(BrushShape::Sphere, &data, &volume).voxels(&volume);

        assert_eq!(voxels.len(), 7);
        assert!(voxels.contains(&[3, 4, 4]));
        assert!(voxels.contains(&[5, 4, 4]));
    }

    #[test]
    fn test_footprint_is_clipped_to_volume() {
        let fixture = Fixture::volume();
        let volume = cube::<Label>(4);
        let data = fixture.data(StrategyName::FillInsideSphere, Vec3::ZERO, 1.0);

        let voxels = Footprint::new(BrushShape::Sphere, &data, &volume).voxels(&volume);

        assert_eq!(voxels, vec![[0, 0, 0], [0, 0, 1], [0, 1, 0], [1, 0, 0]]);
    }

    #[test]
    fn test_paint_skips_locked_and_unchanged_voxels() {
        let mut labelmap = cube::<Label>(2);
        labelmap.data_mut()[[0, 0, 0]] = 2;
        labelmap.data_mut()[[0, 0, 1]] = 1;

        let locked = BTreeSet::from([2]);
        let changed = paint(
            &mut labelmap,
            [[0, 0, 0], [0, 0, 1], [0, 1, 0]],
            &locked,
            1,
        );

        assert_eq!(changed, vec![[0, 1, 0]]);
        assert_eq!(labelmap.data()[[0, 0, 0]], 2);
    }
}
