use glam::Vec3;
use ndarray::Array3;
use ndarray::ArrayView2;
use ndarray::s;

/// Axis aligned voxel grid placed in world space.
///
/// Data is indexed `[k, j, i]` (depth, height, width), which corresponds to
/// world `(z, y, x)`. A single stack image is a volume with a depth of one.
#[derive(Debug, Clone, Default)]
pub struct Volume<T> {
    pub data: Array3<T>,
    /// Voxel size along (x, y, z) in mm
    pub spacing: (f32, f32, f32),
    /// World position of voxel `[0, 0, 0]`
    pub origin: Vec3,
}

impl<T: Clone + Default> Volume<T> {
    /// Create a volume of the given dimensions (depth, height, width) filled
    /// with `T::default()`.
    pub fn zeros(dim: (usize, usize, usize), spacing: (f32, f32, f32), origin: Vec3) -> Self {
        Self::new(Array3::default(dim), spacing, origin)
    }
}

impl<T> Volume<T> {
    pub fn new(data: Array3<T>, spacing: (f32, f32, f32), origin: Vec3) -> Self {
        Self {
            data,
            spacing,
            origin,
        }
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<T> {
        &self.data
    }

    /// Get a mutable reference to the underlying data
    pub fn data_mut(&mut self) -> &mut Array3<T> {
        &mut self.data
    }

    pub fn spacing_vec(&self) -> Vec3 {
        Vec3::new(self.spacing.0, self.spacing.1, self.spacing.2)
    }

    /// World position of the center of voxel `[k, j, i]`
    pub fn index_to_world(&self, index: [usize; 3]) -> Vec3 {
        let [k, j, i] = index;
        self.origin + Vec3::new(i as f32, j as f32, k as f32) * self.spacing_vec()
    }

    /// Continuous index coordinates (x, y, z) of a world position
    pub fn world_to_continuous_index(&self, world: Vec3) -> Vec3 {
        (world - self.origin) / self.spacing_vec()
    }

    /// Index range per axis, clamped to the grid, covering the axis aligned
    /// box `[min, max]` in world space. Returns `None` when the box misses the
    /// volume entirely.
    pub fn index_bounds(&self, min: Vec3, max: Vec3) -> Option<[(usize, usize); 3]> {
        let (depth, height, width) = self.dim();
        let lo = self.world_to_continuous_index(min).floor();
        let hi = self.world_to_continuous_index(max).ceil();

        let clamp = |lo: f32, hi: f32, len: usize| -> Option<(usize, usize)> {
            if len == 0 || hi < 0.0 || lo > (len - 1) as f32 {
                return None;
            }
            let start = lo.max(0.0) as usize;
            let end = (hi.min((len - 1) as f32)) as usize;
            Some((start, end))
        };

        Some([
            clamp(lo.z, hi.z, depth)?,
            clamp(lo.y, hi.y, height)?,
            clamp(lo.x, hi.x, width)?,
        ])
    }

    /// Axial slice at depth `index`
    pub fn axial_slice(&self, index: usize) -> Option<ArrayView2<'_, T>> {
        (index < self.dim().0).then(|| self.data.slice(s![index, .., ..]))
    }
}
