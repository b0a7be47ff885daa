use glam::{Vec2, Vec3};

/// The part of a viewport camera the brush needs: the orientation of the
/// viewed plane in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub view_up: Vec3,
    pub view_plane_normal: Vec3,
}

impl Camera {
    pub fn new(view_up: Vec3, view_plane_normal: Vec3) -> Self {
        Self {
            view_up,
            view_plane_normal,
        }
    }

    pub fn view_right(&self) -> Vec3 {
        self.view_up.cross(self.view_plane_normal).normalize()
    }
}

/// World-space cross section of the brush: the bottom, top, left and right
/// points of the circle (or the sphere's equator) in the viewed plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushCursorGeometry {
    pub points: [Vec3; 4],
    pub invalidated: bool,
}

impl BrushCursorGeometry {
    pub const BOTTOM: usize = 0;
    pub const TOP: usize = 1;
    pub const LEFT: usize = 2;
    pub const RIGHT: usize = 3;

    pub fn bottom(&self) -> Vec3 {
        self.points[Self::BOTTOM]
    }

    pub fn top(&self) -> Vec3 {
        self.points[Self::TOP]
    }

    pub fn left(&self) -> Vec3 {
        self.points[Self::LEFT]
    }

    pub fn right(&self) -> Vec3 {
        self.points[Self::RIGHT]
    }

    /// Center of the brush in world coordinates
    pub fn center(&self) -> Vec3 {
        (self.bottom() + self.top()) * 0.5
    }

    /// Radius of the brush in world units (mm)
    pub fn radius(&self) -> f32 {
        self.bottom().distance(self.top()) * 0.5
    }
}

/// Compute the cursor footprint for a brush centred on `center_canvas`.
///
/// `radius` is the brush size in world units. The result depends only on the
/// arguments, so recomputing from the same camera and center yields identical
/// points.
pub fn calculate_cursor(
    center_canvas: Vec2,
    camera: &Camera,
    radius: f32,
    canvas_to_world: impl Fn(Vec2) -> Vec3,
) -> BrushCursorGeometry {
    let view_up = camera.view_up;
    let view_right = camera.view_right();
    let center = canvas_to_world(center_canvas);

    BrushCursorGeometry {
        points: [
            center - view_up * radius,
            center + view_up * radius,
            center - view_right * radius,
            center + view_right * radius,
        ],
        invalidated: false,
    }
}
