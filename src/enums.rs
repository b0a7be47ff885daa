/// Mode a tool is put into by its tool group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToolMode {
    Active,
    Passive,
    Enabled,
    #[default]
    Disabled,
}

/// What a strategy writes into the labelmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Fill,
    Erase,
    Threshold,
}

/// Footprint of the brush. Circles edit the viewed plane, spheres a 3D
/// neighbourhood and therefore require volumetric data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrushShape {
    Circle,
    Sphere,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RepresentationKind {
    #[default]
    Labelmap,
    Contour,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Down,
    Move,
    Drag,
    Up,
    Click,
}
