//! Voxel mutation strategies and the registry the brush dispatches through.
//!
//! A strategy is selected by name, and every name stands for one
//! [`Operation`] applied inside one [`BrushShape`]. Strategies write the
//! labelmap in place and leave it consistent after every call, since a stroke
//! can be abandoned between any two dispatches.

mod erase;
mod fill;
mod footprint;
mod threshold;

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use tracing::debug;
use web_time::Instant;

use crate::config::StrategyParameters;
use crate::enums::{BrushShape, Operation};
use crate::error::BrushError;
use crate::voxel_cache::{Label, VoxelCache};

pub use erase::{erase_inside_circle, erase_inside_sphere};
pub use fill::{fill_inside_circle, fill_inside_sphere};
pub use threshold::{threshold_inside_circle, threshold_inside_sphere};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyName {
    FillInsideCircle,
    EraseInsideCircle,
    FillInsideSphere,
    EraseInsideSphere,
    ThresholdInsideCircle,
    ThresholdInsideSphere,
}

impl StrategyName {
    pub const ALL: [StrategyName; 6] = [
        StrategyName::FillInsideCircle,
        StrategyName::EraseInsideCircle,
        StrategyName::FillInsideSphere,
        StrategyName::EraseInsideSphere,
        StrategyName::ThresholdInsideCircle,
        StrategyName::ThresholdInsideSphere,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyName::FillInsideCircle => "FILL_INSIDE_CIRCLE",
            StrategyName::EraseInsideCircle => "ERASE_INSIDE_CIRCLE",
            StrategyName::FillInsideSphere => "FILL_INSIDE_SPHERE",
            StrategyName::EraseInsideSphere => "ERASE_INSIDE_SPHERE",
            StrategyName::ThresholdInsideCircle => "THRESHOLD_INSIDE_CIRCLE",
            StrategyName::ThresholdInsideSphere => "THRESHOLD_INSIDE_SPHERE",
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            StrategyName::FillInsideCircle | StrategyName::FillInsideSphere => Operation::Fill,
            StrategyName::EraseInsideCircle | StrategyName::EraseInsideSphere => Operation::Erase,
            StrategyName::ThresholdInsideCircle | StrategyName::ThresholdInsideSphere => {
                Operation::Threshold
            }
        }
    }

    pub fn shape(&self) -> BrushShape {
        match self {
            StrategyName::FillInsideCircle
            | StrategyName::EraseInsideCircle
            | StrategyName::ThresholdInsideCircle => BrushShape::Circle,
            StrategyName::FillInsideSphere
            | StrategyName::EraseInsideSphere
            | StrategyName::ThresholdInsideSphere => BrushShape::Sphere,
        }
    }
}

impl fmt::Display for StrategyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyName {
    type Err = BrushError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| BrushError::UnknownStrategy(s.to_string()))
    }
}

/// The labelmap an edit session writes to.
#[derive(Debug, Clone, PartialEq)]
pub enum EditTarget {
    Volume {
        volume_id: String,
        /// Source volume shown in the viewport, read by threshold strategies
        referenced_volume_id: Option<String>,
    },
    Stack {
        image_id: String,
        labelmap_id: String,
    },
}

impl EditTarget {
    pub fn labelmap_id(&self) -> &str {
        match self {
            EditTarget::Volume { volume_id, .. } => volume_id,
            EditTarget::Stack { labelmap_id, .. } => labelmap_id,
        }
    }

    pub fn source_id(&self) -> Option<&str> {
        match self {
            EditTarget::Volume {
                referenced_volume_id,
                ..
            } => referenced_volume_id.as_deref(),
            EditTarget::Stack { image_id, .. } => Some(image_id),
        }
    }

    pub fn is_volume(&self) -> bool {
        matches!(self, EditTarget::Volume { .. })
    }
}

/// Arguments of a single strategy call.
#[derive(Debug, Clone)]
pub struct OperationData<'a> {
    pub strategy: StrategyName,
    pub target: &'a EditTarget,
    /// Cursor points: bottom, top, left, right
    pub points: [Vec3; 4],
    pub segment_index: Label,
    pub segments_locked: &'a BTreeSet<Label>,
    pub view_plane_normal: Vec3,
    pub view_up: Vec3,
    pub tool_group_id: &'a str,
    pub segmentation_id: &'a str,
    pub segmentation_representation_uid: &'a str,
    pub viewport_ids_to_render: &'a [String],
    pub strategy_specific_configuration: &'a HashMap<StrategyName, StrategyParameters>,
}

impl OperationData<'_> {
    pub fn center(&self) -> Vec3 {
        (self.points[0] + self.points[1]) * 0.5
    }

    pub fn radius(&self) -> f32 {
        self.points[0].distance(self.points[1]) * 0.5
    }
}

/// What a strategy changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyOutcome {
    /// `[k, j, i]` indices of the voxels whose label changed
    pub modified: Vec<[usize; 3]>,
    pub viewport_ids_to_render: Vec<String>,
}

impl StrategyOutcome {
    pub(crate) fn from_modified(modified: Vec<[usize; 3]>, data: &OperationData<'_>) -> Self {
        let viewport_ids_to_render = if modified.is_empty() {
            Vec::new()
        } else {
            data.viewport_ids_to_render.to_vec()
        };
        Self {
            modified,
            viewport_ids_to_render,
        }
    }
}

pub type StrategyFn =
    fn(&OperationData<'_>, &mut VoxelCache) -> Result<StrategyOutcome, BrushError>;

/// Strategy functions keyed by name
#[derive(Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<StrategyName, StrategyFn>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(StrategyName::FillInsideCircle, fill_inside_circle);
        registry.register(StrategyName::EraseInsideCircle, erase_inside_circle);
        registry.register(StrategyName::FillInsideSphere, fill_inside_sphere);
        registry.register(StrategyName::EraseInsideSphere, erase_inside_sphere);
        registry.register(StrategyName::ThresholdInsideCircle, threshold_inside_circle);
        registry.register(StrategyName::ThresholdInsideSphere, threshold_inside_sphere);
        registry
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.strategies.keys().collect();
        names.sort();
        f.debug_struct("StrategyRegistry")
            .field("strategies", &names)
            .finish()
    }
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: StrategyName, strategy: StrategyFn) {
        self.strategies.insert(name, strategy);
    }

    pub fn unregister(&mut self, name: StrategyName) -> Option<StrategyFn> {
        self.strategies.remove(&name)
    }

    pub fn get(&self, name: StrategyName) -> Option<StrategyFn> {
        self.strategies.get(&name).copied()
    }

    pub fn contains(&self, name: StrategyName) -> bool {
        self.strategies.contains_key(&name)
    }

    /// Run the strategy named in `data`.
    ///
    /// # Errors
    ///
    /// `UnknownStrategy` if nothing is registered under that name, otherwise
    /// whatever the strategy reports.
    pub fn dispatch(
        &self,
        data: &OperationData<'_>,
        voxels: &mut VoxelCache,
    ) -> Result<StrategyOutcome, BrushError> {
        let strategy = self
            .strategies
            .get(&data.strategy)
            .ok_or_else(|| BrushError::UnknownStrategy(data.strategy.to_string()))?;

        let started = Instant::now();
        let outcome = strategy(data, voxels)?;
        debug!(
            strategy = %data.strategy,
            labelmap = data.target.labelmap_id(),
            modified = outcome.modified.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "applied brush strategy"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::volume::Volume;

    pub(crate) struct Fixture {
        pub target: EditTarget,
        pub locked: BTreeSet<Label>,
        pub viewports: Vec<String>,
        pub parameters: HashMap<StrategyName, StrategyParameters>,
    }

    impl Fixture {
        pub(crate) fn volume() -> Self {
            Self {
                target: EditTarget::Volume {
                    volume_id: "seg".to_string(),
                    referenced_volume_id: Some("ct".to_string()),
                },
                locked: BTreeSet::new(),
                viewports: vec!["axial".to_string()],
                parameters: HashMap::from([(
                    StrategyName::ThresholdInsideCircle,
                    StrategyParameters {
                        threshold: Some((-150.0, -70.0)),
                    },
                )]),
            }
        }

        pub(crate) fn stack() -> Self {
            Self {
                target: EditTarget::Stack {
                    image_id: "image-1".to_string(),
                    labelmap_id: "label-1".to_string(),
                },
                ..Self::volume()
            }
        }

        /// Axial brush at `center` with the given radius
        pub(crate) fn data(
            &self,
            strategy: StrategyName,
            center: Vec3,
            radius: f32,
        ) -> OperationData<'_> {
            OperationData {
                strategy,
                target: &self.target,
                points: [
                    center - Vec3::Y * radius,
                    center + Vec3::Y * radius,
                    center - Vec3::X * radius,
                    center + Vec3::X * radius,
                ],
                segment_index: 1,
                segments_locked: &self.locked,
                view_plane_normal: Vec3::Z,
                view_up: Vec3::Y,
                tool_group_id: "tg",
                segmentation_id: "segmentation",
                segmentation_representation_uid: "rep",
                viewport_ids_to_render: &self.viewports,
                strategy_specific_configuration: &self.parameters,
            }
        }
    }

    /// 1mm isotropic cube of `size` voxels with its first voxel at the origin
    pub(crate) fn cube<T: Clone + Default>(size: usize) -> Volume<T> {
        Volume::zeros((size, size, size), (1.0, 1.0, 1.0), Vec3::ZERO)
    }
}
