//! Brush configuration.
//!
//! [`BrushSettings`] is the serialisable form with strategies referred to by
//! name. It is validated once when it is turned into a
//! [`BrushConfiguration`], so a misspelt or unregistered strategy is reported
//! at load time instead of on the first stroke.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::BrushError;
use crate::strategies::{StrategyName, StrategyRegistry};

pub const DEFAULT_BRUSH_SIZE: f32 = 25.0;
/// CT fat, in HU
pub const DEFAULT_THRESHOLD: (f32, f32) = (-150.0, -70.0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyParameters {
    /// Inclusive `[lower, upper]` intensity range, only used by threshold
    /// strategies
    #[serde(default)]
    pub threshold: Option<(f32, f32)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrushSettings {
    /// Built-in strategies to register
    #[serde(default = "all_strategy_names")]
    pub strategies: Vec<String>,
    #[serde(default)]
    pub strategy_specific_configuration: HashMap<String, StrategyParameters>,
    pub default_strategy: String,
    pub active_strategy: String,
    pub brush_size: f32,
}

fn all_strategy_names() -> Vec<String> {
    StrategyName::ALL
        .iter()
        .map(|name| name.as_str().to_string())
        .collect()
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            strategies: all_strategy_names(),
            strategy_specific_configuration: HashMap::from([(
                StrategyName::ThresholdInsideCircle.as_str().to_string(),
                StrategyParameters {
                    threshold: Some(DEFAULT_THRESHOLD),
                },
            )]),
            default_strategy: StrategyName::FillInsideCircle.as_str().to_string(),
            active_strategy: StrategyName::FillInsideCircle.as_str().to_string(),
            brush_size: DEFAULT_BRUSH_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BrushConfiguration {
    pub strategies: StrategyRegistry,
    pub strategy_specific_configuration: HashMap<StrategyName, StrategyParameters>,
    pub default_strategy: StrategyName,
    active_strategy: StrategyName,
    brush_size: f32,
}

impl Default for BrushConfiguration {
    fn default() -> Self {
        Self {
            strategies: StrategyRegistry::default(),
            strategy_specific_configuration: HashMap::from([(
                StrategyName::ThresholdInsideCircle,
                StrategyParameters {
                    threshold: Some(DEFAULT_THRESHOLD),
                },
            )]),
            default_strategy: StrategyName::FillInsideCircle,
            active_strategy: StrategyName::FillInsideCircle,
            brush_size: DEFAULT_BRUSH_SIZE,
        }
    }
}

impl BrushConfiguration {
    /// Build a configuration from settings.
    ///
    /// # Errors
    ///
    /// Returns error if a strategy name is unknown or unregistered, the brush
    /// size is not a positive number, or a threshold range is inverted
    pub fn from_settings(settings: &BrushSettings) -> Result<Self, BrushError> {
        let defaults = StrategyRegistry::default();
        let mut strategies = StrategyRegistry::empty();
        for name in &settings.strategies {
            let name: StrategyName = name.parse()?;
            if let Some(strategy) = defaults.get(name) {
                strategies.register(name, strategy);
            }
        }

        let strategy_specific_configuration = settings
            .strategy_specific_configuration
            .iter()
            .map(|(name, parameters)| Ok((name.parse::<StrategyName>()?, *parameters)))
            .collect::<Result<HashMap<_, _>, BrushError>>()?;

        let configuration = Self {
            strategies,
            strategy_specific_configuration,
            default_strategy: settings.default_strategy.parse()?,
            active_strategy: settings.active_strategy.parse()?,
            brush_size: settings.brush_size,
        };
        configuration.validate()?;

        Ok(configuration)
    }

    /// Parse camelCase JSON settings, e.g.
    ///
    /// ```json
    /// {
    ///   "activeStrategy": "THRESHOLD_INSIDE_CIRCLE",
    ///   "defaultStrategy": "FILL_INSIDE_CIRCLE",
    ///   "brushSize": 10,
    ///   "strategySpecificConfiguration": {
    ///     "THRESHOLD_INSIDE_CIRCLE": { "threshold": [0, 50] }
    ///   }
    /// }
    /// ```
    pub fn from_json(json: &str) -> Result<Self, BrushError> {
        let settings: BrushSettings = serde_json::from_str(json)?;
        Self::from_settings(&settings)
    }

    pub fn validate(&self) -> Result<(), BrushError> {
        validate_brush_size(self.brush_size)?;

        for name in [self.default_strategy, self.active_strategy] {
            if !self.strategies.contains(name) {
                return Err(BrushError::UnknownStrategy(name.to_string()));
            }
        }

        for parameters in self.strategy_specific_configuration.values() {
            match parameters.threshold {
                Some((lower, upper)) if lower > upper => {
                    return Err(BrushError::InvalidThreshold { lower, upper });
                }
                _ => {}
            }
        }

        Ok(())
    }

    pub fn active_strategy(&self) -> StrategyName {
        self.active_strategy
    }

    pub fn set_active_strategy(&mut self, name: StrategyName) -> Result<(), BrushError> {
        if !self.strategies.contains(name) {
            return Err(BrushError::UnknownStrategy(name.to_string()));
        }
        self.active_strategy = name;
        Ok(())
    }

    /// Brush radius in world units (mm)
    pub fn brush_size(&self) -> f32 {
        self.brush_size
    }

    pub fn set_brush_size(&mut self, brush_size: f32) -> Result<(), BrushError> {
        validate_brush_size(brush_size)?;
        self.brush_size = brush_size;
        Ok(())
    }
}

fn validate_brush_size(brush_size: f32) -> Result<(), BrushError> {
    if brush_size.is_finite() && brush_size > 0.0 {
        Ok(())
    } else {
        Err(BrushError::InvalidBrushSize(brush_size))
    }
}
