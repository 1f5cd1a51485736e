use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Fallback node width when the caller supplies no measured size.
pub const DEFAULT_NODE_WIDTH: f64 = 250.0;
/// Fallback node height when the caller supplies no measured size.
pub const DEFAULT_NODE_HEIGHT: f64 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutAlgorithm {
    Layered,
    Force,
    MultiRootTree,
    Box,
    Sequence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutDirection {
    Down,
    Up,
    Left,
    Right,
}

/// Per-call layout configuration. Spacing values must be positive; the
/// facade rejects non-positive values before any solver work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub algorithm: LayoutAlgorithm,
    /// Meaningful for `Layered` and `MultiRootTree`; ignored elsewhere.
    pub direction: LayoutDirection,
    pub node_spacing: f64,
    pub layer_spacing: f64,
    /// Fallback width for nodes without a measured size.
    pub node_width: f64,
    /// Fallback height for nodes without a measured size.
    pub node_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            algorithm: LayoutAlgorithm::Layered,
            direction: LayoutDirection::Down,
            node_spacing: 80.0,
            layer_spacing: 100.0,
            node_width: DEFAULT_NODE_WIDTH,
            node_height: DEFAULT_NODE_HEIGHT,
        }
    }
}

impl LayoutConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.node_spacing <= 0.0 || !self.node_spacing.is_finite() {
            return Err(LayoutError::invalid_config(format!(
                "node_spacing must be positive, got {}",
                self.node_spacing
            )));
        }
        if self.layer_spacing <= 0.0 || !self.layer_spacing.is_finite() {
            return Err(LayoutError::invalid_config(format!(
                "layer_spacing must be positive, got {}",
                self.layer_spacing
            )));
        }
        Ok(())
    }
}

/// Caller overrides merged over a diagram family's recommended settings.
/// Every field is optional; a set field wins over the family default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutOverrides {
    pub algorithm: Option<LayoutAlgorithm>,
    pub direction: Option<LayoutDirection>,
    pub node_spacing: Option<f64>,
    pub layer_spacing: Option<f64>,
    pub node_width: Option<f64>,
    pub node_height: Option<f64>,
}

impl LayoutOverrides {
    pub fn apply(&self, mut config: LayoutConfig) -> LayoutConfig {
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(direction) = self.direction {
            config.direction = direction;
        }
        if let Some(node_spacing) = self.node_spacing {
            config.node_spacing = node_spacing;
        }
        if let Some(layer_spacing) = self.layer_spacing {
            config.layer_spacing = layer_spacing;
        }
        if let Some(node_width) = self.node_width {
            config.node_width = node_width;
        }
        if let Some(node_height) = self.node_height {
            config.node_height = node_height;
        }
        config
    }
}

/// Diagram families with fixed recommended layout settings. The table is a
/// compatibility contract: renderers rely on these exact values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagramFamily {
    Bdd,
    Ibd,
    Requirements,
    StateMachine,
    Activity,
    Sequence,
    UseCase,
    Package,
}

impl DiagramFamily {
    pub fn parse(family: &str) -> Option<Self> {
        match family {
            "bdd" => Some(Self::Bdd),
            "ibd" => Some(Self::Ibd),
            "requirements" => Some(Self::Requirements),
            "stateMachine" => Some(Self::StateMachine),
            "activity" => Some(Self::Activity),
            "sequence" => Some(Self::Sequence),
            "useCase" => Some(Self::UseCase),
            "package" => Some(Self::Package),
            _ => None,
        }
    }

    /// The recommended settings for this family. Fields the table leaves
    /// open (fallback node sizes for most families, direction for force and
    /// box layouts) keep the `LayoutConfig` defaults.
    pub fn recommended_config(self) -> LayoutConfig {
        let base = LayoutConfig::default();
        match self {
            Self::Bdd => LayoutConfig {
                algorithm: LayoutAlgorithm::Layered,
                direction: LayoutDirection::Down,
                node_spacing: 100.0,
                layer_spacing: 120.0,
                ..base
            },
            Self::Ibd => LayoutConfig {
                algorithm: LayoutAlgorithm::Box,
                node_spacing: 80.0,
                layer_spacing: 80.0,
                ..base
            },
            Self::Requirements => LayoutConfig {
                algorithm: LayoutAlgorithm::Layered,
                direction: LayoutDirection::Down,
                node_spacing: 90.0,
                layer_spacing: 110.0,
                ..base
            },
            Self::StateMachine => LayoutConfig {
                algorithm: LayoutAlgorithm::Force,
                node_spacing: 120.0,
                layer_spacing: 120.0,
                ..base
            },
            Self::Activity => LayoutConfig {
                algorithm: LayoutAlgorithm::Layered,
                direction: LayoutDirection::Down,
                node_spacing: 70.0,
                layer_spacing: 90.0,
                ..base
            },
            Self::Sequence => LayoutConfig {
                algorithm: LayoutAlgorithm::Sequence,
                node_spacing: 280.0,
                layer_spacing: 100.0,
                node_width: 200.0,
                node_height: 100.0,
                ..base
            },
            Self::UseCase => LayoutConfig {
                algorithm: LayoutAlgorithm::Force,
                node_spacing: 150.0,
                layer_spacing: 150.0,
                ..base
            },
            Self::Package => LayoutConfig {
                algorithm: LayoutAlgorithm::MultiRootTree,
                direction: LayoutDirection::Down,
                node_spacing: 100.0,
                layer_spacing: 120.0,
                ..base
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_spacing() {
        let config = LayoutConfig {
            node_spacing: 0.0,
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_err());
        let config = LayoutConfig {
            layer_spacing: -5.0,
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_every_family_token() {
        for token in [
            "bdd",
            "ibd",
            "requirements",
            "stateMachine",
            "activity",
            "sequence",
            "useCase",
            "package",
        ] {
            assert!(DiagramFamily::parse(token).is_some(), "{token}");
        }
        assert!(DiagramFamily::parse("flowchart").is_none());
    }

    #[test]
    fn state_machine_recommendation_matches_table() {
        let config = DiagramFamily::StateMachine.recommended_config();
        assert_eq!(config.algorithm, LayoutAlgorithm::Force);
        assert_eq!(config.node_spacing, 120.0);
        assert_eq!(config.layer_spacing, 120.0);
    }

    #[test]
    fn sequence_recommendation_carries_node_sizes() {
        let config = DiagramFamily::Sequence.recommended_config();
        assert_eq!(config.algorithm, LayoutAlgorithm::Sequence);
        assert_eq!(config.node_spacing, 280.0);
        assert_eq!(config.layer_spacing, 100.0);
        assert_eq!(config.node_width, 200.0);
        assert_eq!(config.node_height, 100.0);
    }

    #[test]
    fn overrides_win_per_field() {
        let overrides = LayoutOverrides {
            node_spacing: Some(50.0),
            ..Default::default()
        };
        let config = overrides.apply(DiagramFamily::StateMachine.recommended_config());
        assert_eq!(config.algorithm, LayoutAlgorithm::Force);
        assert_eq!(config.node_spacing, 50.0);
        assert_eq!(config.layer_spacing, 120.0);
    }
}
