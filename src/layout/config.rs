//! Configuration for the layout engine

use super::types::ChainStyle;

/// Configuration options for layout resolution
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Raw pixels per density-independent unit
    pub density_scale: f64,

    /// Bias used when an element declares none
    pub default_bias: f64,

    /// Chain style used when the chain head declares none
    pub default_chain_style: ChainStyle,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            density_scale: 2.0,
            default_bias: 0.5,
            default_chain_style: ChainStyle::Packed,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the density scale
    pub fn with_density_scale(mut self, scale: f64) -> Self {
        self.density_scale = scale;
        self
    }

    /// Set the default bias, clamped to [0, 1]
    pub fn with_default_bias(mut self, bias: f64) -> Self {
        self.default_bias = bias.clamp(0.0, 1.0);
        self
    }

    /// Set the default chain style
    pub fn with_default_chain_style(mut self, style: ChainStyle) -> Self {
        self.default_chain_style = style;
        self
    }
}
