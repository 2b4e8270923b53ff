//! # Layout Configuration
//!
//! Node dimensions and spacing, in abstract units (pixels for SVG
//! renderers). Loaded from the `layout` section of the configuration file;
//! omitted fields keep their defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid layout configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// A dimension is not a finite, non-negative number (or is zero where a
    /// size is required).
    #[error("layout {field} must be a finite {requirement} number, got {value}")]
    InvalidDimension {
        /// The offending field, in its serialized spelling.
        field: &'static str,
        /// "positive" or "non-negative".
        requirement: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Dimensions and spacing for [`calculate_layout`](crate::calculate_layout).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Width of every node box.
    pub node_width: f64,
    /// Height of every node box.
    pub node_height: f64,
    /// Minimum gap between sibling subtrees.
    pub horizontal_spacing: f64,
    /// Vertical distance between the tops of consecutive levels.
    pub level_spacing: f64,
    /// Margin around the whole drawing.
    pub padding: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 180.0,
            node_height: 60.0,
            horizontal_spacing: 40.0,
            level_spacing: 110.0,
            padding: 40.0,
        }
    }
}

impl LayoutConfig {
    /// Check that every dimension is usable.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let sizes = [
            ("nodeWidth", self.node_width),
            ("nodeHeight", self.node_height),
            ("levelSpacing", self.level_spacing),
        ];
        for (field, value) in sizes {
            if !value.is_finite() || value <= 0.0 {
                return Err(LayoutError::InvalidDimension {
                    field,
                    requirement: "positive",
                    value,
                });
            }
        }
        let gaps = [
            ("horizontalSpacing", self.horizontal_spacing),
            ("padding", self.padding),
        ];
        for (field, value) in gaps {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::InvalidDimension {
                    field,
                    requirement: "non-negative",
                    value,
                });
            }
        }
        Ok(())
    }
}
