use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};
use crate::types::Colour;

/// Tuning constants for partitioning and the force solver.
///
/// The numeric defaults are empirically tuned and kept exactly as they are;
/// layouts produced with other values are not comparable.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Margin between a region's boundary and its occupant's boundary.
    pub min_gap: f64,
    /// Radius share for a child whose own child count equals its sibling count.
    pub matched_radius_proportion: f64,
    /// Radius share for a busy child (> 2 children) with a different branching factor.
    pub unmatched_radius_proportion: f64,
    /// Radius share for a child drawn as a circle (<= 2 children).
    pub circle_radius_proportion: f64,
    /// Fraction of the smaller surface dimension used as the root radius.
    pub size_proportion: f64,

    pub gather_base: f64,
    pub max_gather_force: f64,
    pub gather_proportion: f64,
    pub force_proportion: f64,
    pub max_repulsion_force: f64,

    /// Arrangement stops once a step's kinetic energy is at or below this.
    pub min_energy: f64,
    /// Upper bound on steps per arrangement.
    pub max_iterations: usize,

    pub background: Colour,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_gap: 3.0,
            matched_radius_proportion: 0.5,
            unmatched_radius_proportion: 0.285,
            circle_radius_proportion: 0.25,
            size_proportion: 0.45,
            gather_base: 0.1,
            max_gather_force: 1.0,
            gather_proportion: 10.0,
            force_proportion: 10_000.0,
            max_repulsion_force: 10.0,
            min_energy: 1e-5,
            max_iterations: 10_000,
            background: Colour::BLACK,
        }
    }
}

impl LayoutConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> LayoutResult<()> {
        if !(self.min_gap.is_finite() && self.min_gap >= 0.0) {
            return Err(LayoutError::Config(format!(
                "min_gap must be finite and >= 0, got {}",
                self.min_gap
            )));
        }

        let proportions = [
            ("matched_radius_proportion", self.matched_radius_proportion),
            ("unmatched_radius_proportion", self.unmatched_radius_proportion),
            ("circle_radius_proportion", self.circle_radius_proportion),
            ("size_proportion", self.size_proportion),
        ];
        for (name, value) in proportions {
            if !(value > 0.0 && value <= 1.0) {
                return Err(LayoutError::Config(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }

        let positives = [
            ("max_gather_force", self.max_gather_force),
            ("gather_proportion", self.gather_proportion),
            ("force_proportion", self.force_proportion),
            ("max_repulsion_force", self.max_repulsion_force),
        ];
        for (name, value) in positives {
            if !(value.is_finite() && value > 0.0) {
                return Err(LayoutError::Config(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }

        if !(self.gather_base.is_finite() && self.gather_base >= 0.0) {
            return Err(LayoutError::Config(format!(
                "gather_base must be finite and >= 0, got {}",
                self.gather_base
            )));
        }
        if !(self.min_energy.is_finite() && self.min_energy >= 0.0) {
            return Err(LayoutError::Config(format!(
                "min_energy must be finite and >= 0, got {}",
                self.min_energy
            )));
        }
        if self.max_iterations == 0 {
            return Err(LayoutError::Config(
                "max_iterations must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> LayoutResult<Self> {
        let cfg: LayoutConfig = serde_json::from_str(json)
            .map_err(|e| LayoutError::Config(format!("JSON parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
