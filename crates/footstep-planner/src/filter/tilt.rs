//! Rejects surfaces that are too steep to stand on.

use footstep_types::{Affordance, Normal3};
use nalgebra::Vector3;
use tracing::debug;

use super::AffordanceFilter;
use crate::context::PlanContext;

/// Admits affordances whose plane is within `max_angle` of level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltFilter {
    /// Radians.
    pub max_angle: f64,
}

impl TiltFilter {
    pub fn new(max_angle: f64) -> Self {
        Self { max_angle }
    }

    pub fn from_degrees(max_deg: f64) -> Self {
        Self::new(max_deg.to_radians())
    }
}

/// Unsigned angle between the line of `normal` and `up`.
///
/// Extracted normals face away from the sensor, so a floor seen from above
/// points down; both orientations of the same plane give the same tilt.
pub fn tilt_angle(normal: &Normal3, up: &Vector3<f64>) -> f64 {
    let up = up.normalize();
    normal.into_inner().dot(&up).abs().min(1.0).acos()
}

impl AffordanceFilter for TiltFilter {
    fn name(&self) -> &str {
        "tilt"
    }

    fn apply(&self, affordances: Vec<Affordance>, ctx: &PlanContext<'_>) -> Vec<Affordance> {
        let up = ctx.up_in_sensor();
        affordances
            .into_iter()
            .filter(|a| {
                let tilt = tilt_angle(&a.plane_normal, &up);
                let keep = tilt <= self.max_angle;
                if !keep {
                    debug!(affordance = a.id, tilt_deg = tilt.to_degrees(), "surface too steep");
                }
                keep
            })
            .collect()
    }
}
