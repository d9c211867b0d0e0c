//! Axis-aligned band around the stance foot.
//!
//! Three independent instances (one per sensor-frame axis) together form a
//! box around the stance foot.  Each runs a coarse pass over the border
//! vertices, then trims the samples.

use std::fmt;

use footstep_types::{Affordance, Point3};
use tracing::debug;

use super::AffordanceFilter;
use crate::context::PlanContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// Admits geometry with `|p[axis] − stance[axis]| ≤ margin`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateFilter {
    pub axis: Axis,
    pub margin: f64,
    name: String,
}

impl CoordinateFilter {
    pub fn new(axis: Axis, margin: f64) -> Self {
        Self {
            axis,
            margin,
            name: format!("coordinate_{axis}"),
        }
    }

    pub fn in_band(&self, point: &Point3, centre: &Point3) -> bool {
        let i = self.axis.index();
        (point[i] - centre[i]).abs() <= self.margin
    }
}

impl AffordanceFilter for CoordinateFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, affordances: Vec<Affordance>, ctx: &PlanContext<'_>) -> Vec<Affordance> {
        let centre = ctx.stance_in_sensor().position();

        affordances
            .into_iter()
            .filter_map(|mut a| {
                if !a.border.iter().any(|v| self.in_band(v, &centre)) {
                    debug!(affordance = a.id, axis = %self.axis, "border outside band");
                    return None;
                }
                a.samples.retain(|s| self.in_band(&s.position, &centre));
                if a.samples.is_empty() {
                    debug!(affordance = a.id, axis = %self.axis, "no samples left in band");
                    return None;
                }
                Some(a)
            })
            .collect()
    }
}
