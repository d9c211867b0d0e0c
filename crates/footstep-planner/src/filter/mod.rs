//! [`FilterChain`] – ordered, cost-ascending pruning of affordances and
//! candidates.
//!
//! Each stage consumes an owned collection and returns the survivors.
//! Rejections are local: a stage never fails the chain, it only shrinks the
//! collection.  The affordance stages run before frame generation, the
//! candidate stages after it.
//!
//! # Example
//!
//! ```
//! use footstep_planner::filter::{Axis, CoordinateFilter, FilterChain, TiltFilter};
//!
//! let mut chain = FilterChain::new();
//! chain.add_affordance_filter(Box::new(TiltFilter::from_degrees(30.0)));
//! chain.add_affordance_filter(Box::new(CoordinateFilter::new(Axis::X, 0.2)));
//! assert_eq!(chain.stage_names(), vec!["tilt", "coordinate_x"]);
//! ```

pub mod collision;
pub mod coordinate;
pub mod kinematic;
pub mod stability;
pub mod tilt;

use std::sync::Arc;

use footstep_types::{Affordance, FootCandidate};
use nalgebra::Vector3;
use tracing::debug;

use crate::config::FilterConfig;
use crate::context::PlanContext;

pub use collision::{FootCollisionFilter, OrientedBox};
pub use coordinate::{Axis, CoordinateFilter};
pub use kinematic::KinematicFilter;
pub use stability::{AlwaysStable, DynamicFilter, StabilityPolicy};
pub use tilt::TiltFilter;

// ────────────────────────────────────────────────────────────────────────────
// Stage traits
// ────────────────────────────────────────────────────────────────────────────

/// A stage operating on whole affordances.
pub trait AffordanceFilter: Send + Sync {
    /// Stage name used in diagnostics.
    fn name(&self) -> &str;

    /// Return the affordances this stage admits.
    fn apply(&self, affordances: Vec<Affordance>, ctx: &PlanContext<'_>) -> Vec<Affordance>;
}

/// A stage operating on foot candidates.
pub trait CandidateFilter: Send + Sync {
    /// Stage name used in diagnostics.
    fn name(&self) -> &str;

    /// Return the candidates this stage admits.
    fn apply(&self, candidates: Vec<FootCandidate>, ctx: &PlanContext<'_>)
    -> Vec<FootCandidate>;
}

// ────────────────────────────────────────────────────────────────────────────
// FilterChain
// ────────────────────────────────────────────────────────────────────────────

/// Affordance stages followed by candidate stages, each run in insertion
/// order.
#[derive(Default)]
pub struct FilterChain {
    affordance_stages: Vec<Box<dyn AffordanceFilter>>,
    candidate_stages: Vec<Box<dyn CandidateFilter>>,
}

impl FilterChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard chain: tilt, coordinate X/Y/Z, then kinematic, dynamic
    /// and collision.
    pub fn standard(config: &FilterConfig, stability: Arc<dyn StabilityPolicy>) -> Self {
        let mut chain = Self::new();
        chain.add_affordance_filter(Box::new(TiltFilter::from_degrees(config.max_tilt_deg)));
        for (axis, margin) in [Axis::X, Axis::Y, Axis::Z].into_iter().zip(config.band) {
            chain.add_affordance_filter(Box::new(CoordinateFilter::new(axis, margin)));
        }

        let half = Vector3::from(config.foot_half_extents).add_scalar(config.collision_margin);
        chain.add_candidate_filter(Box::new(KinematicFilter));
        chain.add_candidate_filter(Box::new(DynamicFilter::new(stability)));
        chain.add_candidate_filter(Box::new(FootCollisionFilter::new(half)));
        chain
    }

    pub fn add_affordance_filter(&mut self, stage: Box<dyn AffordanceFilter>) {
        self.affordance_stages.push(stage);
    }

    pub fn add_candidate_filter(&mut self, stage: Box<dyn CandidateFilter>) {
        self.candidate_stages.push(stage);
    }

    /// Names of all stages in execution order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.affordance_stages
            .iter()
            .map(|s| s.name())
            .chain(self.candidate_stages.iter().map(|s| s.name()))
            .collect()
    }

    /// Run every affordance stage.
    pub fn filter_affordances(
        &self,
        mut affordances: Vec<Affordance>,
        ctx: &PlanContext<'_>,
    ) -> Vec<Affordance> {
        for stage in &self.affordance_stages {
            let before = affordances.len();
            affordances = stage.apply(affordances, ctx);
            debug!(stage = stage.name(), before, after = affordances.len(), "affordance stage");
        }
        affordances
    }

    /// Run every candidate stage.
    pub fn filter_candidates(
        &self,
        mut candidates: Vec<FootCandidate>,
        ctx: &PlanContext<'_>,
    ) -> Vec<FootCandidate> {
        for stage in &self.candidate_stages {
            let before = candidates.len();
            candidates = stage.apply(candidates, ctx);
            debug!(stage = stage.name(), before, after = candidates.len(), "candidate stage");
        }
        candidates
    }
}
