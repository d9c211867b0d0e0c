//! Swappable stability predicate.
//!
//! The planner ships without a balance model; [`AlwaysStable`] accepts every
//! candidate.  Plug a real policy in through
//! [`FootstepPlanner::with_stability_policy`](crate::FootstepPlanner::with_stability_policy).

use std::sync::Arc;

use footstep_types::FootCandidate;
use tracing::debug;

use super::CandidateFilter;
use crate::context::PlanContext;

/// Decides whether a kinematically feasible candidate keeps the robot
/// balanced.
pub trait StabilityPolicy: Send + Sync {
    /// Policy name used in diagnostics.
    fn name(&self) -> &str;

    fn is_stable(&self, candidate: &FootCandidate, ctx: &PlanContext<'_>) -> bool;
}

/// Accepts every candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlwaysStable;

impl StabilityPolicy for AlwaysStable {
    fn name(&self) -> &str {
        "always_stable"
    }

    fn is_stable(&self, _: &FootCandidate, _: &PlanContext<'_>) -> bool {
        true
    }
}

/// Filter stage wrapping a [`StabilityPolicy`].
pub struct DynamicFilter {
    policy: Arc<dyn StabilityPolicy>,
}

impl DynamicFilter {
    pub fn new(policy: Arc<dyn StabilityPolicy>) -> Self {
        Self { policy }
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }
}

impl CandidateFilter for DynamicFilter {
    fn name(&self) -> &str {
        "dynamic"
    }

    fn apply(&self, candidates: Vec<FootCandidate>, ctx: &PlanContext<'_>) -> Vec<FootCandidate> {
        candidates
            .into_iter()
            .filter(|c| {
                let stable = self.policy.is_stable(c, ctx);
                if !stable {
                    debug!(candidate = %c.id, policy = self.policy.name(), "unstable candidate");
                }
                stable
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::test_support::candidate_at;
    use footstep_kinematics::{BipedGeometry, LegContext, SimulatedBiped};
    use footstep_types::LegSide;
    use footstep_types::pose::Pose;
    use nalgebra::Vector3;

    /// Rejects steps landing more than `max_rise` above the stance foot.
    struct MaxRise(f64);

    impl StabilityPolicy for MaxRise {
        fn name(&self) -> &str {
            "max_rise"
        }

        fn is_stable(&self, candidate: &FootCandidate, ctx: &PlanContext<'_>) -> bool {
            candidate.pose_world.translation().z - ctx.stance_foot.translation().z <= self.0
        }
    }

    fn run(filter: &DynamicFilter, candidates: Vec<FootCandidate>) -> Vec<FootCandidate> {
        let biped = SimulatedBiped::new(LegSide::Left, BipedGeometry::default());
        let ctx = PlanContext::new(
            Pose::identity(),
            Pose::identity(),
            Vector3::x(),
            LegContext::new(LegSide::Left, &biped),
        );
        filter.apply(candidates, &ctx)
    }

    #[test]
    fn default_policy_keeps_everything() {
        let filter = DynamicFilter::new(Arc::new(AlwaysStable));
        assert_eq!(filter.policy_name(), "always_stable");
        let candidates = vec![
            candidate_at(0, 0.1, -0.2, 0.0, 0.0),
            candidate_at(1, 0.1, -0.2, 0.3, 0.0),
        ];
        assert_eq!(run(&filter, candidates.clone()), candidates);
    }

    #[test]
    fn custom_policy_prunes() {
        let filter = DynamicFilter::new(Arc::new(MaxRise(0.1)));
        let kept = run(
            &filter,
            vec![
                candidate_at(0, 0.1, -0.2, 0.05, 0.0),
                candidate_at(1, 0.1, -0.2, 0.3, 0.0),
            ],
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id.sample, 0);
    }
}
