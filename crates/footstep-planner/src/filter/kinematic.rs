//! Leg reachability check.
//!
//! Each candidate is expressed relative to the stance foot and handed to the
//! leg solver with an all-zero seed.  A candidate survives when the solve
//! succeeds and every joint is inside its limit; the joint vector is stored
//! in full-body order.

use footstep_kinematics::solver::check_limits;
use footstep_types::FootCandidate;
use tracing::{debug, warn};

use super::CandidateFilter;
use crate::context::PlanContext;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KinematicFilter;

impl CandidateFilter for KinematicFilter {
    fn name(&self) -> &str {
        "kinematic"
    }

    fn apply(&self, candidates: Vec<FootCandidate>, ctx: &PlanContext<'_>) -> Vec<FootCandidate> {
        let solver = ctx.leg.solver;
        let seed = ctx.leg.zero_seed();
        let stance_inv = ctx.stance_foot.inverse();
        let total = candidates.len();
        let mut admitted = Vec::with_capacity(total);

        for (done, mut candidate) in candidates.into_iter().enumerate() {
            if ctx.deadline_passed() {
                warn!(
                    side = %ctx.leg.side,
                    checked = done,
                    dropped = total - done,
                    "planning deadline passed, dropping remaining candidates"
                );
                break;
            }

            let target = stance_inv.compose(&candidate.pose_world);
            let joints = solver.solve_ik(&seed, &target).and_then(|joints| {
                check_limits(solver.joint_names(), solver.joint_limits(), &joints)?;
                Ok(joints)
            });

            match joints {
                Ok(joints) => {
                    candidate.joints = ctx.leg.to_full_body(&joints);
                    candidate.stance_foot_world = ctx.stance_foot;
                    admitted.push(candidate);
                }
                Err(e) => {
                    debug!(candidate = %candidate.id, error = %e, "leg solver rejected candidate");
                }
            }
        }
        admitted
    }
}
