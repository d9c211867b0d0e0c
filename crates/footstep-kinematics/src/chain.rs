//! Full-body joint ordering.
//!
//! Solvers work on the combined stance-to-moving-foot chain, but callers
//! want joints grouped per leg, both listed from hip to ankle:
//!
//! ```text
//! combined:  [s_ankle .. s_hip, m_hip .. m_ankle]
//! full body: [m_hip .. m_ankle, s_hip .. s_ankle]
//! ```

use std::fmt;

use footstep_types::LegSide;

use crate::solver::LegKinematics;

/// Reorder a combined-chain vector into full-body order.
///
/// The first `leg_joints` entries are taken as the stance leg.  A vector
/// shorter than that is treated as stance-only.
///
/// ```rust
/// use footstep_kinematics::chain::to_full_body;
///
/// let combined = ["sa", "sk", "sh", "mh", "mk", "ma"];
/// assert_eq!(
///     to_full_body(&combined, 3),
///     vec!["mh", "mk", "ma", "sh", "sk", "sa"],
/// );
/// ```
pub fn to_full_body<T: Clone>(combined: &[T], leg_joints: usize) -> Vec<T> {
    let split = leg_joints.min(combined.len());
    let (stance, moving) = combined.split_at(split);
    moving
        .iter()
        .cloned()
        .chain(stance.iter().rev().cloned())
        .collect()
}

/// One stance side together with the solver for its chain.
pub struct LegContext<'a> {
    pub side: LegSide,
    pub solver: &'a dyn LegKinematics,
    /// Joint names in full-body order.
    pub joint_names: Vec<String>,
}

impl<'a> LegContext<'a> {
    pub fn new(side: LegSide, solver: &'a dyn LegKinematics) -> Self {
        let joint_names = to_full_body(solver.joint_names(), solver.leg_joint_count());
        Self {
            side,
            solver,
            joint_names,
        }
    }

    /// All-zero combined-chain seed.
    pub fn zero_seed(&self) -> Vec<f64> {
        vec![0.0; self.solver.chain_joint_count()]
    }

    /// Reorder a combined-chain solution into full-body order.
    pub fn to_full_body(&self, combined: &[f64]) -> Vec<f64> {
        to_full_body(combined, self.solver.leg_joint_count())
    }

    /// The stance leg's joints, hip to ankle, out of a full-body vector.
    pub fn stance_leg<'j>(&self, full_body: &'j [f64]) -> &'j [f64] {
        let n = self.solver.leg_joint_count();
        full_body.get(n..).unwrap_or(&[])
    }
}

impl fmt::Debug for LegContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegContext")
            .field("side", &self.side)
            .field("joint_names", &self.joint_names)
            .finish_non_exhaustive()
    }
}
