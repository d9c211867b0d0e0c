//! The leg kinematics seam.
//!
//! The planner never models the robot itself.  It talks to a
//! [`LegKinematics`] implementation covering the combined chain that runs
//! from the stance foot, up the stance leg to the waist, and down the moving
//! leg to the moving foot.  Implementations can wrap an analytic solver, a
//! numeric one, or a simulator, without touching any planning logic.
//!
//! # Combined-chain joint order
//!
//! Joint vectors exchanged through this trait list the stance leg from ankle
//! to hip, then the moving leg from hip to ankle.

use footstep_types::pose::{MovingFoot, Pose, StanceFoot, Waist};
use thiserror::Error;

/// Inclusive range a joint value must stay in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointLimit {
    pub min: f64,
    pub max: f64,
}

impl JointLimit {
    /// Build a limit; the bounds are reordered so that `min ≤ max`.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// `[-bound, bound]`.
    pub fn symmetric(bound: f64) -> Self {
        Self::new(-bound, bound)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Why a solve produced no usable joint vector.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IkError {
    #[error("target is {distance:.3} m from the stance foot, reach is {reach:.3} m")]
    OutOfReach { distance: f64, reach: f64 },

    #[error("joint {joint} value {value:.4} outside [{min:.4}, {max:.4}]")]
    JointLimit {
        joint: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("expected {expected} joint values, got {actual}")]
    SeedMismatch { expected: usize, actual: usize },
}

/// Forward and inverse kinematics of the combined stance-to-moving-foot
/// chain for one fixed stance side.
pub trait LegKinematics: Send + Sync {
    /// Number of joints in a single leg.
    fn leg_joint_count(&self) -> usize;

    /// Number of joints in the combined chain.
    fn chain_joint_count(&self) -> usize {
        2 * self.leg_joint_count()
    }

    /// Joint names in combined-chain order.
    fn joint_names(&self) -> &[String];

    /// Joint limits in combined-chain order.
    fn joint_limits(&self) -> &[JointLimit];

    /// Solve for the joints placing the moving foot at `target`, starting
    /// from `initial`.
    ///
    /// # Errors
    ///
    /// Any [`IkError`]; the caller treats every error as "unreachable".
    fn solve_ik(
        &self,
        initial: &[f64],
        target: &Pose<StanceFoot, MovingFoot>,
    ) -> Result<Vec<f64>, IkError>;

    /// Moving foot placement for a combined-chain joint vector.
    fn solve_fk(&self, joints: &[f64]) -> Result<Pose<StanceFoot, MovingFoot>, IkError>;

    /// Stance foot placement relative to the waist for the stance leg's
    /// joints given from hip to ankle.
    fn leg_fk(&self, leg_joints: &[f64]) -> Result<Pose<Waist, StanceFoot>, IkError>;
}

/// Return the first joint of `joints` outside its limit.
///
/// # Errors
///
/// [`IkError::JointLimit`] naming the offending joint, or
/// [`IkError::SeedMismatch`] when the vector length does not match `limits`.
pub fn check_limits(
    names: &[String],
    limits: &[JointLimit],
    joints: &[f64],
) -> Result<(), IkError> {
    if joints.len() != limits.len() {
        return Err(IkError::SeedMismatch {
            expected: limits.len(),
            actual: joints.len(),
        });
    }
    for (i, (value, limit)) in joints.iter().zip(limits).enumerate() {
        if !limit.contains(*value) {
            return Err(IkError::JointLimit {
                joint: names.get(i).cloned().unwrap_or_else(|| format!("joint_{i}")),
                value: *value,
                min: limit.min,
                max: limit.max,
            });
        }
    }
    Ok(())
}
