//! Closed-form simulated biped for tests and headless runs.
//!
//! Each leg is modelled as a six-joint gantry hanging from its hip: three
//! prismatic joints followed by roll, pitch and yaw.  That keeps inverse
//! kinematics exact while still giving realistic reach and joint-limit
//! failures, so the whole planning pipeline can run without a robot model.
//!
//! # Example
//!
//! ```rust
//! use footstep_kinematics::{BipedGeometry, LegKinematics, SimulatedBiped};
//! use footstep_types::LegSide;
//! use footstep_types::pose::Pose;
//!
//! let biped = SimulatedBiped::new(LegSide::Left, BipedGeometry::default());
//! let target = Pose::from_translation(0.1, -0.2, 0.0);
//! let joints = biped.solve_ik(&[0.0; 12], &target).unwrap();
//! let reached = biped.solve_fk(&joints).unwrap();
//! assert!(reached.approx_eq(&target, 1e-6));
//! ```

use footstep_types::LegSide;
use footstep_types::pose::{MovingFoot, Pose, StanceFoot, Waist};
use nalgebra::{Isometry3, Translation3, UnitQuaternion};

use crate::solver::{IkError, JointLimit, LegKinematics, check_limits};

/// Leg joints from hip to ankle.
const LEG_JOINTS: [&str; 6] = [
    "hip_sway",
    "hip_lunge",
    "knee_lift",
    "ankle_roll",
    "ankle_pitch",
    "ankle_yaw",
];

/// Body dimensions and joint ranges of the simulated biped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BipedGeometry {
    /// Height of the hip joints above the stance sole (metres).
    pub hip_height: f64,
    /// Lateral distance between the two hips (metres).
    pub hip_width: f64,
    /// Maximum distance between the stance and moving foot origins (metres).
    pub reach: f64,
    /// Roll and pitch range of the ankle (radians, symmetric).
    pub max_tilt: f64,
    /// Yaw range of the ankle (radians, symmetric).
    pub max_yaw: f64,
}

impl Default for BipedGeometry {
    fn default() -> Self {
        Self {
            hip_height: 0.75,
            hip_width: 0.2,
            reach: 0.45,
            max_tilt: 0.5,
            max_yaw: 0.9,
        }
    }
}

/// [`LegKinematics`] for one stance side of a gantry-legged biped.
#[derive(Debug, Clone)]
pub struct SimulatedBiped {
    stance: LegSide,
    geometry: BipedGeometry,
    names: Vec<String>,
    limits: Vec<JointLimit>,
}

impl SimulatedBiped {
    pub fn new(stance: LegSide, geometry: BipedGeometry) -> Self {
        let leg_limits = Self::leg_limits(&geometry);
        let moving = stance.opposite();

        let names = LEG_JOINTS
            .iter()
            .rev()
            .map(|j| format!("{stance}_{j}"))
            .chain(LEG_JOINTS.iter().map(|j| format!("{moving}_{j}")))
            .collect();
        let limits = leg_limits
            .iter()
            .rev()
            .chain(leg_limits.iter())
            .copied()
            .collect();

        Self {
            stance,
            geometry,
            names,
            limits,
        }
    }

    pub fn stance(&self) -> LegSide {
        self.stance
    }

    pub fn geometry(&self) -> &BipedGeometry {
        &self.geometry
    }

    fn leg_limits(g: &BipedGeometry) -> [JointLimit; 6] {
        let lateral = g.reach + g.hip_width;
        [
            JointLimit::symmetric(lateral),
            JointLimit::symmetric(lateral),
            JointLimit::symmetric(g.reach),
            JointLimit::symmetric(g.max_tilt),
            JointLimit::symmetric(g.max_tilt),
            JointLimit::symmetric(g.max_yaw),
        ]
    }

    fn hip_offset(&self, side: LegSide) -> Isometry3<f64> {
        let y = match side {
            LegSide::Left => self.geometry.hip_width / 2.0,
            LegSide::Right => -self.geometry.hip_width / 2.0,
        };
        Isometry3::translation(0.0, y, 0.0)
    }

    /// Hip-to-sole transform of one leg, joints hip to ankle.
    fn leg_transform(&self, q: &[f64]) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::new(q[0], q[1], q[2] - self.geometry.hip_height),
            UnitQuaternion::from_euler_angles(q[3], q[4], q[5]),
        )
    }

    fn waist_to_sole(&self, side: LegSide, q: &[f64]) -> Isometry3<f64> {
        self.hip_offset(side) * self.leg_transform(q)
    }

    fn expect_len(expected: usize, joints: &[f64]) -> Result<(), IkError> {
        if joints.len() == expected {
            Ok(())
        } else {
            Err(IkError::SeedMismatch {
                expected,
                actual: joints.len(),
            })
        }
    }
}

impl LegKinematics for SimulatedBiped {
    fn leg_joint_count(&self) -> usize {
        LEG_JOINTS.len()
    }

    fn joint_names(&self) -> &[String] {
        &self.names
    }

    fn joint_limits(&self) -> &[JointLimit] {
        &self.limits
    }

    /// The stance leg is held straight; the moving leg takes the whole
    /// displacement.
    fn solve_ik(
        &self,
        initial: &[f64],
        target: &Pose<StanceFoot, MovingFoot>,
    ) -> Result<Vec<f64>, IkError> {
        Self::expect_len(self.chain_joint_count(), initial)?;

        let distance = target.translation().norm();
        if !distance.is_finite() || distance > self.geometry.reach {
            return Err(IkError::OutOfReach {
                distance,
                reach: self.geometry.reach,
            });
        }

        let straight = [0.0; 6];
        let waist_to_moving = self.waist_to_sole(self.stance, &straight) * target.isometry();
        let hip_to_moving = self.hip_offset(self.stance.opposite()).inverse() * waist_to_moving;

        let t = hip_to_moving.translation.vector;
        let (roll, pitch, yaw) = hip_to_moving.rotation.euler_angles();
        let moving = [t.x, t.y, t.z + self.geometry.hip_height, roll, pitch, yaw];

        let joints: Vec<f64> = straight.iter().chain(moving.iter()).copied().collect();
        check_limits(&self.names, &self.limits, &joints)?;
        Ok(joints)
    }

    fn solve_fk(&self, joints: &[f64]) -> Result<Pose<StanceFoot, MovingFoot>, IkError> {
        Self::expect_len(self.chain_joint_count(), joints)?;
        let n = self.leg_joint_count();

        let stance: Vec<f64> = joints[..n].iter().rev().copied().collect();
        let waist_to_stance = self.waist_to_sole(self.stance, &stance);
        let waist_to_moving = self.waist_to_sole(self.stance.opposite(), &joints[n..]);
        Ok(Pose::from_isometry(waist_to_stance.inverse() * waist_to_moving))
    }

    fn leg_fk(&self, leg_joints: &[f64]) -> Result<Pose<Waist, StanceFoot>, IkError> {
        Self::expect_len(self.leg_joint_count(), leg_joints)?;
        Ok(Pose::from_isometry(self.waist_to_sole(self.stance, leg_joints)))
    }
}
