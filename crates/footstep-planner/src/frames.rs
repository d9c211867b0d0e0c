//! [`FrameGenerator`] – candidate foot orientations on surface samples.
//!
//! Every surface sample becomes a foot frame whose z axis is the sample
//! normal (turned to face world up) and whose x axis is the walking
//! direction projected into the surface.  That base frame is then fanned
//! across a fixed set of yaw offsets about the normal.

use footstep_types::pose::{MovingFoot, Pose, Sensor};
use footstep_types::{Affordance, CandidateId, FootCandidate, Normal3};
use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};
use tracing::debug;

use crate::config::FrameConfig;
use crate::context::PlanContext;

/// Projected hints shorter than this are considered parallel to the normal.
const MIN_HINT_NORM: f64 = 1e-6;

/// Fans foot frames across every sample of every affordance.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameGenerator {
    yaw_offsets: Vec<f64>,
}

impl FrameGenerator {
    pub fn new(config: &FrameConfig) -> Self {
        Self {
            yaw_offsets: config.yaw_offsets(),
        }
    }

    pub fn yaw_offsets(&self) -> &[f64] {
        &self.yaw_offsets
    }

    /// One candidate per (affordance, sample, yaw) triple, with empty joints.
    pub fn generate(
        &self,
        affordances: &[Affordance],
        ctx: &PlanContext<'_>,
    ) -> Vec<FootCandidate> {
        let up = ctx.up_in_sensor();
        let forward = ctx.direction_in_sensor();

        let candidates: Vec<FootCandidate> = affordances
            .iter()
            .flat_map(|affordance| {
                affordance
                    .samples
                    .iter()
                    .enumerate()
                    .flat_map(move |(s, sample)| {
                        let base = base_orientation(&sample.normal, &up, &forward);
                        self.yaw_offsets.iter().enumerate().map(move |(y, yaw)| {
                            let spin = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), *yaw);
                            let local: Pose<Sensor, MovingFoot> =
                                Pose::new(sample.position.coords, base * spin);
                            FootCandidate::new(
                                CandidateId::new(affordance.id, s, y),
                                ctx.world_sensor.compose(&local),
                                ctx.stance_foot,
                            )
                        })
                    })
            })
            .collect();

        debug!(
            affordances = affordances.len(),
            candidates = candidates.len(),
            "foot frames generated"
        );
        candidates
    }
}

/// Orientation whose z axis is `normal` (flipped to face `up`) and whose x
/// axis is `forward` made orthogonal to it.
///
/// Falls back to the sensor x axis, then the y axis, when `forward` is
/// (nearly) parallel to the normal.
pub fn base_orientation(
    normal: &Normal3,
    up: &Vector3<f64>,
    forward: &Vector3<f64>,
) -> UnitQuaternion<f64> {
    let mut z = normal.into_inner();
    if z.dot(up) < 0.0 {
        z = -z;
    }

    let x = [*forward, Vector3::x(), Vector3::y()]
        .iter()
        .map(|hint| hint - z * hint.dot(&z))
        .find(|projected| projected.norm() > MIN_HINT_NORM)
        .map(|projected| projected.normalize())
        .unwrap_or_else(Vector3::x);
    let y = z.cross(&x);

    let rotation = Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[x, y, z]));
    UnitQuaternion::from_rotation_matrix(&rotation)
}
