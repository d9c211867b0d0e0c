//! Foot-on-foot collision check using oriented bounding boxes.

use footstep_types::FootCandidate;
use footstep_types::pose::{Frame, Pose, World};
use nalgebra::{Matrix3, Point3, Vector3};
use tracing::debug;

use super::CandidateFilter;
use crate::context::PlanContext;

/// Cross products shorter than this come from (nearly) parallel edges and
/// are skipped as separating axes.
const PARALLEL_EPS: f64 = 1e-9;

/// A box with arbitrary orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    pub centre: Point3<f64>,
    /// Box axes as matrix columns.
    pub axes: Matrix3<f64>,
    pub half_extents: Vector3<f64>,
}

impl OrientedBox {
    /// Box centred on the origin of `pose`'s child frame.
    pub fn from_pose<C: Frame>(pose: &Pose<World, C>, half_extents: Vector3<f64>) -> Self {
        Self {
            centre: pose.position(),
            axes: pose.rotation().to_rotation_matrix().into_inner(),
            half_extents,
        }
    }

    fn axis(&self, i: usize) -> Vector3<f64> {
        self.axes.column(i).into_owned()
    }

    /// Half length of the box's projection onto `direction` (unit).
    fn projected_radius(&self, direction: &Vector3<f64>) -> f64 {
        (0..3)
            .map(|i| self.half_extents[i] * self.axis(i).dot(direction).abs())
            .sum()
    }

    /// Separating-axis test over the 15 candidate axes.  Touching boxes
    /// count as intersecting.
    pub fn intersects(&self, other: &OrientedBox) -> bool {
        let offset = other.centre - self.centre;

        let face_axes = (0..3).flat_map(|i| [self.axis(i), other.axis(i)]);
        let edge_axes = (0..3).flat_map(|i| {
            (0..3).filter_map(move |j| {
                let c = self.axis(i).cross(&other.axis(j));
                (c.norm() > PARALLEL_EPS).then(|| c.normalize())
            })
        });

        face_axes.chain(edge_axes).all(|axis| {
            offset.dot(&axis).abs() <= self.projected_radius(&axis) + other.projected_radius(&axis)
        })
    }
}

/// Rejects candidates whose foot box overlaps the stance foot box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootCollisionFilter {
    /// Foot half extents including the clearance margin.
    pub half_extents: Vector3<f64>,
}

impl FootCollisionFilter {
    pub fn new(half_extents: Vector3<f64>) -> Self {
        Self { half_extents }
    }
}

impl CandidateFilter for FootCollisionFilter {
    fn name(&self) -> &str {
        "collision"
    }

    fn apply(&self, candidates: Vec<FootCandidate>, ctx: &PlanContext<'_>) -> Vec<FootCandidate> {
        let stance = OrientedBox::from_pose(&ctx.stance_foot, self.half_extents);
        candidates
            .into_iter()
            .filter(|c| {
                let hit = OrientedBox::from_pose(&c.pose_world, self.half_extents).intersects(&stance);
                if hit {
                    debug!(candidate = %c.id, "foot collides with stance foot");
                }
                !hit
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
    use footstep_types::pose::MovingFoot;
    use nalgebra::UnitQuaternion;
    use std::f64::consts::FRAC_PI_4;

    fn foot() -> Vector3<f64> {
        Vector3::new(0.11, 0.06, 0.02)
    }

    fn box_at(x: f64, y: f64, yaw: f64) -> OrientedBox {
        let pose: Pose<World, MovingFoot> = Pose::new(
            Vector3::new(x, y, 0.0),
            UnitQuaternion::from_euler_angles(0.0, 0.0, yaw),
        );
        OrientedBox::from_pose(&pose, foot())
    }

    #[test]
    fn side_by_side_feet_are_separate() {
        let a = box_at(0.0, 0.0, 0.0);
        assert!(!a.intersects(&box_at(0.0, -0.13, 0.0)));
        assert!(a.intersects(&box_at(0.0, -0.11, 0.0)));
    }

    #[test]
    fn rotation_changes_the_footprint() {
        let a = box_at(0.0, 0.0, 0.0);
        // Aligned, the boxes clear each other along y; turned 45° the
        // corner reaches into the stance box.
        assert!(!a.intersects(&box_at(0.0, -0.125, 0.0)));
        assert!(a.intersects(&box_at(0.0, -0.125, FRAC_PI_4)));
    }

    #[test]
    fn intersection_is_symmetric() {
        let a = box_at(0.0, 0.0, 0.3);
        let b = box_at(0.15, -0.1, -0.4);
        assert_eq!(a.intersects(&b), b.intersects(&a));
    }

    #[test]
    fn filter_drops_overlapping_candidates() {
        let biped = SimulatedBiped::new(LegSide::Left, BipedGeometry::default());
        let ctx = PlanContext::new(
            Pose::identity(),
            Pose::identity(),
            Vector3::x(),
            LegContext::new(LegSide::Left, &biped),
        );
        let kept = FootCollisionFilter::new(foot()).apply(
            vec![
                candidate_at(0, 0.05, -0.05, 0.0, 0.0),
                candidate_at(1, 0.0, -0.2, 0.0, 0.0),
            ],
            &ctx,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id.sample, 1);
    }
}
