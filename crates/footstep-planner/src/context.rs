//! Per-call planning state shared by the frame generator and every filter.

use std::time::Instant;

use footstep_kinematics::LegContext;
use footstep_types::pose::{Pose, Sensor, StanceFoot, World};
use nalgebra::Vector3;

/// Read-only snapshot of everything one planning call depends on.
#[derive(Debug)]
pub struct PlanContext<'a> {
    pub stance_foot: Pose<World, StanceFoot>,
    pub world_sensor: Pose<World, Sensor>,
    /// Desired walking direction in the world frame (not necessarily unit).
    pub direction: Vector3<f64>,
    pub leg: LegContext<'a>,
    pub deadline: Option<Instant>,
}

impl<'a> PlanContext<'a> {
    pub fn new(
        stance_foot: Pose<World, StanceFoot>,
        world_sensor: Pose<World, Sensor>,
        direction: Vector3<f64>,
        leg: LegContext<'a>,
    ) -> Self {
        Self {
            stance_foot,
            world_sensor,
            direction,
            leg,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// The stance foot seen from the sensor.
    pub fn stance_in_sensor(&self) -> Pose<Sensor, StanceFoot> {
        self.world_sensor.inverse().compose(&self.stance_foot)
    }

    /// World +Z expressed in the sensor frame.
    pub fn up_in_sensor(&self) -> Vector3<f64> {
        self.world_sensor.inverse().transform_vector(&Vector3::z())
    }

    /// Walking direction expressed in the sensor frame.
    pub fn direction_in_sensor(&self) -> Vector3<f64> {
        self.world_sensor.inverse().transform_vector(&self.direction)
    }

    pub fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use footstep_kinematics::{BipedGeometry, SimulatedBiped};
    use footstep_types::LegSide;
    use nalgebra::UnitQuaternion;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn quantities_are_moved_into_the_sensor_frame() {
        let biped = SimulatedBiped::new(LegSide::Left, BipedGeometry::default());
        // Sensor 1 m up, rolled 90° about world X.
        let world_sensor = Pose::new(
            Vector3::new(0.0, 0.0, 1.0),
            UnitQuaternion::from_euler_angles(FRAC_PI_2, 0.0, 0.0),
        );
        let ctx = PlanContext::new(
            Pose::from_translation(0.5, 0.0, 0.0),
            world_sensor,
            Vector3::x(),
            LegContext::new(LegSide::Left, &biped),
        );

        let up = ctx.up_in_sensor();
        assert_relative_eq!(up.y, 1.0, epsilon = 1e-12);

        let stance = ctx.stance_in_sensor().translation();
        assert_relative_eq!(stance.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(stance.y, -1.0, epsilon = 1e-12);

        assert_relative_eq!(ctx.direction_in_sensor().x, 1.0, epsilon = 1e-12);
        assert!(!ctx.deadline_passed());
    }

    #[test]
    fn expired_deadline_is_reported() {
        let biped = SimulatedBiped::new(LegSide::Right, BipedGeometry::default());
        let ctx = PlanContext::new(
            Pose::identity(),
            Pose::identity(),
            Vector3::x(),
            LegContext::new(LegSide::Right, &biped),
        )
        .with_deadline(Some(Instant::now()));
        assert!(ctx.deadline_passed());
    }
}
