//! [`FootstepPlanner`] – the whole pipeline behind one handle.
//!
//! The caller sets the stance foot pose and the world ← sensor transform,
//! optionally a walking direction, then asks for a plan:
//!
//! ```
//! use footstep_kinematics::{BipedGeometry, SimulatedBiped};
//! use footstep_planner::{FootstepPlanner, PlannerConfig};
//! use footstep_types::pose::Pose;
//! use footstep_types::{LegSide, PlannerError};
//!
//! let mut planner = FootstepPlanner::new(
//!     PlannerConfig::default(),
//!     Box::new(SimulatedBiped::new(LegSide::Left, BipedGeometry::default())),
//!     Box::new(SimulatedBiped::new(LegSide::Right, BipedGeometry::default())),
//! )
//! .unwrap();
//!
//! // Nothing can be planned before the caller-provided state is in place.
//! assert!(matches!(
//!     planner.plan(&[], LegSide::Left),
//!     Err(PlannerError::PreconditionViolation(_))
//! ));
//!
//! planner.set_stance_foot(Pose::identity());
//! planner.set_world_transform(Pose::from_translation(0.0, 0.0, 1.0));
//! assert!(matches!(
//!     planner.plan(&[], LegSide::Left),
//!     Err(PlannerError::NoFeasibleCandidate)
//! ));
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use footstep_kinematics::{LegContext, LegKinematics};
use footstep_perception::AffordanceExtractor;
use footstep_types::pose::{Pose, Sensor, StanceFoot, World};
use footstep_types::{
    Affordance, FootCandidate, FramePose, LegSide, MissingState, PlannerError, PointCloud,
};
use nalgebra::Vector3;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::PlannerConfig;
use crate::context::PlanContext;
use crate::filter::{AlwaysStable, FilterChain, StabilityPolicy};
use crate::frames::FrameGenerator;
use crate::selector::QualityEvaluator;
use crate::telemetry::{NullBroadcaster, PoseBroadcaster};

/// Child frame names used when broadcasting a selected step.
pub const STANCE_FRAME: &str = "stance_foot";
pub const CANDIDATE_FRAME: &str = "footstep_candidate";
pub const WAIST_FRAME: &str = "waist";

pub struct FootstepPlanner {
    config: PlannerConfig,
    extractor: AffordanceExtractor,
    frames: FrameGenerator,
    chain: FilterChain,
    evaluator: QualityEvaluator,
    left_stance: Box<dyn LegKinematics>,
    right_stance: Box<dyn LegKinematics>,
    broadcaster: Box<dyn PoseBroadcaster>,

    stance_foot: Option<Pose<World, StanceFoot>>,
    world_sensor: Option<Pose<World, Sensor>>,
    direction: Vector3<f64>,
}

impl FootstepPlanner {
    /// Build a planner from a validated config and one solver per stance
    /// side.
    pub fn new(
        config: PlannerConfig,
        left_stance: Box<dyn LegKinematics>,
        right_stance: Box<dyn LegKinematics>,
    ) -> Result<Self, PlannerError> {
        config.validate()?;
        Ok(Self {
            extractor: AffordanceExtractor::new(config.extraction.clone()),
            frames: FrameGenerator::new(&config.frames),
            chain: FilterChain::standard(&config.filters, Arc::new(AlwaysStable)),
            evaluator: QualityEvaluator::new(&config.selection),
            left_stance,
            right_stance,
            broadcaster: Box::new(NullBroadcaster),
            stance_foot: None,
            world_sensor: None,
            direction: Vector3::x(),
            config,
        })
    }

    /// Replace the stability policy of the dynamic stage.
    pub fn with_stability_policy(mut self, policy: Arc<dyn StabilityPolicy>) -> Self {
        self.chain = FilterChain::standard(&self.config.filters, policy);
        self
    }

    pub fn with_broadcaster(mut self, broadcaster: Box<dyn PoseBroadcaster>) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    // ── caller-provided state ───────────────────────────────────────────────

    pub fn set_stance_foot(&mut self, pose: Pose<World, StanceFoot>) {
        self.stance_foot = Some(pose);
    }

    pub fn set_world_transform(&mut self, pose: Pose<World, Sensor>) {
        self.world_sensor = Some(pose);
    }

    pub fn world_transform(&self) -> Option<&Pose<World, Sensor>> {
        self.world_sensor.as_ref()
    }

    /// Desired walking direction in the world frame.
    pub fn set_desired_direction(&mut self, direction: Vector3<f64>) {
        self.direction = direction;
    }

    pub fn set_direction_vector(&mut self, x: f64, y: f64, z: f64) {
        self.set_desired_direction(Vector3::new(x, y, z));
    }

    // ── pipeline ────────────────────────────────────────────────────────────

    pub fn extract_affordances(&self, clusters: &[PointCloud]) -> Vec<Affordance> {
        self.extractor.extract(clusters)
    }

    /// Every candidate that survives the filter chain for `side` as stance
    /// leg.  Fails only when the stance foot or world transform is unset.
    pub fn feasible_candidates(
        &self,
        affordances: Vec<Affordance>,
        side: LegSide,
    ) -> Result<Vec<FootCandidate>, PlannerError> {
        let ctx = self.context(side)?;

        let affordances = self.chain.filter_affordances(affordances, &ctx);
        let candidates = self.frames.generate(&affordances, &ctx);
        let generated = candidates.len();
        let candidates = self.chain.filter_candidates(candidates, &ctx);

        info!(
            %side,
            affordances = affordances.len(),
            generated,
            feasible = candidates.len(),
            "candidate filtering finished"
        );
        Ok(candidates)
    }

    /// Pick the best candidate, derive its waist pose and broadcast the
    /// stance, candidate and waist frames.
    pub fn select_best(
        &self,
        candidates: &[FootCandidate],
        side: LegSide,
    ) -> Result<FootCandidate, PlannerError> {
        let stance = self
            .stance_foot
            .ok_or(PlannerError::PreconditionViolation(MissingState::StanceFoot))?;

        let best = self
            .evaluator
            .select(candidates, &stance, side, &self.direction)
            .ok_or(PlannerError::NoFeasibleCandidate)?;
        let mut selected = best.clone();

        let solver = self.solver(side);
        let leg = LegContext::new(side, solver);
        let waist_to_stance = solver
            .leg_fk(leg.stance_leg(&selected.joints))
            .map_err(|e| PlannerError::Kinematics(e.to_string()))?;
        let waist_world = selected.stance_foot_world.compose(&waist_to_stance.inverse());
        selected.waist_world = Some(waist_world);

        self.broadcaster
            .broadcast(FramePose::named(STANCE_FRAME, &selected.stance_foot_world));
        self.broadcaster
            .broadcast(FramePose::named(CANDIDATE_FRAME, &selected.pose_world));
        self.broadcaster
            .broadcast(FramePose::named(WAIST_FRAME, &waist_world));

        let p = selected.pose_world.translation();
        info!(
            candidate = %selected.id,
            x = p.x,
            y = p.y,
            z = p.z,
            "footstep selected"
        );
        Ok(selected)
    }

    /// Extract, filter and select in one call.
    #[instrument(skip_all, fields(plan_id = %Uuid::new_v4(), %side, clusters = clusters.len()))]
    pub fn plan(
        &self,
        clusters: &[PointCloud],
        side: LegSide,
    ) -> Result<FootCandidate, PlannerError> {
        self.check_preconditions()?;
        let affordances = self.extract_affordances(clusters);
        let candidates = self.feasible_candidates(affordances, side)?;
        self.select_best(&candidates, side)
    }

    /// Full-body joint names matching the joint vectors of candidates
    /// planned with `side` as stance leg.
    pub fn joint_order(&self, side: LegSide) -> Vec<String> {
        LegContext::new(side, self.solver(side)).joint_names
    }

    // ── helpers ─────────────────────────────────────────────────────────────

    fn solver(&self, side: LegSide) -> &dyn LegKinematics {
        match side {
            LegSide::Left => self.left_stance.as_ref(),
            LegSide::Right => self.right_stance.as_ref(),
        }
    }

    fn check_preconditions(
        &self,
    ) -> Result<(Pose<World, StanceFoot>, Pose<World, Sensor>), PlannerError> {
        let stance = self
            .stance_foot
            .ok_or(PlannerError::PreconditionViolation(MissingState::StanceFoot))?;
        let world_sensor = self
            .world_sensor
            .ok_or(PlannerError::PreconditionViolation(MissingState::WorldTransform))?;
        Ok((stance, world_sensor))
    }

    fn context(&self, side: LegSide) -> Result<PlanContext<'_>, PlannerError> {
        let (stance, world_sensor) = self.check_preconditions()?;
        let deadline = self
            .config
            .deadline_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));
        Ok(PlanContext::new(
            stance,
            world_sensor,
            self.direction,
            LegContext::new(side, self.solver(side)),
        )
        .with_deadline(deadline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrameConfig;
    use crate::filter::test_support::square_affordance;
    use crate::telemetry::BusBroadcaster;
    use approx::assert_relative_eq;
    use footstep_kinematics::{BipedGeometry, SimulatedBiped};
    use footstep_types::{CloudPoint, Point3};

    fn planner_with(config: PlannerConfig, geometry: BipedGeometry) -> FootstepPlanner {
        FootstepPlanner::new(
            config,
            Box::new(SimulatedBiped::new(LegSide::Left, geometry)),
            Box::new(SimulatedBiped::new(LegSide::Right, geometry)),
        )
        .unwrap()
    }

    /// Single yaw, reference bands and tilt, leg reach 0.15 m.
    fn scenario_planner() -> FootstepPlanner {
        let config = PlannerConfig {
            frames: FrameConfig::single(0.0),
            ..PlannerConfig::default()
        };
        let geometry = BipedGeometry {
            reach: 0.15,
            ..BipedGeometry::default()
        };
        let mut planner = planner_with(config, geometry);
        planner.set_stance_foot(Pose::identity());
        planner.set_world_transform(Pose::identity());
        planner.set_direction_vector(1.0, 0.0, 0.0);
        planner
    }

    fn single_sample(at: [f64; 3]) -> Vec<Affordance> {
        vec![square_affordance(0, at, 0.05, &[at], Vector3::z())]
    }

    /// Exactly level floor patch seen from a sensor 1 m above it.
    fn floor_patch(x0: f64, y0: f64, n: usize, spacing: f64) -> PointCloud {
        (0..n)
            .flat_map(|i| {
                (0..n).map(move |j| {
                    CloudPoint::with_normal(
                        Point3::new(x0 + i as f64 * spacing, y0 + j as f64 * spacing, -1.0),
                        -Vector3::z(),
                    )
                })
            })
            .collect()
    }

    #[test]
    fn zero_clusters_mean_no_feasible_candidate() {
        let planner = scenario_planner();
        assert!(planner.extract_affordances(&[]).is_empty());
        assert!(matches!(
            planner.plan(&[], LegSide::Left),
            Err(PlannerError::NoFeasibleCandidate)
        ));
    }

    #[test]
    fn missing_state_is_reported_before_any_work() {
        let mut planner = planner_with(PlannerConfig::default(), BipedGeometry::default());
        let err = planner
            .feasible_candidates(single_sample([0.0, -0.14, 0.0]), LegSide::Left)
            .unwrap_err();
        assert!(matches!(
            err,
            PlannerError::PreconditionViolation(MissingState::StanceFoot)
        ));

        planner.set_stance_foot(Pose::identity());
        let err = planner.plan(&[], LegSide::Left).unwrap_err();
        assert!(matches!(
            err,
            PlannerError::PreconditionViolation(MissingState::WorldTransform)
        ));
        assert!(planner.world_transform().is_none());
    }

    #[test]
    fn reachable_single_sample_is_selected() {
        let planner = scenario_planner();
        let candidates = planner
            .feasible_candidates(single_sample([0.0, -0.14, 0.0]), LegSide::Left)
            .unwrap();
        assert_eq!(candidates.len(), 1);

        let best = planner.select_best(&candidates, LegSide::Left).unwrap();
        assert_eq!(best.joints.len(), 12);
        assert_relative_eq!(best.pose_world.translation().y, -0.14, epsilon = 1e-12);

        // Straight stance leg: hip height up, half a hip width inboard.
        let waist = best.waist_world.unwrap().translation();
        assert_relative_eq!(waist.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(waist.y, -0.1, epsilon = 1e-12);
        assert_relative_eq!(waist.z, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn unreachable_single_sample_is_infeasible() {
        let planner = scenario_planner();
        let candidates = planner
            .feasible_candidates(single_sample([0.1, -0.14, 0.0]), LegSide::Left)
            .unwrap();
        assert!(candidates.is_empty());
        assert!(matches!(
            planner.select_best(&candidates, LegSide::Left),
            Err(PlannerError::NoFeasibleCandidate)
        ));
    }

    #[test]
    fn joint_order_puts_moving_leg_first() {
        let planner = scenario_planner();
        let names = planner.joint_order(LegSide::Right);
        assert_eq!(names.len(), 12);
        assert_eq!(names[0], "left_hip_sway");
        assert_eq!(names[6], "right_hip_sway");
        assert_eq!(names[11], "right_ankle_yaw");
    }

    #[test]
    fn expired_deadline_leaves_nothing_feasible() {
        let config = PlannerConfig {
            deadline_ms: Some(0),
            frames: FrameConfig::single(0.0),
            ..PlannerConfig::default()
        };
        let mut planner = planner_with(config, BipedGeometry::default());
        planner.set_stance_foot(Pose::identity());
        planner.set_world_transform(Pose::identity());
        let candidates = planner
            .feasible_candidates(single_sample([0.0, -0.14, 0.0]), LegSide::Left)
            .unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn full_pipeline_from_point_cloud() {
        let config = PlannerConfig {
            extraction: footstep_perception::ExtractionConfig {
                seed: Some(11),
                ..Default::default()
            },
            ..PlannerConfig::default()
        };
        let bus = BusBroadcaster::default();
        let mut frames = bus.subscribe();

        let mut planner = planner_with(config, BipedGeometry::default())
            .with_broadcaster(Box::new(bus.clone()));
        planner.set_stance_foot(Pose::identity());
        planner.set_world_transform(Pose::from_translation(0.0, 0.0, 1.0));
        planner.set_desired_direction(Vector3::x());

        let cloud = floor_patch(-0.1, -0.3, 11, 0.02);
        let best = planner.plan(std::slice::from_ref(&cloud), LegSide::Left).unwrap();

        let p = best.pose_world.translation();
        assert!(p.z.abs() < 1e-2);
        assert!(p.y <= -0.12 && p.y >= -0.21, "y = {}", p.y);
        assert_relative_eq!(best.pose_world.z_axis().z, 1.0, epsilon = 1e-6);
        assert!(best.waist_world.is_some());

        let names: Vec<String> = (0..3).map(|_| frames.try_recv().unwrap().child).collect();
        assert_eq!(names, vec![STANCE_FRAME, CANDIDATE_FRAME, WAIST_FRAME]);
    }

    #[test]
    fn right_stance_plans_on_the_left() {
        let config = PlannerConfig {
            extraction: footstep_perception::ExtractionConfig {
                seed: Some(5),
                ..Default::default()
            },
            ..PlannerConfig::default()
        };
        let mut planner = planner_with(config, BipedGeometry::default());
        planner.set_stance_foot(Pose::identity());
        planner.set_world_transform(Pose::from_translation(0.0, 0.0, 1.0));

        let cloud = floor_patch(-0.1, 0.1, 11, 0.02);
        let best = planner.plan(std::slice::from_ref(&cloud), LegSide::Right).unwrap();
        assert!(best.pose_world.translation().y > 0.1);
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let mut config = PlannerConfig::default();
        config.filters.max_tilt_deg = -5.0;
        let result = FootstepPlanner::new(
            config,
            Box::new(SimulatedBiped::new(LegSide::Left, BipedGeometry::default())),
            Box::new(SimulatedBiped::new(LegSide::Right, BipedGeometry::default())),
        );
        assert!(matches!(result, Err(PlannerError::InvalidConfig(_))));
    }
}
