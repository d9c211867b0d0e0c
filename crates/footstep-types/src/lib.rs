//! `footstep-types` – shared vocabulary of the footstep planner.
//!
//! # Modules
//!
//! - [`pose`] – [`Pose<Parent, Child>`][pose::Pose]: rigid transforms tagged
//!   with the two reference frames they relate, so that chaining through the
//!   wrong frame does not compile.
//!
//! The crate root holds the data that flows between pipeline stages: point
//! clusters, extracted [`Affordance`]s, [`FootCandidate`]s and the
//! [`PlannerError`] returned to callers.

pub mod pose;

use std::fmt;

use chrono::{DateTime, Utc};
use nalgebra::{Unit, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pose::{Frame, MovingFoot, Pose, StanceFoot, Waist, World};

/// A 3-D coordinate in metres.
pub type Point3 = nalgebra::Point3<f64>;

/// A unit-length surface normal.
pub type Normal3 = Unit<Vector3<f64>>;

// ────────────────────────────────────────────────────────────────────────────
// Point clusters
// ────────────────────────────────────────────────────────────────────────────

/// One sensor return, optionally carrying a surface normal and a colour.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudPoint {
    pub position: Point3,
    pub normal: Option<Vector3<f64>>,
    pub color: Option<[u8; 3]>,
}

impl CloudPoint {
    pub fn new(position: Point3) -> Self {
        Self {
            position,
            normal: None,
            color: None,
        }
    }

    pub fn with_normal(position: Point3, normal: Vector3<f64>) -> Self {
        Self {
            position,
            normal: Some(normal),
            color: None,
        }
    }
}

/// An ordered sequence of points, typically one segmented surface cluster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    pub points: Vec<CloudPoint>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<CloudPoint>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, point: CloudPoint) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the point positions only.
    pub fn positions(&self) -> impl Iterator<Item = &Point3> + '_ {
        self.points.iter().map(|p| &p.position)
    }
}

impl FromIterator<CloudPoint> for PointCloud {
    fn from_iter<I: IntoIterator<Item = CloudPoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Affordances
// ────────────────────────────────────────────────────────────────────────────

/// A representative surface point with its unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub position: Point3,
    pub normal: Normal3,
}

/// A walkable surface patch extracted from one point cluster, in the sensor
/// frame.
///
/// `plane_normal` is unit length and faces away from the sensor viewpoint;
/// `border` is a closed polyline with at least three vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Affordance {
    /// Index of the source cluster.
    pub id: usize,
    pub border: Vec<Point3>,
    pub samples: Vec<SurfaceSample>,
    pub plane_normal: Normal3,
    pub centroid: Point3,
}

// ────────────────────────────────────────────────────────────────────────────
// Candidates
// ────────────────────────────────────────────────────────────────────────────

/// Which leg a planning call treats as the support leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegSide {
    Left,
    Right,
}

impl LegSide {
    /// The other leg.
    pub fn opposite(self) -> Self {
        match self {
            LegSide::Left => LegSide::Right,
            LegSide::Right => LegSide::Left,
        }
    }
}

impl fmt::Display for LegSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegSide::Left => write!(f, "left"),
            LegSide::Right => write!(f, "right"),
        }
    }
}

/// Structured identity of a candidate: which affordance, which surface
/// sample, which yaw offset.  Ordered lexicographically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CandidateId {
    pub affordance: usize,
    pub sample: usize,
    pub yaw: usize,
}

impl CandidateId {
    pub fn new(affordance: usize, sample: usize, yaw: usize) -> Self {
        Self {
            affordance,
            sample,
            yaw,
        }
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}/s{}/y{}", self.affordance, self.sample, self.yaw)
    }
}

/// A possible placement of the moving foot.
///
/// Created with empty `joints`; the kinematic stage fills them in full-body
/// order and `waist_world` is only derived for the selected candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct FootCandidate {
    pub id: CandidateId,
    pub pose_world: Pose<World, MovingFoot>,
    pub joints: Vec<f64>,
    pub stance_foot_world: Pose<World, StanceFoot>,
    pub waist_world: Option<Pose<World, Waist>>,
}

impl FootCandidate {
    pub fn new(
        id: CandidateId,
        pose_world: Pose<World, MovingFoot>,
        stance_foot_world: Pose<World, StanceFoot>,
    ) -> Self {
        Self {
            id,
            pose_world,
            joints: Vec::new(),
            stance_foot_world,
            waist_world: None,
        }
    }

    /// The candidate expressed relative to its stance foot.
    pub fn relative_to_stance(&self) -> Pose<StanceFoot, MovingFoot> {
        self.stance_foot_world.inverse().compose(&self.pose_world)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Telemetry record
// ────────────────────────────────────────────────────────────────────────────

/// A named frame published for visualisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramePose {
    pub parent: String,
    pub child: String,
    pub translation: [f64; 3],
    /// Quaternion as `[x, y, z, w]`.
    pub rotation: [f64; 4],
    pub timestamp: DateTime<Utc>,
}

impl FramePose {
    /// Snapshot `pose` under an explicit child name.
    pub fn named<P: Frame, C: Frame>(child: &str, pose: &Pose<P, C>) -> Self {
        let t = pose.translation();
        let q = pose.rotation();
        Self {
            parent: P::NAME.to_string(),
            child: child.to_string(),
            translation: [t.x, t.y, t.z],
            rotation: [q.i, q.j, q.k, q.w],
            timestamp: Utc::now(),
        }
    }

    /// Snapshot `pose` using the frame tag names.
    pub fn from_pose<P: Frame, C: Frame>(pose: &Pose<P, C>) -> Self {
        Self::named(C::NAME, pose)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Caller-provided state that must be present before planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingState {
    StanceFoot,
    WorldTransform,
}

impl fmt::Display for MissingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingState::StanceFoot => write!(f, "stance foot pose"),
            MissingState::WorldTransform => write!(f, "world-from-sensor transform"),
        }
    }
}

/// Errors surfaced by a planning call.
///
/// Per-candidate and per-affordance failures never show up here; they only
/// shrink the candidate set.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Precondition violated: {0} is not set")]
    PreconditionViolation(MissingState),

    #[error("No feasible footstep candidate")]
    NoFeasibleCandidate,

    #[error("Kinematics error: {0}")]
    Kinematics(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
