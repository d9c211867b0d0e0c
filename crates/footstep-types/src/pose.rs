//! Frame-tagged rigid transforms.
//!
//! A [`Pose<Parent, Child>`] is the placement of frame `Child` expressed in
//! frame `Parent`: applying it to a point given in `Child` coordinates yields
//! the same point in `Parent` coordinates.  The two frame tags are
//! zero-sized marker types, so chaining transforms through the wrong frame
//! is rejected by the compiler instead of silently producing a wrong pose.
//!
//! # Example
//!
//! ```rust
//! use footstep_types::pose::{Pose, Sensor, StanceFoot, World};
//! use nalgebra::UnitQuaternion;
//!
//! // Sensor mounted 1 m above the world origin.
//! let world_sensor: Pose<World, Sensor> = Pose::from_translation(0.0, 0.0, 1.0);
//! // Stance foot seen 0.5 m ahead of the sensor.
//! let sensor_foot: Pose<Sensor, StanceFoot> = Pose::from_translation(0.5, 0.0, -1.0);
//!
//! let world_foot = world_sensor.compose(&sensor_foot);
//! assert!((world_foot.translation().x - 0.5).abs() < 1e-12);
//! assert!(world_foot.translation().z.abs() < 1e-12);
//! assert_eq!(world_foot.rotation(), UnitQuaternion::identity());
//! ```

use std::fmt;
use std::marker::PhantomData;

use nalgebra::{Isometry3, Point3, Translation3, Unit, UnitQuaternion, Vector3};

// ────────────────────────────────────────────────────────────────────────────
// Frame tags
// ────────────────────────────────────────────────────────────────────────────

/// A named reference frame.  Implemented by zero-sized marker types only.
pub trait Frame: 'static {
    /// Name used for diagnostics and telemetry, e.g. `"world"`.
    const NAME: &'static str;
}

/// The fixed world frame the caller plans in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct World;

/// The frame of the sensor that produced the point clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sensor;

/// The sole of the support foot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StanceFoot;

/// The sole of the foot being placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovingFoot;

/// The robot waist (root of both leg chains).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waist;

impl Frame for World {
    const NAME: &'static str = "world";
}

impl Frame for Sensor {
    const NAME: &'static str = "sensor";
}

impl Frame for StanceFoot {
    const NAME: &'static str = "stance_foot";
}

impl Frame for MovingFoot {
    const NAME: &'static str = "moving_foot";
}

impl Frame for Waist {
    const NAME: &'static str = "waist";
}

// ────────────────────────────────────────────────────────────────────────────
// Pose
// ────────────────────────────────────────────────────────────────────────────

/// Rigid transform placing frame `C` inside frame `P`.
pub struct Pose<P: Frame, C: Frame> {
    iso: Isometry3<f64>,
    frames: PhantomData<fn() -> (P, C)>,
}

impl<P: Frame, C: Frame> Pose<P, C> {
    /// Build a pose from a translation and a unit rotation.
    pub fn new(translation: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self::from_isometry(Isometry3::from_parts(Translation3::from(translation), rotation))
    }

    /// Wrap an untagged isometry.
    pub fn from_isometry(iso: Isometry3<f64>) -> Self {
        Self {
            iso,
            frames: PhantomData,
        }
    }

    /// Pure translation, identity orientation.
    pub fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self::new(Vector3::new(x, y, z), UnitQuaternion::identity())
    }

    /// The identity transform.
    pub fn identity() -> Self {
        Self::from_isometry(Isometry3::identity())
    }

    /// Borrow the underlying isometry.
    pub fn isometry(&self) -> &Isometry3<f64> {
        &self.iso
    }

    /// Origin of `C` expressed in `P`, as a vector.
    pub fn translation(&self) -> Vector3<f64> {
        self.iso.translation.vector
    }

    /// Origin of `C` expressed in `P`, as a point.
    pub fn position(&self) -> Point3<f64> {
        Point3::from(self.iso.translation.vector)
    }

    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.iso.rotation
    }

    /// The x-axis of `C` expressed in `P` (the forward direction of a foot).
    pub fn x_axis(&self) -> Unit<Vector3<f64>> {
        Unit::new_unchecked(self.iso.rotation * Vector3::x())
    }

    /// The z-axis of `C` expressed in `P` (the sole normal of a foot).
    pub fn z_axis(&self) -> Unit<Vector3<f64>> {
        Unit::new_unchecked(self.iso.rotation * Vector3::z())
    }

    /// Chain transforms: `P←C` followed by `C←G` gives `P←G`.
    pub fn compose<G: Frame>(&self, other: &Pose<C, G>) -> Pose<P, G> {
        Pose::from_isometry(self.iso * other.iso)
    }

    /// The inverse transform, placing `P` inside `C`.
    pub fn inverse(&self) -> Pose<C, P> {
        Pose::from_isometry(self.iso.inverse())
    }

    /// Map a point given in `C` coordinates into `P` coordinates.
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.iso.transform_point(point)
    }

    /// Rotate a direction given in `C` coordinates into `P` coordinates.
    pub fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.iso.transform_vector(vector)
    }

    /// True when both translation and rotation agree within `tolerance`
    /// (metres and radians respectively).
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        // asin of the imaginary part stays accurate near zero, acos of w does not.
        let delta = self.rotation().rotation_to(&other.rotation());
        let angle = 2.0 * delta.imag().norm().min(1.0).asin();
        (self.translation() - other.translation()).norm() <= tolerance && angle <= tolerance
    }
}

impl<P: Frame, C: Frame> Clone for Pose<P, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Frame, C: Frame> Copy for Pose<P, C> {}

impl<P: Frame, C: Frame> PartialEq for Pose<P, C> {
    fn eq(&self, other: &Self) -> bool {
        self.iso == other.iso
    }
}

impl<P: Frame, C: Frame> fmt::Debug for Pose<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.translation();
        let (roll, pitch, yaw) = self.rotation().euler_angles();
        f.debug_struct("Pose")
            .field("parent", &P::NAME)
            .field("child", &C::NAME)
            .field("xyz", &[t.x, t.y, t.z])
            .field("rpy", &[roll, pitch, yaw])
            .finish()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
