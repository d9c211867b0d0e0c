//! `footstep-kinematics` – leg chain solvers for the footstep planner.
//!
//! # Modules
//!
//! - [`solver`] – the [`LegKinematics`] trait every robot model implements,
//!   plus [`JointLimit`] and [`IkError`].
//! - [`chain`] – [`LegContext`][chain::LegContext] and the reordering from
//!   combined-chain to full-body joint order.
//! - [`sim`] – [`SimulatedBiped`], a closed-form biped used by tests and
//!   headless runs.

pub mod chain;
pub mod sim;
pub mod solver;

pub use chain::LegContext;
pub use sim::{BipedGeometry, SimulatedBiped};
pub use solver::{IkError, JointLimit, LegKinematics};
