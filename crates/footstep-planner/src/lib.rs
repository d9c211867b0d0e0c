//! `footstep-planner` – single-step footstep selection for legged robots.
//!
//! Pipeline per planning call:
//!
//! ```text
//! clusters ─► AffordanceExtractor ─► tilt ─► coordinate x/y/z
//!          ─► FrameGenerator ─► kinematic ─► dynamic ─► collision
//!          ─► QualityEvaluator ─► selected candidate + waist pose
//! ```
//!
//! # Modules
//!
//! - [`planner`] – [`FootstepPlanner`], the orchestrator.
//! - [`config`] – [`PlannerConfig`]: TOML loading, env overrides, validation.
//! - [`context`] – [`PlanContext`][context::PlanContext]: per-call state.
//! - [`frames`] – [`FrameGenerator`][frames::FrameGenerator]: foot frames
//!   on surface samples.
//! - [`filter`] – [`FilterChain`][filter::FilterChain] and its stages.
//! - [`selector`] – [`QualityEvaluator`][selector::QualityEvaluator]:
//!   distance band, then alignment.
//! - [`telemetry`] – `tracing` setup and frame broadcasting.

pub mod config;
pub mod context;
pub mod filter;
pub mod frames;
pub mod planner;
pub mod selector;
pub mod telemetry;

pub use config::PlannerConfig;
pub use planner::FootstepPlanner;
pub use telemetry::{BusBroadcaster, NullBroadcaster, PoseBroadcaster, init_tracing};
