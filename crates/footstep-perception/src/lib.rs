//! `footstep-perception` – from segmented point clusters to affordances.
//!
//! Turns each surface cluster delivered by the segmentation stage into an
//! [`Affordance`][footstep_types::Affordance]: a simplified border polygon,
//! a bounded set of surface samples and a plane descriptor, all in the
//! sensor frame.
//!
//! # Modules
//!
//! - [`extractor`] – [`AffordanceExtractor`][extractor::AffordanceExtractor]:
//!   the per-cluster pipeline and its [`ExtractionConfig`][extractor::ExtractionConfig].
//! - [`boundary`] – [`BoundaryEstimator`][boundary::BoundaryEstimator]:
//!   angular-gap boundary test over a k-d tree neighbourhood.
//! - [`simplify`] – centroid-relative ring ordering and iterative 3-D
//!   Douglas–Peucker simplification.
//! - [`sampling`] – [`SurfaceSampler`][sampling::SurfaceSampler]: bounded,
//!   size-scaled random sampling.
//! - [`plane`] – least-squares plane fit and normal orientation helpers.

pub mod boundary;
pub mod extractor;
pub mod plane;
pub mod sampling;
pub mod simplify;

pub use extractor::{AffordanceExtractor, ExtractionConfig, ExtractionError};
