//! [`AffordanceExtractor`] – point clusters in, walkable surface patches out.
//!
//! Per cluster the extractor
//!
//! 1. fits a least-squares plane and orients its normal away from the sensor
//!    viewpoint,
//! 2. classifies boundary points ([`BoundaryEstimator`]),
//! 3. orders them around the centroid and simplifies the ring
//!    ([`douglas_peucker`]),
//! 4. draws a bounded set of interior samples ([`SurfaceSampler`]).
//!
//! Clusters that cannot produce a border with at least three vertices are
//! dropped with a warning; they never abort the batch.

use footstep_types::{Affordance, Point3, PointCloud, SurfaceSample};
use nalgebra::Unit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::boundary::BoundaryEstimator;
use crate::plane::{fit_plane, orient_away_from, orient_like};
use crate::sampling::SurfaceSampler;
use crate::simplify::{douglas_peucker, order_around};

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Tuning of the extraction stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Neighbourhood radius of the boundary test (metres).
    #[serde(default = "default_boundary_radius")]
    pub boundary_radius: f64,

    /// Angular gap that marks a boundary point (degrees).
    #[serde(default = "default_boundary_angle_deg")]
    pub boundary_angle_deg: f64,

    /// Douglas–Peucker tolerance (metres).
    #[serde(default = "default_simplify_tolerance")]
    pub simplify_tolerance: f64,

    /// Upper bound on surface samples per cluster.
    #[serde(default = "default_sample_target")]
    pub sample_target: usize,

    /// Lower bound on surface samples per cluster.
    #[serde(default = "default_sample_min")]
    pub sample_min: usize,

    /// Numerator of the size-scaled sampling ratio.
    #[serde(default = "default_sample_ratio_numerator")]
    pub sample_ratio_numerator: f64,

    /// Fixed RNG seed; `None` draws from OS entropy on every call.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Sensor viewpoint in the sensor frame; plane normals face away from it.
    #[serde(default)]
    pub viewpoint: [f64; 3],
}

fn default_boundary_radius() -> f64 {
    0.1
}
fn default_boundary_angle_deg() -> f64 {
    45.0
}
fn default_simplify_tolerance() -> f64 {
    0.05
}
fn default_sample_target() -> usize {
    100
}
fn default_sample_min() -> usize {
    2
}
fn default_sample_ratio_numerator() -> f64 {
    0.04 * 3000.0
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            boundary_radius: default_boundary_radius(),
            boundary_angle_deg: default_boundary_angle_deg(),
            simplify_tolerance: default_simplify_tolerance(),
            sample_target: default_sample_target(),
            sample_min: default_sample_min(),
            sample_ratio_numerator: default_sample_ratio_numerator(),
            seed: None,
            viewpoint: [0.0; 3],
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Why a single cluster produced no affordance.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("cluster has {actual} points, at least 3 are required")]
    TooFewPoints { actual: usize },

    #[error("simplified border has {vertices} vertices, at least 3 are required")]
    DegenerateBorder { vertices: usize },
}

// ────────────────────────────────────────────────────────────────────────────
// AffordanceExtractor
// ────────────────────────────────────────────────────────────────────────────

/// Turns segmented clusters into [`Affordance`]s in the sensor frame.
#[derive(Debug, Clone)]
pub struct AffordanceExtractor {
    config: ExtractionConfig,
    boundary: BoundaryEstimator,
    sampler: SurfaceSampler,
}

impl AffordanceExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        let boundary = BoundaryEstimator::new(
            config.boundary_radius,
            config.boundary_angle_deg.to_radians(),
        );
        let sampler = SurfaceSampler::new(
            config.sample_target,
            config.sample_min,
            config.sample_ratio_numerator,
        );
        Self {
            config,
            boundary,
            sampler,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract one affordance per usable cluster.  Affordance ids are the
    /// indices of their source clusters.
    pub fn extract(&self, clusters: &[PointCloud]) -> Vec<Affordance> {
        if clusters.is_empty() {
            info!("no clusters to process");
            return Vec::new();
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let affordances: Vec<Affordance> = clusters
            .iter()
            .enumerate()
            .filter_map(|(id, cluster)| match self.extract_one(id, cluster, &mut rng) {
                Ok(affordance) => Some(affordance),
                Err(e) => {
                    warn!(cluster = id, points = cluster.len(), error = %e, "dropping malformed affordance");
                    None
                }
            })
            .collect();

        info!(
            clusters = clusters.len(),
            affordances = affordances.len(),
            "affordance extraction finished"
        );
        affordances
    }

    /// Extract the affordance of a single cluster.
    pub fn extract_one(
        &self,
        id: usize,
        cluster: &PointCloud,
        rng: &mut StdRng,
    ) -> Result<Affordance, ExtractionError> {
        let too_few = ExtractionError::TooFewPoints {
            actual: cluster.len(),
        };
        if cluster.len() < 3 {
            return Err(too_few);
        }
        let plane = fit_plane(cluster.positions()).ok_or(too_few)?;

        let viewpoint = Point3::from(self.config.viewpoint);
        let plane_normal = orient_away_from(plane.normal, &plane.centroid, &viewpoint);

        let flags = self.boundary.classify(cluster, &plane_normal);
        let boundary: Vec<Point3> = cluster
            .points
            .iter()
            .zip(&flags)
            .filter_map(|(p, &on_border)| on_border.then_some(p.position))
            .collect();

        let ordered = order_around(&boundary, &plane.centroid, &plane_normal);
        let border = douglas_peucker(&ordered, self.config.simplify_tolerance);
        if border.len() < 3 {
            return Err(ExtractionError::DegenerateBorder {
                vertices: border.len(),
            });
        }

        let interior: Vec<usize> = flags
            .iter()
            .enumerate()
            .filter_map(|(i, &on_border)| (!on_border).then_some(i))
            .collect();
        let pool: Vec<usize> = if interior.len() >= self.config.sample_min {
            interior
        } else {
            (0..cluster.len()).collect()
        };

        let samples: Vec<SurfaceSample> = self
            .sampler
            .sample(&pool, cluster.len(), rng)
            .into_iter()
            .map(|i| {
                let point = &cluster.points[i];
                let normal = point
                    .normal
                    .and_then(|n| Unit::try_new(n, 1e-12))
                    .map(|n| orient_like(n, &plane_normal))
                    .unwrap_or(plane_normal);
                SurfaceSample {
                    position: point.position,
                    normal,
                }
            })
            .collect();

        debug!(
            cluster = id,
            points = cluster.len(),
            boundary = boundary.len(),
            border = border.len(),
            samples = samples.len(),
            curvature = plane.curvature,
            "affordance extracted"
        );

        Ok(Affordance {
            id,
            border,
            samples,
            plane_normal,
            centroid: plane.centroid,
        })
    }
}

impl Default for AffordanceExtractor {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}
