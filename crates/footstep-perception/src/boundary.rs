//! Boundary point classification.
//!
//! A point lies on the boundary of a surface patch when its neighbours, seen
//! from the point and projected onto the local tangent plane, leave a wide
//! angular gap: an interior point is surrounded on all sides, an edge point
//! only on one half.
//!
//! Neighbours are gathered with a radius query on an immutable k-d tree.
//! Its construction tolerates any number of points sharing a coordinate,
//! which level floors and depth-quantised clusters produce routinely.

use std::f64::consts::TAU;

use footstep_types::{Normal3, PointCloud};
use kiddo::{ImmutableKdTree, SquaredEuclidean};
use nalgebra::{Unit, Vector3};

use crate::plane::tangent_basis;

/// Projected offsets shorter than this are ignored.
const MIN_PROJECTED_NORM: f64 = 1e-12;

/// Radius-and-angle boundary classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryEstimator {
    /// Neighbourhood radius in metres.
    pub radius: f64,
    /// Angular gap (radians) above which a point is a boundary point.
    pub angle_threshold: f64,
}

impl BoundaryEstimator {
    pub fn new(radius: f64, angle_threshold: f64) -> Self {
        Self {
            radius,
            angle_threshold,
        }
    }

    /// Flag every point of `cloud` as boundary (`true`) or interior.
    ///
    /// Points without a usable normal are classified against
    /// `fallback_normal`.  Points with fewer than two neighbours are treated
    /// as isolated noise and reported as interior.
    pub fn classify(&self, cloud: &PointCloud, fallback_normal: &Normal3) -> Vec<bool> {
        if cloud.is_empty() {
            return Vec::new();
        }

        let tree = build_kdtree(cloud);
        let radius_sq = self.radius * self.radius;

        cloud
            .points
            .iter()
            .enumerate()
            .map(|(index, point)| {
                let normal = point
                    .normal
                    .and_then(|n| Unit::try_new(n, MIN_PROJECTED_NORM))
                    .unwrap_or(*fallback_normal);
                let query = [point.position.x, point.position.y, point.position.z];
                let offsets: Vec<Vector3<f64>> = tree
                    .within_unsorted::<SquaredEuclidean>(&query, radius_sq)
                    .into_iter()
                    .filter(|n| n.item as usize != index)
                    .map(|n| cloud.points[n.item as usize].position - point.position)
                    .collect();

                largest_angular_gap(&offsets, &normal)
                    .is_some_and(|gap| gap > self.angle_threshold)
            })
            .collect()
    }
}

/// Largest angle (radians) between consecutive neighbour directions around
/// `normal`, including the wrap-around gap.
///
/// Returns `None` when fewer than two offsets survive the projection.
pub fn largest_angular_gap(offsets: &[Vector3<f64>], normal: &Normal3) -> Option<f64> {
    let n = normal.into_inner();
    let (u, v) = tangent_basis(normal);

    let mut angles: Vec<f64> = offsets
        .iter()
        .filter_map(|d| {
            let projected = d - n * d.dot(&n);
            (projected.norm_squared() > MIN_PROJECTED_NORM)
                .then(|| projected.dot(&v).atan2(projected.dot(&u)))
        })
        .collect();

    if angles.len() < 2 {
        return None;
    }
    angles.sort_by(f64::total_cmp);

    let wrap = angles[0] + TAU - angles[angles.len() - 1];
    let gap = angles
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(wrap, f64::max);
    Some(gap)
}

/// Items of the tree are indices into `cloud.points`.
fn build_kdtree(cloud: &PointCloud) -> ImmutableKdTree<f64, 3> {
    let entries: Vec<[f64; 3]> = cloud
        .positions()
        .map(|p| [p.x, p.y, p.z])
        .collect();
    ImmutableKdTree::new_from_slice(&entries)
}
