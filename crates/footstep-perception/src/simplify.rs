//! Border ordering and Douglas–Peucker simplification in 3-D.
//!
//! Boundary points come out of classification unordered.  They are first
//! sorted by polar angle around the patch centroid (measured in the plane's
//! tangent basis), which yields a closed ring for star-shaped borders, and
//! then simplified so that every ordered point stays within the tolerance of
//! the kept polyline.
//!
//! # Example
//!
//! ```rust
//! use footstep_perception::simplify::douglas_peucker;
//! use footstep_types::Point3;
//!
//! let line = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.01, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//!     Point3::new(2.0, 1.0, 0.0),
//! ];
//! let kept = douglas_peucker(&line, 0.05);
//! assert_eq!(kept, vec![line[0], line[2], line[3]]);
//! ```

use std::cmp::Ordering;

use footstep_types::{Normal3, Point3};

use crate::plane::tangent_basis;

/// Sort `points` counter-clockwise (about `normal`) around `centre`.
///
/// Points at the same angle are ordered by distance from `centre`.
pub fn order_around(points: &[Point3], centre: &Point3, normal: &Normal3) -> Vec<Point3> {
    let (u, v) = tangent_basis(normal);
    let mut keyed: Vec<(f64, f64, Point3)> = points
        .iter()
        .map(|p| {
            let d = p - centre;
            (d.dot(&v).atan2(d.dot(&u)), d.norm_squared(), *p)
        })
        .collect();
    keyed.sort_by(|a, b| match a.0.total_cmp(&b.0) {
        Ordering::Equal => a.1.total_cmp(&b.1),
        other => other,
    });
    keyed.into_iter().map(|(_, _, p)| p).collect()
}

/// Simplify an ordered polyline, keeping its first and last points.
///
/// Iterative Douglas–Peucker: a range is split at its farthest point while
/// that point lies more than `tolerance` from the chord.  The output is a
/// subsequence of `points`.
pub fn douglas_peucker(points: &[Point3], tolerance: f64) -> Vec<Point3> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0, last)];
    while let Some((first, end)) = stack.pop() {
        if end <= first + 1 {
            continue;
        }
        let (split, distance) = ((first + 1)..end)
            .map(|i| (i, segment_distance(&points[i], &points[first], &points[end])))
            .fold((first, f64::NEG_INFINITY), |best, current| {
                if current.1 > best.1 { current } else { best }
            });
        if distance > tolerance {
            keep[split] = true;
            stack.push((first, split));
            stack.push((split, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Distance from `p` to the segment `a`–`b`.
pub fn segment_distance(p: &Point3, a: &Point3, b: &Point3) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= f64::EPSILON {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Distance from `p` to the open polyline through `vertices`.
pub fn polyline_distance(p: &Point3, vertices: &[Point3]) -> f64 {
    match vertices {
        [] => f64::INFINITY,
        [only] => (p - only).norm(),
        _ => vertices
            .windows(2)
            .map(|w| segment_distance(p, &w[0], &w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}
