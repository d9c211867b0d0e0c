//! Least-squares plane descriptor for a point cluster.
//!
//! The plane normal is the eigenvector of the cluster covariance with the
//! smallest eigenvalue; the ratio of that eigenvalue to the trace is reported
//! as the surface curvature.

use footstep_types::{Normal3, Point3};
use nalgebra::{Matrix3, SymmetricEigen, Unit, Vector3};

/// Result of [`fit_plane`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneFit {
    pub centroid: Point3,
    pub normal: Normal3,
    /// `λ_min / (λ0 + λ1 + λ2)`; zero for a perfect plane.
    pub curvature: f64,
}

/// Fit a plane through `points`.
///
/// Returns `None` for fewer than three points or a degenerate covariance.
pub fn fit_plane<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<PlaneFit> {
    let points: Vec<&Point3> = points.into_iter().collect();
    if points.len() < 3 {
        return None;
    }

    let sum: Vector3<f64> = points.iter().map(|p| p.coords).sum();
    let centroid = sum / points.len() as f64;

    let mut cov = Matrix3::zeros();
    for p in &points {
        let diff = p.coords - centroid;
        cov += diff * diff.transpose();
    }

    let eigen = SymmetricEigen::new(cov);
    let smallest = eigen.eigenvalues.imin();
    let normal = Unit::try_new(eigen.eigenvectors.column(smallest).into_owned(), 1e-12)?;

    let trace = eigen.eigenvalues.sum();
    let curvature = if trace > f64::EPSILON {
        eigen.eigenvalues[smallest].max(0.0) / trace
    } else {
        0.0
    };

    Some(PlaneFit {
        centroid: Point3::from(centroid),
        normal,
        curvature,
    })
}

/// Flip `normal` when it points toward `viewpoint` as seen from `point`.
pub fn orient_away_from(normal: Normal3, point: &Point3, viewpoint: &Point3) -> Normal3 {
    let outward = point - viewpoint;
    if normal.into_inner().dot(&outward) < 0.0 {
        Unit::new_unchecked(-normal.into_inner())
    } else {
        normal
    }
}

/// Flip `normal` so that it agrees in sign with `reference`.
pub fn orient_like(normal: Normal3, reference: &Normal3) -> Normal3 {
    if normal.into_inner().dot(&reference.into_inner()) < 0.0 {
        Unit::new_unchecked(-normal.into_inner())
    } else {
        normal
    }
}

/// Two unit vectors `(u, v)` spanning the plane orthogonal to `normal`, with
/// `u × v = normal`.
pub fn tangent_basis(normal: &Normal3) -> (Vector3<f64>, Vector3<f64>) {
    let n = normal.into_inner();
    let hint = if n.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = (hint - n * hint.dot(&n)).normalize();
    let v = n.cross(&u);
    (u, v)
}
