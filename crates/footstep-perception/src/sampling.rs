//! Bounded random sampling of surface points.
//!
//! Samples are drawn from a pool of candidate points (usually the interior
//! of a cluster).  The sampling ratio is `numerator / cluster_size` and is
//! applied to the pool, giving `clamp(round(ratio · pool), min, target)`,
//! capped by the pool size.  A fully interior cluster therefore yields about
//! `numerator` samples whatever its size, and a cluster that is mostly
//! border yields proportionally fewer.

use rand::Rng;
use rand::seq::index;

/// Sample-count policy plus the random draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSampler {
    /// Upper bound on the number of samples.
    pub target: usize,
    /// Lower bound on the number of samples (when enough points exist).
    pub min: usize,
    /// Numerator of the size-scaled sampling ratio.
    pub ratio_numerator: f64,
}

impl SurfaceSampler {
    pub fn new(target: usize, min: usize, ratio_numerator: f64) -> Self {
        Self {
            target,
            min,
            ratio_numerator,
        }
    }

    /// Fraction of points to keep from a cluster of `cluster_size` points.
    pub fn ratio(&self, cluster_size: usize) -> f64 {
        if cluster_size == 0 {
            return 0.0;
        }
        self.ratio_numerator / cluster_size as f64
    }

    /// How many samples to draw from a pool of `available` points taken out
    /// of a cluster of `cluster_size` points.
    pub fn sample_count(&self, cluster_size: usize, available: usize) -> usize {
        if available == 0 {
            return 0;
        }
        let cluster_size = cluster_size.max(available);
        let wanted = (self.ratio(cluster_size) * available as f64)
            .round()
            .max(0.0) as usize;
        wanted
            .clamp(self.min, self.target.max(self.min))
            .min(available)
    }

    /// Draw distinct entries of `pool` without replacement.  The result keeps
    /// the relative order of `pool`.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        pool: &[usize],
        cluster_size: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        let amount = self.sample_count(cluster_size, pool.len());
        let mut picked = index::sample(rng, pool.len(), amount).into_vec();
        picked.sort_unstable();
        picked.into_iter().map(|i| pool[i]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn count_is_capped_by_target() {
        let sampler = SurfaceSampler::new(100, 2, 120.0);
        assert_eq!(sampler.sample_count(3000, 3000), 100);
        assert_eq!(sampler.sample_count(150, 150), 100);
    }

    #[test]
    fn count_never_exceeds_pool() {
        let sampler = SurfaceSampler::new(100, 2, 120.0);
        assert_eq!(sampler.sample_count(40, 40), 40);
        assert_eq!(sampler.sample_count(1, 1), 1);
        assert_eq!(sampler.sample_count(10, 0), 0);
    }

    #[test]
    fn count_scales_with_interior_share_of_cluster() {
        let sampler = SurfaceSampler::new(100, 2, 120.0);
        assert!((sampler.ratio(3000) - 0.04).abs() < 1e-12);
        // Whole cluster available: about `numerator` samples.
        assert_eq!(sampler.sample_count(3000, 3000), 100);
        // Half the cluster is border.
        assert_eq!(sampler.sample_count(3000, 1500), 60);
        assert_eq!(sampler.sample_count(3000, 750), 30);
        assert_eq!(sampler.sample_count(6000, 750), 15);
    }

    #[test]
    fn pool_larger_than_cluster_is_treated_as_whole_cluster() {
        let sampler = SurfaceSampler::new(100, 2, 60.0);
        assert_eq!(sampler.sample_count(10, 500), 60);
        assert_eq!(sampler.ratio(0), 0.0);
    }

    #[test]
    fn count_respects_minimum() {
        let sampler = SurfaceSampler::new(100, 5, 1.0);
        assert_eq!(sampler.sample_count(1000, 1000), 5);
        assert_eq!(sampler.sample_count(1000, 100), 5);
    }

    #[test]
    fn samples_are_distinct_members_of_pool() {
        let sampler = SurfaceSampler::new(10, 2, 120.0);
        let pool: Vec<usize> = (100..200).step_by(3).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let picked = sampler.sample(&pool, 200, &mut rng);
        assert_eq!(picked.len(), 10);
        assert!(picked.iter().all(|i| pool.contains(i)));
        assert!(picked.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn same_seed_gives_same_samples() {
        let sampler = SurfaceSampler::new(10, 2, 120.0);
        let pool: Vec<usize> = (0..500).collect();
        let a = sampler.sample(&pool, 500, &mut StdRng::seed_from_u64(42));
        let b = sampler.sample(&pool, 500, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
