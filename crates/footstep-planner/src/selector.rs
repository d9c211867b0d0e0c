//! [`QualityEvaluator`] – picks one footstep out of the feasible set.
//!
//! Selection is two-pass: first the minimum distance to the nominal step is
//! found, then every candidate within `tolerance` of that minimum forms the
//! tied set.  Inside the tied set the best alignment with the walking
//! direction wins; equal alignments go to the smallest [`CandidateId`].
//!
//! ```
//! use footstep_planner::selector::{StepScore, select_index};
//! use footstep_types::CandidateId;
//!
//! let scores = [
//!     StepScore { id: CandidateId::new(0, 0, 0), distance: 1.00, alignment: 0.2 },
//!     StepScore { id: CandidateId::new(0, 1, 0), distance: 1.01, alignment: 0.9 },
//!     StepScore { id: CandidateId::new(0, 2, 0), distance: 1.05, alignment: 1.0 },
//! ];
//! assert_eq!(select_index(&scores, 0.02), Some(1));
//! ```

use footstep_types::pose::{Pose, StanceFoot, World};
use footstep_types::{CandidateId, FootCandidate, LegSide, Point3};
use nalgebra::Vector3;

use crate::config::SelectionConfig;

/// Directions shorter than this carry no heading.
const MIN_DIRECTION_NORM: f64 = 1e-9;

/// Metrics of one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepScore {
    pub id: CandidateId,
    pub distance: f64,
    pub alignment: f64,
}

/// Index of the winning score, or `None` when no score has a finite
/// distance.
pub fn select_index(scores: &[StepScore], tolerance: f64) -> Option<usize> {
    let min = scores
        .iter()
        .map(|s| s.distance)
        .filter(|d| d.is_finite())
        .min_by(f64::total_cmp)?;
    let limit = min + tolerance;

    let alignment = |s: &StepScore| {
        if s.alignment.is_finite() {
            s.alignment
        } else {
            f64::NEG_INFINITY
        }
    };

    scores
        .iter()
        .enumerate()
        .filter(|(_, s)| s.distance.is_finite() && s.distance <= limit)
        .max_by(|(_, a), (_, b)| {
            alignment(a)
                .total_cmp(&alignment(b))
                .then_with(|| b.id.cmp(&a.id))
        })
        .map(|(i, _)| i)
}

/// Scores candidates against a nominal step and a walking direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityEvaluator {
    pub tolerance: f64,
    /// Nominal offset for a left stance foot.
    pub nominal_step: Vector3<f64>,
}

impl QualityEvaluator {
    pub fn new(config: &SelectionConfig) -> Self {
        Self {
            tolerance: config.tolerance,
            nominal_step: Vector3::from(config.nominal_step),
        }
    }

    /// World position of the nominal step for `side`.
    pub fn nominal_target(&self, stance: &Pose<World, StanceFoot>, side: LegSide) -> Point3 {
        let mut offset = self.nominal_step;
        if side == LegSide::Right {
            offset.y = -offset.y;
        }
        stance.transform_point(&Point3::from(offset))
    }

    pub fn distance(candidate: &FootCandidate, target: &Point3) -> f64 {
        (candidate.pose_world.position() - target).norm()
    }

    /// Cosine between the candidate's forward axis and `direction`; 0 for a
    /// zero direction.
    pub fn alignment(candidate: &FootCandidate, direction: &Vector3<f64>) -> f64 {
        let norm = direction.norm();
        if norm < MIN_DIRECTION_NORM {
            return 0.0;
        }
        candidate.pose_world.x_axis().into_inner().dot(&(direction / norm))
    }

    pub fn score(
        &self,
        candidate: &FootCandidate,
        target: &Point3,
        direction: &Vector3<f64>,
    ) -> StepScore {
        StepScore {
            id: candidate.id,
            distance: Self::distance(candidate, target),
            alignment: Self::alignment(candidate, direction),
        }
    }

    /// The best candidate, or `None` for an empty (or all non-finite) set.
    pub fn select<'c>(
        &self,
        candidates: &'c [FootCandidate],
        stance: &Pose<World, StanceFoot>,
        side: LegSide,
        direction: &Vector3<f64>,
    ) -> Option<&'c FootCandidate> {
        let target = self.nominal_target(stance, side);
        let scores: Vec<StepScore> = candidates
            .iter()
            .map(|c| self.score(c, &target, direction))
            .collect();
        select_index(&scores, self.tolerance).map(|i| &candidates[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use footstep_types::pose::MovingFoot;
    use nalgebra::UnitQuaternion;

    fn score(sample: usize, distance: f64, alignment: f64) -> StepScore {
        StepScore {
            id: CandidateId::new(0, sample, 0),
            distance,
            alignment,
        }
    }

    fn candidate(sample: usize, x: f64, y: f64, yaw: f64) -> FootCandidate {
        let pose: Pose<World, MovingFoot> = Pose::new(
            Vector3::new(x, y, 0.0),
            UnitQuaternion::from_euler_angles(0.0, 0.0, yaw),
        );
        FootCandidate::new(CandidateId::new(0, sample, 0), pose, Pose::identity())
    }

    #[test]
    fn near_tie_goes_to_better_alignment() {
        let scores = [score(0, 1.00, 0.3), score(1, 1.01, 0.8)];
        assert_eq!(select_index(&scores, 0.02), Some(1));
    }

    #[test]
    fn clear_distance_winner_ignores_alignment() {
        let scores = [score(0, 1.00, -1.0), score(1, 1.05, 1.0)];
        assert_eq!(select_index(&scores, 0.02), Some(0));
    }

    #[test]
    fn equal_alignment_goes_to_smallest_id() {
        let scores = [score(5, 1.00, 0.5), score(2, 1.01, 0.5), score(9, 1.00, 0.5)];
        assert_eq!(select_index(&scores, 0.02), Some(1));
    }

    #[test]
    fn selection_is_order_independent() {
        let mut scores = vec![
            score(0, 1.00, 0.5),
            score(1, 1.008, 0.7),
            score(2, 1.012, 0.7),
            score(3, 0.995, 0.1),
        ];
        let winner = scores[select_index(&scores, 0.02).unwrap()].id;
        scores.reverse();
        assert_eq!(scores[select_index(&scores, 0.02).unwrap()].id, winner);
        assert_eq!(winner, CandidateId::new(0, 1, 0));
    }

    #[test]
    fn non_finite_scores_are_ignored() {
        assert_eq!(select_index(&[], 0.02), None);
        assert_eq!(select_index(&[score(0, f64::NAN, 1.0)], 0.02), None);
        let scores = [score(0, f64::INFINITY, 1.0), score(1, 2.0, f64::NAN), score(2, 2.0, 0.0)];
        assert_eq!(select_index(&scores, 0.02), Some(2));
    }

    #[test]
    fn nominal_step_mirrors_for_right_stance() {
        let evaluator = QualityEvaluator::new(&SelectionConfig::default());
        let stance: Pose<World, StanceFoot> = Pose::from_translation(1.0, 0.0, 0.0);
        let left = evaluator.nominal_target(&stance, LegSide::Left);
        let right = evaluator.nominal_target(&stance, LegSide::Right);
        assert_relative_eq!(left.y, -0.2);
        assert_relative_eq!(right.y, 0.2);
        assert_relative_eq!(left.x, 1.1);
    }

    #[test]
    fn alignment_is_cosine_to_direction() {
        let c = candidate(0, 0.0, 0.0, 0.0);
        assert_relative_eq!(QualityEvaluator::alignment(&c, &Vector3::new(3.0, 0.0, 0.0)), 1.0);
        assert_relative_eq!(
            QualityEvaluator::alignment(&c, &Vector3::new(0.0, 2.0, 0.0)),
            0.0,
            epsilon = 1e-12
        );
        assert_eq!(QualityEvaluator::alignment(&c, &Vector3::zeros()), 0.0);
    }

    #[test]
    fn evaluator_picks_aligned_candidate_in_band() {
        let evaluator = QualityEvaluator::new(&SelectionConfig::default());
        let candidates = vec![
            candidate(0, 0.1, -0.2, 0.6),
            candidate(1, 0.105, -0.2, 0.0),
            candidate(2, 0.3, -0.2, 0.0),
        ];
        let best = evaluator
            .select(&candidates, &Pose::identity(), LegSide::Left, &Vector3::x())
            .unwrap();
        assert_eq!(best.id.sample, 1);
        assert!(evaluator.select(&[], &Pose::identity(), LegSide::Left, &Vector3::x()).is_none());
    }
}
