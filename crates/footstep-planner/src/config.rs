//! Planner configuration – TOML file plus `FOOTSTEP_*` environment overrides.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the reference tuning:
//!
//! ```toml
//! deadline_ms = 50
//!
//! [extraction]
//! boundary_radius = 0.1
//! simplify_tolerance = 0.05
//!
//! [frames]
//! yaw_min = -0.8
//! yaw_max = 0.8
//! yaw_step = 0.2
//!
//! [filters]
//! max_tilt_deg = 30.0
//! band = [0.2, 0.2, 0.2]
//!
//! [selection]
//! tolerance = 0.02
//! nominal_step = [0.1, -0.2, 0.0]
//! ```

use std::fs;
use std::path::Path;

use footstep_perception::ExtractionConfig;
use footstep_types::PlannerError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Complete planner tuning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Time budget of the kinematic stage per planning call (milliseconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub frames: FrameConfig,

    #[serde(default)]
    pub filters: FilterConfig,

    #[serde(default)]
    pub selection: SelectionConfig,
}

/// Discrete yaw fan applied around every surface normal (radians).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    #[serde(default = "default_yaw_min")]
    pub yaw_min: f64,
    #[serde(default = "default_yaw_max")]
    pub yaw_max: f64,
    #[serde(default = "default_yaw_step")]
    pub yaw_step: f64,
}

fn default_yaw_min() -> f64 {
    -0.8
}
fn default_yaw_max() -> f64 {
    0.8
}
fn default_yaw_step() -> f64 {
    0.2
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            yaw_min: default_yaw_min(),
            yaw_max: default_yaw_max(),
            yaw_step: default_yaw_step(),
        }
    }
}

impl FrameConfig {
    /// A fan with a single yaw offset.
    pub fn single(yaw: f64) -> Self {
        Self {
            yaw_min: yaw,
            yaw_max: yaw,
            yaw_step: default_yaw_step(),
        }
    }

    /// The yaw offsets, computed from an integer count so that the last
    /// offset lands on `yaw_max` without accumulated drift.
    pub fn yaw_offsets(&self) -> Vec<f64> {
        let span = self.yaw_max - self.yaw_min;
        if span <= 0.0 || self.yaw_step <= 0.0 {
            return vec![self.yaw_min];
        }
        let steps = (span / self.yaw_step + 1e-9).floor() as usize;
        (0..=steps)
            .map(|i| self.yaw_min + i as f64 * self.yaw_step)
            .collect()
    }
}

/// Thresholds of the filter chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Largest admissible deviation of a surface from level (degrees).
    #[serde(default = "default_max_tilt_deg")]
    pub max_tilt_deg: f64,

    /// Half-width of the admissible band around the stance foot, per
    /// sensor-frame axis (metres).
    #[serde(default = "default_band")]
    pub band: [f64; 3],

    /// Half extents of the foot collision box (metres).
    #[serde(default = "default_foot_half_extents")]
    pub foot_half_extents: [f64; 3],

    /// Clearance added to every half extent (metres).
    #[serde(default = "default_collision_margin")]
    pub collision_margin: f64,
}

fn default_max_tilt_deg() -> f64 {
    30.0
}
fn default_band() -> [f64; 3] {
    [0.2; 3]
}
fn default_foot_half_extents() -> [f64; 3] {
    [0.1, 0.05, 0.01]
}
fn default_collision_margin() -> f64 {
    0.01
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_tilt_deg: default_max_tilt_deg(),
            band: default_band(),
            foot_half_extents: default_foot_half_extents(),
            collision_margin: default_collision_margin(),
        }
    }
}

/// Scoring of the surviving candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Distance band (metres) within which candidates count as tied.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Preferred moving-foot offset from a *left* stance foot, in the stance
    /// foot frame.  The lateral component is mirrored for a right stance.
    #[serde(default = "default_nominal_step")]
    pub nominal_step: [f64; 3],
}

fn default_tolerance() -> f64 {
    0.02
}
fn default_nominal_step() -> [f64; 3] {
    [0.1, -0.2, 0.0]
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            nominal_step: default_nominal_step(),
        }
    }
}

impl PlannerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, PlannerError> {
        let cfg: Self = toml::from_str(raw)
            .map_err(|e| PlannerError::Config(format!("Failed to parse config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a config file, apply environment overrides, then validate.
    ///
    /// A missing file yields the defaults (still subject to overrides).
    pub fn load_from(path: &Path) -> Result<Self, PlannerError> {
        let mut cfg = if path.exists() {
            let raw = fs::read_to_string(path).map_err(|e| {
                PlannerError::Config(format!(
                    "Failed to read config at {}: {e}",
                    path.display()
                ))
            })?;
            toml::from_str(&raw)
                .map_err(|e| PlannerError::Config(format!("Failed to parse config: {e}")))?
        } else {
            Self::default()
        };
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `FOOTSTEP_*` environment variable overrides.
    ///
    /// | Variable | Config field |
    /// |---|---|
    /// | `FOOTSTEP_MAX_TILT_DEG` | `filters.max_tilt_deg` |
    /// | `FOOTSTEP_SELECTION_TOLERANCE` | `selection.tolerance` |
    /// | `FOOTSTEP_DEADLINE_MS` | `deadline_ms` |
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Same as [`apply_env_overrides`](Self::apply_env_overrides) with an
    /// explicit variable lookup.  Unparsable values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("FOOTSTEP_MAX_TILT_DEG") {
            match v.parse::<f64>() {
                Ok(deg) => self.filters.max_tilt_deg = deg,
                Err(_) => warn!(value = %v, "ignoring FOOTSTEP_MAX_TILT_DEG"),
            }
        }
        if let Some(v) = lookup("FOOTSTEP_SELECTION_TOLERANCE") {
            match v.parse::<f64>() {
                Ok(tol) => self.selection.tolerance = tol,
                Err(_) => warn!(value = %v, "ignoring FOOTSTEP_SELECTION_TOLERANCE"),
            }
        }
        if let Some(v) = lookup("FOOTSTEP_DEADLINE_MS") {
            match v.parse::<u64>() {
                Ok(ms) => self.deadline_ms = Some(ms),
                Err(_) => warn!(value = %v, "ignoring FOOTSTEP_DEADLINE_MS"),
            }
        }
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), PlannerError> {
        let invalid = |msg: String| Err(PlannerError::InvalidConfig(msg));

        let e = &self.extraction;
        if !(e.boundary_radius > 0.0) {
            return invalid(format!(
                "extraction.boundary_radius must be > 0, got {}",
                e.boundary_radius
            ));
        }
        if !(e.boundary_angle_deg > 0.0 && e.boundary_angle_deg < 360.0) {
            return invalid(format!(
                "extraction.boundary_angle_deg must be in (0, 360), got {}",
                e.boundary_angle_deg
            ));
        }
        if !(e.simplify_tolerance >= 0.0) {
            return invalid(format!(
                "extraction.simplify_tolerance must be >= 0, got {}",
                e.simplify_tolerance
            ));
        }
        if e.sample_target == 0 {
            return invalid("extraction.sample_target must be at least 1".to_string());
        }

        let f = &self.frames;
        if !(f.yaw_min.is_finite() && f.yaw_max.is_finite()) || f.yaw_min > f.yaw_max {
            return invalid(format!(
                "frames.yaw_min ({}) must not exceed frames.yaw_max ({})",
                f.yaw_min, f.yaw_max
            ));
        }
        if f.yaw_max > f.yaw_min && !(f.yaw_step > 0.0) {
            return invalid(format!("frames.yaw_step must be > 0, got {}", f.yaw_step));
        }

        let fl = &self.filters;
        if !(0.0..=90.0).contains(&fl.max_tilt_deg) {
            return invalid(format!(
                "filters.max_tilt_deg must be in [0, 90], got {}",
                fl.max_tilt_deg
            ));
        }
        if fl.band.iter().any(|b| !(*b >= 0.0)) {
            return invalid(format!("filters.band must be non-negative, got {:?}", fl.band));
        }
        if fl.foot_half_extents.iter().any(|h| !(*h > 0.0)) {
            return invalid(format!(
                "filters.foot_half_extents must be positive, got {:?}",
                fl.foot_half_extents
            ));
        }
        if !(fl.collision_margin >= 0.0) {
            return invalid(format!(
                "filters.collision_margin must be >= 0, got {}",
                fl.collision_margin
            ));
        }

        let s = &self.selection;
        if !(s.tolerance >= 0.0) {
            return invalid(format!("selection.tolerance must be >= 0, got {}", s.tolerance));
        }
        if s.nominal_step.iter().any(|v| !v.is_finite()) {
            return invalid(format!(
                "selection.nominal_step must be finite, got {:?}",
                s.nominal_step
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = PlannerConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, PlannerConfig::default());
        assert_eq!(cfg.filters.max_tilt_deg, 30.0);
        assert_eq!(cfg.filters.band, [0.2; 3]);
        assert_eq!(cfg.selection.tolerance, 0.02);
        assert_eq!(cfg.deadline_ms, None);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let cfg = PlannerConfig::from_toml_str(
            r#"
            deadline_ms = 40

            [filters]
            max_tilt_deg = 15.0

            [extraction]
            seed = 9
            "#,
        )
        .unwrap();
        assert_eq!(cfg.deadline_ms, Some(40));
        assert_eq!(cfg.filters.max_tilt_deg, 15.0);
        assert_eq!(cfg.filters.band, [0.2; 3]);
        assert_eq!(cfg.extraction.seed, Some(9));
        assert_eq!(cfg.extraction.boundary_radius, 0.1);
    }

    #[test]
    fn reference_yaw_fan_has_nine_offsets() {
        let offsets = FrameConfig::default().yaw_offsets();
        assert_eq!(offsets.len(), 9);
        assert!((offsets[0] + 0.8).abs() < 1e-12);
        assert!((offsets[8] - 0.8).abs() < 1e-12);
        assert!(offsets[4].abs() < 1e-12);
    }

    #[test]
    fn degenerate_fan_has_one_offset() {
        assert_eq!(FrameConfig::single(0.3).yaw_offsets(), vec![0.3]);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = PlannerConfig::from_toml_str("filters = 3").unwrap_err();
        assert!(matches!(err, PlannerError::Config(_)));
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        let err = PlannerConfig::from_toml_str("[filters]\nmax_tilt_deg = 120.0").unwrap_err();
        assert!(matches!(err, PlannerError::InvalidConfig(_)));

        let err = PlannerConfig::from_toml_str("[selection]\ntolerance = -0.1").unwrap_err();
        assert!(matches!(err, PlannerError::InvalidConfig(_)));

        let err =
            PlannerConfig::from_toml_str("[frames]\nyaw_min = 1.0\nyaw_max = 0.0").unwrap_err();
        assert!(matches!(err, PlannerError::InvalidConfig(_)));
    }

    #[test]
    fn overrides_replace_parsed_values() {
        let vars: HashMap<&str, &str> = [
            ("FOOTSTEP_MAX_TILT_DEG", "20"),
            ("FOOTSTEP_SELECTION_TOLERANCE", "0.05"),
            ("FOOTSTEP_DEADLINE_MS", "not-a-number"),
        ]
        .into_iter()
        .collect();
        let mut cfg = PlannerConfig::default();
        cfg.apply_overrides_from(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.filters.max_tilt_deg, 20.0);
        assert_eq!(cfg.selection.tolerance, 0.05);
        assert_eq!(cfg.deadline_ms, None);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[selection]\nnominal_step = [0.2, -0.18, 0.0]").unwrap();
        let cfg = PlannerConfig::load_from(file.path()).unwrap();
        assert_eq!(cfg.selection.nominal_step, [0.2, -0.18, 0.0]);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = PlannerConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.frames, FrameConfig::default());
    }

    #[test]
    fn config_round_trips_through_toml() {
        let cfg = PlannerConfig {
            deadline_ms: Some(25),
            ..PlannerConfig::default()
        };
        let raw = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(PlannerConfig::from_toml_str(&raw).unwrap(), cfg);
    }
}
