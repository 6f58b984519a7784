//! Run configuration: cluster tags, sweep resolution, bin grid, resource budget.
//!
//! Purpose
//! - One explicit struct (`EnvelopeCfg`) built by the caller and passed by
//!   reference into the enumerator and generator. Nothing is read from disk here;
//!   the CLI owns file loading.
//! - Cluster topology, mounting style and rotor speed are closed enums so every
//!   consumer matches them exhaustively.
//!
//! Conventions
//! - Tag spellings follow the legacy settings files: `adj | pyr | 3RW | 4RW`,
//!   `conv | hans`, `CS | VS`. Both serde and `FromStr` use them.
//! - The human-readable legacy keys (`"Skew Angle"`, `"Cluster Style"`, ...) are
//!   accepted as serde aliases. Legacy files give resolution as steps
//!   (`"Delta Theta for Simulation"` in degrees, `"Delta H for Simulation"` as a
//!   fraction of `max_h`); these become segment counts unless counts are given.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected settings. Reported before any sweep begins.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown {field} tag {value:?}")]
    UnknownTag { field: &'static str, value: String },
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Cluster topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusterCombination {
    /// Two CMGs in slots 1 and 4 of the four-slot layout.
    #[serde(rename = "adj")]
    AdjacentPair,
    /// Four CMGs, one per slot.
    #[serde(rename = "pyr")]
    Pyramid,
    /// Three reaction wheels on orthogonal axes.
    #[serde(rename = "3RW")]
    TriReactionWheel,
    /// Four reaction wheels in a pyramid.
    #[serde(rename = "4RW")]
    QuadReactionWheel,
}

impl ClusterCombination {
    pub const fn tag(self) -> &'static str {
        match self {
            Self::AdjacentPair => "adj",
            Self::Pyramid => "pyr",
            Self::TriReactionWheel => "3RW",
            Self::QuadReactionWheel => "4RW",
        }
    }

    /// Reaction-wheel clusters have no gimbal freedom.
    pub const fn is_reaction_wheel(self) -> bool {
        matches!(self, Self::TriReactionWheel | Self::QuadReactionWheel)
    }
}

impl FromStr for ClusterCombination {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adj" => Ok(Self::AdjacentPair),
            "pyr" => Ok(Self::Pyramid),
            "3RW" => Ok(Self::TriReactionWheel),
            "4RW" => Ok(Self::QuadReactionWheel),
            other => Err(ConfigError::UnknownTag {
                field: "cluster combination",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ClusterCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Which axis the skew angle is measured on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusterStyle {
    /// Torque axis to horizon is the skew angle.
    #[serde(rename = "conv")]
    Conventional,
    /// Gimbal axis to horizon is the skew angle (tilt = 90° − skew).
    #[serde(rename = "hans")]
    Hanspeter,
}

impl ClusterStyle {
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Conventional => "conv",
            Self::Hanspeter => "hans",
        }
    }
}

impl FromStr for ClusterStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conv" => Ok(Self::Conventional),
            "hans" => Ok(Self::Hanspeter),
            other => Err(ConfigError::UnknownTag {
                field: "cluster style",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ClusterStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Rotor speed regime of a CMG cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeedType {
    /// Every rotor spins at `max_h`.
    #[serde(rename = "CS")]
    Constant,
    /// Rotor momentum is swept over `[0, max_h]`.
    #[serde(rename = "VS")]
    Variable,
}

impl SpeedType {
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Constant => "CS",
            Self::Variable => "VS",
        }
    }
}

impl FromStr for SpeedType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CS" => Ok(Self::Constant),
            "VS" => Ok(Self::Variable),
            other => Err(ConfigError::UnknownTag {
                field: "speed type",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for SpeedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Spherical bin grid for the longest-ray radius estimate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinCfg {
    /// Bins over the polar angle `[0, π]`.
    pub theta: usize,
    /// Bins over the azimuth `[0, 2π)`.
    pub phi: usize,
}

impl BinCfg {
    /// Number of cells; `None` on `usize` overflow.
    pub fn cells(&self) -> Option<usize> {
        self.theta.checked_mul(self.phi)
    }
}

impl Default for BinCfg {
    fn default() -> Self {
        Self { theta: 18, phi: 36 }
    }
}

/// Complete settings for one envelope run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SettingsFile")]
pub struct EnvelopeCfg {
    /// Mounting skew in degrees.
    pub skew_deg: f64,
    /// Maximum momentum per device (N·m·s).
    pub max_h: f64,
    /// Samples over `[0°, 360°)`.
    pub angle_segments: usize,
    /// Samples over `[0, max_h]` (CMG, variable speed) or half the samples over
    /// `[-max_h, max_h]` (reaction wheels).
    pub magnitude_segments: usize,
    pub combination: ClusterCombination,
    pub style: ClusterStyle,
    pub speed: SpeedType,
    pub bins: BinCfg,
    /// Upper bound on the number of swept points; `None` disables the check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_points: Option<usize>,
}

/// On-disk settings. Resolution is given either as segment counts or, in
/// legacy files, as step sizes that are converted to counts.
#[derive(Deserialize)]
struct SettingsFile {
    #[serde(alias = "Skew Angle")]
    skew_deg: f64,
    #[serde(alias = "Max. Angular Momemtum per CMG")]
    max_h: f64,
    angle_segments: Option<usize>,
    magnitude_segments: Option<usize>,
    /// Angle step in degrees.
    #[serde(alias = "Delta Theta for Simulation")]
    delta_theta_deg: Option<f64>,
    /// Magnitude step as a fraction of `max_h`.
    #[serde(alias = "Delta H for Simulation")]
    delta_h: Option<f64>,
    #[serde(alias = "Cluster Combination")]
    combination: ClusterCombination,
    #[serde(alias = "Cluster Style")]
    style: ClusterStyle,
    #[serde(alias = "Speed Type")]
    speed: SpeedType,
    #[serde(default)]
    bins: BinCfg,
    #[serde(default)]
    max_points: Option<usize>,
}

impl TryFrom<SettingsFile> for EnvelopeCfg {
    type Error = ConfigError;

    fn try_from(raw: SettingsFile) -> Result<Self, Self::Error> {
        let angle_segments = match (raw.angle_segments, raw.delta_theta_deg) {
            (Some(n), _) => n,
            (None, Some(step)) => angle_segments_for_step(step)?,
            (None, None) => {
                return Err(ConfigError::invalid(
                    "angle segments",
                    "set angle_segments or \"Delta Theta for Simulation\"",
                ))
            }
        };
        let magnitude_segments = match (raw.magnitude_segments, raw.delta_h) {
            (Some(n), _) => n,
            (None, Some(step)) => magnitude_segments_for_step(step)?,
            (None, None) => {
                return Err(ConfigError::invalid(
                    "magnitude segments",
                    "set magnitude_segments or \"Delta H for Simulation\"",
                ))
            }
        };
        Ok(Self {
            skew_deg: raw.skew_deg,
            max_h: raw.max_h,
            angle_segments,
            magnitude_segments,
            combination: raw.combination,
            style: raw.style,
            speed: raw.speed,
            bins: raw.bins,
            max_points: raw.max_points,
        })
    }
}

/// Samples of `[0°, 360°)` at `step_deg` spacing, rounded to the nearest count.
pub fn angle_segments_for_step(step_deg: f64) -> Result<usize, ConfigError> {
    if !(step_deg.is_finite() && step_deg > 0.0 && step_deg <= 360.0) {
        return Err(ConfigError::invalid(
            "angle step",
            format!("must be in (0, 360] degrees, got {step_deg}"),
        ));
    }
    Ok(((360.0 / step_deg).round() as usize).max(1))
}

/// Samples of `[0, max_h]` at `step` spacing (a fraction of `max_h`), both ends kept.
pub fn magnitude_segments_for_step(step: f64) -> Result<usize, ConfigError> {
    if !(step.is_finite() && step > 0.0 && step <= 1.0) {
        return Err(ConfigError::invalid(
            "magnitude step",
            format!("must be a fraction in (0, 1], got {step}"),
        ));
    }
    Ok((1.0 / step).round() as usize + 1)
}

impl Default for EnvelopeCfg {
    fn default() -> Self {
        Self {
            skew_deg: 54.74,
            max_h: 1.0,
            angle_segments: 36,
            magnitude_segments: 5,
            combination: ClusterCombination::AdjacentPair,
            style: ClusterStyle::Conventional,
            speed: SpeedType::Constant,
            bins: BinCfg::default(),
            max_points: None,
        }
    }
}

impl EnvelopeCfg {
    /// True when the resolved sweep uses the magnitude grid.
    pub fn sweeps_magnitudes(&self) -> bool {
        self.combination.is_reaction_wheel() || self.speed == SpeedType::Variable
    }

    /// True when the resolved sweep uses the angle grid.
    pub fn sweeps_angles(&self) -> bool {
        !self.combination.is_reaction_wheel()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.skew_deg.is_finite() {
            return Err(ConfigError::invalid("skew angle", "must be finite"));
        }
        if !(self.max_h.is_finite() && self.max_h > 0.0) {
            return Err(ConfigError::invalid(
                "max momentum",
                format!("must be finite and > 0, got {}", self.max_h),
            ));
        }
        if self.sweeps_angles() && self.angle_segments == 0 {
            return Err(ConfigError::invalid("angle segments", "need at least 1"));
        }
        if self.sweeps_magnitudes() && self.magnitude_segments < 2 {
            return Err(ConfigError::invalid(
                "magnitude segments",
                format!("need at least 2, got {}", self.magnitude_segments),
            ));
        }
        if self.bins.theta == 0 || self.bins.phi == 0 {
            return Err(ConfigError::invalid("bins", "theta and phi counts must be >= 1"));
        }
        let cells = self.bins.cells().ok_or_else(|| {
            ConfigError::invalid(
                "bins",
                format!("{}x{} grid overflows usize", self.bins.theta, self.bins.phi),
            )
        })?;
        if let Some(limit) = self.max_points {
            if cells > limit {
                return Err(ConfigError::invalid(
                    "bins",
                    format!("{cells} cells exceed the budget of {limit}"),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_parse_and_print() {
        for tag in ["adj", "pyr", "3RW", "4RW"] {
            let c: ClusterCombination = tag.parse().unwrap();
            assert_eq!(c.to_string(), tag);
        }
        assert_eq!("hans".parse::<ClusterStyle>().unwrap(), ClusterStyle::Hanspeter);
        assert_eq!("VS".parse::<SpeedType>().unwrap(), SpeedType::Variable);
    }

    #[test]
    fn unknown_tags_are_config_errors() {
        let err = "hex".parse::<ClusterCombination>().unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownTag {
                field: "cluster combination",
                value: "hex".into()
            }
        );
        assert!("tilted".parse::<ClusterStyle>().is_err());
        assert!("cs".parse::<SpeedType>().is_err());
    }

    #[test]
    fn deserializes_snake_case_keys() {
        let cfg: EnvelopeCfg = serde_json::from_str(
            r#"{
                "skew_deg": 30.0,
                "max_h": 2.5,
                "angle_segments": 12,
                "magnitude_segments": 4,
                "combination": "pyr",
                "style": "hans",
                "speed": "VS",
                "bins": {"theta": 6, "phi": 12},
                "max_points": 1000
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.combination, ClusterCombination::Pyramid);
        assert_eq!(cfg.style, ClusterStyle::Hanspeter);
        assert_eq!(cfg.speed, SpeedType::Variable);
        assert_eq!(cfg.bins, BinCfg { theta: 6, phi: 12 });
        assert_eq!(cfg.max_points, Some(1000));
        cfg.validate().unwrap();
    }

    #[test]
    fn deserializes_legacy_keys_with_defaults() {
        let cfg: EnvelopeCfg = serde_json::from_str(
            r#"{
                "Skew Angle": 54.74,
                "Max. Angular Momemtum per CMG": 0.8,
                "angle_segments": 24,
                "magnitude_segments": 3,
                "Cluster Combination": "adj",
                "Cluster Style": "conv",
                "Speed Type": "CS"
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.max_h, 0.8);
        assert_eq!(cfg.bins, BinCfg::default());
        assert_eq!(cfg.max_points, None);
    }

    #[test]
    fn legacy_step_keys_become_segment_counts() {
        let cfg: EnvelopeCfg = serde_json::from_str(
            r#"{
                "Skew Angle": 54.74,
                "Max. Angular Momemtum per CMG": 1.0,
                "Delta H for Simulation": 0.25,
                "Delta Theta for Simulation": 10,
                "Cluster Combination": "pyr",
                "Cluster Style": "hans",
                "Speed Type": "VS"
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.angle_segments, 36);
        assert_eq!(cfg.magnitude_segments, 5);
        assert_eq!(cfg.style, ClusterStyle::Hanspeter);
        cfg.validate().unwrap();
    }

    #[test]
    fn segment_counts_win_over_steps() {
        let cfg: EnvelopeCfg = serde_json::from_str(
            r#"{"skew_deg": 0.0, "max_h": 1.0, "angle_segments": 8,
                "Delta Theta for Simulation": 10, "delta_h": 0.5,
                "combination": "adj", "style": "conv", "speed": "VS"}"#,
        )
        .unwrap();
        assert_eq!(cfg.angle_segments, 8);
        assert_eq!(cfg.magnitude_segments, 3);
    }

    #[test]
    fn missing_resolution_is_rejected() {
        let err = serde_json::from_str::<EnvelopeCfg>(
            r#"{"skew_deg": 0.0, "max_h": 1.0, "magnitude_segments": 2,
                "combination": "adj", "style": "conv", "speed": "CS"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("angle segments"), "{err}");
    }

    #[test]
    fn step_conversions() {
        assert_eq!(angle_segments_for_step(90.0), Ok(4));
        assert_eq!(angle_segments_for_step(360.0), Ok(1));
        assert_eq!(angle_segments_for_step(7.0), Ok(51));
        assert!(angle_segments_for_step(0.0).is_err());
        assert!(angle_segments_for_step(f64::NAN).is_err());
        assert_eq!(magnitude_segments_for_step(0.1), Ok(11));
        assert_eq!(magnitude_segments_for_step(1.0), Ok(2));
        assert!(magnitude_segments_for_step(1.5).is_err());
    }

    #[test]
    fn serialized_cfg_reads_back() {
        let cfg = EnvelopeCfg {
            skew_deg: 45.0,
            max_points: Some(10_000),
            ..EnvelopeCfg::default()
        };
        let text = serde_json::to_string(&cfg).unwrap();
        assert_eq!(serde_json::from_str::<EnvelopeCfg>(&text).unwrap(), cfg);
    }

    #[test]
    fn unknown_tag_in_json_is_rejected() {
        let res: Result<EnvelopeCfg, _> = serde_json::from_str(
            r#"{"skew_deg": 0.0, "max_h": 1.0, "angle_segments": 4,
                "magnitude_segments": 2, "combination": "ring",
                "style": "conv", "speed": "CS"}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let base = EnvelopeCfg::default();
        assert!(base.validate().is_ok());

        let bad_h = EnvelopeCfg {
            max_h: 0.0,
            ..base.clone()
        };
        assert!(matches!(
            bad_h.validate(),
            Err(ConfigError::Invalid { field: "max momentum", .. })
        ));

        let bad_skew = EnvelopeCfg {
            skew_deg: f64::NAN,
            ..base.clone()
        };
        assert!(bad_skew.validate().is_err());

        let no_angles = EnvelopeCfg {
            angle_segments: 0,
            ..base.clone()
        };
        assert!(no_angles.validate().is_err());

        let no_bins = EnvelopeCfg {
            bins: BinCfg { theta: 0, phi: 4 },
            ..base.clone()
        };
        assert!(no_bins.validate().is_err());
    }

    #[test]
    fn validate_bounds_the_bin_grid() {
        let overflow = EnvelopeCfg {
            bins: BinCfg {
                theta: usize::MAX,
                phi: 2,
            },
            ..EnvelopeCfg::default()
        };
        assert!(matches!(
            overflow.validate(),
            Err(ConfigError::Invalid { field: "bins", .. })
        ));

        let over_budget = EnvelopeCfg {
            angle_segments: 4,
            bins: BinCfg { theta: 100, phi: 100 },
            max_points: Some(5_000),
            ..EnvelopeCfg::default()
        };
        assert!(matches!(
            over_budget.validate(),
            Err(ConfigError::Invalid { field: "bins", .. })
        ));
        let within = EnvelopeCfg {
            bins: BinCfg::default(),
            ..over_budget
        };
        assert!(within.validate().is_ok());
    }

    #[test]
    fn magnitude_segments_only_matter_when_swept() {
        let cs = EnvelopeCfg {
            magnitude_segments: 0,
            ..EnvelopeCfg::default()
        };
        assert!(cs.validate().is_ok());

        let vs = EnvelopeCfg {
            speed: SpeedType::Variable,
            magnitude_segments: 1,
            ..EnvelopeCfg::default()
        };
        assert!(vs.validate().is_err());

        // Reaction wheels always sweep magnitudes, whatever the speed tag says.
        let rw = EnvelopeCfg {
            combination: ClusterCombination::TriReactionWheel,
            angle_segments: 0,
            magnitude_segments: 1,
            ..EnvelopeCfg::default()
        };
        assert!(rw.validate().is_err());
        let rw_ok = EnvelopeCfg {
            magnitude_segments: 2,
            ..rw
        };
        assert!(rw_ok.validate().is_ok());
    }
}
