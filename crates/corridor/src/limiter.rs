use glam::Vec3;
use roadstream_common::lateral;
use serde::{Deserialize, Serialize};

use crate::corridor::Corridor;

/// Corrections smaller than this are not worth reporting.
const CORRECTION_EPSILON: f32 = 0.01;
/// Minimum time between two boundary-hit log lines.
const HIT_LOG_INTERVAL: f32 = 0.5;

/// How a limiter keeps its subject on the road.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimiterMode {
    /// Clamp straight to the edge.
    Hard,
    /// Push back toward the centre once within `margin` of an edge.
    Soft { strength: f32, margin: f32 },
}

impl Default for LimiterMode {
    fn default() -> Self {
        Self::Soft {
            strength: 20.0,
            margin: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimiterConfig {
    pub enabled: bool,
    pub mode: LimiterMode,
    /// Emit a rate-limited log line whenever the subject is pushed or clamped.
    pub log_boundary_hits: bool,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: LimiterMode::default(),
            log_boundary_hits: false,
        }
    }
}

/// Keeps one subject inside a [`Corridor`].
///
/// The corridor is borrowed per call so every limiter sees the current width.
#[derive(Debug, Clone)]
pub struct BoundaryLimiter {
    config: LimiterConfig,
    last_valid_position: Option<Vec3>,
    since_last_hit_log: f32,
}

impl BoundaryLimiter {
    pub fn new(config: LimiterConfig) -> Self {
        Self {
            config,
            last_valid_position: None,
            since_last_hit_log: HIT_LOG_INTERVAL,
        }
    }

    pub fn hard() -> Self {
        Self::new(LimiterConfig {
            mode: LimiterMode::Hard,
            ..LimiterConfig::default()
        })
    }

    pub fn soft(strength: f32, margin: f32) -> Self {
        Self::new(LimiterConfig {
            mode: LimiterMode::Soft { strength, margin },
            ..LimiterConfig::default()
        })
    }

    pub fn config(&self) -> &LimiterConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        tracing::info!(enabled, "road limiter toggled");
    }

    pub fn set_mode(&mut self, mode: LimiterMode) {
        self.config.mode = mode;
    }

    /// Last position seen inside the corridor.
    pub fn last_valid_position(&self) -> Option<Vec3> {
        self.last_valid_position
    }

    /// Limit `position` for a step of `dt` seconds. Identity when disabled.
    pub fn apply(&mut self, corridor: &Corridor, position: Vec3, dt: f32) -> Vec3 {
        self.since_last_hit_log += dt.max(0.0);
        if !self.config.enabled {
            return position;
        }

        let limited = match self.config.mode {
            LimiterMode::Hard => corridor.clamp(position),
            LimiterMode::Soft { strength, margin } => {
                corridor.push_back(position, strength, margin, dt)
            }
        };

        let correction = lateral(limited) - lateral(position);
        if correction.abs() > CORRECTION_EPSILON {
            self.report_hit(position, correction);
        }
        if corridor.is_inside(position) {
            self.last_valid_position = Some(position);
        }
        limited
    }

    /// Clamp onto the road immediately, whatever the mode.
    pub fn snap_to_road(&mut self, corridor: &Corridor, position: Vec3) -> Vec3 {
        let snapped = corridor.clamp(position);
        if snapped != position {
            tracing::info!(
                from = lateral(position),
                to = lateral(snapped),
                "subject snapped onto road"
            );
        }
        self.last_valid_position = Some(snapped);
        snapped
    }

    /// Move onto the centre line, keeping height and travel position.
    pub fn snap_to_center(&mut self, position: Vec3) -> Vec3 {
        let centred = Vec3::new(0.0, position.y, position.z);
        self.last_valid_position = Some(centred);
        tracing::info!("subject moved to road centre");
        centred
    }

    fn report_hit(&mut self, position: Vec3, correction: f32) {
        if !self.config.log_boundary_hits || self.since_last_hit_log < HIT_LOG_INTERVAL {
            return;
        }
        self.since_last_hit_log = 0.0;
        tracing::debug!(x = lateral(position), correction, "road boundary hit");
    }
}

impl Default for BoundaryLimiter {
    fn default() -> Self {
        Self::new(LimiterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32) -> Vec3 {
        Vec3::new(x, 0.0, 12.0)
    }

    #[test]
    fn hard_mode_clamps() {
        let corridor = Corridor::new(2.5);
        let mut limiter = BoundaryLimiter::hard();
        assert_eq!(limiter.apply(&corridor, at(4.0), 0.016), at(2.5));
        assert_eq!(limiter.apply(&corridor, at(-1.0), 0.016), at(-1.0));
    }

    #[test]
    fn soft_mode_pushes_then_clamps() {
        let corridor = Corridor::new(2.5);
        let mut limiter = BoundaryLimiter::soft(10.0, 0.3);
        let p = limiter.apply(&corridor, at(2.4), 0.01);
        assert!(p.x < 2.4 && p.x > 2.2);
        assert_eq!(limiter.apply(&corridor, at(50.0), 0.01).x, 2.5);
    }

    #[test]
    fn disabled_limiter_is_identity() {
        let corridor = Corridor::new(2.5);
        let mut limiter = BoundaryLimiter::hard();
        limiter.set_enabled(false);
        assert_eq!(limiter.apply(&corridor, at(9.0), 0.016), at(9.0));
        assert!(limiter.last_valid_position().is_none());
    }

    #[test]
    fn last_valid_position_tracks_inside_positions_only() {
        let corridor = Corridor::new(2.5);
        let mut limiter = BoundaryLimiter::hard();
        limiter.apply(&corridor, at(1.0), 0.016);
        limiter.apply(&corridor, at(7.0), 0.016);
        assert_eq!(limiter.last_valid_position(), Some(at(1.0)));
    }

    #[test]
    fn limiter_follows_corridor_resizes() {
        let mut corridor = Corridor::new(2.5);
        let mut limiter = BoundaryLimiter::hard();
        corridor.set_width(10.0);
        assert_eq!(limiter.apply(&corridor, at(4.0), 0.016), at(4.0));
    }

    #[test]
    fn snap_helpers() {
        let corridor = Corridor::new(2.5);
        let mut limiter = BoundaryLimiter::default();
        assert_eq!(limiter.snap_to_road(&corridor, at(-8.0)), at(-2.5));
        assert_eq!(limiter.snap_to_road(&corridor, at(1.0)), at(1.0));
        let centred = limiter.snap_to_center(Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(centred, Vec3::new(0.0, 3.0, 4.0));
        assert_eq!(limiter.last_valid_position(), Some(centred));
    }

    #[test]
    fn config_parses_both_modes() {
        let hard: LimiterConfig = serde_json::from_str(r#"{"mode":"hard"}"#).unwrap();
        assert_eq!(hard.mode, LimiterMode::Hard);
        assert!(hard.enabled);

        let soft: LimiterConfig =
            serde_json::from_str(r#"{"mode":{"soft":{"strength":15.0,"margin":0.0}}}"#)
                .unwrap();
        assert_eq!(
            soft.mode,
            LimiterMode::Soft {
                strength: 15.0,
                margin: 0.0
            }
        );
    }
}
