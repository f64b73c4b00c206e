//! Static fallback field.
//!
//! Used when accelerated rendering is unavailable. Dots and short dashes are
//! scattered once and never move; each one only pulses its opacity on its
//! own delay and period. Positions are in normalized device coordinates.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::backdrop::{Backdrop, Lifecycle, Scene, SceneLine, ScenePoint, SceneSpace};
use crate::error::{require_positive_f32, ConfigError};
use crate::time::FrameTime;

fn default_dot_count() -> u32 {
    80
}

fn default_line_count() -> u32 {
    20
}

fn default_reference_width() -> f32 {
    1280.0
}

fn default_dot_alpha() -> f32 {
    0.4
}

fn default_line_alpha() -> f32 {
    0.1
}

/// Fallback field configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackConfig {
    #[serde(default = "default_dot_count")]
    pub dot_count: u32,
    #[serde(default = "default_line_count")]
    pub line_count: u32,
    /// Viewport width, in pixels, that dash lengths are measured against.
    #[serde(default = "default_reference_width")]
    pub reference_width: f32,
    /// Peak dot opacity.
    #[serde(default = "default_dot_alpha")]
    pub dot_alpha: f32,
    /// Peak dash opacity.
    #[serde(default = "default_line_alpha")]
    pub line_alpha: f32,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            dot_count: default_dot_count(),
            line_count: default_line_count(),
            reference_width: default_reference_width(),
            dot_alpha: default_dot_alpha(),
            line_alpha: default_line_alpha(),
            seed: None,
        }
    }
}

impl FallbackConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive_f32(self.reference_width, "fallback.reference_width")?;
        for (value, field) in [
            (self.dot_alpha, "fallback.dot_alpha"),
            (self.line_alpha, "fallback.line_alpha"),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field });
            }
        }
        Ok(())
    }
}

/// Opacity cycle of one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    /// Seconds before the first cycle starts.
    pub delay: f32,
    /// Seconds per cycle.
    pub period: f32,
}

impl Pulse {
    /// Opacity factor in `[0.5, 1.0]` at time `t`; full opacity during the delay.
    pub fn factor(&self, t: f32) -> f32 {
        if t < self.delay || self.period <= 0.0 {
            return 1.0;
        }
        let phase = ((t - self.delay) / self.period).fract();
        0.75 + 0.25 * (phase * TAU).cos()
    }
}

#[derive(Debug, Clone, Copy)]
struct Dot {
    position: Vec3,
    pulse: Pulse,
}

#[derive(Debug, Clone, Copy)]
struct Dash {
    start: Vec3,
    end: Vec3,
    pulse: Pulse,
}

/// Non-animated backdrop with pulsing dots and dashes.
pub struct StaticField {
    config: FallbackConfig,
    rng: StdRng,
    dots: Vec<Dot>,
    dashes: Vec<Dash>,
    elapsed: f32,
    running: bool,
}

impl StaticField {
    pub fn new(config: FallbackConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            rng,
            dots: Vec::new(),
            dashes: Vec::new(),
            elapsed: 0.0,
            running: false,
        })
    }

    pub fn config(&self) -> &FallbackConfig {
        &self.config
    }

    /// Percent-of-viewport to NDC, with y pointing up.
    fn to_ndc(x_fraction: f32, y_fraction: f32) -> Vec3 {
        Vec3::new(x_fraction * 2.0 - 1.0, 1.0 - y_fraction * 2.0, 0.0)
    }

    fn scatter(&mut self) {
        let rng = &mut self.rng;
        self.dots = (0..self.config.dot_count)
            .map(|_| Dot {
                position: Self::to_ndc(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)),
                pulse: Pulse {
                    delay: rng.gen_range(0.0..3.0),
                    period: rng.gen_range(2.0..5.0),
                },
            })
            .collect();

        let reference_width = self.config.reference_width;
        self.dashes = (0..self.config.line_count)
            .map(|_| {
                let start = Self::to_ndc(rng.gen_range(0.0..0.9), rng.gen_range(0.0..0.9));
                // pixel length to NDC width units
                let length = rng.gen_range(20.0..80.0) / reference_width * 2.0;
                let angle = rng.gen_range(0.0..TAU);
                let end = start + Vec3::new(angle.cos(), -angle.sin(), 0.0) * length;
                Dash {
                    start,
                    end,
                    pulse: Pulse {
                        delay: rng.gen_range(0.0..2.0),
                        period: rng.gen_range(3.0..5.0),
                    },
                }
            })
            .collect();
    }
}

impl Lifecycle for StaticField {
    fn start(&mut self) {
        if self.running {
            return;
        }
        self.scatter();
        self.elapsed = 0.0;
        self.running = true;
        log::debug!(
            "static field started with {} dots, {} dashes",
            self.dots.len(),
            self.dashes.len()
        );
    }

    fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.dots.clear();
        self.dashes.clear();
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

impl Backdrop for StaticField {
    fn name(&self) -> &'static str {
        "static field"
    }

    fn update(&mut self, time: &FrameTime) {
        if self.running {
            self.elapsed = time.elapsed;
        }
    }

    fn scene(&self) -> Scene {
        let t = self.elapsed;
        Scene {
            points: self
                .dots
                .iter()
                .map(|d| ScenePoint {
                    position: d.position,
                    alpha: self.config.dot_alpha * d.pulse.factor(t),
                })
                .collect(),
            lines: self
                .dashes
                .iter()
                .map(|d| SceneLine {
                    start: d.start,
                    end: d.end,
                    alpha: self.config.line_alpha * d.pulse.factor(t),
                })
                .collect(),
            space: SceneSpace::Screen,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> StaticField {
        StaticField::new(FallbackConfig {
            seed: Some(9),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_pulse_factor() {
        let pulse = Pulse {
            delay: 1.0,
            period: 2.0,
        };
        assert_eq!(pulse.factor(0.5), 1.0);
        assert!((pulse.factor(1.0) - 1.0).abs() < 1e-6);
        assert!((pulse.factor(2.0) - 0.5).abs() < 1e-6);
        for i in 0..100 {
            let f = pulse.factor(i as f32 * 0.137);
            assert!((0.5..=1.0).contains(&f));
        }
    }

    #[test]
    fn test_scene_counts() {
        let mut field = seeded();
        assert!(field.scene().is_empty());
        field.start();
        let scene = field.scene();
        assert_eq!(scene.points.len(), 80);
        assert_eq!(scene.lines.len(), 20);
        assert_eq!(scene.space, SceneSpace::Screen);
        assert!(scene.orbs.is_empty());
    }

    #[test]
    fn test_geometry_is_static() {
        let mut field = seeded();
        field.start();
        let before = field.scene();
        field.update(&FrameTime {
            elapsed: 2.5,
            delta: 0.016,
            frame: 1,
        });
        let after = field.scene();
        for (a, b) in before.points.iter().zip(&after.points) {
            assert_eq!(a.position, b.position);
        }
        for (a, b) in before.lines.iter().zip(&after.lines) {
            assert_eq!((a.start, a.end), (b.start, b.end));
        }
    }

    #[test]
    fn test_dots_inside_viewport() {
        let mut field = seeded();
        field.start();
        for p in field.scene().points {
            assert!(p.position.x >= -1.0 && p.position.x <= 1.0);
            assert!(p.position.y >= -1.0 && p.position.y <= 1.0);
            assert!(p.alpha <= 0.4 + 1e-6);
        }
    }

    #[test]
    fn test_stop_clears() {
        let mut field = seeded();
        field.start();
        field.stop();
        assert!(!field.is_running());
        assert!(field.scene().is_empty());
    }

    #[test]
    fn test_invalid_reference_width() {
        let config = FallbackConfig {
            reference_width: 0.0,
            ..Default::default()
        };
        assert!(StaticField::new(config).is_err());
    }
}
