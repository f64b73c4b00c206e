//! Linked particle field.
//!
//! A fixed set of points drifts inside a box, bouncing off its walls, and
//! every frame each point is linked to the nearby points that follow it
//! closely in index order. Links are recomputed from scratch each frame.
//!
//! Only the next `neighbor_window` indices are searched per point, so two
//! points far apart in index order are never linked even when they are
//! spatially close. This keeps the per-frame cost at O(n·k).

use std::f32::consts::TAU;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::backdrop::{Backdrop, Lifecycle, Scene, SceneLine, SceneOrb, ScenePoint};
use crate::error::{require_positive, require_positive_f32, ConfigError};
use crate::time::FrameTime;

/// Depth velocities are scaled down so the cloud mostly drifts in-plane.
pub const Z_SPEED_FACTOR: f32 = 0.5;

/// A point with a velocity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
}

impl Particle {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self { position, velocity }
    }
}

/// Fixed-size particle collection.
///
/// Particles can be modified in place but never added or removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleSet {
    particles: Vec<Particle>,
}

impl ParticleSet {
    pub fn from_particles(particles: Vec<Particle>) -> Self {
        Self { particles }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable view. A slice cannot change the set's length.
    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}

/// A link between particles `a` and `b`, always with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub a: u32,
    pub b: u32,
}

impl Edge {
    /// Canonical edge between `i` and `j`. Returns `None` if they are equal.
    pub fn new(i: u32, j: u32) -> Option<Self> {
        match i.cmp(&j) {
            std::cmp::Ordering::Less => Some(Self { a: i, b: j }),
            std::cmp::Ordering::Greater => Some(Self { a: j, b: i }),
            std::cmp::Ordering::Equal => None,
        }
    }
}

fn default_particle_count() -> u32 {
    150
}

fn default_distance_threshold() -> f32 {
    3.0
}

fn default_neighbor_window() -> u32 {
    9
}

fn default_speed() -> f32 {
    0.5
}

fn default_speed_scale() -> f32 {
    1.0
}

fn default_extents() -> [f32; 3] {
    [10.0, 10.0, 5.0]
}

fn default_wobble() -> f32 {
    0.3
}

fn default_frame_skip() -> u32 {
    2
}

fn default_spin() -> f32 {
    0.05
}

fn default_point_alpha() -> f32 {
    0.8
}

fn default_line_alpha() -> f32 {
    0.2
}

fn default_orb_alpha() -> f32 {
    0.35
}

/// Link field configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    #[serde(default = "default_particle_count")]
    pub particle_count: u32,
    /// Particles closer than this are linked.
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold: f32,
    /// How many following indices each particle is compared against.
    #[serde(default = "default_neighbor_window")]
    pub neighbor_window: u32,
    /// Initial velocity components are drawn from `[-speed/2, speed/2]`.
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// Multiplier applied when integrating velocity.
    #[serde(default = "default_speed_scale")]
    pub speed_scale: f32,
    /// Half-extents of the bounding box.
    #[serde(default = "default_extents")]
    pub extents: [f32; 3],
    /// Amplitude of the per-particle oscillation.
    #[serde(default = "default_wobble")]
    pub wobble: f32,
    /// Advance once every `frame_skip` frames.
    #[serde(default = "default_frame_skip")]
    pub frame_skip: u32,
    /// Whole-cloud rotation about Y in radians per second.
    #[serde(default = "default_spin")]
    pub spin: f32,
    #[serde(default = "default_point_alpha")]
    pub point_alpha: f32,
    #[serde(default = "default_line_alpha")]
    pub line_alpha: f32,
    /// Floating orbs layered over the network. None by default.
    #[serde(default)]
    pub orb_count: u32,
    #[serde(default = "default_orb_alpha")]
    pub orb_alpha: f32,
    /// Fixed RNG seed for reproducible layouts.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            particle_count: default_particle_count(),
            distance_threshold: default_distance_threshold(),
            neighbor_window: default_neighbor_window(),
            speed: default_speed(),
            speed_scale: default_speed_scale(),
            extents: default_extents(),
            wobble: default_wobble(),
            frame_skip: default_frame_skip(),
            spin: default_spin(),
            point_alpha: default_point_alpha(),
            line_alpha: default_line_alpha(),
            orb_count: 0,
            orb_alpha: default_orb_alpha(),
            seed: None,
        }
    }
}

impl LinkConfig {
    /// Denser, slower network with six floating orbs.
    pub fn layered() -> Self {
        Self {
            particle_count: 120,
            distance_threshold: 2.5,
            speed: 0.3,
            orb_count: 6,
            ..Default::default()
        }
    }

    /// Reduced network for low-power hosts.
    pub fn light() -> Self {
        Self {
            particle_count: 60,
            distance_threshold: 2.0,
            speed: 0.2,
            orb_count: 3,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive(self.particle_count, "links.particle_count")?;
        require_positive(self.frame_skip, "links.frame_skip")?;
        require_positive_f32(self.distance_threshold, "links.distance_threshold")?;
        require_positive_f32(self.speed, "links.speed")?;
        for (value, field) in self
            .extents
            .iter()
            .zip(["links.extents.x", "links.extents.y", "links.extents.z"])
        {
            require_positive_f32(*value, field)?;
        }
        for (value, field) in [
            (self.speed_scale, "links.speed_scale"),
            (self.wobble, "links.wobble"),
            (self.spin, "links.spin"),
            (self.orb_alpha, "links.orb_alpha"),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field });
            }
        }
        Ok(())
    }

    pub fn extents(&self) -> Vec3 {
        Vec3::from_array(self.extents)
    }

    /// Worst-case distance a particle can sit outside the box after an
    /// [`advance`] step of `delta` seconds.
    pub fn overshoot_bound(&self, delta: f32) -> f32 {
        4.0 * self.wobble.abs() + 0.5 * self.speed * self.speed_scale.abs() * delta
    }
}

/// Scatter `count` particles uniformly inside `±extents`.
pub fn initialize<R: Rng + ?Sized>(
    count: usize,
    extents: Vec3,
    speed: f32,
    rng: &mut R,
) -> ParticleSet {
    let half_speed = speed.abs() * 0.5;
    let particles = (0..count)
        .map(|_| {
            let position = Vec3::new(
                rng.gen_range(-extents.x..=extents.x),
                rng.gen_range(-extents.y..=extents.y),
                rng.gen_range(-extents.z..=extents.z),
            );
            let velocity = Vec3::new(
                rng.gen_range(-half_speed..=half_speed),
                rng.gen_range(-half_speed..=half_speed),
                rng.gen_range(-half_speed..=half_speed) * Z_SPEED_FACTOR,
            );
            Particle::new(position, velocity)
        })
        .collect();
    ParticleSet::from_particles(particles)
}

/// A floating sphere that bobs around a fixed anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orb {
    pub anchor: Vec3,
    pub radius: f32,
    /// Bobbing rate multiplier.
    pub speed: f32,
    /// Time offset so orbs do not move in step.
    pub phase: f32,
}

impl Orb {
    /// Half-extents of the volume orb anchors are scattered in.
    pub const SPREAD: Vec3 = Vec3::new(10.0, 7.5, 4.0);

    pub fn scatter<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let spread = Self::SPREAD;
        Self {
            anchor: Vec3::new(
                rng.gen_range(-spread.x..=spread.x),
                rng.gen_range(-spread.y..=spread.y),
                rng.gen_range(-spread.z..=spread.z),
            ),
            radius: rng.gen_range(0.3..1.0),
            speed: rng.gen_range(0.5..1.3),
            phase: rng.gen_range(0.0..TAU),
        }
    }

    /// Center and XYZ rotation at time `elapsed`.
    pub fn pose(&self, elapsed: f32) -> (Vec3, Vec3) {
        let t = elapsed + self.phase;
        let offset = Vec3::new((t * self.speed * 0.7).cos() * 0.3, (t * self.speed).sin() * 0.5, 0.0);
        (self.anchor + offset, Vec3::new(t * 0.2, t * 0.3, t * 0.1))
    }
}

/// Oscillation phase of particle `index` at time `t`.
///
/// Bounded in `[-1, 1]` per axis; `advance` applies its change between
/// frames, so the drift it adds never accumulates.
fn wobble_at(index: usize, t: f32) -> Vec3 {
    let i = index as f32;
    Vec3::new((t * 0.3 + i * 0.15).cos(), (t * 0.5 + i * 0.1).sin(), 0.0)
}

/// Move every particle by one step and bounce off the box walls.
///
/// `elapsed` is the time at the end of the step and `delta` its length.
/// A particle past a wall gets its velocity on that axis pointed back
/// inward; the position itself is not clamped, so it may sit slightly
/// outside for a frame.
///
/// The velocity is set to face inward rather than negated. Negating would
/// turn a particle that is still outside on the next step back out again.
pub fn advance(
    set: &mut ParticleSet,
    elapsed: f32,
    delta: f32,
    extents: Vec3,
    speed_scale: f32,
    wobble: f32,
) {
    let previous = elapsed - delta;
    for (i, p) in set.as_mut_slice().iter_mut().enumerate() {
        p.position += p.velocity * delta * speed_scale;
        p.position += (wobble_at(i, elapsed) - wobble_at(i, previous)) * wobble;

        for axis in 0..3 {
            if p.position[axis] > extents[axis] {
                p.velocity[axis] = -p.velocity[axis].abs();
            } else if p.position[axis] < -extents[axis] {
                p.velocity[axis] = p.velocity[axis].abs();
            }
        }
    }
}

/// Links between particles closer than `threshold`, searching `window`
/// following indices per particle.
pub fn compute_edges(set: &ParticleSet, threshold: f32, window: usize) -> Vec<Edge> {
    let mut edges = Vec::new();
    compute_edges_into(set, threshold, window, &mut edges);
    edges
}

/// Like [`compute_edges`], reusing `edges`' allocation. Previous contents are discarded.
pub fn compute_edges_into(set: &ParticleSet, threshold: f32, window: usize, edges: &mut Vec<Edge>) {
    edges.clear();
    let particles = set.as_slice();
    let n = particles.len();
    for i in 0..n {
        let last = i.saturating_add(window).min(n - 1);
        for j in (i + 1)..=last {
            if particles[i].position.distance(particles[j].position) < threshold {
                edges.push(Edge {
                    a: i as u32,
                    b: j as u32,
                });
            }
        }
    }
}

/// Animated particle field with links between nearby particles.
pub struct LinkField {
    config: LinkConfig,
    rng: StdRng,
    particles: ParticleSet,
    edges: Vec<Edge>,
    orbs: Vec<Orb>,
    running: bool,
    frames: u64,
    pending_delta: f32,
    elapsed: f32,
}

impl LinkField {
    /// Build a stopped field. Particles are scattered on [`start`](Lifecycle::start).
    pub fn new(config: LinkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            rng,
            particles: ParticleSet::default(),
            edges: Vec::new(),
            orbs: Vec::new(),
            running: false,
            frames: 0,
            pending_delta: 0.0,
            elapsed: 0.0,
        })
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    pub fn orbs(&self) -> &[Orb] {
        &self.orbs
    }

    /// Links as of the last advanced frame.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    fn recompute_edges(&mut self) {
        compute_edges_into(
            &self.particles,
            self.config.distance_threshold,
            self.config.neighbor_window as usize,
            &mut self.edges,
        );
    }
}

impl Lifecycle for LinkField {
    fn start(&mut self) {
        if self.running {
            return;
        }
        self.particles = initialize(
            self.config.particle_count as usize,
            self.config.extents(),
            self.config.speed,
            &mut self.rng,
        );
        let rng = &mut self.rng;
        self.orbs = (0..self.config.orb_count).map(|_| Orb::scatter(rng)).collect();
        self.frames = 0;
        self.pending_delta = 0.0;
        self.elapsed = 0.0;
        self.recompute_edges();
        self.running = true;
        log::debug!(
            "link field started with {} particles, {} initial links",
            self.particles.len(),
            self.edges.len()
        );
    }

    fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.particles = ParticleSet::default();
        self.edges.clear();
        self.orbs.clear();
        log::debug!("link field stopped");
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

impl Backdrop for LinkField {
    fn name(&self) -> &'static str {
        "link field"
    }

    fn update(&mut self, time: &FrameTime) {
        if !self.running {
            return;
        }

        self.frames += 1;
        self.pending_delta += time.delta;
        self.elapsed = time.elapsed;
        if self.frames % self.config.frame_skip as u64 != 0 {
            return;
        }

        advance(
            &mut self.particles,
            self.elapsed,
            self.pending_delta,
            self.config.extents(),
            self.config.speed_scale,
            self.config.wobble,
        );
        self.pending_delta = 0.0;
        self.recompute_edges();
    }

    fn scene(&self) -> Scene {
        let particles = self.particles.as_slice();
        let points = particles
            .iter()
            .map(|p| ScenePoint {
                position: p.position,
                alpha: self.config.point_alpha,
            })
            .collect();
        let lines = self
            .edges
            .iter()
            .map(|e| SceneLine {
                start: particles[e.a as usize].position,
                end: particles[e.b as usize].position,
                alpha: self.config.line_alpha,
            })
            .collect();

        let orbs = self
            .orbs
            .iter()
            .map(|orb| {
                let (center, rotation) = orb.pose(self.elapsed);
                SceneOrb {
                    center,
                    radius: orb.radius,
                    rotation,
                    alpha: self.config.orb_alpha,
                }
            })
            .collect();

        Scene {
            points,
            lines,
            orbs,
            rotation_y: self.elapsed * self.config.spin,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(count: usize, spacing: f32) -> ParticleSet {
        ParticleSet::from_particles(
            (0..count)
                .map(|i| Particle::new(Vec3::new(i as f32 * spacing, 0.0, 0.0), Vec3::ZERO))
                .collect(),
        )
    }

    #[test]
    fn test_edge_canonical() {
        assert_eq!(Edge::new(5, 2), Some(Edge { a: 2, b: 5 }));
        assert_eq!(Edge::new(3, 3), None);
    }

    #[test]
    fn test_initialize_within_extents() {
        let mut rng = StdRng::seed_from_u64(7);
        let extents = Vec3::new(10.0, 10.0, 5.0);
        let set = initialize(500, extents, 0.5, &mut rng);
        assert_eq!(set.len(), 500);
        for p in set.iter() {
            assert!(p.position.abs().cmple(extents).all());
            assert!(p.velocity.x.abs() <= 0.25);
            assert!(p.velocity.z.abs() <= 0.125);
        }
    }

    #[test]
    fn test_initialize_zero_speed() {
        let mut rng = StdRng::seed_from_u64(1);
        let set = initialize(3, Vec3::ONE, 0.0, &mut rng);
        assert!(set.iter().all(|p| p.velocity == Vec3::ZERO));
    }

    #[test]
    fn test_adjacent_links() {
        // 1 unit apart: only neighbors closer than 1.5 link
        let set = line(5, 1.0);
        let edges = compute_edges(&set, 1.5, 8);
        assert_eq!(
            edges,
            vec![
                Edge { a: 0, b: 1 },
                Edge { a: 1, b: 2 },
                Edge { a: 2, b: 3 },
                Edge { a: 3, b: 4 },
            ]
        );
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let set = line(2, 3.0);
        assert!(compute_edges(&set, 3.0, 8).is_empty());
        assert_eq!(compute_edges(&set, 3.01, 8).len(), 1);
    }

    #[test]
    fn test_window_limits_search() {
        // All particles coincide, so every pair is in range.
        let set = ParticleSet::from_particles(vec![Particle::default(); 6]);
        let edges = compute_edges(&set, 1.0, 2);
        // i links to i+1 and i+2 only: 2+2+2+2+1
        assert_eq!(edges.len(), 9);
        assert!(!edges.contains(&Edge { a: 0, b: 3 }));

        assert!(compute_edges(&set, 1.0, 0).is_empty());
    }

    #[test]
    fn test_compute_edges_into_clears() {
        let set = line(3, 10.0);
        let mut edges = vec![Edge { a: 0, b: 1 }];
        compute_edges_into(&set, 1.0, 4, &mut edges);
        assert!(edges.is_empty());
    }

    #[test]
    fn test_advance_integrates() {
        let mut set = ParticleSet::from_particles(vec![Particle::new(
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
        )]);
        advance(&mut set, 0.5, 0.5, Vec3::splat(10.0), 2.0, 0.0);
        assert!((set.as_slice()[0].position.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_advance_reflects_both_walls() {
        let mut set = ParticleSet::from_particles(vec![
            Particle::new(Vec3::new(0.95, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
            Particle::new(Vec3::new(0.0, -0.95, 0.0), Vec3::new(0.0, -1.0, 0.0)),
        ]);
        advance(&mut set, 0.1, 0.1, Vec3::ONE, 1.0, 0.0);
        let p = set.as_slice();
        assert!(p[0].velocity.x < 0.0);
        assert!(p[1].velocity.y > 0.0);
        // not clamped
        assert!(p[0].position.x > 1.0);
    }

    #[test]
    fn test_advance_does_not_trap_outside() {
        // Already outside and heading back in: velocity must stay inward.
        let mut set = ParticleSet::from_particles(vec![Particle::new(
            Vec3::new(1.05, 0.0, 0.0),
            Vec3::new(-0.1, 0.0, 0.0),
        )]);
        advance(&mut set, 0.1, 0.1, Vec3::ONE, 1.0, 0.0);
        assert!(set.as_slice()[0].velocity.x < 0.0);
    }

    #[test]
    fn test_wobble_is_deterministic() {
        let mut a = line(4, 1.0);
        let mut b = line(4, 1.0);
        advance(&mut a, 1.0, 0.5, Vec3::splat(10.0), 1.0, 0.3);
        advance(&mut b, 1.0, 0.5, Vec3::splat(10.0), 1.0, 0.3);
        assert_eq!(a, b);
        // index-dependent, so the line no longer moves in lockstep
        let p = a.as_slice();
        assert_ne!(p[0].position.y, p[1].position.y);
    }

    #[test]
    fn test_config_validation() {
        assert!(LinkConfig::default().validate().is_ok());

        let config = LinkConfig {
            particle_count: 0,
            ..Default::default()
        };
        assert!(matches!(
            LinkField::new(config),
            Err(ConfigError::NonPositive { field: "links.particle_count" })
        ));

        let config = LinkConfig {
            extents: [1.0, f32::INFINITY, 1.0],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NotFinite { .. })));
    }

    #[test]
    fn test_field_lifecycle() {
        let config = LinkConfig {
            particle_count: 40,
            seed: Some(3),
            ..Default::default()
        };
        let mut field = LinkField::new(config).unwrap();
        assert!(field.particles().is_empty());

        field.start();
        assert_eq!(field.particles().len(), 40);
        assert_eq!(field.scene().points.len(), 40);

        field.stop();
        assert!(field.particles().is_empty());
        assert!(field.scene().is_empty());
    }

    #[test]
    fn test_field_frame_skip() {
        let config = LinkConfig {
            particle_count: 10,
            frame_skip: 2,
            seed: Some(11),
            ..Default::default()
        };
        let mut field = LinkField::new(config).unwrap();
        field.start();
        let before = field.particles().clone();

        let frame = |n: u64| FrameTime {
            elapsed: n as f32 / 60.0,
            delta: 1.0 / 60.0,
            frame: n,
        };

        field.update(&frame(1));
        assert_eq!(field.particles(), &before);
        field.update(&frame(2));
        assert_ne!(field.particles(), &before);
    }

    #[test]
    fn test_stopped_field_ignores_frames() {
        let mut field = LinkField::new(LinkConfig::default()).unwrap();
        field.update(&FrameTime {
            elapsed: 1.0,
            delta: 1.0,
            frame: 1,
        });
        assert!(field.scene().is_empty());
    }

    #[test]
    fn test_seeded_fields_match() {
        let config = LinkConfig {
            seed: Some(42),
            ..Default::default()
        };
        let mut a = LinkField::new(config.clone()).unwrap();
        let mut b = LinkField::new(config).unwrap();
        a.start();
        b.start();
        assert_eq!(a.particles(), b.particles());
        assert_eq!(a.edges(), b.edges());
    }

    #[test]
    fn test_presets() {
        let layered = LinkConfig::layered();
        assert!(layered.validate().is_ok());
        assert_eq!(layered.particle_count, 120);
        assert_eq!(layered.orb_count, 6);

        let light = LinkConfig::light();
        assert!(light.validate().is_ok());
        assert_eq!(light.particle_count, 60);
        assert_eq!(light.distance_threshold, 2.0);
        assert_eq!(light.orb_count, 3);

        assert_eq!(LinkConfig::default().orb_count, 0);
    }

    #[test]
    fn test_orbs_float_near_anchor() {
        let mut field = LinkField::new(LinkConfig {
            seed: Some(3),
            ..LinkConfig::light()
        })
        .unwrap();
        field.start();
        assert_eq!(field.orbs().len(), 3);

        for orb in field.orbs() {
            assert!(orb.anchor.abs().cmple(Orb::SPREAD).all());
            assert!((0.3..1.0).contains(&orb.radius));
        }

        for frame in 1..=240u64 {
            field.update(&FrameTime {
                elapsed: frame as f32 / 60.0,
                delta: 1.0 / 60.0,
                frame,
            });
        }
        let scene = field.scene();
        assert_eq!(scene.orbs.len(), 3);
        for (drawn, orb) in scene.orbs.iter().zip(field.orbs()) {
            let offset = drawn.center - orb.anchor;
            assert!(offset.x.abs() <= 0.3 + 1e-5 && offset.y.abs() <= 0.5 + 1e-5);
            assert_eq!(offset.z, 0.0);
            assert_eq!(drawn.alpha, 0.35);
        }
        // orbs are extra geometry, links still match edges
        assert_eq!(scene.lines.len(), field.edges().len());

        field.stop();
        assert!(field.orbs().is_empty());
        assert!(field.scene().is_empty());
    }
}
