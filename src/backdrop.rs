//! Interchangeable animated backgrounds.
//!
//! A [`Backdrop`] is anything that can be started, stopped, updated once per
//! frame and asked for a [`Scene`]. [`select_backdrop`] probes for graphics
//! support once and hands back either the animated [`LinkField`] or the
//! [`StaticField`] fallback; callers never branch on the capability again.
//!
//! [`activate`] wraps a component in an [`Active`] guard that stops it when
//! the guard goes out of scope, on every exit path.

use std::f32::consts::TAU;
use std::ops::{Deref, DerefMut};

use glam::{EulerRot, Quat, Vec3};

use crate::capability::CapabilityProbe;
use crate::config::BackdropConfig;
use crate::error::{CapabilityError, ConfigError};
use crate::fallback::StaticField;
use crate::links::LinkField;
use crate::shader::{LineVertex, PointVertex};
use crate::time::FrameTime;

/// Start/stop lifecycle shared by every component.
pub trait Lifecycle {
    /// Begin reacting to input and frames. Starting twice is a no-op.
    fn start(&mut self);
    /// Stop reacting and drop transient state. Stopping twice is a no-op.
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// A frame-driven background renderer.
pub trait Backdrop: Lifecycle {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Advance one frame. Ignored while stopped.
    fn update(&mut self, time: &FrameTime);

    /// Geometry for the current frame.
    fn scene(&self) -> Scene;
}

/// A point to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenePoint {
    pub position: Vec3,
    pub alpha: f32,
}

/// A line segment to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLine {
    pub start: Vec3,
    pub end: Vec3,
    pub alpha: f32,
}

/// A floating sphere, drawn as a wireframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneOrb {
    pub center: Vec3,
    pub radius: f32,
    /// XYZ Euler angles of the wireframe.
    pub rotation: Vec3,
    pub alpha: f32,
}

/// Segments per wireframe ring of an orb.
pub const ORB_SEGMENTS: usize = 16;

/// Coordinate space of a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneSpace {
    /// World units, seen through a perspective camera.
    #[default]
    World,
    /// Normalized device coordinates, drawn without a camera.
    Screen,
}

/// Render-ready geometry for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub points: Vec<ScenePoint>,
    pub lines: Vec<SceneLine>,
    pub orbs: Vec<SceneOrb>,
    /// Rotation of the points and lines about the Y axis, in radians.
    pub rotation_y: f32,
    pub space: SceneSpace,
}

impl Scene {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.lines.is_empty() && self.orbs.is_empty()
    }

    /// Two vertices per line, suitable for a `LineList` topology.
    pub fn line_vertices(&self) -> Vec<LineVertex> {
        self.lines
            .iter()
            .flat_map(|l| {
                [
                    LineVertex::new(l.start, l.alpha),
                    LineVertex::new(l.end, l.alpha),
                ]
            })
            .collect()
    }

    /// One vertex per point.
    pub fn point_vertices(&self) -> Vec<PointVertex> {
        self.points
            .iter()
            .map(|p| PointVertex::new(p.position, p.alpha))
            .collect()
    }

    /// Three great circles per orb, as `LineList` vertices.
    ///
    /// The shader spins every vertex by `rotation_y`; orbs do not follow the
    /// cloud, so they are counter-rotated here.
    pub fn orb_vertices(&self) -> Vec<LineVertex> {
        let unspin = Quat::from_rotation_y(-self.rotation_y);
        let mut vertices = Vec::with_capacity(self.orbs.len() * 3 * ORB_SEGMENTS * 2);

        for orb in &self.orbs {
            let rotation = unspin
                * Quat::from_euler(EulerRot::XYZ, orb.rotation.x, orb.rotation.y, orb.rotation.z);
            let center = unspin * orb.center;

            for ring in 0..3 {
                let point = |k: usize| {
                    let (s, c) = (k as f32 / ORB_SEGMENTS as f32 * TAU).sin_cos();
                    let local = match ring {
                        0 => Vec3::new(c, s, 0.0),
                        1 => Vec3::new(0.0, c, s),
                        _ => Vec3::new(c, 0.0, s),
                    };
                    center + rotation * (local * orb.radius)
                };
                for k in 0..ORB_SEGMENTS {
                    vertices.push(LineVertex::new(point(k), orb.alpha));
                    vertices.push(LineVertex::new(point(k + 1), orb.alpha));
                }
            }
        }
        vertices
    }
}

/// Guard that keeps a component running for its own lifetime.
///
/// Dereferences to the wrapped component.
pub struct Active<'a, T: Lifecycle + ?Sized> {
    inner: &'a mut T,
}

/// Start `component` and return a guard that stops it on drop.
pub fn activate<T: Lifecycle + ?Sized>(component: &mut T) -> Active<'_, T> {
    component.start();
    Active { inner: component }
}

impl<T: Lifecycle + ?Sized> Deref for Active<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.inner
    }
}

impl<T: Lifecycle + ?Sized> DerefMut for Active<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.inner
    }
}

impl<T: Lifecycle + ?Sized> Drop for Active<'_, T> {
    fn drop(&mut self) {
        self.inner.stop();
    }
}

/// Choose the backdrop the environment can draw.
///
/// A failed probe is not an error: it is logged and the static fallback is
/// returned. Only invalid configuration fails.
pub fn select_backdrop(
    config: &BackdropConfig,
    probe: &dyn CapabilityProbe,
) -> Result<Box<dyn Backdrop>, ConfigError> {
    let capability = if config.force_fallback {
        Err(CapabilityError::Disabled)
    } else {
        probe.probe()
    };

    match capability {
        Ok(adapter) => {
            log::info!("using linked particle field on {}", adapter);
            Ok(Box::new(LinkField::new(config.links.clone())?))
        }
        Err(reason) => {
            log::info!("{}, using static fallback", reason);
            Ok(Box::new(StaticField::new(config.fallback.clone())?))
        }
    }
}
