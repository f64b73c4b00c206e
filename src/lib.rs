//! # backdrop
//!
//! Decorative, pointer-reactive page backgrounds with a small, testable core.
//!
//! Two independent components do the work:
//!
//! - [`GridTrail`] maps pointer positions onto a logical grid and keeps a
//!   short, decaying trail of visited cells.
//! - [`LinkField`] drifts a fixed cloud of particles inside a box and links
//!   the ones that are close together.
//!
//! Both only produce render-ready data ([`CellStyle`], [`Scene`]); drawing
//! is up to the caller. [`shader`] has vertex layouts and WGSL for that,
//! and the `backdrop` binary draws them with wgpu.
//!
//! ## Quick Start
//!
//! ```ignore
//! use backdrop::prelude::*;
//!
//! let config = BackdropConfig::default();
//! let mut field = select_backdrop(&config, &GpuProbe::default())?;
//! let mut clock = FrameClock::new();
//!
//! let mut field = activate(&mut *field);
//! loop {
//!     let time = clock.tick();
//!     field.update(&time);
//!     draw(field.scene());
//! }
//! // `field` is stopped when the guard is dropped
//! ```
//!
//! ## Choosing a backdrop
//!
//! [`select_backdrop`] runs a [`CapabilityProbe`] once. When accelerated
//! rendering is available it returns a [`LinkField`]; otherwise a
//! [`StaticField`] whose dots and dashes only pulse in place. Both
//! implement [`Backdrop`], so the rest of the program does not care which
//! one it got.
//!
//! ## Lifecycle
//!
//! Components start stopped. Nothing mutates until [`Lifecycle::start`],
//! and [`Lifecycle::stop`] discards transient state. [`activate`] returns
//! an [`Active`] guard that stops the component when dropped.

pub mod backdrop;
pub mod capability;
pub mod config;
pub mod error;
pub mod fallback;
pub mod grid;
pub mod input;
pub mod links;
pub mod shader;
pub mod time;

pub use crate::backdrop::{
    activate, select_backdrop, Active, Backdrop, Lifecycle, Scene, SceneLine, SceneOrb, ScenePoint,
    SceneSpace,
};
pub use capability::{AdapterSummary, CapabilityProbe, Forced, GpuProbe};
pub use config::BackdropConfig;
pub use error::{CapabilityError, ConfigError, GpuError};
pub use fallback::{FallbackConfig, StaticField};
pub use glam::{Vec2, Vec3};
pub use grid::{
    map_to_cell, CellIndex, CellStyle, GridBounds, GridConfig, GridStyle, GridTrail, PatternKind, Region, Trail,
};
pub use links::{Edge, LinkConfig, LinkField, Orb, Particle, ParticleSet};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use backdrop::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backdrop::{activate, select_backdrop, Active, Backdrop, Lifecycle, Scene};
    pub use crate::capability::{CapabilityProbe, Forced, GpuProbe};
    pub use crate::config::BackdropConfig;
    pub use crate::error::{CapabilityError, ConfigError};
    pub use crate::fallback::{FallbackConfig, StaticField};
    pub use crate::grid::{GridBounds, GridConfig, GridStyle, GridTrail, Region};
    pub use crate::input::{Pointer, PointerEvent};
    pub use crate::links::{LinkConfig, LinkField};
    pub use crate::time::{FrameClock, FrameTime, Interval};
    pub use crate::{Vec2, Vec3};
}
