//! Pointer trail over a logical grid.
//!
//! A [`GridTrail`] lays a `rows × cols` grid over a pixel [`Region`] and
//! remembers the most recently visited cells. The trail decays from the
//! oldest end at a fixed interval, so a resting pointer leaves a short
//! fading streak behind it.
//!
//! ```ignore
//! let mut grid = GridTrail::new(GridConfig::default(), Region::new(0.0, 0.0, 1280.0, 720.0))?;
//! grid.start();
//! grid.on_pointer_move(400.0, 300.0);
//! grid.advance(Duration::from_millis(16));
//! for cell in grid.cells() { /* draw */ }
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::backdrop::Lifecycle;
use crate::error::{require_positive, require_positive_f32, ConfigError};
use crate::time::Interval;

/// Row-major index of a grid cell: `row * cols + col`.
pub type CellIndex = u32;

/// Intensity above which a cell also gets a texture pattern.
pub const PATTERN_THRESHOLD: f32 = 0.3;

/// Fill alpha for cells that are not part of the trail.
pub const IDLE_ALPHA: f32 = 0.005;

/// Largest `rows * cols` accepted by [`GridConfig::validate`].
pub const MAX_CELLS: u32 = 1 << 20;

/// Pixel rectangle the grid is mapped onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Region covering a whole viewport of the given size.
    pub fn viewport(size: Vec2) -> Self {
        Self::new(0.0, 0.0, size.x, size.y)
    }

    /// Region of `fraction` of the viewport, centred in it.
    pub fn centered(size: Vec2, fraction: Vec2) -> Self {
        let width = size.x * fraction.x;
        let height = size.y * fraction.y;
        Self::new((size.x - width) * 0.5, (size.y - height) * 0.5, width, height)
    }
}

/// How the grid region is derived from the window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridBounds {
    /// The grid covers the whole viewport.
    #[default]
    Viewport,
    /// The grid covers a centred sub-rectangle.
    Centered {
        width_fraction: f32,
        height_fraction: f32,
    },
}

impl GridBounds {
    /// The bounded layout used for contained sections.
    pub fn contained() -> Self {
        GridBounds::Centered {
            width_fraction: 0.95,
            height_fraction: 0.85,
        }
    }

    /// Compute the pixel region for a viewport of `size`.
    pub fn resolve(&self, size: Vec2) -> Region {
        match *self {
            GridBounds::Viewport => Region::viewport(size),
            GridBounds::Centered {
                width_fraction,
                height_fraction,
            } => Region::centered(size, Vec2::new(width_fraction, height_fraction)),
        }
    }
}

/// Cell shading preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridStyle {
    /// Faint fills for a grid spread over the whole window.
    #[default]
    Open,
    /// Stronger fills and patterns for a contained section.
    Bounded,
}

impl GridStyle {
    /// Fill alpha of cells outside the trail. Idle cells are drawn white.
    pub fn idle_alpha(self) -> f32 {
        match self {
            GridStyle::Open => IDLE_ALPHA,
            GridStyle::Bounded => 0.02,
        }
    }

    /// Fill alpha, in the trail color, of a cell at `intensity`.
    pub fn fill_alpha(self, intensity: f32) -> f32 {
        match self {
            GridStyle::Open => 0.1 + intensity * 0.3,
            GridStyle::Bounded => 0.15 + intensity * 0.4,
        }
    }

    /// Stroke alpha of `kind` drawn over a cell at `intensity`.
    pub fn pattern_alpha(self, kind: PatternKind, intensity: f32) -> f32 {
        let (base, scale) = match (self, kind) {
            (GridStyle::Open, PatternKind::DiagonalLines) => (0.15, 0.25),
            (GridStyle::Open, PatternKind::Dots) => (0.2, 0.3),
            (GridStyle::Open, _) => (0.1, 0.2),
            (GridStyle::Bounded, PatternKind::DiagonalLines) => (0.25, 0.35),
            (GridStyle::Bounded, PatternKind::Dots) => (0.3, 0.4),
            (GridStyle::Bounded, _) => (0.2, 0.3),
        };
        base + intensity * scale
    }
}

fn default_rows() -> u32 {
    20
}

fn default_cols() -> u32 {
    30
}

fn default_trail_length() -> u32 {
    8
}

fn default_decay_interval_ms() -> u64 {
    150
}

fn default_trail_color() -> [u8; 3] {
    [158, 231, 102]
}

/// Grid trail configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_rows")]
    pub rows: u32,
    #[serde(default = "default_cols")]
    pub cols: u32,
    /// Maximum number of cells kept in the trail.
    #[serde(default = "default_trail_length")]
    pub trail_length: u32,
    /// Milliseconds between decay ticks.
    #[serde(default = "default_decay_interval_ms")]
    pub decay_interval_ms: u64,
    /// RGB color of highlighted cells. Cosmetic only.
    #[serde(default = "default_trail_color")]
    pub trail_color: [u8; 3],
    #[serde(default)]
    pub bounds: GridBounds,
    #[serde(default)]
    pub style: GridStyle,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
            trail_length: default_trail_length(),
            decay_interval_ms: default_decay_interval_ms(),
            trail_color: default_trail_color(),
            bounds: GridBounds::default(),
            style: GridStyle::default(),
        }
    }
}

impl GridConfig {
    /// Preset for a grid inside a page section: centred bounds, a pale
    /// trail and [`GridStyle::Bounded`] shading.
    pub fn contained() -> Self {
        Self {
            trail_color: [224, 226, 219],
            bounds: GridBounds::contained(),
            style: GridStyle::Bounded,
            ..Default::default()
        }
    }

    /// Check every option that would make the grid meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive(self.rows, "grid.rows")?;
        require_positive(self.cols, "grid.cols")?;
        match self.rows.checked_mul(self.cols) {
            Some(cells) if cells <= MAX_CELLS => {}
            _ => {
                return Err(ConfigError::TooLarge {
                    field: "grid.rows * grid.cols",
                    max: MAX_CELLS as u64,
                })
            }
        }
        require_positive(self.trail_length, "grid.trail_length")?;
        require_positive(self.decay_interval_ms, "grid.decay_interval_ms")?;
        if let GridBounds::Centered {
            width_fraction,
            height_fraction,
        } = self.bounds
        {
            require_positive_f32(width_fraction, "grid.bounds.width_fraction")?;
            require_positive_f32(height_fraction, "grid.bounds.height_fraction")?;
        }
        Ok(())
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

/// Map a pointer position to the cell under it.
///
/// The region is half-open: `x == left + width` or `y == top + height`
/// maps to `None`.
pub fn map_to_cell(x: f32, y: f32, region: &Region, rows: u32, cols: u32) -> Option<CellIndex> {
    if rows == 0 || cols == 0 {
        return None;
    }

    let relative_x = x - region.left;
    let relative_y = y - region.top;
    // Negated comparisons also reject NaN.
    if !(relative_x >= 0.0 && relative_x < region.width) {
        return None;
    }
    if !(relative_y >= 0.0 && relative_y < region.height) {
        return None;
    }

    let cell_width = region.width / cols as f32;
    let cell_height = region.height / rows as f32;
    let col = (relative_x / cell_width).floor();
    let row = (relative_y / cell_height).floor();

    // Rounding can land exactly on `cols`/`rows` just inside the far edge.
    if col < 0.0 || row < 0.0 || col >= cols as f32 || row >= rows as f32 {
        return None;
    }

    (row as u32).checked_mul(cols)?.checked_add(col as u32)
}

/// Bounded, recency-ordered queue of visited cells. Oldest first.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    cells: VecDeque<CellIndex>,
    capacity: usize,
}

impl Trail {
    /// A trail holding at most `capacity` cells. Capacity 0 records nothing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `cell` unless it repeats the current tail.
    ///
    /// Returns `true` if the trail changed.
    pub fn push(&mut self, cell: CellIndex) -> bool {
        if self.capacity == 0 || self.cells.back() == Some(&cell) {
            return false;
        }
        self.cells.push_back(cell);
        while self.cells.len() > self.capacity {
            self.cells.pop_front();
        }
        true
    }

    /// Remove the oldest entry.
    pub fn pop_oldest(&mut self) -> Option<CellIndex> {
        self.cells.pop_front()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<CellIndex> {
        self.cells.back().copied()
    }

    /// Entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.cells.iter().copied()
    }

    /// Snapshot of the entries, oldest first.
    pub fn to_vec(&self) -> Vec<CellIndex> {
        self.cells.iter().copied().collect()
    }
}

/// Texture drawn over strongly highlighted cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    DiagonalLines,
    Dots,
    Grid,
    CrossHatch,
}

impl PatternKind {
    /// Pattern for the cell at (`row`, `col`).
    pub fn for_cell(row: u32, col: u32) -> Self {
        match (row + col) % 4 {
            0 => PatternKind::DiagonalLines,
            1 => PatternKind::Dots,
            2 => PatternKind::Grid,
            _ => PatternKind::CrossHatch,
        }
    }

    /// Pattern stroke alpha at the given intensity, in the open style.
    pub fn alpha(&self, intensity: f32) -> f32 {
        GridStyle::Open.pattern_alpha(*self, intensity)
    }
}

/// Render description of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellStyle {
    pub index: CellIndex,
    pub row: u32,
    pub col: u32,
    /// 0 for idle cells, `(p + 1) / len` for trail cells.
    pub intensity: f32,
    /// Alpha of the cell background: trail color when active, white when idle.
    pub fill_alpha: f32,
    /// Pattern and its alpha, for cells above [`PATTERN_THRESHOLD`].
    pub pattern: Option<(PatternKind, f32)>,
}

impl CellStyle {
    pub fn is_active(&self) -> bool {
        self.intensity > 0.0
    }
}

/// Grid trail component.
///
/// Owns its trail and decay timer. Nothing mutates while stopped.
#[derive(Debug)]
pub struct GridTrail {
    config: GridConfig,
    region: Region,
    trail: Trail,
    decay: Interval,
    running: bool,
}

impl GridTrail {
    /// Build a stopped grid trail over `region`.
    pub fn new(config: GridConfig, region: Region) -> Result<Self, ConfigError> {
        config.validate()?;
        let trail = Trail::with_capacity(config.trail_length as usize);
        let decay = Interval::from_millis(config.decay_interval_ms);
        Ok(Self {
            config,
            region,
            trail,
            decay,
            running: false,
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Replace the tracked region, e.g. after a resize.
    pub fn set_region(&mut self, region: Region) {
        self.region = region;
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    /// Cell under the pointer, if any.
    pub fn cell_at(&self, x: f32, y: f32) -> Option<CellIndex> {
        map_to_cell(x, y, &self.region, self.config.rows, self.config.cols)
    }

    /// Record a pointer position. Returns `true` if the trail changed.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) -> bool {
        if !self.running {
            return false;
        }
        match self.cell_at(x, y) {
            Some(cell) => self.trail.push(cell),
            None => false,
        }
    }

    /// Drop the oldest trail entry.
    pub fn on_decay_tick(&mut self) {
        if self.running {
            self.trail.pop_oldest();
        }
    }

    /// Feed frame time into the decay timer, firing every due tick.
    pub fn advance(&mut self, dt: Duration) {
        if !self.running {
            return;
        }
        for _ in 0..self.decay.advance(dt) {
            self.on_decay_tick();
        }
    }

    /// Intensity of `cell` relative to the current trail length.
    pub fn intensity(&self, cell: CellIndex) -> f32 {
        let len = self.trail.len();
        self.trail
            .iter()
            .position(|c| c == cell)
            .map(|p| (p + 1) as f32 / len as f32)
            .unwrap_or(0.0)
    }

    /// Styles for every cell, recomputed from the current trail.
    pub fn cells(&self) -> Vec<CellStyle> {
        let cols = self.config.cols;
        let style = self.config.style;
        let mut intensities = vec![0.0f32; self.config.cell_count()];
        let len = self.trail.len() as f32;

        // Newest to oldest so the first occurrence of a repeated cell wins.
        for (p, &cell) in self.trail.cells.iter().enumerate().rev() {
            if let Some(slot) = intensities.get_mut(cell as usize) {
                *slot = (p + 1) as f32 / len;
            }
        }

        intensities
            .into_iter()
            .enumerate()
            .map(|(i, intensity)| {
                let index = i as CellIndex;
                let row = index / cols;
                let col = index % cols;
                let pattern = (intensity > PATTERN_THRESHOLD).then(|| {
                    let kind = PatternKind::for_cell(row, col);
                    (kind, style.pattern_alpha(kind, intensity))
                });
                let fill_alpha = if intensity > 0.0 {
                    style.fill_alpha(intensity)
                } else {
                    style.idle_alpha()
                };
                CellStyle {
                    index,
                    row,
                    col,
                    intensity,
                    fill_alpha,
                    pattern,
                }
            })
            .collect()
    }
}

impl Lifecycle for GridTrail {
    fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.decay.reset();
            log::debug!(
                "grid trail started ({}x{}, trail {})",
                self.config.rows,
                self.config.cols,
                self.config.trail_length
            );
        }
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.trail.clear();
            self.decay.reset();
            log::debug!("grid trail stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
