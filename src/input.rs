//! Pointer input from winit window events.
//!
//! [`Pointer`] turns raw window events into the pointer positions the grid
//! trail consumes, and keeps the viewport size that grid regions are
//! resolved against.
//!
//! ```ignore
//! fn window_event(&mut self, event: WindowEvent) {
//!     if let Some(PointerEvent::Moved(pos)) = self.pointer.handle_event(&event) {
//!         self.grid.on_pointer_move(pos.x, pos.y);
//!     }
//! }
//! ```

use glam::Vec2;
use winit::event::WindowEvent;

/// Pointer changes relevant to the backdrop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer moved to this position, in physical pixels.
    Moved(Vec2),
    /// Pointer left the window.
    Left,
    /// Window was resized to this size, in physical pixels.
    Resized(Vec2),
}

/// Pointer and viewport state.
#[derive(Debug, Default)]
pub struct Pointer {
    position: Option<Vec2>,
    delta: Vec2,
    viewport: Vec2,
}

impl Pointer {
    /// Create a tracker for a viewport of `width × height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: Vec2::new(width as f32, height as f32),
            ..Default::default()
        }
    }

    /// Current position, or `None` when the pointer is outside the window.
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Movement since the previous position update.
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Viewport size in pixels.
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Pointer position in normalized device coordinates (-1 to 1), Y up.
    pub fn ndc(&self) -> Option<Vec2> {
        let pos = self.position?;
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return None;
        }
        Some(Vec2::new(
            (pos.x / self.viewport.x) * 2.0 - 1.0,
            1.0 - (pos.y / self.viewport.y) * 2.0,
        ))
    }

    /// Record a pointer position.
    pub fn cursor_moved(&mut self, x: f64, y: f64) -> Vec2 {
        let pos = Vec2::new(x as f32, y as f32);
        self.delta = self.position.map(|last| pos - last).unwrap_or(Vec2::ZERO);
        self.position = Some(pos);
        pos
    }

    /// Forget the pointer position.
    pub fn cursor_left(&mut self) {
        self.position = None;
        self.delta = Vec2::ZERO;
    }

    /// Record a new viewport size.
    pub fn resized(&mut self, width: u32, height: u32) -> Vec2 {
        self.viewport = Vec2::new(width as f32, height as f32);
        self.viewport
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<PointerEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                Some(PointerEvent::Moved(self.cursor_moved(position.x, position.y)))
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor_left();
                Some(PointerEvent::Left)
            }
            WindowEvent::Resized(size) => {
                Some(PointerEvent::Resized(self.resized(size.width, size.height)))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_moved_tracks_delta() {
        let mut pointer = Pointer::new(800, 600);
        assert_eq!(pointer.position(), None);

        pointer.cursor_moved(10.0, 20.0);
        assert_eq!(pointer.delta(), Vec2::ZERO);

        pointer.cursor_moved(15.0, 18.0);
        assert_eq!(pointer.position(), Some(Vec2::new(15.0, 18.0)));
        assert_eq!(pointer.delta(), Vec2::new(5.0, -2.0));
    }

    #[test]
    fn test_cursor_left() {
        let mut pointer = Pointer::new(800, 600);
        pointer.cursor_moved(10.0, 20.0);
        pointer.cursor_left();
        assert_eq!(pointer.position(), None);
        assert_eq!(pointer.ndc(), None);
    }

    #[test]
    fn test_ndc() {
        let mut pointer = Pointer::new(800, 600);

        // Center of window should be (0, 0) in NDC
        pointer.cursor_moved(400.0, 300.0);
        let ndc = pointer.ndc().unwrap();
        assert!(ndc.x.abs() < 0.01);
        assert!(ndc.y.abs() < 0.01);

        pointer.cursor_moved(0.0, 0.0);
        assert_eq!(pointer.ndc(), Some(Vec2::new(-1.0, 1.0)));
    }

    #[test]
    fn test_resized() {
        let mut pointer = Pointer::default();
        pointer.cursor_moved(1.0, 1.0);
        assert_eq!(pointer.ndc(), None);
        assert_eq!(pointer.resized(1024, 768), Vec2::new(1024.0, 768.0));
        assert!(pointer.ndc().is_some());
    }
}
