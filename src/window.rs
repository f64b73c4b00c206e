use std::sync::Arc;
use std::time::{Duration, Instant};

use backdrop::prelude::*;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use crate::render::Renderer;

const TITLE_INTERVAL: Duration = Duration::from_millis(250);

/// Demo host: feeds window events to a grid trail and a backdrop, draws
/// them, and shows their state in the window title.
pub struct App {
    config: BackdropConfig,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    pointer: Pointer,
    grid: Option<GridTrail>,
    backdrop: Option<Box<dyn Backdrop>>,
    clock: FrameClock,
    last_title: Instant,
    frames_since_title: u32,
}

impl App {
    pub fn new(config: BackdropConfig) -> Self {
        Self {
            config,
            window: None,
            renderer: None,
            pointer: Pointer::default(),
            grid: None,
            backdrop: None,
            clock: FrameClock::new(),
            last_title: Instant::now(),
            frames_since_title: 0,
        }
    }

    fn init(&mut self, window: &Arc<Window>) -> Result<(), ConfigError> {
        let size = window.inner_size();
        let viewport = self.pointer.resized(size.width, size.height);

        let region = self.config.grid.bounds.resolve(viewport);
        let mut grid = GridTrail::new(self.config.grid.clone(), region)?;
        let mut backdrop = select_backdrop(&self.config, &GpuProbe::default())?;

        grid.start();
        backdrop.start();
        log::info!(
            "{} running, {}x{} grid over {:.0}x{:.0} px",
            backdrop.name(),
            self.config.grid.rows,
            self.config.grid.cols,
            region.width,
            region.height
        );

        self.renderer = match pollster::block_on(Renderer::new(window.clone())) {
            Ok(renderer) => Some(renderer),
            Err(e) => {
                log::warn!("{}, showing stats in the title only", e);
                None
            }
        };
        self.grid = Some(grid);
        self.backdrop = Some(backdrop);
        self.clock = FrameClock::new();
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(grid) = &mut self.grid {
            grid.stop();
        }
        if let Some(backdrop) = &mut self.backdrop {
            backdrop.stop();
        }
    }

    fn redraw(&mut self) -> Result<(), wgpu::SurfaceError> {
        let time = self.clock.tick();
        if let Some(grid) = &mut self.grid {
            grid.advance(Duration::from_secs_f32(time.delta));
        }
        if let Some(backdrop) = &mut self.backdrop {
            backdrop.update(&time);
        }
        self.update_title();

        match (&mut self.renderer, &self.backdrop) {
            (Some(renderer), Some(backdrop)) => renderer.render(&backdrop.scene(), self.grid.as_ref()),
            _ => Ok(()),
        }
    }

    fn update_title(&mut self) {
        self.frames_since_title += 1;
        let since = self.last_title.elapsed();
        if since >= TITLE_INTERVAL {
            let fps = self.frames_since_title as f32 / since.as_secs_f32();
            if let Some(window) = &self.window {
                window.set_title(&self.title(fps));
            }
            self.last_title = Instant::now();
            self.frames_since_title = 0;
        }
    }

    fn title(&self, fps: f32) -> String {
        let mut parts = vec!["backdrop".to_string()];
        if let Some(backdrop) = &self.backdrop {
            let scene = backdrop.scene();
            parts.push(format!("{} ({} pts, {} links)", backdrop.name(), scene.points.len(), scene.lines.len()));
        }
        if let Some(grid) = &self.grid {
            let cell = self
                .pointer
                .position()
                .and_then(|p| grid.cell_at(p.x, p.y))
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".into());
            parts.push(format!(
                "cell {} trail {}/{}",
                cell,
                grid.trail().len(),
                grid.config().trail_length
            ));
        }
        parts.push(format!("{:.0} fps", fps));
        parts.join(" | ")
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("backdrop")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.init(&window) {
            log::error!("{}", e);
            event_loop.exit();
            return;
        }
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match self.pointer.handle_event(&event) {
            Some(PointerEvent::Moved(pos)) => {
                if let Some(grid) = &mut self.grid {
                    grid.on_pointer_move(pos.x, pos.y);
                }
            }
            Some(PointerEvent::Resized(size)) => {
                if let Some(grid) = &mut self.grid {
                    let region = grid.config().bounds.resolve(size);
                    grid.set_region(region);
                }
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.x as u32, size.y as u32);
                }
            }
            Some(PointerEvent::Left) | None => {}
        }

        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                match self.redraw() {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        if let Some(renderer) = &mut self.renderer {
                            renderer.reconfigure();
                        }
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("GPU out of memory");
                        self.shutdown();
                        event_loop.exit();
                        return;
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}
