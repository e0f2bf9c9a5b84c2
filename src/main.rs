use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use scroll_viewer::cli::Cli;
use scroll_viewer::frame::FrameClock;
use scroll_viewer::input::InputAdapter;
use scroll_viewer::loaders::AssetLoader;
use scroll_viewer::renderer::{MeshRenderer, OverlayStats};
use scroll_viewer::{AssetCatalog, LoadOutcome, ViewerSession};

const INITIAL_WINDOW_WIDTH: u32 = 1280;
const INITIAL_WINDOW_HEIGHT: u32 = 800;

struct App {
    cli: Cli,
    catalog: Option<AssetCatalog>,
    window: Option<Arc<Window>>,
    renderer: Option<MeshRenderer>,
    session: Option<ViewerSession>,
    loader: AssetLoader,
    input: InputAdapter,
    clock: FrameClock,
}

impl App {
    fn new(cli: Cli, catalog: AssetCatalog) -> Self {
        Self {
            cli,
            catalog: Some(catalog),
            window: None,
            renderer: None,
            session: None,
            loader: AssetLoader::new(),
            input: InputAdapter::new(),
            clock: FrameClock::new(),
        }
    }

    fn select_model(&mut self, id: &str) {
        let Some(session) = &mut self.session else {
            return;
        };
        match session.select_model(id) {
            Ok(request) => self.loader.spawn(request),
            Err(e) => log::warn!("{:#}", e),
        }
    }

    fn drain_loads(&mut self) {
        let Some(session) = &mut self.session else {
            return;
        };
        for completion in self.loader.drain() {
            match session.on_load_complete(completion) {
                LoadOutcome::Attached {
                    id,
                    has_clip,
                    has_target_mesh,
                } => log::info!("Showing {} (clip: {}, target mesh: {})", id, has_clip, has_target_mesh),
                LoadOutcome::Stale { id, generation } => {
                    log::debug!("Dropped stale load of {} (generation {})", id, generation)
                }
                LoadOutcome::Failed { id, error } => log::error!("Failed to load {}: {:#}", id, error),
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let delta = self.clock.tick();
        self.drain_loads();

        let (Some(renderer), Some(window), Some(session)) = (&mut self.renderer, &self.window, &mut self.session)
        else {
            return;
        };
        session.on_frame(delta);

        let stats = OverlayStats {
            fps: self.clock.fps(),
            frame: self.clock.frame_number(),
            loads_in_flight: self.loader.in_flight(),
        };
        let events = match renderer.render(window, session, stats) {
            Ok(events) => events,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.resize(renderer.size());
                Vec::new()
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Surface out of memory");
                event_loop.exit();
                return;
            }
            Err(e) => {
                log::warn!("Render error: {}", e);
                Vec::new()
            }
        };

        for event in events {
            if let Some(request) = session.handle_control(event) {
                self.loader.spawn(request);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Scroll Viewer")
                .with_inner_size(winit::dpi::LogicalSize::new(INITIAL_WINDOW_WIDTH, INITIAL_WINDOW_HEIGHT)),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let renderer = match pollster::block_on(MeshRenderer::new(window.clone(), !self.cli.no_ui)) {
            Ok(r) => r,
            Err(e) => {
                log::error!("Failed to initialize renderer: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        let Some(catalog) = self.catalog.take() else {
            return;
        };
        let viewport_height = window.inner_size().height as f32;
        self.session = Some(ViewerSession::new(catalog, viewport_height, self.cli.page_length));
        self.window = Some(window);
        self.renderer = Some(renderer);
        self.clock.reset();

        let initial = self.cli.model.clone();
        self.select_model(&initial);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
            if renderer.handle_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size);
                }
                if let Some(session) = &mut self.session {
                    session.on_resize(size.height as f32);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            other => {
                if let (Some(input), Some(session)) = (self.input.process_event(&other), &mut self.session) {
                    session.apply_input(input);
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let catalog = cli.load_catalog()?;

    if cli.list_models {
        for id in catalog.ids() {
            println!("{}", id);
        }
        return Ok(());
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli, catalog);

    log::info!("Scroll Viewer - wheel/PageUp/PageDown scroll, drag to orbit, Ctrl+wheel zoom, P toggles playback, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
