//! Window creation and event handling via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]: it opens the window
//! on `resumed`, brings up the GPU and uploads the scene, and draws one frame
//! per `RedrawRequested`.

use std::sync::Arc;

use glam::Vec3;
use solaris_config::{CameraConfig, Config};
use solaris_render::{
    Camera, DepthBuffer, FrameEncoder, RenderContext, RenderContextError, RenderPassBuilder,
    SurfaceError, SurfaceWrapper, WgpuBackend, init_render_context_blocking,
};
use solaris_scene::{BodyId, Scene, SceneError, SceneResources, pole_closure, solar_system};
use tracing::{error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::clock::SimulationClock;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("GPU initialization failed: {0}")]
    Render(#[from] RenderContextError),

    #[error("failed to build scene: {0}")]
    Scene(#[from] SceneError),

    #[error("GPU out of memory")]
    OutOfMemory,
}

/// What a key press asks the viewer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Wireframe,
    Fill,
    Quit,
}

impl KeyAction {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::KeyW => Some(Self::Wireframe),
            KeyCode::KeyF => Some(Self::Fill),
            KeyCode::Escape | KeyCode::KeyQ => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Window attributes from the `window` config section.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attrs = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ));
    if config.window.fullscreen {
        attrs.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attrs
    }
}

/// Camera from the `camera` config section at the given aspect ratio.
pub fn camera_from_config(config: &CameraConfig, aspect_ratio: f32) -> Camera {
    Camera {
        position: Vec3::from(config.position),
        target: Vec3::from(config.target),
        up: Vec3::Y,
        fov_y: config.fov_degrees.to_radians(),
        aspect_ratio,
        near: config.near,
        far: config.far,
    }
}

pub fn clear_color(rgb: [f64; 3]) -> wgpu::Color {
    wgpu::Color {
        r: rgb[0],
        g: rgb[1],
        b: rgb[2],
        a: 1.0,
    }
}

/// GPU-side state created once the window exists.
struct Renderer {
    gpu: RenderContext,
    backend: WgpuBackend,
    resources: SceneResources<WgpuBackend>,
    depth: DepthBuffer,
}

pub struct AppState {
    config: Config,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    surface_wrapper: SurfaceWrapper,
    clock: SimulationClock,
    camera: Camera,
    scene: Scene,
    /// The light source; its centre drives the point light.
    sun: Option<BodyId>,
    exit_error: Option<AppError>,
}

impl AppState {
    /// Build the scene from `config`. GPU resources are created later, in
    /// `resumed`.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let scene = solar_system(
            &config.scene,
            config.render.sphere_resolution,
            pole_closure(config.render.pole_closure),
        )?;
        info!(
            "Scene built: {} bodies, {} meshes at resolution {}",
            scene.bodies().len(),
            scene.meshes().len(),
            config.render.sphere_resolution
        );

        let aspect = config.window.width as f32 / config.window.height.max(1) as f32;
        Ok(Self {
            camera: camera_from_config(&config.camera, aspect),
            clock: SimulationClock::new(config.scene.time_scale),
            surface_wrapper: SurfaceWrapper::new(config.window.width, config.window.height, 1.0),
            sun: scene.find("sun"),
            scene,
            window: None,
            renderer: None,
            exit_error: None,
            config,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        error!("{err}");
        self.exit_error = Some(err);
        event_loop.exit();
    }

    fn init_renderer(&mut self, window: Arc<Window>) -> Result<Renderer, AppError> {
        let gpu = init_render_context_blocking(window, self.config.window.vsync)?;
        let mut backend = WgpuBackend::new(
            &gpu.device,
            &gpu.queue,
            gpu.surface_format,
            gpu.supports_wireframe,
        );
        if self.config.render.wireframe && !backend.set_wireframe(true) {
            warn!("Wireframe requested but the device cannot draw lines");
        }
        let resources = SceneResources::upload(&self.scene, &mut backend);
        let size = self.surface_wrapper.physical_size();
        let depth = DepthBuffer::new(&gpu.device, size.width, size.height);

        Ok(Renderer {
            gpu,
            backend,
            resources,
            depth,
        })
    }

    fn apply_resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect_ratio(width as f32, height as f32);
        if let Some(renderer) = &mut self.renderer {
            renderer.gpu.resize(width, height);
            renderer.depth.resize(&renderer.gpu.device, width, height);
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        match KeyAction::from_key(code) {
            Some(KeyAction::Wireframe) => {
                if let Some(renderer) = &mut self.renderer {
                    if renderer.backend.set_wireframe(true) {
                        info!("Wireframe mode");
                    } else {
                        warn!("Wireframe not supported by this device");
                    }
                }
            }
            Some(KeyAction::Fill) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.backend.set_wireframe(false);
                    info!("Fill mode");
                }
            }
            Some(KeyAction::Quit) => {
                info!("Quit requested");
                event_loop.exit();
            }
            None => {}
        }
    }

    fn render(&mut self) -> Result<(), SurfaceError> {
        let sim_time = self.clock.tick();
        let Some(renderer) = &mut self.renderer else {
            return Ok(());
        };

        let frame = self.camera.frame_context(sim_time);
        if let Some(sun) = self.sun
            && let Ok(center) = self.scene.world_center(sun, sim_time)
        {
            renderer.backend.set_light_position(center);
        }
        renderer.backend.begin_frame(&frame);
        renderer
            .resources
            .draw_frame(&self.scene, &frame, &mut renderer.backend);

        let surface_texture = renderer.gpu.get_current_texture()?;
        let mut encoder = FrameEncoder::new(
            &renderer.gpu.device,
            Arc::new(renderer.gpu.queue.clone()),
            surface_texture,
        );
        let builder = RenderPassBuilder::new()
            .clear_color(clear_color(self.config.render.clear_color))
            .depth(renderer.depth.view.clone(), DepthBuffer::CLEAR_VALUE)
            .label("bodies");
        if let Some(mut pass) = encoder.begin_render_pass(&builder) {
            renderer.backend.encode(&mut pass);
        }
        encoder.submit();
        Ok(())
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window = match event_loop.create_window(window_attributes_from_config(&self.config)) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let inner_size = window.inner_size();
        self.surface_wrapper =
            SurfaceWrapper::new(inner_size.width, inner_size.height, window.scale_factor());
        let size = self.surface_wrapper.physical_size();
        self.camera.set_aspect_ratio(size.width as f32, size.height as f32);
        info!(
            "Surface initialized: {}x{} (scale: {:.2})",
            size.width,
            size.height,
            self.surface_wrapper.scale_factor()
        );

        match self.init_renderer(window.clone()) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(e) => return self.fail(event_loop, e),
        }
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(size) = self
                    .surface_wrapper
                    .handle_resize(new_size.width, new_size.height)
                {
                    self.apply_resize(size.width, size.height);
                    info!("Window resized to {}x{}", size.width, size.height);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(window) = &self.window {
                    let inner = window.inner_size();
                    if let Some(size) = self.surface_wrapper.handle_scale_factor_changed(
                        scale_factor,
                        inner.width,
                        inner.height,
                    ) {
                        self.apply_resize(size.width, size.height);
                        info!(
                            "Scale factor changed to {:.2}, resized to {}x{}",
                            self.surface_wrapper.scale_factor(),
                            size.width,
                            size.height
                        );
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::RedrawRequested => {
                match self.render() {
                    Ok(()) => {}
                    Err(SurfaceError::Lost) => {
                        let size = self.surface_wrapper.physical_size();
                        if let Some(renderer) = &mut self.renderer {
                            renderer.gpu.resize(size.width, size.height);
                        }
                    }
                    Err(SurfaceError::OutOfMemory) => {
                        return self.fail(event_loop, AppError::OutOfMemory);
                    }
                    Err(SurfaceError::Timeout) => {
                        warn!("Surface timeout, skipping frame");
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Run the viewer until the window closes.
#[instrument(skip(config))]
pub fn run_with_config(config: Config) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config)?;
    event_loop.run_app(&mut app)?;
    match app.exit_error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solaris_config::PoleClosureMode;

    #[test]
    fn test_key_bindings() {
        assert_eq!(KeyAction::from_key(KeyCode::KeyW), Some(KeyAction::Wireframe));
        assert_eq!(KeyAction::from_key(KeyCode::KeyF), Some(KeyAction::Fill));
        assert_eq!(KeyAction::from_key(KeyCode::Escape), Some(KeyAction::Quit));
        assert_eq!(KeyAction::from_key(KeyCode::KeyQ), Some(KeyAction::Quit));
        assert_eq!(KeyAction::from_key(KeyCode::Space), None);
    }

    #[test]
    fn test_camera_from_config() {
        let config = CameraConfig::default();
        let camera = camera_from_config(&config, 2.0);
        assert_eq!(camera.position, Vec3::new(0.0, 8.0, 30.0));
        assert_eq!(camera.target, Vec3::ZERO);
        assert!((camera.fov_y - 45_f32.to_radians()).abs() < 1e-6);
        assert_eq!(camera.aspect_ratio, 2.0);
        assert_eq!(camera.near, config.near);
        assert_eq!(camera.far, config.far);
    }

    #[test]
    fn test_clear_color_is_opaque() {
        let color = clear_color([0.7, 0.7, 0.7]);
        assert_eq!((color.r, color.g, color.b, color.a), (0.7, 0.7, 0.7, 1.0));
    }

    #[test]
    fn test_app_state_builds_scene() {
        let mut config = Config::default();
        config.render.pole_closure = PoleClosureMode::Collapsed;
        config.render.sphere_resolution = 8;
        let app = AppState::new(config).unwrap();
        assert_eq!(app.scene().bodies().len(), 3);
        assert_eq!(app.scene().meshes()[0].vertex_count(), 64);
        assert!(app.sun.is_some());
        assert!((app.camera().aspect_ratio - 1024.0 / 768.0).abs() < 1e-6);
    }

    #[test]
    fn test_app_state_rejects_bad_resolution() {
        let mut config = Config::default();
        config.render.sphere_resolution = 1;
        assert!(matches!(
            AppState::new(config),
            Err(AppError::Scene(SceneError::Mesh(_)))
        ));
    }

    #[test]
    fn test_window_attributes_title() {
        let config = Config::default();
        let attrs = window_attributes_from_config(&config);
        assert_eq!(attrs.title, config.window.title);
    }
}
