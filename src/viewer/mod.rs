//! Windowed viewer for the `tinsel` binary.
//!
//! | Input | Action |
//! |-------|--------|
//! | Space / Enter | toggle between scattered and tree |
//! | U / O | pick photos to upload |
//! | drop files on the window | upload them |
//! | left drag | orbit |
//! | wheel | zoom |
//! | P | pause animation |
//! | Esc | quit |

mod camera;
mod mesh;
mod renderer;
mod shaders;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tinsel::{FrameClock, Scene, SceneConfig, UploadQueue, ViewerError};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use camera::OrbitCamera;
use renderer::Renderer;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

pub struct App {
    scene: Scene,
    uploads: UploadQueue,
    clock: FrameClock,
    camera: OrbitCamera,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    title: String,
    error: Option<ViewerError>,
}

impl App {
    /// Build the scene and queue `images` for upload, in order.
    pub fn new(config: &SceneConfig, images: Vec<PathBuf>) -> Self {
        let mut uploads = UploadQueue::new();
        for path in images {
            log::info!("Queueing {}", path.display());
            uploads.submit_file(path);
        }

        Self {
            scene: Scene::new(config),
            uploads,
            clock: FrameClock::new(),
            camera: OrbitCamera::new(),
            window: None,
            renderer: None,
            mouse_pressed: false,
            last_mouse_pos: None,
            title: String::new(),
            error: None,
        }
    }

    /// The error that stopped the viewer, if any.
    pub fn take_error(&mut self) -> Option<ViewerError> {
        self.error.take()
    }

    fn open_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let window_attrs = Window::default_attributes()
            .with_title("Tinsel")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let renderer = pollster::block_on(Renderer::new(window.clone(), &self.scene))?;
        self.window = Some(window);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn pick_photos(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title("Add Memory")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_files();
        for path in picked.unwrap_or_default() {
            self.uploads.submit_file(path);
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode) {
        match key {
            KeyCode::Space | KeyCode::Enter => self.scene.toggle_mode(),
            KeyCode::KeyU | KeyCode::KeyO => self.pick_photos(),
            KeyCode::KeyP => self.clock.toggle_pause(),
            KeyCode::Escape => event_loop.exit(),
            _ => {}
        }
    }

    fn update_title(&mut self) {
        let title = format!("Tinsel | {}", self.scene.status_line());
        if title != self.title {
            if let Some(window) = &self.window {
                window.set_title(&title);
            }
            self.title = title;
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let added = self.uploads.commit_ready(self.scene.store_mut(), now);
        if !added.is_empty() {
            log::debug!("{} upload(s) committed this frame", added.len());
        }
        if let Some(renderer) = &mut self.renderer {
            for photo in added {
                renderer.stage_photo(photo);
            }
        }

        let t = self.clock.tick();
        self.scene.frame(t, now);
        self.camera.update(self.scene.mode(), self.clock.delta());
        self.update_title();

        if let Some(renderer) = &mut self.renderer {
            match renderer.render(&self.scene, &self.camera, t) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => renderer.resize(winit::dpi::PhysicalSize {
                    width: renderer.config.width,
                    height: renderer.config.height,
                }),
                Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.open_window(event_loop) {
                log::error!("{}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, key),
            WindowEvent::DroppedFile(path) => {
                self.uploads.submit_file(path);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = position.x - last_x;
                        let dy = position.y - last_y;
                        self.camera.drag(dx as f32, dy as f32);
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                self.camera.zoom(scroll);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
