//! Display harness for converted GLSL fragment shaders.
//!
//! The crate glues a `winit` preview window, the `wgpu` rendering pipeline,
//! and the converted-shader wrapping together. The overall flow is:
//!
//! ```text
//!   showshader CLI
//!          │ ViewerConfig (source text + window size)
//!          ▼
//!   Viewer::run ──▶ WindowState ──▶ winit event loop ──▶ render_frame()
//!          ▲                                    │
//!          │                                    └─▶ uTime/uResolution ─▶ GPU UBO
//! ```
//!
//! `WindowState` owns all GPU resources (surface, device, pipeline, uniform
//! buffer) while `Viewer` is the thin entry point that builds the window and
//! drives the loop. Incoming shaders follow the `#version 330 core`
//! convention the converter emits, so `compile.rs` wraps them at runtime into
//! Vulkan GLSL with the uniforms the pipeline actually binds.

mod compile;
mod gpu;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use gpu::GpuState;

/// Immutable configuration handed to the viewer at start-up.
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    /// Complete GLSL fragment shader source following the converter's
    /// convention (`uTime`/`uResolution` uniforms, `main()` entry point,
    /// `fragColor` output). Hand-written sources meeting the same convention
    /// work equally well.
    pub source: String,
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Title of the preview window.
    pub title: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            source: String::new(),
            surface_size: (800, 600),
            title: "Shader Viewer".to_string(),
        }
    }
}

/// High-level entry point that owns the chosen configuration.
pub struct Viewer {
    config: ViewerConfig,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        Self { config }
    }

    /// Opens the window and blocks on the `winit` event loop until the user
    /// quits (window close, Escape, or `q`).
    ///
    /// The loop is single-threaded and strictly sequential: poll events,
    /// upload uniforms, draw, present. All GPU resources are released when
    /// the state drops on exit.
    pub fn run(self) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to initialize event loop")?;
        let window_size = PhysicalSize::new(self.config.surface_size.0, self.config.surface_size.1);
        let window = WindowBuilder::new()
            .with_title(&self.config.title)
            .with_inner_size(window_size)
            .build(&event_loop)
            .context("failed to create viewer window")?;
        let window = Arc::new(window);

        let mut state = WindowState::new(window.clone(), &self.config)?;
        state.window().request_redraw();

        event_loop
            .run(move |event, elwt| {
                match event {
                    Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                        match event {
                            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                                elwt.exit();
                            }
                            WindowEvent::KeyboardInput { event, .. } => {
                                if event.state == ElementState::Pressed && is_quit_key(&event.logical_key) {
                                    elwt.exit();
                                }
                            }
                            WindowEvent::Resized(new_size) => {
                                state.resize(new_size);
                            }
                            WindowEvent::ScaleFactorChanged {
                                mut inner_size_writer,
                                ..
                            } => {
                                // Keep the current physical size when the scale factor changes.
                                let _ = inner_size_writer.request_inner_size(state.size());
                            }
                            WindowEvent::RedrawRequested => match state.render_frame() {
                                Ok(()) => {}
                                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                    state.resize(state.size());
                                }
                                Err(wgpu::SurfaceError::OutOfMemory) => {
                                    tracing::error!("surface out of memory; exiting viewer");
                                    elwt.exit();
                                }
                                Err(wgpu::SurfaceError::Timeout) => {
                                    tracing::warn!("surface timeout; retrying next frame");
                                }
                                Err(other) => {
                                    tracing::warn!("surface error: {other:?}; retrying next frame");
                                }
                            },
                            _ => {}
                        }
                    }
                    Event::AboutToWait => {
                        // Redraw continuously; Fifo presentation paces us to vblank.
                        elwt.set_control_flow(ControlFlow::Poll);
                        state.window().request_redraw();
                    }
                    _ => {}
                }
            })
            .map_err(|err| anyhow!("event loop error: {err}"))
    }
}

fn is_quit_key(key: &Key) -> bool {
    matches!(key, Key::Named(NamedKey::Escape))
        || matches!(key, Key::Character(value) if value.as_str() == "q")
}

/// Aggregates the window handle and GPU state for the event loop.
struct WindowState {
    /// Shared handle to the window (`wgpu` requires it to create the surface).
    window: Arc<Window>,
    /// GPU resources backing the swapchain and shader pipeline.
    gpu: GpuState,
}

impl WindowState {
    /// Creates a fully initialised rendering state for the preview window.
    ///
    /// The method configures the swapchain, compiles the converted fragment
    /// shader, builds the render pipeline, and seeds the uniform buffer.
    fn new(window: Arc<Window>, config: &ViewerConfig) -> Result<Self> {
        let size = window.inner_size();
        let gpu = GpuState::new(window.as_ref(), size, &config.source)?;
        Ok(Self { window, gpu })
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.gpu.render_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_original_window_size() {
        let config = ViewerConfig::default();
        assert_eq!(config.surface_size, (800, 600));
    }

    #[test]
    fn quit_keys_cover_escape_and_q() {
        assert!(is_quit_key(&Key::Named(NamedKey::Escape)));
        assert!(is_quit_key(&Key::Character("q".into())));
        assert!(!is_quit_key(&Key::Character("w".into())));
        assert!(!is_quit_key(&Key::Named(NamedKey::Space)));
    }
}
