use anyhow::{Context, Result};
use clap::Parser;
use cubeyard_common::Axis;
use cubeyard_input::{Action, MOVE_STEP};
use cubeyard_render_wgpu::{Projection, SceneRenderer};
use cubeyard_scene::Scene;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

const WINDOW_WIDTH: u32 = 1200;
const WINDOW_HEIGHT: u32 = 800;
const WINDOW_TITLE: &str = "Cubeyard";

#[derive(Parser)]
#[command(name = "cubeyard-desktop", about = "Interactive cube placement viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Map a physical key event to a logical action.
///
/// Movement, rotation toggling, and committing fire on press only; key
/// auto-repeat is filtered out before this is called. Exit fires on Escape
/// release so the key-up never leaks to whatever gains focus next.
fn action_for_key(key: KeyCode, pressed: bool) -> Option<Action> {
    if pressed {
        match key {
            KeyCode::ArrowUp => Some(Action::Move(Axis::Y, MOVE_STEP)),
            KeyCode::ArrowDown => Some(Action::Move(Axis::Y, -MOVE_STEP)),
            KeyCode::ArrowLeft => Some(Action::Move(Axis::X, -MOVE_STEP)),
            KeyCode::ArrowRight => Some(Action::Move(Axis::X, MOVE_STEP)),
            KeyCode::KeyW => Some(Action::Move(Axis::Z, MOVE_STEP)),
            KeyCode::KeyS => Some(Action::Move(Axis::Z, -MOVE_STEP)),
            KeyCode::KeyA => Some(Action::ToggleRotation),
            KeyCode::Enter => Some(Action::Commit),
            _ => None,
        }
    } else {
        match key {
            KeyCode::Escape => Some(Action::Exit),
            _ => None,
        }
    }
}

/// Application state: the scene plus the actions queued since the last frame.
struct AppState {
    scene: Scene,
    pending: Vec<Action>,
}

impl AppState {
    fn new() -> Self {
        Self {
            scene: Scene::with_floor_grid(),
            pending: Vec::new(),
        }
    }

    fn queue(&mut self, action: Action) {
        self.pending.push(action);
    }

    /// Drain queued actions into the scene, then advance one tick.
    fn step(&mut self) {
        for action in self.pending.drain(..) {
            apply_action(&mut self.scene, action);
        }
        self.scene.tick();
    }
}

fn apply_action(scene: &mut Scene, action: Action) {
    match action {
        Action::Move(axis, delta) => scene.translate_active(axis, delta),
        Action::ToggleRotation => {
            scene.toggle_rotation();
            tracing::debug!(rotating = scene.rotating(), "rotation toggled");
        }
        Action::Commit => {
            scene.commit_active();
            tracing::debug!(committed = scene.committed().len(), "cube committed");
        }
        // Exit never reaches the queue; the event loop handles it directly.
        Action::Exit => {}
    }
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<SceneRenderer>,
}

impl GpuApp {
    fn new() -> Self {
        Self {
            state: AppState::new(),
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        // Created hidden, shown once it is positioned and the surface is live.
        let attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .with_visible(false);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .expect("failed to create window"),
        );

        if let Some(monitor) = window.current_monitor() {
            let screen = monitor.size();
            let outer = window.outer_size();
            window.set_outer_position(PhysicalPosition::new(
                (screen.width.saturating_sub(outer.width) / 2) as i32,
                (screen.height.saturating_sub(outer.height) / 2) as i32,
            ));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("failed to create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("no suitable GPU adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cubeyard_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .expect("failed to create device");

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        // Fifo = vsync; frame pacing is tied to the display refresh.
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = SceneRenderer::new(
            &device,
            surface_format,
            size.width,
            size.height,
            &Projection::default(),
        );

        window.set_visible(true);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(surface), Some(device), Some(config)) =
                    (&self.surface, &self.device, &mut self.config)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(device, config);
                    // The projection stays fixed; only the depth buffer
                    // follows the surface.
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(device, config.width, config.height);
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat,
                        ..
                    },
                ..
            } => {
                if repeat {
                    return;
                }
                match action_for_key(key, key_state == ElementState::Pressed) {
                    Some(Action::Exit) => {
                        tracing::info!("exit requested");
                        event_loop.exit();
                    }
                    Some(action) => self.state.queue(action),
                    None => {}
                }
            }
            WindowEvent::RedrawRequested => {
                self.state.step();

                let (Some(surface), Some(device), Some(queue)) =
                    (&self.surface, &self.device, &self.queue)
                else {
                    return;
                };

                let output = match surface.get_current_texture() {
                    Ok(t) => t,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        if let Some(config) = &self.config {
                            surface.configure(device, config);
                        }
                        return;
                    }
                    Err(e) => {
                        tracing::error!("surface error: {e}");
                        return;
                    }
                };

                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                if let Some(renderer) = &self.renderer {
                    renderer.render(device, queue, &view, &self.state.scene);
                }

                output.present();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("cubeyard-desktop starting");

    let event_loop =
        EventLoop::new().context("failed to initialize the windowing subsystem")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new();
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubeyard_common::Cube;

    #[test]
    fn movement_keys_fire_on_press_only() {
        assert_eq!(
            action_for_key(KeyCode::ArrowUp, true),
            Some(Action::Move(Axis::Y, MOVE_STEP))
        );
        assert_eq!(action_for_key(KeyCode::ArrowUp, false), None);
        assert_eq!(
            action_for_key(KeyCode::KeyS, true),
            Some(Action::Move(Axis::Z, -MOVE_STEP))
        );
        assert_eq!(action_for_key(KeyCode::KeyS, false), None);
    }

    #[test]
    fn horizontal_keys_map_to_x() {
        assert_eq!(
            action_for_key(KeyCode::ArrowLeft, true),
            Some(Action::Move(Axis::X, -MOVE_STEP))
        );
        assert_eq!(
            action_for_key(KeyCode::ArrowRight, true),
            Some(Action::Move(Axis::X, MOVE_STEP))
        );
    }

    #[test]
    fn escape_exits_on_release_only() {
        assert_eq!(action_for_key(KeyCode::Escape, false), Some(Action::Exit));
        assert_eq!(action_for_key(KeyCode::Escape, true), None);
    }

    #[test]
    fn unbound_keys_are_ignored() {
        assert_eq!(action_for_key(KeyCode::KeyQ, true), None);
        assert_eq!(action_for_key(KeyCode::Space, false), None);
    }

    #[test]
    fn commit_without_moving_places_a_spawn_cube() {
        let mut state = AppState::new();
        assert_eq!(state.scene.committed().len(), 150);

        let action = action_for_key(KeyCode::Enter, true).unwrap();
        state.queue(action);
        state.step();

        assert_eq!(state.scene.committed().len(), 151);
        assert_eq!(state.scene.committed()[150], Cube::SPAWN);
        assert_eq!(*state.scene.active(), Cube::SPAWN);
    }

    #[test]
    fn queued_actions_apply_in_order_before_the_tick() {
        let mut state = AppState::new();
        state.queue(Action::ToggleRotation);
        state.queue(Action::Move(Axis::Y, MOVE_STEP));
        state.step();

        // One tick ran after the toggle.
        assert_eq!(state.scene.active().angle, cubeyard_scene::ROTATION_STEP);
        assert_eq!(state.scene.active().position.y, MOVE_STEP);
    }
}
