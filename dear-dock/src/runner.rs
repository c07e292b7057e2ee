//! Native window loop: winit events, wgpu surface and the Dear ImGui
//! platform/renderer pair around an [`AppShell`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use dear_imgui_rs as imgui;
use dear_imgui_wgpu as imgui_wgpu;
use dear_imgui_winit as imgui_winit;
use pollster::block_on;
use tracing::{error, info, warn};
use wgpu::SurfaceError;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::error::{Result, RunnerError};
use crate::geometry::WindowGeometry;
use crate::params::{RedrawMode, RunnerParams};
use crate::shell::{AppShell, WindowConfig};

/// Open the window and run until the user quits.
///
/// The runner owns `state` for the whole run and lends it to every
/// callback. Invalid parameters (for example a docking split that names an
/// unknown space) are reported before any window is created.
pub fn run<S>(params: RunnerParams<S>, state: S) -> Result<()> {
    let (shell, config) = AppShell::from_params(params)?;

    let event_loop = EventLoop::new()?;
    match config.redraw {
        RedrawMode::Poll => event_loop.set_control_flow(ControlFlow::Poll),
        RedrawMode::Wait => event_loop.set_control_flow(ControlFlow::Wait),
        RedrawMode::WaitUntil { fps } => event_loop.set_control_flow(ControlFlow::WaitUntil(
            Instant::now() + frame_interval(fps),
        )),
    }

    let mut app = App::new(config, shell, state);
    info!("Starting event loop");
    event_loop.run_app(&mut app)?;
    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn frame_interval(fps: f32) -> Duration {
    Duration::from_secs_f32(1.0 / fps.max(1.0))
}

struct ImguiState {
    context: imgui::Context,
    platform: imgui_winit::WinitPlatform,
    renderer: imgui_wgpu::WgpuRenderer,
    last_frame: Instant,
    /// Secondary viewports are live for this context.
    #[cfg_attr(not(feature = "multi-viewport"), allow(dead_code))]
    viewports: bool,
}

struct AppWindow {
    device: wgpu::Device,
    queue: wgpu::Queue,
    window: Arc<Window>,
    surface_desc: wgpu::SurfaceConfiguration,
    surface: wgpu::Surface<'static>,
    imgui: ImguiState,
    clear_color: wgpu::Color,
}

impl AppWindow {
    fn new<S>(
        event_loop: &ActiveEventLoop,
        cfg: &WindowConfig,
        geometry: Option<WindowGeometry>,
        shell: &mut AppShell<S>,
        state: &mut S,
    ) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let window = {
            let (width, height) = geometry
                .map(|g| g.size())
                .unwrap_or(cfg.app_window.window_size);
            let mut attributes = Window::default_attributes()
                .with_title(cfg.app_window.window_title.clone())
                .with_inner_size(LogicalSize::new(width, height));
            if let Some((x, y)) = geometry.and_then(|g| g.position()) {
                attributes = attributes.with_position(PhysicalPosition::new(x, y));
            }
            Arc::new(event_loop.create_window(attributes)?)
        };

        let surface = instance.create_surface(window.clone())?;

        let adapter = block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|_| RunnerError::NoAdapter)?;

        let (device, queue) =
            block_on(adapter.request_device(&wgpu::DeviceDescriptor::default()))?;

        let physical_size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let preferred_srgb = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        let format = preferred_srgb
            .iter()
            .copied()
            .find(|f| caps.formats.contains(f))
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| RunnerError::Generic("surface reports no texture format".into()))?;

        let surface_desc = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: physical_size.width.max(1),
            height: physical_size.height.max(1),
            present_mode: cfg.app_window.present_mode,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_desc);

        let mut context = imgui::Context::create();
        shell.setup_context(&mut context, state);

        let mut platform = imgui_winit::WinitPlatform::new(&mut context);
        platform.attach_window(&window, imgui_winit::HiDpiMode::Default, &mut context);
        let viewports = viewports_enabled(&context);
        #[cfg(feature = "multi-viewport")]
        if viewports {
            imgui_winit::multi_viewport::init_multi_viewport_support(&mut context, &window);
        }

        // Secondary viewports create their own surfaces from these
        let init_info =
            imgui_wgpu::WgpuInitInfo::new(device.clone(), queue.clone(), surface_desc.format)
                .with_instance(instance.clone())
                .with_adapter(adapter.clone());
        let mut renderer = imgui_wgpu::WgpuRenderer::new(init_info, &mut context)
            .map_err(|e| RunnerError::Renderer(format!("Failed to init renderer: {e}")))?;
        renderer.set_gamma_mode(imgui_wgpu::GammaMode::Auto);

        let [r, g, b, a] = cfg.app_window.clear_color;
        Ok(Self {
            device,
            queue,
            window,
            surface_desc,
            surface,
            imgui: ImguiState {
                context,
                platform,
                renderer,
                last_frame: Instant::now(),
                viewports,
            },
            clear_color: wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: a as f64,
            },
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.surface_desc.width = new_size.width;
            self.surface_desc.height = new_size.height;
            self.surface.configure(&self.device, &self.surface_desc);
        }
    }

    fn geometry(&self) -> WindowGeometry {
        let size = self
            .window
            .inner_size()
            .to_logical::<f64>(self.window.scale_factor());
        let mut geometry = WindowGeometry::new((size.width, size.height));
        if let Ok(pos) = self.window.outer_position() {
            geometry.x = Some(pos.x);
            geometry.y = Some(pos.y);
        }
        geometry
    }

    /// Install the renderer's viewport callbacks. They keep a pointer to the
    /// renderer, so call this once the window has reached its final place.
    fn attach_viewport_renderer(&mut self) {
        #[cfg(feature = "multi-viewport")]
        if self.imgui.viewports {
            imgui_wgpu::multi_viewport::enable(&mut self.imgui.renderer, &mut self.imgui.context);
            info!("Multi-viewport enabled");
        }
    }

    /// Draw and present one frame. Returns true when the app asked to exit.
    fn render<S>(
        &mut self,
        event_loop: &ActiveEventLoop,
        shell: &mut AppShell<S>,
        state: &mut S,
    ) -> Result<bool> {
        let now = Instant::now();
        let delta_time = now - self.imgui.last_frame;
        self.imgui
            .context
            .io_mut()
            .set_delta_time(delta_time.as_secs_f32().max(f32::EPSILON));
        self.imgui.last_frame = now;

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_desc);
                return Ok(false);
            }
            Err(SurfaceError::Timeout) => {
                return Ok(false);
            }
            Err(e) => return Err(RunnerError::from(e)),
        };

        self.imgui
            .platform
            .prepare_frame(&self.window, &mut self.imgui.context);
        let ui = self.imgui.context.frame();
        shell.frame(ui, Some(&mut self.imgui.renderer), state);

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let draw_data = self.imgui.context.render();

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            self.imgui
                .renderer
                .new_frame()
                .map_err(|e| RunnerError::Renderer(format!("new_frame failed: {e}")))?;
            self.imgui
                .renderer
                .render_draw_data_with_fb_size(
                    draw_data,
                    &mut rpass,
                    self.surface_desc.width,
                    self.surface_desc.height,
                )
                .map_err(|e| RunnerError::Renderer(format!("render_draw_data failed: {e}")))?;
        }

        // main surface first, then the secondary viewports
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        self.render_viewports(event_loop);
        Ok(shell.end_frame())
    }

    #[cfg(feature = "multi-viewport")]
    fn render_viewports(&mut self, event_loop: &ActiveEventLoop) {
        if !self.imgui.viewports {
            return;
        }
        let _guard = imgui_winit::multi_viewport::set_event_loop_for_frame(event_loop);
        self.imgui.context.update_platform_windows();
        self.imgui.context.render_platform_windows_default();
    }

    #[cfg(not(feature = "multi-viewport"))]
    fn render_viewports(&mut self, _event_loop: &ActiveEventLoop) {}

    /// Feed a window event to Dear ImGui. Events of secondary viewports are
    /// routed to them; the platform only sees events of the main window.
    fn handle_event(&mut self, event: &Event<()>) {
        #[cfg(feature = "multi-viewport")]
        if self.imgui.viewports {
            imgui_winit::multi_viewport::handle_event_with_multi_viewport(
                &mut self.imgui.platform,
                &mut self.imgui.context,
                &self.window,
                event,
            );
            return;
        }
        if let Event::WindowEvent { window_id, .. } = event
            && *window_id == self.window.id()
        {
            self.imgui
                .platform
                .handle_event(&mut self.imgui.context, &self.window, event);
        }
    }
}

#[cfg(feature = "multi-viewport")]
impl Drop for AppWindow {
    fn drop(&mut self) {
        if self.imgui.viewports {
            imgui_winit::multi_viewport::shutdown_multi_viewport_support();
            imgui_wgpu::multi_viewport::shutdown_multi_viewport_support(&mut self.imgui.context);
        }
    }
}

/// Whether the context asked for viewports and both backends can host them.
fn viewports_enabled(context: &imgui::Context) -> bool {
    let io = context.io();
    io.config_flags().contains(imgui::ConfigFlags::VIEWPORTS_ENABLE)
        && io
            .backend_flags()
            .contains(imgui::BackendFlags::from_bits_retain(
                imgui::sys::ImGuiBackendFlags_PlatformHasViewports as i32,
            ))
}

struct App<S> {
    cfg: WindowConfig,
    shell: AppShell<S>,
    state: S,
    window: Option<AppWindow>,
    /// Geometry restored at startup, reused if the GPU stack is rebuilt.
    geometry: Option<WindowGeometry>,
    last_wake: Instant,
    exiting: bool,
    fatal: Option<RunnerError>,
}

impl<S> App<S> {
    fn new(cfg: WindowConfig, shell: AppShell<S>, state: S) -> Self {
        let geometry = cfg
            .geometry_path
            .as_deref()
            .and_then(|path| match WindowGeometry::load(path) {
                Ok(geometry) => geometry,
                Err(e) => {
                    warn!("Ignoring saved window geometry: {e}");
                    None
                }
            });
        Self {
            cfg,
            shell,
            state,
            window: None,
            geometry,
            last_wake: Instant::now(),
            exiting: false,
            fatal: None,
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = AppWindow::new(
            event_loop,
            &self.cfg,
            self.geometry,
            &mut self.shell,
            &mut self.state,
        )?;
        window.window.request_redraw();
        let window = self.window.insert(window);
        window.attach_viewport_renderer();
        self.shell.post_init(&mut self.state);
        Ok(())
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        if self.exiting {
            return;
        }
        self.exiting = true;
        self.shell.before_exit(&mut self.state);

        if let (Some(path), Some(window)) = (self.cfg.geometry_path.as_deref(), &self.window) {
            match window.geometry().save(path) {
                Ok(()) => info!("Saved window geometry to {}", path.display()),
                Err(e) => warn!("Cannot save window geometry: {e}"),
            }
        }
        // dropping the context writes the ini file
        self.window = None;
        event_loop.exit();
    }
}

impl<S> ApplicationHandler for App<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            match self.create_window(event_loop) {
                Ok(()) => info!("Window created successfully"),
                Err(e) => {
                    error!("Failed to create window: {e}");
                    self.fatal = Some(e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_mut() else {
            return;
        };
        let full_event: Event<()> = Event::WindowEvent {
            window_id,
            event: event.clone(),
        };
        window.handle_event(&full_event);
        if window_id != window.window.id() {
            return;
        }

        match event {
            WindowEvent::RedrawRequested => {
                match window.render(event_loop, &mut self.shell, &mut self.state) {
                    Ok(true) => self.exit(event_loop),
                    Ok(false) => {
                        if self.cfg.redraw == RedrawMode::Poll {
                            window.window.request_redraw();
                        }
                    }
                    Err(e) => {
                        error!("Render error: {e}; attempting to recover by recreating GPU state");
                        self.window = None;
                        if let Err(e) = self.create_window(event_loop) {
                            error!("Failed to recreate window after GPU error: {e}");
                            self.fatal = Some(e);
                            self.exit(event_loop);
                        } else {
                            info!("Successfully recreated window and GPU state after error");
                        }
                    }
                }
            }
            WindowEvent::Resized(physical_size) => {
                window.resize(physical_size);
                window.window.request_redraw();
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = window.window.inner_size();
                window.resize(new_size);
                window.window.request_redraw();
            }
            WindowEvent::CloseRequested => self.exit(event_loop),
            _ => {
                if self.cfg.redraw != RedrawMode::Poll {
                    window.window.request_redraw();
                }
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = &self.window else {
            return;
        };
        match self.cfg.redraw {
            RedrawMode::Poll => window.window.request_redraw(),
            RedrawMode::Wait => {}
            RedrawMode::WaitUntil { fps } => {
                let interval = frame_interval(fps);
                if self.last_wake.elapsed() >= interval {
                    window.window.request_redraw();
                    self.last_wake = Instant::now();
                }
                event_loop.set_control_flow(ControlFlow::WaitUntil(self.last_wake + interval));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_until_interval_is_clamped() {
        assert_eq!(frame_interval(4.0), Duration::from_millis(250));
        assert_eq!(frame_interval(0.5), Duration::from_secs(1));
    }

    #[test]
    fn renderer_takes_the_runner_wgpu_types() {
        // only builds when dear-imgui-wgpu and this crate link the same wgpu
        fn init_info(
            device: wgpu::Device,
            queue: wgpu::Queue,
            instance: wgpu::Instance,
            adapter: wgpu::Adapter,
        ) -> imgui_wgpu::WgpuInitInfo {
            imgui_wgpu::WgpuInitInfo::new(device, queue, wgpu::TextureFormat::Bgra8UnormSrgb)
                .with_instance(instance)
                .with_adapter(adapter)
        }
        let _ = init_info;
        let desc = wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        };
        assert!(desc.backends.contains(wgpu::Backends::VULKAN));
    }
}
