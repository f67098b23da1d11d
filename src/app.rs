//! Window and event-loop glue.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::{Backend, EngineConfig};
use crate::engine::{Engine, Flow};
use crate::error::{EngineError, ResourceError};
use crate::gpu::{GpuContext, GpuIntegrator, PointRenderer};
use crate::input::Input;
use crate::integrator::{CpuIntegrator, IntegrationBackend};
use crate::time::FrameClock;

type ViewerEngine = Engine<Box<dyn IntegrationBackend>, PointRenderer>;

/// Open a window and run the viewer until it is closed.
///
/// Configuration problems and resource failures during setup are
/// returned; nothing after the first frame fails this function.
pub fn run(config: EngineConfig) -> Result<(), EngineError> {
    config.validate()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    config: EngineConfig,
    window: Option<Arc<Window>>,
    engine: Option<ViewerEngine>,
    input: Input,
    clock: FrameClock,
    /// Setup failure, reported once the event loop has exited.
    error: Option<EngineError>,
}

impl App {
    fn new(config: EngineConfig) -> Self {
        Self {
            config,
            window: None,
            engine: None,
            input: Input::new(),
            clock: FrameClock::new(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), EngineError> {
        let resolution = self.config.resolution;
        let window_attrs = Window::default_attributes()
            .with_title("Attractors")
            .with_inner_size(winit::dpi::PhysicalSize::new(resolution.width, resolution.height));

        let window = Arc::new(event_loop.create_window(window_attrs).map_err(ResourceError::from)?);

        let context = pollster::block_on(GpuContext::new(window.clone(), self.config.vsync))?;
        let count = self.config.particle_count;
        context.check_particle_capacity(count)?;

        let backend: Box<dyn IntegrationBackend> = match self.config.backend {
            Backend::Gpu => Box::new(GpuIntegrator::new(
                context.device().clone(),
                context.queue().clone(),
                count as u32,
            )),
            Backend::Cpu => Box::new(CpuIntegrator::new(count)),
        };

        let renderer = PointRenderer::new(context);
        let mut engine = Engine::new(&self.config, backend, renderer)?;

        // The platform may not honour the requested size.
        let size = window.inner_size();
        engine.resize(size.width, size.height);

        window.set_title(&engine.status_line(0.0));
        self.window = Some(window);
        self.engine = Some(engine);
        Ok(())
    }

    /// Let the in-flight frame finish, drain the GPU, then leave the loop.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(engine) = &self.engine {
            engine.finish();
            log::info!("Exiting after {} frames", engine.simulation().frames());
        }
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(engine) = &mut self.engine else {
            return;
        };

        let dt = self.clock.tick();
        let flow = engine.handle_input(&self.input, dt);
        self.input.begin_frame();
        if flow == Flow::Exit {
            self.shutdown(event_loop);
            return;
        }

        match engine.frame() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                engine.renderer_mut().reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                self.shutdown(event_loop);
                return;
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }

        if let Some(window) = &self.window {
            if self.clock.fps_updated() {
                window.set_title(&engine.status_line(self.clock.fps()));
            }
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                log::error!("{}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}
