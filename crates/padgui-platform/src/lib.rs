//! Desktop runner for padgui: one winit window, a wgpu backend scaled to a
//! fixed logical size, and a frame loop the host drives itself.
//!
//! ```no_run
//! use padgui_platform::Platform;
//!
//! let mut platform = Platform::init("theme", std::env::args().skip(1))?;
//! let title = platform.region("title")?;
//! loop {
//!     if platform.process().quit() {
//!         break;
//!     }
//!     platform.present(&[&title]);
//!     platform.frame_delay();
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use padgui_core::{Color, InputEvent, InputHandler, NullSound, Resources, SoundSink};
use padgui_render_wgpu::WgpuBackend;
use padgui_ui::{Region, Theme, UiContext};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, Window, WindowAttributes};

pub mod keymap;
pub mod modal;

pub use modal::{MenuExit, keyboard, option_menu};

/// 30 frames per second.
pub const FRAME_TIME: Duration = Duration::from_millis(1000 / 30);

/// Collects window events between pumps.
struct Pump {
    pending: Option<WindowAttributes>,
    window: Option<Arc<Window>>,
    error: Option<winit::error::OsError>,
    events: Vec<InputEvent>,
    resized: Option<(u32, u32)>,
}

impl ApplicationHandler<()> for Pump {
    fn resumed(&mut self, el: &ActiveEventLoop) {
        let Some(attrs) = self.pending.take() else {
            return;
        };
        match el.create_window(attrs) {
            Ok(win) => {
                let size = win.inner_size();
                log::info!("window created {}x{}", size.width, size.height);
                self.window = Some(Arc::new(win));
            }
            Err(e) => {
                log::error!("Failed to create window: {e:?}");
                self.error = Some(e);
                el.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        _el: &ActiveEventLoop,
        _id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window close requested");
                self.events.push(InputEvent::Quit);
            }
            WindowEvent::Resized(size) => {
                self.resized = Some((size.width, size.height));
                self.events.push(InputEvent::Exposed);
            }
            WindowEvent::RedrawRequested | WindowEvent::Occluded(false) => {
                self.events.push(InputEvent::Exposed);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                if let Some(key) = keymap::translate(code) {
                    self.events.push(match state {
                        ElementState::Pressed => InputEvent::KeyDown(key),
                        ElementState::Released => InputEvent::KeyUp(key),
                    });
                }
            }
            _ => {}
        }
    }
}

pub struct Platform {
    event_loop: EventLoop<()>,
    pump: Pump,
    window: Arc<Window>,
    theme: Theme,
    ctx: UiContext,
    input: InputHandler,
    last_frame: Instant,
}

impl Platform {
    /// Open the window described by the theme in `dir`. `window` among
    /// `args` forces windowed mode.
    pub fn init<I, S>(dir: impl AsRef<Path>, args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::init_with_sounds(dir, args, Box::new(NullSound))
    }

    pub fn init_with_sounds<I, S>(
        dir: impl AsRef<Path>,
        args: I,
        sounds: Box<dyn SoundSink>,
    ) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dir = dir.as_ref();
        let theme = Theme::load(dir)?;
        let opts = theme.options().clone();
        let windowed = args.into_iter().any(|a| a.as_ref() == "window") || !opts.fullscreen;

        let (sw, sh) = opts.screen_size.unwrap_or(opts.logical_size);
        let mut attrs = Window::default_attributes()
            .with_title(opts.title.clone())
            .with_inner_size(PhysicalSize::new(sw, sh));
        if !windowed {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let mut event_loop = EventLoop::new()?;
        let mut pump = Pump {
            pending: Some(attrs),
            window: None,
            error: None,
            events: Vec::new(),
            resized: None,
        };
        let mut window = None;
        for _ in 0..100 {
            let status = event_loop.pump_app_events(Some(Duration::from_millis(10)), &mut pump);
            if let Some(e) = pump.error.take() {
                return Err(e.into());
            }
            if let Some(w) = &pump.window {
                window = Some(w.clone());
                break;
            }
            if let PumpStatus::Exit(code) = status {
                anyhow::bail!("event loop exited ({code}) before the window opened");
            }
        }
        let window = window.ok_or_else(|| anyhow::anyhow!("window was never created"))?;

        let backend = WgpuBackend::new(window.clone())?;
        let resources = Resources::new([dir.to_path_buf(), dir.join("assets")]);
        let mut ctx = UiContext::new(Box::new(backend), resources, opts.logical_size)
            .with_sounds(sounds);
        theme.apply(&mut ctx)?;

        Ok(Self {
            event_loop,
            pump,
            window,
            theme,
            ctx,
            input: InputHandler::new(),
            last_frame: Instant::now(),
        })
    }

    /// Pump pending window events into the input handler.
    pub fn process(&mut self) -> &InputHandler {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.pump);
        if let PumpStatus::Exit(code) = status {
            log::info!("event loop exited ({code})");
            self.pump.events.push(InputEvent::Quit);
        }
        if let Some((w, h)) = self.pump.resized.take() {
            self.ctx.resize(w, h);
        }
        self.input.process(self.pump.events.drain(..));
        &self.input
    }

    /// Queue an event for the next [`Platform::process`], e.g. from a
    /// controller library.
    pub fn push_event(&mut self, event: InputEvent) {
        self.pump.events.push(event);
    }

    /// Sleep out the rest of the frame.
    pub fn frame_delay(&mut self) {
        if let Some(rest) = FRAME_TIME.checked_sub(self.last_frame.elapsed()) {
            std::thread::sleep(rest);
        }
        self.last_frame = Instant::now();
    }

    /// Draw `regions` in order over black and show the result.
    pub fn present(&mut self, regions: &[&Region]) {
        self.ctx.begin_frame(Color::BLACK);
        for region in regions {
            region.draw(&mut self.ctx);
        }
        self.ctx.present();
    }

    /// Build the theme's Region `name`.
    pub fn region(&mut self, name: &str) -> Result<Region, padgui_core::Error> {
        Region::named(&mut self.ctx, &self.theme, name)
    }

    pub fn input(&self) -> &InputHandler {
        &self.input
    }

    /// The context together with this frame's input.
    pub fn ui(&mut self) -> (&mut UiContext, &InputHandler) {
        (&mut self.ctx, &self.input)
    }

    pub fn ctx(&self) -> &UiContext {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut UiContext {
        &mut self.ctx
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}
