use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Fullscreen, Window, WindowId};
use softbuffer::Surface;

use crate::ui::render::draw_frame;
use crate::ui::state::{Command, Flow, SlideshowState};

pub mod render;
pub mod state;

// ---------------------------------------------------------------------------
// Application handler (winit 0.30 style)
// ---------------------------------------------------------------------------

pub struct App {
    pub state: SlideshowState,
    pub window: Option<Arc<Window>>,
    pub context: Option<softbuffer::Context<Arc<Window>>>,
    pub surface: Option<Surface<Arc<Window>, Arc<Window>>>,
}

impl App {
    pub fn new(state: SlideshowState) -> Self {
        Self {
            state,
            window: None,
            context: None,
            surface: None,
        }
    }

    fn apply(&mut self, event_loop: &ActiveEventLoop, flow: Flow) {
        match flow {
            Flow::Quit => event_loop.exit(),
            Flow::Continue => {
                if let Some(ref window) = self.window {
                    window.request_redraw();
                }
            }
        }
    }
}

pub fn key_command(key: &Key) -> Option<Command> {
    match key {
        Key::Named(NamedKey::Escape) => Some(Command::Quit),
        Key::Named(NamedKey::Space) => Some(Command::TogglePause),
        Key::Named(NamedKey::ArrowRight) => Some(Command::Next),
        Key::Named(NamedKey::ArrowLeft) => Some(Command::Previous),
        Key::Named(NamedKey::Enter) => Some(Command::CycleMode),
        _ => None,
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title("slideshow")
            .with_fullscreen(Some(Fullscreen::Borderless(None)));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Could not create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        let surface = softbuffer::Context::new(Arc::clone(&window)).and_then(|context| {
            let surface = Surface::new(&context, Arc::clone(&window))?;
            Ok((context, surface))
        });
        let (context, mut surface) = match surface {
            Ok(pair) => pair,
            Err(e) => {
                log::error!("Could not create drawing surface: {}", e);
                event_loop.exit();
                return;
            }
        };
        window.set_cursor_visible(false);

        // Lay out against the monitor; a Resized event follows once fullscreen settles.
        let size = window
            .current_monitor()
            .map(|m| m.size())
            .unwrap_or_else(|| window.inner_size());
        if let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) {
            if let Err(e) = surface.resize(w, h) {
                log::warn!("Surface resize failed: {}", e);
            }
        }
        self.state.resize(size.width, size.height);

        self.window = Some(window);
        self.context = Some(context);
        self.surface = Some(surface);

        let flow = self.state.start();
        self.apply(event_loop, flow);
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

            WindowEvent::Resized(PhysicalSize { width, height }) => {
                let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
                    return;
                };
                if let Some(ref mut surface) = self.surface {
                    if let Err(e) = surface.resize(w, h) {
                        log::warn!("Surface resize failed: {}", e);
                    }
                }
                self.state.resize(width, height);
                if let Some(ref window) = self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                if let Some(command) = key_command(&event.logical_key) {
                    let flow = self.state.handle(command);
                    self.apply(event_loop, flow);
                }
            }

            WindowEvent::RedrawRequested => {
                let (Some(window), Some(surface)) = (self.window.as_ref(), self.surface.as_mut()) else {
                    return;
                };
                let size = window.inner_size();
                let fb_w = size.width.max(1);
                let fb_h = size.height.max(1);
                match surface.buffer_mut() {
                    Ok(mut buffer) => {
                        let frame = self.state.frame.as_ref();
                        draw_frame(
                            &mut buffer,
                            fb_w,
                            fb_h,
                            frame.map(|f| &f.pixels),
                            frame.and_then(|f| f.label.as_deref()),
                        );
                        if let Err(e) = buffer.present() {
                            log::warn!("Present failed: {}", e);
                        }
                    }
                    Err(e) => log::warn!("Could not map framebuffer: {}", e),
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.next_due().is_some_and(|due| Instant::now() >= due) {
            let flow = self.state.on_timer(Instant::now());
            self.apply(event_loop, flow);
        }
        match self.state.next_due() {
            Some(due) => event_loop.set_control_flow(ControlFlow::WaitUntil(due)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}
