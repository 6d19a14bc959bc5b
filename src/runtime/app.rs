use crate::scene::camera::Viewport;
use crate::ui::input::InputSnapshot;
use log::{debug, info, warn};
use std::collections::HashMap;

/// Default cap on frame time; slower frames skip their update.
pub const MAX_FRAME_TIME: f32 = 0.5;

/// One screen of the application (menu, game, viewer...).
///
/// Only the current state is updated and drawn. States talk back to the
/// host through [`AppControl`].
pub trait AppState {
    fn initialize(&mut self) {}
    fn terminate(&mut self) {}
    fn update(&mut self, delta_time: f32, input: &InputSnapshot, control: &mut AppControl);
    fn draw(&mut self, viewport: &Viewport);
    fn debug_ui(&mut self) {}
}

/// Requests a state makes of the host during `update`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AppControl {
    quit: bool,
    next_state: Option<String>,
}

impl AppControl {
    /// Stops the run loop after the current frame.
    pub fn quit(&mut self) {
        self.quit = true;
    }

    /// Switches to `name` at the start of the next frame.
    pub fn change_state(&mut self, name: impl Into<String>) {
        self.next_state = Some(name.into());
    }
}

/// Window, input and swap chain, as seen by the run loop.
pub trait Platform {
    fn process_messages(&mut self);
    /// `false` once the window has been closed.
    fn is_active(&self) -> bool;
    fn input(&self) -> &InputSnapshot;
    /// Seconds since the previous call.
    fn delta_time(&mut self) -> f32;
    fn viewport(&self) -> Viewport;
    fn begin_render(&mut self);
    fn end_render(&mut self);
}

/// Counters for one call to [`App::run`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub updates: u64,
    pub skipped_updates: u64,
}

/// Owns the named states and drives the current one each frame.
pub struct App {
    name: String,
    states: HashMap<String, Box<dyn AppState>>,
    current: Option<String>,
    next: Option<String>,
    max_frame_time: f32,
    running: bool,
}

impl App {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: HashMap::new(),
            current: None,
            next: None,
            max_frame_time: MAX_FRAME_TIME,
            running: false,
        }
    }

    pub fn with_max_frame_time(mut self, seconds: f32) -> Self {
        self.max_frame_time = seconds;
        self
    }

    /// Registers a state. The first state added becomes the current one.
    /// Adding a name twice replaces the earlier state.
    pub fn add_state(&mut self, name: impl Into<String>, state: impl AppState + 'static) {
        let name = name.into();
        if self.current.is_none() {
            self.current = Some(name.clone());
        }
        if self.states.insert(name.clone(), Box::new(state)).is_some() {
            warn!("App '{}': state '{}' replaced", self.name, name);
        }
    }

    /// Queues a switch to `name`, applied at the start of the next frame.
    pub fn change_state(&mut self, name: &str) {
        if self.states.contains_key(name) {
            self.next = Some(name.to_string());
        } else {
            warn!("App '{}': no state named '{}'", self.name, name);
        }
    }

    pub fn current_state(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Runs frames until a state quits or the platform goes inactive.
    pub fn run(&mut self, platform: &mut impl Platform) -> RunSummary {
        let mut summary = RunSummary::default();

        let Some(mut current) = self.current.clone() else {
            warn!("App '{}': no states to run", self.name);
            return summary;
        };

        info!("App '{}' starting in state '{}'", self.name, current);
        if let Some(state) = self.states.get_mut(&current) {
            state.initialize();
        }

        self.running = true;
        while self.running {
            platform.process_messages();
            if !platform.is_active() {
                break;
            }

            if let Some(next) = self.next.take() {
                debug!("App '{}': '{}' -> '{}'", self.name, current, next);
                if let Some(state) = self.states.get_mut(&current) {
                    state.terminate();
                }
                current = next;
                self.current = Some(current.clone());
                if let Some(state) = self.states.get_mut(&current) {
                    state.initialize();
                }
            }

            let Some(state) = self.states.get_mut(&current) else {
                break;
            };

            let delta_time = platform.delta_time();
            let mut control = AppControl::default();
            if delta_time < self.max_frame_time {
                state.update(delta_time, platform.input(), &mut control);
                summary.updates += 1;
            } else {
                debug!("Frame took {delta_time:.3}s; update skipped");
                summary.skipped_updates += 1;
            }

            platform.begin_render();
            state.draw(&platform.viewport());
            state.debug_ui();
            platform.end_render();
            summary.frames += 1;

            if let Some(next) = control.next_state {
                self.change_state(&next);
            }
            if control.quit {
                self.quit();
            }
        }

        if let Some(state) = self.states.get_mut(&current) {
            state.terminate();
        }
        info!(
            "App '{}' stopped after {} frames ({} updates skipped)",
            self.name, summary.frames, summary.skipped_updates
        );
        summary
    }
}
