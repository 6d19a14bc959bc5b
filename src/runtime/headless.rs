use crate::io::config::HeadlessConfig;
use crate::runtime::app::Platform;
use crate::scene::camera::Viewport;
use crate::ui::input::InputSnapshot;
use log::trace;

/// Platform without a window: fixed time step, scripted input, and a fixed
/// number of frames.
#[derive(Debug)]
pub struct HeadlessPlatform {
    viewport: Viewport,
    script: HeadlessConfig,
    /// Per-frame time overrides, indexed by frame.
    frame_times: Vec<f32>,
    frame: u32,
    input: InputSnapshot,
    rendering: bool,
}

impl HeadlessPlatform {
    pub fn new(viewport: Viewport, script: HeadlessConfig) -> Self {
        Self {
            viewport,
            script,
            frame_times: Vec::new(),
            frame: 0,
            input: InputSnapshot::default(),
            rendering: false,
        }
    }

    /// Replaces the fixed time step for the first frames, e.g. to simulate
    /// a stall.
    pub fn with_frame_times(mut self, frame_times: impl IntoIterator<Item = f32>) -> Self {
        self.frame_times = frame_times.into_iter().collect();
        self
    }

    /// Frames presented so far.
    pub fn frames_rendered(&self) -> u32 {
        self.frame
    }
}

impl Platform for HeadlessPlatform {
    fn process_messages(&mut self) {
        self.input = self.script.input_for_frame(self.frame);
    }

    fn is_active(&self) -> bool {
        self.frame < self.script.frames
    }

    fn input(&self) -> &InputSnapshot {
        &self.input
    }

    fn delta_time(&mut self) -> f32 {
        self.frame_times
            .get(self.frame as usize)
            .copied()
            .unwrap_or(self.script.delta_time)
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn begin_render(&mut self) {
        self.rendering = true;
    }

    fn end_render(&mut self) {
        if self.rendering {
            trace!("present frame {}", self.frame);
        }
        self.rendering = false;
        self.frame += 1;
    }
}
