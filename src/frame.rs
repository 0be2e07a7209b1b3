//! Frame link: drives one tick of the app from the render loop.
//!
//! The host calls [`FrameLink::tick`] once per displayed frame with a monotonic
//! timestamp. A tick drains and processes input, forwards resize and focus events
//! to the registered [`FrameHandler`], then asks it to render the frame.

use serde::Serialize;

use crate::event::{Event, FocusState};
use crate::system::InputSystem;

/// FPS is recomputed at most this often (seconds).
pub const FPS_UPDATE_INTERVAL: f64 = 0.25;

/// Weight of the newest sample in the frame-time moving average.
pub const FRAME_TIME_SMOOTHING: f32 = 0.1;

/// Timing for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct FrameData {
    /// Seconds since the first tick.
    pub elapsed_time: f32,
    /// Seconds since the previous tick.
    pub delta_time: f32,
    pub fps: f32,
    pub frame_count: u64,
    /// Smoothed frame time in milliseconds, as fed to
    /// [`FrameLink::record_frame_time`].
    pub frame_time_ms: f32,
}

/// App-side per-frame callbacks.
pub trait FrameHandler {
    fn handle_resize(&mut self, width: u32, height: u32);

    fn handle_focus_change(&mut self, active: bool);

    /// Render one frame. `input` has already processed this tick's events.
    fn handle_frame(&mut self, frame: &FrameData, input: &InputSystem);
}

pub struct FrameLink {
    input: InputSystem,
    handler: Option<Box<dyn FrameHandler>>,
    bounds: (u32, u32),
    finished_launching: bool,

    start_time: Option<f64>,
    last_update: f64,
    frame_count: u64,
    fps_frame_count: u64,
    fps_update_time: f64,
    current_fps: f32,
    current_frame_time_ms: f32,
}

impl FrameLink {
    pub fn new(input: InputSystem) -> Self {
        Self {
            input,
            handler: None,
            bounds: (0, 0),
            finished_launching: false,
            start_time: None,
            last_update: 0.0,
            frame_count: 0,
            fps_frame_count: 0,
            fps_update_time: 0.0,
            current_fps: 0.0,
            current_frame_time_ms: 0.0,
        }
    }

    pub fn input(&self) -> &InputSystem {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputSystem {
        &mut self.input
    }

    /// Install the handler and queue a resize with the current bounds so it sees
    /// the drawable size on its first frame.
    pub fn register_frame_handler(&mut self, handler: Box<dyn FrameHandler>) {
        self.handler = Some(handler);
        let (width, height) = self.bounds;
        self.input.queue().enqueue(Event::Resize { width, height });
    }

    /// Ticks are ignored until this is called.
    pub fn finish_launching(&mut self) {
        self.finished_launching = true;
        log::info!("frame link running");
    }

    /// The drawable size changed.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.bounds = (width, height);
        self.input.queue().enqueue(Event::Resize { width, height });
    }

    pub fn set_focus(&self, state: FocusState) {
        self.input.queue().enqueue(Event::Focus(state));
    }

    pub fn bounds(&self) -> (u32, u32) {
        self.bounds
    }

    /// Run one frame at `now` (seconds, any monotonic origin).
    ///
    /// Returns the frame's timing, or `None` before [`finish_launching`](Self::finish_launching).
    pub fn tick(&mut self, now: f64) -> Option<FrameData> {
        if !self.finished_launching {
            return None;
        }

        let elapsed = match self.start_time {
            Some(start) => now - start,
            None => {
                self.start_time = Some(now);
                self.fps_update_time = 0.0;
                0.0
            }
        };
        let delta = elapsed - self.last_update;
        self.last_update = elapsed;
        self.update_fps(elapsed);

        let frame = FrameData {
            elapsed_time: elapsed as f32,
            delta_time: delta as f32,
            fps: self.current_fps,
            frame_count: self.frame_count,
            frame_time_ms: self.current_frame_time_ms,
        };

        let events = self.input.drain_and_process();

        if let Some(handler) = self.handler.as_mut() {
            for event in &events {
                match event {
                    Event::Resize { width, height } => handler.handle_resize(*width, *height),
                    Event::Focus(state) => {
                        handler.handle_focus_change(*state == FocusState::Active)
                    }
                    _ => {}
                }
            }
            handler.handle_frame(&frame, &self.input);
        }

        Some(frame)
    }

    fn update_fps(&mut self, now: f64) {
        self.frame_count += 1;
        self.fps_frame_count += 1;

        let window = now - self.fps_update_time;
        if window >= FPS_UPDATE_INTERVAL {
            if window > 0.0 {
                self.current_fps = (self.fps_frame_count as f64 / window) as f32;
                log::debug!("fps {:.1}", self.current_fps);
            }
            self.fps_update_time = now;
            self.fps_frame_count = 0;
        }
    }

    /// Feed a measured frame time (ms) into the moving average.
    pub fn record_frame_time(&mut self, frame_time_ms: f32) {
        self.current_frame_time_ms = FRAME_TIME_SMOOTHING * frame_time_ms
            + (1.0 - FRAME_TIME_SMOOTHING) * self.current_frame_time_ms;
    }

    /// Restart the clock and all counters; the next tick is elapsed time zero.
    pub fn reset_elapsed_time(&mut self) {
        self.start_time = None;
        self.last_update = 0.0;
        self.frame_count = 0;
        self.fps_update_time = 0.0;
        self.fps_frame_count = 0;
        self.current_fps = 0.0;
        self.current_frame_time_ms = 0.0;
    }

    pub fn current_fps(&self) -> f32 {
        self.current_fps
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn frame_time_ms(&self) -> f32 {
        self.current_frame_time_ms
    }

    /// Seconds since the first tick, as of the latest tick.
    pub fn elapsed_time(&self) -> f64 {
        self.last_update
    }
}
