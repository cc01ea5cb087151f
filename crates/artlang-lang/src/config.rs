use std::time::Duration;

/// Stack size for any thread that runs an [`Engine`](crate::Engine).
///
/// Every nested user call polls a chain of boxed futures on the thread stack,
/// so the default 2 MiB cannot hold `max_call_depth` calls in a debug build.
pub const ENGINE_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Knobs for one [`Engine`](crate::Engine). Every run starts from these.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Target ticks per second for `loop` / `draw`.
    pub frame_rate: f64,
    /// Text size used when `text` is called without one.
    pub text_size: f64,
    /// Lines of synthetic code in front of the sketch, subtracted from
    /// stack positions by the error mapper.
    pub wrapper_offset: usize,
    /// Nested user function calls allowed before a run fails. The default
    /// fits in an [`ENGINE_STACK_SIZE`] thread.
    pub max_call_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas_width: 400.0,
            canvas_height: 300.0,
            frame_rate: 60.0,
            text_size: 16.0,
            wrapper_offset: 0,
            max_call_depth: 100,
        }
    }
}

impl EngineConfig {
    pub fn with_canvas_size(mut self, width: f64, height: f64) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }

    pub fn with_frame_rate(mut self, fps: f64) -> Self {
        self.frame_rate = fps;
        self
    }

    pub fn with_text_size(mut self, size: f64) -> Self {
        self.text_size = size;
        self
    }

    pub fn with_wrapper_offset(mut self, lines: usize) -> Self {
        self.wrapper_offset = lines;
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Interval between ticks. Non-positive or non-finite rates fall back to 60 fps.
    pub fn frame_period(&self) -> Duration {
        let fps = if self.frame_rate.is_finite() && self.frame_rate > 0.0 { self.frame_rate } else { 60.0 };
        Duration::from_secs_f64(1.0 / fps)
    }
}
