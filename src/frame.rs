//! Frame scheduling.
//!
//! Engines implement [`Tick`] and never schedule themselves. In the browser
//! `requestAnimationFrame` drives them (see `wasm::frame_loop`); in tests a
//! [`ManualScheduler`] steps them with a fixed frame interval.

/// Something advanced once per displayed frame.
pub trait Tick {
    /// `now_ms` is a monotonically increasing timestamp in milliseconds.
    fn tick(&mut self, now_ms: f64);
}

impl<T: Tick + ?Sized> Tick for &mut T {
    fn tick(&mut self, now_ms: f64) {
        (**self).tick(now_ms);
    }
}

/// Deterministic stand-in for the display refresh signal.
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    now_ms: f64,
    frame_ms: f64,
    frames: u64,
}

impl ManualScheduler {
    /// 60 Hz.
    pub fn new() -> Self {
        Self::with_interval(1000.0 / 60.0)
    }

    pub fn with_interval(frame_ms: f64) -> Self {
        Self {
            now_ms: 0.0,
            frame_ms,
            frames: 0,
        }
    }

    /// Run one frame and return its timestamp.
    pub fn step<T: Tick + ?Sized>(&mut self, target: &mut T) -> f64 {
        self.now_ms += self.frame_ms;
        self.frames += 1;
        target.tick(self.now_ms);
        self.now_ms
    }

    pub fn run<T: Tick + ?Sized>(&mut self, target: &mut T, frames: usize) {
        for _ in 0..frames {
            self.step(target);
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Frames-per-second over a rolling one second window.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    frames: u32,
    window_start: Option<f64>,
    fps: Option<u32>,
}

impl FpsCounter {
    const WINDOW_MS: f64 = 1000.0;

    /// Count a frame. Returns the new reading when a window closes.
    pub fn frame(&mut self, now_ms: f64) -> Option<u32> {
        let Some(start) = self.window_start else {
            self.window_start = Some(now_ms);
            return None;
        };
        self.frames += 1;

        let elapsed = now_ms - start;
        if elapsed < Self::WINDOW_MS {
            return None;
        }
        let fps = (f64::from(self.frames) * 1000.0 / elapsed).round() as u32;
        self.fps = Some(fps);
        self.frames = 0;
        self.window_start = Some(now_ms);
        Some(fps)
    }

    pub fn fps(&self) -> Option<u32> {
        self.fps
    }
}
