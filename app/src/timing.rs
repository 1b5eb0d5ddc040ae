use std::time::{Duration, Instant};

use strata_engine::ecs::System;

/// The name other systems use to depend on [`Timing`].
pub const TIMING: &str = "timing";

/// The value the timing system produces each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// The frame number, starting at 1.
    pub frame: u64,
    /// Wall-clock time since the previous frame. Zero on the first frame.
    pub delta: Duration,
}

/// Counts frames and measures the wall-clock delta between them.
#[derive(Debug, Default)]
pub struct Timing {
    // When the previous frame was produced
    last: Option<Instant>,
    frame: u64,
}

impl Timing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next frame, capturing the delta since the last one.
    pub fn advance(&mut self) -> Frame {
        let now = Instant::now();
        let delta = self.last.map_or(Duration::ZERO, |last| now - last);
        self.last = Some(now);
        self.frame += 1;
        Frame {
            frame: self.frame,
            delta,
        }
    }

    /// Wrap this timer in a system registered under [`TIMING`].
    pub fn into_system(mut self) -> System {
        System::new(TIMING, move |_ctx| Ok(self.advance()))
    }
}
