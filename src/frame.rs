use std::time::Instant;

const FPS_UPDATE_INTERVAL: f32 = 1.0;
/// Deltas above this are treated as a stall (window drag, breakpoint)
const MAX_DELTA: f32 = 0.25;

/// Per-frame delta time plus an FPS estimate refreshed once a second
#[derive(Debug)]
pub struct FrameClock {
    last_tick: Instant,
    frame_number: u64,
    frame_count: u32,
    fps_update_timer: f32,
    fps: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            frame_number: 0,
            frame_count: 0,
            fps_update_timer: 0.0,
            fps: 0.0,
        }
    }

    /// Seconds since the previous tick, capped
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        self.record(delta)
    }

    /// Account for one frame of `delta` seconds
    pub fn record(&mut self, delta: f32) -> f32 {
        let delta = delta.clamp(0.0, MAX_DELTA);
        self.frame_number += 1;
        self.frame_count += 1;
        self.fps_update_timer += delta;

        if self.fps_update_timer >= FPS_UPDATE_INTERVAL {
            self.fps = self.frame_count as f32 / self.fps_update_timer;
            log::trace!("FPS: {:.1}", self.fps);
            self.frame_count = 0;
            self.fps_update_timer = 0.0;
        }
        delta
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn clock_measures_delta() {
        let mut clock = FrameClock::new();

        thread::sleep(Duration::from_millis(10));
        let delta = clock.tick();

        assert!(delta >= 0.009 && delta <= MAX_DELTA);
        assert_eq!(clock.frame_number(), 1);
    }

    #[test]
    fn fps_updates_after_interval() {
        let mut clock = FrameClock::new();
        for _ in 0..63 {
            clock.record(1.0 / 64.0);
        }
        assert_eq!(clock.fps(), 0.0);

        clock.record(1.0 / 64.0);
        assert_eq!(clock.fps(), 64.0);
    }

    #[test]
    fn stalls_are_capped() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.record(3.0), MAX_DELTA);
        assert_eq!(clock.record(-1.0), 0.0);
    }
}
