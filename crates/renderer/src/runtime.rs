use std::time::{Duration, Instant};

use crate::events::HostEvent;
use crate::surface::Surface2d;

/// Frames may start this much early to absorb event loop jitter.
const FRAME_SLACK: Duration = Duration::from_micros(250);

/// Snapshot of the clock handed to a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Elapsed wall-clock or simulated time in seconds.
    pub seconds: f32,
    /// Monotonic frame counter for the running session.
    pub frame_index: u64,
    /// Instant the frame represents; simulated for stepped sources.
    pub instant: Instant,
}

/// Abstraction over where time values originate from.
pub trait TimeSource {
    /// Resets the source to its initial state.
    fn reset(&mut self);
    /// Produces a time sample for the next frame.
    fn sample(&mut self) -> TimeSample;
    /// The instant events arriving now should be stamped with.
    fn now(&self) -> Instant;
}

/// Time source backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
    frame: u64,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            frame: 0,
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn reset(&mut self) {
        self.origin = Instant::now();
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let instant = Instant::now();
        let sample = TimeSample {
            seconds: instant.duration_since(self.origin).as_secs_f32(),
            frame_index: self.frame,
            instant,
        };
        self.frame = self.frame.saturating_add(1);
        sample
    }

    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Simulated clock that advances by a fixed step per sampled frame, for
/// deterministic headless output.
#[derive(Debug, Clone, Copy)]
pub struct SteppedTimeSource {
    origin: Instant,
    step: Duration,
    frame: u64,
}

impl SteppedTimeSource {
    pub fn new(origin: Instant, step: Duration) -> Self {
        Self {
            origin,
            step,
            frame: 0,
        }
    }

    fn elapsed(&self) -> Duration {
        self.step
            .saturating_mul(u32::try_from(self.frame).unwrap_or(u32::MAX))
    }
}

impl TimeSource for SteppedTimeSource {
    fn reset(&mut self) {
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let elapsed = self.elapsed();
        let sample = TimeSample {
            seconds: elapsed.as_secs_f32(),
            frame_index: self.frame,
            instant: self.origin + elapsed,
        };
        self.frame = self.frame.saturating_add(1);
        sample
    }

    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}

/// Decides when the next frame is due. A stopped loop never asks for
/// another frame.
#[derive(Debug, Clone)]
pub struct FrameLoop {
    running: bool,
    target_interval: Option<Duration>,
    last_render: Option<Instant>,
    frames: u64,
}

impl FrameLoop {
    pub fn new(target_fps: Option<f32>) -> Self {
        let target_interval = target_fps
            .filter(|fps| *fps > 0.0 && fps.is_finite())
            .map(|fps| Duration::from_secs_f32(1.0 / fps));
        Self {
            running: true,
            target_interval,
            last_render: None,
            frames: 0,
        }
    }

    pub fn target_interval(&self) -> Option<Duration> {
        self.target_interval
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        if self.running {
            tracing::debug!(frames = self.frames, "frame loop stopped");
        }
        self.running = false;
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        if !self.running {
            return false;
        }
        match (self.target_interval, self.last_render) {
            (Some(interval), Some(last)) => {
                now.saturating_duration_since(last) + FRAME_SLACK >= interval
            }
            _ => true,
        }
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_render = Some(now);
        self.frames = self.frames.saturating_add(1);
    }

    /// When the next capped frame is due, if the loop is waiting on a cap.
    pub fn next_deadline(&self) -> Option<Instant> {
        if !self.running {
            return None;
        }
        match (self.target_interval, self.last_render) {
            (Some(interval), Some(last)) => Some(last + interval),
            _ => None,
        }
    }
}

/// What a host drives: events in, frames out.
pub trait Frontend {
    fn handle_event(&mut self, event: HostEvent, now: Instant);

    /// Draws one frame. Called once per display refresh while the loop runs.
    fn render(&mut self, surface: &mut dyn Surface2d, sample: TimeSample);

    /// Earliest instant at which time-driven state changes, so an idle host
    /// knows when to wake up.
    fn next_deadline(&self) -> Option<Instant> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_loop_is_always_ready_until_stopped() {
        let mut frame_loop = FrameLoop::new(None);
        let now = Instant::now();
        assert!(frame_loop.ready_for_frame(now));
        frame_loop.mark_rendered(now);
        assert!(frame_loop.ready_for_frame(now));
        assert_eq!(frame_loop.next_deadline(), None);

        frame_loop.stop();
        assert!(!frame_loop.is_running());
        assert!(!frame_loop.ready_for_frame(now + Duration::from_secs(1)));
    }

    #[test]
    fn capped_loop_waits_for_interval() {
        let mut frame_loop = FrameLoop::new(Some(4.0));
        let start = Instant::now();
        frame_loop.mark_rendered(start);
        assert!(!frame_loop.ready_for_frame(start + Duration::from_millis(125)));
        assert!(frame_loop.ready_for_frame(start + Duration::from_millis(250)));
        assert_eq!(
            frame_loop.next_deadline(),
            Some(start + Duration::from_millis(250))
        );
        assert_eq!(frame_loop.frames_rendered(), 1);
    }

    #[test]
    fn non_positive_fps_disables_cap() {
        assert_eq!(FrameLoop::new(Some(0.0)).target_interval(), None);
        assert_eq!(FrameLoop::new(Some(f32::INFINITY)).target_interval(), None);
    }

    #[test]
    fn stepped_source_advances_by_step() {
        let origin = Instant::now();
        let mut source = SteppedTimeSource::new(origin, Duration::from_millis(20));
        let first = source.sample();
        let second = source.sample();
        assert_eq!(first.frame_index, 0);
        assert_eq!(first.instant, origin);
        assert_eq!(second.instant, origin + Duration::from_millis(20));
        assert!((second.seconds - 0.02).abs() < 1e-6);
        assert_eq!(source.now(), origin + Duration::from_millis(40));

        source.reset();
        assert_eq!(source.sample().instant, origin);
    }
}
