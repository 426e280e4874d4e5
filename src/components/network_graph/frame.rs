//! Frame-rate limiting on top of the platform's per-frame callback.
//!
//! `requestAnimationFrame` fires at the display rate; [`FrameLimiter`] lets
//! through at most one callback per `1000 / target_fps` milliseconds of that
//! clock. Frames missed under load are skipped, never queued.

/// Float rounding absorbed when comparing against the frame interval.
const FRAME_EPSILON_MS: f64 = 1e-3;

/// Default target when none is configured.
pub const DEFAULT_TARGET_FPS: u32 = 60;

/// Throttles callbacks to a target frame rate.
#[derive(Clone, Debug)]
pub struct FrameLimiter {
	interval_ms: f64,
	last_ms: Option<f64>,
}

impl Default for FrameLimiter {
	fn default() -> Self {
		Self::new(DEFAULT_TARGET_FPS)
	}
}

impl FrameLimiter {
	/// `target_fps` of zero is treated as one.
	pub fn new(target_fps: u32) -> Self {
		Self {
			interval_ms: 1000.0 / f64::from(target_fps.max(1)),
			last_ms: None,
		}
	}

	/// Minimum spacing between admitted frames.
	pub fn interval_ms(&self) -> f64 {
		self.interval_ms
	}

	/// Decides whether the frame stamped `now_ms` runs.
	///
	/// Admitted frames are always at least one interval apart. A target that
	/// does not divide the display rate runs at the next slower divisor.
	pub fn admit(&mut self, now_ms: f64) -> bool {
		if let Some(last) = self.last_ms {
			let elapsed = now_ms - last;
			if elapsed >= 0.0 && elapsed + FRAME_EPSILON_MS < self.interval_ms {
				return false;
			}
		}
		self.last_ms = Some(now_ms);
		true
	}

	/// Runs `callback` with `now_ms` if the frame is admitted.
	pub fn request_frame<F: FnOnce(f64)>(&mut self, now_ms: f64, callback: F) -> bool {
		let admitted = self.admit(now_ms);
		if admitted {
			callback(now_ms);
		}
		admitted
	}

	/// Forgets the last admitted frame; the next one always runs.
	pub fn reset(&mut self) {
		self.last_ms = None;
	}
}
