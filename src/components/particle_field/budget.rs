//! Frame-time monitoring for automatic low-performance mode.

/// Smoothed frame interval above which the device is considered struggling.
const OVER_BUDGET_MS: f64 = 28.0;
/// Frames to observe before any verdict.
const WARMUP_FRAMES: u32 = 90;
/// Intervals longer than this are stalls (tab switch, debugger), not load.
const MAX_SAMPLE_MS: f64 = 250.0;
/// Smoothing speed for the interval average, per second of samples.
const SMOOTHING: f64 = 2.0;

/// Tracks an exponentially smoothed frame interval from rAF timestamps.
///
/// Smoothing weight scales with the sample length, so a 30 fps device and a
/// 120 fps device converge in the same wall time.
#[derive(Clone, Debug, Default)]
pub struct FrameBudget {
	last: Option<f64>,
	avg_ms: f64,
	samples: u32,
}

impl FrameBudget {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record a frame timestamp in milliseconds. Returns `true` once the
	/// smoothed interval stays over budget after warm-up.
	pub fn record(&mut self, timestamp_ms: f64) -> bool {
		let Some(last) = self.last.replace(timestamp_ms) else {
			return false;
		};
		let dt = timestamp_ms - last;
		if !(0.0..=MAX_SAMPLE_MS).contains(&dt) {
			return false;
		}

		if self.samples == 0 {
			self.avg_ms = dt;
		} else {
			let weight = 1.0 - (-SMOOTHING * dt / 1000.0).exp();
			self.avg_ms += (dt - self.avg_ms) * weight;
		}
		self.samples = self.samples.saturating_add(1);

		self.samples >= WARMUP_FRAMES && self.avg_ms > OVER_BUDGET_MS
	}

	/// Forget history; the next timestamp starts a fresh measurement.
	pub fn reset(&mut self) {
		*self = Self::default();
	}

	pub fn average_ms(&self) -> f64 {
		self.avg_ms
	}
}
