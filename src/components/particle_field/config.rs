//! Configuration for the particle field, deserialized from the page.

use serde::Deserialize;

/// Lower bound for the configured particle count.
pub const COUNT_MIN: usize = 20;
/// Hard ceiling on live particles, shared by `set_count` and click bursts.
pub const HARD_CAP: usize = 1000;
/// Shortest connection distance, in CSS pixels.
pub const DISTANCE_MIN: f64 = 20.0;
/// Longest connection distance, in CSS pixels.
pub const DISTANCE_MAX: f64 = 500.0;
/// Smallest accepted base speed (pixels/frame).
pub const SPEED_MIN: f64 = 0.05;

/// What happens when a particle drifts past the extended viewport edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
	/// Reappear on the opposite edge. Keeps density stable.
	#[default]
	Wrap,
	/// Reverse velocity and clamp to the edge.
	Bounce,
}

/// How particle count follows the viewport size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Density {
	/// Scale by viewport width against the reference width.
	#[default]
	Width,
	/// Scale by viewport area against the reference area.
	Area,
}

/// Complete field configuration. Every field has a default, so an empty
/// JSON object (or no config element at all) gives the stock look.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
	/// Target particle count on desktop.
	pub count: usize,
	/// Target particle count on touch devices and narrow screens.
	pub mobile_count: usize,
	/// Maximum connection distance.
	pub distance: f64,
	/// Base drift speed.
	pub speed: f64,
	/// Start in low-performance mode.
	pub low_perf: bool,
	/// Drop into low-performance mode when frames run long.
	pub auto_low_perf: bool,
	pub boundary: Boundary,
	pub density: Density,
	/// Extra room past each viewport edge before the boundary policy applies.
	pub margin: f64,
	/// Device pixel ratio cap.
	pub max_dpr: f64,
	/// Particle count above which glow is skipped.
	pub glow_limit: usize,
	/// Particles injected per click.
	pub burst_size: usize,
	/// Pointer repulsion radius.
	pub repulse_radius: f64,
	/// Render the on-page control panel.
	pub show_controls: bool,
}

impl Default for FieldConfig {
	fn default() -> Self {
		Self {
			count: 90,
			mobile_count: 35,
			distance: 130.0,
			speed: 0.35,
			low_perf: false,
			auto_low_perf: true,
			boundary: Boundary::Wrap,
			density: Density::Width,
			margin: 24.0,
			max_dpr: 1.5,
			glow_limit: 140,
			burst_size: 12,
			repulse_radius: 180.0,
			show_controls: false,
		}
	}
}

impl FieldConfig {
	/// Pull page-supplied geometry back into a usable range. Values are
	/// clamped rather than rejected, so a typo degrades the look instead of
	/// stopping the field.
	pub fn sanitized(self) -> Self {
		Self {
			margin: non_negative(self.margin),
			repulse_radius: non_negative(self.repulse_radius),
			burst_size: self.burst_size.min(HARD_CAP),
			..self
		}
	}
}

fn non_negative(v: f64) -> f64 {
	if v.is_finite() { v.max(0.0) } else { 0.0 }
}

/// Runtime-mutable engine settings, written by the control API and read at
/// the start of each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
	pub count: usize,
	pub distance: f64,
	pub speed: f64,
	pub low_perf: bool,
	pub paused: bool,
}

impl Settings {
	/// Initial settings; `mobile` selects the reduced particle count.
	pub fn from_config(config: &FieldConfig, mobile: bool) -> Self {
		let count = if mobile {
			config.mobile_count
		} else {
			config.count
		};
		Self {
			count: clamp_count(count),
			distance: clamp_distance(config.distance),
			speed: clamp_speed(config.speed),
			low_perf: config.low_perf,
			paused: false,
		}
	}
}

pub fn clamp_count(v: usize) -> usize {
	v.clamp(COUNT_MIN, HARD_CAP)
}

pub fn clamp_distance(v: f64) -> f64 {
	if v.is_nan() {
		return DISTANCE_MIN;
	}
	v.clamp(DISTANCE_MIN, DISTANCE_MAX)
}

pub fn clamp_speed(v: f64) -> f64 {
	if v.is_finite() { v.max(SPEED_MIN) } else { SPEED_MIN }
}
