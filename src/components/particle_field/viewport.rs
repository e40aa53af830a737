//! Canvas sizing and viewport-dependent scaling.
//!
//! # Coordinate spaces
//!
//! - **Client space**: pointer coordinates as delivered by mouse events,
//!   relative to the browser viewport.
//! - **Canvas space**: CSS pixels relative to the canvas origin. The
//!   simulation, the connection distance and the pointer repulsion radius all
//!   live here, so visual behavior is identical on every display density.
//! - **Backing space**: device pixels of the canvas backing store. Only the
//!   drawing surface sees these, through a `dpr` scale transform.

use super::config::Density;

/// Reference viewport the default particle counts are tuned for.
pub const REFERENCE_WIDTH: f64 = 1366.0;
pub const REFERENCE_HEIGHT: f64 = 768.0;

const WIDTH_FACTOR_RANGE: (f64, f64) = (0.5, 1.6);
const AREA_FACTOR_RANGE: (f64, f64) = (0.5, 2.4);

/// Current canvas geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
	/// CSS width of the canvas.
	pub width: f64,
	/// CSS height of the canvas.
	pub height: f64,
	/// Device pixel ratio after capping.
	pub dpr: f64,
	/// Canvas top-left corner in client space.
	pub offset: (f64, f64),
}

impl Viewport {
	/// Build a viewport, capping the reported device pixel ratio.
	///
	/// Non-finite or non-positive sizes collapse to zero; a bogus ratio falls
	/// back to 1.0.
	pub fn new(width: f64, height: f64, raw_dpr: f64, max_dpr: f64) -> Self {
		let dpr = if raw_dpr.is_finite() && raw_dpr > 0.0 {
			raw_dpr.min(max_dpr.max(1.0))
		} else {
			1.0
		};
		Self {
			width: sanitize(width),
			height: sanitize(height),
			dpr,
			offset: (0.0, 0.0),
		}
	}

	pub fn with_offset(mut self, left: f64, top: f64) -> Self {
		self.offset = (left, top);
		self
	}

	/// Backing-store size in device pixels.
	pub fn backing_size(&self) -> (u32, u32) {
		(
			(self.width * self.dpr).floor() as u32,
			(self.height * self.dpr).floor() as u32,
		)
	}

	/// Multiplier applied to the target particle count for this viewport.
	pub fn density_factor(&self, mode: Density) -> f64 {
		match mode {
			Density::Width => {
				(self.width / REFERENCE_WIDTH).clamp(WIDTH_FACTOR_RANGE.0, WIDTH_FACTOR_RANGE.1)
			}
			Density::Area => ((self.width * self.height) / (REFERENCE_WIDTH * REFERENCE_HEIGHT))
				.clamp(AREA_FACTOR_RANGE.0, AREA_FACTOR_RANGE.1),
		}
	}

	/// Convert a client-space point into canvas space.
	pub fn to_canvas(&self, client_x: f64, client_y: f64) -> (f64, f64) {
		(client_x - self.offset.0, client_y - self.offset.1)
	}
}

fn sanitize(v: f64) -> f64 {
	if v.is_finite() && v > 0.0 { v } else { 0.0 }
}
