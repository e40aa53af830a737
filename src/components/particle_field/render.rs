//! Drawing the field.
//!
//! Rendering goes through the [`Surface`] trait so the frame logic runs the
//! same against a 2D canvas context and against a recorder in tests.
//! Two passes for z-ordering:
//! 1. Edges between particles closer than the connection distance
//! 2. Particles, with optional glow

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::grid::SpatialGrid;
use super::particles::Particle;
use super::theme::{Color, Palette};

/// Minimal drawing interface the renderer needs.
pub trait Surface {
	/// Clear the whole drawable area, in canvas space.
	fn clear(&mut self, width: f64, height: f64);
	/// Fill a circle. `glow` is a blur radius, `None` for a flat fill.
	fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Color, glow: Option<f64>);
	/// Stroke a straight line.
	fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, width: f64);
}

/// What a frame drew.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
	pub particles: usize,
	pub edges: usize,
	pub glow: bool,
}

/// Per-frame render inputs that are not particles.
pub struct RenderParams<'a> {
	pub palette: &'a Palette,
	pub width: f64,
	pub height: f64,
	pub distance: f64,
	pub glow: bool,
}

/// Draw one frame. `grid` must already be built from `particles`.
pub fn render(
	surface: &mut impl Surface,
	particles: &[Particle],
	grid: &SpatialGrid,
	params: &RenderParams<'_>,
) -> FrameStats {
	surface.clear(params.width, params.height);

	let mut edges = 0;
	grid.for_each_pair_within(particles, params.distance, |i, j, dist| {
		let (a, b) = (&particles[i], &particles[j]);
		let color = params.palette.edge_color(dist, params.distance);
		let width = 0.4 + 0.4 * (a.z + b.z) * 0.5;
		surface.line((a.x, a.y), (b.x, b.y), color, width);
		edges += 1;
	});

	for p in particles {
		let glow = params.glow.then(|| 4.0 + p.z * 8.0);
		surface.fill_circle(p.x, p.y, p.size, params.palette.particle_color(p), glow);
	}

	FrameStats {
		particles: particles.len(),
		edges,
		glow: params.glow,
	}
}

impl Surface for CanvasRenderingContext2d {
	fn clear(&mut self, width: f64, height: f64) {
		self.clear_rect(0.0, 0.0, width, height);
	}

	fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Color, glow: Option<f64>) {
		let css = color.to_css();
		match glow {
			Some(blur) => {
				self.set_shadow_blur(blur);
				self.set_shadow_color(&css);
			}
			None => self.set_shadow_blur(0.0),
		}
		self.set_fill_style_str(&css);
		self.begin_path();
		// Only a negative radius is rejected; there is nothing to fill then.
		if self.arc(x, y, radius, 0.0, PI * 2.0).is_ok() {
			self.fill();
		}
	}

	fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, width: f64) {
		self.set_shadow_blur(0.0);
		self.set_stroke_style_str(&color.to_css());
		self.set_line_width(width);
		self.begin_path();
		self.move_to(from.0, from.1);
		self.line_to(to.0, to.1);
		self.stroke();
	}
}
