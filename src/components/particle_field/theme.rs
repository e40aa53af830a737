//! Light/dark ink palettes.
//!
//! Color selection is a pure function of the [`ThemeState`] snapshot and the
//! particle, so the renderer never reaches into the page for theme state.

use super::particles::{Hue, Particle};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self {
			a: a.clamp(0.0, 1.0),
			..self
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Theme flag as read from the page at the start of a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ThemeState {
	pub light: bool,
}

/// Colors and opacities for one theme.
#[derive(Clone, Debug)]
pub struct Palette {
	pub primary: Color,
	pub accent: Color,
	/// Peak particle opacity.
	pub particle_alpha: f64,
	/// Opacity of an edge between two coincident particles.
	pub edge_alpha: f64,
}

impl Palette {
	/// Neon ink on a near-black page.
	pub fn dark() -> Self {
		Self {
			primary: Color::rgb(0, 245, 255),
			accent: Color::rgb(255, 0, 128),
			particle_alpha: 0.75,
			edge_alpha: 0.35,
		}
	}

	/// Deeper inks that stay visible on paper white.
	pub fn light() -> Self {
		Self {
			primary: Color::rgb(0, 106, 255),
			accent: Color::rgb(204, 0, 102),
			particle_alpha: 0.6,
			edge_alpha: 0.22,
		}
	}

	pub fn for_theme(theme: ThemeState) -> Self {
		if theme.light { Self::light() } else { Self::dark() }
	}

	pub fn ink(&self, hue: Hue) -> Color {
		match hue {
			Hue::Primary => self.primary,
			Hue::Accent => self.accent,
		}
	}

	/// Fill color for a particle. Shimmer never takes a particle fully
	/// transparent, since edges still attach to it.
	pub fn particle_color(&self, p: &Particle) -> Color {
		let alpha = self.particle_alpha * (0.35 + 0.65 * p.shimmer()) * (0.55 + 0.45 * p.z);
		self.ink(p.hue).with_alpha(alpha)
	}

	/// Stroke color for an edge of length `dist` under `threshold`.
	pub fn edge_color(&self, dist: f64, threshold: f64) -> Color {
		self.primary
			.with_alpha((1.0 - dist / threshold) * self.edge_alpha)
	}
}
