//! Field simulation state and the control API.
//!
//! Wraps the particle store with viewport geometry, runtime settings, the
//! spatial grid and the run state. Created once when the component mounts,
//! then mutated each frame by the animation loop and between frames by event
//! handlers. All access happens on the browser's main thread, so anything an
//! event handler writes is seen by the next frame.

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::budget::FrameBudget;
use super::config::{FieldConfig, Settings, clamp_count, clamp_distance, clamp_speed};
use super::grid::SpatialGrid;
use super::particles::{ParticleStore, effective_count};
use super::render::{FrameStats, RenderParams, Surface, render};
use super::theme::{Palette, ThemeState};
use super::viewport::Viewport;

/// Push strength of the pointer at zero distance, before depth scaling.
const REPULSE_STRENGTH: f64 = 1.8;

/// Core engine state: particles, geometry, settings and run flags.
pub struct FieldState {
	pub config: FieldConfig,
	pub settings: Settings,
	pub viewport: Viewport,
	store: ParticleStore,
	grid: SpatialGrid,
	rng: SmallRng,
	budget: FrameBudget,
	/// Set once the frame budget has forced low-performance mode.
	auto_tripped: bool,
	/// Page visibility; independent of the user pause toggle.
	hidden: bool,
	/// Last pointer position in client space, converted once per frame.
	pointer_raw: Option<(f64, f64)>,
}

impl FieldState {
	pub fn new(config: FieldConfig, settings: Settings, viewport: Viewport, seed: u64) -> Self {
		let grid = SpatialGrid::new(settings.distance);
		let mut state = Self {
			config: config.sanitized(),
			settings,
			viewport,
			store: ParticleStore::new(),
			grid,
			rng: SmallRng::seed_from_u64(seed),
			budget: FrameBudget::new(),
			auto_tripped: false,
			hidden: false,
			pointer_raw: None,
		};
		state.regenerate();
		state
	}

	pub fn store(&self) -> &ParticleStore {
		&self.store
	}

	/// Whether frames currently do work.
	pub fn is_running(&self) -> bool {
		!self.settings.paused && !self.hidden
	}

	/// Rebuild the particle set at the current settings and viewport.
	pub fn regenerate(&mut self) {
		let density = self.viewport.density_factor(self.config.density);
		let count = effective_count(&self.settings, density);
		self.store
			.regenerate(&mut self.rng, count, self.settings.speed, &self.viewport);
		debug!(
			"ink-field: regenerated {} particles (density {:.2}, low-perf {})",
			count, density, self.settings.low_perf
		);
	}

	/// Set the target count, clamped to the accepted range.
	pub fn set_count(&mut self, v: usize) {
		self.settings.count = clamp_count(v);
		self.regenerate();
	}

	/// Set the connection distance. Only the next draw is affected.
	pub fn set_distance(&mut self, v: f64) {
		self.settings.distance = clamp_distance(v);
		self.grid.set_cell_size(self.settings.distance);
		debug!("ink-field: connection distance {}", self.grid.cell_size());
	}

	/// Set the base drift speed, clamped to a positive minimum.
	pub fn set_speed(&mut self, v: f64) {
		self.settings.speed = clamp_speed(v);
		self.regenerate();
	}

	pub fn set_low_perf(&mut self, on: bool) {
		self.settings.low_perf = on;
		self.regenerate();
	}

	/// Flip the user pause. Returns the new paused flag.
	pub fn toggle_pause(&mut self) -> bool {
		self.settings.paused = !self.settings.paused;
		info!(
			"ink-field: {}",
			if self.settings.paused { "paused" } else { "resumed" }
		);
		self.settings.paused
	}

	/// Colors are derived from the theme snapshot every frame, so there is
	/// nothing to refresh.
	pub fn update_colors(&self) {
		debug!("ink-field: theme changed, picked up on next frame");
	}

	/// Page visibility changed.
	pub fn set_hidden(&mut self, hidden: bool) {
		if self.hidden && !hidden {
			self.budget.reset();
		}
		self.hidden = hidden;
	}

	/// New canvas geometry. Regenerates so density matches the new area.
	pub fn resize(&mut self, viewport: Viewport) {
		debug!(
			"ink-field: resize to {}x{} @ {}x",
			viewport.width, viewport.height, viewport.dpr
		);
		self.viewport = viewport;
		self.regenerate();
	}

	/// Store a pointer position in client space.
	pub fn set_pointer(&mut self, client_x: f64, client_y: f64) {
		self.pointer_raw = Some((client_x, client_y));
	}

	pub fn clear_pointer(&mut self) {
		self.pointer_raw = None;
	}

	/// Click feedback: inject a burst at a client-space point.
	pub fn burst(&mut self, client_x: f64, client_y: f64) {
		let (x, y) = self.viewport.to_canvas(client_x, client_y);
		self.store.burst(
			&mut self.rng,
			x,
			y,
			self.config.burst_size,
			self.settings.speed,
		);
	}

	/// Advance physics by one frame: drift, pointer repulsion, boundary.
	pub fn step(&mut self) {
		let pointer = self
			.pointer_raw
			.map(|(x, y)| self.viewport.to_canvas(x, y));
		let (width, height) = (self.viewport.width, self.viewport.height);
		let (boundary, margin) = (self.config.boundary, self.config.margin);
		let radius = self.config.repulse_radius;

		for p in self.store.particles_mut() {
			p.integrate();

			if let Some((px, py)) = pointer {
				let (dx, dy) = (p.x - px, p.y - py);
				let dist = (dx * dx + dy * dy).sqrt();
				if dist > 0.0 && dist < radius {
					let force = (radius - dist) / radius * REPULSE_STRENGTH * (1.0 + p.z);
					p.x += dx / dist * force;
					p.y += dy / dist * force;
				}
			}

			p.confine(boundary, width, height, margin);
		}
	}

	/// Run one animation frame. Returns `None` without touching particles or
	/// the surface while paused or hidden.
	pub fn frame(
		&mut self,
		timestamp_ms: f64,
		theme: ThemeState,
		surface: &mut impl Surface,
	) -> Option<FrameStats> {
		if !self.is_running() {
			return None;
		}

		if self.config.auto_low_perf
			&& !self.auto_tripped
			&& !self.settings.low_perf
			&& self.budget.record(timestamp_ms)
		{
			self.auto_tripped = true;
			info!(
				"ink-field: frames averaging {:.1}ms, switching to low-performance mode",
				self.budget.average_ms()
			);
			self.set_low_perf(true);
		}

		self.step();
		self.grid.build(self.store.particles());

		let palette = Palette::for_theme(theme);
		let glow = !self.settings.low_perf && self.store.len() <= self.config.glow_limit;
		Some(render(
			surface,
			self.store.particles(),
			&self.grid,
			&RenderParams {
				palette: &palette,
				width: self.viewport.width,
				height: self.viewport.height,
				distance: self.settings.distance,
				glow,
			},
		))
	}
}

#[cfg(test)]
mod tests {
	use super::super::config::{Boundary, HARD_CAP};
	use super::super::particles::Particle;
	use super::super::render::testing::Recorder;
	use super::*;

	fn field(config: FieldConfig) -> FieldState {
		let settings = Settings::from_config(&config, false);
		FieldState::new(config, settings, Viewport::new(1366.0, 768.0, 1.0, 1.5), 42)
	}

	fn quiet() -> FieldConfig {
		FieldConfig {
			auto_low_perf: false,
			..FieldConfig::default()
		}
	}

	fn positions(state: &FieldState) -> Vec<(f64, f64)> {
		state.store().particles().iter().map(|p| (p.x, p.y)).collect()
	}

	#[test]
	fn reference_viewport_keeps_requested_count() {
		let mut state = field(quiet());
		state.set_count(90);
		state.set_distance(130.0);
		assert_eq!(state.store().len(), 90);
		assert_eq!(state.grid.cell_size(), 130.0);
	}

	#[test]
	fn set_count_clamps_and_scales() {
		let mut state = field(quiet());
		state.set_count(5);
		assert_eq!(state.store().len(), 20);
		state.set_count(5_000);
		assert_eq!(state.store().len(), HARD_CAP);

		state.set_low_perf(true);
		assert_eq!(state.store().len(), HARD_CAP / 3);

		state.set_low_perf(false);
		state.resize(Viewport::new(683.0, 768.0, 2.0, 1.5));
		state.set_count(90);
		assert_eq!(state.store().len(), 45);
	}

	#[test]
	fn distance_change_keeps_particles() {
		let mut state = field(quiet());
		let before = positions(&state);
		state.set_distance(1.0);
		assert_eq!(state.settings.distance, 20.0);
		assert_eq!(positions(&state), before);
	}

	#[test]
	fn speed_is_clamped_and_regenerates() {
		let mut state = field(quiet());
		let before = positions(&state);
		state.set_speed(-3.0);
		assert_eq!(state.settings.speed, 0.05);
		assert_ne!(positions(&state), before);
	}

	#[test]
	fn edge_appears_just_inside_threshold() {
		for (gap, edges) in [(129.0, 1), (131.0, 0)] {
			let mut state = field(quiet());
			state.set_distance(130.0);
			state
				.store
				.replace(vec![Particle::at(500.0, 400.0, 0.5), Particle::at(500.0 + gap, 400.0, 0.5)]);

			let mut rec = Recorder::default();
			let stats = state.frame(0.0, ThemeState::default(), &mut rec).unwrap();
			assert_eq!(stats.edges, edges, "gap {gap}");
			assert_eq!(rec.lines.len(), edges);
		}
	}

	#[test]
	fn pause_twice_resumes_drawing() {
		let mut state = field(quiet());
		let mut rec = Recorder::default();

		assert!(state.toggle_pause());
		assert!(state.frame(0.0, ThemeState::default(), &mut rec).is_none());
		assert_eq!(rec.clears, 0);

		assert!(!state.toggle_pause());
		assert!(state.is_running());
		assert!(state.frame(16.0, ThemeState::default(), &mut rec).is_some());
		assert_eq!(rec.clears, 1);
	}

	#[test]
	fn hidden_page_freezes_positions() {
		let mut state = field(quiet());
		let mut rec = Recorder::default();
		state.frame(0.0, ThemeState::default(), &mut rec);
		let before = positions(&state);

		state.set_hidden(true);
		for i in 1..100 {
			assert!(state.frame(i as f64 * 16.0, ThemeState::default(), &mut rec).is_none());
		}
		assert_eq!(positions(&state), before);

		state.set_hidden(false);
		state.frame(2_000.0, ThemeState::default(), &mut rec);
		let after = positions(&state);
		assert_eq!(after.len(), before.len());
		assert_ne!(after, before);

		// Resumed from where it stopped, not from a fresh layout.
		let small_moves = before
			.iter()
			.zip(&after)
			.filter(|(a, b)| (a.0 - b.0).abs() < 1.0 && (a.1 - b.1).abs() < 1.0)
			.count();
		assert_eq!(small_moves, before.len());
	}

	#[test]
	fn pointer_pushes_nearby_particles_away() {
		let mut state = field(quiet());
		state.store.replace(vec![Particle::at(600.0, 400.0, 1.0), Particle::at(100.0, 100.0, 1.0)]);
		state.viewport = state.viewport.clone().with_offset(0.0, 50.0);
		state.set_pointer(550.0, 450.0);
		state.step();

		let near = &state.store().particles()[0];
		let expected = (180.0 - 50.0) / 180.0 * REPULSE_STRENGTH * 2.0;
		assert!((near.x - (600.0 + expected)).abs() < 1e-9);
		assert_eq!(near.y, 400.0);
		assert_eq!(state.store().particles()[1].x, 100.0);

		state.clear_pointer();
		state.step();
		assert!((state.store().particles()[0].x - (600.0 + expected)).abs() < 1e-9);
	}

	#[test]
	fn click_burst_lands_at_canvas_point() {
		let mut state = field(quiet());
		state.viewport = state.viewport.clone().with_offset(0.0, 20.0);
		let before = state.store().len();
		state.burst(300.0, 320.0);
		assert_eq!(state.store().len(), before + 12);
		let last = state.store().particles().last().unwrap();
		assert_eq!((last.x, last.y), (300.0, 300.0));
	}

	#[test]
	fn glow_is_dropped_for_dense_fields() {
		let mut state = field(quiet());
		let mut rec = Recorder::default();
		state.set_count(100);
		assert!(state.frame(0.0, ThemeState::default(), &mut rec).unwrap().glow);
		state.set_count(141);
		assert!(!state.frame(16.0, ThemeState::default(), &mut rec).unwrap().glow);
	}

	#[test]
	fn slow_device_switches_to_low_perf() {
		let mut state = field(FieldConfig::default());
		let mut rec = Recorder::default();
		let mut t = 0.0;
		for _ in 0..200 {
			t += 60.0;
			state.frame(t, ThemeState::default(), &mut rec);
		}
		assert!(state.settings.low_perf);
		assert_eq!(state.store().len(), 30);
	}

	#[test]
	fn user_can_leave_auto_low_perf() {
		let mut state = field(FieldConfig::default());
		let mut rec = Recorder::default();
		let mut t = 0.0;
		for _ in 0..200 {
			t += 60.0;
			state.frame(t, ThemeState::default(), &mut rec);
		}
		assert!(state.settings.low_perf);

		state.set_low_perf(false);
		for gap in [1_000.0, 16.0, 60.0, 60.0] {
			t += gap;
			state.frame(t, ThemeState::default(), &mut rec);
		}
		assert!(!state.settings.low_perf);
		assert_eq!(state.store().len(), 90);
	}

	#[test]
	fn negative_margin_on_narrow_viewport_is_safe() {
		let config = FieldConfig {
			boundary: Boundary::Bounce,
			margin: -24.0,
			speed: 3.0,
			..quiet()
		};
		let settings = Settings::from_config(&config, false);
		let mut state = FieldState::new(config, settings, Viewport::new(30.0, 30.0, 1.0, 1.5), 9);
		assert_eq!(state.config.margin, 0.0);
		for _ in 0..500 {
			state.step();
		}
		for p in state.store().particles() {
			assert!((0.0..=30.0).contains(&p.x));
			assert!((0.0..=30.0).contains(&p.y));
		}
	}

	#[test]
	fn oversized_burst_is_capped() {
		let config = FieldConfig {
			burst_size: usize::MAX,
			..quiet()
		};
		let mut state = field(config);
		state.burst(300.0, 300.0);
		assert_eq!(state.store().len(), HARD_CAP);
	}

	#[test]
	fn bounce_policy_keeps_field_in_bounds() {
		let config = FieldConfig {
			boundary: Boundary::Bounce,
			speed: 6.0,
			..quiet()
		};
		let mut state = field(config);
		for _ in 0..2_000 {
			state.step();
		}
		for p in state.store().particles() {
			assert!((-24.0..=1390.0).contains(&p.x));
			assert!((-24.0..=792.0).contains(&p.y));
		}
	}
}
