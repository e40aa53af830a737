//! Particle entities and the store that owns them.

use std::f64::consts::TAU;

use rand::Rng;

use super::config::{Boundary, COUNT_MIN, HARD_CAP, Settings};
use super::viewport::Viewport;

/// Per-frame decay applied to burst impulse.
const KICK_DECAY: f64 = 0.9;
/// Impulse below this is snapped to zero.
const KICK_EPSILON: f64 = 1e-3;
/// Share of particles drawn with the primary ink.
const PRIMARY_SHARE: f64 = 0.6;

/// Which of the two theme colors a particle is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hue {
	/// Cyan in the dark theme, blue in the light one.
	Primary,
	/// Magenta in the dark theme, crimson in the light one.
	Accent,
}

/// A single drifting particle.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
	pub x: f64,
	pub y: f64,
	/// Cruise velocity, fixed at creation.
	pub vx: f64,
	pub vy: f64,
	/// Burst impulse, decays towards zero.
	pub kx: f64,
	pub ky: f64,
	pub size: f64,
	/// Depth factor in [0, 1]; deeper particles are smaller and slower.
	pub z: f64,
	pub hue: Hue,
	pub life: u32,
	pub max_life: u32,
}

impl Particle {
	/// A resting particle at a point. Mostly useful for placing particles by hand.
	pub fn at(x: f64, y: f64, z: f64) -> Self {
		Self {
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			kx: 0.0,
			ky: 0.0,
			size: size_for_depth(z),
			z,
			hue: Hue::Primary,
			life: 0,
			max_life: 200,
		}
	}

	fn random<R: Rng>(rng: &mut R, x: f64, y: f64, speed: f64) -> Self {
		let z: f64 = rng.random();
		let angle = rng.random::<f64>() * TAU;
		let cruise = (0.6 + z) * speed;
		let max_life = rng.random_range(140..340);
		Self {
			x,
			y,
			vx: angle.cos() * cruise,
			vy: angle.sin() * cruise,
			kx: 0.0,
			ky: 0.0,
			size: size_for_depth(z),
			z,
			hue: if rng.random::<f64>() < PRIMARY_SHARE {
				Hue::Primary
			} else {
				Hue::Accent
			},
			life: rng.random_range(0..max_life),
			max_life,
		}
	}

	/// Advance by one frame of drift.
	pub fn integrate(&mut self) {
		self.x += self.vx + self.kx;
		self.y += self.vy + self.ky;

		self.kx *= KICK_DECAY;
		self.ky *= KICK_DECAY;
		if self.kx.abs() < KICK_EPSILON {
			self.kx = 0.0;
		}
		if self.ky.abs() < KICK_EPSILON {
			self.ky = 0.0;
		}

		self.life = (self.life + 1) % self.max_life.max(1);
	}

	/// Keep the particle inside `[-margin, dim + margin]` on both axes.
	pub fn confine(&mut self, boundary: Boundary, width: f64, height: f64, margin: f64) {
		match boundary {
			Boundary::Wrap => {
				self.x = wrap(self.x, width, margin);
				self.y = wrap(self.y, height, margin);
			}
			Boundary::Bounce => {
				if self.x < -margin || self.x > width + margin {
					self.vx = -self.vx;
					self.kx = -self.kx;
					self.x = self.x.clamp(-margin, width + margin);
				}
				if self.y < -margin || self.y > height + margin {
					self.vy = -self.vy;
					self.ky = -self.ky;
					self.y = self.y.clamp(-margin, height + margin);
				}
			}
		}
	}

	/// Shimmer envelope in [0, 1]: fades in over the first 18% of the life
	/// cycle and out over the last 18%.
	pub fn shimmer(&self) -> f64 {
		let t = self.life as f64 / self.max_life.max(1) as f64;
		if t < 0.18 {
			t / 0.18
		} else if t > 0.82 {
			(1.0 - t) / 0.18
		} else {
			1.0
		}
	}
}

fn size_for_depth(z: f64) -> f64 {
	0.6 + z * 1.9
}

fn wrap(v: f64, dim: f64, margin: f64) -> f64 {
	if v < -margin {
		dim + margin
	} else if v > dim + margin {
		-margin
	} else {
		v
	}
}

/// Number of particles a regeneration produces for these settings.
pub fn effective_count(settings: &Settings, density: f64) -> usize {
	let base = if settings.low_perf {
		(settings.count / 3).max(COUNT_MIN)
	} else {
		settings.count
	};
	((base as f64 * density).floor() as usize).clamp(1, HARD_CAP)
}

/// Owns the live particle set.
#[derive(Debug, Default)]
pub struct ParticleStore {
	particles: Vec<Particle>,
}

impl ParticleStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	pub fn particles_mut(&mut self) -> &mut [Particle] {
		&mut self.particles
	}

	pub fn len(&self) -> usize {
		self.particles.len()
	}

	pub fn is_empty(&self) -> bool {
		self.particles.is_empty()
	}

	/// Replace the whole set.
	pub fn replace(&mut self, particles: Vec<Particle>) {
		self.particles = particles;
	}

	/// Replace the whole set with `count` fresh particles spread over the viewport.
	pub fn regenerate<R: Rng>(&mut self, rng: &mut R, count: usize, speed: f64, viewport: &Viewport) {
		let particles = (0..count)
			.map(|_| {
				let x = rng.random::<f64>() * viewport.width;
				let y = rng.random::<f64>() * viewport.height;
				Particle::random(rng, x, y, speed)
			})
			.collect();
		self.replace(particles);
	}

	/// Append `n` particles at a point with an outward kick, then evict the
	/// oldest particles until the store is back under the hard cap.
	pub fn burst<R: Rng>(&mut self, rng: &mut R, x: f64, y: f64, n: usize, speed: f64) {
		// Anything past the cap would be trimmed straight away.
		let n = n.min(HARD_CAP);
		self.particles.reserve(n);
		for i in 0..n {
			let mut p = Particle::random(rng, x, y, speed);
			let angle = TAU * i as f64 / n as f64 + rng.random::<f64>() * 0.5;
			let kick = rng.random::<f64>() * 3.0 + 1.5;
			p.kx = angle.cos() * kick;
			p.ky = angle.sin() * kick;
			p.life = 0;
			self.particles.push(p);
		}

		if self.particles.len() > HARD_CAP {
			let excess = self.particles.len() - HARD_CAP;
			self.particles.drain(..excess);
		}
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;

	fn viewport() -> Viewport {
		Viewport::new(1366.0, 768.0, 1.0, 1.5)
	}

	fn settings(count: usize, low_perf: bool) -> Settings {
		Settings {
			count,
			distance: 130.0,
			speed: 0.35,
			low_perf,
			paused: false,
		}
	}

	#[test]
	fn effective_count_applies_low_perf_and_density() {
		assert_eq!(effective_count(&settings(90, false), 1.0), 90);
		assert_eq!(effective_count(&settings(90, true), 1.0), 30);
		// Low-perf never goes below the minimum.
		assert_eq!(effective_count(&settings(30, true), 1.0), COUNT_MIN);
		assert_eq!(effective_count(&settings(90, false), 0.5), 45);
		assert_eq!(effective_count(&settings(1000, false), 1.6), HARD_CAP);
	}

	#[test]
	fn regenerate_fills_viewport_with_derived_particles() {
		let mut rng = SmallRng::seed_from_u64(7);
		let mut store = ParticleStore::new();
		let vp = viewport();
		store.regenerate(&mut rng, 200, 0.5, &vp);

		assert_eq!(store.len(), 200);
		for p in store.particles() {
			assert!((0.0..=vp.width).contains(&p.x));
			assert!((0.0..=vp.height).contains(&p.y));
			assert!((0.0..=1.0).contains(&p.z));
			assert!((p.size - size_for_depth(p.z)).abs() < 1e-12);
			let speed = (p.vx * p.vx + p.vy * p.vy).sqrt();
			assert!((speed - (0.6 + p.z) * 0.5).abs() < 1e-9);
			assert!(p.life < p.max_life);
		}
	}

	#[test]
	fn burst_at_cap_evicts_oldest_first() {
		let mut rng = SmallRng::seed_from_u64(11);
		let mut store = ParticleStore::new();
		store.regenerate(&mut rng, HARD_CAP, 0.35, &viewport());
		let survivors = store.particles()[12..].to_vec();

		store.burst(&mut rng, 400.0, 300.0, 12, 0.35);

		assert_eq!(store.len(), HARD_CAP);
		assert_eq!(&store.particles()[..HARD_CAP - 12], survivors.as_slice());
		for p in &store.particles()[HARD_CAP - 12..] {
			assert_eq!((p.x, p.y), (400.0, 300.0));
			let kick = (p.kx * p.kx + p.ky * p.ky).sqrt();
			assert!((1.5..=4.5).contains(&kick));
		}
	}

	#[test]
	fn burst_below_cap_only_appends() {
		let mut rng = SmallRng::seed_from_u64(3);
		let mut store = ParticleStore::new();
		store.regenerate(&mut rng, 50, 0.35, &viewport());
		store.burst(&mut rng, 10.0, 10.0, 12, 0.35);
		assert_eq!(store.len(), 62);
	}

	#[test]
	fn kick_decays_to_cruise() {
		let mut p = Particle::at(0.0, 0.0, 0.5);
		p.kx = 4.0;
		p.ky = -4.0;
		for _ in 0..200 {
			p.integrate();
		}
		assert_eq!((p.kx, p.ky), (0.0, 0.0));
	}

	#[test]
	fn fixed_velocity_never_leaves_extended_bounds() {
		for boundary in [Boundary::Wrap, Boundary::Bounce] {
			let mut p = Particle::at(50.0, 50.0, 0.3);
			p.vx = 7.3;
			p.vy = -3.1;
			for _ in 0..10_000 {
				p.integrate();
				p.confine(boundary, 300.0, 200.0, 24.0);
				assert!(p.x.is_finite() && p.y.is_finite());
				assert!((-24.0..=324.0).contains(&p.x), "{boundary:?} x = {}", p.x);
				assert!((-24.0..=224.0).contains(&p.y), "{boundary:?} y = {}", p.y);
			}
		}
	}

	#[test]
	fn wrap_moves_to_opposite_edge() {
		let mut p = Particle::at(325.0, -25.0, 0.0);
		p.confine(Boundary::Wrap, 300.0, 200.0, 24.0);
		assert_eq!((p.x, p.y), (-24.0, 224.0));
	}

	#[test]
	fn shimmer_envelope() {
		let mut p = Particle::at(0.0, 0.0, 0.0);
		p.max_life = 100;
		p.life = 0;
		assert_eq!(p.shimmer(), 0.0);
		p.life = 9;
		assert!((p.shimmer() - 0.5).abs() < 1e-9);
		p.life = 50;
		assert_eq!(p.shimmer(), 1.0);
		p.life = 91;
		assert!((p.shimmer() - 0.5).abs() < 1e-9);
	}
}
