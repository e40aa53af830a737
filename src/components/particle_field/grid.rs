//! Uniform grid for connection queries.
//!
//! The cell size equals the connection distance, so two particles closer than
//! that distance always share a cell or sit in adjacent cells. A 3x3 block of
//! buckets is therefore a superset of every particle in range; the exact
//! distance check happens in [`SpatialGrid::for_each_pair_within`].

use std::collections::HashMap;

use super::particles::Particle;

/// Particle indices bucketed by cell.
#[derive(Debug)]
pub struct SpatialGrid {
	cell_size: f64,
	cells: HashMap<(i32, i32), Vec<usize>>,
}

impl SpatialGrid {
	pub fn new(cell_size: f64) -> Self {
		Self {
			cell_size,
			cells: HashMap::new(),
		}
	}

	pub fn cell_size(&self) -> f64 {
		self.cell_size
	}

	/// Change the cell size. Buckets are emptied; call [`build`](Self::build)
	/// before the next query.
	pub fn set_cell_size(&mut self, cell_size: f64) {
		self.cell_size = cell_size;
		self.cells.clear();
	}

	fn cell_key(&self, x: f64, y: f64) -> (i32, i32) {
		(
			(x / self.cell_size).floor() as i32,
			(y / self.cell_size).floor() as i32,
		)
	}

	/// Rebuild from current positions. Bucket allocations are kept, contents
	/// are not.
	pub fn build(&mut self, particles: &[Particle]) {
		for bucket in self.cells.values_mut() {
			bucket.clear();
		}
		for (i, p) in particles.iter().enumerate() {
			let key = self.cell_key(p.x, p.y);
			self.cells.entry(key).or_default().push(i);
		}
		// Drop buckets that stayed empty so the map tracks the live field.
		self.cells.retain(|_, bucket| !bucket.is_empty());
	}

	/// Indices in the cell containing the point and its eight neighbors.
	pub fn neighbors(&self, x: f64, y: f64) -> impl Iterator<Item = usize> + '_ {
		let (cx, cy) = self.cell_key(x, y);
		(-1..=1)
			.flat_map(move |dx| (-1..=1).map(move |dy| (cx.saturating_add(dx), cy.saturating_add(dy))))
			.filter_map(|key| self.cells.get(&key))
			.flatten()
			.copied()
	}

	/// Visit every pair `(i, j, distance)` with `i < j` and
	/// `distance < threshold`. Each pair is reported once.
	pub fn for_each_pair_within<F>(&self, particles: &[Particle], threshold: f64, mut f: F)
	where
		F: FnMut(usize, usize, f64),
	{
		let threshold_sq = threshold * threshold;
		for (i, a) in particles.iter().enumerate() {
			for j in self.neighbors(a.x, a.y) {
				if j <= i {
					continue;
				}
				let b = &particles[j];
				let (dx, dy) = (b.x - a.x, b.y - a.y);
				let dist_sq = dx * dx + dy * dy;
				if dist_sq < threshold_sq {
					f(i, j, dist_sq.sqrt());
				}
			}
		}
	}

	/// Number of indexed particles.
	#[cfg(test)]
	fn len(&self) -> usize {
		self.cells.values().map(Vec::len).sum()
	}
}
