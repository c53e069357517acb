//! Uniform hash grid for approximate neighbor lookups.
//!
//! Space is divided into cubic cells of `cell_size`; each agent lands in the
//! cell `floor(position / cell_size)` per axis. A query visits the 3^D block of
//! cells around the query point, so it returns a superset of every agent
//! within `cell_size` of that point. Callers filter by exact distance.
//!
//! The grid is built from a position snapshot every tick and dropped
//! afterwards; there is no incremental maintenance.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::vector::{floor, Vector};

/// Integer cell coordinate
pub type CellKey<const D: usize> = [i32; D];

pub struct SpatialGrid<'a, const D: usize> {
    cell_size: f32,
    positions: &'a [Vector<D>],
    cells: HashMap<CellKey<D>, Vec<usize>>,
}

impl<'a, const D: usize> SpatialGrid<'a, D> {
    /// Bucket every position by cell. Indices in query results refer to
    /// `positions`. A non-positive or non-finite cell size falls back to 1.
    pub fn build(positions: &'a [Vector<D>], cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };

        let mut cells: HashMap<CellKey<D>, Vec<usize>> = HashMap::new();
        for (index, position) in positions.iter().enumerate() {
            cells
                .entry(cell_key(position, cell_size))
                .or_default()
                .push(index);
        }

        log::trace!(
            "spatial grid: {} agents in {} cells (cell size {})",
            positions.len(),
            cells.len(),
            cell_size
        );

        Self {
            cell_size,
            positions,
            cells,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn cell_of(&self, position: &Vector<D>) -> CellKey<D> {
        cell_key(position, self.cell_size)
    }

    /// All indices in the cells surrounding `position`
    pub fn query_candidates(&self, position: &Vector<D>) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect_candidates(position, None, &mut out);
        out
    }

    /// Candidates around the agent at `index`, excluding the agent itself
    pub fn candidates_of(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        if let Some(position) = self.positions.get(index) {
            self.collect_candidates(position, Some(index), &mut out);
        }
        out
    }

    /// Exact neighbors of the agent at `index`: candidates strictly closer
    /// than `radius`. Reuses `out` to avoid per-agent allocations.
    pub fn neighbors_within(&self, index: usize, radius: f32, out: &mut Vec<usize>) {
        out.clear();
        let Some(position) = self.positions.get(index) else {
            return;
        };
        if radius <= 0.0 {
            return;
        }
        self.collect_candidates(position, Some(index), out);

        let radius_sq = radius * radius;
        let positions = self.positions;
        out.retain(|&other| position.distance_squared(&positions[other]) < radius_sq);
    }

    fn collect_candidates(&self, position: &Vector<D>, exclude: Option<usize>, out: &mut Vec<usize>) {
        let center = self.cell_of(position);
        let block = 3usize.pow(D as u32);

        for code in 0..block {
            let mut key = center;
            let mut rest = code;
            for axis in key.iter_mut() {
                let offset = (rest % 3) as i32 - 1;
                rest /= 3;
                *axis = axis.saturating_add(offset);
            }

            if let Some(bucket) = self.cells.get(&key) {
                out.extend(bucket.iter().copied().filter(|&i| Some(i) != exclude));
            }
        }
    }
}

fn cell_key<const D: usize>(position: &Vector<D>, cell_size: f32) -> CellKey<D> {
    // `as` saturates, so far-away or NaN coordinates still map to a valid key
    position.components.map(|c| floor(c / cell_size) as i32)
}
