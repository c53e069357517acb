//! Greedy nearest-point target assignment.
//!
//! This is a local heuristic, not an optimal matching: each agent in turn
//! takes the closest point still available, so total travel distance is not
//! minimized. It costs O(agents x points) per call, which stays cheap for a
//! few hundred agents. An optimal solver (e.g. Hungarian) would change which
//! agent ends up on which point, so it is deliberately not used here.
//!
//! Processing order: agents farthest from the centroid of the target list go
//! first, ties broken by population order. When the pool of available points
//! runs dry while agents remain, it is refilled with the full list; points
//! handed out from a refilled pool are duplicates and get a small random
//! offset so co-targeted agents spread around the shared point.

use alloc::vec::Vec;

use rand::Rng;

use crate::vector::Vector;

/// Per-axis half-width of the offset applied to duplicated points
pub const DUPLICATE_JITTER: f32 = 10.0;

/// Target chosen for one agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment<const D: usize> {
    /// Index into the original point list the target was derived from
    pub point_index: usize,
    /// Final target coordinate, jittered when the point was a duplicate
    pub target: Vector<D>,
}

impl<const D: usize> Assignment<D> {
    pub fn is_jittered(&self, points: &[Vector<D>]) -> bool {
        points
            .get(self.point_index)
            .map_or(true, |p| *p != self.target)
    }
}

/// Assign every agent (given by position) a target from `points`.
///
/// The result is parallel to `agents`. With an empty point list every entry
/// is `None`; otherwise every agent receives a target.
pub fn assign_targets<const D: usize, R: Rng + ?Sized>(
    agents: &[Vector<D>],
    points: &[Vector<D>],
    rng: &mut R,
) -> Vec<Option<Assignment<D>>> {
    let mut result = alloc::vec![None; agents.len()];
    if agents.is_empty() || points.is_empty() {
        return result;
    }

    let mut queue = processing_order(agents, points);
    queue.reverse(); // pop from the back

    let mut available: Vec<usize> = (0..points.len()).collect();
    let mut refilled = false;

    while !available.is_empty() {
        let Some(agent) = queue.pop() else {
            break;
        };
        let position = agents[agent];

        let mut best_slot = 0;
        let mut best_distance = position.distance_squared(&points[available[0]]);
        for (slot, &point) in available.iter().enumerate().skip(1) {
            let d = position.distance_squared(&points[point]);
            if d < best_distance {
                best_distance = d;
                best_slot = slot;
            }
        }

        // keep pool order stable so ties keep resolving to the earliest point
        let point_index = available.remove(best_slot);
        let target = if refilled {
            jitter(points[point_index], rng)
        } else {
            points[point_index]
        };
        result[agent] = Some(Assignment {
            point_index,
            target,
        });

        if available.is_empty() && !queue.is_empty() {
            available.extend(0..points.len());
            refilled = true;
        }
    }

    // Anything still queued gets a random point near the shape
    for agent in queue {
        let point_index = rng.gen_range(0..points.len());
        result[agent] = Some(Assignment {
            point_index,
            target: jitter(points[point_index], rng),
        });
    }

    result
}

fn processing_order<const D: usize>(agents: &[Vector<D>], points: &[Vector<D>]) -> Vec<usize> {
    let centroid = points.iter().copied().sum::<Vector<D>>() / points.len() as f32;
    let spread: Vec<f32> = agents
        .iter()
        .map(|a| a.distance_squared(&centroid))
        .collect();

    let mut order: Vec<usize> = (0..agents.len()).collect();
    // stable sort: equal distances keep population order
    order.sort_by(|&a, &b| spread[b].total_cmp(&spread[a]));
    order
}

fn jitter<const D: usize, R: Rng + ?Sized>(point: Vector<D>, rng: &mut R) -> Vector<D> {
    point + Vector::random_within(rng, &Vector::splat(DUPLICATE_JITTER))
}
