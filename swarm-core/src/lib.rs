//! Self-organizing swarm engine.
//!
//! A population of point-agents flocks (separation, alignment, cohesion) and
//! seeks individually assigned target points to approximate arbitrary shapes.
//! Neighbor lookups go through a spatial hash grid rebuilt every tick. The
//! engine is generic over dimension: `Swarm<2>` and `Swarm<3>` share all code.
//!
//! ```
//! use rand::{rngs::SmallRng, SeedableRng};
//! use swarm_core::{Swarm, Vector3};
//!
//! let mut swarm: Swarm<3> = Swarm::with_rng(Vector3::new(250.0, 200.0, 200.0), SmallRng::seed_from_u64(1));
//! swarm.initialize(100);
//! swarm.set_target_points(vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(40.0, 0.0, 0.0)]);
//! for _ in 0..10 {
//!     swarm.update();
//! }
//! assert_eq!(swarm.len(), 100);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod agent;
pub mod assign;
mod error;
pub mod spatial;
pub mod swarm;
pub mod vector;
pub mod wire;

pub use agent::{Agent, AgentConfig, AgentId, Kinematics};
pub use assign::{assign_targets, Assignment};
pub use error::Error;
pub use spatial::SpatialGrid;
pub use swarm::{Swarm, SwarmEvent, SwarmParams, SwarmStatus};
pub use swarm_shared::BehaviorMode;
pub use vector::{Vector, Vector2, Vector3};
pub use wire::{cloud_from_points, points_from_cloud};
