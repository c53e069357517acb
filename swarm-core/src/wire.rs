//! Conversions between engine types and the serializable types in `swarm_shared`.

use alloc::vec::Vec;

use rand::Rng;
use swarm_shared::{AgentState, Command, PointCloud, SnapshotResponse, StatusResponse};

use crate::agent::Agent;
use crate::swarm::{Swarm, SwarmStatus};
use crate::vector::Vector;
use crate::Error;

/// Convert a generator's point cloud into engine vectors.
///
/// Fails on the first point with the wrong dimensionality or a non-finite
/// component; nothing is returned partially.
pub fn points_from_cloud<const D: usize>(cloud: &PointCloud) -> Result<Vec<Vector<D>>, Error> {
    if cloud.dimensions != D && !cloud.is_empty() {
        return Err(Error::DimensionMismatch {
            expected: D,
            found: cloud.dimensions,
            index: 0,
        });
    }
    cloud
        .points
        .iter()
        .enumerate()
        .map(|(index, point)| Vector::try_from_slice(point, index))
        .collect()
}

pub fn cloud_from_points<const D: usize>(points: &[Vector<D>]) -> PointCloud {
    PointCloud {
        dimensions: D,
        points: points.iter().map(|p| p.components.to_vec()).collect(),
    }
}

impl From<SwarmStatus> for StatusResponse {
    fn from(status: SwarmStatus) -> Self {
        Self {
            agent_count: status.agent_count,
            mode: status.mode,
            progress: status.progress,
            formation_complete: status.formation_complete,
            paused: status.paused,
            tick: status.tick,
        }
    }
}

impl<const D: usize> From<&Agent<D>> for AgentState {
    fn from(agent: &Agent<D>) -> Self {
        Self {
            id: agent.id().0,
            position: agent.position.components.to_vec(),
            velocity: agent.velocity.components.to_vec(),
            facing: agent.facing().components.to_vec(),
            target: agent.target().map(|t| t.components.to_vec()),
            in_formation: agent.in_formation(),
            glow: agent.glow_intensity(),
        }
    }
}

impl<const D: usize, R: Rng> Swarm<D, R> {
    /// Read-only view of the whole swarm for renderers
    pub fn snapshot(&self) -> SnapshotResponse {
        SnapshotResponse {
            status: self.status().into(),
            agents: self.agents().iter().map(AgentState::from).collect(),
        }
    }

    /// Apply a driver request between ticks
    pub fn execute(&mut self, command: Command) -> Result<(), Error> {
        match command {
            Command::Initialize { count } => self.initialize(count),
            Command::Reinitialize => self.reinitialize(),
            Command::SetTargets { points } => {
                let points = points_from_cloud::<D>(&points)?;
                self.set_target_points(points);
            }
            Command::Disperse => self.disperse(),
            Command::Idle => self.idle(),
            Command::TogglePause => {
                self.toggle_pause();
            }
            Command::UpdateSettings { settings } => self.apply_settings(settings),
        }
        Ok(())
    }
}
