#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Behavior mode of the swarm coordinator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BehaviorMode {
    /// Free flocking, no goal seeking
    #[default]
    Idle,
    /// Agents seek their assigned target points
    Forming,
    /// Agents push apart after a formation is released
    Dispersing,
}

impl BehaviorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorMode::Idle => "idle",
            BehaviorMode::Forming => "forming",
            BehaviorMode::Dispersing => "dispersing",
        }
    }
}

impl fmt::Display for BehaviorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunable swarm parameters. Missing fields fall back to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmSettings {
    pub cohesion_strength: f32,
    pub separation_strength: f32,
    pub alignment_strength: f32,
    pub seek_strength: f32,
    pub speed_multiplier: f32,
    pub perception_radius: f32,
}

impl Default for SwarmSettings {
    fn default() -> Self {
        Self {
            cohesion_strength: 1.0,
            separation_strength: 1.5,
            alignment_strength: 1.0,
            seek_strength: 2.0,
            speed_multiplier: 1.0,
            perception_radius: 50.0,
        }
    }
}

/// Settings update message sent by a controlling UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub settings: SwarmSettings,
}

/// An ordered list of target coordinates, as produced by shape and text generators.
///
/// Every point is expected to carry exactly `dimensions` components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    pub dimensions: usize,
    pub points: Vec<Vec<f32>>,
}

impl PointCloud {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            points: Vec::new(),
        }
    }

    pub fn push(&mut self, point: Vec<f32>) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the first point whose component count differs from `dimensions`
    pub fn first_malformed(&self) -> Option<usize> {
        self.points
            .iter()
            .position(|point| point.len() != self.dimensions)
    }

    #[cfg(feature = "std")]
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Replace the swarm's current target list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetPointsUpdate {
    pub points: PointCloud,
}

/// Requests a driver can forward to the swarm between ticks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Initialize { count: usize },
    Reinitialize,
    SetTargets { points: PointCloud },
    Disperse,
    Idle,
    TogglePause,
    UpdateSettings { settings: SwarmSettings },
}

/// Read-only view of a single agent, for renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub id: u32,
    pub position: Vec<f32>,
    pub velocity: Vec<f32>,
    pub facing: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Vec<f32>>,
    pub in_formation: bool,
    pub glow: f32,
}

/// Aggregate swarm status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub agent_count: usize,
    pub mode: BehaviorMode,
    /// Percentage of targeted agents that reached their target (0-100)
    pub progress: f32,
    pub formation_complete: bool,
    pub paused: bool,
    pub tick: u64,
}

/// Full per-tick snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub status: StatusResponse,
    pub agents: Vec<AgentState>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_settings_defaults_fill_missing_fields() {
        let settings: SwarmSettings =
            serde_json::from_str(r#"{ "seek_strength": 4.0 }"#).unwrap();
        assert_eq!(settings.seek_strength, 4.0);
        assert_eq!(settings.separation_strength, 1.5);
        assert_eq!(settings.perception_radius, 50.0);
    }

    #[test]
    fn test_behavior_mode_json_is_lowercase() {
        let json = serde_json::to_string(&BehaviorMode::Dispersing).unwrap();
        assert_eq!(json, "\"dispersing\"");
        assert_eq!(BehaviorMode::Forming.to_string(), "forming");
    }

    #[test]
    fn test_command_tagged_json() {
        let cmd: Command = serde_json::from_str(r#"{ "command": "initialize", "count": 300 }"#)
            .unwrap();
        assert_eq!(cmd, Command::Initialize { count: 300 });

        let cmd: Command = serde_json::from_str(r#"{ "command": "toggle_pause" }"#).unwrap();
        assert_eq!(cmd, Command::TogglePause);
    }

    #[test]
    fn test_point_cloud_malformed_detection() {
        let mut cloud = PointCloud::new(3);
        cloud.push(vec![0.0, 1.0, 2.0]);
        cloud.push(vec![0.0, 1.0]);
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.first_malformed(), Some(1));
    }

    #[test]
    fn test_point_cloud_from_json() {
        let cloud =
            PointCloud::from_json_str(r#"{ "dimensions": 2, "points": [[1.0, 2.0], [3.0, 4.0]] }"#)
                .unwrap();
        assert_eq!(cloud.dimensions, 2);
        assert_eq!(cloud.points[1], vec![3.0, 4.0]);
        assert_eq!(cloud.first_malformed(), None);
    }
}
