use alloc::vec::Vec;

use rand::rngs::SmallRng;
use rand::Rng;
#[cfg(feature = "std")]
use rand::SeedableRng;

use swarm_shared::{BehaviorMode, SwarmSettings};

use crate::agent::{Agent, AgentConfig, AgentId, Kinematics};
use crate::assign::{assign_targets, Assignment};
use crate::spatial::SpatialGrid;
use crate::vector::Vector;

/// Distance under which a targeted agent counts as having arrived
pub const FORMATION_COMPLETE_DISTANCE: f32 = 30.0;
/// Distance at which flocking rules regain full strength while forming
pub const SWARM_INTENSITY_DISTANCE: f32 = 100.0;
/// Magnitude of the one-off impulse applied by [`Swarm::disperse`]
pub const DISPERSE_IMPULSE: f32 = 2.0;
/// Fraction of the bounds used when spawning agents
pub const SPAWN_FILL: f32 = 0.9;

/// Tunable coordinator parameters. Changes take effect on the next tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwarmParams {
    pub cohesion_strength: f32,
    pub separation_strength: f32,
    pub alignment_strength: f32,
    pub seek_strength: f32,
    pub speed_multiplier: f32,
    pub perception_radius: f32,
}

impl Default for SwarmParams {
    fn default() -> Self {
        SwarmSettings::default().into()
    }
}

impl From<SwarmSettings> for SwarmParams {
    fn from(s: SwarmSettings) -> Self {
        Self {
            cohesion_strength: s.cohesion_strength,
            separation_strength: s.separation_strength,
            alignment_strength: s.alignment_strength,
            seek_strength: s.seek_strength,
            speed_multiplier: s.speed_multiplier,
            perception_radius: s.perception_radius,
        }
    }
}

impl From<SwarmParams> for SwarmSettings {
    fn from(p: SwarmParams) -> Self {
        Self {
            cohesion_strength: p.cohesion_strength,
            separation_strength: p.separation_strength,
            alignment_strength: p.alignment_strength,
            seek_strength: p.seek_strength,
            speed_multiplier: p.speed_multiplier,
            perception_radius: p.perception_radius,
        }
    }
}

/// Lifecycle notifications for renderers, drained with [`Swarm::drain_events`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwarmEvent {
    Spawned(AgentId),
    Despawned(AgentId),
    ModeChanged {
        from: BehaviorMode,
        to: BehaviorMode,
    },
    /// Emitted once per forming cycle, on the tick every targeted agent arrived
    FormationCompleted,
}

/// Aggregate state exposed to the UI each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwarmStatus {
    pub agent_count: usize,
    pub mode: BehaviorMode,
    pub progress: f32,
    pub formation_complete: bool,
    pub paused: bool,
    pub tick: u64,
}

/// Owns the agent population and drives the per-tick pipeline.
///
/// Generic over the dimension `D` (2 or 3) and the random source `R`, which
/// is the only source of randomness in the simulation. Seed it for
/// reproducible runs.
pub struct Swarm<const D: usize, R: Rng = SmallRng> {
    agents: Vec<Agent<D>>,
    targets: Vec<Vector<D>>,
    assignment: Vec<Option<usize>>,
    mode: BehaviorMode,
    params: SwarmParams,
    agent_config: AgentConfig,
    bounds: Vector<D>,
    paused: bool,
    rng: R,
    next_id: u32,
    tick: u64,
    completion_reported: bool,
    events: Vec<SwarmEvent>,
    // per-tick scratch, kept to avoid reallocating every frame
    snapshot: Vec<Kinematics<D>>,
    positions: Vec<Vector<D>>,
    neighbor_indices: Vec<usize>,
    neighbor_states: Vec<Kinematics<D>>,
}

#[cfg(feature = "std")]
impl<const D: usize> Swarm<D, SmallRng> {
    /// Empty swarm seeded from OS entropy
    pub fn new(bounds: Vector<D>) -> Self {
        Self::with_rng(bounds, SmallRng::from_entropy())
    }
}

impl<const D: usize, R: Rng> Swarm<D, R> {
    /// Empty swarm in `Idle` mode. `bounds` holds per-axis half-extents.
    pub fn with_rng(bounds: Vector<D>, rng: R) -> Self {
        Self {
            agents: Vec::new(),
            targets: Vec::new(),
            assignment: Vec::new(),
            mode: BehaviorMode::Idle,
            params: SwarmParams::default(),
            agent_config: AgentConfig::default(),
            bounds,
            paused: false,
            rng,
            next_id: 0,
            tick: 0,
            completion_reported: false,
            events: Vec::new(),
            snapshot: Vec::new(),
            positions: Vec::new(),
            neighbor_indices: Vec::new(),
            neighbor_states: Vec::new(),
        }
    }

    /// Motion limits used for agents created from now on
    pub fn with_agent_config(mut self, config: AgentConfig) -> Self {
        self.agent_config = config;
        self
    }

    pub fn with_params(mut self, params: SwarmParams) -> Self {
        self.params = params;
        self
    }

    /// Replace the population with `count` agents spread uniformly inside the bounds
    pub fn initialize(&mut self, count: usize) {
        let extent = self.bounds * SPAWN_FILL;
        let config = self.agent_config;
        let mut agents = Vec::with_capacity(count);
        for _ in 0..count {
            let id = self.issue_id();
            let position = Vector::random_within(&mut self.rng, &extent);
            agents.push(Agent::random(id, position, config, &mut self.rng));
        }
        self.replace_population(agents);
        log::debug!("swarm initialized with {} agents", count);
    }

    /// Re-create the population keeping its current size
    pub fn reinitialize(&mut self) {
        self.initialize(self.agents.len());
    }

    /// Replace the population with agents at the given positions and velocities
    pub fn spawn_at(&mut self, states: &[Kinematics<D>]) {
        let config = self.agent_config;
        let agents = states
            .iter()
            .map(|s| {
                let id = self.issue_id();
                Agent::new(id, s.position, s.velocity, config)
            })
            .collect();
        self.replace_population(agents);
    }

    fn issue_id(&mut self) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    fn replace_population(&mut self, agents: Vec<Agent<D>>) {
        for old in &self.agents {
            self.events.push(SwarmEvent::Despawned(old.id()));
        }
        for new in &agents {
            self.events.push(SwarmEvent::Spawned(new.id()));
        }
        self.agents = agents;
        self.assignment = alloc::vec![None; self.agents.len()];
        self.set_mode(BehaviorMode::Idle);
    }

    fn set_mode(&mut self, mode: BehaviorMode) {
        if self.mode != mode {
            log::debug!("swarm mode {} -> {}", self.mode, mode);
            self.events.push(SwarmEvent::ModeChanged {
                from: self.mode,
                to: mode,
            });
            self.mode = mode;
        }
    }

    /// Enter `Forming` and assign every agent a target from `points`.
    ///
    /// The full assignment is computed before any agent is touched, so the
    /// next [`update`](Self::update) sees either the old targets or the new
    /// ones, never a mix.
    pub fn set_target_points(&mut self, points: Vec<Vector<D>>) {
        let positions: Vec<Vector<D>> = self.agents.iter().map(|a| a.position).collect();
        let assignments = assign_targets(&positions, &points, &mut self.rng);

        let mut duplicated = 0;
        for ((agent, slot), assigned) in self
            .agents
            .iter_mut()
            .zip(self.assignment.iter_mut())
            .zip(assignments)
        {
            match assigned {
                Some(Assignment {
                    point_index,
                    target,
                }) => {
                    if points[point_index] != target {
                        duplicated += 1;
                    }
                    agent.set_target(target);
                    *slot = Some(point_index);
                }
                None => {
                    agent.clear_target();
                    *slot = None;
                }
            }
        }

        log::debug!(
            "assigned {} points to {} agents ({} duplicated)",
            points.len(),
            self.agents.len(),
            duplicated
        );

        self.targets = points;
        self.completion_reported = false;
        self.set_mode(BehaviorMode::Forming);
    }

    /// Release the formation: clear targets and kick every agent in a random direction
    pub fn disperse(&mut self) {
        self.set_mode(BehaviorMode::Dispersing);
        for (agent, slot) in self.agents.iter_mut().zip(self.assignment.iter_mut()) {
            agent.clear_target();
            *slot = None;
        }
        for agent in self.agents.iter_mut() {
            let impulse = Vector::random_unit(&mut self.rng) * DISPERSE_IMPULSE;
            agent.apply_force(impulse);
        }
    }

    /// Return to free flocking without targets
    pub fn idle(&mut self) {
        self.set_mode(BehaviorMode::Idle);
        for (agent, slot) in self.agents.iter_mut().zip(self.assignment.iter_mut()) {
            agent.clear_target();
            *slot = None;
        }
    }

    /// Flip the pause flag and return the new value
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        log::debug!("swarm {}", if self.paused { "paused" } else { "resumed" });
        self.paused
    }

    /// Advance the simulation by one tick. No-op while paused.
    pub fn update(&mut self) {
        if self.paused {
            return;
        }
        self.tick += 1;

        let Self {
            agents,
            mode,
            params,
            bounds,
            snapshot,
            positions,
            neighbor_indices,
            neighbor_states,
            ..
        } = self;
        let params = *params;

        // Phase 1: freeze every agent's state before anything moves
        snapshot.clear();
        snapshot.extend(agents.iter().map(Agent::kinematics));
        positions.clear();
        positions.extend(snapshot.iter().map(|k| k.position));

        let grid = SpatialGrid::build(positions, params.perception_radius);

        // Phase 2: accumulate forces against the frozen snapshot
        for (index, agent) in agents.iter_mut().enumerate() {
            grid.neighbors_within(index, params.perception_radius, neighbor_indices);
            neighbor_states.clear();
            neighbor_states.extend(neighbor_indices.iter().map(|&i| snapshot[i]));
            apply_behavior(agent, *mode, &params, neighbor_states);
        }

        // Phase 3: integrate
        for agent in agents.iter_mut() {
            agent.integrate(params.speed_multiplier, bounds);
        }

        log::trace!("tick {}: {} agents ({})", self.tick, self.agents.len(), self.mode);

        if self.mode == BehaviorMode::Forming
            && !self.completion_reported
            && self.agents.iter().any(Agent::has_target)
            && self.is_formation_complete()
        {
            self.completion_reported = true;
            log::debug!("formation complete at tick {}", self.tick);
            self.events.push(SwarmEvent::FormationCompleted);
        }
    }

    /// Percentage (0-100) of targeted agents within
    /// [`FORMATION_COMPLETE_DISTANCE`] of their target. Zero outside `Forming`.
    pub fn formation_progress(&self) -> f32 {
        if self.mode != BehaviorMode::Forming || self.agents.is_empty() {
            return 0.0;
        }

        let mut targeted = 0usize;
        let mut arrived = 0usize;
        for distance in self.agents.iter().filter_map(Agent::distance_to_target) {
            targeted += 1;
            if distance < FORMATION_COMPLETE_DISTANCE {
                arrived += 1;
            }
        }

        if targeted == 0 {
            0.0
        } else {
            arrived as f32 / targeted as f32 * 100.0
        }
    }

    /// True in `Forming` mode once every targeted agent has arrived
    pub fn is_formation_complete(&self) -> bool {
        self.mode == BehaviorMode::Forming
            && self
                .agents
                .iter()
                .filter_map(Agent::distance_to_target)
                .all(|d| d < FORMATION_COMPLETE_DISTANCE)
    }

    pub fn status(&self) -> SwarmStatus {
        SwarmStatus {
            agent_count: self.agents.len(),
            mode: self.mode,
            progress: self.formation_progress(),
            formation_complete: self.is_formation_complete(),
            paused: self.paused,
            tick: self.tick,
        }
    }

    /// Hand pending lifecycle events to the caller
    pub fn drain_events(&mut self) -> Vec<SwarmEvent> {
        core::mem::take(&mut self.events)
    }

    pub fn agents(&self) -> &[Agent<D>] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn target_points(&self) -> &[Vector<D>] {
        &self.targets
    }

    /// Index of the source point each agent was assigned, parallel to [`agents`](Self::agents)
    pub fn assignment(&self) -> &[Option<usize>] {
        &self.assignment
    }

    pub fn mode(&self) -> BehaviorMode {
        self.mode
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn bounds(&self) -> Vector<D> {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Vector<D>) {
        self.bounds = bounds;
    }

    pub fn params(&self) -> &SwarmParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut SwarmParams {
        &mut self.params
    }

    pub fn apply_settings(&mut self, settings: SwarmSettings) {
        self.params = settings.into();
    }

    pub fn set_cohesion_strength(&mut self, value: f32) {
        self.params.cohesion_strength = value;
    }

    pub fn set_separation_strength(&mut self, value: f32) {
        self.params.separation_strength = value;
    }

    pub fn set_alignment_strength(&mut self, value: f32) {
        self.params.alignment_strength = value;
    }

    pub fn set_seek_strength(&mut self, value: f32) {
        self.params.seek_strength = value;
    }

    pub fn set_speed_multiplier(&mut self, value: f32) {
        self.params.speed_multiplier = value;
    }

    pub fn set_perception_radius(&mut self, value: f32) {
        self.params.perception_radius = value;
    }
}

fn apply_behavior<const D: usize>(
    agent: &mut Agent<D>,
    mode: BehaviorMode,
    params: &SwarmParams,
    neighbors: &[Kinematics<D>],
) {
    match mode {
        BehaviorMode::Forming => {
            // targetless agents drift this tick
            let Some(target) = agent.target() else {
                return;
            };
            let distance = agent.seek(target, params.seek_strength);
            // flocking fades out close to the target to stop oscillation
            let intensity = (distance / SWARM_INTENSITY_DISTANCE).min(1.0);

            agent.separation(neighbors, params.separation_strength);
            agent.align(neighbors, params.alignment_strength * intensity);
            agent.cohesion(neighbors, params.cohesion_strength * intensity * 0.5);
        }
        BehaviorMode::Dispersing => {
            agent.separation(neighbors, params.separation_strength * 2.0);
            agent.align(neighbors, params.alignment_strength * 0.5);
        }
        BehaviorMode::Idle => {
            agent.separation(neighbors, params.separation_strength);
            agent.align(neighbors, params.alignment_strength);
            agent.cohesion(neighbors, params.cohesion_strength);
        }
    }
}
