use core::fmt;

use rand::Rng;

use crate::vector::Vector;

/// Separation only reacts to neighbors closer than this, regardless of perception radius
pub const DESIRED_SEPARATION: f32 = 15.0;
/// Distance to the seek target below which an agent glows and counts as in formation
pub const GLOW_DISTANCE: f32 = 50.0;
/// Boundary reflection starts this far inside the bounds
pub const BOUNDARY_MARGIN: f32 = 10.0;
/// Velocity component retained (and inverted) when bouncing off a boundary
pub const BOUNCE_DAMPING: f32 = -0.5;

const GLOW_NEAR_MIN: f32 = 0.8;
const GLOW_FLOOR: f32 = 0.2;
const GLOW_DECAY: f32 = 0.02;
const ALIGN_SCALE: f32 = 0.1;
const COHESION_SCALE: f32 = 0.05;
const FACING_MIN_SPEED: f32 = 0.1;

/// Stable identifier issued by the swarm; never reused within one swarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-agent motion limits, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentConfig {
    pub max_speed: f32,
    pub max_force: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_speed: 2.5,
            max_force: 0.15,
        }
    }
}

/// Position and velocity of a neighbor, captured before any agent moves this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics<const D: usize> {
    pub position: Vector<D>,
    pub velocity: Vector<D>,
}

/// A single autonomous point-agent
#[derive(Debug, Clone)]
pub struct Agent<const D: usize> {
    id: AgentId,
    pub position: Vector<D>,
    pub velocity: Vector<D>,
    acceleration: Vector<D>,
    max_speed: f32,
    max_force: f32,
    target: Option<Vector<D>>,
    in_formation: bool,
    glow_intensity: f32,
    facing: Vector<D>,
}

impl<const D: usize> Agent<D> {
    pub fn new(id: AgentId, position: Vector<D>, velocity: Vector<D>, config: AgentConfig) -> Self {
        Self {
            id,
            position,
            velocity,
            acceleration: Vector::zero(),
            max_speed: config.max_speed,
            max_force: config.max_force,
            target: None,
            in_formation: false,
            glow_intensity: 0.0,
            facing: velocity.normalize(),
        }
    }

    /// Agent at `position` with a random velocity in `[-1, 1)` per axis
    pub fn random<R: Rng + ?Sized>(
        id: AgentId,
        position: Vector<D>,
        config: AgentConfig,
        rng: &mut R,
    ) -> Self {
        let velocity = Vector::random_within(rng, &Vector::splat(1.0));
        Self::new(id, position, velocity, config)
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn acceleration(&self) -> Vector<D> {
        self.acceleration
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub fn max_force(&self) -> f32 {
        self.max_force
    }

    pub fn target(&self) -> Option<Vector<D>> {
        self.target
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    pub fn in_formation(&self) -> bool {
        self.in_formation
    }

    pub fn glow_intensity(&self) -> f32 {
        self.glow_intensity
    }

    /// Unit heading of the last velocity fast enough to orient a model
    pub fn facing(&self) -> Vector<D> {
        self.facing
    }

    pub fn speed(&self) -> f32 {
        self.velocity.magnitude()
    }

    pub fn kinematics(&self) -> Kinematics<D> {
        Kinematics {
            position: self.position,
            velocity: self.velocity,
        }
    }

    pub fn distance_to_target(&self) -> Option<f32> {
        self.target.map(|t| self.position.distance(&t))
    }

    pub fn set_target(&mut self, point: Vector<D>) {
        self.target = Some(point);
    }

    pub fn clear_target(&mut self) {
        self.target = None;
        self.in_formation = false;
    }

    pub fn apply_force(&mut self, force: Vector<D>) {
        self.acceleration += force;
    }

    /// Steer toward `target` at full speed. Returns the distance to `target`
    /// measured before steering. Also drives the glow and in-formation state.
    pub fn seek(&mut self, target: Vector<D>, strength: f32) -> f32 {
        let offset = target - self.position;
        let distance = offset.magnitude();
        if distance <= 0.0 {
            return distance;
        }

        let desired = offset / distance * self.max_speed;
        let steer = ((desired - self.velocity) * strength).limit(self.max_force);
        self.apply_force(steer);

        if distance < GLOW_DISTANCE {
            self.glow_intensity = (1.0 - distance / GLOW_DISTANCE).max(GLOW_NEAR_MIN);
            self.in_formation = true;
        } else {
            self.glow_intensity = (self.glow_intensity - GLOW_DECAY).max(GLOW_FLOOR);
            self.in_formation = false;
        }

        distance
    }

    /// Match the mean velocity of `neighbors`
    pub fn align(&mut self, neighbors: &[Kinematics<D>], strength: f32) {
        if neighbors.is_empty() {
            return;
        }
        let mean: Vector<D> =
            neighbors.iter().map(|n| n.velocity).sum::<Vector<D>>() / neighbors.len() as f32;
        self.apply_force((mean - self.velocity) * (strength * ALIGN_SCALE));
    }

    /// Seek the centroid of `neighbors`
    pub fn cohesion(&mut self, neighbors: &[Kinematics<D>], strength: f32) {
        if neighbors.is_empty() {
            return;
        }
        let center: Vector<D> =
            neighbors.iter().map(|n| n.position).sum::<Vector<D>>() / neighbors.len() as f32;
        self.seek(center, strength * COHESION_SCALE);
    }

    /// Push away from neighbors closer than [`DESIRED_SEPARATION`],
    /// weighted by inverse distance
    pub fn separation(&mut self, neighbors: &[Kinematics<D>], strength: f32) {
        let mut steer = Vector::zero();
        let mut count = 0;

        for neighbor in neighbors {
            let away = self.position - neighbor.position;
            let distance = away.magnitude();
            if distance > 0.0 && distance < DESIRED_SEPARATION {
                steer += away / distance / distance;
                count += 1;
            }
        }

        if count > 0 {
            self.apply_force(steer / count as f32 * strength);
        }
    }

    /// Advance one tick: apply accumulated force, clamp speed, move, then
    /// reflect off the bounds. `bounds` holds per-axis half-extents.
    pub fn integrate(&mut self, speed_multiplier: f32, bounds: &Vector<D>) {
        self.velocity += self.acceleration;
        self.velocity = self.velocity.limit(self.max_speed * speed_multiplier);
        self.position += self.velocity;
        self.acceleration = Vector::zero();

        self.contain_within_bounds(bounds);

        let speed = self.velocity.magnitude();
        if speed > FACING_MIN_SPEED {
            self.facing = self.velocity / speed;
        }
    }

    fn contain_within_bounds(&mut self, bounds: &Vector<D>) {
        for axis in 0..D {
            let limit = bounds[axis] - BOUNDARY_MARGIN;

            if self.position[axis] < -limit {
                self.position[axis] = -limit;
                self.velocity[axis] *= BOUNCE_DAMPING;
            } else if self.position[axis] > limit {
                self.position[axis] = limit;
                self.velocity[axis] *= BOUNCE_DAMPING;
            }
        }
    }
}
