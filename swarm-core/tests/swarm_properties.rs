use rand::rngs::SmallRng;
use rand::SeedableRng;
use swarm_core::{
    AgentConfig, BehaviorMode, Kinematics, SpatialGrid, Swarm, SwarmEvent, Vector, Vector2, Vector3,
};

fn seeded<const D: usize>(bounds: Vector<D>, seed: u64) -> Swarm<D> {
    Swarm::with_rng(bounds, SmallRng::seed_from_u64(seed))
}

fn at_rest<const D: usize>(points: &[Vector<D>]) -> Vec<Kinematics<D>> {
    points
        .iter()
        .map(|&position| Kinematics {
            position,
            velocity: Vector::zero(),
        })
        .collect()
}

fn mean_pairwise_distance<const D: usize>(swarm: &Swarm<D>) -> f32 {
    let agents = swarm.agents();
    let mut total = 0.0;
    let mut pairs = 0;
    for (i, a) in agents.iter().enumerate() {
        for b in &agents[i + 1..] {
            total += a.position.distance(&b.position);
            pairs += 1;
        }
    }
    total / pairs as f32
}

fn usage_counts<const D: usize>(swarm: &Swarm<D>, points: usize) -> Vec<usize> {
    let mut counts = vec![0; points];
    for index in swarm.assignment().iter().flatten() {
        counts[*index] += 1;
    }
    counts
}

#[test]
fn test_speed_never_exceeds_limit() {
    let mut swarm = seeded(Vector3::new(250.0, 200.0, 200.0), 17);
    swarm.initialize(200);
    let max_speed = AgentConfig::default().max_speed;

    let mut rng = SmallRng::seed_from_u64(18);
    let targets: Vec<Vector3> = (0..80)
        .map(|_| Vector3::random_within(&mut rng, &Vector3::splat(120.0)))
        .collect();

    for tick in 0..150 {
        match tick {
            20 => swarm.set_target_points(targets.clone()),
            60 => swarm.set_speed_multiplier(0.5),
            90 => swarm.disperse(),
            120 => swarm.set_speed_multiplier(1.5),
            _ => {}
        }
        swarm.update();

        let limit = max_speed * swarm.params().speed_multiplier;
        for agent in swarm.agents() {
            assert!(
                agent.speed() <= limit + 1e-4,
                "tick {tick}: agent {} speed {} over {limit}",
                agent.id(),
                agent.speed()
            );
        }
    }
}

#[test]
fn test_grid_candidates_cover_exact_neighborhood() {
    let mut swarm = seeded(Vector3::new(250.0, 200.0, 200.0), 23);
    swarm.initialize(120);
    for _ in 0..30 {
        swarm.update();
    }

    let radius = swarm.params().perception_radius;
    let positions: Vec<Vector3> = swarm.agents().iter().map(|a| a.position).collect();
    let grid = SpatialGrid::build(&positions, radius);

    for (i, p) in positions.iter().enumerate() {
        let candidates = grid.candidates_of(i);
        let mut exact = Vec::new();
        grid.neighbors_within(i, radius, &mut exact);
        for (j, q) in positions.iter().enumerate() {
            if i != j && p.distance(q) < radius {
                assert!(candidates.contains(&j));
                assert!(exact.contains(&j));
            }
        }
        assert!(exact.iter().all(|&j| p.distance(&positions[j]) < radius));
    }
}

#[test]
fn test_equal_population_and_points_is_a_bijection() {
    let mut swarm = seeded(Vector3::splat(200.0), 31);
    swarm.initialize(64);
    let mut rng = SmallRng::seed_from_u64(32);
    let points: Vec<Vector3> = (0..64)
        .map(|_| Vector3::random_within(&mut rng, &Vector3::splat(100.0)))
        .collect();

    swarm.set_target_points(points.clone());

    assert!(usage_counts(&swarm, points.len()).iter().all(|&c| c == 1));
    for (agent, index) in swarm.agents().iter().zip(swarm.assignment()) {
        let index = index.expect("every agent is assigned");
        assert_eq!(agent.target(), Some(points[index]));
    }
}

#[test]
fn test_surplus_agents_reuse_every_point() {
    let mut swarm = seeded(Vector2::new(400.0, 300.0), 41);
    swarm.initialize(103);
    let mut rng = SmallRng::seed_from_u64(42);
    let points: Vec<Vector2> = (0..10)
        .map(|_| Vector2::random_within(&mut rng, &Vector2::splat(150.0)))
        .collect();

    swarm.set_target_points(points.clone());

    let counts = usage_counts(&swarm, points.len());
    assert!(counts.iter().all(|&c| c >= 103 / 10), "{counts:?}");
    assert!(swarm.agents().iter().all(|a| a.has_target()));
}

#[test]
fn test_reassignment_replaces_previous_targets() {
    let mut swarm = seeded(Vector3::splat(200.0), 43);
    swarm.initialize(10);
    swarm.set_target_points(vec![Vector3::new(50.0, 0.0, 0.0); 10]);
    swarm.update();

    let second = vec![Vector3::new(-50.0, 0.0, 0.0)];
    swarm.set_target_points(second.clone());
    assert_eq!(swarm.target_points(), second.as_slice());
    for agent in swarm.agents() {
        let target = agent.target().unwrap();
        assert!(target.distance(&second[0]) < 20.0);
    }
}

#[test]
fn test_formation_progress_rises_to_completion() {
    let mut swarm = seeded(Vector3::splat(300.0), 51);
    swarm.spawn_at(&at_rest(&[
        Vector3::new(200.0, 0.0, 0.0),
        Vector3::new(-200.0, 0.0, 0.0),
        Vector3::new(0.0, 200.0, 0.0),
        Vector3::new(0.0, -200.0, 0.0),
    ]));
    swarm.set_target_points(vec![
        Vector3::new(100.0, 0.0, 0.0),
        Vector3::new(-100.0, 0.0, 0.0),
        Vector3::new(0.0, 100.0, 0.0),
        Vector3::new(0.0, -100.0, 0.0),
    ]);
    swarm.drain_events();

    let mut last = swarm.formation_progress();
    let mut completed_at = None;
    for tick in 1..=200 {
        swarm.update();
        let progress = swarm.formation_progress();
        assert!(progress >= last, "progress fell from {last} to {progress} at tick {tick}");
        last = progress;
        if completed_at.is_none() && swarm.is_formation_complete() {
            completed_at = Some(tick);
        }
    }

    assert_eq!(last, 100.0);
    assert!(completed_at.is_some());
    let events = swarm.drain_events();
    assert_eq!(
        events
            .iter()
            .filter(|e| **e == SwarmEvent::FormationCompleted)
            .count(),
        1
    );
    assert!(swarm.agents().iter().all(|a| a.in_formation()));
}

#[test]
fn test_disperse_spreads_the_swarm() {
    let mut swarm = seeded(Vector3::splat(250.0), 61);
    swarm.initialize(60);

    let mut cluster = Vec::new();
    for x in 0..4 {
        for y in 0..4 {
            for z in 0..4 {
                cluster.push(Vector3::new(
                    (x as f32 - 1.5) * 15.0,
                    (y as f32 - 1.5) * 15.0,
                    (z as f32 - 1.5) * 15.0,
                ));
            }
        }
    }
    swarm.set_target_points(cluster);
    for _ in 0..300 {
        swarm.update();
    }

    let before = mean_pairwise_distance(&swarm);
    swarm.disperse();
    assert_eq!(swarm.mode(), BehaviorMode::Dispersing);
    for _ in 0..50 {
        swarm.update();
    }
    let after = mean_pairwise_distance(&swarm);

    assert!(after > before, "mean distance {before} -> {after}");
}

#[test]
fn test_paused_updates_leave_state_untouched() {
    let mut swarm = seeded(Vector3::new(250.0, 200.0, 200.0), 71);
    swarm.initialize(300);
    assert!(swarm.toggle_pause());

    let before: Vec<_> = swarm.agents().iter().map(|a| a.kinematics()).collect();
    for _ in 0..10 {
        swarm.update();
    }
    let after: Vec<_> = swarm.agents().iter().map(|a| a.kinematics()).collect();

    assert_eq!(swarm.len(), 300);
    for (b, a) in before.iter().zip(&after) {
        for axis in 0..3 {
            assert_eq!(b.position[axis].to_bits(), a.position[axis].to_bits());
            assert_eq!(b.velocity[axis].to_bits(), a.velocity[axis].to_bits());
        }
    }
}

#[test]
fn test_middle_agent_receives_jittered_duplicate() {
    let mut swarm = seeded(Vector3::splat(100.0), 81);
    swarm.spawn_at(&at_rest(&[
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(10.0, 0.0, 0.0),
        Vector3::new(20.0, 0.0, 0.0),
    ]));
    let points = vec![Vector3::new(5.0, 5.0, 5.0), Vector3::new(15.0, 5.0, 5.0)];
    swarm.set_target_points(points.clone());

    let agents = swarm.agents();
    assert_eq!(agents[0].target(), Some(points[0]));
    assert_eq!(agents[2].target(), Some(points[1]));

    let middle = agents[1].target().expect("middle agent gets a target");
    assert!(!points.contains(&middle));
    let source = points[swarm.assignment()[1].unwrap()];
    for axis in 0..3 {
        assert!((middle[axis] - source[axis]).abs() <= 10.0 + 1e-3);
    }
}

#[test]
fn test_same_seed_same_run() {
    let run = |seed| {
        let mut swarm = seeded(Vector2::new(400.0, 300.0), seed);
        swarm.initialize(40);
        swarm.set_target_points(vec![Vector2::new(0.0, 0.0); 3]);
        for _ in 0..25 {
            swarm.update();
        }
        swarm
            .agents()
            .iter()
            .map(|a| a.position)
            .collect::<Vec<_>>()
    };
    assert_eq!(run(5), run(5));
    assert_ne!(run(5), run(6));
}
