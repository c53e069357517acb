use anyhow::{Context, Result};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use swarm_core::{Swarm, SwarmEvent, Vector};
use swarm_shared::{Command, SnapshotResponse, StatusResponse};

use crate::config::RunConfig;

/// Summary printed as JSON when a run finishes
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub dimensions: usize,
    pub ticks_run: u64,
    /// Tick on which the last forming cycle completed, if it did
    pub completed_at: Option<u64>,
    pub status: StatusResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<SnapshotResponse>,
}

pub fn run(config: &RunConfig) -> Result<RunReport> {
    match config.dimensions {
        2 => run_swarm::<2>(config),
        3 => run_swarm::<3>(config),
        other => anyhow::bail!("Unsupported dimensionality: {}", other),
    }
}

fn build_swarm<const D: usize>(config: &RunConfig) -> Result<Swarm<D>> {
    let bounds = Vector::<D>::try_from_slice(&config.bounds, 0).context("Invalid bounds")?;
    let rng = match config.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    let mut swarm = Swarm::with_rng(bounds, rng);
    swarm.apply_settings(config.settings);
    swarm.execute(Command::Initialize {
        count: config.agents,
    })?;

    if let Some(cloud) = &config.targets {
        swarm
            .execute(Command::SetTargets {
                points: cloud.clone(),
            })
            .context("Target points do not fit the simulation space")?;
        log::info!(
            "Forming {} points with {} agents",
            cloud.len(),
            swarm.len()
        );
    }
    Ok(swarm)
}

fn run_swarm<const D: usize>(config: &RunConfig) -> Result<RunReport> {
    let mut swarm = build_swarm::<D>(config)?;
    let mut completed_at = None;

    for _ in 0..config.ticks {
        if config.disperse_at == Some(swarm.tick()) {
            swarm.execute(Command::Disperse)?;
        }
        swarm.update();

        for event in swarm.drain_events() {
            match event {
                SwarmEvent::FormationCompleted => {
                    completed_at = Some(swarm.tick());
                    log::info!("Formation complete at tick {}", swarm.tick());
                }
                SwarmEvent::ModeChanged { from, to } => {
                    log::info!("Mode changed: {} -> {}", from, to);
                }
                other => log::debug!("{:?}", other),
            }
        }

        if config.report_every > 0 && swarm.tick() % config.report_every == 0 {
            let status = swarm.status();
            log::info!(
                "tick {:>6} | {:>10} | progress {:5.1}%",
                status.tick,
                status.mode,
                status.progress
            );
        }
    }

    Ok(RunReport {
        dimensions: D,
        ticks_run: swarm.tick(),
        completed_at,
        status: swarm.status().into(),
        snapshot: config.snapshot.then(|| swarm.snapshot()),
    })
}
