use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use swarm_shared::{PointCloud, SwarmSettings};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Headless swarm formation runner", long_about = None)]
pub struct Args {
    /// Number of agents to spawn
    #[arg(short = 'n', long, default_value_t = 300)]
    pub agents: usize,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 600)]
    pub ticks: u64,

    /// Simulation space dimensionality (2 or 3)
    #[arg(short = 'D', long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(2..=3))]
    pub dimensions: u8,

    /// Seed for the random source; omit for a nondeterministic run
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Per-axis half-extents, comma separated (e.g. 250,200,200)
    #[arg(short, long, value_delimiter = ',')]
    pub bounds: Vec<f32>,

    /// JSON point cloud to form (output of a shape generator)
    #[arg(long)]
    pub targets: Option<PathBuf>,

    /// JSON settings file overriding the default strengths
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Tick at which the formation is released
    #[arg(long)]
    pub disperse_at: Option<u64>,

    /// Log a status line every N ticks (0 disables)
    #[arg(long, default_value_t = 60)]
    pub report_every: u64,

    /// Include per-agent state in the final report
    #[arg(long)]
    pub snapshot: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

/// Fully resolved run configuration, with files already loaded
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub agents: usize,
    pub ticks: u64,
    pub dimensions: usize,
    pub seed: Option<u64>,
    pub bounds: Vec<f32>,
    pub targets: Option<PointCloud>,
    pub settings: SwarmSettings,
    pub disperse_at: Option<u64>,
    pub report_every: u64,
    pub snapshot: bool,
}

/// Default half-extents: the 3D scene volume, or a 800x600 plane in 2D
pub fn default_bounds(dimensions: usize) -> Vec<f32> {
    match dimensions {
        2 => vec![400.0, 300.0],
        _ => vec![250.0, 200.0, 200.0],
    }
}

impl RunConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let dimensions = args.dimensions as usize;

        let bounds = if args.bounds.is_empty() {
            default_bounds(dimensions)
        } else {
            args.bounds.clone()
        };
        if bounds.len() != dimensions {
            anyhow::bail!(
                "Expected {} bound values for a {}D run, got {}",
                dimensions,
                dimensions,
                bounds.len()
            );
        }
        if bounds.iter().any(|b| !b.is_finite() || *b <= 0.0) {
            anyhow::bail!("Bounds must be positive, got {:?}", bounds);
        }

        let settings = match &args.settings {
            Some(path) => load_settings(path)?,
            None => SwarmSettings::default(),
        };

        let targets = match &args.targets {
            Some(path) => Some(load_point_cloud(path)?),
            None => None,
        };

        Ok(Self {
            agents: args.agents,
            ticks: args.ticks,
            dimensions,
            seed: args.seed,
            bounds,
            targets,
            settings,
            disperse_at: args.disperse_at,
            report_every: args.report_every,
            snapshot: args.snapshot,
        })
    }
}

pub fn load_settings(path: &Path) -> Result<SwarmSettings> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid settings JSON in {}", path.display()))
}

pub fn load_point_cloud(path: &Path) -> Result<PointCloud> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read target file {}", path.display()))?;
    let cloud = PointCloud::from_json_str(&text)
        .with_context(|| format!("Invalid point cloud JSON in {}", path.display()))?;

    if let Some(index) = cloud.first_malformed() {
        anyhow::bail!(
            "Point {} in {} does not have {} components",
            index,
            path.display(),
            cloud.dimensions
        );
    }
    log::debug!("Loaded {} target points from {}", cloud.len(), path.display());
    Ok(cloud)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["swarm-cli"]).unwrap();
        assert_eq!(args.agents, 300);
        assert_eq!(args.dimensions, 3);
        assert!(args.bounds.is_empty());

        let config = RunConfig::from_args(&args).unwrap();
        assert_eq!(config.bounds, vec![250.0, 200.0, 200.0]);
        assert_eq!(config.settings, SwarmSettings::default());
    }

    #[test]
    fn test_args_bounds_list() {
        let args =
            Args::try_parse_from(["swarm-cli", "-D", "2", "--bounds", "100,50", "-n", "12"]).unwrap();
        let config = RunConfig::from_args(&args).unwrap();
        assert_eq!(config.dimensions, 2);
        assert_eq!(config.bounds, vec![100.0, 50.0]);
        assert_eq!(config.agents, 12);
    }

    #[test]
    fn test_bounds_must_match_dimensions() {
        let args = Args::try_parse_from(["swarm-cli", "--bounds", "100,50"]).unwrap();
        assert!(RunConfig::from_args(&args).is_err());
    }

    #[test]
    fn test_dimensions_out_of_range_rejected() {
        assert!(Args::try_parse_from(["swarm-cli", "-D", "4"]).is_err());
    }

    #[test]
    fn test_missing_settings_file_reports_path() {
        let err = load_settings(Path::new("/nonexistent/settings.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/settings.json"));
    }
}
