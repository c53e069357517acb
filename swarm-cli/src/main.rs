use anyhow::{Context, Result};
use clap::Parser;
use swarm_cli::{run, Args, RunConfig};

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    log::info!("Swarm runner starting...");
    log::info!("Agents: {}", args.agents);
    log::info!("Dimensions: {}", args.dimensions);

    let config = RunConfig::from_args(&args)?;
    let report = run(&config)?;

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}
