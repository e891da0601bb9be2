use anyhow::{Context, Result};
use sourcify_stats::StatsGen;
use sourcify_stats::config::Config;
use sourcify_stats::logging::init_tracing;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(&config.log);

    info!("Starting stats generation");
    info!(
        repo_v1 = %config.repo_v1_path.display(),
        repo_v2 = %config.repo_v2_path.display(),
        "Configuration loaded"
    );

    let mut stats_gen = StatsGen::from_config(&config);

    if let Err(e) = stats_gen.run().await {
        let stage = e.stage();
        error!(stage = %stage, "Stats generation failed: {}", e);
        return Err(e).with_context(|| format!("Stats generation failed during {stage} stage"));
    }

    info!("Stats generation completed successfully");
    Ok(())
}
