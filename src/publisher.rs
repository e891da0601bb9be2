use crate::error::StatsGenError;
use crate::manifest::Manifest;
use crate::stats::StatsReport;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const STATS_FILE: &str = "stats.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Writes stats and manifests into the v1 and v2 repository directories.
#[derive(Debug, Clone)]
pub struct RepositoryPublisher {
    repo_v1_path: PathBuf,
    repo_v2_path: PathBuf,
}

impl RepositoryPublisher {
    pub fn new(repo_v1_path: impl Into<PathBuf>, repo_v2_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_v1_path: repo_v1_path.into(),
            repo_v2_path: repo_v2_path.into(),
        }
    }

    pub fn repo_v1_path(&self) -> &Path {
        &self.repo_v1_path
    }

    pub fn repo_v2_path(&self) -> &Path {
        &self.repo_v2_path
    }

    /// Serializes everything first, then writes v1 stats, v1 manifest, v2 stats
    /// and v2 manifest in that order. Files written before a failure are left in place.
    pub async fn publish(
        &self,
        stats: &StatsReport,
        manifest_v1: &Manifest,
        manifest_v2: &Manifest,
    ) -> Result<(), StatsGenError> {
        let stats_json = to_pretty_json("stats", stats)?;
        let manifest_v1_json = to_pretty_json("manifest v1", manifest_v1)?;
        let manifest_v2_json = to_pretty_json("manifest v2", manifest_v2)?;

        let files = [
            (self.repo_v1_path.join(STATS_FILE), &stats_json),
            (self.repo_v1_path.join(MANIFEST_FILE), &manifest_v1_json),
            (self.repo_v2_path.join(STATS_FILE), &stats_json),
            (self.repo_v2_path.join(MANIFEST_FILE), &manifest_v2_json),
        ];

        for (path, contents) in files {
            write_file(path, contents).await?;
        }

        info!(
            repo_v1 = %self.repo_v1_path.display(),
            repo_v2 = %self.repo_v2_path.display(),
            chains = stats.len(),
            "Files stored"
        );
        Ok(())
    }
}

fn to_pretty_json<T: Serialize>(what: &'static str, value: &T) -> Result<String, StatsGenError> {
    serde_json::to_string_pretty(value)
        .map_err(|source| StatsGenError::Serialization { what, source })
}

async fn write_file(path: PathBuf, contents: &str) -> Result<(), StatsGenError> {
    debug!(path = %path.display(), bytes = contents.len(), "Writing file");
    match tokio::fs::write(&path, contents).await {
        Ok(()) => Ok(()),
        Err(source) => Err(StatsGenError::Publish { path, source }),
    }
}
