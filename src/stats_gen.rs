use crate::config::Config;
use crate::error::{Stage, StatsGenError};
use crate::manifest::{BaseManifest, ManifestVersion};
use crate::publisher::RepositoryPublisher;
use crate::repository::{ChainContractCount, ContractStore, PgConnector, StoreConnector};
use crate::stats::generate_stats;
use chrono::{DateTime, Utc};
use tracing::{Instrument, debug, error, info, info_span};

/// Runs one stats generation: init, count, aggregate, manifest, publish, close.
pub struct StatsGen<C: StoreConnector> {
    connector: C,
    publisher: RepositoryPublisher,
    store: Option<C::Store>,
    clock: fn() -> DateTime<Utc>,
}

impl StatsGen<PgConnector> {
    pub fn from_config(config: &Config) -> Self {
        StatsGen::new(
            PgConnector::new(config.database.clone()),
            RepositoryPublisher::new(&config.repo_v1_path, &config.repo_v2_path),
        )
    }
}

impl<C: StoreConnector> StatsGen<C> {
    pub fn new(connector: C, publisher: RepositoryPublisher) -> Self {
        Self {
            connector,
            publisher,
            store: None,
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.store.is_some()
    }

    /// Connects the store unless it is already connected.
    pub async fn init(&mut self) -> Result<(), StatsGenError> {
        if self.store.is_some() {
            return Ok(());
        }

        match self.connector.connect().await {
            Ok(store) => {
                self.store = Some(store);
                Ok(())
            }
            Err(e) => {
                error!(stage = %Stage::Init, error = ?e, "Error while initializing database");
                Err(e)
            }
        }
    }

    pub async fn count_contracts_per_chain(
        &self,
    ) -> Result<Vec<ChainContractCount>, StatsGenError> {
        let store = self.store.as_ref().ok_or(StatsGenError::NotInitialized)?;
        store.count_contracts_per_chain().await
    }

    /// Releases the store if one is held. Safe to call repeatedly.
    pub async fn close(&mut self) {
        if let Some(store) = self.store.take() {
            store.close().await;
            debug!(stage = %Stage::Close, "Database pool closed");
        }
    }

    /// Full run. Once `init` succeeds the store is closed whether or not the
    /// remaining stages succeed.
    pub async fn run(&mut self) -> Result<(), StatsGenError> {
        async {
            self.init().await?;
            let result = self.generate().await;
            self.close().await;
            result
        }
        .instrument(info_span!("StatsGen"))
        .await
    }

    async fn generate(&self) -> Result<(), StatsGenError> {
        info!("Count contracts in each chain");
        let contracts_per_chain = self.count_contracts_per_chain().await.inspect_err(|e| {
            error!(stage = %Stage::Count, error = ?e, "Error while querying database");
        })?;
        info!(chains = contracts_per_chain.len(), "Count completed");

        info!(stage = %Stage::Aggregate, "Formatting results in stats.json");
        let stats = generate_stats(&contracts_per_chain);

        info!(stage = %Stage::Manifest, "Formatting results in manifest.json");
        let manifest = BaseManifest::capture((self.clock)());
        let manifest_v1 = manifest.tag(ManifestVersion::V1);
        let manifest_v2 = manifest.tag(ManifestVersion::V2);

        info!("Storing files");
        self.publisher
            .publish(&stats, &manifest_v1, &manifest_v2)
            .await
            .inspect_err(|e| {
                error!(
                    stage = %Stage::Publish,
                    stats = ?stats,
                    manifest_v1 = ?manifest_v1,
                    manifest_v2 = ?manifest_v2,
                    error = ?e,
                    "Error while storing files in repo"
                );
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[derive(Default)]
    struct Calls {
        connects: AtomicUsize,
        counts: AtomicUsize,
        closes: AtomicUsize,
    }

    struct FakeStore {
        rows: Vec<ChainContractCount>,
        fail_query: bool,
        calls: Arc<Calls>,
    }

    #[async_trait]
    impl ContractStore for FakeStore {
        async fn count_contracts_per_chain(
            &self,
        ) -> Result<Vec<ChainContractCount>, StatsGenError> {
            self.calls.counts.fetch_add(1, Ordering::SeqCst);
            if self.fail_query {
                return Err(StatsGenError::Query(sqlx::Error::RowNotFound));
            }
            Ok(self.rows.clone())
        }

        async fn close(&self) {
            self.calls.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FakeConnector {
        fail_query: bool,
        calls: Arc<Calls>,
    }

    #[async_trait]
    impl StoreConnector for FakeConnector {
        type Store = FakeStore;

        async fn connect(&self) -> Result<FakeStore, StatsGenError> {
            self.calls.connects.fetch_add(1, Ordering::SeqCst);
            Ok(FakeStore {
                rows: vec![ChainContractCount {
                    chain_id: 1,
                    full: 3,
                    partial: 1,
                }],
                fail_query: self.fail_query,
                calls: self.calls.clone(),
            })
        }
    }

    fn stats_gen(fail_query: bool, calls: &Arc<Calls>) -> StatsGen<FakeConnector> {
        StatsGen::new(
            FakeConnector {
                fail_query,
                calls: calls.clone(),
            },
            RepositoryPublisher::new("/nonexistent/v1", "/nonexistent/v2"),
        )
    }

    #[tokio::test]
    async fn test_count_before_init_is_rejected() {
        let calls = Arc::new(Calls::default());
        let stats_gen = stats_gen(false, &calls);

        let err = stats_gen.count_contracts_per_chain().await.unwrap_err();

        assert!(matches!(err, StatsGenError::NotInitialized));
        assert_eq!(err.stage(), Stage::Count);
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let calls = Arc::new(Calls::default());
        let mut stats_gen = stats_gen(false, &calls);

        stats_gen.init().await.unwrap();
        stats_gen.init().await.unwrap();

        assert!(stats_gen.is_initialized());
        assert_eq!(calls.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_close_without_init_and_twice_is_noop() {
        let calls = Arc::new(Calls::default());
        let mut stats_gen = stats_gen(false, &calls);

        stats_gen.close().await;
        assert_eq!(calls.closes.load(Ordering::SeqCst), 0);

        stats_gen.init().await.unwrap();
        stats_gen.close().await;
        stats_gen.close().await;

        assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
        assert!(!stats_gen.is_initialized());
    }

    #[tokio::test]
    async fn test_query_failure_still_closes_store() {
        let calls = Arc::new(Calls::default());
        let dir = tempdir().unwrap();
        let mut stats_gen = StatsGen::new(
            FakeConnector {
                fail_query: true,
                calls: calls.clone(),
            },
            RepositoryPublisher::new(dir.path(), dir.path()),
        );

        let err = stats_gen.run().await.unwrap_err();

        assert!(matches!(err, StatsGenError::Query(_)));
        assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_publish_failure_still_closes_store() {
        let calls = Arc::new(Calls::default());
        let mut stats_gen = stats_gen(false, &calls);

        let err = stats_gen.run().await.unwrap_err();

        assert_eq!(err.stage(), Stage::Publish);
        assert_eq!(calls.counts.load(Ordering::SeqCst), 1);
        assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
    }
}
