//! Store seam between the orchestrator and the datastore.
//!
//! `StoreConnector::connect` hands back an already health-checked store, so a
//! store value that exists is always usable until `close` is called.

use super::models::ChainContractCount;
use crate::error::StatsGenError;
use async_trait::async_trait;

#[async_trait]
pub trait ContractStore: Send + Sync {
    /// Full vs partial verified contract counts, one entry per chain with at least one match.
    async fn count_contracts_per_chain(&self) -> Result<Vec<ChainContractCount>, StatsGenError>;

    /// Release pooled connections. Calling it more than once is harmless.
    async fn close(&self);
}

#[async_trait]
pub trait StoreConnector: Send + Sync {
    type Store: ContractStore;

    /// Open the store and verify it answers a liveness query.
    async fn connect(&self) -> Result<Self::Store, StatsGenError>;
}
