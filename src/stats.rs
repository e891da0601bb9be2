use crate::repository::ChainContractCount;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStats {
    pub full_match: i64,
    pub partial_match: i64,
}

/// Per-chain match counts keyed by chain id. Serializes as a JSON object whose
/// keys are the chain ids in ascending order.
pub type StatsReport = BTreeMap<i64, ChainStats>;

pub fn generate_stats(contracts_per_chain: &[ChainContractCount]) -> StatsReport {
    contracts_per_chain
        .iter()
        .map(|chain| {
            (
                chain.chain_id,
                ChainStats {
                    full_match: chain.full,
                    partial_match: chain.partial,
                },
            )
        })
        .collect()
}
