use sqlx::FromRow;

/// Verified contract counts for a single chain, as returned by the aggregation query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct ChainContractCount {
    pub chain_id: i64,
    pub full: i64,
    pub partial: i64,
}
