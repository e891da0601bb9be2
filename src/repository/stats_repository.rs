use super::models::ChainContractCount;
use crate::error::StatsGenError;
use sqlx::PgPool;

pub struct StatsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepository<'a> {
    const HEALTH_CHECK: &'static str = "SELECT 1";

    // A match counts as full when either creation or runtime bytecode is a perfect match.
    // The partial predicate is kept as-is: a row with a NULL runtime_match is counted in
    // neither column.
    const COUNT_CONTRACTS_PER_CHAIN: &'static str = "
        SELECT
            CAST(contract_deployments.chain_id AS BIGINT) AS chain_id,
            CAST(SUM(CASE
                WHEN COALESCE(sourcify_matches.creation_match, '') = 'perfect'
                    OR sourcify_matches.runtime_match = 'perfect' THEN 1 ELSE 0 END) AS BIGINT) AS full,
            CAST(SUM(CASE
                WHEN COALESCE(sourcify_matches.creation_match, '') != 'perfect'
                    AND sourcify_matches.runtime_match != 'perfect' THEN 1 ELSE 0 END) AS BIGINT) AS partial
        FROM sourcify_matches
        JOIN verified_contracts ON verified_contracts.id = sourcify_matches.verified_contract_id
        JOIN contract_deployments ON contract_deployments.id = verified_contracts.deployment_id
        GROUP BY contract_deployments.chain_id
        ORDER BY contract_deployments.chain_id";

    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query(Self::HEALTH_CHECK).execute(self.pool).await?;
        Ok(())
    }

    pub async fn count_contracts_per_chain(&self) -> Result<Vec<ChainContractCount>, StatsGenError> {
        sqlx::query_as::<_, ChainContractCount>(Self::COUNT_CONTRACTS_PER_CHAIN)
            .fetch_all(self.pool)
            .await
            .map_err(StatsGenError::Query)
    }
}
