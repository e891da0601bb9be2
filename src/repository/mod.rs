pub mod database;
pub mod models;
pub mod stats_repository;
pub mod store;

pub use database::{Database, PgConnector};
pub use models::ChainContractCount;
pub use stats_repository::StatsRepository;
pub use store::{ContractStore, StoreConnector};
