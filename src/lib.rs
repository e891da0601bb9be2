pub mod config;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod publisher;
pub mod repository;
pub mod stats;
pub mod stats_gen;

pub use error::{Stage, StatsGenError};
pub use stats_gen::StatsGen;
