use super::domain::{Premise, PremiseFilter, PremiseId};
use super::scoring::ScoringConfig;

/// Storage abstraction for premise records so the service and the bulk
/// recalculation job can be exercised against any backend.
pub trait PremiseStore: Send + Sync {
    fn get(&self, id: &PremiseId) -> Result<Option<Premise>, StoreError>;
    fn list(&self, filter: &PremiseFilter) -> Result<Vec<Premise>, StoreError>;
    fn upsert(&self, premise: Premise) -> Result<(), StoreError>;
}

/// Error enumeration for premise store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("premise store unavailable: {0}")]
    Unavailable(String),
    #[error("premise record corrupt: {0}")]
    Corrupt(String),
}

/// Storage abstraction for the externally editable scoring configuration.
pub trait ConfigStore: Send + Sync {
    fn read(&self) -> Result<ScoringConfig, ConfigStoreError>;
    fn write(&self, config: ScoringConfig) -> Result<(), ConfigStoreError>;
}

/// Error enumeration for configuration store failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigStoreError {
    #[error("scoring configuration store unavailable: {0}")]
    Unavailable(String),
    #[error("stored scoring configuration corrupt: {0}")]
    Corrupt(String),
}
