use chrono::NaiveDate;
use inspekta::config::StoreConfig;
use inspekta::error::AppError;
use inspekta::inspections::{
    ConfigStore, ConfigStoreError, Premise, PremiseFilter, PremiseId, PremiseStore, ScoringConfig,
    ServiceError, StoreError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPremiseStore {
    premises: Arc<Mutex<BTreeMap<PremiseId, Premise>>>,
}

impl PremiseStore for InMemoryPremiseStore {
    fn get(&self, id: &PremiseId) -> Result<Option<Premise>, StoreError> {
        let guard = self.premises.lock().expect("premise mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self, filter: &PremiseFilter) -> Result<Vec<Premise>, StoreError> {
        let guard = self.premises.lock().expect("premise mutex poisoned");
        Ok(guard
            .values()
            .filter(|premise| filter.matches(premise))
            .cloned()
            .collect())
    }

    fn upsert(&self, premise: Premise) -> Result<(), StoreError> {
        let mut guard = self.premises.lock().expect("premise mutex poisoned");
        guard.insert(premise.id.clone(), premise);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryConfigStore {
    config: Mutex<ScoringConfig>,
}

impl ConfigStore for InMemoryConfigStore {
    fn read(&self) -> Result<ScoringConfig, ConfigStoreError> {
        Ok(self.config.lock().expect("config mutex poisoned").clone())
    }

    fn write(&self, config: ScoringConfig) -> Result<(), ConfigStoreError> {
        *self.config.lock().expect("config mutex poisoned") = config;
        Ok(())
    }
}

/// Premise store persisted as one pretty-printed JSON array, matching the
/// hand-editable register files the inspectorate already keeps. The whole
/// file is rewritten on every upsert; registers are small enough for that.
#[derive(Debug)]
pub(crate) struct JsonFilePremiseStore {
    path: PathBuf,
    premises: Mutex<BTreeMap<PremiseId, Premise>>,
}

impl JsonFilePremiseStore {
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let premises = match std::fs::read_to_string(&path) {
            Ok(raw) => {
                let records: Vec<Premise> = serde_json::from_str(&raw).map_err(|err| {
                    StoreError::Corrupt(format!("{}: {err}", path.display()))
                })?;
                records
                    .into_iter()
                    .map(|premise| (premise.id.clone(), premise))
                    .collect()
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(StoreError::Unavailable(format!(
                    "{}: {err}",
                    path.display()
                )))
            }
        };

        Ok(Self {
            path,
            premises: Mutex::new(premises),
        })
    }

    fn persist(&self, premises: &BTreeMap<PremiseId, Premise>) -> Result<(), StoreError> {
        let records: Vec<&Premise> = premises.values().collect();
        let raw = serde_json::to_string_pretty(&records)
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;
        ensure_parent_dir(&self.path)
            .map_err(|err| StoreError::Unavailable(format!("{}: {err}", self.path.display())))?;
        std::fs::write(&self.path, raw)
            .map_err(|err| StoreError::Unavailable(format!("{}: {err}", self.path.display())))
    }
}

impl PremiseStore for JsonFilePremiseStore {
    fn get(&self, id: &PremiseId) -> Result<Option<Premise>, StoreError> {
        let guard = self.premises.lock().expect("premise mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self, filter: &PremiseFilter) -> Result<Vec<Premise>, StoreError> {
        let guard = self.premises.lock().expect("premise mutex poisoned");
        Ok(guard
            .values()
            .filter(|premise| filter.matches(premise))
            .cloned()
            .collect())
    }

    fn upsert(&self, premise: Premise) -> Result<(), StoreError> {
        let mut guard = self.premises.lock().expect("premise mutex poisoned");
        guard.insert(premise.id.clone(), premise);
        self.persist(&guard)
    }
}

/// Scoring configuration persisted as one JSON document. A missing file
/// falls back to the built-in rubric; the file appears on the first edit.
pub(crate) struct JsonFileConfigStore {
    path: PathBuf,
    config: Mutex<ScoringConfig>,
}

impl JsonFileConfigStore {
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigStoreError> {
        let path = path.into();
        let config = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|err| {
                ConfigStoreError::Corrupt(format!("{}: {err}", path.display()))
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => ScoringConfig::default(),
            Err(err) => {
                return Err(ConfigStoreError::Unavailable(format!(
                    "{}: {err}",
                    path.display()
                )))
            }
        };

        Ok(Self {
            path,
            config: Mutex::new(config),
        })
    }
}

impl ConfigStore for JsonFileConfigStore {
    fn read(&self) -> Result<ScoringConfig, ConfigStoreError> {
        Ok(self.config.lock().expect("config mutex poisoned").clone())
    }

    fn write(&self, config: ScoringConfig) -> Result<(), ConfigStoreError> {
        let mut guard = self.config.lock().expect("config mutex poisoned");
        let raw = serde_json::to_string_pretty(&config)
            .map_err(|err| ConfigStoreError::Corrupt(err.to_string()))?;
        ensure_parent_dir(&self.path).map_err(|err| {
            ConfigStoreError::Unavailable(format!("{}: {err}", self.path.display()))
        })?;
        std::fs::write(&self.path, raw).map_err(|err| {
            ConfigStoreError::Unavailable(format!("{}: {err}", self.path.display()))
        })?;
        *guard = config;
        Ok(())
    }
}

/// Backend selected at startup from `StoreConfig`, so the service stays a
/// single concrete type either way.
pub(crate) enum ApiPremiseStore {
    Memory(InMemoryPremiseStore),
    File(JsonFilePremiseStore),
}

impl PremiseStore for ApiPremiseStore {
    fn get(&self, id: &PremiseId) -> Result<Option<Premise>, StoreError> {
        match self {
            ApiPremiseStore::Memory(store) => store.get(id),
            ApiPremiseStore::File(store) => store.get(id),
        }
    }

    fn list(&self, filter: &PremiseFilter) -> Result<Vec<Premise>, StoreError> {
        match self {
            ApiPremiseStore::Memory(store) => store.list(filter),
            ApiPremiseStore::File(store) => store.list(filter),
        }
    }

    fn upsert(&self, premise: Premise) -> Result<(), StoreError> {
        match self {
            ApiPremiseStore::Memory(store) => store.upsert(premise),
            ApiPremiseStore::File(store) => store.upsert(premise),
        }
    }
}

pub(crate) enum ApiConfigStore {
    Memory(InMemoryConfigStore),
    File(JsonFileConfigStore),
}

impl ConfigStore for ApiConfigStore {
    fn read(&self) -> Result<ScoringConfig, ConfigStoreError> {
        match self {
            ApiConfigStore::Memory(store) => store.read(),
            ApiConfigStore::File(store) => store.read(),
        }
    }

    fn write(&self, config: ScoringConfig) -> Result<(), ConfigStoreError> {
        match self {
            ApiConfigStore::Memory(store) => store.write(config),
            ApiConfigStore::File(store) => store.write(config),
        }
    }
}

pub(crate) fn build_stores(
    config: &StoreConfig,
) -> Result<(ApiPremiseStore, ApiConfigStore), AppError> {
    let premises = match &config.premises_file {
        Some(path) => ApiPremiseStore::File(
            JsonFilePremiseStore::open(path.clone()).map_err(ServiceError::from)?,
        ),
        None => ApiPremiseStore::Memory(InMemoryPremiseStore::default()),
    };

    let configs = match &config.scoring_config_file {
        Some(path) => ApiConfigStore::File(
            JsonFileConfigStore::open(path.clone()).map_err(ServiceError::from)?,
        ),
        None => ApiConfigStore::Memory(InMemoryConfigStore::default()),
    };

    Ok((premises, configs))
}

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspekta::inspections::PremiseRegistration;

    fn scratch_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("inspekta-api-{}-{name}", std::process::id()));
        path
    }

    fn premise(id: &str, district: &str) -> Premise {
        Premise::from_registration(
            PremiseId(id.to_string()),
            PremiseRegistration {
                name: format!("{id} pharmacy"),
                category: "Pharmacy (Human)".to_string(),
                region: "Mtwara".to_string(),
                district: district.to_string(),
                location: "chuno street".to_string(),
                coordinates: None,
            },
        )
        .expect("valid registration")
    }

    #[test]
    fn file_premise_store_round_trips_records() {
        let path = scratch_path("premises-roundtrip.json");
        let _ = std::fs::remove_file(&path);

        let store = JsonFilePremiseStore::open(&path).expect("store opens on missing file");
        assert!(store
            .list(&PremiseFilter::default())
            .expect("empty listing")
            .is_empty());

        store
            .upsert(premise("premise-000901", "Masasi"))
            .expect("upsert persists");
        drop(store);

        let reopened = JsonFilePremiseStore::open(&path).expect("store reopens");
        let stored = reopened
            .get(&PremiseId("premise-000901".to_string()))
            .expect("get succeeds")
            .expect("record survived the reopen");
        assert_eq!(stored.district, "Masasi");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn file_premise_store_rejects_corrupt_files() {
        let path = scratch_path("premises-corrupt.json");
        std::fs::write(&path, "{ not json").expect("scratch file writes");

        let error = JsonFilePremiseStore::open(&path).expect_err("corrupt file rejected");
        assert!(matches!(error, StoreError::Corrupt(_)));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn file_config_store_defaults_then_persists_edits() {
        let path = scratch_path("scoring-config.json");
        let _ = std::fs::remove_file(&path);

        let store = JsonFileConfigStore::open(&path).expect("store opens on missing file");
        let mut config = store.read().expect("default rubric readable");
        assert_eq!(config.parameters["got"].intensity, 30);

        config
            .parameters
            .get_mut("got")
            .expect("got parameter present")
            .intensity = 45;
        store.write(config).expect("edit persists");
        drop(store);

        let reopened = JsonFileConfigStore::open(&path).expect("store reopens");
        assert_eq!(
            reopened.read().expect("rubric readable").parameters["got"].intensity,
            45
        );

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn build_stores_defaults_to_memory() {
        let (premises, configs) =
            build_stores(&StoreConfig::default()).expect("memory stores build");
        assert!(matches!(premises, ApiPremiseStore::Memory(_)));
        assert!(matches!(configs, ApiConfigStore::Memory(_)));
    }

    #[test]
    fn parse_date_trims_and_validates() {
        assert_eq!(
            parse_date(" 2023-07-14 "),
            Ok(NaiveDate::from_ymd_opt(2023, 7, 14).expect("valid date"))
        );
        assert!(parse_date("14/07/2023").is_err());
    }
}
