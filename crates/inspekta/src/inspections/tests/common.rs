use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::inspections::domain::{
    ObservationSubmission, Premise, PremiseFilter, PremiseId, PremiseRegistration,
};
use crate::inspections::scoring::{
    CategoryWeight, ParameterSpec, ScoringConfig, ViolationBlend,
};
use crate::inspections::store::{
    ConfigStore, ConfigStoreError, PremiseStore, StoreError,
};
use crate::inspections::{inspection_router, InspectionService};

/// Minimal rubric used across the suite: two checklist flags worth 30
/// intensity each, one monetary category at 50% weight with a 1000 ceiling.
pub(crate) fn test_config() -> ScoringConfig {
    let mut parameters = BTreeMap::new();
    parameters.insert(
        "got".to_string(),
        ParameterSpec {
            label: "GOT Medicines".to_string(),
            intensity: 30,
        },
    );
    parameters.insert(
        "unreg".to_string(),
        ParameterSpec {
            label: "Unregistered Medicines".to_string(),
            intensity: 30,
        },
    );

    let mut weights = BTreeMap::new();
    weights.insert(
        "got".to_string(),
        CategoryWeight {
            weight: 50,
            policy_max: 1000,
        },
    );

    ScoringConfig {
        parameters,
        weights,
        violation_blend: ViolationBlend {
            non_conformance: 60,
            pvi: 40,
        },
    }
}

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(crate) fn registration(name: &str, district: &str) -> PremiseRegistration {
    PremiseRegistration {
        name: name.to_string(),
        category: "Pharmacy (Human)".to_string(),
        region: "Mtwara".to_string(),
        district: district.to_string(),
        location: "chuno street".to_string(),
        coordinates: None,
    }
}

pub(crate) fn flag_submission(visit: NaiveDate, flags: &[&str]) -> ObservationSubmission {
    ObservationSubmission {
        date: visit,
        defect_flags: flags.iter().map(|flag| flag.to_string()).collect(),
        magnitudes: BTreeMap::new(),
        none_selected: false,
    }
}

pub(crate) fn none_submission(visit: NaiveDate) -> ObservationSubmission {
    ObservationSubmission {
        date: visit,
        defect_flags: Default::default(),
        magnitudes: BTreeMap::new(),
        none_selected: true,
    }
}

pub(crate) fn magnitude_submission(
    visit: NaiveDate,
    category: &str,
    raw: Value,
) -> ObservationSubmission {
    let mut magnitudes = BTreeMap::new();
    magnitudes.insert(category.to_string(), raw);
    ObservationSubmission {
        date: visit,
        defect_flags: Default::default(),
        magnitudes,
        none_selected: false,
    }
}

#[derive(Default)]
pub(crate) struct MemoryPremiseStore {
    premises: Mutex<BTreeMap<PremiseId, Premise>>,
}

impl MemoryPremiseStore {
    pub(crate) fn stored(&self, id: &PremiseId) -> Option<Premise> {
        self.premises
            .lock()
            .expect("premise mutex poisoned")
            .get(id)
            .cloned()
    }
}

impl PremiseStore for MemoryPremiseStore {
    fn get(&self, id: &PremiseId) -> Result<Option<Premise>, StoreError> {
        Ok(self.stored(id))
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

pub(crate) struct MemoryConfigStore {
    config: Mutex<ScoringConfig>,
}

impl MemoryConfigStore {
    pub(crate) fn new(config: ScoringConfig) -> Self {
        Self {
            config: Mutex::new(config),
        }
    }
}

impl Default for MemoryConfigStore {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl ConfigStore for MemoryConfigStore {
    fn read(&self) -> Result<ScoringConfig, ConfigStoreError> {
        Ok(self.config.lock().expect("config mutex poisoned").clone())
    }

    fn write(&self, config: ScoringConfig) -> Result<(), ConfigStoreError> {
        *self.config.lock().expect("config mutex poisoned") = config;
        Ok(())
    }
}

/// Premise store that refuses every operation.
pub(crate) struct UnavailablePremiseStore;

impl PremiseStore for UnavailablePremiseStore {
    fn get(&self, _id: &PremiseId) -> Result<Option<Premise>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _filter: &PremiseFilter) -> Result<Vec<Premise>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn upsert(&self, _premise: Premise) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

/// Store that fails to persist exactly one premise, for partial-failure
/// paths.
pub(crate) struct FailingUpsertStore {
    pub(crate) inner: MemoryPremiseStore,
    pub(crate) fail_for: PremiseId,
}

impl PremiseStore for FailingUpsertStore {
    fn get(&self, id: &PremiseId) -> Result<Option<Premise>, StoreError> {
        self.inner.get(id)
    }

    fn list(&self, filter: &PremiseFilter) -> Result<Vec<Premise>, StoreError> {
        self.inner.list(filter)
    }

    fn upsert(&self, premise: Premise) -> Result<(), StoreError> {
        if premise.id == self.fail_for {
            return Err(StoreError::Unavailable("disk full".to_string()));
        }
        self.inner.upsert(premise)
    }
}

pub(crate) fn memory_service() -> InspectionService<MemoryPremiseStore, MemoryConfigStore> {
    InspectionService::new(
        Arc::new(MemoryPremiseStore::default()),
        Arc::new(MemoryConfigStore::new(test_config())),
    )
}

pub(crate) fn build_service() -> (
    InspectionService<MemoryPremiseStore, MemoryConfigStore>,
    Arc<MemoryPremiseStore>,
    Arc<MemoryConfigStore>,
) {
    let premises = Arc::new(MemoryPremiseStore::default());
    let configs = Arc::new(MemoryConfigStore::new(test_config()));
    let service = InspectionService::new(premises.clone(), configs.clone());
    (service, premises, configs)
}

pub(crate) fn router_with_service(
    service: InspectionService<MemoryPremiseStore, MemoryConfigStore>,
) -> axum::Router {
    inspection_router(Arc::new(service))
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 65536)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
