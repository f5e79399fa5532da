use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use inspekta::inspections::{
    ConfigStore, ConfigStoreError, InspectionService, ObservationSubmission, Premise,
    PremiseFilter, PremiseId, PremiseRegistration, PremiseStore, ScoringConfig, StoreError,
};

#[derive(Default)]
pub struct MemoryPremiseStore {
    premises: Mutex<BTreeMap<PremiseId, Premise>>,
}

impl PremiseStore for MemoryPremiseStore {
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

pub struct MemoryConfigStore {
    config: Mutex<ScoringConfig>,
}

impl Default for MemoryConfigStore {
    fn default() -> Self {
        Self {
            config: Mutex::new(ScoringConfig::default()),
        }
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

pub fn service() -> InspectionService<MemoryPremiseStore, MemoryConfigStore> {
    InspectionService::new(
        Arc::new(MemoryPremiseStore::default()),
        Arc::new(MemoryConfigStore::default()),
    )
}

pub fn visit_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn pharmacy(name: &str, district: &str) -> PremiseRegistration {
    PremiseRegistration {
        name: name.to_string(),
        category: "Pharmacy (Human)".to_string(),
        region: "Mtwara".to_string(),
        district: district.to_string(),
        location: "market street".to_string(),
        coordinates: None,
    }
}

pub fn checklist_visit(visit: NaiveDate, flags: &[&str]) -> ObservationSubmission {
    ObservationSubmission {
        date: visit,
        defect_flags: flags.iter().map(|flag| flag.to_string()).collect(),
        magnitudes: BTreeMap::new(),
        none_selected: false,
    }
}

pub fn clean_visit(visit: NaiveDate) -> ObservationSubmission {
    ObservationSubmission {
        date: visit,
        defect_flags: Default::default(),
        magnitudes: BTreeMap::new(),
        none_selected: true,
    }
}

pub fn seizure_visit(
    visit: NaiveDate,
    category: &str,
    amount: u64,
) -> ObservationSubmission {
    let mut magnitudes = BTreeMap::new();
    magnitudes.insert(category.to_string(), serde_json::json!(amount));
    ObservationSubmission {
        date: visit,
        defect_flags: Default::default(),
        magnitudes,
        none_selected: false,
    }
}
