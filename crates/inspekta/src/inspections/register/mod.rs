//! Bulk premise-register import from CSV exports of the licensing office.

mod parser;

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::Serialize;

use crate::inspections::domain::PremiseRegistration;
use crate::inspections::service::{InspectionService, ServiceError};
use crate::inspections::store::{ConfigStore, PremiseStore};

#[derive(Debug)]
pub enum RegisterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Service(ServiceError),
}

impl std::fmt::Display for RegisterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegisterImportError::Io(err) => {
                write!(f, "failed to read premise register: {}", err)
            }
            RegisterImportError::Csv(err) => {
                write!(f, "invalid premise register CSV: {}", err)
            }
            RegisterImportError::Service(err) => {
                write!(f, "could not register premise from CSV row: {}", err)
            }
        }
    }
}

impl std::error::Error for RegisterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegisterImportError::Io(err) => Some(err),
            RegisterImportError::Csv(err) => Some(err),
            RegisterImportError::Service(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for RegisterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RegisterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<ServiceError> for RegisterImportError {
    fn from(err: ServiceError) -> Self {
        Self::Service(err)
    }
}

/// Counts reported after an import run.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterImportSummary {
    pub rows_read: usize,
    pub premises_registered: usize,
    pub duplicates_skipped: usize,
}

pub struct PremiseRegisterImporter;

impl PremiseRegisterImporter {
    pub fn from_path<P, S, C>(
        path: P,
        service: &InspectionService<S, C>,
    ) -> Result<RegisterImportSummary, RegisterImportError>
    where
        P: AsRef<Path>,
        S: PremiseStore + 'static,
        C: ConfigStore + 'static,
    {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, service)
    }

    /// Registers every row through the normal registration rules. A second
    /// row carrying the same name is skipped rather than double-entered;
    /// a row failing validation aborts the import.
    pub fn from_reader<R, S, C>(
        reader: R,
        service: &InspectionService<S, C>,
    ) -> Result<RegisterImportSummary, RegisterImportError>
    where
        R: Read,
        S: PremiseStore + 'static,
        C: ConfigStore + 'static,
    {
        let rows = parser::parse_rows(reader)?;
        let mut summary = RegisterImportSummary {
            rows_read: rows.len(),
            premises_registered: 0,
            duplicates_skipped: 0,
        };

        let mut seen: HashSet<String> = HashSet::new();
        for row in rows {
            if !seen.insert(row.name.trim().to_ascii_lowercase()) {
                summary.duplicates_skipped += 1;
                continue;
            }

            let coordinates = row.coordinates();
            service.register(PremiseRegistration {
                name: row.name,
                category: row.category,
                region: row.region,
                district: row.district,
                location: row.location,
                coordinates,
            })?;
            summary.premises_registered += 1;
        }

        Ok(summary)
    }
}
