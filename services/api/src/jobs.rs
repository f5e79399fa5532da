use crate::infra::build_stores;
use clap::Args;
use inspekta::config::AppConfig;
use inspekta::error::AppError;
use inspekta::inspections::{InspectionService, PremiseRegisterImporter};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Path to the CSV register export
    pub(crate) register: PathBuf,
    /// Override the configured premise file to import into
    #[arg(long)]
    pub(crate) premises: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RecalculateArgs {
    /// Override the configured premise file to recalculate
    #[arg(long)]
    pub(crate) premises: Option<PathBuf>,
    /// Override the configured scoring configuration file
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
}

pub(crate) fn run_import(mut args: ImportArgs) -> Result<(), AppError> {
    let mut app_config = AppConfig::load()?;
    if let Some(path) = args.premises.take() {
        app_config.stores.premises_file = Some(path);
    }

    let (premises, configs) = build_stores(&app_config.stores)?;
    let service = InspectionService::new(Arc::new(premises), Arc::new(configs));

    let summary = PremiseRegisterImporter::from_path(&args.register, &service)?;
    println!(
        "Imported {} of {} register rows ({} duplicates skipped)",
        summary.premises_registered, summary.rows_read, summary.duplicates_skipped
    );
    if app_config.stores.premises_file.is_none() {
        println!(
            "Warning: no premise file is configured, so the imported records were not persisted"
        );
    }

    Ok(())
}

pub(crate) fn run_recalculate(mut args: RecalculateArgs) -> Result<(), AppError> {
    let mut app_config = AppConfig::load()?;
    if let Some(path) = args.premises.take() {
        app_config.stores.premises_file = Some(path);
    }
    if let Some(path) = args.config.take() {
        app_config.stores.scoring_config_file = Some(path);
    }

    let (premises, configs) = build_stores(&app_config.stores)?;
    let service = InspectionService::new(Arc::new(premises), Arc::new(configs));

    let summary = service.recalculate()?;
    println!(
        "Recalculated {} premises ({} updated)",
        summary.premises_processed, summary.premises_updated
    );
    for failure in &summary.failures {
        println!(
            "- {} could not be persisted: {}",
            failure.premise, failure.reason
        );
    }
    if app_config.stores.premises_file.is_none() {
        println!("Warning: no premise file is configured, so the run covered an empty register");
    }

    Ok(())
}
