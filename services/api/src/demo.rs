use crate::infra::{parse_date, InMemoryConfigStore, InMemoryPremiseStore};
use chrono::{Local, NaiveDate};
use clap::Args;
use inspekta::error::AppError;
use inspekta::inspections::{
    CohortScope, InspectionService, ObservationReceipt, ObservationSubmission, PeriodKind,
    PremiseFilter, PremiseRegisterImporter, PremiseRegistration, PremiseScoreView, ScoringConfig,
    ScoringConfigDraft,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Date stamped on the demo visits (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) visit_date: Option<NaiveDate>,
    /// Optional CSV register export to seed the demo premises.
    #[arg(long)]
    pub(crate) register_csv: Option<PathBuf>,
    /// Skip the retroactive rubric edit and bulk recalculation.
    #[arg(long)]
    pub(crate) skip_recalculation: bool,
}

type DemoService = InspectionService<InMemoryPremiseStore, InMemoryConfigStore>;

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        visit_date,
        register_csv,
        skip_recalculation,
    } = args;

    let visit_date = visit_date.unwrap_or_else(|| Local::now().date_naive());
    let service: DemoService = InspectionService::new(
        Arc::new(InMemoryPremiseStore::default()),
        Arc::new(InMemoryConfigStore::default()),
    );

    println!("Premise inspection scoring demo");
    seed_register(&service, register_csv)?;

    let register = service.premises(&PremiseFilter::default())?;
    println!("\nRegister ({} premises)", register.len());
    for view in &register {
        println!("- {} | {} | {}, {}", view.id, view.name, view.district, view.region);
    }
    if register.len() < 2 {
        println!("\nNeed at least two premises to demonstrate cohort ranking; stopping here.");
        return Ok(());
    }

    println!("\nRecording visits");
    let receipt = service.submit(
        &register[0].id,
        checklist_visit(visit_date, &["got", "personnel"]),
        CohortScope::District,
    )?;
    print_receipt(&receipt);

    let receipt = service.submit(
        &register[1].id,
        seizure_visit(visit_date, &["got", "unreg"]),
        CohortScope::District,
    )?;
    print_receipt(&receipt);

    let follow_up = visit_date + chrono::Duration::days(28);
    let receipt = service.submit(&register[0].id, clean_visit(follow_up), CohortScope::District)?;
    print_receipt(&receipt);

    print_standings(&service.premises(&PremiseFilter::default())?);

    println!("\nDistrict summary");
    for summary in service.district_report()? {
        println!(
            "- {}: {} premises, {} visits | total intensity {} | mean violation rate {:.2}% | max relative PVI {:.2}%",
            summary.district,
            summary.premises,
            summary.observations,
            summary.total_intensity,
            summary.mean_violation_rate,
            summary.max_relative_pvi
        );
    }

    println!("\nMonthly activity");
    for rollup in service.period_report(PeriodKind::Monthly)? {
        println!(
            "- {}: {} visits, {} defects found, total intensity {}",
            rollup.period, rollup.observations, rollup.defects_found, rollup.total_intensity
        );
    }

    if skip_recalculation {
        return Ok(());
    }

    println!("\nTightening the rubric: GOT Medicines intensity 30 -> 45");
    let rubric = service.scoring_config()?;
    match rubric_with_intensity(&rubric, "got", 45) {
        Some(draft) => {
            service.update_scoring_config(draft)?;
        }
        None => {
            println!("Rubric edit could not be encoded; keeping the current rubric.");
            return Ok(());
        }
    }

    let summary = service.recalculate()?;
    println!(
        "Recalculated {} premises ({} updated, {} failures)",
        summary.premises_processed,
        summary.premises_updated,
        summary.failures.len()
    );
    print_standings(&service.premises(&PremiseFilter::default())?);

    Ok(())
}

fn seed_register(service: &DemoService, register_csv: Option<PathBuf>) -> Result<(), AppError> {
    if let Some(path) = register_csv {
        let summary = PremiseRegisterImporter::from_path(path, service)?;
        println!(
            "Seeded {} premises from CSV ({} duplicate rows skipped)",
            summary.premises_registered, summary.duplicates_skipped
        );
        return Ok(());
    }

    let built_in = [
        ("mwenge pharmacy", "Pharmacy (Human)", "Masasi", "chuno street"),
        ("upendo duka la dawa", "DLDM (Human)", "Masasi", "sokoine road"),
        ("bomba road dispensing", "Pharmacy (Human)", "Mtwara DC", "bomba road"),
    ];
    for (name, category, district, location) in built_in {
        service.register(PremiseRegistration {
            name: name.to_string(),
            category: category.to_string(),
            region: "Mtwara".to_string(),
            district: district.to_string(),
            location: location.to_string(),
            coordinates: None,
        })?;
    }
    println!("Seeded {} built-in premises", built_in.len());

    Ok(())
}

fn checklist_visit(date: NaiveDate, flags: &[&str]) -> ObservationSubmission {
    ObservationSubmission {
        date,
        defect_flags: flags.iter().map(|flag| flag.to_string()).collect(),
        magnitudes: BTreeMap::new(),
        none_selected: false,
    }
}

fn seizure_visit(date: NaiveDate, flags: &[&str]) -> ObservationSubmission {
    let mut magnitudes = BTreeMap::new();
    magnitudes.insert("got".to_string(), json!("1,500,000 Tsh"));
    magnitudes.insert("dldmNotAllowed".to_string(), json!(250_000));
    ObservationSubmission {
        date,
        defect_flags: flags.iter().map(|flag| flag.to_string()).collect(),
        magnitudes,
        none_selected: false,
    }
}

fn clean_visit(date: NaiveDate) -> ObservationSubmission {
    ObservationSubmission {
        date,
        defect_flags: Default::default(),
        magnitudes: BTreeMap::new(),
        none_selected: true,
    }
}

fn print_receipt(receipt: &ObservationReceipt) {
    println!(
        "- {} visit {} | {} | intensity {} | PVI {:.2} raw, {:.2}% absolute | premise now at {:.2}% violation rate",
        receipt.premise_id,
        receipt.observation.date,
        receipt.observation.defect_labels.join(", "),
        receipt.observation.intensity,
        receipt.observation.pvi_raw,
        receipt.observation.absolute_pvi,
        receipt.scores.violation_rate
    );
}

fn print_standings(views: &[PremiseScoreView]) {
    println!("\nRegister standings");
    for view in views {
        println!(
            "- {} ({}) | {} visits | avg intensity {:.2} | avg absolute PVI {:.2}% | relative PVI {:.2}% | violation rate {:.2}% / relative {:.2}%",
            view.name,
            view.district,
            view.observation_count,
            view.scores.average_intensity,
            view.scores.average_absolute_pvi,
            view.scores.relative_pvi,
            view.scores.violation_rate,
            view.scores.relative_violation_rate
        );
    }
}

/// Re-encodes the stored rubric with one parameter's intensity changed.
/// Drafts carry loosely typed numbers, so the round trip goes through JSON.
fn rubric_with_intensity(
    config: &ScoringConfig,
    key: &str,
    intensity: u32,
) -> Option<ScoringConfigDraft> {
    let mut value = serde_json::to_value(config).ok()?;
    value["parameters"][key]["intensity"] = json!(intensity);
    serde_json::from_value(value).ok()
}
