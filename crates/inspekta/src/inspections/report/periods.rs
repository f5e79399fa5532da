use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Reporting granularities offered by the period rollup. The inspectorate's
/// fiscal year starts in July.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    BiWeekly,
    #[default]
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl PeriodKind {
    pub const fn label(self) -> &'static str {
        match self {
            PeriodKind::BiWeekly => "biweekly",
            PeriodKind::Monthly => "monthly",
            PeriodKind::Quarterly => "quarterly",
            PeriodKind::SemiAnnual => "semiannual",
            PeriodKind::Annual => "annual",
        }
    }
}

/// Fiscal year a date falls in; July through June, named for its opening
/// calendar year.
pub fn fiscal_year(date: NaiveDate) -> i32 {
    if date.month() >= 7 {
        date.year()
    } else {
        date.year() - 1
    }
}

/// Reporting-period label for a date, e.g. `2023-M09`, `2023-Q2`,
/// `2023-BW09-2`, `2023-H1`, `2023-Annual`.
pub fn period_label(date: NaiveDate, kind: PeriodKind) -> String {
    let fy = fiscal_year(date);
    match kind {
        PeriodKind::BiWeekly => {
            let half = if date.day() <= 15 { 1 } else { 2 };
            format!("{fy}-BW{:02}-{half}", date.month())
        }
        PeriodKind::Monthly => format!("{fy}-M{:02}", date.month()),
        PeriodKind::Quarterly => format!("{fy}-Q{}", fiscal_quarter(date)),
        PeriodKind::SemiAnnual => {
            let half = if fiscal_quarter(date) <= 2 { 1 } else { 2 };
            format!("{fy}-H{half}")
        }
        PeriodKind::Annual => format!("{fy}-Annual"),
    }
}

// July is fiscal month 1; the +5 avoids signed month arithmetic.
fn fiscal_quarter(date: NaiveDate) -> u32 {
    let fiscal_month = ((date.month() + 5) % 12) + 1;
    (fiscal_month - 1) / 3 + 1
}
