mod periods;
mod summary;

pub use periods::{fiscal_year, period_label, PeriodKind};
pub use summary::{district_summaries, period_rollups, DistrictSummary, PeriodRollup};
