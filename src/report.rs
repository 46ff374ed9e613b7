/// Result assembly and the lookup pipeline entry point
///
/// query → normalize → lookup → (NotFound) → locality filter → (EmptySelection)
/// → aggregate + plan → assembled report.
///
/// Every call starts from scratch; nothing survives between requests.
use crate::aggregate::{aggregate, Metrics};
use crate::lookup::{filter_by_locality, locality_options, lookup, LocalitySelection};
use crate::models::{Cell, Column, Record, RecordTable};
use crate::normalize::{normalize_identifier, normalize_phone};
use crate::planner::{plan, DistributionBreakdown, PipelineConfig, SummaryFact};
use serde::Serialize;

/// Shown when a customer has no segment on record.
pub const SEGMENT_NOT_REGISTERED: &str = "Sin segmento";

/// Customer profile, taken from the first matched record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerProfile {
    pub identifier: String,
    pub name: String,
    pub phone: String,
    pub segment: String,
}

impl CustomerProfile {
    fn from_record(identifier: &str, record: &Record) -> Self {
        Self {
            identifier: identifier.to_string(),
            name: record.subscriber_name.clone(),
            phone: normalize_phone(record.last_phone.as_deref()),
            segment: record
                .segment
                .clone()
                .unwrap_or_else(|| SEGMENT_NOT_REGISTERED.to_string()),
        }
    }
}

/// Full view of one customer under the current locality selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerReport {
    pub profile: CustomerProfile,
    pub locality_options: Vec<String>,
    pub metrics: Metrics,
    pub summary_facts: Vec<SummaryFact>,
    pub breakdowns: Vec<DistributionBreakdown>,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

/// Outcome of one lookup request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupOutcome {
    /// The identifier matched no record.
    NotFound { identifier: String },
    /// The customer exists but the locality selection left nothing to show.
    EmptySelection {
        profile: CustomerProfile,
        locality_options: Vec<String>,
    },
    Found(CustomerReport),
}

impl LookupOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found(_))
    }
}

/// Look up a customer and assemble the presentation-ready result.
pub fn lookup_customer(
    table: &RecordTable,
    config: &PipelineConfig,
    query: &str,
    selection: &LocalitySelection,
) -> LookupOutcome {
    let identifier = normalize_identifier(query);
    let matched = lookup(table.records(), identifier);

    let Some(first) = matched.first() else {
        tracing::info!("Identifier {} not found", identifier);
        return LookupOutcome::NotFound {
            identifier: identifier.to_string(),
        };
    };

    let profile = CustomerProfile::from_record(identifier, first);

    // without a locality column there is nothing to select on
    let (locality_options, subset) = if table.has(Column::Locality) {
        (
            locality_options(&matched),
            filter_by_locality(&matched, selection),
        )
    } else {
        (Vec::new(), matched.clone())
    };

    if subset.is_empty() {
        tracing::info!(
            "Identifier {}: {} record(s), none in selected localities",
            identifier,
            matched.len()
        );
        return LookupOutcome::EmptySelection {
            profile,
            locality_options,
        };
    }

    let metrics = Metrics::from_aggregate(aggregate(&subset), table);
    let presentation = plan(&subset, table, config);
    let rows = presentation.project(&subset, config);

    tracing::info!(
        "Identifier {}: {} of {} record(s) selected, {} summary fact(s), {} detail column(s)",
        identifier,
        subset.len(),
        matched.len(),
        presentation.summary_facts.len(),
        presentation.columns.len()
    );

    LookupOutcome::Found(CustomerReport {
        profile,
        locality_options,
        metrics,
        summary_facts: presentation.summary_facts,
        breakdowns: presentation.breakdowns,
        columns: presentation.columns,
        rows,
    })
}
