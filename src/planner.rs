//! Adaptive presentation planning.
//!
//! For each collapsible field the planner decides whether the value is uniform across the
//! subset (promoted to a summary fact, dropped from the detail table) or varies (kept as a
//! detail column, optionally with a distribution breakdown). The rules are configuration:
//! adding a collapsible field means adding a `CollapsibleRule`, not a new branch.

use crate::lookup::distinct_in_order;
use crate::models::{Cell, Column, Record, RecordTable};
use serde::Serialize;

/// Marker standing in for an absent last purchase line.
pub const NO_PURCHASE_LINE: &str = "Sin registro";

/// How one collapsible field is planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsibleRule {
    pub column: Column,
    /// Text used for absent cells. A field whose only value is this marker has no real
    /// value and is never collapsed.
    pub null_marker: Option<String>,
    /// Whether a varying field also gets a distribution breakdown.
    pub breakdown: bool,
}

/// Pipeline configuration: collapsible fields and detail-table layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub collapsible: Vec<CollapsibleRule>,
    /// Detail-table columns in display order. Collapsible columns sit at their anchor
    /// position and are rendered only when the plan keeps them.
    pub layout: Vec<Column>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            collapsible: vec![
                CollapsibleRule {
                    column: Column::Locality,
                    null_marker: None,
                    breakdown: true,
                },
                CollapsibleRule {
                    column: Column::LastPurchaseLine,
                    null_marker: Some(NO_PURCHASE_LINE.to_string()),
                    breakdown: false,
                },
            ],
            layout: vec![
                Column::Contract,
                Column::Locality,
                Column::LastPurchaseLine,
                Column::Subcategory,
                Column::Location,
                Column::AssignedQuota,
                Column::UsedQuota,
                Column::AvailableQuota,
            ],
        }
    }
}

impl PipelineConfig {
    fn rule(&self, column: Column) -> Option<&CollapsibleRule> {
        self.collapsible.iter().find(|r| r.column == column)
    }
}

/// A uniform field promoted out of the detail table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryFact {
    pub field: Column,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownEntry {
    pub label: String,
    pub count: usize,
    /// Share of the subset, percent with one decimal.
    pub percentage: f64,
}

/// Counts and shares of a varying field's distinct values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionBreakdown {
    pub field: Column,
    pub entries: Vec<BreakdownEntry>,
}

/// Decision for one collapsible field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDecision {
    pub field: Column,
    pub uniform: bool,
    /// The single value when uniform.
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PresentationPlan {
    pub decisions: Vec<FieldDecision>,
    pub summary_facts: Vec<SummaryFact>,
    pub breakdowns: Vec<DistributionBreakdown>,
    /// Detail-table columns, in display order.
    pub columns: Vec<Column>,
}

impl PresentationPlan {
    pub fn is_uniform(&self, field: Column) -> bool {
        self.decisions.iter().any(|d| d.field == field && d.uniform)
    }

    /// Project the subset onto the planned columns, rows in subset order.
    pub fn project(&self, subset: &[&Record], config: &PipelineConfig) -> Vec<Vec<Cell>> {
        subset
            .iter()
            .map(|record| {
                self.columns
                    .iter()
                    .map(|&column| cell(record, column, config))
                    .collect()
            })
            .collect()
    }
}

/// Plan the presentation of a non-empty subset.
///
/// Collapsible columns missing from the table are skipped entirely.
pub fn plan(subset: &[&Record], table: &RecordTable, config: &PipelineConfig) -> PresentationPlan {
    let mut plan = PresentationPlan::default();

    for rule in config.collapsible.iter().filter(|r| table.has(r.column)) {
        let values: Vec<&str> = subset.iter().map(|r| field_text(r, rule)).collect();
        let distinct = distinct_in_order(values.iter().copied());

        let uniform = match distinct.as_slice() {
            [only] => rule.null_marker.as_deref() != Some(*only),
            _ => false,
        };

        tracing::debug!(
            "Planning {:?}: {} distinct value(s), uniform: {}",
            rule.column,
            distinct.len(),
            uniform
        );

        if uniform {
            let value = distinct[0].to_string();
            plan.summary_facts.push(SummaryFact {
                field: rule.column,
                value: value.clone(),
            });
            plan.decisions.push(FieldDecision {
                field: rule.column,
                uniform: true,
                value: Some(value),
            });
            continue;
        }

        plan.decisions.push(FieldDecision {
            field: rule.column,
            uniform: false,
            value: None,
        });
        if rule.breakdown {
            plan.breakdowns.push(DistributionBreakdown {
                field: rule.column,
                entries: breakdown(&values),
            });
        }
    }

    plan.columns = config
        .layout
        .iter()
        .copied()
        .filter(|&column| table.has(column))
        .filter(|&column| !plan.is_uniform(column))
        .collect();

    plan
}

/// Occurrences of each value, descending by count, ties in first-seen order.
pub fn breakdown(values: &[&str]) -> Vec<BreakdownEntry> {
    let total = values.len();
    let mut entries: Vec<BreakdownEntry> = distinct_in_order(values.iter().copied())
        .into_iter()
        .map(|label| {
            let count = values.iter().filter(|v| **v == label).count();
            BreakdownEntry {
                label: label.to_string(),
                count,
                percentage: percentage(count, total),
            }
        })
        .collect();

    // stable: equal counts keep first-seen order
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 * 1000.0 / total as f64).round() / 10.0
}

fn field_text<'a>(record: &'a Record, rule: &'a CollapsibleRule) -> &'a str {
    match (record.text(rule.column), rule.null_marker.as_deref()) {
        (Some(text), _) => text,
        (None, Some(marker)) => marker,
        (None, None) => "",
    }
}

fn cell(record: &Record, column: Column, config: &PipelineConfig) -> Cell {
    if let Some(amount) = record.amount(column) {
        return Cell::Amount(amount.clone());
    }
    let text = match (record.text(column), config.rule(column)) {
        (Some(text), _) => text,
        (None, Some(rule)) => field_text(record, rule),
        (None, None) => "",
    };
    Cell::Text(text.to_string())
}
