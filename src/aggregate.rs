use crate::models::{Column, Record, RecordTable};
use bigdecimal::{BigDecimal, Zero};
use serde::Serialize;

/// Count and quota sums over a customer subset.
///
/// No rounding happens here; formatting is left to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    pub count: usize,
    pub sum_assigned: BigDecimal,
    pub sum_used: BigDecimal,
    pub sum_available: BigDecimal,
}

impl Aggregate {
    /// Merge two aggregates of disjoint subsets.
    pub fn merge(self, other: Aggregate) -> Aggregate {
        Aggregate {
            count: self.count + other.count,
            sum_assigned: self.sum_assigned + other.sum_assigned,
            sum_used: self.sum_used + other.sum_used,
            sum_available: self.sum_available + other.sum_available,
        }
    }
}

pub fn aggregate(subset: &[&Record]) -> Aggregate {
    Aggregate {
        count: subset.len(),
        sum_assigned: subset.iter().map(|r| &r.assigned_quota).sum(),
        sum_used: subset.iter().map(|r| &r.used_quota).sum(),
        sum_available: subset.iter().map(|r| &r.available_quota).sum(),
    }
}

/// A sum metric with its display decision applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub value: BigDecimal,
    /// Whether the presentation layer should show this metric.
    pub displayed: bool,
}

/// Metrics as handed to the presentation layer.
///
/// A sum whose source column is missing from the table is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub count: usize,
    pub assigned: Option<Metric>,
    pub used: Option<Metric>,
    pub available: Option<Metric>,
}

impl Metrics {
    /// Apply the display policy: assigned and used are shown only when strictly
    /// positive, available is always shown, count is always shown.
    pub fn from_aggregate(aggregate: Aggregate, table: &RecordTable) -> Self {
        let positive_only = |value: BigDecimal| {
            let displayed = value > BigDecimal::zero();
            Metric { value, displayed }
        };

        Metrics {
            count: aggregate.count,
            assigned: table
                .has(Column::AssignedQuota)
                .then(|| positive_only(aggregate.sum_assigned)),
            used: table
                .has(Column::UsedQuota)
                .then(|| positive_only(aggregate.sum_used)),
            available: table.has(Column::AvailableQuota).then(|| Metric {
                value: aggregate.sum_available,
                displayed: true,
            }),
        }
    }
}
