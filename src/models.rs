use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

// ============ Dataset Schema ============

/// A column of the contracts dataset.
///
/// Declaration order is the canonical column order; `BTreeSet<Column>` iterates in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Column {
    /// Customer key (cédula). Not unique per row.
    Identifier,
    SubscriberName,
    LastPhone,
    Segment,
    Locality,
    Subcategory,
    Location,
    LastPurchaseLine,
    Contract,
    AssignedQuota,
    UsedQuota,
    AvailableQuota,
}

impl Column {
    pub const ALL: [Column; 12] = [
        Column::Identifier,
        Column::SubscriberName,
        Column::LastPhone,
        Column::Segment,
        Column::Locality,
        Column::Subcategory,
        Column::Location,
        Column::LastPurchaseLine,
        Column::Contract,
        Column::AssignedQuota,
        Column::UsedQuota,
        Column::AvailableQuota,
    ];

    /// Header of this column in the source workbook / table.
    pub fn source_name(self) -> &'static str {
        match self {
            Column::Identifier => "Identificacion",
            Column::SubscriberName => "NombreSuscriptor",
            Column::LastPhone => "UltimoTelefono",
            Column::Segment => "Segmento",
            Column::Locality => "Localidad",
            Column::Subcategory => "Subcategoria",
            Column::Location => "Ubicacion",
            Column::LastPurchaseLine => "UltimaLineaCompra",
            Column::Contract => "Contrato",
            Column::AssignedQuota => "CupoAsignado",
            Column::UsedQuota => "CupoUtilizado",
            Column::AvailableQuota => "CupoDisponible",
        }
    }

    /// Whether the column holds a quota amount rather than text.
    pub fn is_amount(self) -> bool {
        matches!(
            self,
            Column::AssignedQuota | Column::UsedQuota | Column::AvailableQuota
        )
    }
}

// ============ Records ============

/// One contract/property line of the dataset.
///
/// Cells of columns missing from the source are empty (text), `None` (optional text)
/// or zero (amounts); `RecordTable::has` tells them apart from real empty values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub identifier: String,
    pub subscriber_name: String,
    /// Raw phone, possibly carrying a `.0` float artifact.
    pub last_phone: Option<String>,
    pub segment: Option<String>,
    pub locality: String,
    pub subcategory: String,
    pub location: String,
    pub last_purchase_line: Option<String>,
    pub contract: String,
    pub assigned_quota: BigDecimal,
    pub used_quota: BigDecimal,
    pub available_quota: BigDecimal,
}

impl Record {
    /// Text value of a column, `None` for absent optional cells and for amount columns.
    pub fn text(&self, column: Column) -> Option<&str> {
        match column {
            Column::Identifier => Some(&self.identifier),
            Column::SubscriberName => Some(&self.subscriber_name),
            Column::LastPhone => self.last_phone.as_deref(),
            Column::Segment => self.segment.as_deref(),
            Column::Locality => Some(&self.locality),
            Column::Subcategory => Some(&self.subcategory),
            Column::Location => Some(&self.location),
            Column::LastPurchaseLine => self.last_purchase_line.as_deref(),
            Column::Contract => Some(&self.contract),
            Column::AssignedQuota | Column::UsedQuota | Column::AvailableQuota => None,
        }
    }

    /// Amount value of a quota column.
    pub fn amount(&self, column: Column) -> Option<&BigDecimal> {
        match column {
            Column::AssignedQuota => Some(&self.assigned_quota),
            Column::UsedQuota => Some(&self.used_quota),
            Column::AvailableQuota => Some(&self.available_quota),
            _ => None,
        }
    }
}

/// A cell of the detail-table projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Amount(BigDecimal),
}

// ============ Loaded Table ============

/// Immutable in-memory snapshot of the dataset.
///
/// Built once by the loader and shared read-only (`Arc<RecordTable>`) with every request.
#[derive(Debug, Clone)]
pub struct RecordTable {
    columns: BTreeSet<Column>,
    records: Vec<Record>,
    /// Human-readable origin (file path or `postgres:<table>`).
    pub source: String,
    /// SHA-256 (hex) over the loaded rows.
    pub fingerprint: String,
    pub loaded_at: DateTime<Utc>,
}

impl RecordTable {
    pub fn new(
        columns: impl IntoIterator<Item = Column>,
        records: Vec<Record>,
        source: impl Into<String>,
    ) -> Self {
        let fingerprint = fingerprint(&records);
        Self {
            columns: columns.into_iter().collect(),
            records,
            source: source.into(),
            fingerprint,
            loaded_at: Utc::now(),
        }
    }

    /// Table with every column present. Mostly useful for tests and fixtures.
    pub fn with_all_columns(records: Vec<Record>) -> Self {
        Self::new(Column::ALL, records, "memory")
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the source carried this column.
    pub fn has(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Present columns in canonical order.
    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.columns.iter().copied()
    }

    /// Expected columns the source did not carry.
    pub fn missing_columns(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|c| !self.columns.contains(c))
            .collect()
    }
}

fn fingerprint(records: &[Record]) -> String {
    let mut hasher = Sha256::new();
    for record in records {
        for column in Column::ALL {
            match (record.text(column), record.amount(column)) {
                (Some(text), _) => hasher.update(text.as_bytes()),
                (None, Some(amount)) => hasher.update(amount.normalized().to_string().as_bytes()),
                (None, None) => {}
            }
            hasher.update([0x1f]);
        }
        hasher.update([0x1e]);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(identifier: &str, locality: &str) -> Record {
        Record {
            identifier: identifier.to_string(),
            locality: locality.to_string(),
            ..Record::default()
        }
    }

    #[test]
    fn test_missing_columns_reported_in_canonical_order() {
        let table = RecordTable::new(
            [Column::Identifier, Column::Contract, Column::Locality],
            vec![],
            "memory",
        );

        assert!(table.has(Column::Locality));
        assert!(!table.has(Column::Segment));
        assert_eq!(
            table.columns().collect::<Vec<_>>(),
            vec![Column::Identifier, Column::Locality, Column::Contract]
        );
        assert_eq!(table.missing_columns().len(), 9);
        assert_eq!(table.missing_columns()[0], Column::SubscriberName);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = RecordTable::with_all_columns(vec![record("1", "Bogota")]);
        let b = RecordTable::with_all_columns(vec![record("1", "Bogota")]);
        let c = RecordTable::with_all_columns(vec![record("1", "Cali")]);

        assert_eq!(a.fingerprint, b.fingerprint);
        assert_ne!(a.fingerprint, c.fingerprint);
        assert_eq!(a.fingerprint.len(), 64);
    }

    #[test]
    fn test_amount_columns_have_no_text() {
        let r = record("1", "Bogota");
        assert_eq!(r.text(Column::AssignedQuota), None);
        assert!(r.amount(Column::AssignedQuota).is_some());
        assert_eq!(r.amount(Column::Locality), None);
        assert!(Column::UsedQuota.is_amount());
        assert!(!Column::Contract.is_amount());
    }
}
