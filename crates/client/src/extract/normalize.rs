//! Raw record normalization.
//!
//! Lenient per field: a numeric field that cannot be coerced is left as it
//! was and a warning is logged. The record is only rejected when it is
//! materialized and a required field is still missing or unconverted.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use standings_core::{RawRecord, RecordKind, StoreRecord, SummaryRecord, TeamRecord};

const CAPTURED_AT: &str = "captured_at";

/// A raw record that could not become a typed record.
#[derive(Debug, thiserror::Error)]
#[error("{kind:?} record rejected: {source}")]
pub struct NormalizeError {
    pub kind: RecordKind,
    #[source]
    pub source: serde_json::Error,
}

/// Integer value of a JSON scalar, if it has one.
fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

/// Finalizes raw records with one capture time shared by the whole run.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    captured_at: DateTime<Utc>,
}

impl Normalizer {
    pub fn new(captured_at: DateTime<Utc>) -> Self {
        Self { captured_at }
    }

    /// Trim strings, coerce numeric fields and stamp the capture time.
    pub fn clean(&self, raw: RawRecord) -> RawRecord {
        let RawRecord { kind, fields } = raw;
        let numeric = kind.numeric_fields();

        let mut fields: Map<String, Value> = fields
            .into_iter()
            .map(|(field, value)| match value {
                Value::String(s) => (field, Value::String(s.trim().to_string())),
                other => (field, other),
            })
            .collect();

        for field in numeric {
            let Some(value) = fields.get_mut(*field) else { continue };
            if value.is_null() || value.is_i64() {
                continue;
            }
            match coerce_int(value) {
                Some(n) => *value = Value::from(n),
                None => tracing::warn!(field, value = %value, "could not convert field to integer"),
            }
        }

        if is_blank(fields.get(CAPTURED_AT)) {
            fields.insert(
                CAPTURED_AT.to_string(),
                Value::String(self.captured_at.to_rfc3339_opts(SecondsFormat::Nanos, true)),
            );
        }

        RawRecord { kind, fields }
    }

    /// Materialize a cleaned record into its typed form.
    pub fn finalize(&self, raw: RawRecord) -> Result<StoreRecord, NormalizeError> {
        let kind = raw.kind;
        let value = Value::Object(raw.fields);
        let record = match kind {
            RecordKind::Team => serde_json::from_value::<TeamRecord>(value).map(StoreRecord::Team),
            RecordKind::Summary => serde_json::from_value::<SummaryRecord>(value).map(StoreRecord::Summary),
        };
        record.map_err(|source| NormalizeError { kind, source })
    }

    /// [`clean`](Self::clean) then [`finalize`](Self::finalize).
    pub fn normalize(&self, raw: RawRecord) -> Result<StoreRecord, NormalizeError> {
        self.finalize(self.clean(raw))
    }
}
