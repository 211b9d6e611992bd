use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::SchemaError;

/// One column of a vendor frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "lowercase")]
pub enum RawColumn {
    Int(Vec<i64>),
    Float(#[serde(with = "finite_or_null")] Vec<f64>),
}

/// JSON has no NaN; non-finite floats are stored as `null`.
mod finite_or_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|v| v.is_finite().then_some(*v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let values: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
        Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}

impl RawColumn {
    pub fn len(&self) -> usize {
        match self {
            RawColumn::Int(values) => values.len(),
            RawColumn::Float(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn float_at(&self, row: usize) -> Option<f64> {
        match self {
            RawColumn::Int(values) => values.get(row).map(|v| *v as f64),
            RawColumn::Float(values) => values.get(row).copied(),
        }
    }

    pub fn int_at(&self, row: usize) -> Option<i64> {
        match self {
            RawColumn::Int(values) => values.get(row).copied(),
            RawColumn::Float(values) => values
                .get(row)
                .filter(|v| v.is_finite() && v.fract() == 0.0)
                .map(|v| *v as i64),
        }
    }
}

/// Vendor-native columnar payload, exactly as a terminal returns it.
///
/// Column names are the vendor's. All columns have the same length; a frame
/// with zero rows is empty regardless of which columns it declares.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFrame {
    columns: BTreeMap<String, RawColumn>,
}

impl RawFrame {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_int(mut self, name: impl Into<String>, values: Vec<i64>) -> Self {
        self.columns.insert(name.into(), RawColumn::Int(values));
        self
    }

    pub fn with_float(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.columns.insert(name.into(), RawColumn::Float(values));
        self
    }

    pub fn column(&self, name: &str) -> Option<&RawColumn> {
        self.columns.get(name)
    }

    /// Number of rows (length of the longest column).
    pub fn len(&self) -> usize {
        self.columns.values().map(RawColumn::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks every column has the same number of rows.
    pub fn validate(&self) -> Result<usize, SchemaError> {
        let expected = self.len();
        for (name, column) in &self.columns {
            if column.len() != expected {
                return Err(SchemaError::LengthMismatch {
                    column: name.clone(),
                    expected,
                    actual: column.len(),
                });
            }
        }
        Ok(expected)
    }
}
