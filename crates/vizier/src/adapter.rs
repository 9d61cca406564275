// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::chart::ChartMode;
use crate::shape::{ShapeClassification, VALUE_KEY};

/// A row reshaped for rendering: the resolved category and value land under
/// the fixed `name`/`value` keys while every original field is preserved for
/// tooltip and detail views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalisedRecord {
    pub name: Value,
    pub value: Value,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Reshapes a result set for the selected mode. Pure and idempotent: the only
/// per-row state is the stable positional index.
///
/// Pie mode drops rows whose resolved value is not strictly positive, since a
/// zero or negative slice has no visual meaning. Other graphical modes coerce
/// the value to a number, defaulting to zero. Table mode passes raw values
/// through unmodified, nulls included.
pub fn adapt(
    rows: &[Value],
    classification: &ShapeClassification,
    mode: ChartMode,
) -> Vec<NormalisedRecord> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| adapt_row(index, row, classification, mode))
        .collect()
}

fn adapt_row(
    index: usize,
    row: &Value,
    classification: &ShapeClassification,
    mode: ChartMode,
) -> Option<NormalisedRecord> {
    let (fields, name, raw_value) = match row.as_object() {
        Some(obj) => {
            let name = classification
                .category_field
                .as_deref()
                .and_then(|field| obj.get(field))
                .cloned()
                .unwrap_or_else(|| Value::from(index));
            let raw_value = classification
                .value_field
                .as_deref()
                .and_then(|field| obj.get(field))
                .cloned()
                .unwrap_or(Value::Null);
            (obj.clone(), name, raw_value)
        }
        None => {
            // Bare scalar: the positional index plays the category role.
            let mut fields = Map::new();
            fields.insert(VALUE_KEY.to_string(), row.clone());
            (fields, Value::from(index), row.clone())
        }
    };

    let value = match mode {
        ChartMode::Table => raw_value,
        ChartMode::Pie => {
            let numeric = coerce_numeric(&raw_value);
            if numeric <= 0.0 {
                return None;
            }
            Value::from(numeric)
        }
        _ => Value::from(coerce_numeric(&raw_value)),
    };

    Some(NormalisedRecord {
        name,
        value,
        fields,
    })
}

/// Permissive numeric read: finite numbers pass through, numeric strings are
/// parsed, booleans count as 0/1, everything else resolves to zero.
pub(crate) fn coerce_numeric(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}
