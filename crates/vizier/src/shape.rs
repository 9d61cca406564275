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

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The tabular output of one query execution: an ordered sequence of rows,
/// each either a flat object of scalars or a bare scalar.
pub type ResultSet = Vec<Value>;

/// Synthetic category key assigned to bare-scalar rows.
pub const INDEX_KEY: &str = "index";
/// Synthetic value key assigned when a record has fewer than two fields.
pub const VALUE_KEY: &str = "value";

static CATEGORY_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)name|label|category|month|date|day|time|index|^x$")
        .expect("category field pattern")
});

static VALUE_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)value|amount|count|total|sum|price|revenue|number|^y$")
        .expect("value field pattern")
});

/// Structural category of a result set. Every row sequence falls into exactly
/// one of these; unrecognised element types degrade to `Scalars` so that the
/// index/value pairing still applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultShape {
    Empty,
    Scalars,
    Records,
}

/// Derived, ephemeral description of one result set. Recomputed from scratch
/// for every new result set and never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeClassification {
    pub shape: ResultShape,
    pub record_count: usize,
    pub field_names: Vec<String>,
    pub category_field: Option<String>,
    pub value_field: Option<String>,
    pub numeric_field_count: usize,
}

impl ShapeClassification {
    fn empty() -> Self {
        Self {
            shape: ResultShape::Empty,
            record_count: 0,
            field_names: Vec::new(),
            category_field: None,
            value_field: None,
            numeric_field_count: 0,
        }
    }
}

/// Classifies a result set. Total over all inputs: empty sets, bare scalars,
/// non-uniform records and outright malformed rows all map to a defined
/// classification rather than an error.
pub fn classify(rows: &[Value]) -> ShapeClassification {
    let Some(first) = rows.first() else {
        return ShapeClassification::empty();
    };

    if !first.is_object() {
        return ShapeClassification {
            shape: ResultShape::Scalars,
            record_count: rows.len(),
            field_names: vec![INDEX_KEY.to_string(), VALUE_KEY.to_string()],
            category_field: Some(INDEX_KEY.to_string()),
            value_field: Some(VALUE_KEY.to_string()),
            numeric_field_count: usize::from(is_finite_number(first)),
        };
    }

    let field_names = collect_field_names(rows);
    let category_field = assign_category_field(&field_names);
    let value_field = assign_value_field(&field_names, category_field.as_deref());

    let numeric_field_count = first
        .as_object()
        .map(|obj| {
            field_names
                .iter()
                .filter(|name| obj.get(name.as_str()).is_some_and(is_finite_number))
                .count()
        })
        .unwrap_or(0);

    ShapeClassification {
        shape: ResultShape::Records,
        record_count: rows.len(),
        field_names,
        category_field,
        value_field,
        numeric_field_count,
    }
}

/// Distinct field names in order of first appearance, across all rows so that
/// records with mismatched field sets still contribute their columns.
fn collect_field_names(rows: &[Value]) -> Vec<String> {
    let mut names = Vec::new();
    for row in rows {
        if let Some(obj) = row.as_object() {
            for key in obj.keys() {
                if !names.iter().any(|n| n == key) {
                    names.push(key.clone());
                }
            }
        }
    }
    names
}

fn assign_category_field(field_names: &[String]) -> Option<String> {
    field_names
        .iter()
        .find(|name| CATEGORY_FIELD.is_match(name))
        .or_else(|| field_names.first())
        .cloned()
}

fn assign_value_field(field_names: &[String], category_field: Option<&str>) -> Option<String> {
    let candidates: Vec<&String> = field_names
        .iter()
        .filter(|name| Some(name.as_str()) != category_field)
        .collect();

    candidates
        .iter()
        .find(|name| VALUE_FIELD.is_match(name))
        .or_else(|| candidates.first())
        .map(|name| name.to_string())
        .or_else(|| {
            if field_names.is_empty() {
                None
            } else {
                Some(VALUE_KEY.to_string())
            }
        })
}

pub(crate) fn is_finite_number(value: &Value) -> bool {
    value.as_f64().is_some_and(f64::is_finite)
}
