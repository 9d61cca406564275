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

use serde_json::Value;

use crate::shape::ResultSet;

/// Turns a decoded `data` payload into a result set. Anything that is not an
/// ordered sequence counts as empty: availability wins over strictness.
pub fn sanitise_rows(data: Value) -> ResultSet {
    match data {
        Value::Array(rows) => rows.into_iter().map(sanitise).collect(),
        _ => Vec::new(),
    }
}

/// Deep-cleans a JSON value: non-finite numbers become null so that every
/// retained number is safe for rendering arithmetic.
pub fn sanitise(value: Value) -> Value {
    match value {
        Value::Number(n) => {
            if n.as_f64().is_some_and(|v| !v.is_finite()) {
                Value::Null
            } else {
                Value::Number(n)
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sanitise).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| (key, sanitise(value)))
                .collect(),
        ),
        other => other,
    }
}

/// Unwraps generated SQL from markdown code fences for display.
pub fn strip_sql_fences(sql: &str) -> String {
    sql.replace("```sql", "").replace("```", "").trim().to_string()
}
