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

use crate::adapter::coerce_numeric;

pub const NO_RESULTS_MESSAGE: &str = "No results found for your query.";

const EXAMPLE_SNIPPET_LIMIT: usize = 120;

/// Composes a best-effort narrative for a result set, used only when the
/// upstream service supplied none. Keyword branches are checked in order;
/// all field reads tolerate missing or malformed records.
pub fn compose(question: &str, rows: &[Value]) -> String {
    let q = question.to_lowercase();

    if (q.contains("sales") || q.contains("revenue")) && !rows.is_empty() {
        let values: Vec<f64> = rows.iter().map(sales_metric).collect();
        let total: f64 = values.iter().sum();
        let peak = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        return format!(
            "Sales summary — total: {total:.2}, peak: {peak:.2}, records: {}.",
            rows.len()
        );
    }

    if (q.contains("customer") || q.contains("user")) && !rows.is_empty() {
        let first = &rows[0];
        if let Some(count) = first.get("total_customers") {
            return format!("Total customers: {}", display_value(count));
        }
        return format!(
            "Customer dataset — {} rows. Example: {}",
            rows.len(),
            example_snippet(first)
        );
    }

    if q.contains("product") && !rows.is_empty() {
        let top = &rows[0];
        let name = top
            .get("product_name")
            .or_else(|| top.get("name"))
            .map(display_value)
            .unwrap_or_else(|| "N/A".to_string());
        return format!(
            "Product snapshot — {} rows. Top product: {name}",
            rows.len()
        );
    }

    if !rows.is_empty() {
        return format!("Query executed — {} rows returned.", rows.len());
    }

    NO_RESULTS_MESSAGE.to_string()
}

/// Best-effort per-row sales figure: the conventional aggregate columns are
/// tried first, then the first numeric field, then the row itself for bare
/// scalars. Anything else counts as zero.
fn sales_metric(row: &Value) -> f64 {
    for key in ["total_sales", "total_revenue", "amount"] {
        if let Some(value) = row.get(key) {
            return coerce_numeric(value);
        }
    }
    if let Some(obj) = row.as_object() {
        for value in obj.values() {
            if value.is_number() {
                return coerce_numeric(value);
            }
        }
        return 0.0;
    }
    coerce_numeric(row)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn example_snippet(row: &Value) -> String {
    let rendered = row.to_string();
    rendered.chars().take(EXAMPLE_SNIPPET_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sales_branch_reports_total_and_peak() {
        let rows = vec![
            json!({"month": "Jan", "revenue": 100}),
            json!({"month": "Feb", "revenue": 150}),
        ];
        let text = compose("show sales trends for the last quarter", &rows);
        assert_eq!(text, "Sales summary — total: 250.00, peak: 150.00, records: 2.");
    }

    #[test]
    fn sales_branch_prefers_conventional_columns() {
        let rows = vec![json!({"rank": 1, "total_sales": 40.5})];
        let text = compose("revenue by region", &rows);
        assert!(text.starts_with("Sales summary — total: 40.50, peak: 40.50"));
    }

    #[test]
    fn customer_branch_uses_special_field() {
        let rows = vec![json!({"total_customers": 42})];
        assert_eq!(compose("how many customers do we have", &rows), "Total customers: 42");
    }

    #[test]
    fn customer_branch_falls_back_to_example() {
        let rows = vec![json!({"id": 1, "city": "Berlin"})];
        let text = compose("list users by city", &rows);
        assert!(text.starts_with("Customer dataset — 1 rows. Example: "));
    }

    #[test]
    fn product_branch_names_top_product() {
        let rows = vec![json!({"name": "Widget", "sold": 10}), json!({"name": "Gadget"})];
        assert_eq!(
            compose("top product this month", &rows),
            "Product snapshot — 2 rows. Top product: Widget"
        );
    }

    #[test]
    fn product_branch_without_name_reports_na() {
        let rows = vec![json!({"sku": 9})];
        assert_eq!(
            compose("best product", &rows),
            "Product snapshot — 1 rows. Top product: N/A"
        );
    }

    #[test]
    fn generic_branch_counts_rows() {
        let rows = vec![json!({"a": 1}), json!({"a": 2}), json!({"a": 3})];
        assert_eq!(compose("anything else", &rows), "Query executed — 3 rows returned.");
    }

    #[test]
    fn empty_rows_return_no_results_message() {
        assert_eq!(compose("show sales", &[]), NO_RESULTS_MESSAGE);
        assert_eq!(compose("whatever", &[]), NO_RESULTS_MESSAGE);
    }

    #[test]
    fn malformed_records_never_panic() {
        let rows = vec![json!(null), json!([1, 2]), json!("text")];
        let text = compose("sales overview", &rows);
        assert_eq!(text, "Sales summary — total: 0.00, peak: 0.00, records: 3.");
    }
}
