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

use async_trait::async_trait;
use serde_json::{json, Value};
use vizier::{
    adapt, classify, select, ChartHint, ChartMode, ClientError, InsightEngine, QueryRequest,
    QueryService, RenderedView, ServiceResponse, VisualisationController, VizierError,
};

struct ScriptedService {
    body: Value,
}

#[async_trait]
impl QueryService for ScriptedService {
    async fn execute(&self, _request: &QueryRequest) -> Result<ServiceResponse, ClientError> {
        Ok(serde_json::from_value(self.body.clone()).expect("scripted response decodes"))
    }
}

struct RejectingService;

#[async_trait]
impl QueryService for RejectingService {
    async fn execute(&self, _request: &QueryRequest) -> Result<ServiceResponse, ClientError> {
        Err(ClientError::Service {
            message: "query execution failed".to_string(),
            guidance: Some("try rephrasing the question".to_string()),
        })
    }
}

#[tokio::test]
async fn monthly_revenue_question_yields_line_summary() {
    let engine = InsightEngine::new(ScriptedService {
        body: json!({
            "success": true,
            "data": [
                {"month": "Jan", "revenue": 100},
                {"month": "Feb", "revenue": 150}
            ],
            "sql_query": "```sql\nSELECT month, revenue FROM sales\n```",
            "insights": {"chart_type": "line"}
        }),
    });

    let summary = engine
        .generate_insights("show sales trends for the last quarter", "1")
        .await
        .unwrap();

    assert_eq!(summary.chart_mode, ChartMode::Line);
    assert_eq!(
        summary.generated_sql.as_deref(),
        Some("SELECT month, revenue FROM sales")
    );
    assert_eq!(
        summary.narrative_text,
        "Sales summary — total: 250.00, peak: 150.00, records: 2."
    );

    let classification = classify(&summary.result_set);
    assert_eq!(classification.category_field.as_deref(), Some("month"));
    assert_eq!(classification.value_field.as_deref(), Some("revenue"));
}

#[tokio::test]
async fn regional_comparison_infers_bar_mode() {
    let engine = InsightEngine::new(ScriptedService {
        body: json!({
            "success": true,
            "data": [
                {"region": "East", "total": 40},
                {"region": "West", "total": 60}
            ]
        }),
    });

    let summary = engine
        .generate_insights("compare monthly sales across regions", "1")
        .await
        .unwrap();

    assert_eq!(summary.chart_mode, ChartMode::Bar);
    assert_eq!(
        summary.narrative_text,
        "Sales summary — total: 100.00, peak: 60.00, records: 2."
    );
}

#[tokio::test]
async fn zero_value_pie_slices_are_dropped_end_to_end() {
    let rows = vec![
        json!({"category": "A", "pct": 50}),
        json!({"category": "B", "pct": 0}),
    ];
    let classification = classify(&rows);
    let records = adapt(&rows, &classification, ChartMode::Pie);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, json!("A"));
}

#[tokio::test]
async fn empty_result_set_yields_table_and_no_results_text() {
    let engine = InsightEngine::new(ScriptedService {
        body: json!({"success": true, "data": []}),
    });

    let summary = engine.generate_insights("any question", "1").await.unwrap();
    assert_eq!(summary.chart_mode, ChartMode::Table);
    assert_eq!(summary.narrative_text, "No results found for your query.");
    assert_eq!(
        select(&classify(&summary.result_set), ChartHint::Auto),
        ChartMode::Table
    );
}

#[tokio::test]
async fn non_array_data_payload_is_treated_as_empty() {
    let engine = InsightEngine::new(ScriptedService {
        body: json!({"success": true, "data": {"unexpected": "shape"}}),
    });

    let summary = engine.generate_insights("anything", "1").await.unwrap();
    assert!(summary.result_set.is_empty());
    assert_eq!(summary.chart_mode, ChartMode::Table);
}

#[tokio::test]
async fn service_supplied_narrative_and_mode_are_honoured() {
    let engine = InsightEngine::new(ScriptedService {
        body: json!({
            "success": true,
            "data": [{"region": "East", "total": 40}],
            "insights": {
                "insight_text": "East leads with 40 units.",
                "chart_type": "pie"
            }
        }),
    });

    let summary = engine.generate_insights("totals", "1").await.unwrap();
    assert_eq!(summary.narrative_text, "East leads with 40 units.");
    assert_eq!(summary.chart_mode, ChartMode::Pie);
}

#[tokio::test]
async fn unknown_service_chart_type_falls_back_to_inference() {
    let engine = InsightEngine::new(ScriptedService {
        body: json!({
            "success": true,
            "data": [{"region": "East", "total": 40}],
            "insights": {"chart_type": "none"}
        }),
    });

    let summary = engine.generate_insights("totals", "1").await.unwrap();
    assert_eq!(summary.chart_mode, ChartMode::Bar);
}

#[tokio::test]
async fn service_rejection_surfaces_guidance() {
    let engine = InsightEngine::new(RejectingService);
    let err = engine
        .generate_insights("broken question", "1")
        .await
        .unwrap_err();

    assert_eq!(err.category(), "Service");
    assert_eq!(err.guidance(), Some("try rephrasing the question"));
    assert!(matches!(
        err,
        VizierError::Client(ClientError::Service { .. })
    ));
}

#[tokio::test]
async fn controller_drives_a_full_query_cycle() {
    let engine = InsightEngine::new(ScriptedService {
        body: json!({
            "success": true,
            "data": [
                {"region": "East", "total": 40},
                {"region": "West", "total": 60}
            ]
        }),
    });

    let mut controller = VisualisationController::new();
    assert_eq!(controller.render(), RenderedView::Placeholder);

    controller.begin_query().unwrap();
    assert!(controller.begin_query().is_err());

    let summary = engine
        .generate_insights("compare totals by region", "1")
        .await
        .unwrap();
    controller.complete(summary);

    match controller.render() {
        RenderedView::Chart { mode, records } => {
            assert_eq!(mode, ChartMode::Bar);
            assert_eq!(records.len(), 2);
        }
        other => panic!("expected chart, got {other:?}"),
    }

    controller.set_override(ChartHint::Explicit(ChartMode::Scatter));
    assert_eq!(controller.resolved_mode(), Some(ChartMode::Scatter));

    controller.clear();
    assert_eq!(controller.render(), RenderedView::Placeholder);
}

#[test]
fn scatter_hint_is_honoured_for_any_non_empty_set() {
    let cases = vec![
        vec![json!(1), json!(2)],
        vec![json!({"only": "field"})],
        vec![json!({"a": "x", "b": "y", "c": "z"})],
    ];
    for rows in cases {
        let mode = select(&classify(&rows), ChartHint::Explicit(ChartMode::Scatter));
        assert_eq!(mode, ChartMode::Scatter);
    }
}
