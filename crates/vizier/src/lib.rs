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

pub mod adapter;
pub mod chart;
pub mod clean;
pub mod client;
pub mod controller;
pub mod error;
pub mod shape;
pub mod summary;

pub use adapter::{adapt, NormalisedRecord};
pub use chart::{hint_from_question, select, ChartHint, ChartMode, UnknownChartMode};
pub use client::{HttpQueryService, QueryRequest, QueryService, ServiceConfig, ServiceResponse};
pub use controller::{
    render_visualisation, InsightSummary, RenderedView, ViewState, VisualisationController,
};
pub use error::{ClientError, ControllerError, Result, VizierError};
pub use shape::{classify, ResultSet, ResultShape, ShapeClassification};

use tracing::info;

/// Orchestrates one query cycle against the external execution service:
/// submits the question, sanitises the returned rows, then fills in whatever
/// the service left out — a missing narrative via [`summary::compose`], a
/// missing chart type via [`chart::select`].
pub struct InsightEngine<S: QueryService = HttpQueryService> {
    service: S,
}

impl InsightEngine<HttpQueryService> {
    pub fn from_env() -> Self {
        Self::new(HttpQueryService::from_env())
    }
}

impl<S: QueryService> InsightEngine<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub async fn generate_insights(
        &self,
        natural_query: &str,
        database_id: &str,
    ) -> Result<InsightSummary> {
        let request = QueryRequest {
            database_id: database_id.to_string(),
            natural_language_query: natural_query.to_string(),
        };

        let response = self.service.execute(&request).await?;
        let rows = clean::sanitise_rows(response.data);
        let classification = shape::classify(&rows);

        let provided_mode = response
            .insights
            .as_ref()
            .and_then(|i| i.chart_type.as_deref())
            .and_then(|s| s.parse::<ChartMode>().ok());
        let chart_mode =
            provided_mode.unwrap_or_else(|| chart::select(&classification, ChartHint::Auto));

        let narrative_text = response
            .insights
            .and_then(|i| i.insight_text)
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| summary::compose(natural_query, &rows));

        let generated_sql = response
            .sql_query
            .as_deref()
            .map(clean::strip_sql_fences)
            .filter(|sql| !sql.is_empty());

        info!(
            mode = %chart_mode,
            rows = rows.len(),
            inferred_mode = provided_mode.is_none(),
            "Insight summary assembled"
        );

        Ok(InsightSummary {
            query_text: natural_query.to_string(),
            narrative_text,
            generated_sql,
            chart_mode,
            result_set: rows,
        })
    }
}
