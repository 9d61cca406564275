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

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::adapter::{adapt, NormalisedRecord};
use crate::chart::{select, ChartHint, ChartMode};
use crate::error::ControllerError;
use crate::shape::{classify, ResultSet};

/// The complete outcome of one query cycle. Created whole, owned by the view
/// layer that requested it, and replaced whole on the next query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightSummary {
    pub query_text: String,
    pub narrative_text: String,
    pub generated_sql: Option<String>,
    pub chart_mode: ChartMode,
    pub result_set: ResultSet,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Empty,
    Loading,
    Populated(InsightSummary),
}

/// What the view layer should draw for the current state and mode.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedView {
    Placeholder,
    Chart {
        mode: ChartMode,
        records: Vec<NormalisedRecord>,
    },
    Table {
        records: Vec<NormalisedRecord>,
    },
}

/// Prepares a result set for one rendering mode. Adaptation never fails; an
/// empty set renders as the placeholder.
pub fn render_visualisation(rows: &[Value], mode: ChartMode) -> RenderedView {
    if rows.is_empty() {
        return RenderedView::Placeholder;
    }
    let classification = classify(rows);
    let records = adapt(rows, &classification, mode);
    match mode {
        ChartMode::Table => RenderedView::Table { records },
        _ => RenderedView::Chart { mode, records },
    }
}

/// Drives the query cycle: `Empty -> Loading -> Populated`, back to `Empty`
/// on failure or an explicit new-query action. The manual chart-mode override
/// lives here, outside the summary lifecycle, so switching modes never
/// requires a new query.
#[derive(Debug)]
pub struct VisualisationController {
    state: ViewState,
    override_hint: ChartHint,
}

impl VisualisationController {
    pub fn new() -> Self {
        Self {
            state: ViewState::Empty,
            override_hint: ChartHint::Auto,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewState::Loading)
    }

    /// Marks a query as submitted. Only one request may be outstanding, so a
    /// submission while one is pending is rejected, not queued.
    pub fn begin_query(&mut self) -> Result<(), ControllerError> {
        if self.is_loading() {
            return Err(ControllerError::QueryPending);
        }
        self.state = ViewState::Loading;
        Ok(())
    }

    /// Installs a completed summary, discarding any prior one wholesale.
    pub fn complete(&mut self, summary: InsightSummary) {
        debug!(mode = %summary.chart_mode, rows = summary.result_set.len(), "query cycle completed");
        self.state = ViewState::Populated(summary);
    }

    /// A failed or timed-out query returns the view to its empty state; the
    /// error itself is surfaced by the query layer.
    pub fn fail(&mut self) {
        self.state = ViewState::Empty;
    }

    /// Explicit new-query action: drops the current summary.
    pub fn clear(&mut self) {
        self.state = ViewState::Empty;
    }

    pub fn set_override(&mut self, hint: ChartHint) {
        self.override_hint = hint;
    }

    pub fn override_hint(&self) -> ChartHint {
        self.override_hint
    }

    /// The mode the current summary renders with, after applying the manual
    /// override. `Auto` keeps the mode resolved at query time; an explicit
    /// graphical choice re-runs selection so the hint is honoured; an
    /// explicit `table` always shows the table.
    pub fn resolved_mode(&self) -> Option<ChartMode> {
        let ViewState::Populated(summary) = &self.state else {
            return None;
        };
        Some(match self.override_hint {
            ChartHint::Auto => summary.chart_mode,
            ChartHint::Explicit(ChartMode::Table) => ChartMode::Table,
            ChartHint::Explicit(_) => {
                let classification = classify(&summary.result_set);
                select(&classification, self.override_hint)
            }
        })
    }

    pub fn render(&self) -> RenderedView {
        match (&self.state, self.resolved_mode()) {
            (ViewState::Populated(summary), Some(mode)) => {
                render_visualisation(&summary.result_set, mode)
            }
            _ => RenderedView::Placeholder,
        }
    }
}

impl Default for VisualisationController {
    fn default() -> Self {
        Self::new()
    }
}
