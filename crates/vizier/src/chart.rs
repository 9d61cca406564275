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
use thiserror::Error;

use crate::shape::{ResultShape, ShapeClassification};

/// Closed enumeration of rendering families. `Table` is the non-graphical
/// fallback when no chart applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    Line,
    Bar,
    Pie,
    Area,
    Scatter,
    Table,
}

impl ChartMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartMode::Line => "line",
            ChartMode::Bar => "bar",
            ChartMode::Pie => "pie",
            ChartMode::Area => "area",
            ChartMode::Scatter => "scatter",
            ChartMode::Table => "table",
        }
    }

    pub fn is_graphical(&self) -> bool {
        !matches!(self, ChartMode::Table)
    }
}

impl std::fmt::Display for ChartMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown chart mode: '{0}'")]
pub struct UnknownChartMode(pub String);

impl std::str::FromStr for ChartMode {
    type Err = UnknownChartMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "line" => Ok(ChartMode::Line),
            "bar" => Ok(ChartMode::Bar),
            "pie" => Ok(ChartMode::Pie),
            "area" => Ok(ChartMode::Area),
            "scatter" => Ok(ChartMode::Scatter),
            "table" => Ok(ChartMode::Table),
            other => Err(UnknownChartMode(other.to_string())),
        }
    }
}

/// Caller-facing selection intent. `Auto` delegates the decision to
/// [`select`] and is never stored as a resolved mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChartHint {
    #[default]
    Auto,
    Explicit(ChartMode),
}

impl ChartHint {
    /// Lenient parse for caller-supplied strings: `auto`, an unknown word or
    /// an empty string all mean "decide for me".
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("auto") {
            return ChartHint::Auto;
        }
        s.parse::<ChartMode>()
            .map(ChartHint::Explicit)
            .unwrap_or(ChartHint::Auto)
    }
}

/// Picks a rendering mode for a classified result set.
///
/// An explicit graphical hint always wins. Otherwise the ordered cardinality
/// rules apply: field count is a stronger and cheaper signal than keyword
/// matching, which only decides field roles, not the chart family.
pub fn select(classification: &ShapeClassification, hint: ChartHint) -> ChartMode {
    if let ChartHint::Explicit(mode) = hint {
        if mode.is_graphical() {
            return mode;
        }
    }

    if classification.record_count == 0 {
        return ChartMode::Table;
    }

    match classification.shape {
        ResultShape::Empty => ChartMode::Table,
        ResultShape::Scalars => ChartMode::Line,
        ResultShape::Records => {
            let numeric = classification.numeric_field_count;
            match classification.field_names.len() {
                1 => ChartMode::Bar,
                2 => {
                    if numeric >= 1 {
                        ChartMode::Bar
                    } else {
                        ChartMode::Pie
                    }
                }
                n if n >= 3 => {
                    if numeric >= 2 {
                        ChartMode::Scatter
                    } else {
                        ChartMode::Bar
                    }
                }
                _ => ChartMode::Bar,
            }
        }
    }
}

/// Derives a selection hint from the question wording alone. The thresholds
/// in [`select`] stay authoritative whenever this yields `Auto`.
pub fn hint_from_question(question: &str) -> ChartHint {
    let q = question.to_lowercase();
    if ["trend", "over time", "last quarter"].iter().any(|w| q.contains(w)) {
        return ChartHint::Explicit(ChartMode::Line);
    }
    if ["compare", "top", "by"].iter().any(|w| q.contains(w)) {
        return ChartHint::Explicit(ChartMode::Bar);
    }
    if q.contains("distribution") || q.contains("demograph") {
        return ChartHint::Explicit(ChartMode::Pie);
    }
    ChartHint::Auto
}
