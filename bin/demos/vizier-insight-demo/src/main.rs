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

use std::io::{self, Write};
use tracing::{error, info};
use vizier::{
    hint_from_question, ChartHint, InsightEngine, NormalisedRecord, RenderedView,
    VisualisationController,
};

const BAR_WIDTH: usize = 40;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    dotenvy::dotenv().ok();
    info!("Environment variables loaded");

    let database_id = std::env::var("VIZIER_DATABASE_ID").unwrap_or_else(|_| "1".to_string());
    let engine = InsightEngine::from_env();
    let mut controller = VisualisationController::new();

    println!("\nVizier Insight Demo");
    println!("═══════════════════════════════════════════════════════════════");
    println!("Ask a natural-language question about the connected data source.");
    println!("The engine classifies the result shape, picks a chart mode and");
    println!("composes a narrative when the service does not supply one.");
    println!();
    println!("Commands:");
    println!("   mode <line|bar|pie|area|scatter|table|auto>  switch the view");
    println!("   clear                                        start a new query");
    println!("   exit                                         quit");
    println!("═══════════════════════════════════════════════════════════════");

    loop {
        print!("\nEnter your question: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") {
            println!("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            controller.clear();
            println!("View cleared.");
            continue;
        }

        if let Some(mode_arg) = input.strip_prefix("mode ") {
            controller.set_override(ChartHint::parse(mode_arg));
            print_view(&controller.render());
            continue;
        }

        if let Err(e) = controller.begin_query() {
            println!("{e}");
            continue;
        }

        println!("{}", "─".repeat(80));

        match engine.generate_insights(input, &database_id).await {
            Ok(summary) => {
                println!("Mode: {}", summary.chart_mode);
                if let Some(sql) = &summary.generated_sql {
                    println!("SQL:  {sql}");
                }
                println!("{}", summary.narrative_text);
                if let ChartHint::Explicit(mode) = hint_from_question(input) {
                    info!(suggested = %mode, "Question wording suggests a mode; use 'mode {}' to switch", mode);
                }
                controller.complete(summary);
                print_view(&controller.render());
            }
            Err(e) => {
                error!("Insight generation failed: {}", e);
                controller.fail();
                println!("{}", e.user_message());
                if let Some(guidance) = e.guidance() {
                    println!("Hint: {guidance}");
                }
            }
        }

        println!("{}", "─".repeat(80));
    }

    Ok(())
}

fn print_view(view: &RenderedView) {
    match view {
        RenderedView::Placeholder => {
            println!("(no chartable data — ask a question to populate the view)");
        }
        RenderedView::Chart { mode, records } => {
            println!("[{mode} chart, {} point(s)]", records.len());
            let peak = records
                .iter()
                .filter_map(|r| r.value.as_f64())
                .fold(f64::NEG_INFINITY, f64::max);
            for record in records {
                let value = record.value.as_f64().unwrap_or(0.0);
                let width = if peak > 0.0 {
                    ((value / peak) * BAR_WIDTH as f64).round().max(0.0) as usize
                } else {
                    0
                };
                println!("  {:>12} | {} {value}", label(record), "█".repeat(width));
            }
        }
        RenderedView::Table { records } => {
            println!("[table, {} row(s)]", records.len());
            for record in records {
                let fields: Vec<String> = record
                    .fields
                    .iter()
                    .map(|(key, value)| format!("{key}={value}"))
                    .collect();
                println!("  {}", fields.join("  "));
            }
        }
    }
}

fn label(record: &NormalisedRecord) -> String {
    match &record.name {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
