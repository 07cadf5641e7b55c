// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use tracing::{debug, error};

use crate::formatter;
use crate::parser::{self, LoadOutcome};
use crate::plot::Figure;
use crate::stats::{self, Summary};
use crate::types::{AnalysisConfig, Result, TendencyError};

/// Result of one pass over the input
#[derive(Debug, Clone)]
pub struct Analysis {
    pub label: String,
    pub outcome: LoadOutcome,
    pub summary: Summary,
    pub figure: Figure,
}

/// Name the complaints after the first configured category, e.g. "plumbing"
pub fn complaint_label(config: &AnalysisConfig) -> String {
    config
        .categories
        .first()
        .map(|c| c.to_lowercase())
        .unwrap_or_default()
}

/// Load, filter and summarise the configured input without printing anything
pub fn analyze(config: &AnalysisConfig) -> Result<Analysis> {
    config.validate()?;

    let outcome = parser::load_file(config)?;

    let summary = match stats::summarize(&outcome.samples, config.fence_mode) {
        Ok(summary) => summary,
        Err(TendencyError::EmptySample) => {
            error!(
                categories = ?config.categories,
                rows = outcome.rows,
                matched = outcome.matched,
                "No usable response times in {}",
                config.input.display()
            );
            return Err(TendencyError::EmptySample);
        }
        Err(e) => return Err(e),
    };
    debug!(?summary, "Computed response time statistics");

    let label = complaint_label(config);
    let mut title = label.clone();
    if let Some(first) = title.get_mut(..1) {
        first.make_ascii_uppercase();
    }
    title.push_str(" complaint response times (days)");

    let figure = Figure::new(
        title,
        &outcome.samples,
        &summary,
        config.bins,
        config.line_height,
    )?;

    Ok(Analysis {
        label,
        outcome,
        summary,
        figure,
    })
}

/// Analyze the configured input and print the statistics report
pub fn process_file(config: &AnalysisConfig) -> Result<Analysis> {
    let analysis = analyze(config)?;
    formatter::print_report(&analysis.summary, &analysis.label);
    Ok(analysis)
}
