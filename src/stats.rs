// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use polars::prelude::*;

use crate::types::{FenceMode, Result, TendencyError};

/// Column holding the response times while polars aggregates them
const SAMPLE_COLUMN: &str = "response_days";

/// Fence width, in interquartile ranges
pub const FENCE_MULTIPLIER: f64 = 1.5;

/// `mean ± k·σ`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmaBand {
    pub k: u32,
    pub lower: f64,
    pub upper: f64,
}

/// Central tendency and spread of the response times
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub iqr: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    pub mean: f64,
    /// Population standard deviation (ddof = 0)
    pub std_dev: f64,
    pub sigma_bands: [SigmaBand; 3],
}

impl Summary {
    pub fn quartiles(&self) -> [f64; 3] {
        [self.p25, self.median, self.p75]
    }

    pub fn fences(&self) -> [f64; 2] {
        [self.lower_fence, self.upper_fence]
    }
}

/// Compute quartiles, fences, mean, standard deviation and the 1σ..3σ
/// bands over `samples`. An empty slice is an error.
pub fn summarize(samples: &[f64], fence_mode: FenceMode) -> Result<Summary> {
    if samples.is_empty() {
        return Err(TendencyError::EmptySample);
    }

    let df = df!(SAMPLE_COLUMN => samples)?;

    let stats = df
        .lazy()
        .select([
            col(SAMPLE_COLUMN)
                .quantile(lit(0.25), QuantileMethod::Linear)
                .alias("p25"),
            col(SAMPLE_COLUMN)
                .quantile(lit(0.50), QuantileMethod::Linear)
                .alias("p50"),
            col(SAMPLE_COLUMN)
                .quantile(lit(0.75), QuantileMethod::Linear)
                .alias("p75"),
            col(SAMPLE_COLUMN).mean().alias("mean"),
            col(SAMPLE_COLUMN).std(0).alias("std"),
        ])
        .collect()?;

    let p25 = first_value(&stats, "p25")?;
    let median = first_value(&stats, "p50")?;
    let p75 = first_value(&stats, "p75")?;
    let mean = first_value(&stats, "mean")?;
    let std_dev = first_value(&stats, "std")?;

    let iqr = p75 - p25;
    let (lower_fence, upper_fence) = fences(p25, p75, fence_mode);

    Ok(Summary {
        count: samples.len(),
        p25,
        median,
        p75,
        iqr,
        lower_fence,
        upper_fence,
        mean,
        std_dev,
        sigma_bands: sigma_bands(mean, std_dev),
    })
}

/// Outlier fences for the given quartiles.
///
/// `UpperQuartile` measures both fences from P75, which is how the original
/// 311 analysis drew them; `Tukey` anchors the lower fence at P25.
pub fn fences(p25: f64, p75: f64, mode: FenceMode) -> (f64, f64) {
    let reach = FENCE_MULTIPLIER * (p75 - p25);
    match mode {
        FenceMode::UpperQuartile => (p75 - reach, p75 + reach),
        FenceMode::Tukey => (p25 - reach, p75 + reach),
    }
}

pub fn sigma_bands(mean: f64, std_dev: f64) -> [SigmaBand; 3] {
    std::array::from_fn(|i| {
        let k = i as u32 + 1;
        SigmaBand {
            k,
            lower: mean - k as f64 * std_dev,
            upper: mean + k as f64 * std_dev,
        }
    })
}

fn first_value(df: &DataFrame, name: &str) -> Result<f64> {
    df.column(name)?
        .f64()?
        .get(0)
        .ok_or(TendencyError::EmptySample)
}
