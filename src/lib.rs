// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: Apache-2.0
//
// tendency-rs: central tendency measures for 311 complaint response times

pub mod display;
pub mod formatter;
pub mod parser;
pub mod plot;
pub mod processor;
pub mod stats;
pub mod types;

pub use processor::{analyze, process_file, Analysis};
pub use stats::{summarize, SigmaBand, Summary};
pub use types::{AnalysisConfig, FenceMode, Result, TendencyError};
