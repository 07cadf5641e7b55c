// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use thiserror::Error;
use tracing::{debug, info, trace};
use zstd::stream::read::Decoder as ZstdDecoder;

use crate::types::{
    AnalysisConfig, Result, TendencyError, COL_CLOSED_DATE, COL_COMPLAINT_TYPE, COL_CREATED_DATE,
    DATE_FORMAT, SECONDS_PER_DAY,
};

/// Why a matching row did not produce a sample
#[derive(Error, Debug)]
enum RowError {
    #[error("row has no '{0}' field")]
    MissingField(&'static str),

    #[error("cannot parse {field} '{value}': {source}")]
    BadDate {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Positions of the columns the loader reads, resolved once from the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub complaint_type: usize,
    pub created_date: usize,
    pub closed_date: usize,
}

impl ColumnIndex {
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| TendencyError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            complaint_type: find(COL_COMPLAINT_TYPE)?,
            created_date: find(COL_CREATED_DATE)?,
            closed_date: find(COL_CLOSED_DATE)?,
        })
    }
}

/// Which rows count, and which of those are abnormally slow
#[derive(Debug, Clone)]
pub struct RecordFilter {
    pub categories: Vec<String>,
    pub threshold_days: f64,
}

impl RecordFilter {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            categories: config.categories.clone(),
            threshold_days: config.threshold_days,
        }
    }

    /// Exact comparison against the configured spellings
    pub fn matches(&self, complaint_type: &str) -> bool {
        self.categories.iter().any(|c| c == complaint_type)
    }

    pub fn is_abnormal(&self, days: f64) -> bool {
        days > self.threshold_days
    }
}

/// Samples gathered from one input plus bookkeeping for the log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOutcome {
    pub samples: Vec<f64>,
    pub rows: usize,
    pub matched: usize,
    pub skipped: usize,
    pub unreadable: usize,
    pub abnormal: usize,
}

/// Parse one timestamp into whole seconds since the epoch.
/// Fractional seconds are dropped before any arithmetic.
pub fn parse_timestamp(value: &str) -> std::result::Result<i64, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, DATE_FORMAT).map(|dt| dt.and_utc().timestamp())
}

fn field<'r>(
    record: &'r StringRecord,
    index: usize,
    name: &'static str,
) -> std::result::Result<&'r str, RowError> {
    record.get(index).ok_or(RowError::MissingField(name))
}

fn date_field(
    record: &StringRecord,
    index: usize,
    name: &'static str,
) -> std::result::Result<i64, RowError> {
    let value = field(record, index, name)?;
    parse_timestamp(value).map_err(|source| RowError::BadDate {
        field: name,
        value: value.to_string(),
        source,
    })
}

fn response_days(
    record: &StringRecord,
    columns: &ColumnIndex,
) -> std::result::Result<f64, RowError> {
    let created = date_field(record, columns.created_date, COL_CREATED_DATE)?;
    let closed = date_field(record, columns.closed_date, COL_CLOSED_DATE)?;
    Ok((closed - created) as f64 / SECONDS_PER_DAY)
}

/// Read complaint rows from `reader`, collecting response times for the
/// matching categories and copying abnormally slow rows to `writer`.
///
/// The writer always receives the input header first. Rows that cannot be
/// read or whose dates do not parse are skipped; only I/O failures abort.
pub fn load_responses<R: Read, W: Write>(
    reader: R,
    writer: W,
    filter: &RecordFilter,
) -> Result<LoadOutcome> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let mut abnormal = WriterBuilder::new().flexible(true).from_writer(writer);

    let headers = csv_reader.headers()?.clone();
    abnormal.write_record(&headers)?;
    let columns = ColumnIndex::from_headers(&headers)?;
    debug!(?columns, "Resolved input columns");

    let mut outcome = LoadOutcome::default();

    for (row, record) in csv_reader.records().enumerate() {
        outcome.rows += 1;

        let record = match record {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                outcome.unreadable += 1;
                debug!(row, error = %e, "Skipping unreadable row");
                continue;
            }
        };

        match record.get(columns.complaint_type) {
            Some(complaint_type) if filter.matches(complaint_type) => {}
            _ => continue,
        }
        outcome.matched += 1;

        let days = match response_days(&record, &columns) {
            Ok(days) => days,
            Err(e) => {
                outcome.skipped += 1;
                trace!(row, error = %e, "Skipping row");
                continue;
            }
        };

        outcome.samples.push(days);
        if filter.is_abnormal(days) {
            abnormal.write_record(&record)?;
            outcome.abnormal += 1;
        }
    }

    abnormal.flush()?;

    Ok(outcome)
}

/// Open the configured input, create the configured output and run
/// [`load_responses`] over them. Both handles are closed on return.
pub fn load_file(config: &AnalysisConfig) -> Result<LoadOutcome> {
    info!("Loading complaints from {}", config.input.display());

    let reader = create_reader(&config.input)?;
    let output = File::create(&config.output).map_err(|source| TendencyError::FileCreate {
        path: config.output.clone(),
        source,
    })?;

    let filter = RecordFilter::from_config(config);
    let outcome = load_responses(reader, BufWriter::new(output), &filter)?;

    info!(
        rows = outcome.rows,
        matched = outcome.matched,
        samples = outcome.samples.len(),
        skipped = outcome.skipped,
        unreadable = outcome.unreadable,
        "Finished reading {}",
        config.input.display()
    );
    info!(
        "Wrote {} rows slower than {} days to {}",
        outcome.abnormal,
        config.threshold_days,
        config.output.display()
    );

    Ok(outcome)
}

/// Create a reader based on file extension
pub fn create_reader(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|source| TendencyError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let reader = BufReader::new(file);

    if path.extension().is_some_and(|ext| ext == "zst") {
        let zstd_reader = ZstdDecoder::new(reader).map_err(|source| TendencyError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Box::new(zstd_reader))
    } else {
        Ok(Box::new(reader))
    }
}
