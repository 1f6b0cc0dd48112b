use crate::error::{AnomalyError, Result};
use crate::model::{AnnotatedObservation, Baseline, Observation};
use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::io::{Read, Write};

const CITY: &str = "city";
const TIMESTAMP: &str = "timestamp";
const TEMPERATURE: &str = "temperature";

/// Read observations from CSV with `city`, `timestamp` and `temperature` headers.
///
/// Columns may appear in any order and extra columns are ignored.
/// Stops at the first malformed row.
pub fn read_observations<R: Read>(reader: R) -> Result<Vec<Observation>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = Columns::locate(&headers)?;

    let mut observations = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let row = idx + 1;
        let record = record.map_err(|err| AnomalyError::MalformedInput {
            row,
            reason: err.to_string(),
        })?;
        let obs = columns
            .parse(&record)
            .map_err(|reason| AnomalyError::MalformedInput { row, reason })?;
        observations.push(obs);
    }
    Ok(observations)
}

struct Columns {
    city: usize,
    timestamp: usize,
    temperature: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header.eq_ignore_ascii_case(name))
                .ok_or_else(|| AnomalyError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            city: find(CITY)?,
            timestamp: find(TIMESTAMP)?,
            temperature: find(TEMPERATURE)?,
        })
    }

    fn parse(&self, record: &StringRecord) -> std::result::Result<Observation, String> {
        let field = |idx: usize, name: &str| match record.get(idx) {
            Some(val) if !val.is_empty() => Ok(val),
            _ => Err(format!("missing {name}")),
        };

        let city = field(self.city, CITY)?;

        let timestamp = field(self.timestamp, TIMESTAMP)?;
        let timestamp = parse_timestamp(timestamp)
            .ok_or_else(|| format!("unparseable timestamp {timestamp:?}"))?;

        let temperature = field(self.temperature, TEMPERATURE)?;
        let temperature: f64 = temperature
            .parse()
            .map_err(|_| format!("unparseable temperature {temperature:?}"))?;
        if !temperature.is_finite() {
            return Err(format!("temperature must be finite, but is {temperature}"));
        }

        Ok(Observation::new(city, timestamp, temperature))
    }
}

/// Parse an ISO-8601 date or date-time.
///
/// Timestamps with an offset are normalised to UTC; naive ones are kept as
/// written and bare dates map to midnight.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

pub fn write_annotated<W: Write>(writer: W, annotated: &[AnnotatedObservation]) -> anyhow::Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
    for row in annotated {
        wtr.serialize(row).context("failed to serialize annotated row")?;
    }
    wtr.flush().context("failed to flush writer stream")?;
    Ok(())
}

pub fn write_baselines<W: Write>(mut writer: W, baselines: &[Baseline]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut writer, baselines).context("failed to serialize baselines")?;
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}
