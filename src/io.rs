//! File boundary: rule configuration, player tables, and decision output.
//!
//! Formats:
//!
//! - rules: JSON `{"rules": [RuleDocument, ...]}`
//! - players: CSV `player_id,level,days_since_last_purchase,matches_lost,has_spent_money`
//! - decisions: CSV `player_id,offer`, one row per player in input order
//! - metrics: CSV `strategy,num_players,num_rules,duration_seconds`
//!
//! All input is validated here, before a batch starts.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::batch::MatchResult;
use crate::error::{Error, InputError};
use crate::matching::{Record, RecordId};
use crate::metrics::EvaluationMetrics;
use crate::ruleset::{build_ruleset, RuleSet, RulesConfig};

const RESULT_HEADER: [&str; 2] = ["player_id", "offer"];
const METRICS_HEADER: [&str; 4] = ["strategy", "num_players", "num_rules", "duration_seconds"];

#[derive(Debug, Deserialize)]
struct PlayerRow {
    player_id: RecordId,
    level: i32,
    days_since_last_purchase: i32,
    matches_lost: i32,
    has_spent_money: i64,
}

/// Reads and builds the rule set stored at `path`.
pub fn load_ruleset(path: impl AsRef<Path>) -> Result<RuleSet, Error> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|err| Error::from_io(path, err))?;
    let ruleset = parse_ruleset_from(&raw, &path.display().to_string())?;
    debug!(path = %path.display(), rules = ruleset.len(), "rules loaded");
    Ok(ruleset)
}

/// Builds a rule set from a JSON rule configuration string.
pub fn parse_ruleset(raw: &str) -> Result<RuleSet, Error> {
    parse_ruleset_from(raw, "<inline>")
}

fn parse_ruleset_from(raw: &str, origin: &str) -> Result<RuleSet, Error> {
    let config: RulesConfig = serde_json::from_str(raw).map_err(|source| Error::Json {
        path: origin.to_string(),
        source,
    })?;
    Ok(build_ruleset(config.rules)?)
}

/// Reads the player table at `path`.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<Record>, Error> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| Error::from_io(path, err))?;
    let records = read_records(file)?;
    debug!(path = %path.display(), records = records.len(), "players loaded");
    Ok(records)
}

/// Reads a player table with a header row.
///
/// Fails on the first bad row; the error carries its zero-based index.
pub fn read_records<R: io::Read>(reader: R) -> Result<Vec<Record>, InputError> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<PlayerRow>().enumerate() {
        let row = row.map_err(|err| InputError::Malformed {
            index,
            message: err.to_string(),
        })?;
        records.push(Record::from_flag(
            index,
            row.player_id,
            row.level,
            row.days_since_last_purchase,
            row.matches_lost,
            row.has_spent_money,
        )?);
    }
    Ok(records)
}

/// Writes the decision table to `path`, creating parent directories.
pub fn write_results(path: impl AsRef<Path>, results: &[MatchResult]) -> Result<(), Error> {
    let path = path.as_ref();
    let file = create(path)?;
    write_results_to(file, results).map_err(|err| Error::from_csv(path, err))?;
    debug!(path = %path.display(), rows = results.len(), "decisions written");
    Ok(())
}

/// Writes the decision table, header included, to `writer`.
pub fn write_results_to<W: io::Write>(writer: W, results: &[MatchResult]) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(RESULT_HEADER)?;
    for result in results {
        writer.serialize(result)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the metrics table to `path`, creating parent directories.
pub fn write_metrics(path: impl AsRef<Path>, metrics: &[EvaluationMetrics]) -> Result<(), Error> {
    let path = path.as_ref();
    let file = create(path)?;
    write_metrics_to(file, metrics).map_err(|err| Error::from_csv(path, err))
}

/// Writes the metrics table, header included, to `writer`.
pub fn write_metrics_to<W: io::Write>(
    writer: W,
    metrics: &[EvaluationMetrics],
) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(METRICS_HEADER)?;
    for run in metrics {
        writer.serialize(run)?;
    }
    writer.flush()?;
    Ok(())
}

fn create(path: &Path) -> Result<File, Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| Error::from_io(parent, err))?;
    }
    File::create(path).map_err(|err| Error::from_io(path, err))
}
