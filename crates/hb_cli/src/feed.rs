//! Position Feed Reader
//!
//! CSV → `Vec<PlayerObservation>`
//!
//! Columns are located by header name, so their order is free:
//! `frame_num`, `id` (or `player_id`), `team_color` (or `team`), `x`, `y`,
//! `direction`. Rows that cannot be parsed are skipped with a warning and
//! counted in [`FeedStats::failed`].

use std::io::Read;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use hb_core::{Direction, PlayerObservation, Team};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal feed problems; bad rows are not errors.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to open position feed {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to read feed header: {0}")]
    Header(#[source] csv::Error),

    #[error("Feed header is missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// Coordinate correction applied to one team's positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

/// Feed-side settings, applied before the core sees any coordinate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Per-team offsets; teams without an entry are left untouched
    pub offsets: FxHashMap<Team, Offset>,
}

impl FeedConfig {
    pub fn with_offset(mut self, team: Team, dx: f64, dy: f64) -> Self {
        self.offsets.insert(team, Offset { dx, dy });
        self
    }

    pub fn offset(&self, team: Team) -> Offset {
        self.offsets.get(&team).copied().unwrap_or_default()
    }
}

/// CSV parsing statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedStats {
    pub total_rows: u32,
    pub parsed: u32,
    pub failed: u32,
}

/// Header positions of the required columns.
#[derive(Debug, Clone, Copy)]
struct Columns {
    frame: usize,
    id: usize,
    team: usize,
    x: usize,
    y: usize,
    direction: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, FeedError> {
        Ok(Self {
            frame: find_column(headers, "frame_num", &["frame_num"])?,
            id: find_column(headers, "id", &["id", "player_id"])?,
            team: find_column(headers, "team_color", &["team_color", "team"])?,
            x: find_column(headers, "x", &["x"])?,
            y: find_column(headers, "y", &["y"])?,
            direction: find_column(headers, "direction", &["direction"])?,
        })
    }
}

fn find_column(headers: &StringRecord, name: &'static str, aliases: &[&str]) -> Result<usize, FeedError> {
    headers
        .iter()
        .position(|h| {
            // exported sheets sometimes carry a BOM on the first header
            let h = h.trim().trim_start_matches('\u{feff}');
            aliases.iter().any(|alias| h.eq_ignore_ascii_case(alias))
        })
        .ok_or(FeedError::MissingColumn(name))
}

/// Read a position feed CSV file.
pub fn read_feed(path: &Path, config: &FeedConfig) -> Result<(Vec<PlayerObservation>, FeedStats), FeedError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| FeedError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    read_records(reader, config)
}

/// Read a position feed from any byte source.
pub fn read_feed_from<R: Read>(source: R, config: &FeedConfig) -> Result<(Vec<PlayerObservation>, FeedStats), FeedError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(source);
    read_records(reader, config)
}

fn read_records<R: Read>(
    mut reader: csv::Reader<R>,
    config: &FeedConfig,
) -> Result<(Vec<PlayerObservation>, FeedStats), FeedError> {
    let columns = Columns::locate(reader.headers().map_err(FeedError::Header)?)?;

    let mut observations = Vec::new();
    let mut stats = FeedStats::default();

    for result in reader.records() {
        stats.total_rows += 1;
        let parsed = match result {
            Ok(record) => parse_row(&record, columns, config).map_err(|reason| (record.position().map(|p| p.line()), reason)),
            Err(e) => Err((e.position().map(|p| p.line()), e.to_string())),
        };

        match parsed {
            Ok(observation) => {
                stats.parsed += 1;
                observations.push(observation);
            }
            Err((line, reason)) => {
                stats.failed += 1;
                tracing::warn!(line = ?line, row = stats.total_rows, %reason, "malformed feed row skipped");
            }
        }
    }

    tracing::debug!(
        parsed = stats.parsed,
        failed = stats.failed,
        total = stats.total_rows,
        "position feed read"
    );
    Ok((observations, stats))
}

fn parse_row(record: &StringRecord, columns: Columns, config: &FeedConfig) -> Result<PlayerObservation, String> {
    let field = |idx: usize, name: &str| record.get(idx).ok_or_else(|| format!("missing {name} field"));

    let raw_frame = field(columns.frame, "frame_num")?;
    let frame_num = raw_frame
        .parse::<u32>()
        .map_err(|_| format!("invalid frame_num '{raw_frame}'"))?;

    let id = field(columns.id, "id")?;
    if id.is_empty() {
        return Err("empty player id".to_string());
    }

    let team: Team = field(columns.team, "team_color")?.parse()?;
    let direction: Direction = field(columns.direction, "direction")?.parse()?;

    let x = parse_coordinate(field(columns.x, "x")?, "x")?;
    let y = parse_coordinate(field(columns.y, "y")?, "y")?;
    let offset = config.offset(team);

    Ok(PlayerObservation::new(frame_num, id, team, x + offset.dx, y + offset.dy, direction))
}

/// Raw coordinates are normalised to the unit square; tracking noise can
/// push a player slightly past the lines, anything beyond this is garbage.
const COORDINATE_RANGE: std::ops::RangeInclusive<f64> = -1.0..=2.0;

fn parse_coordinate(raw: &str, name: &str) -> Result<f64, String> {
    match raw.parse::<f64>() {
        Ok(v) if COORDINATE_RANGE.contains(&v) => Ok(v),
        Ok(v) if v.is_finite() => Err(format!("{name} coordinate {v} is outside the pitch")),
        _ => Err(format!("invalid {name} coordinate '{raw}'")),
    }
}
