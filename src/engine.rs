//! Engine state management.
//!
//! Holds the current board, the side on roll and the engine options, and
//! answers the query commands of the line protocol. Batch extraction runs on
//! a rayon pool sized by the `Threads` option.

use std::collections::HashMap;
use std::fmt::Display;
use std::io::Write;

use serde::Serialize;

use crate::board::side::Side;
use crate::board::state::Board;
use crate::eval::{classify, PositionClass, SideMetrics, CONCEPT_NAMES};
use crate::nn::{encode_position, extract_batch, feature_names, FeatureError, FEATURE_COUNT};
use crate::protocol::parser::PositionSpec;
use crate::protocol::position_id::{decode_position_id, encode_position_id, PositionIdError};

/// Default worker threads for batch extraction.
pub const DEFAULT_THREADS: usize = 4;

/// Smallest accepted `Threads` value.
pub const MIN_THREADS: usize = 1;

/// Largest accepted `Threads` value.
pub const MAX_THREADS: usize = 64;

/// Default output format for feature lines.
pub const DEFAULT_FORMAT: OutputFormat = OutputFormat::Plain;

/// How feature vectors are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `features v0 v1 ...`
    Plain,
    /// One JSON `FeatureReport` per line.
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<OutputFormat> {
        match s.to_ascii_lowercase().as_str() {
            "plain" => Some(OutputFormat::Plain),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            OutputFormat::Plain => "plain",
            OutputFormat::Json => "json",
        }
    }
}

/// JSON form of an extracted position.
#[derive(Debug, Serialize)]
pub struct FeatureReport<'a> {
    pub side: usize,
    pub class: PositionClass,
    pub on_roll: SideMetrics,
    pub opponent: SideMetrics,
    pub values: &'a [f32],
}

impl<'a> FeatureReport<'a> {
    pub fn new(board: &Board, side: Side, values: &'a [f32]) -> Self {
        FeatureReport {
            side: side.index(),
            class: classify(board),
            on_roll: SideMetrics::measure(board, side),
            opponent: SideMetrics::measure(board, side.opponent()),
            values,
        }
    }
}

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    pub position: Option<Board>,
    pub side: Side,
    pub options: HashMap<String, String>,
    /// Batch worker pool and the thread count it was built with.
    pool: Option<(usize, rayon::ThreadPool)>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates a new engine with no position and side 1 on roll.
    pub fn new() -> Self {
        Engine {
            position: None,
            side: Side::One,
            options: HashMap::new(),
            pool: None,
        }
    }

    /// Clears the position for a new game.
    pub fn new_game(&mut self) {
        self.position = None;
        self.side = Side::One;
    }

    /// Sets the board. The side on roll resets to 1, the side a decoded
    /// position ID puts on roll.
    pub fn set_position(&mut self, pos: &PositionSpec) -> Result<(), PositionIdError> {
        let board = match pos {
            PositionSpec::StartPos => Board::starting(),
            PositionSpec::Id(id) => decode_position_id(id)?,
        };
        log::debug!("position set to {}", encode_position_id(&board));
        self.position = Some(board);
        self.side = Side::One;
        Ok(())
    }

    /// Sets the side on roll from a raw indicator. An invalid indicator
    /// leaves the side unchanged.
    pub fn set_side(&mut self, which: i32) -> Result<(), FeatureError> {
        self.side = Side::from_index(which).ok_or(FeatureError::InvalidSide(which))?;
        log::debug!("side on roll set to {}", which);
        Ok(())
    }

    /// Sets an engine option.
    pub fn set_option(&mut self, name: String, value: Option<String>) {
        log::debug!("option {} = {:?}", name, value);
        self.options.insert(name, value.unwrap_or_default());
    }

    /// Returns the configured batch thread count, or the default when unset
    /// or out of range.
    pub fn threads(&self) -> usize {
        self.options
            .get("Threads")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| (MIN_THREADS..=MAX_THREADS).contains(n))
            .unwrap_or(DEFAULT_THREADS)
    }

    /// Returns the configured output format, or the default.
    pub fn format(&self) -> OutputFormat {
        self.options
            .get("Format")
            .and_then(|v| OutputFormat::parse(v))
            .unwrap_or(DEFAULT_FORMAT)
    }

    /// Handles the handshake: writes id, feature count, options and `tavlaok`.
    pub fn handle_tavla<W: Write>(&self, out: &mut W) {
        writeln!(out, "id name tavla").unwrap();
        writeln!(out, "id author tavla").unwrap();
        writeln!(out, "features {}", FEATURE_COUNT).unwrap();
        writeln!(
            out,
            "option name Threads type spin default {} min {} max {}",
            DEFAULT_THREADS, MIN_THREADS, MAX_THREADS
        )
        .unwrap();
        writeln!(
            out,
            "option name Format type combo default {} var plain var json",
            DEFAULT_FORMAT.name()
        )
        .unwrap();
        writeln!(out, "tavlaok").unwrap();
        out.flush().unwrap();
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) {
        writeln!(out, "readyok").unwrap();
        out.flush().unwrap();
    }

    /// Handles `position`, reporting a bad ID as an error line.
    pub fn handle_position<W: Write>(&mut self, pos: &PositionSpec, out: &mut W) {
        if let Err(e) = self.set_position(pos) {
            report_error(out, e);
        }
    }

    /// Handles `side`, reporting an invalid indicator as an error line.
    pub fn handle_side<W: Write>(&mut self, which: i32, out: &mut W) {
        if let Err(e) = self.set_side(which) {
            report_error(out, e);
        }
    }

    /// Handles the `features` command.
    pub fn handle_features<W: Write>(&self, out: &mut W) {
        let Some(board) = self.current(out) else {
            return;
        };
        match encode_position(board, self.side) {
            Ok(features) => {
                log::trace!("extracted {} features", features.len());
                self.write_features(out, board, self.side, &features);
            }
            Err(e) => report_error(out, e),
        }
        out.flush().unwrap();
    }

    /// Handles the `summary` command: per-side metrics then the class.
    pub fn handle_summary<W: Write>(&self, out: &mut W) {
        let Some(board) = self.current(out) else {
            return;
        };
        for (label, side) in [("on_roll", self.side), ("opponent", self.side.opponent())] {
            let concepts = SideMetrics::measure(board, side).concepts();
            let pairs: Vec<String> = CONCEPT_NAMES
                .iter()
                .zip(concepts)
                .map(|(name, v)| format!("{} {}", name, v))
                .collect();
            writeln!(out, "metrics {} {}", label, pairs.join(" ")).unwrap();
        }
        writeln!(out, "class {}", classify(board).name()).unwrap();
        out.flush().unwrap();
    }

    /// Handles the `classify` command.
    pub fn handle_classify<W: Write>(&self, out: &mut W) {
        let Some(board) = self.current(out) else {
            return;
        };
        writeln!(out, "class {}", classify(board).name()).unwrap();
        out.flush().unwrap();
    }

    /// Handles the `encode` command.
    pub fn handle_encode<W: Write>(&self, out: &mut W) {
        let Some(board) = self.current(out) else {
            return;
        };
        writeln!(out, "positionid {}", encode_position_id(board)).unwrap();
        out.flush().unwrap();
    }

    /// Handles the `names` command.
    pub fn handle_names<W: Write>(&self, out: &mut W) {
        for (i, name) in feature_names().iter().enumerate() {
            writeln!(out, "name {} {}", i, name).unwrap();
        }
        out.flush().unwrap();
    }

    /// Handles `batch`: one output line per ID, in order, with the current
    /// side on roll. IDs that fail to decode produce an error line in place.
    pub fn handle_batch<W: Write>(&mut self, ids: &[String], out: &mut W) {
        let decoded: Vec<Result<Board, PositionIdError>> =
            ids.iter().map(|id| decode_position_id(id)).collect();
        let positions: Vec<(Board, Side)> = decoded
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|board| (*board, self.side))
            .collect();

        let extracted = match self.batch_pool() {
            Ok(pool) => pool.install(|| extract_batch(&positions)),
            Err(e) => {
                report_error(out, format!("failed to build thread pool: {}", e));
                return;
            }
        };
        let mut extracted = extracted.into_iter();

        for result in decoded {
            let board = match result {
                Ok(board) => board,
                Err(e) => {
                    report_error(out, e);
                    continue;
                }
            };
            match extracted.next() {
                Some(Ok(features)) => self.write_features(out, &board, self.side, &features),
                Some(Err(e)) => report_error(out, e),
                None => report_error(out, "batch result missing"),
            }
        }
        out.flush().unwrap();
    }

    /// Returns the batch pool, building it on first use and again whenever
    /// `Threads` has changed since.
    fn batch_pool(&mut self) -> Result<&rayon::ThreadPool, rayon::ThreadPoolBuildError> {
        let threads = self.threads();
        let pool = match self.pool.take() {
            Some((n, pool)) if n == threads => pool,
            _ => {
                log::debug!("building batch pool with {} threads", threads);
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?
            }
        };
        Ok(&self.pool.insert((threads, pool)).1)
    }

    /// Returns the current board, or reports that none is set.
    fn current<W: Write>(&self, out: &mut W) -> Option<&Board> {
        if self.position.is_none() {
            report_error(out, "no position set");
        }
        self.position.as_ref()
    }

    /// Writes one feature vector in the configured format.
    fn write_features<W: Write>(&self, out: &mut W, board: &Board, side: Side, features: &[f32]) {
        match self.format() {
            OutputFormat::Plain => {
                let values: Vec<String> = features.iter().map(|v| v.to_string()).collect();
                writeln!(out, "features {}", values.join(" ")).unwrap();
            }
            OutputFormat::Json => {
                let report = FeatureReport::new(board, side, features);
                match serde_json::to_string(&report) {
                    Ok(json) => writeln!(out, "{}", json).unwrap(),
                    Err(e) => report_error(out, e),
                }
            }
        }
    }
}

/// Logs an error and reports it on the protocol stream.
fn report_error<W: Write, E: Display>(out: &mut W, e: E) {
    log::warn!("{}", e);
    writeln!(out, "error {}", e).unwrap();
    out.flush().unwrap();
}
