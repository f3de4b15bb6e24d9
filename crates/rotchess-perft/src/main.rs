//! rotchess-perft - command-line driver for the rotchess engine.
//!
//! Runs perft suites against known node counts, splits a perft count by
//! root move, probes static exchange evaluation and converts move lists
//! between notations.

mod config;
mod report;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use config::{PerftSuite, SuitePosition};
use report::{ConvertReport, DivideReport, PerftRecord, SeeReport, StatusReport, SuiteReport};
use rotchess_engine::notation::{self, NotationKind};
use rotchess_engine::{gen_mode, generate_moves, perft, perft_divide, rules, see, Position};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rotchess-perft")]
#[command(about = "Perft suites and notation tools for the rotchess engine")]
struct Cli {
    /// Perft suite file
    #[arg(long, global = true, default_value = "perft.toml")]
    suite: PathBuf,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run suite positions against their expected node counts
    Suite {
        /// Deepest depth to run
        #[arg(short, long, default_value = "4")]
        depth: u32,
        /// Run only the named position
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Leaf counts below each root move
    Divide {
        /// "startpos", a suite position name, or a FEN
        position: String,
        depth: u32,
    },
    /// Static exchange evaluation of one move
    See {
        /// "startpos", a suite position name, or a FEN
        position: String,
        /// The move, in any notation
        #[arg(value_name = "MOVE")]
        mv: String,
    },
    /// Convert a move sequence to another notation
    Convert {
        /// "startpos", a suite position name, or a FEN
        position: String,
        /// Target notation
        #[arg(short, long, value_enum, default_value = "san")]
        to: Notation,
        /// Moves played in order, each in any notation
        moves: Vec<String>,
    },
    /// Mate, stalemate and draw status of a position
    Status {
        /// "startpos", a suite position name, or a FEN
        position: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Notation {
    San,
    Lan,
    An,
    Fan,
}

impl From<Notation> for NotationKind {
    fn from(notation: Notation) -> Self {
        match notation {
            Notation::San => NotationKind::San,
            Notation::Lan => NotationKind::Lan,
            Notation::An => NotationKind::An,
            Notation::Fan => NotationKind::Fan,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let suite = PerftSuite::load(&cli.suite)
        .with_context(|| format!("loading suite {}", cli.suite.display()))?;

    match cli.command {
        Commands::Suite { depth, name } => {
            let report = run_suite(&suite, depth, name.as_deref())?;
            emit(cli.json, &report, |r| {
                for record in &r.records {
                    println!(
                        "{:<12} depth {:<2} {:>12} nodes {:>8} ms {:>12} nps  {}",
                        record.name,
                        record.depth,
                        record.nodes,
                        record.millis,
                        record.nodes_per_second(),
                        if record.passed { "ok" } else { "MISMATCH" }
                    );
                }
            })?;
            if report.failures > 0 {
                bail!("{} perft count(s) did not match", report.failures);
            }
        }
        Commands::Divide { position, depth } => {
            let mut position = resolve_position(&suite, &position)?;
            let start = Instant::now();
            let counts = perft_divide(&mut position, depth);
            info!(depth, millis = start.elapsed().as_millis() as u64, "divide finished");
            let report = DivideReport::new(position.to_fen(), depth, counts);
            emit(cli.json, &report, |r| {
                for entry in &r.moves {
                    println!("{}: {}", entry.mv, entry.nodes);
                }
                println!();
                println!("Moves: {}", r.moves.len());
                println!("Nodes: {}", r.total);
            })?;
        }
        Commands::See { position, mv } => {
            let mut position = resolve_position(&suite, &position)?;
            let m = notation::parse_any(&position, &mv)?;
            let score = see(&position, m);
            let report = SeeReport {
                fen: position.to_fen(),
                mv: m.to_coordinate(),
                san: notation::to_san(&mut position, m),
                score,
            };
            emit(cli.json, &report, |r| println!("{} ({}): {}", r.san, r.mv, r.score))?;
        }
        Commands::Convert {
            position,
            to,
            moves,
        } => {
            let position = resolve_position(&suite, &position)?;
            let report = convert(&position, &moves, to)?;
            emit(cli.json, &report, |r| println!("{}", r.moves.join(" ")))?;
        }
        Commands::Status { position } => {
            let position = resolve_position(&suite, &position)?;
            let report = StatusReport {
                fen: position.to_fen(),
                mode: format!("{:?}", gen_mode(&position)),
                legal_moves: generate_moves(&position).len(),
                in_check: position.is_check(),
                insufficient_material: rules::is_insufficient_material(&position),
                result: rules::game_result(&position).map(|r| format!("{:?}", r)),
            };
            emit(cli.json, &report, |r| {
                println!("{}", r.fen);
                println!("mode: {}, legal moves: {}", r.mode, r.legal_moves);
                println!("result: {}", r.result.as_deref().unwrap_or("in progress"));
            })?;
        }
    }
    Ok(())
}

/// Prints `value` as pretty JSON or through the text printer.
fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T)) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text(value);
    }
    Ok(())
}

/// Accepts "startpos", a suite entry name, or a FEN.
fn resolve_position(suite: &PerftSuite, text: &str) -> anyhow::Result<Position> {
    if text == "startpos" {
        return Ok(Position::startpos());
    }
    if let Ok(entry) = suite.get(text) {
        return Ok(entry.position()?);
    }
    Position::from_fen(text).with_context(|| format!("not a suite position or FEN: {}", text))
}

fn run_suite(suite: &PerftSuite, depth: u32, name: Option<&str>) -> anyhow::Result<SuiteReport> {
    let entries: Vec<&SuitePosition> = match name {
        Some(name) => vec![suite.get(name)?],
        None => suite.positions.iter().collect(),
    };

    let mut records = Vec::new();
    for entry in entries {
        let mut position = entry.position()?;
        info!(name = %entry.name, fen = %entry.fen, "running perft");
        for (d, expected) in entry.expectations(depth) {
            let start = Instant::now();
            let nodes = perft(&mut position, d);
            let millis = start.elapsed().as_millis();
            let passed = nodes == expected;
            if passed {
                info!(name = %entry.name, depth = d, nodes, millis = millis as u64, "ok");
            } else {
                error!(name = %entry.name, depth = d, nodes, expected, "perft mismatch");
            }
            records.push(PerftRecord {
                name: entry.name.clone(),
                depth: d,
                expected,
                nodes,
                passed,
                millis,
            });
        }
    }
    Ok(SuiteReport::new(records))
}

fn convert(position: &Position, texts: &[String], to: Notation) -> anyhow::Result<ConvertReport> {
    let moves = notation::list_to_moves(position, texts, None)?;
    let converted = match to {
        Notation::San => notation::list_to_san(position, &moves)?,
        Notation::Lan | Notation::An | Notation::Fan => {
            let mut scratch = position.clone();
            let mut out = Vec::with_capacity(moves.len());
            for &m in &moves {
                out.push(match to {
                    Notation::Lan => notation::to_lan(&scratch, m),
                    Notation::Fan => notation::to_fan(&mut scratch, m),
                    _ => notation::to_an(m),
                });
                scratch.apply_move(m);
            }
            out
        }
    };
    Ok(ConvertReport {
        fen: position.to_fen(),
        notation: format!("{:?}", NotationKind::from(to)),
        moves: converted,
    })
}
