use clap::Parser;
use haunted_rescue_server::engine::GameEngine;
use haunted_rescue_server::types::{GameStatus, PolicyMode};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// A game that has not ended after this many agent turns is reported as
/// truncated instead of looping forever.
const TURN_SAFETY_LIMIT: u32 = 10_000;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Number of games to play; each run offsets the base seed by one.
    #[arg(long, default_value_t = 10)]
    runs: u32,
    #[arg(long)]
    seed: Option<u64>,
    /// "naive" or "strategic".
    #[arg(long, default_value = "strategic")]
    mode: String,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct RunResultLine {
    run: u32,
    seed: u32,
    mode: PolicyMode,
    outcome: GameStatus,
    turns: u32,
    #[serde(rename = "savedVictims")]
    saved_victims: i32,
    #[serde(rename = "scaredVictims")]
    scared_victims: i32,
    #[serde(rename = "damagePoints")]
    damage_points: i32,
    truncated: bool,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "batchId")]
    batch_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "runCount")]
    run_count: usize,
    #[serde(rename = "winRate")]
    win_rate: f32,
    #[serde(rename = "averageTurns")]
    average_turns: f32,
    #[serde(rename = "averageSaved")]
    average_saved: f32,
    #[serde(rename = "averageDamage")]
    average_damage: f32,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    runs: Vec<RunResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "batchId")]
    batch_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    run: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let mode = PolicyMode::parse(&cli.mode);
    let base_seed = cli.seed.unwrap_or_else(now_ms);
    let started_at_ms = now_ms();
    let batch_id = format!("sim-{}-{}", base_seed as u32, started_at_ms);

    emit_log(
        "info",
        "batch_started",
        &batch_id,
        None,
        None,
        json!({ "runs": cli.runs, "mode": mode, "baseSeed": base_seed as u32 }),
    );

    let mut results = Vec::new();
    let mut has_truncation = false;
    for run in 0..cli.runs {
        let seed = (base_seed + run as u64) as u32;
        let line = run_game(run, seed, mode);
        if line.truncated {
            has_truncation = true;
            emit_log(
                "warn",
                "turn_limit_exceeded",
                &batch_id,
                Some(run),
                Some(seed),
                json!({ "limit": TURN_SAFETY_LIMIT }),
            );
        }
        emit_log(
            "info",
            "game_finished",
            &batch_id,
            Some(run),
            Some(seed),
            json!({
                "outcome": line.outcome,
                "turns": line.turns,
                "savedVictims": line.saved_victims,
                "damagePoints": line.damage_points,
            }),
        );
        println!(
            "{}",
            serde_json::to_string(&line).expect("run result should serialize")
        );
        results.push(line);
    }

    let summary = build_summary(batch_id.clone(), started_at_ms, now_ms(), results);

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &batch_id,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "batch_finished",
        &batch_id,
        None,
        None,
        json!({
            "runCount": summary.run_count,
            "winRate": summary.win_rate,
            "averageTurns": summary.average_turns,
            "outcomeCounts": summary.outcome_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_truncation {
        std::process::exit(1);
    }
}

fn run_game(run: u32, seed: u32, mode: PolicyMode) -> RunResultLine {
    let mut engine = GameEngine::new(mode, seed);
    let mut truncated = true;
    for _ in 0..TURN_SAFETY_LIMIT {
        if engine.advance_one_agent().is_none() {
            truncated = false;
            break;
        }
    }
    RunResultLine {
        run,
        seed,
        mode,
        outcome: engine.status(),
        turns: engine.steps(),
        saved_victims: engine.rescued(),
        scared_victims: engine.scared(),
        damage_points: engine.damage_points(),
        truncated,
    }
}

fn build_summary(
    batch_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    runs: Vec<RunResultLine>,
) -> RunSummary {
    let run_count = runs.len();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut wins = 0usize;
    let mut total_turns = 0u64;
    let mut total_saved = 0i64;
    let mut total_damage = 0i64;
    for line in &runs {
        *outcome_counts.entry(outcome_key(line.outcome)).or_insert(0) += 1;
        if line.outcome == GameStatus::Won {
            wins += 1;
        }
        total_turns += line.turns as u64;
        total_saved += line.saved_victims as i64;
        total_damage += line.damage_points as i64;
    }
    let denom = run_count.max(1) as f32;
    RunSummary {
        batch_id,
        started_at_ms,
        finished_at_ms,
        run_count,
        win_rate: wins as f32 / denom,
        average_turns: total_turns as f32 / denom,
        average_saved: total_saved as f32 / denom,
        average_damage: total_damage as f32 / denom,
        outcome_counts,
        runs,
    }
}

fn outcome_key(status: GameStatus) -> String {
    match status {
        GameStatus::InProgress => "in_progress",
        GameStatus::Won => "won",
        GameStatus::Lost => "lost",
    }
    .to_string()
}

fn emit_log(
    level: &str,
    event: &str,
    batch_id: &str,
    run: Option<u32>,
    seed: Option<u32>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        batch_id: batch_id.to_string(),
        run,
        seed,
        details,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&log_line).expect("structured log should serialize")
    );
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, summary_text)
}
