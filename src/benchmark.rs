//! Benchmark mode: time every variant in batch and report the results.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use colored::Colorize;
use tiling_core::{run, AlgorithmKind, NullSink, RunConfig, RunRequest};

use crate::error::AppError;

/// Timing of one batch run.
#[derive(Debug)]
pub struct BenchmarkResult {
    pub algorithm: AlgorithmKind,
    pub board_size: usize,
    pub max_depth: u32,
    pub total_time: Duration,
}

/// Runs every variant once in batch mode on the given size and depth.
///
/// The grid variants get the size rounded up to the next power of two so a
/// single size works for all preconditions.
pub fn run_benchmarks(board_size: usize, max_depth: u32) -> Result<Vec<BenchmarkResult>, AppError> {
    let grid_size = board_size.max(2).next_power_of_two();
    let mut results = Vec::with_capacity(AlgorithmKind::ALL.len());
    for algorithm in AlgorithmKind::ALL {
        let size = if algorithm.is_grid() { grid_size } else { board_size };
        let depth = if algorithm == AlgorithmKind::Hilbert {
            max_depth.max(1)
        } else {
            max_depth
        };
        let request = RunRequest {
            algorithm,
            board_size: size,
            max_depth: depth,
            missing_cell: (algorithm == AlgorithmKind::Tromino).then_some((0, 0)),
        };
        log::info!("benchmarking {algorithm} (size {size}, depth {depth})");
        let start = Instant::now();
        run(&request, &RunConfig::default(), Arc::new(NullSink))?;
        results.push(BenchmarkResult {
            algorithm,
            board_size: size,
            max_depth: depth,
            total_time: start.elapsed(),
        });
    }
    Ok(results)
}

/// Prints a results table to stdout.
pub fn report_results(results: &[BenchmarkResult]) {
    println!("{}", "Benchmark Results".bold());
    println!(
        "{:<12} {:>6} {:>6} {:>12}",
        "algorithm".underline(),
        "size".underline(),
        "depth".underline(),
        "time".underline()
    );
    for result in results {
        println!(
            "{:<12} {:>6} {:>6} {:>12?}",
            result.algorithm.to_string(),
            result.board_size,
            result.max_depth,
            result.total_time
        );
    }
}

/// Writes the results as CSV.
pub fn write_csv_results(results: &[BenchmarkResult], path: &Path) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["algorithm", "board_size", "depth", "time_us"])?;
    for result in results {
        writer.write_record([
            result.algorithm.to_string(),
            result.board_size.to_string(),
            result.max_depth.to_string(),
            result.total_time.as_micros().to_string(),
        ])?;
    }
    writer.flush()?;
    log::info!("benchmark results written to {path:?}");
    Ok(())
}
