//! tile-forge: host application driving the tiling/fractal engine.
//!
//! Owns the run flag and the execution substrates (rayon pool in batch mode,
//! timer queue in animated mode), wires a console sink into the engine, and
//! exports the finished artifact.

mod benchmark;
mod config;
mod error;
mod output;
mod progress;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use config::{AppConfig, TimingSettings};
use progress::{ConsoleSink, Terminal};
use tiling_core::{
    engine, AlgorithmKind, ExecutionMode, RunConfig, RunRequest, StepTimer,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().filter_or("RUST_LOG", "info")).init();

    let args = AppConfig::parse();
    log::debug!("loaded config: {args:?}");

    if args.benchmark_mode {
        let results = benchmark::run_benchmarks(args.board_size, args.depth)?;
        benchmark::report_results(&results);
        if let Some(path) = &args.benchmark_csv_output {
            benchmark::write_csv_results(&results, path)?;
        }
        return Ok(());
    }

    let kind: AlgorithmKind = args.algorithm.parse()?;
    let settings = TimingSettings::load(args.settings.as_deref())?;
    let mode = if args.animate {
        ExecutionMode::Animated
    } else {
        ExecutionMode::Batch
    };

    let request = RunRequest {
        algorithm: kind,
        board_size: args.board_size,
        max_depth: args.depth,
        missing_cell: (kind == AlgorithmKind::Tromino)
            .then_some((args.missing_row, args.missing_col)),
    };

    let estimate = kind.estimated_runtime(args.board_size, args.depth, mode);
    println!(
        "Running {kind} (size {}, depth {}), estimated {}",
        args.board_size,
        args.depth,
        humantime::format_duration(estimate)
    );

    let running = Arc::new(AtomicBool::new(true));
    if let Some(limit) = args.max_runtime {
        let watchdog_flag = Arc::clone(&running);
        thread::spawn(move || {
            thread::sleep(limit);
            if watchdog_flag.swap(false, Ordering::Relaxed) {
                log::warn!(
                    "max runtime {} reached, cancelling run",
                    humantime::format_duration(limit)
                );
            }
        });
    }

    // The timer outlives the run so outstanding animated ticks stay valid;
    // dropping it on exit cancels anything left.
    let timer = StepTimer::new();
    let mut builder = RunConfig::builder()
        .mode(mode)
        .running(Arc::clone(&running))
        .timer(timer.handle());
    if let Some(delay) = args.step_delay.or_else(|| settings.delay_for(kind)) {
        builder = builder.step_delay(delay);
    }
    let run_config = builder.build();

    let sink = Arc::new(ConsoleSink::new(
        args.animate && kind.is_grid(),
        Duration::from_millis(250),
    ));
    let artifact = engine::run(&request, &run_config, sink.clone())?;

    if mode == ExecutionMode::Animated {
        match sink.wait_for_terminal(&running, Duration::from_millis(500)) {
            Some(Terminal::Completed) => {}
            Some(Terminal::Failed(message)) => anyhow::bail!("run failed: {message}"),
            None => log::warn!("run cancelled before completion"),
        }
    }

    match &artifact {
        tiling_core::RunArtifact::Board(board) => {
            let board = board.lock().expect("board mutex poisoned");
            progress::render_board(&board);
        }
        tiling_core::RunArtifact::Path(path) => {
            let path = path.lock().expect("path mutex poisoned");
            println!("Generated {} path elements", path.len());
        }
    }

    if let Some(path) = &args.output_path {
        output::save_artifact(&artifact, path)?;
    }

    log::info!("tile-forge finished");
    Ok(())
}
