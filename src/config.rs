//! Command-line and file-based configuration for the host application.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;
use tiling_core::AlgorithmKind;

use crate::error::AppError;

/// Configuration for the tile-forge host application.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    /// Algorithm to run: domino, tromino, hilbert, koch, sierpinski, square.
    #[arg(short, long, default_value = "tromino")]
    pub algorithm: String,

    /// Board edge length (power of two for tromino, even for domino).
    #[arg(short = 's', long, default_value_t = 8)]
    pub board_size: usize,

    /// Recursion depth for the curve and fractal variants.
    #[arg(short, long, default_value_t = 4)]
    pub depth: u32,

    /// Row of the excluded cell (tromino only).
    #[arg(long, default_value_t = 0)]
    pub missing_row: usize,

    /// Column of the excluded cell (tromino only).
    #[arg(long, default_value_t = 0)]
    pub missing_col: usize,

    /// Animate the construction instead of computing one batch result.
    #[arg(long, default_value_t = false)]
    pub animate: bool,

    /// Override the per-tick animation delay (e.g. "20ms").
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub step_delay: Option<Duration>,

    /// Cancel the run after this much wall time (e.g. "5s").
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub max_runtime: Option<Duration>,

    /// Path to save the final board or point path.
    #[arg(short, long, value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Optional TOML file with per-variant timing overrides.
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Run every variant once in batch mode and report timings.
    #[arg(long, default_value_t = false)]
    pub benchmark_mode: bool,

    /// Optional: Path to save benchmark results as a CSV file.
    /// Only used if benchmark_mode is also enabled.
    #[arg(long, value_name = "CSV_FILE")]
    pub benchmark_csv_output: Option<PathBuf>,
}

/// Per-variant animation delays, loadable from a TOML file and overridable
/// through `TILE_FORGE_*` environment variables.
#[derive(Debug, Default, Deserialize)]
pub struct TimingSettings {
    pub domino_delay_ms: Option<u64>,
    pub tromino_delay_ms: Option<u64>,
    pub hilbert_delay_ms: Option<u64>,
    pub koch_delay_ms: Option<u64>,
    pub sierpinski_delay_ms: Option<u64>,
    pub square_delay_ms: Option<u64>,
}

impl TimingSettings {
    /// Loads settings from the optional file, then applies environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed("TILE_FORGE_"))
            .extract()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    /// Configured delay for a variant, if any.
    pub fn delay_for(&self, kind: AlgorithmKind) -> Option<Duration> {
        let millis = match kind {
            AlgorithmKind::Domino => self.domino_delay_ms,
            AlgorithmKind::Tromino => self.tromino_delay_ms,
            AlgorithmKind::Hilbert => self.hilbert_delay_ms,
            AlgorithmKind::Koch => self.koch_delay_ms,
            AlgorithmKind::Sierpinski => self.sierpinski_delay_ms,
            AlgorithmKind::SquareCarpet => self.square_delay_ms,
        };
        millis.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_args() {
        let args = vec![
            "tile-forge",
            "--algorithm",
            "hilbert",
            "--board-size",
            "16",
            "--depth",
            "3",
        ];
        let config = AppConfig::try_parse_from(args).unwrap();
        assert_eq!(config.algorithm, "hilbert");
        assert_eq!(config.board_size, 16);
        assert_eq!(config.depth, 3);
        assert_eq!(config.missing_row, 0); // Default
        assert!(!config.animate); // Default
        assert_eq!(config.output_path, None); // Default
    }

    #[test]
    fn test_animate_flag() {
        let args = vec!["tile-forge", "--animate"];
        let config = AppConfig::try_parse_from(args).unwrap();
        assert!(config.animate);
    }

    #[test]
    fn test_step_delay_parses_durations() {
        let args = vec!["tile-forge", "--step-delay", "20ms"];
        let config = AppConfig::try_parse_from(args).unwrap();
        assert_eq!(config.step_delay, Some(Duration::from_millis(20)));
    }

    #[test]
    fn test_max_runtime_parses_durations() {
        let args = vec!["tile-forge", "--max-runtime", "5s"];
        let config = AppConfig::try_parse_from(args).unwrap();
        assert_eq!(config.max_runtime, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_benchmark_csv_output_flag() {
        let args = vec![
            "tile-forge",
            "--benchmark-mode",
            "--benchmark-csv-output",
            "bench_results.csv",
        ];
        let config = AppConfig::try_parse_from(args).unwrap();
        assert!(config.benchmark_mode);
        assert_eq!(
            config.benchmark_csv_output,
            Some(PathBuf::from("bench_results.csv"))
        );
    }

    #[test]
    fn test_timing_settings_default_to_none() {
        let settings = TimingSettings::default();
        for kind in AlgorithmKind::ALL {
            assert_eq!(settings.delay_for(kind), None);
        }
    }

    #[test]
    fn test_timing_settings_delay_lookup() {
        let settings = TimingSettings {
            hilbert_delay_ms: Some(5),
            ..TimingSettings::default()
        };
        assert_eq!(
            settings.delay_for(AlgorithmKind::Hilbert),
            Some(Duration::from_millis(5))
        );
        assert_eq!(settings.delay_for(AlgorithmKind::Koch), None);
    }
}
