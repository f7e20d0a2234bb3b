//! Saves the final artifact to a file in a simple text format.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tiling_core::{Board, PathElement, PointPath, RunArtifact};

/// Saves a run artifact to `output_path`.
///
/// Boards are written as space-separated tile ids, one row per line. Point
/// paths are written as one `x y` pair per line with a blank line at each
/// pen lift.
pub fn save_artifact(artifact: &RunArtifact, output_path: &Path) -> Result<()> {
    log::info!("saving artifact to {output_path:?}");
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {output_path:?}"))?;
    let mut writer = io::BufWriter::new(file);

    match artifact {
        RunArtifact::Board(board) => {
            let board = board.lock().expect("board mutex poisoned");
            write_board(&mut writer, &board)?;
        }
        RunArtifact::Path(path) => {
            let path = path.lock().expect("path mutex poisoned");
            write_path(&mut writer, &path)?;
        }
    }

    writer
        .flush()
        .context("Failed to flush writer for output file")?;
    log::info!("artifact saved to {output_path:?}");
    Ok(())
}

fn write_board(writer: &mut impl Write, board: &Board) -> Result<()> {
    for row in board.rows() {
        let line = row
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{line}").context("Failed to write board row")?;
    }
    Ok(())
}

fn write_path(writer: &mut impl Write, path: &PointPath) -> Result<()> {
    for element in path.elements() {
        match element {
            PathElement::Point(p) => {
                writeln!(writer, "{} {}", p.x, p.y).context("Failed to write path point")?;
            }
            PathElement::Break => {
                writeln!(writer).context("Failed to write pen lift")?;
            }
        }
    }
    Ok(())
}
