//! Batch-mode engine tests: lifecycle ordering, artifact contents,
//! determinism across repeated runs.

mod common;

use std::sync::Arc;

use common::{Event, RecordingSink};
use tiling_core::{
    run, AlgorithmKind, PathElement, RunConfig, RunRequest, TilingError,
};

fn request(algorithm: AlgorithmKind, board_size: usize, max_depth: u32) -> RunRequest {
    RunRequest {
        algorithm,
        board_size,
        max_depth,
        missing_cell: None,
    }
}

#[test]
fn batch_domino_emits_one_step_then_completed() {
    let sink = Arc::new(RecordingSink::new());
    run(
        &request(AlgorithmKind::Domino, 4, 0),
        &RunConfig::default(),
        sink.clone(),
    )
    .expect("run failed");

    let events = sink.events();
    assert_eq!(events.len(), 3);
    assert_eq!(
        events[0],
        Event::Started {
            board_size: 4,
            max_depth: 0
        }
    );
    let Event::Step {
        sequence,
        board: Some(board),
    } = &events[1]
    else {
        panic!("expected a board step, got {:?}", events[1]);
    };
    assert_eq!(*sequence, 8);
    assert!(board.is_complete());
    for id in 1..=8 {
        assert!(board.rows().flatten().any(|&c| c == id), "id {id} missing");
    }
    assert_eq!(events[2], Event::Completed);
}

#[test]
fn batch_tromino_fills_deficient_board() {
    let sink = Arc::new(RecordingSink::new());
    let mut req = request(AlgorithmKind::Tromino, 8, 0);
    req.missing_cell = Some((5, 2));
    let artifact = run(&req, &RunConfig::default(), sink.clone()).expect("run failed");

    assert_eq!(sink.step_count(), 1);
    assert_eq!(sink.events().last(), Some(&Event::Completed));

    let board = artifact.board().expect("tromino produces a board");
    let board = board.lock().unwrap();
    assert_eq!(board.get(5, 2), Some(-1));
    let unfilled = board.rows().flatten().filter(|&&c| c == 0).count();
    assert_eq!(unfilled, 0);
}

#[test]
fn batch_curve_steps_carry_no_board() {
    let sink = Arc::new(RecordingSink::new());
    let artifact = run(
        &request(AlgorithmKind::Hilbert, 16, 3),
        &RunConfig::default(),
        sink.clone(),
    )
    .expect("run failed");

    let events = sink.events();
    assert!(matches!(
        events[1],
        Event::Step {
            sequence: 64,
            board: None
        }
    ));
    let path = artifact.path().expect("hilbert produces a path");
    assert_eq!(path.lock().unwrap().len(), 64);
}

#[test]
fn rejected_request_emits_no_notifications() {
    let sink = Arc::new(RecordingSink::new());
    let result = run(
        &request(AlgorithmKind::Domino, 5, 0),
        &RunConfig::default(),
        sink.clone(),
    );
    assert!(matches!(result, Err(TilingError::Configuration(_))));
    assert!(sink.events().is_empty());
}

#[test]
fn repeated_domino_runs_produce_identical_boards() {
    let boards: Vec<_> = (0..3)
        .map(|_| {
            let artifact = run(
                &request(AlgorithmKind::Domino, 6, 0),
                &RunConfig::default(),
                Arc::new(RecordingSink::new()),
            )
            .expect("run failed");
            let board = artifact.board().unwrap().lock().unwrap().clone();
            board
        })
        .collect();
    assert_eq!(boards[0], boards[1]);
    assert_eq!(boards[1], boards[2]);
}

#[test]
fn repeated_parallel_curve_runs_produce_identical_paths() {
    for kind in [
        AlgorithmKind::Koch,
        AlgorithmKind::Sierpinski,
        AlgorithmKind::SquareCarpet,
        AlgorithmKind::Hilbert,
    ] {
        let paths: Vec<Vec<PathElement>> = (0..3)
            .map(|_| {
                let artifact = run(
                    &request(kind, 81, 4),
                    &RunConfig::default(),
                    Arc::new(RecordingSink::new()),
                )
                .expect("run failed");
                let path = artifact.path().unwrap().lock().unwrap().clone();
                path.elements().to_vec()
            })
            .collect();
        assert_eq!(paths[0], paths[1], "{kind} differs between runs");
        assert_eq!(paths[1], paths[2], "{kind} differs between runs");
    }
}

#[test]
fn sierpinski_batch_counts_match_depth() {
    let sink = Arc::new(RecordingSink::new());
    run(
        &request(AlgorithmKind::Sierpinski, 100, 3),
        &RunConfig::default(),
        sink.clone(),
    )
    .expect("run failed");
    let events = sink.events();
    // 3^3 leaf triangles, 7 elements each.
    assert!(matches!(
        events[1],
        Event::Step {
            sequence: 189,
            board: None
        }
    ));
}

#[test]
fn started_always_precedes_steps_and_terminal_comes_last() {
    for kind in AlgorithmKind::ALL {
        let sink = Arc::new(RecordingSink::new());
        let mut req = request(kind, 8, 2);
        if kind == AlgorithmKind::Tromino {
            req.missing_cell = Some((0, 0));
        }
        run(&req, &RunConfig::default(), sink.clone()).expect("run failed");

        let events = sink.events();
        assert!(
            matches!(events.first(), Some(Event::Started { .. })),
            "{kind}: first event was {:?}",
            events.first()
        );
        assert!(
            events.last().is_some_and(Event::is_terminal),
            "{kind}: last event was {:?}",
            events.last()
        );
        assert_eq!(
            events.iter().filter(|e| e.is_terminal()).count(),
            1,
            "{kind}: more than one terminal event"
        );
    }
}
