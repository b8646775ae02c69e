//! End-to-end review of a synthetic four-move game with scripted engine
//! responses.

mod common;

use std::collections::HashMap;

use common::{position_count, scripted_session, EngineScript};
use review_core::export::export_review_json;
use review_core::Classification;
use review_worker::cache::{side_to_move, Analyzer};
use review_worker::game::build_move_records;
use review_worker::review::{GameReviewer, ReviewState};
use review_worker::session::SessionOptions;

#[tokio::test]
async fn four_move_game_flags_the_blunder() {
    let sans: Vec<String> = ["e4", "e5", "Nf3", "Nc6"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let records = build_move_records(&sans).unwrap();

    // White-relative story: quiet until White's third move throws the
    // game away (+0.20 -> -3.50).
    let white_relative: Vec<(&str, i32)> = vec![
        (&records[0].fen_before, 20),
        (&records[0].fen_after, 30),
        (&records[1].fen_after, 20),
        (&records[2].fen_after, -350),
        (&records[3].fen_after, -350),
    ];
    // The scripted engine answers from the side to move's perspective.
    let evals: HashMap<String, i32> = white_relative
        .into_iter()
        .map(|(fen, cp)| {
            let engine_cp = if side_to_move(fen).is_white() { cp } else { -cp };
            (fen.to_string(), engine_cp)
        })
        .collect();

    let (session, log) = scripted_session(EngineScript::from_evals(evals), SessionOptions::default()).await;
    let mut reviewer = GameReviewer::new(Analyzer::new(session, 12));

    let mut reported = Vec::new();
    let review = reviewer
        .generate_review(&records, |p| reported.push(p))
        .await
        .unwrap();

    assert_eq!(reviewer.state(), ReviewState::Complete);
    assert_eq!(reported, vec![25, 50, 75, 100]);

    // Eight evaluations, five distinct positions, five engine calls.
    assert_eq!(position_count(&log), 5);

    // The blunder: +0.20 -> -3.50 for White is a 3.70 pawn loss.
    let blunder = &review.moves[2];
    assert_eq!(blunder.record.san, "Nf3");
    assert!((blunder.eval_loss - 3.70).abs() < 1e-9);
    assert_eq!(blunder.classification, Classification::Blunder);
    assert_eq!(blunder.best_move.as_deref(), Some("e2e4"));
    assert!(blunder.comment.contains("e2e4"));
    assert_eq!(blunder.eval_before, 0.20);
    assert_eq!(blunder.eval_after, -3.50);

    // The quiet moves lose nothing.
    for i in [0usize, 1, 3] {
        assert_eq!(review.moves[i].eval_loss, 0.0, "ply {i}");
        assert_eq!(review.moves[i].classification, Classification::Great);
    }

    // Summary: White averages (0 + 3.7)/2 = 1.85 -> round(100 - 46.25).
    assert_eq!(review.summary.white_accuracy, 54);
    assert_eq!(review.summary.black_accuracy, 100);
    assert_eq!(review.summary.blunders, 1);
    assert_eq!(review.summary.white_classifications.blunder, 1);
    assert_eq!(review.summary.white_classifications.great, 1);
    assert_eq!(review.summary.black_classifications.great, 2);

    // The blunder is the only key moment.
    assert_eq!(review.summary.key_moments.len(), 1);
    assert_eq!(review.summary.key_moments[0].ply, 2);
    assert!((review.summary.key_moments[0].eval_loss - 3.70).abs() < 1e-9);

    // Export carries the same verdicts under the external field names.
    let json = export_review_json(&review).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["moves"][2]["classification"], "Blunder");
    assert_eq!(value["summary"]["whiteAccuracy"], 54);
    assert_eq!(value["summary"]["keyMoments"][0]["moveIndex"], 2);

    reviewer.shutdown().await;
}

#[tokio::test]
async fn clear_review_forces_fresh_engine_calls() {
    let sans: Vec<String> = ["d4", "d5"].iter().map(|s| s.to_string()).collect();
    let records = build_move_records(&sans).unwrap();

    let (session, log) = scripted_session(
        EngineScript::from_evals(HashMap::new()),
        SessionOptions::default(),
    )
    .await;
    let mut reviewer = GameReviewer::new(Analyzer::new(session, 10));

    reviewer.generate_review(&records, |_| {}).await.unwrap();
    let first_run = position_count(&log);
    assert_eq!(first_run, 3);

    // Without a reset the second run is served from cache.
    reviewer.generate_review(&records, |_| {}).await.unwrap();
    assert_eq!(position_count(&log), first_run);

    // After a reset every position is analyzed again.
    reviewer.clear_review();
    reviewer.generate_review(&records, |_| {}).await.unwrap();
    assert_eq!(position_count(&log), first_run * 2);

    reviewer.shutdown().await;
}
