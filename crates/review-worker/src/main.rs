//! Game review worker
//!
//! Reviews a finished game move by move with a UCI engine and prints the
//! JSON review to stdout. Input is a movetext file (SAN), or `-` for
//! stdin.

use std::io::Read;

use tracing::{info, warn};

use review_core::export::export_review_json;
use review_worker::cache::Analyzer;
use review_worker::config::ReviewConfig;
use review_worker::game;
use review_worker::review::GameReviewer;
use review_worker::session::EngineSession;

struct CliArgs {
    moves_path: String,
    depth: Option<u32>,
}

/// Parse `<moves-file> [--depth N]` from CLI args.
fn parse_args() -> Option<CliArgs> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut moves_path = None;
    let mut depth = None;
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--depth" {
            depth = args.get(i + 1).and_then(|v| v.parse().ok());
            i += 2;
        } else {
            moves_path = Some(args[i].clone());
            i += 1;
        }
    }
    Some(CliArgs {
        moves_path: moves_path?,
        depth,
    })
}

fn read_movetext(path: &str) -> std::io::Result<String> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(path)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let Some(args) = parse_args() else {
        eprintln!("Usage: review-worker <moves-file|-> [--depth N]");
        std::process::exit(2);
    };

    let mut config = ReviewConfig::load()?;
    if let Some(depth) = args.depth {
        config.depth = depth;
    }
    info!(
        stockfish_path = %config.stockfish_path,
        depth = config.depth,
        timeout_secs = config.request_timeout_secs,
        "Review config loaded"
    );

    let movetext = read_movetext(&args.moves_path)?;
    let sans = game::split_movetext(&movetext);
    let records = game::build_move_records(&sans)?;
    info!(moves = records.len(), "Game loaded");

    // An engine that fails to start degrades the whole review to neutral
    // evaluations instead of aborting it.
    let session = match EngineSession::open(&config.stockfish_path, config.session_options()).await
    {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "Engine unavailable, reviewing with neutral evaluations");
            EngineSession::offline()
        }
    };

    let mut reviewer = GameReviewer::new(Analyzer::new(session, config.depth));
    let review = reviewer
        .generate_review(&records, |percent| info!(percent, "Analyzing"))
        .await?;

    println!("{}", export_review_json(&review)?);

    reviewer.shutdown().await;
    Ok(())
}
