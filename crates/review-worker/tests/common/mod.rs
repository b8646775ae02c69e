//! Scripted in-process engine speaking UCI over an in-memory pipe.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

use review_worker::session::{EngineSession, SessionOptions};

/// Every command line the session sent, in order.
pub type CommandLog = Arc<Mutex<Vec<String>>>;

pub struct EngineScript {
    /// Lines to emit for a `go` on the given FEN. A script that emits no
    /// `bestmove` leaves the search running until `stop`.
    pub on_go: Box<dyn FnMut(&str) -> Vec<String> + Send>,
    /// Whether a running search answers `stop` with a `bestmove`.
    pub respond_to_stop: bool,
}

impl EngineScript {
    /// Script that answers every position from a FEN -> centipawn map
    /// (engine perspective), with `e2e4` as the chosen move.
    pub fn from_evals(evals: HashMap<String, i32>) -> Self {
        EngineScript {
            on_go: Box::new(move |fen| {
                let cp = evals.get(fen).copied().unwrap_or(0);
                vec![
                    format!("info depth 10 score cp {} pv e2e4 e7e5", cp + 7),
                    format!("info depth 15 score cp {cp} pv e2e4"),
                    "bestmove e2e4".to_string(),
                ]
            }),
            respond_to_stop: true,
        }
    }
}

/// Open a session against the scripted engine.
pub async fn scripted_session(
    script: EngineScript,
    options: SessionOptions,
) -> (EngineSession, CommandLog) {
    let (client, server) = duplex(16 * 1024);
    let log: CommandLog = Arc::new(Mutex::new(Vec::new()));
    tokio::spawn(run_engine(server, log.clone(), script));
    let (read, write) = tokio::io::split(client);
    let session = EngineSession::with_io(write, read, options)
        .await
        .expect("scripted engine handshake");
    (session, log)
}

async fn run_engine(server: DuplexStream, log: CommandLog, mut script: EngineScript) {
    let (read, mut write) = tokio::io::split(server);
    let mut lines = BufReader::new(read).lines();
    let mut current_fen = String::new();
    let mut searching = false;

    while let Ok(Some(line)) = lines.next_line().await {
        log.lock().unwrap().push(line.clone());
        if line == "uci" {
            let _ = write.write_all(b"id name scripted 1.0\nuciok\n").await;
        } else if line == "isready" {
            let _ = write.write_all(b"readyok\n").await;
        } else if let Some(fen) = line.strip_prefix("position fen ") {
            current_fen = fen.to_string();
        } else if line.starts_with("go") {
            searching = true;
            for out in (script.on_go)(&current_fen) {
                if out.starts_with("bestmove") {
                    searching = false;
                }
                let _ = write.write_all(format!("{out}\n").as_bytes()).await;
            }
        } else if line == "stop" {
            if searching && script.respond_to_stop {
                searching = false;
                let _ = write.write_all(b"bestmove 0000\n").await;
            }
        } else if line == "quit" {
            break;
        }
    }
}

/// Number of `position` commands the engine received.
pub fn position_count(log: &CommandLog) -> usize {
    log.lock()
        .unwrap()
        .iter()
        .filter(|l| l.starts_with("position"))
        .count()
}

/// Index of the first logged command starting with `prefix`.
pub fn index_of(log: &CommandLog, prefix: &str) -> Option<usize> {
    log.lock()
        .unwrap()
        .iter()
        .position(|l| l.starts_with(prefix))
}
