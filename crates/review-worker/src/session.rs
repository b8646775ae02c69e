//! Engine session: owns the single connection to the UCI engine.
//!
//! The session enforces the one-in-flight-request discipline. A request
//! issued while another is outstanding supersedes it: the engine is told
//! to `stop` before the new `position` is sent, the abandoned resolver is
//! never completed with the new position's data, and the stopped search's
//! trailing output is counted and dropped so it cannot be misattributed
//! to the new request.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, timeout, Instant};
use tracing::{debug, info, warn};

use crate::error::ReviewError;
use crate::uci::{parse_line, EngineScore, UciLine};

/// Raw result of one search, still from the engine's perspective.
#[derive(Debug, Clone, Default)]
pub struct RawAnalysis {
    /// Score from the last progress line seen, the running best estimate.
    pub score: Option<EngineScore>,
    pub best_move: Option<String>,
    pub pv: Vec<String>,
}

impl RawAnalysis {
    /// The zero-information fallback: no score, no move, no line.
    pub fn neutral() -> Self {
        RawAnalysis::default()
    }
}

/// Session tuning. Option values are passed through to the engine, not
/// interpreted here.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Bound on one search before the neutral fallback fires.
    pub request_timeout: Duration,
    /// Bound on each handshake stage (`uciok`, `readyok`).
    pub handshake_timeout: Duration,
    pub skill_level: Option<u8>,
    pub threads: Option<u32>,
    pub hash_mb: Option<u32>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            request_timeout: Duration::from_secs(10),
            handshake_timeout: Duration::from_secs(10),
            skill_level: None,
            threads: None,
            hash_mb: None,
        }
    }
}

struct AnalyzeRequest {
    fen: String,
    depth: u32,
    reply: oneshot::Sender<RawAnalysis>,
}

/// Handle to the engine actor. A session constructed with [`offline`]
/// (or one whose engine has died) resolves every request immediately with
/// the neutral fallback instead of failing the review.
///
/// [`offline`]: EngineSession::offline
pub struct EngineSession {
    request_tx: Option<mpsc::Sender<AnalyzeRequest>>,
    process: Option<Child>,
}

impl EngineSession {
    /// Spawn the engine process and run the readiness handshake.
    pub async fn open(path: &str, options: SessionOptions) -> Result<Self, ReviewError> {
        info!(path, "Spawning engine");
        let mut process = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ReviewError::EngineUnavailable(format!("failed to spawn {path}: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| ReviewError::EngineUnavailable("no stdin handle".to_string()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| ReviewError::EngineUnavailable("no stdout handle".to_string()))?;

        let mut session = Self::with_io(stdin, stdout, options).await?;
        session.process = Some(process);
        Ok(session)
    }

    /// Build a session over an arbitrary reader/writer pair and run the
    /// handshake. Used by [`open`] and by test doubles speaking the same
    /// protocol over in-memory pipes.
    ///
    /// [`open`]: EngineSession::open
    pub async fn with_io<W, R>(
        mut writer: W,
        reader: R,
        options: SessionOptions,
    ) -> Result<Self, ReviewError>
    where
        W: AsyncWrite + Unpin + Send + 'static,
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (line_tx, mut line_rx) = mpsc::channel::<String>(64);
        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let trimmed = line.trim().to_string();
                        debug!(line = %trimmed, "SF >");
                        if line_tx.send(trimmed).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        debug!("engine stdout closed");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to read from engine");
                        break;
                    }
                }
            }
        });

        handshake(&mut writer, &mut line_rx, &options).await?;

        let (request_tx, request_rx) = mpsc::channel(16);
        tokio::spawn(run_actor(
            writer,
            line_rx,
            request_rx,
            options.request_timeout,
        ));

        Ok(EngineSession {
            request_tx: Some(request_tx),
            process: None,
        })
    }

    /// A degraded session: no engine, every request resolves immediately
    /// with the neutral fallback.
    pub fn offline() -> Self {
        EngineSession {
            request_tx: None,
            process: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.request_tx.is_some()
    }

    /// Sole entry point for scoring work. Never fails: engine faults
    /// degrade to the neutral fallback, and a superseded request resolves
    /// neutral as well, never with another position's data.
    pub async fn request(&self, fen: &str, depth: u32) -> RawAnalysis {
        let Some(tx) = &self.request_tx else {
            return RawAnalysis::neutral();
        };
        let (reply_tx, reply_rx) = oneshot::channel();
        let request = AnalyzeRequest {
            fen: fen.to_string(),
            depth,
            reply: reply_tx,
        };
        if tx.send(request).await.is_err() {
            return RawAnalysis::neutral();
        }
        reply_rx.await.unwrap_or_else(|_| RawAnalysis::neutral())
    }

    /// Shut the engine down, waiting briefly for a clean exit.
    pub async fn quit(mut self) {
        // Closing the request channel makes the actor send `quit`.
        self.request_tx.take();
        if let Some(mut process) = self.process.take() {
            let _ = timeout(Duration::from_secs(1), process.wait()).await;
            let _ = process.kill().await;
        }
    }
}

async fn send_command<W: AsyncWrite + Unpin>(writer: &mut W, cmd: &str) -> std::io::Result<()> {
    debug!(cmd, "SF <");
    writer.write_all(format!("{cmd}\n").as_bytes()).await?;
    writer.flush().await
}

/// Protocol identification and readiness: `uci`/`uciok`, option
/// passthrough, then `isready`/`readyok`, each stage bounded.
async fn handshake<W: AsyncWrite + Unpin>(
    writer: &mut W,
    lines: &mut mpsc::Receiver<String>,
    options: &SessionOptions,
) -> Result<(), ReviewError> {
    send_command(writer, "uci").await?;
    wait_for_ack(lines, options.handshake_timeout, |l| l == &UciLine::UciOk).await?;

    if let Some(level) = options.skill_level {
        let level = level.min(20);
        send_command(writer, &format!("setoption name Skill Level value {level}")).await?;
    }
    if let Some(threads) = options.threads {
        let threads = threads.clamp(1, 16);
        send_command(writer, &format!("setoption name Threads value {threads}")).await?;
    }
    if let Some(hash_mb) = options.hash_mb {
        let hash_mb = hash_mb.clamp(1, 2048);
        send_command(writer, &format!("setoption name Hash value {hash_mb}")).await?;
    }

    send_command(writer, "isready").await?;
    wait_for_ack(lines, options.handshake_timeout, |l| l == &UciLine::ReadyOk).await?;

    info!("Engine handshake complete");
    Ok(())
}

async fn wait_for_ack(
    lines: &mut mpsc::Receiver<String>,
    bound: Duration,
    matches: impl Fn(&UciLine) -> bool,
) -> Result<(), ReviewError> {
    let wait = async {
        while let Some(line) = lines.recv().await {
            if matches(&parse_line(&line)) {
                return Ok(());
            }
        }
        Err(ReviewError::EngineUnavailable(
            "engine closed during handshake".to_string(),
        ))
    };
    timeout(bound, wait)
        .await
        .map_err(|_| ReviewError::EngineUnavailable("handshake timed out".to_string()))?
}

/// In-flight search state. At most one exists at any instant.
struct Pending {
    fen: String,
    score: Option<EngineScore>,
    pv: Vec<String>,
    reply: oneshot::Sender<RawAnalysis>,
    deadline: Instant,
}

/// The session actor. Owns the writer and the inbound line stream;
/// `stale_searches` counts stopped searches whose trailing output must be
/// dropped before the current search's lines are trusted.
async fn run_actor<W: AsyncWrite + Unpin>(
    mut writer: W,
    mut lines: mpsc::Receiver<String>,
    mut requests: mpsc::Receiver<AnalyzeRequest>,
    request_timeout: Duration,
) {
    let mut pending: Option<Pending> = None;
    let mut stale_searches: u32 = 0;

    loop {
        let deadline = pending.as_ref().map(|p| p.deadline);
        tokio::select! {
            request = requests.recv() => {
                let Some(request) = request else {
                    let _ = send_command(&mut writer, "quit").await;
                    break;
                };
                if pending.take().is_some() {
                    // Supersede: the dropped resolver leaves the old
                    // caller on the neutral fallback.
                    debug!("superseding in-flight search");
                    if send_command(&mut writer, "stop").await.is_err() {
                        let _ = request.reply.send(RawAnalysis::neutral());
                        continue;
                    }
                    stale_searches += 1;
                }
                let position = format!("position fen {}", request.fen);
                let go = format!("go depth {}", request.depth);
                if send_command(&mut writer, &position).await.is_err()
                    || send_command(&mut writer, &go).await.is_err()
                {
                    warn!("engine write failed, resolving with neutral fallback");
                    let _ = request.reply.send(RawAnalysis::neutral());
                    continue;
                }
                pending = Some(Pending {
                    fen: request.fen,
                    score: None,
                    pv: Vec::new(),
                    reply: request.reply,
                    deadline: Instant::now() + request_timeout,
                });
            }
            line = lines.recv() => {
                let Some(line) = line else {
                    // Engine went away mid-session.
                    if let Some(p) = pending.take() {
                        warn!(fen = %p.fen, "engine closed, resolving with neutral fallback");
                        let _ = p.reply.send(RawAnalysis::neutral());
                    }
                    break;
                };
                match parse_line(&line) {
                    UciLine::Info { score, pv } => {
                        // Output from a stopped search belongs to no one.
                        if stale_searches == 0 {
                            if let Some(p) = pending.as_mut() {
                                if let Some(score) = score {
                                    p.score = Some(score);
                                }
                                if !pv.is_empty() {
                                    p.pv = pv;
                                }
                            }
                        }
                    }
                    UciLine::BestMove(best_move) => {
                        if stale_searches > 0 {
                            stale_searches -= 1;
                        } else if let Some(p) = pending.take() {
                            let _ = p.reply.send(RawAnalysis {
                                score: p.score,
                                best_move,
                                pv: p.pv,
                            });
                        }
                    }
                    _ => {}
                }
            }
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(p) = pending.take() {
                    warn!(fen = %p.fen, "engine response timed out, resolving with neutral fallback");
                    if send_command(&mut writer, "stop").await.is_ok() {
                        stale_searches += 1;
                    }
                    let _ = p.reply.send(RawAnalysis::neutral());
                }
            }
        }
    }
    debug!("engine session actor exiting");
}
