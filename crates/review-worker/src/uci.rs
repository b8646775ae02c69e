//! UCI line codec.
//!
//! Only the lines the review cares about are modeled; everything else maps
//! to [`UciLine::Other`] and is ignored by the session (malformed protocol
//! lines are never fatal).

/// Score token as reported by the engine, from the side to move's
/// perspective. White-relative normalization happens later, in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineScore {
    Cp(i32),
    Mate(i32),
}

/// One inbound engine line, decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum UciLine {
    UciOk,
    ReadyOk,
    Info {
        score: Option<EngineScore>,
        pv: Vec<String>,
    },
    /// Terminal line of a search. `None` when the engine reports
    /// `bestmove (none)` (no legal move in the position).
    BestMove(Option<String>),
    Other,
}

/// Decode a single trimmed engine line.
pub fn parse_line(line: &str) -> UciLine {
    if line == "uciok" {
        return UciLine::UciOk;
    }
    if line == "readyok" {
        return UciLine::ReadyOk;
    }
    if let Some(rest) = line.strip_prefix("bestmove") {
        let mv = rest.split_whitespace().next();
        return match mv {
            Some("(none)") | None => UciLine::BestMove(None),
            Some(mv) => UciLine::BestMove(Some(mv.to_string())),
        };
    }
    if line == "info" || line.starts_with("info ") {
        return UciLine::Info {
            score: parse_score(line),
            pv: parse_pv(line),
        };
    }
    UciLine::Other
}

/// Extract the `score cp N` / `score mate N` token pair from an info line.
fn parse_score(line: &str) -> Option<EngineScore> {
    let mut tokens = line.split_whitespace();
    while let Some(token) = tokens.next() {
        if token != "score" {
            continue;
        }
        let kind = tokens.next()?;
        let value: i32 = tokens.next()?.parse().ok()?;
        return match kind {
            "cp" => Some(EngineScore::Cp(value)),
            "mate" => Some(EngineScore::Mate(value)),
            _ => None,
        };
    }
    None
}

/// Extract the principal variation from an info line.
fn parse_pv(line: &str) -> Vec<String> {
    let Some(idx) = line.find(" pv ") else {
        return Vec::new();
    };
    line[idx + 4..]
        .split_whitespace()
        .take_while(|t| !t.starts_with("bmc") && *t != "string")
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cp_info() {
        let line = "info depth 20 seldepth 25 multipv 1 score cp 35 nodes 100000 pv e2e4 e7e5";
        assert_eq!(
            parse_line(line),
            UciLine::Info {
                score: Some(EngineScore::Cp(35)),
                pv: vec!["e2e4".to_string(), "e7e5".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_mate_info() {
        let line = "info depth 12 score mate -3 nodes 4000 pv g8h8";
        assert_eq!(
            parse_line(line),
            UciLine::Info {
                score: Some(EngineScore::Mate(-3)),
                pv: vec!["g8h8".to_string()],
            }
        );
    }

    #[test]
    fn test_info_without_score() {
        let line = "info depth 1 currmove e2e4 currmovenumber 1";
        assert_eq!(
            parse_line(line),
            UciLine::Info {
                score: None,
                pv: Vec::new(),
            }
        );
    }

    #[test]
    fn test_parse_bestmove_with_ponder() {
        assert_eq!(
            parse_line("bestmove e2e4 ponder e7e5"),
            UciLine::BestMove(Some("e2e4".to_string()))
        );
    }

    #[test]
    fn test_parse_bestmove_none() {
        assert_eq!(parse_line("bestmove (none)"), UciLine::BestMove(None));
    }

    #[test]
    fn test_handshake_acks() {
        assert_eq!(parse_line("uciok"), UciLine::UciOk);
        assert_eq!(parse_line("readyok"), UciLine::ReadyOk);
    }

    #[test]
    fn test_unknown_lines_are_other() {
        assert_eq!(parse_line("id name Stockfish 16"), UciLine::Other);
        assert_eq!(parse_line("garbage %% line"), UciLine::Other);
        assert_eq!(parse_line(""), UciLine::Other);
    }
}
