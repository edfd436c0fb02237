//! PGN import and export
//!
//! Import reads the first game of a PGN text: tag pairs, then movetext in SAN.
//! Comments (`{...}` and `;` to end of line), recursive variations, numeric
//! annotation glyphs and move-number indications are skipped. A `FEN` tag sets
//! the starting position. A leading byte order mark is ignored. Any move that
//! does not resolve against the running position fails the whole import.
//!
//! Export writes the seven-tag roster, `SetUp`/`FEN` when the game did not begin
//! from the standard position, and SAN movetext wrapped at 80 columns.

use crate::board::{move_notation, parse_fen, BoardAdapter};
use crate::error::{RulesError, RulesResult};
use shakmaty::san::{San, SanPlus};
use shakmaty::uci::UciMove as Uci;
use shakmaty::{Chess, Color, Move, Position};
use tracing::debug;

const STANDARD_START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const LINE_WIDTH: usize = 80;
const RESULT_TOKENS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// One game read from PGN
#[derive(Debug, Clone)]
pub struct PgnGame {
    /// Tag pairs in file order
    pub tags: Vec<(String, String)>,
    /// Position the movetext starts from
    pub start: Chess,
    /// Mainline moves, already validated
    pub moves: Vec<Move>,
    /// Game termination marker, if present
    pub result: Option<String>,
}

impl PgnGame {
    /// Value of the first tag named `name`
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Mainline in coordinate notation
    pub fn uci_moves(&self) -> Vec<String> {
        self.moves.iter().map(move_notation).collect()
    }

    /// Board at the start of the game with nothing played
    pub fn start_board(&self) -> RulesResult<BoardAdapter> {
        BoardAdapter::from_fen(&crate::board::fen_of(&self.start))
    }

    /// Board after the first `plies` mainline moves
    pub fn board_at(&self, plies: usize) -> RulesResult<BoardAdapter> {
        let mut board = self.start_board()?;
        for m in self.moves.iter().take(plies) {
            board.apply_move(m)?;
        }
        Ok(board)
    }
}

/// Roster tags written on export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnHeaders {
    pub event: String,
    pub site: String,
    /// `YYYY.MM.DD`; today's date when `None`
    pub date: Option<String>,
    pub round: String,
    pub white: String,
    pub black: String,
}

impl Default for PgnHeaders {
    fn default() -> Self {
        Self {
            event: "?".to_string(),
            site: "?".to_string(),
            date: None,
            round: "?".to_string(),
            white: "?".to_string(),
            black: "?".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Tag(String, String),
    Word(String),
}

fn malformed(reason: impl Into<String>) -> RulesError {
    RulesError::MalformedPgn {
        reason: reason.into(),
    }
}

/// Split PGN text into tag pairs and movetext words, dropping comments,
/// variations and annotation glyphs
fn tokenize(text: &str) -> RulesResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    let mut depth = 0usize;
    let mut seen_movetext = false;

    while let Some(&c) = chars.peek() {
        match c {
            '{' => {
                chars.next();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(_) => {}
                        None => return Err(malformed("unterminated comment")),
                    }
                }
            }
            ';' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '(' => {
                chars.next();
                depth += 1;
            }
            ')' => {
                chars.next();
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| malformed("unbalanced ')'"))?;
            }
            '[' if depth == 0 => {
                chars.next();
                let mut body = String::new();
                let mut in_quotes = false;
                loop {
                    match chars.next() {
                        Some('"') => {
                            in_quotes = !in_quotes;
                            body.push('"');
                        }
                        Some('\\') if in_quotes => {
                            if let Some(escaped) = chars.next() {
                                body.push(escaped);
                            }
                        }
                        Some(']') if !in_quotes => break,
                        Some(c) => body.push(c),
                        None => return Err(malformed("unterminated tag")),
                    }
                }
                // A second game begins once tags follow movetext
                if seen_movetext {
                    break;
                }
                tokens.push(parse_tag(&body)?);
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || "{}();[".contains(c) {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                if word.is_empty() {
                    // Stray ']' or '}' outside any construct
                    chars.next();
                    continue;
                }
                if depth == 0 {
                    seen_movetext = true;
                    let is_result = RESULT_TOKENS.contains(&word.as_str());
                    tokens.push(Token::Word(word));
                    if is_result {
                        break;
                    }
                }
            }
        }
    }
    if depth != 0 {
        return Err(malformed("unterminated variation"));
    }
    Ok(tokens)
}

fn parse_tag(body: &str) -> RulesResult<Token> {
    let body = body.trim();
    let (name, rest) = body
        .split_once(char::is_whitespace)
        .ok_or_else(|| malformed(format!("tag without value: [{}]", body)))?;
    let value = rest.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or_else(|| malformed(format!("tag value not quoted: [{}]", body)))?;
    Ok(Token::Tag(name.to_string(), value.to_string()))
}

/// Strip move numbers (`12.`, `12...`) glued to a SAN token
fn strip_move_number(word: &str) -> &str {
    let trimmed = word.trim_start_matches(|c: char| c.is_ascii_digit());
    if trimmed.len() != word.len() && trimmed.starts_with('.') {
        trimmed.trim_start_matches('.')
    } else {
        word
    }
}

/// SAN text with annotation suffixes removed and zero-style castling normalized
fn normalize_san(word: &str) -> String {
    let core = word.trim_end_matches(['!', '?']);
    match core.trim_end_matches(['+', '#']) {
        "0-0" => "O-O".to_string(),
        "0-0-0" => "O-O-O".to_string(),
        _ => core.to_string(),
    }
}

/// Parse the first game of a PGN text
pub fn parse_pgn(text: &str) -> RulesResult<PgnGame> {
    let tokens = tokenize(text.trim_start_matches('\u{feff}'))?;

    let mut tags = Vec::new();
    let mut words = Vec::new();
    for token in tokens {
        match token {
            Token::Tag(name, value) => tags.push((name, value)),
            Token::Word(word) => words.push(word),
        }
    }

    let start = match tags.iter().find(|(name, _)| name == "FEN") {
        Some((_, fen)) => parse_fen(fen)?,
        None => Chess::default(),
    };

    let mut position = start.clone();
    let mut moves = Vec::new();
    let mut result = None;

    for word in &words {
        if RESULT_TOKENS.contains(&word.as_str()) {
            result = Some(word.clone());
            break;
        }
        if word.starts_with('$') {
            continue;
        }
        let san_text = strip_move_number(word);
        if san_text.is_empty() || san_text.chars().all(|c| c.is_ascii_digit() || c == '.') {
            continue;
        }
        let san_text = normalize_san(san_text);
        let san = SanPlus::from_ascii(san_text.as_bytes())
            .map(|plus| plus.san)
            .or_else(|_| San::from_ascii(san_text.as_bytes()))
            .map_err(|_| malformed(format!("unreadable move {:?}", word)))?;
        let m = san.to_move(&position).map_err(|_| {
            malformed(format!(
                "illegal move {:?} after {} plies",
                word,
                moves.len()
            ))
        })?;
        position.play_unchecked(m);
        moves.push(m);
    }

    if tags.is_empty() && moves.is_empty() && result.is_none() {
        return Err(malformed("no game found"));
    }

    debug!("[PGN] Parsed game with {} tags and {} plies", tags.len(), moves.len());
    Ok(PgnGame {
        tags,
        start,
        moves,
        result,
    })
}

/// Render the adapter's undoable history as a PGN game
///
/// `result` overrides the result derived from the board, which is `*` while the
/// game is still in progress.
pub fn export_pgn(board: &BoardAdapter, headers: &PgnHeaders, result: Option<&str>) -> String {
    let root = board.root_position().clone();
    let root_fen = crate::board::fen_of(&root);
    let result = result
        .map(str::to_string)
        .or_else(|| board.game_result().map(|r| r.pgn_result().to_string()))
        .unwrap_or_else(|| "*".to_string());
    let date = headers
        .date
        .clone()
        .unwrap_or_else(|| chrono::Local::now().format("%Y.%m.%d").to_string());

    let mut pgn = String::new();
    pgn.push_str(&format!("[Event \"{}\"]\n", escape(&headers.event)));
    pgn.push_str(&format!("[Site \"{}\"]\n", escape(&headers.site)));
    pgn.push_str(&format!("[Date \"{}\"]\n", date));
    pgn.push_str(&format!("[Round \"{}\"]\n", escape(&headers.round)));
    pgn.push_str(&format!("[White \"{}\"]\n", escape(&headers.white)));
    pgn.push_str(&format!("[Black \"{}\"]\n", escape(&headers.black)));
    pgn.push_str(&format!("[Result \"{}\"]\n", result));
    if root_fen != STANDARD_START {
        pgn.push_str("[SetUp \"1\"]\n");
        pgn.push_str(&format!("[FEN \"{}\"]\n", root_fen));
    }
    pgn.push('\n');

    let mut words = Vec::new();
    let mut position = root;
    for (i, notation) in board.undoable_moves().iter().enumerate() {
        let Some(m) = Uci::from_ascii(notation.as_bytes())
            .ok()
            .and_then(|uci| uci.to_move(&position).ok())
        else {
            break;
        };
        let number = position.fullmoves();
        match position.turn() {
            Color::White => words.push(format!("{}.", number)),
            Color::Black if i == 0 => words.push(format!("{}...", number)),
            Color::Black => {}
        }
        words.push(SanPlus::from_move_and_play_unchecked(&mut position, m).to_string());
    }
    words.push(result);

    let mut line = String::new();
    for word in words {
        if !line.is_empty() && line.len() + 1 + word.len() > LINE_WIDTH {
            pgn.push_str(&line);
            pgn.push('\n');
            line.clear();
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&word);
    }
    pgn.push_str(&line);
    pgn.push('\n');
    pgn
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_headers() -> PgnHeaders {
        PgnHeaders {
            date: Some("2024.01.01".to_string()),
            ..PgnHeaders::default()
        }
    }

    #[test]
    fn test_parse_simple_game() {
        //! Tags, numbered moves and the result are all picked up
        let game = parse_pgn(
            "[Event \"Test\"]\n[White \"A\"]\n\n1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 1-0\n",
        )
        .unwrap();
        assert_eq!(game.tag("Event"), Some("Test"));
        assert_eq!(game.moves.len(), 6);
        assert_eq!(game.uci_moves()[2], "g1f3");
        assert_eq!(game.result.as_deref(), Some("1-0"));
    }

    #[test]
    fn test_parse_ignores_leading_byte_order_mark() {
        //! Files saved with a UTF-8 BOM still import
        let game = parse_pgn("\u{feff}[Event \"x\"]\n\n1. e4 *").unwrap();
        assert_eq!(game.tag("Event"), Some("x"));
        assert_eq!(game.uci_moves(), ["e2e4"]);
    }

    #[test]
    fn test_parse_skips_comments_variations_and_nags() {
        //! Annotations never become moves
        let game = parse_pgn(
            "1. e4 {best by test} e5 (1... c5 2. Nf3 (2. c3)) 2. Nf3 $1 ; line comment\n Nc6!? *",
        )
        .unwrap();
        assert_eq!(game.uci_moves(), ["e2e4", "e7e5", "g1f3", "b8c6"]);
        assert_eq!(game.result.as_deref(), Some("*"));
    }

    #[test]
    fn test_parse_glued_move_numbers_and_zero_castling() {
        //! "1.e4" and "0-0" are both accepted
        let game = parse_pgn("1.e4 e5 2.Nf3 Nc6 3.Bc4 Bc5 4.0-0 Nf6").unwrap();
        assert_eq!(game.uci_moves()[6], "e1g1");
    }

    #[test]
    fn test_parse_fen_tag_sets_start() {
        //! A FEN tag moves the starting position
        let game = parse_pgn(
            "[SetUp \"1\"]\n[FEN \"4k3/8/8/8/8/8/4P3/4K3 w - - 0 1\"]\n\n1. e4 Kd7 *",
        )
        .unwrap();
        assert_eq!(game.moves.len(), 2);
        let board = game.board_at(2).unwrap();
        assert_eq!(board.board_fen(), "8/3k4/8/8/4P3/8/8/4K3");
    }

    #[test]
    fn test_parse_only_first_game() {
        //! The second game's tags end the first game
        let game = parse_pgn("1. d4 d5 *\n\n[Event \"Two\"]\n\n1. e4 *").unwrap();
        assert_eq!(game.uci_moves(), ["d2d4", "d7d5"]);
    }

    #[test]
    fn test_illegal_move_fails_import() {
        //! A move that cannot be played rejects the whole text
        let err = parse_pgn("1. e4 e5 2. Ke3 *").unwrap_err();
        assert!(matches!(err, RulesError::MalformedPgn { .. }));
    }

    #[test]
    fn test_unterminated_comment_fails_import() {
        //! Unclosed braces are malformed
        assert!(parse_pgn("1. e4 { never closed").is_err());
    }

    #[test]
    fn test_empty_text_fails_import() {
        //! Whitespace alone is not a game
        assert!(parse_pgn("   \n").is_err());
    }

    #[test]
    fn test_export_fools_mate() {
        //! SAN with check and mate suffixes, result from the board
        let mut board = BoardAdapter::new();
        for m in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            board.apply(m).unwrap();
        }
        let pgn = export_pgn(&board, &fixed_headers(), None);
        assert!(pgn.contains("[Result \"0-1\"]"));
        assert!(pgn.contains("[Date \"2024.01.01\"]"));
        assert!(pgn.ends_with("1. f3 e5 2. g4 Qh4# 0-1\n"));
        assert!(!pgn.contains("[FEN"));
    }

    #[test]
    fn test_export_ongoing_game_uses_star() {
        //! Unfinished games end with *
        let mut board = BoardAdapter::new();
        board.apply("e2e4").unwrap();
        let pgn = export_pgn(&board, &fixed_headers(), None);
        assert!(pgn.contains("[Result \"*\"]"));
        assert!(pgn.ends_with("1. e4 *\n"));
    }

    #[test]
    fn test_export_result_override() {
        //! A time forfeit result replaces the board's "*"
        let board = BoardAdapter::new();
        let pgn = export_pgn(&board, &fixed_headers(), Some("1-0"));
        assert!(pgn.contains("[Result \"1-0\"]"));
    }

    #[test]
    fn test_export_custom_start_black_to_move() {
        //! Non-standard roots carry SetUp/FEN and start with "N..."
        let mut board = BoardAdapter::from_fen("4k3/8/8/8/8/8/4P3/4K3 b - - 0 7").unwrap();
        board.apply("e8d7").unwrap();
        let pgn = export_pgn(&board, &fixed_headers(), None);
        assert!(pgn.contains("[SetUp \"1\"]"));
        assert!(pgn.contains("[FEN \"4k3/8/8/8/8/8/4P3/4K3 b - - 0 7\"]"));
        assert!(pgn.ends_with("7... Kd7 *\n"));
    }

    #[test]
    fn test_export_wraps_long_games() {
        //! No movetext line exceeds 80 columns
        let mut board = BoardAdapter::new();
        for _ in 0..3 {
            for m in ["g1f3", "g8f6", "f3g1", "f6g8"] {
                board.apply(m).unwrap();
            }
        }
        let pgn = export_pgn(&board, &fixed_headers(), None);
        assert!(pgn.lines().all(|line| line.len() <= 80));
    }

    #[test]
    fn test_export_then_import_replays_same_moves() {
        //! An exported game parses back to the same mainline
        let mut board = BoardAdapter::new();
        for m in ["e2e4", "d7d5", "e4d5", "d8d5", "b1c3", "d5a5"] {
            board.apply(m).unwrap();
        }
        let game = parse_pgn(&export_pgn(&board, &fixed_headers(), None)).unwrap();
        assert_eq!(game.uci_moves(), board.moves());
    }
}
