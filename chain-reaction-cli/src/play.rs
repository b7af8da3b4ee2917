//! Play command - one interactive or AI game on the console
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: resolve_settings(), play_game(), report_result()
//! - Level 3: LineInput (human move parsing)
//! - Level 4: board printing

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};

use chain_reaction_core::{Board, Color, Difficulty, GameSettings, GridSize, PlayerKind, SeatConfig};

use crate::game_loop::{GameEnd, GameLoop, GameRecord, MoveSource, Turn};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// Seat controller on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SeatArg {
    Human,
    Ai,
}

#[derive(Args, Debug, Default)]
pub struct PlayArgs {
    /// Settings JSON file; flags below override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Grid size as ROWSxCOLS (5x6, 6x6, 9x6, ...)
    #[arg(long)]
    pub grid: Option<GridSize>,

    /// Red controller
    #[arg(long, value_enum)]
    pub red: Option<SeatArg>,

    /// Blue controller
    #[arg(long, value_enum)]
    pub blue: Option<SeatArg>,

    /// AI difficulty for both seats (easy, normal, medium, hard)
    #[arg(long)]
    pub difficulty: Option<Difficulty>,

    /// Search depth for a Red AI (overrides difficulty)
    #[arg(long)]
    pub red_depth: Option<u32>,

    /// Search depth for a Blue AI (overrides difficulty)
    #[arg(long)]
    pub blue_depth: Option<u32>,

    /// Maximum turns before the game is abandoned
    #[arg(long)]
    pub max_turns: Option<u32>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Resolve settings (file, then flags)
/// 2. Play the game on stdin/stdout
/// 3. Report the result
pub fn run(args: PlayArgs) -> Result<()> {
    let settings = resolve_settings(&args)?;

    tracing::info!(
        "Starting game on {} grid: Red {:?} vs Blue {:?}",
        settings.grid,
        settings.red.kind,
        settings.blue.kind
    );

    let stdin = io::stdin();
    let mut input = LineInput::new(stdin.lock());
    let record = play_game(&settings, &mut input)?;

    report_result(&record);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Merge the optional settings file with command-line overrides
fn resolve_settings(args: &PlayArgs) -> Result<GameSettings> {
    let settings = match &args.config {
        Some(path) => GameSettings::load(path)?,
        None => GameSettings::default(),
    };
    apply_overrides(settings, args)
}

/// Apply command-line flags on top of `settings` and validate the result
fn apply_overrides(mut settings: GameSettings, args: &PlayArgs) -> Result<GameSettings> {
    if let Some(grid) = args.grid {
        settings.grid = grid;
    }
    if let Some(max_turns) = args.max_turns {
        settings.max_turns = max_turns;
    }

    let overrides = [
        (Color::Red, args.red, args.red_depth),
        (Color::Blue, args.blue, args.blue_depth),
    ];
    for (color, kind, depth) in overrides {
        let seat = settings.seat_mut(color);
        if let Some(kind) = kind {
            // Switching a seat to AI keeps its configured difficulty and depth
            *seat = match kind {
                SeatArg::Human => SeatConfig::human(),
                SeatArg::Ai => SeatConfig {
                    kind: PlayerKind::Ai,
                    ..*seat
                },
            };
        }
        if let Some(difficulty) = args.difficulty {
            seat.difficulty = difficulty;
        }
        if depth.is_some() {
            seat.depth = depth;
        }
    }

    settings.validate()?;
    Ok(settings)
}

/// Play one game, printing the board before every turn
fn play_game(settings: &GameSettings, input: &mut dyn MoveSource) -> Result<GameRecord> {
    let mut game = GameLoop::from_settings(settings)?;

    while !game.is_finished() {
        let color = game.current();
        let kind = game.current_kind();
        println!("\nTurn {}: {}", game.turn() + 1, color);
        println!("Total orbs: {}", game.board().total_orbs());
        print_board(game.board());

        match game.step(input) {
            Turn::Moved(pos) => {
                if kind == PlayerKind::Ai {
                    println!("{} AI played {}", color, pos);
                }
            }
            Turn::Rejected(err) => println!("Invalid move: {}. Try again.", err),
            Turn::Skipped => println!("{} has no valid moves", color),
            Turn::InputClosed => println!("Input closed, stopping."),
        }
    }

    println!("\nFinal board:");
    print_board(game.board());
    Ok(game.record())
}

/// Print final board and outcome
fn report_result(record: &GameRecord) {
    println!("\n=== Game Over ===");
    match (record.winner(), record.end) {
        (Some(color), _) => println!("Winner: {}", color),
        (None, GameEnd::InputClosed) => println!("Game abandoned."),
        (None, _) => match record.leader() {
            Some(color) => println!("Turn limit reached. {} leads on orbs.", color),
            None => println!("Turn limit reached. Scores are level."),
        },
    }
    println!(
        "Turns: {}  Moves: {}  Red: {}  Blue: {}",
        record.turns,
        record.moves.len(),
        record.red_score,
        record.blue_score
    );

    tracing::info!("Game finished: {:?} after {} turns", record.end, record.turns);
}

// ============================================================================
// LEVEL 3 - HUMAN INPUT
// ============================================================================

/// Reads `row col` pairs, one per line, re-prompting on bad input
pub struct LineInput<R> {
    reader: R,
}

impl<R: BufRead> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

/// Parse `row col` (commas allowed as separators)
fn parse_target(line: &str) -> Option<(isize, isize)> {
    let mut parts = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty());
    let row = parts.next()?.parse().ok()?;
    let col = parts.next()?.parse().ok()?;
    parts.next().is_none().then_some((row, col))
}

impl<R: BufRead> MoveSource for LineInput<R> {
    fn next_target(&mut self, board: &Board, color: Color) -> Option<(isize, isize)> {
        loop {
            print!(
                "{}, enter row and column (0-{}, 0-{}): ",
                color,
                board.get_rows() - 1,
                board.get_cols() - 1
            );
            // A prompt that fails to flush still leaves stdin readable
            let _ = io::stdout().flush();

            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) | Err(_) => return None,
                Ok(_) => {}
            }
            match parse_target(&line) {
                Some(target) => return Some(target),
                None => println!("Could not read {:?}, expected two numbers.", line.trim()),
            }
        }
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn print_board(board: &Board) {
    println!("{}", board);
}

// ============================================================================
// TESTS
// ============================================================================
