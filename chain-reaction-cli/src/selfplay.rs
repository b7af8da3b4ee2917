//! Selfplay command - AI against AI over many games
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_settings(), play_series(), report_results()
//! - Level 3: play_single_game(), compute_statistics()
//! - Level 4: formatting utilities

use anyhow::Result;
use clap::Args;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use chain_reaction_core::{Color, GameSettings, GridSize};

use crate::game_loop::{GameEnd, GameLoop, NoInput};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args, Debug)]
pub struct SelfPlayArgs {
    /// Number of games to play
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Red search depth
    #[arg(long, default_value = "2")]
    pub red_depth: u32,

    /// Blue search depth
    #[arg(long, default_value = "2")]
    pub blue_depth: u32,

    /// Grid size as ROWSxCOLS
    #[arg(long, default_value = "5x6")]
    pub grid: GridSize,

    /// Maximum turns per game
    #[arg(long, default_value = "500")]
    pub max_turns: u32,

    /// Random placements played before the AIs take over
    #[arg(long, default_value = "0")]
    pub random_openings: u32,

    /// Seed for the opening placements
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct SeriesGame {
    game_number: usize,
    end: GameEnd,
    turns: u32,
    red_score: u32,
    blue_score: u32,
}

/// Aggregated series results
#[derive(Clone, Debug)]
struct SeriesResults {
    games: Vec<SeriesGame>,
    red_wins: usize,
    blue_wins: usize,
    unfinished: usize,
    avg_turns: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run selfplay command
///
/// 1. Build settings from the arguments
/// 2. Play all games in parallel
/// 3. Report results
pub fn run(args: SelfPlayArgs) -> Result<()> {
    let settings = build_settings(&args)?;
    let base_seed = args.seed.unwrap_or_else(rand::random);

    tracing::info!(
        "Starting selfplay: {} games on {} (red depth={}, blue depth={}, seed={})",
        args.games,
        settings.grid,
        args.red_depth,
        args.blue_depth,
        base_seed
    );

    let results = play_series(&settings, &args, base_seed)?;

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_settings(args: &SelfPlayArgs) -> Result<GameSettings> {
    let mut settings = GameSettings::ai_vs_ai(args.red_depth, args.blue_depth).with_grid(args.grid);
    settings.max_turns = args.max_turns;
    settings.validate()?;
    Ok(settings)
}

/// Play every game, one rayon task each
fn play_series(settings: &GameSettings, args: &SelfPlayArgs, base_seed: u64) -> Result<SeriesResults> {
    let games = (0..args.games)
        .into_par_iter()
        .map(|index| {
            let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(index as u64));
            play_single_game(settings, index + 1, args.random_openings, &mut rng)
        })
        .collect::<Result<Vec<_>>>()?;

    for game in &games {
        tracing::info!("Game {}: {:?} ({} turns)", game.game_number, game.end, game.turns);
    }

    Ok(compute_statistics(games))
}

fn report_results(results: &SeriesResults, args: &SelfPlayArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game: random openings for both sides, then search
fn play_single_game(
    settings: &GameSettings,
    game_number: usize,
    openings: u32,
    rng: &mut ChaCha8Rng,
) -> Result<SeriesGame> {
    let mut game = GameLoop::from_settings(settings)?;

    for _ in 0..openings {
        if game.is_finished() {
            break;
        }
        let moves = game.board().get_valid_moves(game.current());
        let Some(&mv) = moves.choose(rng) else {
            break;
        };
        game.place(mv.row, mv.col)?;
    }

    let record = game.run(&mut NoInput);
    Ok(SeriesGame {
        game_number,
        end: record.end,
        turns: record.turns,
        red_score: record.red_score,
        blue_score: record.blue_score,
    })
}

fn compute_statistics(games: Vec<SeriesGame>) -> SeriesResults {
    let wins = |color: Color| games.iter().filter(|g| g.end == GameEnd::Won(color)).count();
    let red_wins = wins(Color::Red);
    let blue_wins = wins(Color::Blue);
    let unfinished = games.len() - red_wins - blue_wins;

    let total_turns: u32 = games.iter().map(|g| g.turns).sum();
    let avg_turns = if games.is_empty() {
        0.0
    } else {
        total_turns as f32 / games.len() as f32
    };

    SeriesResults {
        games,
        red_wins,
        blue_wins,
        unfinished,
        avg_turns,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

fn end_label(end: GameEnd) -> String {
    match end {
        GameEnd::Won(color) => format!("{} wins", color),
        GameEnd::TurnLimit => "turn limit".to_string(),
        GameEnd::InputClosed => "abandoned".to_string(),
    }
}

/// Print results as JSON
fn print_json_results(results: &SeriesResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        result: String,
        turns: u32,
        red_score: u32,
        blue_score: u32,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        red_wins: usize,
        blue_wins: usize,
        unfinished: usize,
        avg_turns: f32,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        total_games: results.games.len(),
        red_wins: results.red_wins,
        blue_wins: results.blue_wins,
        unfinished: results.unfinished,
        avg_turns: results.avg_turns,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                result: end_label(g.end),
                turns: g.turns,
                red_score: g.red_score,
                blue_score: g.blue_score,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(results: &SeriesResults) {
    let total = results.games.len();

    println!("\n=== Selfplay Results ===");
    println!("Total games: {}", total);
    println!(
        "Red wins:    {} ({:.1}%)",
        results.red_wins,
        percent(results.red_wins, total)
    );
    println!(
        "Blue wins:   {} ({:.1}%)",
        results.blue_wins,
        percent(results.blue_wins, total)
    );
    println!(
        "Unfinished:  {} ({:.1}%)",
        results.unfinished,
        percent(results.unfinished, total)
    );
    println!("Avg turns:   {:.1}", results.avg_turns);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {}: {} in {} turns (Red {} / Blue {})",
            game.game_number,
            end_label(game.end),
            game.turns,
            game.red_score,
            game.blue_score
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
