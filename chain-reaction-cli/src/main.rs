//! Chain Reaction CLI - Command-line interface
//!
//! Commands:
//! - play: Play one game on the console (human or AI seats)
//! - selfplay: Run AI against AI over many games

mod game_loop;
mod play;
mod selfplay;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chain-reaction")]
#[command(about = "Two-player Chain Reaction with an alpha-beta opponent")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single game
    Play(play::PlayArgs),
    /// Run AI against AI
    Selfplay(selfplay::SelfPlayArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play::run(args),
        Commands::Selfplay(args) => selfplay::run(args),
    }
}
