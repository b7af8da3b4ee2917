//! Chain Reaction Core - Game engine and AI
//!
//! This crate provides the core game logic for Chain Reaction:
//! - Board geometry (rectangular grid, position-dependent critical mass)
//! - Orb placement with breadth-first cascade resolution
//! - Scoring, terminal detection and move enumeration
//! - Human and minimax alpha-beta players
//! - Game settings (grid presets, AI difficulty)

pub mod board;
pub mod error;
pub mod eval;
pub mod ai;
pub mod player;
pub mod settings;

// Re-exports for convenient access
pub use board::{Board, Cascade, Cell, Color, Pos, DIRECTIONS};
pub use error::{BoardError, MoveError, ParseBoardError, SettingsError};
pub use eval::{evaluate, winner};
pub use ai::{minimax, AlphaBetaAI, SearchResult, SearchStats, DEFAULT_DEPTH};
pub use player::{Human, Player, PlayerKind};
pub use settings::{Difficulty, GameSettings, GridSize, SeatConfig};
