//! Game settings - grid size, seat controllers and AI difficulty

use crate::ai::AlphaBetaAI;
use crate::board::{Board, Color};
use crate::error::{BoardError, SettingsError};
use crate::player::{Human, Player, PlayerKind};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

// ============================================================================
// GRID SIZE
// ============================================================================

/// Board dimensions, written `ROWSxCOLS`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GridSize {
    pub rows: usize,
    pub cols: usize,
}

impl GridSize {
    pub const SMALL: GridSize = GridSize::new(5, 6);
    pub const SQUARE: GridSize = GridSize::new(6, 6);
    pub const LARGE: GridSize = GridSize::new(9, 6);

    pub const PRESETS: [GridSize; 3] = [Self::SMALL, Self::SQUARE, Self::LARGE];

    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::SMALL
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

impl FromStr for GridSize {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SettingsError::InvalidGridSize(s.to_string());
        let (rows, cols) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let rows = rows.trim().parse().map_err(|_| invalid())?;
        let cols = cols.trim().parse().map_err(|_| invalid())?;
        Ok(Self::new(rows, cols))
    }
}

impl TryFrom<String> for GridSize {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GridSize> for String {
    fn from(size: GridSize) -> Self {
        size.to_string()
    }
}

// ============================================================================
// DIFFICULTY
// ============================================================================

/// AI strength presets
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Medium,
    Hard,
}

impl Difficulty {
    /// Search depth in plies
    pub fn depth(self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Normal => 2,
            Difficulty::Medium => 3,
            Difficulty::Hard => 4,
        }
    }
}

impl FromStr for Difficulty {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(SettingsError::InvalidDifficulty(s.to_string())),
        }
    }
}

// ============================================================================
// SEATS
// ============================================================================

/// Controller for one color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeatConfig {
    pub kind: PlayerKind,
    pub difficulty: Difficulty,
    /// Overrides the difficulty's depth
    pub depth: Option<u32>,
}

impl Default for SeatConfig {
    fn default() -> Self {
        Self::ai(Difficulty::Normal)
    }
}

impl SeatConfig {
    pub fn human() -> Self {
        Self {
            kind: PlayerKind::Human,
            difficulty: Difficulty::default(),
            depth: None,
        }
    }

    pub fn ai(difficulty: Difficulty) -> Self {
        Self {
            kind: PlayerKind::Ai,
            difficulty,
            depth: None,
        }
    }

    /// Set an explicit search depth
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn effective_depth(&self) -> u32 {
        self.depth.unwrap_or_else(|| self.difficulty.depth())
    }

    /// Instantiate the player for `color`
    pub fn build(&self, color: Color) -> Box<dyn Player> {
        match self.kind {
            PlayerKind::Human => Box::new(Human::new(color)),
            PlayerKind::Ai => Box::new(AlphaBetaAI::new(color, self.effective_depth())),
        }
    }
}

// ============================================================================
// GAME SETTINGS
// ============================================================================

/// Everything needed to start a game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub grid: GridSize,
    pub red: SeatConfig,
    pub blue: SeatConfig,
    /// Turn limit before a game is abandoned
    pub max_turns: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            grid: GridSize::default(),
            red: SeatConfig::human(),
            blue: SeatConfig::ai(Difficulty::Normal),
            max_turns: 500,
        }
    }
}

impl GameSettings {
    /// AI against AI at fixed depths
    pub fn ai_vs_ai(red_depth: u32, blue_depth: u32) -> Self {
        Self {
            red: SeatConfig::ai(Difficulty::default()).with_depth(red_depth),
            blue: SeatConfig::ai(Difficulty::default()).with_depth(blue_depth),
            ..Default::default()
        }
    }

    pub fn with_grid(mut self, grid: GridSize) -> Self {
        self.grid = grid;
        self
    }

    pub fn seat(&self, color: Color) -> &SeatConfig {
        match color {
            Color::Red => &self.red,
            Color::Blue => &self.blue,
        }
    }

    pub fn seat_mut(&mut self, color: Color) -> &mut SeatConfig {
        match color {
            Color::Red => &mut self.red,
            Color::Blue => &mut self.blue,
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.grid.rows == 0 || self.grid.cols == 0 {
            return Err(SettingsError::InvalidGrid {
                rows: self.grid.rows,
                cols: self.grid.cols,
            });
        }
        if self.max_turns == 0 {
            return Err(SettingsError::ZeroTurnLimit);
        }
        for color in Color::ALL {
            let seat = self.seat(color);
            if seat.kind == PlayerKind::Ai && seat.effective_depth() == 0 {
                return Err(SettingsError::ZeroDepth(color));
            }
        }
        Ok(())
    }

    /// Empty board of the configured size
    pub fn new_board(&self) -> Result<Board, BoardError> {
        Board::new(self.grid.rows, self.grid.cols)
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let settings: GameSettings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }
}
