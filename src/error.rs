//! Error types for maze_astar

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// maze_astar error types
///
/// A search that finds no path is not an error; it is reported through
/// `SolveResult::solved`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller supplied arguments that break a solver precondition
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Coordinate outside the grid
    #[error("Coordinate ({row}, {col}) is outside a {size}x{size} grid")]
    OutOfBounds {
        /// Row of the offending coordinate
        row: usize,
        /// Column of the offending coordinate
        col: usize,
        /// Grid side length
        size: usize,
    },

    /// Maze text could not be turned into a grid
    #[error("Invalid maze: {0}")]
    InvalidMaze(String),

    /// Algorithm name not recognised
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Tie-break symbol not recognised
    #[error("Unknown tiebreak '{0}', expected 'g' or 'h'")]
    UnknownTieBreak(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
