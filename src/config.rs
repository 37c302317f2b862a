use crate::error::{Error, Result};
use crate::open_list::TieBreak;
use crate::solver::Algorithm;
use log::{info, warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

/// Default configuration file name
pub const CONFIG_FILE: &str = "maze_astar.toml";

pub const MAZE_SIZE_RANGE: RangeInclusive<usize> = 10..=200;
pub const MAZE_COUNT_RANGE: RangeInclusive<usize> = 1..=500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub maze: MazeConfig,
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<AlgorithmConfig>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeConfig {
    #[serde(default = "default_size")]
    pub size: usize,
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default = "default_folder")]
    pub folder: String,
    /// Read numbered maze files from `folder` instead of generating
    #[serde(default)]
    pub use_preloaded: bool,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// One solver configuration in a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmConfig {
    #[serde(default)]
    pub name: String,
    pub algorithm: Algorithm,
    #[serde(default = "default_tiebreak")]
    pub tiebreak: TieBreak,
    #[serde(default = "default_sight_radius")]
    pub sight_radius: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub results_path: Option<String>,
    #[serde(default)]
    pub capture_steps: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

// Default values
fn default_size() -> usize { 101 }
fn default_count() -> usize { 50 }
fn default_folder() -> String { "mazes".to_string() }
fn default_tiebreak() -> TieBreak { TieBreak::LargerG }
fn default_sight_radius() -> usize { 1 }
fn default_level() -> String { "info".to_string() }

fn default_algorithms() -> Vec<AlgorithmConfig> {
    vec![
        AlgorithmConfig::new(Algorithm::Forward, TieBreak::LargerG, 1),
        AlgorithmConfig::new(Algorithm::Forward, TieBreak::SmallerH, 1),
        AlgorithmConfig::new(Algorithm::Backward, TieBreak::LargerG, 1),
        AlgorithmConfig::new(Algorithm::Adaptive, TieBreak::LargerG, 1),
    ]
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            count: default_count(),
            folder: default_folder(),
            use_preloaded: false,
            seed: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            maze: MazeConfig::default(),
            algorithms: default_algorithms(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AlgorithmConfig {
    pub fn new(algorithm: Algorithm, tiebreak: TieBreak, sight_radius: usize) -> Self {
        Self {
            name: format!("{} ({})", algorithm, tiebreak),
            algorithm,
            tiebreak,
            sight_radius,
        }
    }

    /// Name to show in reports; generated when the file leaves it empty
    pub fn label(&self) -> String {
        if self.name.trim().is_empty() {
            format!("{} (t:{}, r:{})", self.algorithm, self.tiebreak, self.sight_radius)
        } else {
            self.name.clone()
        }
    }
}

impl LoggingConfig {
    /// Parsed level, `Info` if the string is not a level name
    pub fn level_filter(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::Info)
    }
}

/// Check a maze side length against `MAZE_SIZE_RANGE`
pub fn check_maze_size(size: usize) -> Result<()> {
    check_range("maze size", size, &MAZE_SIZE_RANGE)
}

/// Check a maze count against `MAZE_COUNT_RANGE`
pub fn check_maze_count(count: usize) -> Result<()> {
    check_range("maze count", count, &MAZE_COUNT_RANGE)
}

fn check_range(what: &str, value: usize, range: &RangeInclusive<usize>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "{} {} outside {}..={}",
            what,
            value,
            range.start(),
            range.end()
        )))
    }
}

impl Config {
    /// Load configuration from file, or use defaults if the file is missing,
    /// malformed, or out of range
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => {
                info!("No {} found, using default configuration", path.display());
                return Config::default();
            }
        };

        match Self::from_toml_str(&contents) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
                warn!("Using default configuration");
                Config::default()
            }
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_maze_size(self.maze.size)?;
        check_maze_count(self.maze.count)?;
        if self.algorithms.is_empty() {
            return Err(Error::InvalidParameter("no algorithms configured".to_string()));
        }
        if let Some(bad) = self.algorithms.iter().find(|a| a.sight_radius == 0) {
            return Err(Error::InvalidParameter(format!(
                "{}: sight radius must be at least 1",
                bad.label()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.maze.size, 101);
        assert_eq!(config.maze.count, 50);
        assert_eq!(config.maze.folder, "mazes");
        assert!(!config.output.capture_steps);
        assert_eq!(config.algorithms.len(), 4);
        assert_eq!(config.algorithms[1].tiebreak, TieBreak::SmallerH);
        assert_eq!(config.algorithms[3].algorithm, Algorithm::Adaptive);
        assert_eq!(config.algorithms[0].name, "Forward A* (g)");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let config = Config::from_toml_str(
            r#"
            [maze]
            size = 30
            seed = 9

            [[algorithms]]
            algorithm = "backward"
            tiebreak = "h"
            sight_radius = 3

            [[algorithms]]
            name = "adaptive"
            algorithm = "Adaptive"
            "#,
        )
        .unwrap();

        assert_eq!(config.maze.size, 30);
        assert_eq!(config.maze.count, 50);
        assert_eq!(config.maze.seed, Some(9));
        assert_eq!(config.algorithms.len(), 2);
        assert_eq!(config.algorithms[0].algorithm, Algorithm::Backward);
        assert_eq!(config.algorithms[0].label(), "Backward A* (t:h, r:3)");
        assert_eq!(config.algorithms[1].tiebreak, TieBreak::LargerG);
        assert_eq!(config.algorithms[1].sight_radius, 1);
        assert_eq!(config.algorithms[1].label(), "adaptive");
        assert_eq!(config.logging.level_filter(), LevelFilter::Info);
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Config::from_toml_str("[maze]\nsize = 5\n").is_err());
        assert!(Config::from_toml_str("[maze]\ncount = 0\n").is_err());
        assert!(Config::from_toml_str("algorithms = []\n").is_err());
        assert!(Config::from_toml_str("[[algorithms]]\nalgorithm = \"forward\"\nsight_radius = 0\n").is_err());
    }

    #[test]
    fn test_range_checks() {
        assert!(check_maze_size(10).is_ok());
        assert!(check_maze_size(200).is_ok());
        assert!(matches!(check_maze_size(0), Err(Error::InvalidParameter(_))));
        assert!(check_maze_size(201).is_err());
        assert!(check_maze_count(1).is_ok());
        assert!(check_maze_count(0).is_err());
        assert!(check_maze_count(501).is_err());
    }

    #[test]
    fn test_rejects_unknown_names() {
        assert!(matches!(
            Config::from_toml_str("[[algorithms]]\nalgorithm = \"sideways\"\n"),
            Err(Error::Toml(_))
        ));
        assert!(Config::from_toml_str("[[algorithms]]\nalgorithm = \"forward\"\ntiebreak = \"f\"\n").is_err());
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path().join("missing.toml")), Config::default());

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "[maze\nsize = ").unwrap();
        assert_eq!(Config::load(&broken), Config::default());

        let good = dir.path().join("good.toml");
        fs::write(&good, "[logging]\nlevel = \"debug\"\n").unwrap();
        let config = Config::load(&good);
        assert_eq!(config.logging.level_filter(), LevelFilter::Debug);
        assert_eq!(config.maze, MazeConfig::default());
    }
}
