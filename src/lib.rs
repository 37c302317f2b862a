pub mod analysis;
pub mod config;
pub mod coords;
pub mod discovery;
pub mod error;
pub mod grid;
pub mod maze;
pub mod node;
pub mod open_list;
pub mod result;
pub mod solver;

pub use config::Config;
pub use error::{Error, Result};
pub use grid::{Cell, Grid};
pub use open_list::TieBreak;
pub use result::SolveResult;
pub use solver::{Algorithm, Solver};
