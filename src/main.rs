use clap::{ArgAction, Parser, Subcommand};
use log::{error, info, LevelFilter};
use maze_astar::analysis::{self, comparison_table};
use maze_astar::config::{check_maze_count, check_maze_size, Config, CONFIG_FILE};
use maze_astar::maze::{generate_maze, load_maze, load_numbered_mazes, save_maze, save_numbered_mazes};
use maze_astar::result::save_results;
use maze_astar::{Algorithm, Cell, Grid, Result, SolveResult, Solver, TieBreak};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "maze-astar")]
#[command(about = "Repeated Forward, Backward and Adaptive A* in partially known mazes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file
    #[arg(short, long, default_value = CONFIG_FILE, global = true)]
    config: PathBuf,

    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a single maze and print the outcome
    Solve {
        /// Maze text file; a maze is generated when omitted
        #[arg(short, long)]
        maze: Option<PathBuf>,

        /// Side length of a generated maze
        #[arg(long, default_value_t = 101)]
        size: usize,

        /// Seed for a generated maze
        #[arg(long)]
        seed: Option<u64>,

        /// forward, backward or adaptive
        #[arg(short, long, default_value = "forward")]
        algorithm: Algorithm,

        /// g (prefer larger g) or h (prefer smaller h)
        #[arg(short, long, default_value = "g")]
        tiebreak: TieBreak,

        /// Manhattan sight radius
        #[arg(short, long, default_value_t = 1)]
        radius: usize,

        /// Keep a belief snapshot per step
        #[arg(long)]
        capture: bool,

        /// Print the final belief grid
        #[arg(long)]
        show: bool,

        /// Write the result as JSON
        #[arg(long)]
        save: Option<PathBuf>,

        /// Also write the generated maze in text format
        #[arg(long)]
        save_maze: Option<PathBuf>,
    },

    /// Write numbered maze files
    Generate {
        /// Number of mazes (defaults to the config value)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Side length (defaults to the config value)
        #[arg(long)]
        size: Option<usize>,

        /// Output folder (defaults to the config value)
        #[arg(short, long)]
        folder: Option<PathBuf>,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run every configured algorithm over the maze set and compare
    Analyze {
        /// Write all results as one JSON file (overrides the config)
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Print a saved result
    Replay {
        /// Result JSON file
        path: PathBuf,

        /// Print every captured snapshot
        #[arg(long)]
        steps: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let rust_log_set = std::env::var_os("RUST_LOG").is_some();

    // The logger itself admits everything; the effective level is the global
    // max level, which is only known once the config is read.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("trace"))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
    if !rust_log_set {
        log::set_max_level(verbosity(cli.verbose).unwrap_or(LevelFilter::Info));
    }

    let config = Config::load(&cli.config);
    if !rust_log_set && cli.verbose == 0 {
        log::set_max_level(config.logging.level_filter());
    }

    if let Err(e) = run(cli.command, &config) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn verbosity(count: u8) -> Option<LevelFilter> {
    match count {
        0 => None,
        1 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    }
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn run(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Solve {
            maze,
            size,
            seed,
            algorithm,
            tiebreak,
            radius,
            capture,
            show,
            save,
            save_maze: maze_out,
        } => {
            let maze = match maze {
                Some(path) => load_maze(path)?,
                None => {
                    check_maze_size(size)?;
                    generate_maze(size, &mut rng_from(seed))
                }
            };
            if let Some(path) = maze_out {
                save_maze(&maze, &path)?;
                info!("Saved maze to {}", path.display());
            }

            let last = maze.len().saturating_sub(1);
            let mut solver = Solver::new(&maze, 0, last, tiebreak, radius, capture)?;
            let result = solver.solve(algorithm);

            print_result(&result);
            if show {
                println!("\n{}", solver.belief().render());
            }
            if let Some(path) = save {
                result.save_json(&path)?;
                info!("Saved result to {}", path.display());
            }
        }

        Commands::Generate {
            count,
            size,
            folder,
            seed,
        } => {
            let count = count.unwrap_or(config.maze.count);
            let size = size.unwrap_or(config.maze.size);
            let folder = folder.unwrap_or_else(|| PathBuf::from(&config.maze.folder));
            check_maze_count(count)?;
            check_maze_size(size)?;

            let mut rng = rng_from(seed.or(config.maze.seed));
            let mazes: Vec<Grid> = (0..count).map(|_| generate_maze(size, &mut rng)).collect();
            save_numbered_mazes(&mazes, &folder)?;
            println!("Wrote {} mazes of size {} to {}", count, size, folder.display());
        }

        Commands::Analyze { save } => {
            let mazes = if config.maze.use_preloaded {
                load_numbered_mazes(&config.maze.folder, config.maze.count)?
            } else {
                let mut rng = rng_from(config.maze.seed);
                (0..config.maze.count)
                    .map(|_| generate_maze(config.maze.size, &mut rng))
                    .collect()
            };
            info!("Analyzing {} mazes with {} configurations", mazes.len(), config.algorithms.len());

            let reports = analysis::run(&mazes, &config.algorithms, config.output.capture_steps)?;

            println!("{}", comparison_table(&reports));
            for report in &reports {
                println!("========================================");
                println!("{}", report.config.label());
                println!("========================================");
                println!("{}\n", report.summary);
            }

            let target = save.or_else(|| config.output.results_path.as_ref().map(PathBuf::from));
            if let Some(path) = target {
                let all: Vec<SolveResult> = reports.into_iter().flat_map(|r| r.results).collect();
                save_results(&all, &path)?;
                info!("Saved {} results to {}", all.len(), path.display());
            }
        }

        Commands::Replay { path, steps } => {
            let result = SolveResult::load_json(&path)?;
            print_result(&result);

            if result.solution_steps.is_empty() {
                println!("\nNo snapshots captured");
                return Ok(());
            }
            println!("\n{} snapshots", result.solution_steps.len());
            for (i, (step, agent)) in result.solution_steps.iter().zip(result.agent_trail()).enumerate() {
                let position = agent.map_or_else(|| "-".to_string(), |(r, c)| format!("({}, {})", r, c));
                println!(
                    "step {:>4}: agent {:<12} known {:>6}  blocked {:>6}",
                    i,
                    position,
                    step.len() - step.count(Cell::Unknown),
                    step.count(Cell::Blocked)
                );
                if steps {
                    println!("{}", step.render());
                }
            }
            if let Some(last) = result.final_belief().filter(|_| !steps) {
                println!("\n{}", last.render());
            }
        }
    }
    Ok(())
}

fn print_result(result: &SolveResult) {
    println!("{}", result.display_name());
    println!("{}", result);
    println!(
        "Maze {}x{}, start {:?}, target {:?}",
        result.maze_size, result.maze_size, result.start_position, result.target_position
    );
    println!(
        "Iterations: {}, moves: {}, time: {}ms",
        result.iterations(),
        result.moves,
        result.solution_time_ms
    );
}
