//! The command line interface for the simulation.
use crate::log;
use crate::robot::{RobotKind, RobotMemory};
use crate::settings::Settings;
use crate::simulation::{RobotStats, RunOutcome, compare_robots, report_comparison, run_robot};
use crate::village::Village;
use ::log::{info, warn};
use anyhow::{Context, Result, ensure};
use clap::{Args, CommandFactory, Parser, Subcommand};
use itertools::Itertools;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};

pub mod example;
use example::ExampleSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the simulation.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the run command
#[derive(Args)]
pub struct RunOpts {
    /// The robot to run [default: the `robot` setting]
    #[arg(short, long)]
    pub robot: Option<RobotKind>,
    /// Seed for the random world and the robot's random choices (overrides the village file)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Options for the compare command
#[derive(Args)]
pub struct CompareOpts {
    /// The robots to compare [default: the `compare_robots` setting]
    pub robots: Vec<RobotKind>,
    /// Number of random worlds to run each robot in (overrides the village file)
    #[arg(short, long)]
    pub trials: Option<usize>,
    /// Seed for generating the random worlds (overrides the village file)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run a robot in a randomly generated world.
    Run {
        /// Path to the village directory.
        village_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Compare robots across many randomly generated worlds.
    Compare {
        /// Path to the village directory.
        village_dir: PathBuf,
        /// Other compare options
        #[command(flatten)]
        opts: CompareOpts,
    },
    /// Manage example villages.
    Example {
        /// The available subcommands for managing example villages.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { village_dir, opts } => {
                handle_run_command(&village_dir, &opts, None)?;
            }
            Self::Compare { village_dir, opts } => {
                handle_compare_command(&village_dir, &opts, None)?;
            }
            Self::Example { subcommand } => subcommand.execute()?,
            Self::Settings { subcommand } => subcommand.execute()?,
        }

        Ok(())
    }
}

/// Parse CLI arguments and start robotsim
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ robotsim --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        // Output program help in markdown format
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load program settings (if not provided) and initialise the logger with them
fn init_with_settings(settings: Option<Settings>) -> Result<Settings> {
    let settings = match settings {
        Some(settings) => settings,
        None => Settings::load().context("Failed to load settings.")?,
    };
    log::init(&settings.log_level).context("Failed to initialise logging.")?;

    Ok(settings)
}

impl RunOpts {
    /// The robot to run, falling back on the settings
    fn robot_kind(&self, settings: &Settings) -> RobotKind {
        self.robot.unwrap_or(settings.robot)
    }
}

impl CompareOpts {
    /// The robots to compare, falling back on the settings
    fn robot_kinds<'a>(&'a self, settings: &'a Settings) -> Result<&'a [RobotKind]> {
        let kinds = if self.robots.is_empty() {
            &settings.compare_robots
        } else {
            &self.robots
        };
        ensure!(!kinds.is_empty(), "No robots to compare");

        Ok(kinds)
    }
}

/// Handle the `run` command.
pub fn handle_run_command(
    village_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<RunOutcome> {
    let settings = init_with_settings(settings)?;

    let village = Village::from_path(village_path).context("Failed to load village.")?;
    info!("Loaded village from {}", village_path.display());

    let seed = opts.seed.unwrap_or(village.seed);
    let mut rng = StdRng::seed_from_u64(seed);
    let state = village.random_state(&mut rng)?;
    match state.closures.as_slice() {
        [] => info!("{} parcels to deliver", state.parcels.len()),
        closures => info!(
            "{} parcels to deliver, closed roads: {}",
            state.parcels.len(),
            closures.iter().join(", ")
        ),
    }

    let robot = village.robot(opts.robot_kind(&settings));
    let outcome = run_robot(state, &robot, RobotMemory::default(), &mut rng);
    match outcome {
        RunOutcome::Completed { turns } => info!("{robot} delivered every parcel in {turns} turns"),
        RunOutcome::OutOfFuel { turns } => warn!("{robot} ran out of fuel after {turns} turns"),
        RunOutcome::TurnLimit => warn!("{robot} did not finish in time"),
    }

    Ok(outcome)
}

/// Handle the `compare` command.
pub fn handle_compare_command(
    village_path: &Path,
    opts: &CompareOpts,
    settings: Option<Settings>,
) -> Result<Vec<RobotStats>> {
    let settings = init_with_settings(settings)?;

    let village = Village::from_path(village_path).context("Failed to load village.")?;
    info!("Loaded village from {}", village_path.display());

    let robots = opts
        .robot_kinds(&settings)?
        .iter()
        .map(|&kind| village.robot(kind))
        .collect_vec();
    let trials = opts.trials.unwrap_or(village.trials);
    let seed = opts.seed.unwrap_or(village.seed);
    let stats = compare_robots(&village, &robots, trials, seed)?;
    report_comparison(&stats);

    Ok(stats)
}
