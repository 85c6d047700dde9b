//! Functionality for running robots and comparing them.
use crate::robot::{Robot, RobotMemory};
use crate::village::Village;
use crate::world::WorldState;
use anyhow::{Result, ensure};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// The score given to a run which fails.
///
/// Runs are also cut off after this many turns, so no successful run scores more than this.
pub const FAILURE_PENALTY: u32 = 500;

/// How a single run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every parcel was delivered
    Completed {
        /// The number of turns taken
        turns: u32,
    },
    /// The robot ran out of fuel
    OutOfFuel {
        /// The number of turns taken before running out
        turns: u32,
    },
    /// The robot was still going after [`FAILURE_PENALTY`] turns
    TurnLimit,
}

impl RunOutcome {
    /// The number of turns for a completed run, or [`FAILURE_PENALTY`] otherwise
    pub fn score(&self) -> u32 {
        match self {
            Self::Completed { turns } => *turns,
            Self::OutOfFuel { .. } | Self::TurnLimit => FAILURE_PENALTY,
        }
    }
}

/// Run a robot until every parcel is delivered or the run fails.
///
/// # Arguments
///
/// * `state` - The starting state of the world
/// * `robot` - The robot to run
/// * `memory` - The robot's memory at the start of the run
/// * `rng` - The source of randomness for the robot's decisions
pub fn run_robot<R: Rng + ?Sized>(
    mut state: WorldState,
    robot: &Robot,
    mut memory: RobotMemory,
    rng: &mut R,
) -> RunOutcome {
    let mut turns = 0;
    loop {
        // NB: A stranded robot has no parcels either, so this must be checked first
        if state.is_stranded() {
            debug!("Ran out of fuel at {} after {turns} turns", state.place);
            return RunOutcome::OutOfFuel { turns };
        }
        if state.is_complete() {
            debug!("Done in {turns} turns");
            return RunOutcome::Completed { turns };
        }
        if turns >= FAILURE_PENALTY {
            debug!("Gave up after {turns} turns");
            return RunOutcome::TurnLimit;
        }

        let decision = robot.decide(&state, memory, rng);
        let next = state.move_to(&decision.direction);
        if next.place == state.place {
            debug!("Turn {turns}: could not move to {}", decision.direction);
        } else {
            debug!(
                "Turn {turns}: moved to {} ({} parcels left, {} fuel)",
                next.place,
                next.parcels.len(),
                next.fuel
            );
        }

        state = next;
        memory = decision.memory;
        turns += 1;
    }
}

/// The results of one robot across a comparison
#[derive(Debug, Clone, PartialEq)]
pub struct RobotStats {
    /// The robot these results are for
    pub robot: Robot,
    /// The outcome of every trial, in order
    pub outcomes: Vec<RunOutcome>,
}

impl RobotStats {
    /// The mean score across all trials
    pub fn mean_score(&self) -> f64 {
        let total: u32 = self.outcomes.iter().map(RunOutcome::score).sum();
        total as f64 / self.outcomes.len() as f64
    }

    /// The number of runs in which every parcel was delivered
    pub fn completed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, RunOutcome::Completed { .. }))
            .count()
    }

    /// The number of runs in which the robot ran out of fuel
    pub fn out_of_fuel(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, RunOutcome::OutOfFuel { .. }))
            .count()
    }

    /// The number of runs which were cut off
    pub fn turn_limit(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| **outcome == RunOutcome::TurnLimit)
            .count()
    }

    /// The mean number of turns over completed runs only, if there were any
    pub fn mean_completed_turns(&self) -> Option<f64> {
        let completed = self.completed();
        (completed > 0).then(|| {
            let total: u32 = self
                .outcomes
                .iter()
                .filter_map(|outcome| match outcome {
                    RunOutcome::Completed { turns } => Some(*turns),
                    _ => None,
                })
                .sum();
            total as f64 / completed as f64
        })
    }
}

/// A randomly generated world along with the seed for robots' decisions in it
struct Trial {
    state: WorldState,
    seed: u64,
}

/// Generate the worlds for a comparison
fn generate_trials(village: &Village, trials: usize, seed: u64) -> Result<Vec<Trial>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..trials)
        .map(|_| {
            let state = village.random_state(&mut rng)?;
            let seed = rng.next_u64();
            Ok(Trial { state, seed })
        })
        .collect()
}

/// Run every robot on the same set of randomly generated worlds.
///
/// Each robot gets its own copy of each world, and the robots' random choices in a given world are
/// seeded identically, so the results depend only on `seed`.
///
/// # Returns
///
/// The results for each robot, in the order given.
pub fn compare_robots(
    village: &Village,
    robots: &[Robot],
    trials: usize,
    seed: u64,
) -> Result<Vec<RobotStats>> {
    ensure!(trials > 0, "Number of trials must be greater than zero");
    info!("Comparing {} robots over {trials} trials", robots.len());

    let trials = generate_trials(village, trials, seed)?;
    let stats = robots
        .iter()
        .map(|robot| {
            let outcomes = trials
                .iter()
                .map(|trial| {
                    run_robot(
                        trial.state.clone(),
                        robot,
                        RobotMemory::default(),
                        &mut StdRng::seed_from_u64(trial.seed),
                    )
                })
                .collect();
            RobotStats {
                robot: robot.clone(),
                outcomes,
            }
        })
        .collect();

    Ok(stats)
}

/// Write a summary of the comparison to the log
pub fn report_comparison(stats: &[RobotStats]) {
    for robot_stats in stats {
        info!(
            "{}: {:.2} turns on average over {} trials",
            robot_stats.robot,
            robot_stats.mean_score(),
            robot_stats.outcomes.len()
        );
        info!(
            "  {} completed, {} ran out of fuel, {} gave up",
            robot_stats.completed(),
            robot_stats.out_of_fuel(),
            robot_stats.turn_limit()
        );
        if let Some(mean) = robot_stats.mean_completed_turns() {
            info!("  {mean:.2} turns on average for completed runs");
        }
    }
}
