//! Defines the `Village` struct, which represents the contents of `village.toml`.
use crate::graph::RoadGraph;
use crate::id::IDCollection;
use crate::input::{input_err_msg, read_toml};
use crate::location::LocationID;
use crate::robot::{Robot, RobotKind};
use crate::route::Route;
use crate::world::WorldState;
use anyhow::{Context, Result, ensure};
use indexmap::IndexSet;
use log::warn;
use rand::Rng;
use serde::Deserialize;
use std::path::Path;
use std::rc::Rc;

/// The name of the village configuration file
pub const VILLAGE_FILE_NAME: &str = "village.toml";

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_parcel_count, usize, 5);
define_param_default!(default_trials, usize, 100);

/// The raw contents of a village file
#[derive(Debug, Deserialize, PartialEq)]
pub struct VillageParameters {
    /// Roads between places, each written as `"Place A-Place B"`
    pub roads: Vec<String>,
    /// Where the robot starts
    pub start: String,
    /// Where the robot can refuel
    pub refuel_location: String,
    /// The route replayed by the fixed-route robot, not including `start`
    #[serde(default)]
    pub mail_route: Vec<String>,
    /// The number of parcels in each randomly generated world
    #[serde(default = "default_parcel_count")]
    pub parcel_count: usize,
    /// The number of worlds used when comparing robots
    #[serde(default = "default_trials")]
    pub trials: usize,
    /// Seed for generating worlds and for robots' random choices
    #[serde(default)]
    pub seed: u64,
}

/// Check that the `parcel_count` parameter is valid
fn check_parcel_count(value: usize) -> Result<()> {
    ensure!(value > 0, "parcel_count cannot be zero");

    Ok(())
}

/// Check that the `trials` parameter is valid
fn check_trials(value: usize) -> Result<()> {
    ensure!(value > 0, "trials cannot be zero");

    Ok(())
}

/// Check that every step of the mail route follows a road
fn check_mail_route(
    graph: &RoadGraph,
    start: &LocationID,
    mail_route: &[LocationID],
) -> Result<()> {
    let mut at = start;
    for place in mail_route {
        ensure!(
            graph.is_adjacent(at, place),
            "Mail route goes from {at} to {place} but there is no road between them"
        );
        at = place;
    }

    Ok(())
}

/// A village: its road network and where the robot starts and refuels
#[derive(Debug, Clone, PartialEq)]
pub struct Village {
    /// The road network
    pub graph: Rc<RoadGraph>,
    /// Where the robot starts
    pub start: LocationID,
    /// Where the robot can refuel
    pub refuel_location: LocationID,
    /// The route replayed by the fixed-route robot
    pub mail_route: Route,
    /// The number of parcels in each randomly generated world
    pub parcel_count: usize,
    /// The default number of worlds used when comparing robots
    pub trials: usize,
    /// The default random seed
    pub seed: u64,
}

impl Village {
    /// Read a village file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `village_dir` - Folder containing the village configuration file
    ///
    /// # Returns
    ///
    /// The village or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(village_dir: P) -> Result<Self> {
        let file_path = village_dir.as_ref().join(VILLAGE_FILE_NAME);
        let parameters: VillageParameters = read_toml(&file_path)?;

        Self::new(parameters).with_context(|| input_err_msg(&file_path))
    }

    /// Build and validate a village from the raw parameters
    pub fn new(parameters: VillageParameters) -> Result<Self> {
        check_parcel_count(parameters.parcel_count)?;
        check_trials(parameters.trials)?;

        let graph = RoadGraph::from_edges(&parameters.roads)?;
        ensure!(graph.location_count() >= 2, "Village has no roads");
        if !graph.is_connected() {
            warn!("Not every place in the village can be reached from every other place");
        }

        let locations: IndexSet<LocationID> = graph.locations().cloned().collect();
        let start = locations
            .get_id_by_str(&parameters.start)
            .context("Invalid start location")?;
        let refuel_location = locations
            .get_id_by_str(&parameters.refuel_location)
            .context("Invalid refuel location")?;
        let mail_route = parameters
            .mail_route
            .iter()
            .map(|place| locations.get_id_by_str(place))
            .collect::<Result<Route>>()
            .context("Invalid mail route")?;
        check_mail_route(&graph, &start, &mail_route)?;

        Ok(Self {
            graph: Rc::new(graph),
            start,
            refuel_location,
            mail_route,
            parcel_count: parameters.parcel_count,
            trials: parameters.trials,
            seed: parameters.seed,
        })
    }

    /// Generate a random world in this village
    pub fn random_state<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<WorldState> {
        WorldState::random(
            Rc::clone(&self.graph),
            self.start.clone(),
            self.refuel_location.clone(),
            self.parcel_count,
            rng,
        )
    }

    /// Create a robot of the given kind for this village
    pub fn robot(&self, kind: RobotKind) -> Robot {
        Robot::new(kind, &self.mail_route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, village, village_parameters};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[rstest]
    fn test_village_new(village: Village) {
        assert_eq!(village.graph.location_count(), 11);
        assert_eq!(village.start, "Post Office".into());
        assert_eq!(village.refuel_location, "Marketplace".into());
        assert_eq!(village.mail_route.len(), 13);
        assert_eq!(village.mail_route.last(), Some(&village.start));
        assert_eq!(village.parcel_count, 5);
        assert_eq!(village.trials, 100);
        assert_eq!(village.seed, 0);
    }

    #[rstest]
    fn test_village_new_unknown_start(village_parameters: VillageParameters) {
        let parameters = VillageParameters {
            start: "Castle".into(),
            ..village_parameters
        };
        assert_error!(Village::new(parameters), "Invalid start location");
    }

    #[rstest]
    fn test_village_new_unknown_refuel_location(village_parameters: VillageParameters) {
        let parameters = VillageParameters {
            refuel_location: "Castle".into(),
            ..village_parameters
        };
        assert_error!(Village::new(parameters), "Invalid refuel location");
    }

    #[rstest]
    fn test_village_new_broken_mail_route(village_parameters: VillageParameters) {
        let parameters = VillageParameters {
            mail_route: vec!["Cabin".into()],
            ..village_parameters
        };
        assert_error!(
            Village::new(parameters),
            "Mail route goes from Post Office to Cabin but there is no road between them"
        );
    }

    #[rstest]
    fn test_village_new_bad_road(village_parameters: VillageParameters) {
        let mut parameters = village_parameters;
        parameters.roads.push("Shop".into());
        assert_error!(Village::new(parameters), "Invalid road description: 'Shop'");
    }

    #[rstest]
    #[case(0, 1, "parcel_count cannot be zero")]
    #[case(1, 0, "trials cannot be zero")]
    fn test_village_new_bad_counts(
        village_parameters: VillageParameters,
        #[case] parcel_count: usize,
        #[case] trials: usize,
        #[case] msg: &str,
    ) {
        let parameters = VillageParameters {
            parcel_count,
            trials,
            ..village_parameters
        };
        assert_error!(Village::new(parameters), msg);
    }

    #[test]
    fn test_village_from_path() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(VILLAGE_FILE_NAME)).unwrap();
            writeln!(
                file,
                "roads = [\"A-B\", \"B-C\"]\nstart = \"A\"\nrefuel_location = \"C\""
            )
            .unwrap();
        }

        let village = Village::from_path(dir.path()).unwrap();
        assert_eq!(village.graph.roads().len(), 2);
        assert!(village.mail_route.is_empty());
        assert_eq!(village.parcel_count, default_parcel_count());
        assert_eq!(village.trials, default_trials());
    }

    #[test]
    fn test_village_from_path_missing_file() {
        let dir = tempdir().unwrap();
        assert!(Village::from_path(dir.path()).is_err());
    }

    #[rstest]
    fn test_random_state(village: Village) {
        let state = village.random_state(&mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(state.place, village.start);
        assert_eq!(state.refuel_location, village.refuel_location);
        assert_eq!(state.parcels.len(), village.parcel_count);
    }

    #[rstest]
    fn test_robot(village: Village) {
        assert_eq!(
            village.robot(RobotKind::FixedRoute),
            Robot::FixedRoute(village.mail_route.clone())
        );
        assert_eq!(village.robot(RobotKind::Random), Robot::Random);
    }
}
