//! The state of the simulated world and the rules for moving through it.
use crate::graph::{Road, RoadGraph};
use crate::location::LocationID;
use crate::route::is_closed;
use anyhow::{Context, Result, ensure};
use rand::Rng;
use rand::seq::{IteratorRandom, SliceRandom};
use std::rc::Rc;

/// The amount of fuel in a full tank
pub const MAX_FUEL: u32 = 100;

/// The possible weights of a randomly generated parcel
const PARCEL_WEIGHTS: [u32; 3] = [1, 2, 3];

/// A parcel waiting to be delivered
#[derive(Debug, Clone, PartialEq)]
pub struct Parcel {
    /// Where the parcel currently is. It moves along with the robot once picked up.
    pub place: LocationID,
    /// Where the parcel should be dropped off
    pub address: LocationID,
    /// The weight of the parcel, counted against the robot's cargo capacity
    pub weight: u32,
}

/// An immutable snapshot of the world.
///
/// A parcel counts as carried by the robot whenever it is at the robot's current location. New
/// states are only ever produced by [`WorldState::move_to`].
#[derive(Debug, Clone, PartialEq)]
pub struct WorldState {
    /// The road network, shared by all states in a simulation
    pub graph: Rc<RoadGraph>,
    /// The robot's current location
    pub place: LocationID,
    /// Parcels not yet delivered
    pub parcels: Vec<Parcel>,
    /// Fuel left in the tank
    pub fuel: u32,
    /// Roads which are currently impassable
    pub closures: Vec<Road>,
    /// Where the robot's tank is filled up
    pub refuel_location: LocationID,
}

impl WorldState {
    /// Generate a random world.
    ///
    /// Each parcel gets a random address and a different random starting place, with a weight of
    /// 1, 2 or 3. One random road is closed. The robot starts at `start` with a full tank.
    pub fn random<R: Rng + ?Sized>(
        graph: Rc<RoadGraph>,
        start: LocationID,
        refuel_location: LocationID,
        parcel_count: usize,
        rng: &mut R,
    ) -> Result<Self> {
        ensure!(
            graph.location_count() >= 2,
            "At least two locations are needed to generate parcels"
        );

        let locations: Vec<_> = graph.locations().cloned().collect();
        let mut parcels = Vec::with_capacity(parcel_count);
        for _ in 0..parcel_count {
            let address = locations
                .choose(rng)
                .context("No locations to choose from")?
                .clone();
            let place = locations
                .iter()
                .filter(|place| **place != address)
                .choose(rng)
                .context("No starting place available for parcel")?
                .clone();
            let weight = PARCEL_WEIGHTS[rng.gen_range(0..PARCEL_WEIGHTS.len())];
            parcels.push(Parcel {
                place,
                address,
                weight,
            });
        }

        let closures = graph.roads().choose(rng).cloned().into_iter().collect();

        Ok(Self {
            graph,
            place: start,
            parcels,
            fuel: MAX_FUEL,
            closures,
            refuel_location,
        })
    }

    /// Whether the robot can drive from its current location straight to `destination`
    pub fn can_move_to(&self, destination: &LocationID) -> bool {
        self.graph.is_adjacent(&self.place, destination)
            && !is_closed(&self.closures, &self.place, destination)
    }

    /// Move the robot to a neighbouring location, returning the resulting state.
    ///
    /// Moving somewhere which is not directly reachable leaves the state unchanged. Starting from
    /// the refuel location fills the tank first. Every move costs one unit of fuel; a move which
    /// empties the tank strands the robot where it was and all remaining parcels are lost.
    pub fn move_to(&self, destination: &LocationID) -> Self {
        if !self.can_move_to(destination) {
            return self.clone();
        }

        let fuel = if self.place == self.refuel_location {
            MAX_FUEL
        } else {
            self.fuel
        };
        let fuel = fuel.saturating_sub(1);
        if fuel == 0 {
            return self.stranded();
        }

        let parcels = self
            .parcels
            .iter()
            .map(|parcel| {
                if parcel.place == self.place {
                    Parcel {
                        place: destination.clone(),
                        ..parcel.clone()
                    }
                } else {
                    parcel.clone()
                }
            })
            .filter(|parcel| parcel.place != parcel.address)
            .collect();

        Self {
            graph: Rc::clone(&self.graph),
            place: destination.clone(),
            parcels,
            fuel,
            closures: self.closures.clone(),
            refuel_location: self.refuel_location.clone(),
        }
    }

    /// The terminal state of a robot which has run out of fuel
    fn stranded(&self) -> Self {
        Self {
            graph: Rc::clone(&self.graph),
            place: self.place.clone(),
            parcels: Vec::new(),
            fuel: 0,
            closures: self.closures.clone(),
            refuel_location: self.refuel_location.clone(),
        }
    }

    /// Whether the robot has run out of fuel
    pub fn is_stranded(&self) -> bool {
        self.fuel == 0
    }

    /// Whether every parcel has been delivered
    pub fn is_complete(&self) -> bool {
        self.parcels.is_empty()
    }

    /// Iterate over the parcels at the robot's location, i.e. those it is carrying
    pub fn carried_parcels(&self) -> impl Iterator<Item = &Parcel> {
        self.parcels
            .iter()
            .filter(|parcel| parcel.place == self.place)
    }

    /// The total weight of the parcels the robot is carrying
    pub fn current_load(&self) -> u32 {
        self.carried_parcels().map(|parcel| parcel.weight).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{line_world, meadowfield, parcel};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;

    #[rstest]
    fn test_move_to_delivers_parcel(line_world: WorldState) {
        let state = WorldState {
            parcels: vec![parcel("A", "C", 1)],
            fuel: 5,
            ..line_world
        };

        let state = state.move_to(&"B".into());
        assert_eq!(state.parcels, [parcel("B", "C", 1)]);
        assert_eq!(state.fuel, 4);

        let state = state.move_to(&"C".into());
        assert!(state.parcels.is_empty());
        assert!(state.is_complete());
        assert_eq!(state.fuel, 3);
        assert_eq!(state.place, "C".into());
    }

    #[rstest]
    fn test_move_to_leaves_other_parcels(line_world: WorldState) {
        let state = WorldState {
            parcels: vec![parcel("C", "A", 2), parcel("A", "B", 1)],
            ..line_world
        };

        let state = state.move_to(&"B".into());
        assert_eq!(state.parcels, [parcel("C", "A", 2)]);
    }

    #[rstest]
    fn test_move_to_closed_road_is_noop(line_world: WorldState) {
        let state = WorldState {
            parcels: vec![parcel("A", "C", 1)],
            closures: vec![Road::new("A".into(), "B".into())],
            ..line_world
        };

        assert_eq!(state.move_to(&"B".into()), state);
    }

    #[rstest]
    #[case("C")]
    #[case("A")]
    #[case("Nowhere")]
    fn test_move_to_non_adjacent_is_noop(line_world: WorldState, #[case] destination: &str) {
        let state = WorldState {
            parcels: vec![parcel("A", "C", 1)],
            ..line_world
        };

        assert_eq!(state.move_to(&destination.into()), state);
    }

    #[rstest]
    fn test_move_to_fuel_decreases(line_world: WorldState) {
        let mut state = WorldState {
            parcels: vec![parcel("C", "A", 1)],
            fuel: 50,
            ..line_world
        };

        for (destination, fuel) in [("B", 49), ("C", 48), ("B", 47), ("A", 46)] {
            state = state.move_to(&destination.into());
            assert_eq!(state.fuel, fuel);
        }
    }

    #[rstest]
    fn test_move_to_refuels_before_moving(line_world: WorldState) {
        let state = WorldState {
            parcels: vec![parcel("C", "A", 1)],
            fuel: 3,
            refuel_location: "B".into(),
            ..line_world
        };

        let state = state.move_to(&"B".into());
        assert_eq!(state.fuel, 2);
        let state = state.move_to(&"C".into());
        assert_eq!(state.fuel, MAX_FUEL - 1);
    }

    #[rstest]
    fn test_move_to_out_of_fuel(line_world: WorldState) {
        let state = WorldState {
            parcels: vec![parcel("C", "A", 1), parcel("A", "C", 1)],
            fuel: 1,
            closures: vec![Road::new("B".into(), "C".into())],
            ..line_world
        };

        let stranded = state.move_to(&"B".into());
        assert!(stranded.is_stranded());
        assert_eq!(stranded.place, "A".into());
        assert!(stranded.parcels.is_empty());
        assert_eq!(stranded.closures, state.closures);
        assert_eq!(stranded.refuel_location, state.refuel_location);
    }

    #[rstest]
    fn test_current_load(line_world: WorldState) {
        let state = WorldState {
            parcels: vec![parcel("A", "C", 2), parcel("B", "C", 3), parcel("A", "B", 1)],
            ..line_world
        };

        assert_eq!(state.carried_parcels().count(), 2);
        assert_eq!(state.current_load(), 3);
    }

    #[rstest]
    fn test_random(meadowfield: RoadGraph) {
        let graph = Rc::new(meadowfield);
        let mut rng = StdRng::seed_from_u64(42);
        let state = WorldState::random(
            Rc::clone(&graph),
            "Post Office".into(),
            "Marketplace".into(),
            20,
            &mut rng,
        )
        .unwrap();

        assert_eq!(state.place, "Post Office".into());
        assert_eq!(state.refuel_location, "Marketplace".into());
        assert_eq!(state.fuel, MAX_FUEL);
        assert_eq!(state.parcels.len(), 20);
        for parcel in &state.parcels {
            assert_ne!(parcel.place, parcel.address);
            assert!(!graph.neighbours(&parcel.place).is_empty());
            assert!(!graph.neighbours(&parcel.address).is_empty());
            assert!(PARCEL_WEIGHTS.contains(&parcel.weight));
        }
        assert_eq!(state.closures.len(), 1);
        assert!(graph.roads().contains(&state.closures[0]));
    }

    #[rstest]
    fn test_random_is_reproducible(meadowfield: RoadGraph) {
        let graph = Rc::new(meadowfield);
        let generate = |seed| {
            WorldState::random(
                Rc::clone(&graph),
                "Post Office".into(),
                "Marketplace".into(),
                5,
                &mut StdRng::seed_from_u64(seed),
            )
            .unwrap()
        };

        assert_eq!(generate(7), generate(7));
    }

    #[test]
    fn test_random_too_few_locations() {
        let graph = Rc::new(RoadGraph::from_edges(Vec::<&str>::new()).unwrap());
        let mut rng = StdRng::seed_from_u64(0);
        assert!(WorldState::random(graph, "A".into(), "A".into(), 1, &mut rng).is_err());
    }
}
