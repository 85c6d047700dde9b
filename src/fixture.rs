//! Fixtures for tests
use crate::graph::RoadGraph;
use crate::route::Route;
use crate::village::{Village, VillageParameters};
use crate::world::{MAX_FUEL, Parcel, WorldState};
use rstest::fixture;
use std::rc::Rc;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Create a [`Parcel`] from location names
pub fn parcel(place: &str, address: &str, weight: u32) -> Parcel {
    Parcel {
        place: place.into(),
        address: address.into(),
        weight,
    }
}

/// Create a [`Route`] from location names
pub fn route(places: &[&str]) -> Route {
    places.iter().map(|&place| place.into()).collect()
}

#[fixture]
pub fn village_parameters() -> VillageParameters {
    toml::from_str(include_str!("../villages/meadowfield/village.toml"))
        .expect("Bundled village should be valid")
}

#[fixture]
pub fn meadowfield_roads(village_parameters: VillageParameters) -> Vec<String> {
    village_parameters.roads
}

#[fixture]
pub fn meadowfield(meadowfield_roads: Vec<String>) -> RoadGraph {
    RoadGraph::from_edges(meadowfield_roads).unwrap()
}

#[fixture]
pub fn village(village_parameters: VillageParameters) -> Village {
    Village::new(village_parameters).unwrap()
}

/// A robot at one end of the road `A - B - C - D` with a full tank and nothing to do.
///
/// The refuel point is off the map so fuel only goes down.
#[fixture]
pub fn line_world() -> WorldState {
    WorldState {
        graph: Rc::new(RoadGraph::from_edges(["A-B", "B-C", "C-D"]).unwrap()),
        place: "A".into(),
        parcels: Vec::new(),
        fuel: MAX_FUEL,
        closures: Vec::new(),
        refuel_location: "Depot".into(),
    }
}
