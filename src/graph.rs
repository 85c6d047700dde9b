//! Module for building the village road graph
use crate::location::LocationID;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use itertools::Itertools;
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use std::fmt::Display;

/// The character separating the two endpoints in a road description
const ROAD_SEPARATOR: char = '-';

/// An undirected road between two locations
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Road {
    /// One end of the road
    pub from: LocationID,
    /// The other end of the road
    pub to: LocationID,
}

impl Road {
    /// Create a new [`Road`]
    pub fn new(from: LocationID, to: LocationID) -> Self {
        Self { from, to }
    }

    /// Whether this road links `a` and `b`, in either direction
    pub fn connects(&self, a: &LocationID, b: &LocationID) -> bool {
        (&self.from == a && &self.to == b) || (&self.from == b && &self.to == a)
    }
}

impl Display for Road {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{ROAD_SEPARATOR}{}", self.from, self.to)
    }
}

/// The static road network of the village.
///
/// Maps every location to its neighbours, in the order the roads were given. Adjacency is always
/// symmetric and the graph never changes after construction; closed roads are tracked by the world
/// state instead.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadGraph {
    adjacency: IndexMap<LocationID, Vec<LocationID>>,
    roads: Vec<Road>,
}

impl RoadGraph {
    /// Build a graph from road descriptions of the form `"Location A-Location B"`.
    ///
    /// Repeating a road does not add extra neighbour entries.
    ///
    /// # Returns
    ///
    /// The road graph, or an error if any description is malformed
    pub fn from_edges<I, S>(edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut graph = Self {
            adjacency: IndexMap::new(),
            roads: Vec::new(),
        };

        for edge in edges {
            let edge = edge.as_ref();
            let (from, to) =
                parse_road(edge).with_context(|| format!("Invalid road description: '{edge}'"))?;
            graph.add_road(from, to);
        }

        Ok(graph)
    }

    /// Add a link in both directions, reusing existing IDs for known locations
    fn add_road(&mut self, from: &str, to: &str) {
        let from = self.intern(from);
        let to = self.intern(to);

        let mut is_new = false;
        for (a, b) in [(&from, &to), (&to, &from)] {
            let neighbours = self.adjacency.entry(a.clone()).or_default();
            if !neighbours.contains(b) {
                neighbours.push(b.clone());
                is_new = true;
            }
        }

        if is_new {
            self.roads.push(Road::new(from, to));
        }
    }

    fn intern(&mut self, name: &str) -> LocationID {
        match self.adjacency.get_key_value(name) {
            Some((id, _)) => id.clone(),
            None => {
                let id = LocationID::new(name);
                self.adjacency.insert(id.clone(), Vec::new());
                id
            }
        }
    }

    /// Iterate over all locations, in the order they were first mentioned
    pub fn locations(&self) -> impl Iterator<Item = &LocationID> {
        self.adjacency.keys()
    }

    /// The number of locations in the graph
    pub fn location_count(&self) -> usize {
        self.adjacency.len()
    }

    /// The neighbours of `location` in road order (empty for unknown locations)
    pub fn neighbours(&self, location: &LocationID) -> &[LocationID] {
        self.adjacency
            .get(location)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether a road links `a` directly to `b`
    pub fn is_adjacent(&self, a: &LocationID, b: &LocationID) -> bool {
        self.neighbours(a).contains(b)
    }

    /// All distinct roads, in the order they were first given
    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    /// Whether every location can be reached from every other, ignoring closures
    pub fn is_connected(&self) -> bool {
        let node = |location: &LocationID| {
            NodeIndex::new(
                self.adjacency
                    .get_index_of(location)
                    .expect("Road endpoints are always in the graph"),
            )
        };
        let graph = UnGraph::<(), ()>::from_edges(
            self.roads
                .iter()
                .map(|road| (node(&road.from), node(&road.to))),
        );

        connected_components(&graph) <= 1
    }
}

/// Split a road description into its two endpoints
fn parse_road(edge: &str) -> Result<(&str, &str)> {
    let (from, to) = edge
        .split(ROAD_SEPARATOR)
        .map(str::trim)
        .collect_tuple()
        .with_context(|| format!("Expected exactly one '{ROAD_SEPARATOR}' separator"))?;
    ensure!(
        !from.is_empty() && !to.is_empty(),
        "Location names cannot be empty"
    );
    ensure!(from != to, "Road cannot connect {from} to itself");

    Ok((from, to))
}
