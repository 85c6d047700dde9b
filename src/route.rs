//! Shortest-path route finding over the road graph.
use crate::graph::{Road, RoadGraph};
use crate::location::LocationID;
use std::collections::{HashSet, VecDeque};

/// The locations still to be visited, in order, excluding the starting point
pub type Route = Vec<LocationID>;

/// Whether the road between `a` and `b` is in `closures`
pub fn is_closed(closures: &[Road], a: &LocationID, b: &LocationID) -> bool {
    closures.iter().any(|road| road.connects(a, b))
}

/// Find a shortest route from `from` to `to` which avoids closed roads.
///
/// This is a breadth-first search which visits neighbours in road order, so among several shortest
/// routes the same one is always chosen.
///
/// # Returns
///
/// The locations to travel through, ending at `to` (empty if `from == to`), or `None` if `to`
/// cannot be reached.
pub fn find_route(
    graph: &RoadGraph,
    from: &LocationID,
    to: &LocationID,
    closures: &[Road],
) -> Option<Route> {
    if from == to {
        return Some(Route::new());
    }

    let mut scheduled = HashSet::from([from]);
    let mut work = VecDeque::from([(from, Route::new())]);
    while let Some((at, route)) = work.pop_front() {
        for place in graph.neighbours(at) {
            if is_closed(closures, at, place) {
                continue;
            }

            if place == to {
                let mut route = route;
                route.push(place.clone());
                return Some(route);
            }

            if scheduled.insert(place) {
                let mut next = route.clone();
                next.push(place.clone());
                work.push_back((place, next));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{meadowfield, route};
    use rstest::rstest;

    /// Shortest distances from `from` to every reachable location
    fn bfs_distances(graph: &RoadGraph, from: &LocationID) -> Vec<(LocationID, usize)> {
        let mut distances = vec![(from.clone(), 0)];
        let mut frontier = vec![from.clone()];
        let mut distance = 0;
        while !frontier.is_empty() {
            distance += 1;
            let mut next = Vec::new();
            for at in &frontier {
                for place in graph.neighbours(at) {
                    if distances.iter().all(|(seen, _)| seen != place) {
                        distances.push((place.clone(), distance));
                        next.push(place.clone());
                    }
                }
            }
            frontier = next;
        }

        distances
    }

    #[test]
    fn test_find_route_simple() {
        let graph = RoadGraph::from_edges(["A-B", "B-C"]).unwrap();
        assert_eq!(
            find_route(&graph, &"A".into(), &"C".into(), &[]),
            Some(route(&["B", "C"]))
        );
    }

    #[test]
    fn test_find_route_same_place() {
        let graph = RoadGraph::from_edges(["A-B"]).unwrap();
        assert_eq!(
            find_route(&graph, &"A".into(), &"A".into(), &[]),
            Some(Route::new())
        );
    }

    #[test]
    fn test_find_route_tie_break_uses_road_order() {
        let graph = RoadGraph::from_edges(["A-B", "A-C", "B-D", "C-D"]).unwrap();
        assert_eq!(
            find_route(&graph, &"A".into(), &"D".into(), &[]),
            Some(route(&["B", "D"]))
        );
    }

    #[test]
    fn test_find_route_unreachable() {
        let graph = RoadGraph::from_edges(["A-B", "C-D"]).unwrap();
        assert_eq!(find_route(&graph, &"A".into(), &"D".into(), &[]), None);
    }

    #[test]
    fn test_find_route_avoids_closure() {
        let graph = RoadGraph::from_edges(["A-B", "B-C", "A-D", "D-E", "E-C"]).unwrap();
        let closures = [Road::new("C".into(), "B".into())];
        assert_eq!(
            find_route(&graph, &"A".into(), &"C".into(), &closures),
            Some(route(&["D", "E", "C"]))
        );
    }

    #[test]
    fn test_find_route_closure_disconnects() {
        let graph = RoadGraph::from_edges(["A-B", "B-C"]).unwrap();
        let closures = [Road::new("A".into(), "B".into())];
        assert_eq!(find_route(&graph, &"A".into(), &"C".into(), &closures), None);
        assert_eq!(find_route(&graph, &"C".into(), &"A".into(), &closures), None);
    }

    #[rstest]
    fn test_find_route_is_shortest(meadowfield: RoadGraph) {
        for from in meadowfield.locations() {
            for (to, distance) in bfs_distances(&meadowfield, from) {
                let found = find_route(&meadowfield, from, &to, &[]).unwrap();
                assert_eq!(found.len(), distance, "{from} -> {to}");

                // Every step must follow a road
                let mut at = from;
                for place in &found {
                    assert!(meadowfield.is_adjacent(at, place));
                    at = place;
                }
            }
        }
    }

    #[rstest]
    fn test_find_route_never_uses_closed_road(meadowfield: RoadGraph) {
        for closed in meadowfield.roads() {
            let closures = [closed.clone()];
            for from in meadowfield.locations() {
                for to in meadowfield.locations() {
                    let Some(found) = find_route(&meadowfield, from, to, &closures) else {
                        continue;
                    };
                    let mut at = from;
                    for place in &found {
                        assert!(!closed.connects(at, place));
                        at = place;
                    }
                }
            }
        }
    }
}
