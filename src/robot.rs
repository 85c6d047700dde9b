//! The decision strategies available for the delivery robot.
//!
//! Every strategy is asked for one move at a time. It is given the current [`WorldState`] along
//! with whatever [`RobotMemory`] it returned on its previous turn and answers with a
//! [`Decision`]. Strategies which plan ahead keep the rest of their planned route in memory.
use crate::location::LocationID;
use crate::route::{Route, find_route};
use crate::world::{Parcel, WorldState};
use log::trace;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::collections::VecDeque;
use strum::{EnumIter, EnumString};

/// The maximum weight of parcels a capacity-aware robot will carry at once
pub const CARGO_CAPACITY: u32 = 10;

/// The number of spare moves a fuel-aware robot keeps in its tank on top of the trip to refuel
pub const REFUEL_SAFETY_BUFFER: usize = 10;

/// The extra cost of a pickup relative to a delivery of the same length.
///
/// This breaks ties in favour of finishing deliveries.
const PICKUP_PENALTY: f64 = 0.5;

/// The names of the available robots
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum RobotKind {
    /// Wanders to a random neighbour every turn
    Random,
    /// Follows the village's mail route over and over
    FixedRoute,
    /// Deals with parcels strictly in order
    GoalOriented,
    /// Heads for whichever task is closest
    GreedyNearest,
    /// Like `greedy-nearest`, but won't pick up more than it can carry
    CapacityAware,
    /// Like `capacity-aware`, but refuels before running low
    FuelAware,
}

/// A delivery robot strategy
#[derive(Debug, Clone, PartialEq)]
pub enum Robot {
    /// Moves to a uniformly random neighbour, ignoring closures
    Random,
    /// Replays a fixed route regardless of where the parcels are
    FixedRoute(Route),
    /// Picks up and delivers the first parcel in the list before considering the next
    GoalOriented,
    /// Commits to the task with the shortest route
    GreedyNearest,
    /// As [`Robot::GreedyNearest`], skipping pickups which would exceed [`CARGO_CAPACITY`]
    CapacityAware,
    /// As [`Robot::CapacityAware`], heading to the refuel point first when fuel is running low
    FuelAware,
}

impl Robot {
    /// Create the robot of the given kind. Only [`RobotKind::FixedRoute`] uses `mail_route`.
    pub fn new(kind: RobotKind, mail_route: &[LocationID]) -> Self {
        match kind {
            RobotKind::Random => Self::Random,
            RobotKind::FixedRoute => Self::FixedRoute(mail_route.to_vec()),
            RobotKind::GoalOriented => Self::GoalOriented,
            RobotKind::GreedyNearest => Self::GreedyNearest,
            RobotKind::CapacityAware => Self::CapacityAware,
            RobotKind::FuelAware => Self::FuelAware,
        }
    }

    /// The kind of this robot
    pub fn kind(&self) -> RobotKind {
        match self {
            Self::Random => RobotKind::Random,
            Self::FixedRoute(_) => RobotKind::FixedRoute,
            Self::GoalOriented => RobotKind::GoalOriented,
            Self::GreedyNearest => RobotKind::GreedyNearest,
            Self::CapacityAware => RobotKind::CapacityAware,
            Self::FuelAware => RobotKind::FuelAware,
        }
    }

    /// Choose the robot's next move.
    ///
    /// # Arguments
    ///
    /// * `state` - The current state of the world
    /// * `memory` - The memory returned with the robot's previous decision
    /// * `rng` - The source of randomness for robots which need it
    pub fn decide<R: Rng + ?Sized>(
        &self,
        state: &WorldState,
        memory: RobotMemory,
        rng: &mut R,
    ) -> Decision {
        match self {
            Self::Random => Decision::idle(state, rng),
            Self::FixedRoute(mail_route) => {
                let route = if memory.is_empty() {
                    mail_route.iter().cloned().collect()
                } else {
                    memory.0
                };
                Decision::follow(route, state, rng)
            }
            Self::GoalOriented => {
                let route = if memory.is_empty() {
                    state.parcels.first().and_then(|parcel| {
                        let target = if parcel.place == state.place {
                            &parcel.address
                        } else {
                            &parcel.place
                        };
                        find_route(&state.graph, &state.place, target, &state.closures)
                            .map(VecDeque::from)
                    })
                } else {
                    Some(memory.0)
                };
                Decision::follow_or_idle(route, state, rng)
            }
            Self::GreedyNearest => Self::decide_task(state, memory, None, rng),
            Self::CapacityAware => Self::decide_task(state, memory, Some(CARGO_CAPACITY), rng),
            Self::FuelAware => {
                if let Some(route) = route_to_refuel_if_low(state) {
                    trace!("Fuel low ({}), heading to {}", state.fuel, state.refuel_location);
                    return Decision::follow(route.into(), state, rng);
                }
                Self::decide_task(state, memory, Some(CARGO_CAPACITY), rng)
            }
        }
    }

    /// Follow the pending route, or plan a new one to the best task if there is none
    fn decide_task<R: Rng + ?Sized>(
        state: &WorldState,
        memory: RobotMemory,
        capacity: Option<u32>,
        rng: &mut R,
    ) -> Decision {
        if !memory.is_empty() {
            return Decision::follow(memory.0, state, rng);
        }

        let route = choose_task(state, capacity).map(|task| {
            trace!(
                "Planning {} of parcel for {} ({} moves)",
                task.kind,
                task.parcel.address,
                task.route.len()
            );
            VecDeque::from(task.route)
        });
        Decision::follow_or_idle(route, state, rng)
    }
}

impl Display for Robot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind())
    }
}

/// Private state a robot carries from one turn to the next.
///
/// Only the robot which produced it can make sense of the contents. For now this is always the
/// rest of a planned route.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotMemory(VecDeque<LocationID>);

impl RobotMemory {
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A robot's choice of move for one turn
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// The location to move to
    pub direction: LocationID,
    /// The memory to pass back to the robot on its next turn
    pub memory: RobotMemory,
}

impl Decision {
    /// Move to a uniformly random neighbour and forget any plan
    fn idle<R: Rng + ?Sized>(state: &WorldState, rng: &mut R) -> Self {
        let direction = state
            .graph
            .neighbours(&state.place)
            .choose(rng)
            .unwrap_or(&state.place)
            .clone();

        Self {
            direction,
            memory: RobotMemory::default(),
        }
    }

    /// Take the first step of `route`, remembering the rest
    fn follow<R: Rng + ?Sized>(
        mut route: VecDeque<LocationID>,
        state: &WorldState,
        rng: &mut R,
    ) -> Self {
        let Some(direction) = route.pop_front() else {
            return Self::idle(state, rng);
        };

        Self {
            direction,
            memory: RobotMemory(route),
        }
    }

    fn follow_or_idle<R: Rng + ?Sized>(
        route: Option<VecDeque<LocationID>>,
        state: &WorldState,
        rng: &mut R,
    ) -> Self {
        match route {
            Some(route) => Self::follow(route, state, rng),
            None => Self::idle(state, rng),
        }
    }
}

/// Whether a task means fetching a parcel or dropping one off
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
enum TaskKind {
    Pickup,
    Delivery,
}

/// Something the robot could do next, with the route needed to do it
#[derive(Debug)]
struct Task<'a> {
    parcel: &'a Parcel,
    kind: TaskKind,
    route: Route,
}

impl Task<'_> {
    /// Lower is better
    fn score(&self) -> f64 {
        let penalty = match self.kind {
            TaskKind::Pickup => PICKUP_PENALTY,
            TaskKind::Delivery => 0.0,
        };
        self.route.len() as f64 + penalty
    }
}

/// Work out every task which can currently be carried out
fn reachable_tasks(state: &WorldState) -> Vec<Task<'_>> {
    state
        .parcels
        .iter()
        .filter_map(|parcel| {
            let (kind, target) = if parcel.place == state.place {
                (TaskKind::Delivery, &parcel.address)
            } else {
                (TaskKind::Pickup, &parcel.place)
            };
            let route = find_route(&state.graph, &state.place, target, &state.closures)?;
            (!route.is_empty()).then_some(Task {
                parcel,
                kind,
                route,
            })
        })
        .collect()
}

/// Pick the lowest-scoring reachable task.
///
/// With a `capacity`, pickups which would take the robot's load over it are left out, falling back
/// on deliveries alone if nothing else is left. The first of several equally good tasks wins.
fn choose_task(state: &WorldState, capacity: Option<u32>) -> Option<Task<'_>> {
    let mut tasks = reachable_tasks(state);
    if let Some(capacity) = capacity {
        let load = state.current_load();
        let fits = |task: &Task| {
            task.kind == TaskKind::Delivery || load + task.parcel.weight <= capacity
        };
        if tasks.iter().any(fits) {
            tasks.retain(fits);
        } else {
            tasks.retain(|task| task.kind == TaskKind::Delivery);
        }
    }

    tasks
        .into_iter()
        .min_by(|a, b| a.score().total_cmp(&b.score()))
}

/// The route to the refuel point, if the robot is away from it and short of fuel for the trip
fn route_to_refuel_if_low(state: &WorldState) -> Option<Route> {
    if state.place == state.refuel_location {
        return None;
    }

    let route = find_route(
        &state.graph,
        &state.place,
        &state.refuel_location,
        &state.closures,
    )?;
    ((state.fuel as usize) < route.len() + REFUEL_SAFETY_BUFFER).then_some(route)
}
