//! Common functionality for robotsim, a simulator of parcel-delivery robots.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod graph;
pub mod id;
pub mod input;
pub mod location;
pub mod log;
pub mod robot;
pub mod route;
pub mod settings;
pub mod simulation;
pub mod village;
pub mod world;

#[cfg(test)]
mod fixture;

/// Get the path to the directory containing robotsim's config files
pub fn get_robotsim_config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_default();
    path.push("robotsim");

    path
}
