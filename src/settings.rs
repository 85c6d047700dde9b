//! Program-wide settings, read from `settings.toml` in the user's config directory.
//!
//! Every setting is optional. Anything given on the command line takes precedence.
use crate::get_robotsim_config_dir;
use crate::input::read_toml;
use crate::log::DEFAULT_LOG_LEVEL;
use crate::robot::RobotKind;
use anyhow::{Context, Result};
use documented::DocumentedFields;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Get the path to where the settings file will be read from
pub fn get_settings_file_path() -> PathBuf {
    get_robotsim_config_dir().join(SETTINGS_FILE_NAME)
}

/// Program settings from config file
#[derive(Debug, Clone, DocumentedFields, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// The program log level (off, error, warn, info, debug or trace)
    pub log_level: String,
    /// The robot used by the run command when none is given
    pub robot: RobotKind,
    /// The robots used by the compare command when none are given
    pub compare_robots: Vec<RobotKind>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            robot: RobotKind::FuelAware,
            compare_robots: RobotKind::iter().collect(),
        }
    }
}

impl Settings {
    /// Read the settings file, using the defaults if there isn't one
    pub fn load() -> Result<Self> {
        Self::load_from_path(&get_settings_file_path())
    }

    fn load_from_path(file_path: &Path) -> Result<Self> {
        if file_path.is_file() {
            read_toml(file_path)
        } else {
            Ok(Self::default())
        }
    }

    /// A settings file with every setting documented and commented out at its default value
    pub fn template() -> Result<String> {
        let defaults = toml::Value::try_from(Self::default())?;
        let defaults = defaults
            .as_table()
            .context("Settings should serialise to a table")?;

        let mut out = String::from("# Settings for robotsim. Uncomment a setting to change it.\n");
        for (name, value) in defaults {
            let docs = Self::get_field_docs(name)
                .ok()
                .with_context(|| format!("Setting {name} is undocumented"))?;
            writeln!(out)?;
            for line in docs.lines() {
                writeln!(out, "# {}", line.trim())?;
            }
            writeln!(out, "# {name} = {value}")?;
        }

        Ok(out)
    }
}
