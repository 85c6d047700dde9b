//! Code related to the example villages and the CLI commands for interacting with them.
use super::{CompareOpts, RunOpts, handle_compare_command, handle_run_command};
use crate::settings::Settings;
use crate::simulation::{RobotStats, RunOutcome};
use anyhow::{Context, Result, ensure};
use clap::Subcommand;
use include_dir::{Dir, DirEntry, include_dir};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The directory containing the example villages.
const EXAMPLES_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/villages");

/// The available subcommands for managing example villages.
#[derive(Subcommand)]
pub enum ExampleSubcommands {
    /// List available examples.
    List,
    /// Provide information about the specified example.
    Info {
        /// The name of the example.
        name: String,
    },
    /// Extract an example village configuration to a new directory.
    Extract {
        /// The name of the example to extract.
        name: String,
        /// The destination folder for the example.
        new_path: Option<PathBuf>,
    },
    /// Run a robot in an example village.
    Run {
        /// The name of the example to run.
        name: String,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Compare robots in an example village.
    Compare {
        /// The name of the example to use.
        name: String,
        /// Other compare options
        #[command(flatten)]
        opts: CompareOpts,
    },
}

impl ExampleSubcommands {
    /// Execute the supplied example subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::List => handle_example_list_command(),
            Self::Info { name } => handle_example_info_command(&name)?,
            Self::Extract {
                name,
                new_path: dest,
            } => handle_example_extract_command(&name, dest.as_deref())?,
            Self::Run { name, opts } => {
                handle_example_run_command(&name, &opts, None)?;
            }
            Self::Compare { name, opts } => {
                handle_example_compare_command(&name, &opts, None)?;
            }
        }

        Ok(())
    }
}

/// Handle the `example list` command.
fn handle_example_list_command() {
    for entry in EXAMPLES_DIR.dirs() {
        println!("{}", entry.path().display());
    }
}

/// Handle the `example info` command.
fn handle_example_info_command(name: &str) -> Result<()> {
    let path: PathBuf = [name, "README.txt"].iter().collect();
    let readme = EXAMPLES_DIR
        .get_file(path)
        .context("Example not found.")?
        .contents_utf8()
        .context("README.txt is not UTF-8 encoded")?;

    println!("{readme}");

    Ok(())
}

/// Handle the `example extract` command
fn handle_example_extract_command(name: &str, dest: Option<&Path>) -> Result<()> {
    let dest = dest.unwrap_or(Path::new(name));
    extract_example(name, dest)
}

/// Extract the specified example to a new directory
fn extract_example(name: &str, new_path: &Path) -> Result<()> {
    // Find the subdirectory in EXAMPLES_DIR whose name matches `name`.
    let sub_dir = EXAMPLES_DIR.get_dir(name).context("Example not found.")?;

    ensure!(
        !new_path.exists(),
        "Destination directory {} already exists",
        new_path.display()
    );

    // Copy the contents of the subdirectory to the destination
    fs::create_dir(new_path)?;
    for entry in sub_dir.entries() {
        match entry {
            DirEntry::Dir(_) => panic!("Subdirectories in examples not supported"),
            DirEntry::File(f) => {
                let file_name = f
                    .path()
                    .file_name()
                    .context("Example file has no name")?;
                let file_path = new_path.join(file_name);
                fs::write(&file_path, f.contents())?;
            }
        }
    }

    Ok(())
}

/// Extract an example to a temporary directory, returning the directory and the village path
fn extract_example_to_temp_dir(name: &str) -> Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new().context("Failed to create temporary directory.")?;
    let village_path = temp_dir.path().join(name);
    extract_example(name, &village_path)?;

    Ok((temp_dir, village_path))
}

/// Handle the `example run` command.
pub fn handle_example_run_command(
    name: &str,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<RunOutcome> {
    let (_temp_dir, village_path) = extract_example_to_temp_dir(name)?;
    handle_run_command(&village_path, opts, settings)
}

/// Handle the `example compare` command.
pub fn handle_example_compare_command(
    name: &str,
    opts: &CompareOpts,
    settings: Option<Settings>,
) -> Result<Vec<RobotStats>> {
    let (_temp_dir, village_path) = extract_example_to_temp_dir(name)?;
    handle_compare_command(&village_path, opts, settings)
}
