//! The `settings` command, for inspecting and changing the program settings file.
use crate::settings::{Settings, get_settings_file_path};
use anyhow::{Context, Result};
use clap::Subcommand;
use std::fs;
use std::path::Path;

/// Subcommands for settings
#[derive(Subcommand)]
pub enum SettingsSubcommands {
    /// Open the settings file in a text editor, creating it from the template if needed
    Edit,
    /// Print where the settings file is read from
    Path,
    /// Print the settings currently in effect
    Show {
        /// Print the documented template with every setting at its default instead
        #[arg(long)]
        template: bool,
    },
}

impl SettingsSubcommands {
    /// Execute the supplied settings subcommand
    pub fn execute(self) -> Result<()> {
        let file_path = get_settings_file_path();
        match self {
            Self::Edit => edit_settings_file(&file_path)?,
            Self::Path => println!("{}", file_path.display()),
            Self::Show { template: true } => print!("{}", Settings::template()?),
            Self::Show { template: false } => {
                let settings = Settings::load()?;
                print!("{}", toml::to_string(&settings)?);
            }
        }

        Ok(())
    }
}

/// Write the template to `file_path`, unless there is a settings file there already
fn create_settings_file(file_path: &Path) -> Result<()> {
    if file_path.is_file() {
        return Ok(());
    }

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Could not create {}", parent.display()))?;
    }
    fs::write(file_path, Settings::template()?)
        .with_context(|| format!("Could not write {}", file_path.display()))
}

fn edit_settings_file(file_path: &Path) -> Result<()> {
    create_settings_file(file_path)?;
    println!("Editing {}", file_path.display());
    edit::edit_file(file_path)
        .with_context(|| format!("Could not open {} in an editor", file_path.display()))
}
