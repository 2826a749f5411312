use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Debug, Subcommand, PartialEq)]
pub(crate) enum SettingsCommand {
    /// Print every local setting.
    Show,
    /// Change one local setting.
    Set { key: String, value: String },
}

#[derive(Debug, Subcommand, PartialEq)]
pub(crate) enum Command {
    /// List mapping profiles in the workspace.
    List,
    /// Print the entries of a profile.
    Show { name: String },
    /// Check a profile for problems.
    Validate { name: String },
    /// Create a new profile.
    New {
        name: String,
        /// Original screen width. Creates an empty profile together with --height
        #[arg(long, requires = "height")]
        width: Option<u32>,
        /// Original screen height
        #[arg(long, requires = "width")]
        height: Option<u32>,
        /// Overwrite an existing profile
        #[arg(short, long)]
        force: bool,
    },
    /// Validate a profile and make it the active one.
    Activate { name: String },
    /// Read or change local settings.
    Settings {
        #[clap(subcommand)]
        command: SettingsCommand,
    },
    /// Replay a recorded editing session against a profile.
    Replay {
        name: String,
        script: PathBuf,
        /// Write the edited profile back
        #[arg(long)]
        save: bool,
    },
    /// Report profile changes until interrupted.
    Watch,
}

/// Edit and inspect key-mapping profiles for touch-screen games.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Turn debugging information on
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Workspace directory (defaults to $MASKMAP_HOME or ~/.config/maskmap)
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    /// The command to run
    #[clap(subcommand)]
    pub command: Command,
}
