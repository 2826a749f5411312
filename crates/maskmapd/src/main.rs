mod cli;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use maskmap_mapping::Size;
use maskmapd::commands::{self, CommandError};
use maskmapd::workspace::Workspace;
use maskmapd::{logging, print_error};

use crate::cli::{Cli, Command, SettingsCommand};

fn run(cli: Cli) -> Result<(), CommandError> {
    let workspace = Workspace::new(cli.workspace.as_deref())?;
    match cli.command {
        Command::List => commands::list(&workspace),
        Command::Show { name } => commands::show(&workspace, &name),
        Command::Validate { name } => commands::validate(&workspace, &name).map(drop),
        Command::New {
            name,
            width,
            height,
            force,
        } => {
            let size = width.zip(height).map(Size::from);
            commands::new_profile(&workspace, &name, size, force)
        }
        Command::Activate { name } => commands::activate(&workspace, &name),
        Command::Settings { command } => match command {
            SettingsCommand::Show => commands::settings_show(&workspace),
            SettingsCommand::Set { key, value } => {
                commands::settings_set(&workspace, &key, &value)
            }
        },
        Command::Replay { name, script, save } => {
            commands::replay(&workspace, &name, &script, save)
        }
        Command::Watch => commands::watch(&workspace),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if logging::setup(cli.verbose, cli.no_color).is_err() {
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error!("{e}");
            ExitCode::FAILURE
        }
    }
}
