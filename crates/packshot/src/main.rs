// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Packshot - batch packaging-mockup generator.
//!
//! This is the binary entry point.

mod app;
mod catalog;
mod composite;
mod doctor;
mod run;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use packshot_config::{ConfigSource, PersistedLayer};
use packshot_core::types::{ItemStatus, Priority};
use packshot_studio::{ItemEdit, ResetFilter};

use crate::app::App;
use crate::catalog::SelectMode;

/// Packshot - batch packaging-mockup generator.
#[derive(Parser, Debug)]
#[command(name = "packshot", version, about, long_about = None)]
struct Cli {
    /// Explicit configuration file, layered over the default locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate every eligible item, pacing requests, until idle or interrupted.
    Run {
        /// Replace the selection with these ids before starting.
        #[arg(long, value_delimiter = ',')]
        select: Vec<String>,
    },
    /// Generate one item now, whatever its status.
    Generate { id: String },
    /// List work items.
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        status: Option<ItemStatus>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Show item counts by status.
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Add a work item at the top of the list.
    Add {
        prompt: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "")]
        logo_prompt: String,
    },
    /// Edit an item's name, prompts, description, category, or priority.
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        prompt: Option<String>,
        #[arg(long)]
        logo_prompt: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Remove a work item.
    Remove { id: String },
    /// Select items for scoped runs and downloads.
    Select {
        ids: Vec<String>,
        /// Flip each listed item instead of selecting it.
        #[arg(long, requires = "ids")]
        toggle: bool,
        /// Clear the selection instead.
        #[arg(long, conflicts_with_all = ["ids", "all"])]
        clear: bool,
        /// Toggle every item (optionally within --category).
        #[arg(long, conflicts_with = "ids")]
        all: bool,
        #[arg(long, requires = "all")]
        category: Option<String>,
    },
    /// Set an item's status by hand.
    Mark { id: String, status: ItemStatus },
    /// Return items to pending, clearing results and errors.
    Reset {
        #[arg(long, default_value = "failed")]
        status: ResetFilter,
    },
    /// Set the logo-integration prompt for every item in a category.
    LogoPrompt { category: String, prompt: String },
    /// Import items from a JSON array.
    Import {
        file: PathBuf,
        /// Replace the current list instead of appending.
        #[arg(long)]
        overwrite: bool,
    },
    /// Export all items as JSON.
    Export { file: PathBuf },
    /// Write images of selected, completed items into a directory.
    Download { dir: PathBuf },
    /// Overlay a logo on an image file using the configured effects.
    Composite {
        #[arg(long)]
        base: PathBuf,
        #[arg(long)]
        logo: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Manage the logo library.
    Logo {
        #[command(subcommand)]
        command: LogoCommand,
    },
    /// Manage categories.
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },
    /// Check storage, provider, and catalog health.
    Doctor,
    /// Delete every item, image, and logo.
    Clear {
        /// Confirm the wipe.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum LogoCommand {
    /// Add a logo file and make it active.
    Add { file: PathBuf },
    /// List library entries.
    List,
    /// Activate a library entry.
    Use { index: usize },
    /// Remove a library entry.
    Remove { index: usize },
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    /// List categories with item counts.
    List,
    /// Add a category; its id is derived from the name.
    Add {
        name: String,
        #[arg(long, default_value = "#7f8c8d")]
        color: String,
    },
    /// Rename or recolor a category.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a category, moving its items to the first remaining one.
    Delete { id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.plain || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let source = ConfigSource::Files(cli.config.clone());
    let config = match source.load(&PersistedLayer::default()) {
        Ok(config) => config,
        Err(errors) => {
            packshot_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.studio.log_level);

    if let Commands::Composite { base, logo, out } = &cli.command {
        return report(composite::run_composite(&config.logo.effects, base, logo, out).await);
    }

    let app = match App::open(config, &source).await {
        Ok(app) => app,
        Err(e) => return report::<()>(Err(e)),
    };
    let code = dispatch(&app, cli.command).await;
    if let Err(e) = app.close().await {
        tracing::warn!(error = %e, "storage shutdown failed");
    }
    code
}

async fn dispatch(app: &App, command: Commands) -> ExitCode {
    match command {
        Commands::Run { select } => match run::run_automation(app, &select).await {
            Ok(reason) => run::exit_code(reason),
            Err(e) => report::<()>(Err(e)),
        },
        Commands::Generate { id } => match run::generate_one(app, &id).await {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::FAILURE,
            Err(e) => report::<()>(Err(e)),
        },
        Commands::List {
            category,
            status,
            json,
        } => report(catalog::list(app, category.as_deref(), status, json).await),
        Commands::Stats { json } => report(catalog::stats(app, json).await),
        Commands::Add {
            prompt,
            name,
            category,
            logo_prompt,
        } => report(catalog::add(app, prompt, name, category, logo_prompt).await),
        Commands::Edit {
            id,
            name,
            prompt,
            logo_prompt,
            description,
            category,
            priority,
        } => {
            let edit = ItemEdit {
                name,
                prompt,
                logo_prompt,
                description,
                category,
                priority,
            };
            report(catalog::edit(app, &id, edit).await)
        }
        Commands::Remove { id } => report(catalog::remove(app, &id).await),
        Commands::Select {
            ids,
            toggle,
            clear,
            all,
            category,
        } => {
            let mode = if clear {
                SelectMode::Clear
            } else if all {
                SelectMode::ToggleAll(category)
            } else if toggle {
                SelectMode::Toggle(ids)
            } else {
                SelectMode::Set(ids)
            };
            report(catalog::select(app, mode).await)
        }
        Commands::Mark { id, status } => report(catalog::mark(app, &id, status).await),
        Commands::Reset { status } => report(catalog::reset(app, status).await),
        Commands::LogoPrompt { category, prompt } => {
            report(catalog::logo_prompt(app, &category, &prompt).await)
        }
        Commands::Import { file, overwrite } => report(catalog::import(app, &file, overwrite).await),
        Commands::Export { file } => report(catalog::export(app, &file).await),
        Commands::Download { dir } => report(catalog::download(app, &dir).await),
        Commands::Logo { command } => report(match command {
            LogoCommand::Add { file } => catalog::logo_add(app, &file).await,
            LogoCommand::List => catalog::logo_list(app).await,
            LogoCommand::Use { index } => catalog::logo_use(app, index).await,
            LogoCommand::Remove { index } => catalog::logo_remove(app, index).await,
        }),
        Commands::Category { command } => report(match command {
            CategoryCommand::List => catalog::category_list(app).await,
            CategoryCommand::Add { name, color } => catalog::category_add(app, &name, &color).await,
            CategoryCommand::Update { id, name, color } => {
                catalog::category_update(app, &id, name.as_deref(), color.as_deref()).await
            }
            CategoryCommand::Delete { id } => catalog::category_delete(app, &id).await,
        }),
        Commands::Doctor => match doctor::run_doctor(app).await {
            Ok(0) => ExitCode::SUCCESS,
            Ok(_) => ExitCode::FAILURE,
            Err(e) => report::<()>(Err(e)),
        },
        Commands::Clear { yes } => report(catalog::clear(app, yes).await),
        Commands::Composite { .. } => ExitCode::SUCCESS,
    }
}

fn report<T>(result: Result<T, packshot_core::PackshotError>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red());
            ExitCode::FAILURE
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("packshot={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_comma_separated_selection() {
        let cli = Cli::try_parse_from(["packshot", "run", "--select", "pizza-001,burger-002"]).unwrap();
        match cli.command {
            Commands::Run { select } => assert_eq!(select, vec!["pizza-001", "burger-002"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn status_arguments_parse_lowercase() {
        let cli = Cli::try_parse_from(["packshot", "reset", "--status", "all"]).unwrap();
        assert!(matches!(cli.command, Commands::Reset { status: ResetFilter::All }));

        let cli = Cli::try_parse_from(["packshot", "mark", "pizza-001", "skipped"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Mark { status: ItemStatus::Skipped, .. }
        ));
        assert!(Cli::try_parse_from(["packshot", "reset", "--status", "bogus"]).is_err());
    }

    #[test]
    fn edit_parses_optional_fields() {
        let cli = Cli::try_parse_from([
            "packshot", "edit", "pizza-001", "--prompt", "Thin crust box", "--priority", "high",
        ])
        .unwrap();
        match cli.command {
            Commands::Edit {
                id,
                prompt,
                priority,
                name,
                ..
            } => {
                assert_eq!(id, "pizza-001");
                assert_eq!(prompt.as_deref(), Some("Thin crust box"));
                assert_eq!(priority, Some(Priority::High));
                assert_eq!(name, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn doctor_takes_no_arguments() {
        let cli = Cli::try_parse_from(["packshot", "doctor"]).unwrap();
        assert!(matches!(cli.command, Commands::Doctor));
    }

    #[test]
    fn select_toggle_needs_ids() {
        assert!(Cli::try_parse_from(["packshot", "select", "--toggle"]).is_err());
        let cli = Cli::try_parse_from(["packshot", "select", "--toggle", "a", "b"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Select { toggle: true, ref ids, .. } if ids.len() == 2
        ));
    }

    #[test]
    fn select_clear_conflicts_with_ids() {
        assert!(Cli::try_parse_from(["packshot", "select", "a", "--clear"]).is_err());
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = packshot_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.studio.log_level, "info");
    }
}
