//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::MoveOutcome;
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{MoveRequest, SortEntry};
use crate::infrastructure::di::ServiceContainer;
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()
            .map_err(|e| crate::infrastructure::InfraError::io("resolve current directory", e))?,
    };
    debug!("project_dir: {}", project_dir.display());

    match &cli.command {
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Some(Commands::Config { command }) => {
            let settings = Settings::load(Some(&project_dir))?;
            _config(command, &settings, &project_dir)
        }
        Some(command) => {
            let container = ServiceContainer::new(Settings::load(Some(&project_dir))?);
            dispatch(&container, command)
        }
        None => Ok(()),
    }
}

fn dispatch(container: &ServiceContainer, command: &Commands) -> CliResult<()> {
    match command {
        Commands::Show { file } => _show(container, file.as_deref()),
        Commands::Check { file } => _check(container, file.as_deref()),
        Commands::Move {
            file,
            drag,
            drop,
            position,
            gap,
            dry_run,
        } => {
            let request = MoveRequest::new(drag.as_str(), drop.as_str(), *position, *gap);
            _move(container, file.as_deref(), &request, *dry_run)
        }
        Commands::Apply {
            file,
            script,
            dry_run,
        } => _apply(container, file.as_deref(), script, *dry_run),
        Commands::Order { file } => _order(container, file.as_deref()),
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

/// Explicit FILE argument, else the configured `tree_file`.
fn resolve_file(container: &ServiceContainer, file: Option<&Path>) -> CliResult<PathBuf> {
    file.map(Path::to_path_buf)
        .or_else(|| container.settings.tree_file.clone())
        .ok_or_else(|| {
            CliError::Usage("no tree file given and no tree_file configured".to_string())
        })
}

#[instrument(skip(container))]
fn _show(container: &ServiceContainer, file: Option<&Path>) -> CliResult<()> {
    let path = resolve_file(container, file)?;
    let tree = container.categories.load(&path)?;
    output::info(&tree.to_tree_string());
    Ok(())
}

#[instrument(skip(container))]
fn _check(container: &ServiceContainer, file: Option<&Path>) -> CliResult<()> {
    let path = resolve_file(container, file)?;
    let tree = container.categories.load(&path)?;
    output::header(&path.display());
    output::detail(&format!("roots:  {}", tree.roots().len()));
    output::detail(&format!("nodes:  {}", tree.len()));
    output::detail(&format!("depth:  {}", tree.depth()));
    output::detail(&format!("leaves: {}", tree.leaf_keys().len()));
    output::success("keys are unique");
    Ok(())
}

#[instrument(skip(container))]
fn _move(
    container: &ServiceContainer,
    file: Option<&Path>,
    request: &MoveRequest,
    dry_run: bool,
) -> CliResult<()> {
    let path = resolve_file(container, file)?;
    let persist = container.settings.auto_save && !dry_run;
    let outcome = container.categories.move_node(&path, request, persist)?;
    output::action(
        "Moved",
        &format!(
            "{} {} {}",
            request.drag_key,
            request.placement(),
            request.drop_key
        ),
    );
    report(&path, &outcome, persist);
    Ok(())
}

#[instrument(skip(container))]
fn _apply(
    container: &ServiceContainer,
    file: Option<&Path>,
    script: &Path,
    dry_run: bool,
) -> CliResult<()> {
    let path = resolve_file(container, file)?;
    let persist = container.settings.auto_save && !dry_run;
    let outcome = container.categories.apply_script(&path, script, persist)?;
    output::action("Applied", &script.display());
    report(&path, &outcome, persist);
    Ok(())
}

fn report(path: &Path, outcome: &MoveOutcome, persist: bool) {
    for entry in &outcome.changed {
        output::diff_add(&describe(entry));
    }
    output::info(&outcome.tree.to_tree_string());
    if outcome.saved {
        output::success(&format!("saved {}", path.display()));
    } else if outcome.changed.is_empty() {
        output::detail("tree unchanged");
    } else if !persist {
        output::warning("not saved (dry run or auto_save = false)");
    }
}

fn describe(entry: &SortEntry) -> String {
    match &entry.parent_key {
        Some(parent) => format!("{} -> {}[{}]", entry.key, parent, entry.sort),
        None => format!("{} -> root[{}]", entry.key, entry.sort),
    }
}

#[instrument(skip(container))]
fn _order(container: &ServiceContainer, file: Option<&Path>) -> CliResult<()> {
    let path = resolve_file(container, file)?;
    let entries = container.categories.sort_order(&path)?;
    let json = serde_json::to_string_pretty(&entries).map_err(|e| {
        ApplicationError::Serialization {
            path: path.clone(),
            source: e,
        }
    })?;
    output::info(&json);
    Ok(())
}

fn _config(command: &ConfigCommands, settings: &Settings, project_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(p) => output::action("global", &p.display()),
                None => output::warning("no global config directory on this platform"),
            }
            output::action("local", &local_config_path(project_dir).display());
        }
    }
    Ok(())
}
