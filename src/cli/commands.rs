//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use itertools::Itertools;
use tracing::{debug, info, instrument};

use crate::application::services::{collect_entities, TreeExporter};
use crate::application::{ApplicationError, IoResultExt};
use crate::cli::args::{Cli, Commands, ConfigCommands, EntityArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{expand_path, global_config_path, local_config_path, Settings};
use crate::domain::{parse_newick, BuildReport, RenderMode, TaxId};
use crate::infrastructure::di::ServiceContainer;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    if let Commands::Completion { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "taxotree", &mut io::stdout());
        return Ok(());
    }

    let settings = load_settings(cli)?;
    let mut container = ServiceContainer::new(settings);
    run(&mut container, &cli.command)
}

/// Settings from config files and environment, then CLI overrides.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let cwd = std::env::current_dir().map_err(|e| {
        CliError::from(ApplicationError::OperationFailed {
            context: "determine working directory".into(),
            source: Box::new(e),
        })
    })?;
    let mut settings = Settings::load(Some(&cwd))?;
    if let Some(dir) = &cli.taxdump {
        settings.taxdump_dir = expand_path(dir);
    }
    if let Some(root) = cli.root {
        settings.root_id = TaxId(root);
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

/// Run one command against an assembled container.
pub fn run(container: &mut ServiceContainer, command: &Commands) -> CliResult<()> {
    match command {
        Commands::Tree { entities, compact } => {
            let mode = if *compact {
                RenderMode::Compact
            } else {
                RenderMode::Full
            };
            tree_cmd(container, entities, mode)
        }
        Commands::Export {
            entities,
            output,
            attributes,
            ascii,
        } => export_cmd(
            container,
            entities,
            output.as_deref(),
            attributes.as_deref(),
            *ascii,
        ),
        Commands::Lineage { name } => lineage_cmd(container, name),
        Commands::Show { file } => show_cmd(container, file),
        Commands::Config { command } => config_cmd(container, command),
        Commands::Completion { .. } => Ok(()),
    }
}

fn build(container: &mut ServiceContainer, args: &EntityArgs) -> CliResult<BuildReport> {
    let entities = collect_entities(container.fs.as_ref(), &args.names, args.file.as_deref())?;
    let builder = container.tree_builder()?;
    let report = builder.build(&entities);
    info!(
        "merged {} of {} entities into {} nodes",
        report.inserted.len(),
        entities.len(),
        report.tree.len()
    );
    Ok(report)
}

fn print_summary(report: &BuildReport) {
    for conflict in &report.conflicts {
        output::warning(conflict);
    }
    if report.is_complete() {
        return;
    }
    output::header(&format!("Skipped {} entities:", report.skipped.len()));
    for skipped in &report.skipped {
        output::failure(&format!("{}: {}", skipped.name, skipped.reason));
    }
}

#[instrument(skip(container))]
fn tree_cmd(container: &mut ServiceContainer, args: &EntityArgs, mode: RenderMode) -> CliResult<()> {
    let report = build(container, args)?;
    let indent = container.settings.indent;
    for line in mode.render(&report.tree) {
        output::tree_line(&line, indent);
    }
    print_summary(&report);
    Ok(())
}

#[instrument(skip(container))]
fn export_cmd(
    container: &mut ServiceContainer,
    args: &EntityArgs,
    out: Option<&Path>,
    attributes: Option<&[String]>,
    ascii: bool,
) -> CliResult<()> {
    let allowlist: Vec<String> = attributes
        .map(<[String]>::to_vec)
        .unwrap_or_else(|| container.settings.export.attributes.clone());
    TreeExporter::validate_allowlist(&allowlist)?;

    let report = build(container, args)?;
    let exporter = container.tree_exporter();
    let labeled = exporter.export(&report);

    output::info(&labeled.to_newick());
    if ascii {
        output::info(&labeled.to_ascii());
    }

    let target = out
        .map(Path::to_path_buf)
        .or_else(|| container.settings.export.output.clone());
    if let Some(path) = target {
        exporter.persist(&labeled, &path, &allowlist)?;
        output::success(&format!("Wrote {}", path.display()));
    }

    print_summary(&report);
    Ok(())
}

#[instrument(skip(container))]
fn lineage_cmd(container: &mut ServiceContainer, name: &str) -> CliResult<()> {
    let source = container.lineage_source()?;
    let resolution = source
        .resolve(name)
        .ok_or_else(|| CliError::InvalidArgs(format!("unknown entity: {}", name)))?;

    let path = resolution
        .lineage
        .iter()
        .map(|id| match resolution.labels.get(id) {
            Some(label) => format!("{} ({})", label, id),
            None => format!("? ({})", id),
        })
        .join(" > ");
    output::info(&path);
    Ok(())
}

#[instrument(skip(container))]
fn show_cmd(container: &mut ServiceContainer, file: &Path) -> CliResult<()> {
    let text = container
        .fs
        .read_to_string(file)
        .with_path_context("read newick", file)?;
    let tree = parse_newick(&text).map_err(ApplicationError::from)?;
    output::info(&tree.to_ascii());
    Ok(())
}

fn config_cmd(container: &mut ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let text = toml::to_string_pretty(container.settings.as_ref()).map_err(|e| {
                ApplicationError::Config {
                    message: format!("serialize settings: {}", e),
                }
            })?;
            output::info(&text);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::info(&format!("global: {}", describe(container, &path))),
                None => output::info(&"global: <no config directory>"),
            }
            if let Ok(cwd) = std::env::current_dir() {
                let local = local_config_path(&cwd);
                output::info(&format!("local:  {}", describe(container, &local)));
            }
        }
        ConfigCommands::Init { local, force } => {
            let path = if *local {
                let cwd = std::env::current_dir()
                    .map_err(|e| CliError::Usage(format!("no working directory: {}", e)))?;
                local_config_path(&cwd)
            } else {
                global_config_path()
                    .ok_or_else(|| CliError::Usage("no config directory on this system".into()))?
            };
            if container.fs.exists(&path) && !*force {
                return Err(CliError::Usage(format!(
                    "{} exists, use --force to overwrite",
                    path.display()
                )));
            }
            let template = Settings::template()?;
            container
                .fs
                .write_atomic(&path, &template)
                .with_path_context("write config", &path)?;
            output::success(&format!("Created {}", path.display()));
        }
    }
    Ok(())
}

fn describe(container: &ServiceContainer, path: &Path) -> String {
    if container.fs.exists(path) {
        path.display().to_string()
    } else {
        format!("{} (missing)", path.display())
    }
}
