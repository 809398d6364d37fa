use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use mcmods::config::defaults;
use mcmods::utils::logging::init_logging;
use mcmods::{
    check_enums, BatchOrchestrator, ConsoleReporter, LabrinthSession, LoaderKind, ModsConfig,
    Overrides,
};

#[derive(Parser, Debug)]
#[command(version, about = "Resolve and download Minecraft mods from Modrinth")]
struct Cli {
    /// Config file to load. Defaults to ./mcmods.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Game version for projects that do not set their own.
    #[arg(long, value_parser = parse_game_version)]
    game_version: Option<String>,

    /// Loader for projects that do not set their own.
    #[arg(long)]
    loader: Option<LoaderKind>,

    /// Catalog base URL.
    #[arg(long)]
    api_url: Option<String>,

    /// Download the resolved files into this directory.
    #[arg(long, short = 'd')]
    download: Option<PathBuf>,

    #[arg(long, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare the local loader list with the catalog's.
    CheckEnums,
}

fn parse_game_version(arg: &str) -> std::result::Result<String, String> {
    let parts: Vec<&str> = arg.split('.').collect();
    let valid = (2..=3).contains(&parts.len())
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
    if valid {
        Ok(arg.to_string())
    } else {
        Err(format!("Not a game version: {arg:?}"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    tracing::debug!("{:?}", cli);

    let overrides = Overrides {
        game_version: cli.game_version.clone(),
        loader: cli.loader,
        api_url: cli.api_url.clone(),
    };

    if let Some(Command::CheckEnums) = cli.command {
        let api_url = overrides.api_url.clone().unwrap_or_else(defaults::api_url);
        let session = LabrinthSession::connect(&api_url)
            .await
            .with_context(|| format!("Could not open a session with {api_url}"))?;
        check_enums(&session).await.context("Enumeration check failed")?;
        println!("Loader enumeration is up to date.");
        return Ok(());
    }

    let config_path = cli.config.clone().unwrap_or_else(defaults::config_path);
    let config = ModsConfig::load(&config_path, &overrides)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    let required = config.requests().context("Invalid [projects] entry")?;
    let optional = config
        .optional_requests()
        .context("Invalid [optional-projects] entry")?;

    let session = LabrinthSession::connect(&config.defaults.api_url)
        .await
        .with_context(|| format!("Could not open a session with {}", config.defaults.api_url))?;
    println!("Labrinth session initialized.");

    let all: Vec<_> = required.iter().chain(&optional).cloned().collect();
    let mut reporter = ConsoleReporter::new(&all);
    let orchestrator = BatchOrchestrator::new(&session, config.batch_options());
    let report = orchestrator
        .run(&required, &optional, cli.download.as_deref(), &mut reporter)
        .await
        .context("Failed to resolve required projects")?;

    tracing::info!(
        "Resolved {} required and {} optional projects ({} skipped)",
        report.required.len(),
        report.optional.len(),
        report.skipped.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_version_argument_shape() {
        assert!(parse_game_version("1.21.5").is_ok());
        assert!(parse_game_version("1.21").is_ok());
        assert!(parse_game_version("1.21.x").is_err());
        assert!(parse_game_version("1").is_err());
        assert!(parse_game_version("1..2").is_err());
    }

    #[test]
    fn cli_parses_loader_and_subcommand() {
        let cli = Cli::parse_from(["mcmods", "--loader", "Fabric", "check-enums"]);
        assert_eq!(cli.loader, Some(LoaderKind::Fabric));
        assert!(matches!(cli.command, Some(Command::CheckEnums)));
    }
}
