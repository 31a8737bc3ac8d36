mod config;
mod config_cmd;
mod records_cmd;
mod run_cmd;
mod terminal_output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hushwatch_core::GroupId;
use hushwatch_engine::{GroupSettingsStore, RecordEngine};
use hushwatch_logging::{init_logger, LogOptions};
use tracing::debug;

use config::Runtime;

#[derive(Parser)]
#[command(name = "hushwatch")]
#[command(about = "Hushwatch: tracks the longest silences in Telegram groups")]
#[command(version)]
struct Cli {
    /// Config file (default: $HUSHWATCH_CONFIG_DIR/config.yaml or ~/.hushwatch/config.yaml)
    #[arg(long, global = true, env = "HUSHWATCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct GroupArg {
    /// Telegram chat id of the group (usually negative)
    #[arg(short, long, allow_negative_numbers = true)]
    group: GroupId,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Telegram bot
    Run,
    /// Show a group's current record
    Record(GroupArg),
    /// Show a group's leaderboards
    Leaderboard {
        #[command(flatten)]
        group: GroupArg,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show a group's record history, newest first
    History {
        #[command(flatten)]
        group: GroupArg,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Set a group's record directly
    Seed {
        #[command(flatten)]
        group: GroupArg,
        /// Record length in seconds (default: tracking.seedSeconds)
        seconds: Option<String>,
    },
    /// Erase everything stored for a group
    Reset {
        #[command(flatten)]
        group: GroupArg,
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Flip a group's record announcement setting
    ToggleAnnouncements(GroupArg),
    /// Manage the config file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a starter config file
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config with secrets masked
    Show,
}

#[tokio::main]
async fn main() {
    if let Err(e) = real_main().await {
        terminal_output::note_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn real_main() -> Result<()> {
    // A missing .env is the normal case.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| hushwatch_config::config_file_path(&hushwatch_config::config_dir()));

    if let Commands::Config(ConfigCommands::Init { force }) = cli.command {
        return config_cmd::init(&config_path, force).await;
    }

    let config = hushwatch_config::load_and_prepare(&config_path).await?;
    let base = config_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let runtime = Runtime::from_config(&config, &base);

    // Offline commands print their own output; keep the log to warnings there.
    let log_options = match cli.command {
        Commands::Run => runtime.logging.clone(),
        _ => LogOptions { level: "warn".to_string(), ..runtime.logging.clone() },
    };
    init_logger(&log_options);
    if let Err(e) = dotenv {
        debug!("No .env loaded: {e}");
    }

    match cli.command {
        Commands::Run => run_cmd::run(runtime.clone()).await,
        Commands::Config(ConfigCommands::Show) => config_cmd::show(&config, &config_path),
        Commands::Config(ConfigCommands::Init { .. }) => Ok(()),
        Commands::Record(GroupArg { group }) => {
            let (engine, _) = offline(&runtime).await?;
            records_cmd::record(&engine, group).await
        }
        Commands::Leaderboard { group: GroupArg { group }, limit } => {
            let (engine, _) = offline(&runtime).await?;
            let limit = limit.unwrap_or(runtime.display.leaderboard_size);
            records_cmd::leaderboard(&engine, group, limit).await
        }
        Commands::History { group: GroupArg { group }, limit } => {
            let (engine, _) = offline(&runtime).await?;
            let limit = limit.unwrap_or(runtime.display.history_size);
            records_cmd::history(&engine, group, limit).await
        }
        Commands::Seed { group: GroupArg { group }, seconds } => {
            let (engine, _) = offline(&runtime).await?;
            records_cmd::seed(&engine, group, seconds.as_deref(), &runtime.display).await
        }
        Commands::Reset { group: GroupArg { group }, yes } => {
            let (engine, _) = offline(&runtime).await?;
            records_cmd::reset(&engine, group, yes).await
        }
        Commands::ToggleAnnouncements(GroupArg { group }) => {
            let (_, settings) = offline(&runtime).await?;
            records_cmd::toggle_announcements(&settings, group).await
        }
    }
}

/// Engine and settings over the configured store, for one-shot commands.
async fn offline(runtime: &Runtime) -> Result<(Arc<RecordEngine>, Arc<GroupSettingsStore>)> {
    let gateway = hushwatch_storage::open_gateway(&runtime.gateway).await?;
    Ok(hushwatch_engine::build(gateway))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_negative_group_ids() {
        let cli = Cli::try_parse_from(["hushwatch", "seed", "--group", "-1001234", "900"]).unwrap();
        match cli.command {
            Commands::Seed { group, seconds } => {
                assert_eq!(group.group, -1001234);
                assert_eq!(seconds.as_deref(), Some("900"));
            }
            _ => panic!("expected seed"),
        }
    }

    #[test]
    fn config_subcommands_parse() {
        let cli = Cli::try_parse_from(["hushwatch", "config", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(ConfigCommands::Init { force: true })));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
