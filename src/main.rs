use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use diplomacy_ac::checkpoint::CheckpointManager;
use diplomacy_ac::config::AppConfig;
use diplomacy_ac::game::ALL_POWERS;

/// Configuration and checkpoint tooling for the Diplomacy actor-critic learner.
#[derive(Parser)]
#[command(name = "diplomacy-ac", about = "Diplomacy actor-critic tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the default configuration as TOML
    DefaultConfig {
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Load and validate a configuration file
    CheckConfig {
        #[arg(long)]
        config: PathBuf,
    },
    /// List checkpoints in the configured checkpoint directory
    Checkpoints {
        /// Path to TOML configuration file
        #[arg(long, default_value = "config.toml")]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("diplomacy_ac=info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("installing tracing subscriber")?;

    let cli = Cli::parse();
    match cli.command {
        Command::DefaultConfig { output } => {
            let toml = AppConfig::default_toml()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, toml)
                        .with_context(|| format!("writing {}", path.display()))?;
                    tracing::info!(path = %path.display(), "default config written");
                }
                None => print!("{toml}"),
            }
        }
        Command::CheckConfig { config } => {
            let app_config = AppConfig::load(&config)
                .with_context(|| format!("loading config from {}", config.display()))?;
            println!(
                "{}: ok (embed {}, {} transformer layers, lr {}, gamma {}, {} episodes)",
                config.display(),
                app_config.network.embed_size,
                app_config.network.transformer_layers,
                app_config.actor_critic.learning_rate,
                app_config.actor_critic.gamma,
                app_config.training.num_episodes,
            );
        }
        Command::Checkpoints { config } => {
            let app_config = AppConfig::load_or_default(&config)
                .with_context(|| format!("loading config from {}", config.display()))?;
            let manager = CheckpointManager::open(app_config.checkpoint.clone())
                .context("opening checkpoint directory")?;
            let checkpoints = manager
                .list_checkpoints()
                .context("listing checkpoints")?;
            if checkpoints.is_empty() {
                println!("no checkpoints in {}", manager.checkpoint_dir().display());
            }
            for (path, meta) in checkpoints {
                let wins: Vec<String> = ALL_POWERS
                    .iter()
                    .map(|p| format!("{}={:.2}", p.name(), meta.metrics.win_rates[p.index()]))
                    .collect();
                println!(
                    "{:>8}  updates {:>6}  loss {:>10.4}  t={}  {}  [{}]",
                    meta.episode,
                    meta.metrics.update_count,
                    meta.metrics.current_loss,
                    meta.timestamp,
                    path.display(),
                    wins.join(" "),
                );
            }
        }
    }
    Ok(())
}
