//! Vidgen Client - submit video generation tasks over WebSocket
//!
//! Entry point for the `vidgen-client` binary.

mod cli;

use clap::Parser;
use serde_json::Value;
use tracing::{debug, info};

use vidgen_client::config::{self, ClientConfig, ClientSettings};
use vidgen_client::connection::VideoClient;
use vidgen_client::error::{Error, Result};
use vidgen_client::logging::{self, LogGuards};
use vidgen_client::protocol::{playlist_url, ReplyEvent, VideoTask};

use crate::cli::{Cli, Commands, ConfigSubcommand};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            handle_config_command(subcommand)
        }
        Commands::CreateVideo { prompt, follow, config } => {
            // Reject blank prompts before touching the network
            let task = VideoTask::new(prompt)?;
            let (settings, _log_guards) = prepare(config.as_deref(), cli.verbose, cli.quiet)?;
            block_on(create_video(settings, task, follow))
        }
        Commands::Send { action, task, config } => {
            let task: Value = serde_json::from_str(&task)
                .map_err(|e| Error::InvalidTask(format!("--task is not valid JSON: {}", e)))?;
            let (settings, _log_guards) = prepare(config.as_deref(), cli.verbose, cli.quiet)?;
            block_on(send_task(settings, action, task))
        }
    }
}

/// Load configuration, start logging and build the client settings
fn prepare(config_path: Option<&str>, verbose: u8, quiet: bool) -> Result<(ClientSettings, LogGuards)> {
    let config = ClientConfig::load(config_path)?;
    let guards = logging::init_logging(&config.logging, verbose, quiet)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        url = %config.service.url,
        "Starting vidgen-client"
    );

    Ok((config.client_settings()?, guards))
}

/// Run a future on a single-threaded runtime; the client never runs work concurrently
fn block_on<F>(future: F) -> Result<()>
where
    F: std::future::Future<Output = Result<()>>,
{
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create runtime: {}", e)))?
        .block_on(future)
}

/// Submit a video task, print replies, always close the connection
async fn create_video(settings: ClientSettings, task: VideoTask, follow: bool) -> Result<()> {
    let mut client = VideoClient::new(settings);
    client.connect().await?;

    let outcome = follow_video(&mut client, &task, follow).await;
    client.close().await;
    outcome
}

async fn follow_video(client: &mut VideoClient, task: &VideoTask, follow: bool) -> Result<()> {
    client.create_video(task).await?;

    loop {
        let reply = client.receive().await?;
        print_reply(&reply)?;

        if !follow {
            return Ok(());
        }

        match ReplyEvent::classify(&reply) {
            ReplyEvent::VideoReady { link } => {
                if let Some(playlist) = playlist_url(&link) {
                    info!(playlist = %playlist, "Video ready");
                    println!("Playlist: {}", playlist);
                }
                return Ok(());
            }
            ReplyEvent::Failed { message } => return Err(Error::Remote(message)),
            ReplyEvent::Status { message } => info!(status = %message, "Progress"),
            ReplyEvent::Other(_) => debug!("Unrecognised reply, still waiting"),
        }
    }
}

/// Send one arbitrary action and print the next reply
async fn send_task(settings: ClientSettings, action: String, task: Value) -> Result<()> {
    let mut client = VideoClient::new(settings);
    client.connect().await?;

    let outcome = client.request(&action, &task).await;
    client.close().await;

    print_reply(&outcome?)
}

fn print_reply(reply: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(reply).map_err(|source| Error::Serialization { source })?;
    println!("{}", text);
    Ok(())
}

/// Handle config subcommands
fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = ClientConfig::load(config.as_deref())?;
            print!("{}", cfg.to_display_toml()?);
            Ok(())
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration file created: {}", written.display());
            Ok(())
        }
        ConfigSubcommand::Validate { config } => {
            let cfg = ClientConfig::load(config.as_deref())?;
            println!("Configuration is valid");
            if cfg.service.api_key.is_empty() {
                eprintln!("Note: no api_key set; set [service].api_key or VIDGEN_API_KEY before sending tasks");
            }
            Ok(())
        }
    }
}
