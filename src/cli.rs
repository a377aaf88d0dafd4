//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for the video generation client.

use clap::{Parser, Subcommand};

/// Vidgen Client - submit video generation tasks over WebSocket
///
/// Connects to the video generation service, sends one task and prints the
/// service's reply as JSON.
#[derive(Parser, Debug)]
#[command(name = "vidgen-client")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask the service to generate a video from a prompt
    CreateVideo {
        /// Description of the video
        #[arg(short, long)]
        prompt: String,

        /// Keep reading replies until the video link or an error arrives
        #[arg(short, long)]
        follow: bool,

        /// Path to configuration file
        #[arg(short, long, env = "VIDGEN_CONFIG")]
        config: Option<String>,
    },

    /// Send an arbitrary action and print the next reply
    Send {
        /// Action name, e.g. new-create-video
        #[arg(short, long)]
        action: String,

        /// Task payload as a JSON document
        #[arg(short, long, default_value = "{}")]
        task: String,

        /// Path to configuration file
        #[arg(short, long, env = "VIDGEN_CONFIG")]
        config: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the effective configuration (API key masked)
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_create_video_command() {
        let cli = Cli::parse_from(["vidgen-client", "create-video", "--prompt", "cats"]);
        match cli.command {
            Commands::CreateVideo { prompt, follow, config } => {
                assert_eq!(prompt, "cats");
                assert!(!follow);
                assert!(config.is_none());
            }
            _ => panic!("Expected CreateVideo command"),
        }
    }

    #[test]
    fn test_create_video_follow_with_config() {
        let cli = Cli::parse_from([
            "vidgen-client",
            "create-video",
            "-p",
            "dogs",
            "--follow",
            "--config",
            "/path/to/client.toml",
        ]);
        match cli.command {
            Commands::CreateVideo { follow, config, .. } => {
                assert!(follow);
                assert_eq!(config, Some("/path/to/client.toml".to_string()));
            }
            _ => panic!("Expected CreateVideo command"),
        }
    }

    #[test]
    fn test_send_defaults_to_empty_task() {
        let cli = Cli::parse_from(["vidgen-client", "send", "--action", "status"]);
        match cli.command {
            Commands::Send { action, task, .. } => {
                assert_eq!(action, "status");
                assert_eq!(task, "{}");
            }
            _ => panic!("Expected Send command"),
        }
    }

    #[test]
    fn test_verbose_flags() {
        let cli = Cli::parse_from(["vidgen-client", "-vv", "config", "show"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_quiet_flag() {
        let cli = Cli::parse_from(["vidgen-client", "--quiet", "config", "validate"]);
        assert!(cli.quiet);
    }

    #[test]
    fn test_config_init() {
        let cli = Cli::parse_from(["vidgen-client", "config", "init", "--force"]);
        match cli.command {
            Commands::Config { subcommand: ConfigSubcommand::Init { path, force } } => {
                assert!(path.is_none());
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }
}
