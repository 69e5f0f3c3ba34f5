//! Command line definition

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Control Roku devices from the terminal
#[derive(Parser, Debug)]
#[command(name = "roku")]
#[command(about = "Command line remote for Roku devices")]
#[command(version)]
pub struct Cli {
    /// Config file (default: $HOME/.roku-remote.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Device address, overriding the configured one
    #[arg(long, global = true, env = "ROKU_HOST")]
    pub host: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Print query results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Find, select and control devices
    #[command(subcommand)]
    Device(DeviceCommand),

    /// Manage installed apps
    #[command(subcommand)]
    Apps(AppsCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum DeviceCommand {
    /// Scan the network and pick a default device
    Find {
        /// Seconds to listen for responses
        #[arg(short, long, default_value_t = 5)]
        wait: u64,
    },

    /// Pick the default device among previously found ones
    Switch,

    /// Show hardware and network details
    Describe,

    /// Show the UPnP device description
    Info,

    /// Show what the media player is doing
    Live,

    /// Send one remote action, or pick actions interactively
    Send {
        /// Action name, e.g. home or volumeup
        action: Option<String>,
    },

    /// Use the keyboard as a remote
    Control,

    /// Type text into the focused field
    Type { text: String },

    /// Open the device search for a keyword
    Search { keyword: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum AppsCommand {
    /// List installed apps
    List,

    /// Show the app in the foreground
    Active,

    /// Launch an installed app by id or name
    Launch {
        /// App id or name
        app: String,
    },

    /// Install an app by id or name
    Add {
        /// App id or name
        app: String,
    },
}

impl Cli {
    /// Whether the command takes over the terminal.
    pub fn is_interactive(&self) -> bool {
        matches!(
            self.command,
            Command::Device(
                DeviceCommand::Find { .. }
                    | DeviceCommand::Switch
                    | DeviceCommand::Control
                    | DeviceCommand::Send { action: None }
            )
        )
    }

    /// Validate arguments clap cannot check on its own.
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.log_level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" | "off" => {}
            _ => {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}'. Valid levels: error, warn, info, debug, trace",
                    self.log_level
                ));
            }
        }

        if let Command::Device(DeviceCommand::Find { wait: 0 }) = self.command {
            return Err(anyhow::anyhow!("Discovery time must be at least one second"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_find_default_wait() {
        let cli = parse(&["roku", "device", "find"]);
        assert_eq!(cli.command, Command::Device(DeviceCommand::Find { wait: 5 }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["roku", "apps", "list", "--host", "10.0.0.5", "--json"]);
        assert_eq!(cli.host.as_deref(), Some("10.0.0.5"));
        assert!(cli.json);
        assert_eq!(cli.command, Command::Apps(AppsCommand::List));
    }

    #[test]
    fn test_send_without_action() {
        let cli = parse(&["roku", "device", "send"]);
        assert_eq!(cli.command, Command::Device(DeviceCommand::Send { action: None }));
    }

    #[rstest]
    #[case(&["roku", "device", "find", "-w", "2"], true)]
    #[case(&["roku", "device", "switch"], true)]
    #[case(&["roku", "device", "control"], true)]
    #[case(&["roku", "device", "send"], true)]
    #[case(&["roku", "device", "send", "home"], false)]
    #[case(&["roku", "device", "describe"], false)]
    #[case(&["roku", "apps", "launch", "Netflix"], false)]
    fn test_is_interactive(#[case] args: &[&str], #[case] expected: bool) {
        assert_eq!(parse(args).is_interactive(), expected);
    }

    #[test]
    fn test_validate_rejects_bad_log_level() {
        let cli = parse(&["roku", "--log-level", "loud", "apps", "list"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_wait() {
        let cli = parse(&["roku", "device", "find", "-w", "0"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_type_requires_text() {
        assert!(Cli::try_parse_from(["roku", "device", "type"]).is_err());
    }
}
