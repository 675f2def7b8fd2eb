use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "brief")]
#[command(about = "Context-gathering report agent", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, env = "BRIEF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output: pretty or json
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the SSE chat server
    Serve {
        /// Server port
        #[arg(short, long)]
        port: Option<u16>,

        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Assign a random user id to requests that carry none
        #[arg(long)]
        allow_anonymous: bool,
    },

    /// Chat with the agent in the terminal
    Console {
        /// User ID for the conversation
        #[arg(short, long, default_value = "console_user")]
        user_id: String,

        /// Write the conversation to this file on exit
        #[arg(short, long)]
        transcript: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["brief", "serve", "--port", "9000", "--allow-anonymous"])
            .unwrap();
        match cli.command {
            Commands::Serve { port, host, allow_anonymous } => {
                assert_eq!(port, Some(9000));
                assert!(host.is_none());
                assert!(allow_anonymous);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_console() {
        let cli =
            Cli::try_parse_from(["brief", "--log-format", "json", "console", "-t", "out.txt"])
                .unwrap();
        assert_eq!(cli.log_format.as_deref(), Some("json"));
        match cli.command {
            Commands::Console { user_id, transcript } => {
                assert_eq!(user_id, "console_user");
                assert_eq!(transcript, Some(PathBuf::from("out.txt")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
