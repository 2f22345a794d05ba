use std::{net::SocketAddr, path::PathBuf};

use clap::{Parser, ValueEnum};
use server::logger::LogStyle;

#[derive(Debug, Parser)]
#[command(name = "badbrowser", version, about = "Serves an upgrade page to outdated browsers")]
pub struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "BADBROWSER_CONFIG_PATH", default_value = "./badbrowser.toml")]
    pub config: PathBuf,

    /// Address to listen on, overriding `server.listen_address` from the configuration
    #[arg(short, long, env = "BADBROWSER_LISTEN_ADDRESS")]
    pub listen_address: Option<SocketAddr>,

    /// Log filter, for example `info` or `server=debug,browser_rules=trace`
    #[arg(long, env = "BADBROWSER_LOG", default_value = "info")]
    pub log: String,

    /// How log lines are formatted
    #[arg(long, env = "BADBROWSER_LOG_STYLE", value_enum, default_value_t = LogStyleArg::Color)]
    pub log_style: LogStyleArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogStyleArg {
    /// Colored text when stderr is a terminal
    Color,
    /// Plain text
    Text,
    /// One JSON object per line
    Json,
}

impl From<LogStyleArg> for LogStyle {
    fn from(value: LogStyleArg) -> Self {
        match value {
            LogStyleArg::Color => LogStyle::Color,
            LogStyleArg::Text => LogStyle::Text,
            LogStyleArg::Json => LogStyle::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Args, LogStyleArg};

    #[test]
    fn command_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn flags() {
        let args = Args::try_parse_from([
            "badbrowser",
            "--config",
            "/etc/badbrowser.toml",
            "--listen-address",
            "0.0.0.0:8080",
            "--log-style",
            "json",
        ])
        .unwrap();

        assert_eq!(args.config.to_str(), Some("/etc/badbrowser.toml"));
        assert_eq!(args.listen_address, Some("0.0.0.0:8080".parse().unwrap()));
        assert_eq!(args.log_style, LogStyleArg::Json);
    }
}
