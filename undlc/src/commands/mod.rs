mod create;
mod decode;

pub use create::Create;
pub use decode::Decode;

use anyhow::Result;
use clap::{ArgAction, ColorChoice, Parser, Subcommand};
use dlc::{HttpKeyService, service};
use log::LevelFilter;
use std::time::Duration;

/// Decrypt DLC containers into link lists and create new ones.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// When to output colored text.
    #[arg(long, global = true, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Only print errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print pipeline details, use twice for trace output.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Url prefix for trading a container key token for the real key.
    #[arg(long, global = true, help_heading = "Key Service Options", default_value = service::GET_KEY_URL)]
    pub get_url: String,

    /// Url prefix for registering the key of a new container.
    #[arg(long, global = true, help_heading = "Key Service Options", default_value = service::SET_KEY_URL)]
    pub set_url: String,

    /// Maximum number of seconds to wait for the key service.
    #[arg(long, global = true, help_heading = "Key Service Options", default_value_t = 30)]
    pub timeout: u64,

    /// Update and set user agent header for key service requests.
    #[arg(long, global = true, help_heading = "Key Service Options")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    Create(Create),
    Decode(Decode),
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }

        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    pub fn service(&self) -> Result<HttpKeyService> {
        let mut builder = HttpKeyService::builder()
            .get_url(&self.get_url)
            .set_url(&self.set_url)
            .timeout(Duration::from_secs(self.timeout));

        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level() {
        let args = Args::parse_from(["undlc", "decode", "a.dlc"]);
        assert_eq!(args.log_level(), LevelFilter::Info);

        let args = Args::parse_from(["undlc", "-vv", "decode", "a.dlc"]);
        assert_eq!(args.log_level(), LevelFilter::Trace);

        let args = Args::parse_from(["undlc", "decode", "--quiet", "a.dlc"]);
        assert_eq!(args.log_level(), LevelFilter::Error);
    }

    #[test]
    fn test_service_defaults() {
        let args = Args::parse_from(["undlc", "decode", "a.dlc"]);
        assert_eq!(args.get_url, service::GET_KEY_URL);
        assert_eq!(args.set_url, service::SET_KEY_URL);
        assert_eq!(args.timeout, 30);
        assert!(args.service().is_ok());
    }
}
