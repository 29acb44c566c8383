use crate::models::Category;
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::{env, path::PathBuf, time::Duration};

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Centralized client configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_concurrent_uploads: Option<usize>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Browse, upload and manage files on a remote drive")]
pub struct Args {
    /// Remote store address (overrides DRIVE_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Timeout for metadata requests in seconds (overrides DRIVE_TIMEOUT_SECS)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Upper bound on simultaneous uploads (overrides DRIVE_MAX_CONCURRENT_UPLOADS)
    #[arg(long, global = true)]
    pub max_concurrent_uploads: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List stored files
    Ls {
        #[arg(long, default_value = "all")]
        category: Category,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Show storage usage
    Quota,
    /// Upload one or more local files
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Delete a stored file
    Rm {
        name: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Print the download or preview address of a file
    Url { kind: UrlKind, name: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    Download,
    Preview,
}

impl ClientConfig {
    /// Parse environment variables + CLI args into a config and the command to run.
    pub fn from_env_and_args() -> Result<(Self, Command)> {
        let args = Args::parse();
        let command = args.command.clone();
        let cfg = Self::from_sources(&args, |key| env::var(key).ok())?;
        Ok((cfg, command))
    }

    /// Merge CLI values over whatever `lookup` finds in the environment.
    pub fn from_sources(args: &Args, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = match args.base_url.clone().or_else(|| lookup("DRIVE_BASE_URL")) {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => bail!("no remote store configured; set DRIVE_BASE_URL or pass --base-url"),
        };
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            bail!("remote store address `{}` must be an http(s) URL", base_url);
        }

        let timeout_secs = match args.timeout_secs {
            Some(secs) => secs,
            None => parse_env(&lookup, "DRIVE_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        let max_concurrent_uploads = match args.max_concurrent_uploads {
            Some(n) => Some(n),
            None => parse_env(&lookup, "DRIVE_MAX_CONCURRENT_UPLOADS")?,
        }
        .filter(|n| *n > 0);

        Ok(Self {
            base_url,
            timeout_secs,
            max_concurrent_uploads,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_env<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        None => Ok(None),
    }
}
