//! Command-line interface definition.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use zkauth::workflow::VerifyField;
use zkauth::ClientConfig;

/// Register and verify file authorship against the ZK file authentication
/// service.
#[derive(Parser, Debug)]
#[command(name = "zkauth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the service's file API.
    #[arg(long, env = "ZKAUTH_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "ZKAUTH_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Log level.
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Path to configuration file.
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands, one per screen.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register a file under an author address.
    Upload {
        /// File to upload (at most 10 MiB).
        path: PathBuf,

        /// Author address: 0x followed by 64 hex characters.
        #[arg(long)]
        author: String,
    },

    /// Look up who registered a Poseidon hash.
    Verify {
        /// Poseidon hash, 0x-prefixed.
        hash: String,

        /// Copy a field of the result to the clipboard.
        #[arg(long, value_enum)]
        copy: Option<CliCopyField>,
    },

    /// List registered files.
    List {
        /// Only files registered by this author.
        #[arg(long)]
        author: Option<String>,

        /// Show hashes and addresses in full.
        #[arg(long)]
        expand: bool,
    },

    /// Query service health.
    Health,
}

/// Copyable verify field CLI enum.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliCopyField {
    /// Poseidon hash.
    Hash,
    /// Author address.
    Address,
    /// Starknet transaction hash.
    Tx,
}

impl Cli {
    /// Convert CLI arguments into a `ClientConfig`.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is specified but cannot be loaded.
    pub fn to_config(&self) -> color_eyre::Result<ClientConfig> {
        let mut config = if let Some(ref path) = self.config {
            ClientConfig::from_file(path)?
        } else {
            match ClientConfig::default_path() {
                Some(path) if path.exists() => ClientConfig::from_file(&path)?,
                _ => ClientConfig::default(),
            }
        };

        if let Some(ref endpoint) = self.endpoint {
            config.endpoint.clone_from(endpoint);
        }
        if let Some(timeout) = self.timeout_secs {
            config.request_timeout_secs = timeout;
        }
        config.log_level.clone_from(&self.log_level);

        Ok(config)
    }
}

impl From<CliCopyField> for VerifyField {
    fn from(field: CliCopyField) -> Self {
        match field {
            CliCopyField::Hash => Self::Hash,
            CliCopyField::Address => Self::Address,
            CliCopyField::Tx => Self::TxHash,
        }
    }
}
