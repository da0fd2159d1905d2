use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Command line arguments for the S3 push tool
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "s3push",
    about = "Upload new and changed files from a local directory to an S3 prefix"
)]
pub struct Args {
    /// Endpoint of an S3-compatible service (forces path-style addressing)
    #[clap(long, global = true)]
    pub endpoint_url: Option<String>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authenticate with an explicit access key and secret key
    Keys {
        /// Local directory to upload
        directory: PathBuf,

        /// AWS access key id
        access_key: String,

        /// AWS secret access key
        secret_key: String,

        #[clap(flatten)]
        target: Target,
    },
    /// Authenticate with a named profile from the shared AWS config files
    Profile {
        /// Local directory to upload
        directory: PathBuf,

        /// Profile name to resolve credentials from
        profile: String,

        #[clap(flatten)]
        target: Target,
    },
}

/// Positional arguments shared by both credential variants
#[derive(clap::Args, Debug, Clone)]
pub struct Target {
    /// AWS region, e.g. eu-west-1
    pub region: String,

    /// Destination bucket
    pub bucket: String,

    /// Key prefix every uploaded object is placed under
    pub prefix: String,

    /// Maximum number of uploads running at the same time
    pub max_concurrent_uploads: NonZeroUsize,
}

#[derive(Clone, PartialEq)]
pub enum CredentialSource {
    Static {
        access_key: String,
        secret_key: String,
    },
    Profile(String),
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Static { access_key, .. } => f
                .debug_struct("Static")
                .field("access_key", access_key)
                .field("secret_key", &"<redacted>")
                .finish(),
            CredentialSource::Profile(name) => f.debug_tuple("Profile").field(name).finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub local_root: PathBuf,
    pub credentials: CredentialSource,
    pub region: String,
    pub bucket: String,
    pub prefix: String,
    pub max_concurrent_uploads: NonZeroUsize,
    pub endpoint_url: Option<String>,
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    Args::parse()
}

/// Process command line arguments into a SyncConfig
pub fn process_sync_args(args: &Args) -> Result<SyncConfig> {
    let (local_root, credentials, target) = match &args.command {
        Command::Keys {
            directory,
            access_key,
            secret_key,
            target,
        } => (
            directory,
            CredentialSource::Static {
                access_key: access_key.clone(),
                secret_key: secret_key.clone(),
            },
            target,
        ),
        Command::Profile {
            directory,
            profile,
            target,
        } => (directory, CredentialSource::Profile(profile.clone()), target),
    };

    if target.bucket.is_empty() {
        return Err(anyhow!("Bucket name cannot be empty"));
    }

    Ok(SyncConfig {
        local_root: local_root.clone(),
        credentials,
        region: target.region.clone(),
        bucket: target.bucket.clone(),
        prefix: target.prefix.clone(),
        max_concurrent_uploads: target.max_concurrent_uploads,
        endpoint_url: args.endpoint_url.clone(),
    })
}
