use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cli;
mod diff;
mod error;
mod local;
mod progress;
mod remote;
mod storage;
mod sync;
mod upload;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger, RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    // Parse command line arguments
    let args = cli::parse_args();

    // Process arguments into a sync configuration
    let sync_config = match cli::process_sync_args(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Error processing arguments: {}", e);
            return Err(e);
        }
    };

    info!(
        "Syncing {} to s3://{}/{}",
        sync_config.local_root.display(),
        sync_config.bucket,
        sync_config.prefix
    );

    // Run the sync operation
    match sync::run_sync(sync_config).await {
        Ok(report) => {
            info!(
                "done. {} file(s) ({} bytes) uploaded, {} objects were already present",
                report.uploaded_files, report.uploaded_bytes, report.remote_objects
            );
            Ok(())
        }
        Err(e) => {
            error!("Sync failed: {:#}", e);
            Err(e)
        }
    }
}
