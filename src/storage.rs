use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::Client;
use aws_smithy_types::byte_stream::ByteStream;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::cli::{CredentialSource, SyncConfig};

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// One object as reported by a listing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    pub key: String,
    pub size: u64,
    pub last_modified: SystemTime,
}

/// A single page of a listing
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub objects: Vec<RemoteObject>,
    pub is_truncated: bool,
    /// Token to pass back to get the next page, present when truncated
    pub next_continuation: Option<String>,
}

/// The two object store calls a sync needs.
///
/// Implementations are shared by reference between all concurrent uploads,
/// so every call must be safe to issue while others are in flight.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<ListPage, StoreError>;

    /// Upload the whole file at `path`, replacing any object already at `key`
    async fn put_object(&self, bucket: &str, key: &str, path: &Path) -> Result<(), StoreError>;
}

/// `ObjectStore` backed by the AWS SDK
#[derive(Clone, Debug)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn connect(config: &SyncConfig) -> Self {
        Self::new(create_s3_client(config).await)
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<ListPage, StoreError> {
        let mut req = self.client.list_objects_v2().bucket(bucket);

        if !prefix.is_empty() {
            req = req.prefix(prefix);
        }

        if let Some(token) = continuation {
            req = req.continuation_token(token);
        }

        let resp = req.send().await?;

        let objects = resp
            .contents()
            .iter()
            .filter_map(|object| {
                let key = object.key()?;
                Some(RemoteObject {
                    key: key.to_string(),
                    size: object.size().unwrap_or(0).max(0) as u64,
                    // Missing timestamps count as infinitely old
                    last_modified: object
                        .last_modified()
                        .and_then(|t| SystemTime::try_from(*t).ok())
                        .unwrap_or(UNIX_EPOCH),
                })
            })
            .collect();

        Ok(ListPage {
            objects,
            is_truncated: resp.is_truncated().unwrap_or(false),
            next_continuation: resp.next_continuation_token().map(str::to_string),
        })
    }

    async fn put_object(&self, bucket: &str, key: &str, path: &Path) -> Result<(), StoreError> {
        let body = ByteStream::from_path(path).await?;
        let content_type = determine_content_type(path);

        debug!("PUT s3://{}/{} ({})", bucket, key, content_type);

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await?;

        Ok(())
    }
}

/// Create an S3 client for the configured region and credentials
async fn create_s3_client(config: &SyncConfig) -> Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()));

    loader = match &config.credentials {
        CredentialSource::Static {
            access_key,
            secret_key,
        } => loader.credentials_provider(Credentials::new(
            access_key, secret_key, None, None, "static",
        )),
        CredentialSource::Profile(name) => loader.profile_name(name),
    };

    if let Some(endpoint) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    let shared = loader.load().await;
    let s3_config = aws_sdk_s3::config::Builder::from(&shared)
        .force_path_style(config.endpoint_url.is_some())
        .build();

    Client::from_conf(s3_config)
}

/// Determine the content type based on file extension
fn determine_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("txt") => "text/plain",
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("csv") => "text/csv",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}
