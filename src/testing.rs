//! In-memory `ObjectStore` used by the unit tests.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use crate::storage::{ListPage, ObjectStore, RemoteObject, StoreError};

pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, RemoteObject>>,
    page_size: usize,
    upload_delay: Duration,
    fail_key: Option<String>,
    list_calls: AtomicUsize,
    puts: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            page_size: 1000,
            upload_delay: Duration::ZERO,
            fail_key: None,
            list_calls: AtomicUsize::new(0),
            puts: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_upload_delay(mut self, delay: Duration) -> Self {
        self.upload_delay = delay;
        self
    }

    pub fn failing_on(mut self, key: &str) -> Self {
        self.fail_key = Some(key.to_string());
        self
    }

    pub fn insert(&self, key: &str, size: u64, last_modified: SystemTime) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            RemoteObject {
                key: key.to_string(),
                size,
                last_modified,
            },
        );
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> Vec<String> {
        self.puts.lock().unwrap().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_objects(
        &self,
        _bucket: &str,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<ListPage, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let objects = self.objects.lock().unwrap();
        let mut matching = objects
            .values()
            .filter(|o| o.key.starts_with(prefix))
            .filter(|o| continuation.as_ref().map_or(true, |after| &o.key > after));

        let page: Vec<RemoteObject> = matching.by_ref().take(self.page_size).cloned().collect();
        let is_truncated = matching.next().is_some();
        let next_continuation = if is_truncated {
            page.last().map(|o| o.key.clone())
        } else {
            None
        };

        Ok(ListPage {
            objects: page,
            is_truncated,
            next_continuation,
        })
    }

    async fn put_object(&self, _bucket: &str, key: &str, path: &Path) -> Result<(), StoreError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.upload_delay.is_zero() {
            tokio::time::sleep(self.upload_delay).await;
        } else {
            tokio::task::yield_now().await;
        }

        let result = if self.fail_key.as_deref() == Some(key) {
            Err("simulated upload failure".into())
        } else {
            match tokio::fs::metadata(path).await {
                Ok(metadata) => {
                    self.insert(key, metadata.len(), SystemTime::now());
                    self.puts.lock().unwrap().push(key.to_string());
                    Ok(())
                }
                Err(e) => Err(e.into()),
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
