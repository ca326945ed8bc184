//! Storage and queue doubles whose failures can be switched on per test.

use async_trait::async_trait;
use docintake_core::models::WorkItem;
use docintake_storage::{LocalStorage, Storage, StorageBackend, StorageError, StorageResult};
use docintake_worker::{Delivery, InMemoryQueue, QueueError, QueueResult, WorkQueue};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Local storage that counts issued write URLs and can refuse to sign.
pub struct ScriptedStorage {
    inner: LocalStorage,
    fail_signing: AtomicBool,
    put_urls_issued: AtomicUsize,
}

impl ScriptedStorage {
    pub fn new(inner: LocalStorage) -> Self {
        Self {
            inner,
            fail_signing: AtomicBool::new(false),
            put_urls_issued: AtomicUsize::new(0),
        }
    }

    pub fn fail_signing(&self, fail: bool) {
        self.fail_signing.store(fail, Ordering::SeqCst);
    }

    pub fn put_urls_issued(&self) -> usize {
        self.put_urls_issued.load(Ordering::SeqCst)
    }

    fn check_signing(&self) -> StorageResult<()> {
        if self.fail_signing.load(Ordering::SeqCst) {
            return Err(StorageError::SigningFailed("credentials expired".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for ScriptedStorage {
    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }

    async fn presigned_put_url(
        &self,
        storage_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.put_urls_issued.fetch_add(1, Ordering::SeqCst);
        self.check_signing()?;
        self.inner
            .presigned_put_url(storage_key, content_type, expires_in)
            .await
    }

    async fn presigned_get_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.check_signing()?;
        self.inner.presigned_get_url(storage_key, expires_in).await
    }

    async fn upload_with_key(&self, storage_key: &str, data: Vec<u8>) -> StorageResult<()> {
        self.inner.upload_with_key(storage_key, data).await
    }

    async fn download_to_file(
        &self,
        storage_key: &str,
        destination: &Path,
    ) -> StorageResult<u64> {
        self.inner.download_to_file(storage_key, destination).await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.inner.delete(storage_key).await
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.inner.exists(storage_key).await
    }
}

/// In-memory queue whose sends can be made to fail.
pub struct ScriptedQueue {
    pub inner: InMemoryQueue,
    fail_enqueue: AtomicBool,
}

impl ScriptedQueue {
    pub fn new() -> Self {
        Self {
            inner: InMemoryQueue::new(Duration::from_secs(60)),
            fail_enqueue: AtomicBool::new(false),
        }
    }

    pub fn fail_enqueue(&self, fail: bool) {
        self.fail_enqueue.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl WorkQueue for ScriptedQueue {
    async fn enqueue(&self, item: &WorkItem) -> QueueResult<()> {
        if self.fail_enqueue.load(Ordering::SeqCst) {
            return Err(QueueError::SendFailed("queue unreachable".into()));
        }
        self.inner.enqueue(item).await
    }

    async fn receive(&self, max_messages: i32, wait: Duration) -> QueueResult<Vec<Delivery>> {
        self.inner.receive(max_messages, wait).await
    }

    async fn acknowledge(&self, receipt_handle: &str) -> QueueResult<()> {
        self.inner.acknowledge(receipt_handle).await
    }
}
