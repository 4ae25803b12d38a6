//! Price page structure monitor.
//!
//! A cancellable scheduled task that polls the pricing page, hashes the
//! normalized price-table subset, and sends a notification when the hash
//! changes versus the last observed value. The hash persists in a
//! single-value state file; a lock file enforces one instance at a time.

use super::normalized_tables;
use crate::error::{Result, RoostError};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

/// Trait for fetching the monitored page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self) -> Result<String>;
}

/// HTTP page fetcher.
pub struct HttpPageFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpPageFetcher {
    pub fn new(url: &str) -> Result<Self> {
        url::Url::parse(url)
            .map_err(|e| RoostError::Config(format!("Invalid monitor URL: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| RoostError::Monitor(format!("{}: {}", self.url, e)))?;

        Ok(response.text().await?)
    }
}

/// Trait for change notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<()>;
}

/// Notifier that POSTs a JSON body to a webhook.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: &str) -> Result<Self> {
        url::Url::parse(url)
            .map_err(|e| RoostError::Config(format!("Invalid webhook URL: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        self.client
            .post(&self.url)
            .json(&serde_json::json!({ "text": message }))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| RoostError::Monitor(format!("Webhook notification failed: {}", e)))?;
        Ok(())
    }
}

/// Notifier that only logs. Used when no webhook is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        warn!("{}", message);
        Ok(())
    }
}

/// Outcome of a single monitor check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// First observation; baseline recorded, no alert.
    Initialized,
    /// Content hash matches the stored one.
    Unchanged,
    /// Content hash differs; alert sent and hash updated.
    Changed,
    /// The page carried no recognizable price tables.
    NoContent,
}

/// Guard holding the single-instance lock file.
///
/// Created with O_EXCL semantics; removed on drop so a clean shutdown
/// releases the lock.
struct MonitorLock {
    path: PathBuf,
}

impl MonitorLock {
    fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
        {
            Ok(_) => Ok(Self {
                path: path.to_path_buf(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(RoostError::Monitor(format!(
                    "Another monitor instance appears to be running (lock file {} exists). \
                     Remove it if that instance has died.",
                    path.display()
                )))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for MonitorLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("Failed to remove lock file {}: {}", self.path.display(), e);
        }
    }
}

/// The price page structure monitor.
pub struct PriceMonitor {
    fetcher: Arc<dyn PageFetcher>,
    notifier: Arc<dyn Notifier>,
    state_path: PathBuf,
    lock_path: PathBuf,
    interval: Duration,
}

impl PriceMonitor {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        notifier: Arc<dyn Notifier>,
        state_path: PathBuf,
        lock_path: PathBuf,
        interval: Duration,
    ) -> Self {
        Self {
            fetcher,
            notifier,
            state_path,
            lock_path,
            interval,
        }
    }

    /// Fetch, hash, compare, and notify once.
    #[instrument(skip(self))]
    pub async fn check_once(&self) -> Result<CheckOutcome> {
        let html = self.fetcher.fetch().await?;

        let Some(normalized) = normalized_tables(&html) else {
            warn!("No price tables found on the monitored page");
            return Ok(CheckOutcome::NoContent);
        };

        let new_hash = format!("{:x}", Sha256::digest(normalized.as_bytes()));
        let previous = std::fs::read_to_string(&self.state_path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        match previous {
            None => {
                self.store_hash(&new_hash)?;
                info!("Recorded baseline price page hash");
                Ok(CheckOutcome::Initialized)
            }
            Some(old_hash) if old_hash == new_hash => {
                info!("No price page changes detected");
                Ok(CheckOutcome::Unchanged)
            }
            Some(_) => {
                info!("Price page structure changed");
                if let Err(e) = self
                    .notifier
                    .notify("Egg price page structure changed. The scraper may need updating.")
                    .await
                {
                    // One report per change; no retries.
                    warn!("Change notification failed: {}", e);
                }
                self.store_hash(&new_hash)?;
                Ok(CheckOutcome::Changed)
            }
        }
    }

    fn store_hash(&self, hash: &str) -> Result<()> {
        if let Some(parent) = self.state_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.state_path, hash)?;
        Ok(())
    }

    /// Run the monitor until the shutdown signal fires.
    ///
    /// Acquires the single-instance lock for the whole run. Check failures
    /// are logged and the loop continues; the next tick tries again.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let _lock = MonitorLock::acquire(&self.lock_path)?;

        let mut ticker = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.check_once().await {
                        warn!("Price monitor check failed: {}", e);
                    }
                }
                _ = shutdown.changed() => {
                    info!("Price monitor shutting down");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StaticFetcher {
        pages: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        fn new(pages: Vec<&str>) -> Self {
            // Served in order; the last page repeats.
            Self {
                pages: Mutex::new(pages.into_iter().rev().map(String::from).collect()),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self) -> Result<String> {
            let mut pages = self.pages.lock().unwrap();
            if pages.len() > 1 {
                Ok(pages.pop().unwrap())
            } else {
                Ok(pages.last().cloned().unwrap_or_default())
            }
        }
    }

    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self {
                messages: Mutex::new(Vec::new()),
            }
        }

        fn count(&self) -> usize {
            self.messages.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, message: &str) -> Result<()> {
            self.messages.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    const PAGE_A: &str =
        r#"<html><table class="kb-table"><tr><td>1 Dozen</td><td>348</td></tr></table></html>"#;
    const PAGE_B: &str =
        r#"<html><table class="kb-table"><tr><td>1 Dozen</td><td>360</td></tr></table></html>"#;

    fn monitor(
        fetcher: Arc<dyn PageFetcher>,
        notifier: Arc<RecordingNotifier>,
        dir: &tempfile::TempDir,
    ) -> PriceMonitor {
        PriceMonitor::new(
            fetcher,
            notifier,
            dir.path().join("price_hash"),
            dir.path().join("monitor.lock"),
            Duration::from_secs(86400),
        )
    }

    #[tokio::test]
    async fn test_identical_content_no_alert() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = Arc::new(RecordingNotifier::new());
        let m = monitor(
            Arc::new(StaticFetcher::new(vec![PAGE_A, PAGE_A])),
            notifier.clone(),
            &dir,
        );

        assert_eq!(m.check_once().await.unwrap(), CheckOutcome::Initialized);
        assert_eq!(m.check_once().await.unwrap(), CheckOutcome::Unchanged);
        assert_eq!(notifier.count(), 0);
    }

    #[tokio::test]
    async fn test_changed_content_alerts_once_and_updates_hash() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = Arc::new(RecordingNotifier::new());
        let m = monitor(
            Arc::new(StaticFetcher::new(vec![PAGE_A, PAGE_B, PAGE_B])),
            notifier.clone(),
            &dir,
        );

        assert_eq!(m.check_once().await.unwrap(), CheckOutcome::Initialized);
        let baseline = std::fs::read_to_string(dir.path().join("price_hash")).unwrap();

        assert_eq!(m.check_once().await.unwrap(), CheckOutcome::Changed);
        assert_eq!(notifier.count(), 1);

        let updated = std::fs::read_to_string(dir.path().join("price_hash")).unwrap();
        assert_ne!(baseline, updated);

        // The new hash is now the baseline; no further alerts.
        assert_eq!(m.check_once().await.unwrap(), CheckOutcome::Unchanged);
        assert_eq!(notifier.count(), 1);
    }

    #[tokio::test]
    async fn test_page_without_tables() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = Arc::new(RecordingNotifier::new());
        let m = monitor(
            Arc::new(StaticFetcher::new(vec!["<html><p>redesigned</p></html>"])),
            notifier.clone(),
            &dir,
        );

        assert_eq!(m.check_once().await.unwrap(), CheckOutcome::NoContent);
        assert_eq!(notifier.count(), 0);
        assert!(!dir.path().join("price_hash").exists());
    }

    #[test]
    fn test_lock_is_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let lock_path = dir.path().join("monitor.lock");

        let first = MonitorLock::acquire(&lock_path).unwrap();
        let second = MonitorLock::acquire(&lock_path);
        assert!(matches!(second, Err(RoostError::Monitor(_))));

        drop(first);
        // Lock is released on drop; a new instance can start.
        assert!(MonitorLock::acquire(&lock_path).is_ok());
    }
}
