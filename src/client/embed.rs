//! Third-party embed script lifecycle
//!
//! An embed script is injected once, polled until its runtime is available,
//! then asked to process the page. Dropping the [`EmbedGuard`] stops the
//! polling and removes the script again.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// The environment an embed script is loaded into
pub trait ScriptHost: Send + Sync + 'static {
    /// Add the script to the page
    fn inject(&self, src: &str);

    /// Whether the script's runtime has finished loading
    fn is_ready(&self) -> bool;

    /// Ask the script to process embeds on the page
    fn process(&self);

    /// Remove every copy of the script from the page
    fn remove(&self, src: &str);
}

/// An injected embed script and its readiness poll
pub struct EmbedGuard {
    host: Arc<dyn ScriptHost>,
    src: String,
    poll: JoinHandle<()>,
}

impl EmbedGuard {
    /// Inject `src` into `host` and start polling for readiness.
    ///
    /// Must be called from within a tokio runtime.
    pub fn acquire(host: Arc<dyn ScriptHost>, src: &str, interval: Duration) -> Self {
        host.inject(src);
        tracing::debug!("Injected embed script {}", src);

        let poll_host = Arc::clone(&host);
        let poll = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if poll_host.is_ready() {
                    poll_host.process();
                    break;
                }
            }
        });

        Self {
            host,
            src: src.to_string(),
            poll,
        }
    }

    /// Whether polling has stopped
    pub fn is_settled(&self) -> bool {
        self.poll.is_finished()
    }
}

impl Drop for EmbedGuard {
    fn drop(&mut self) {
        self.poll.abort();
        self.host.remove(&self.src);
        tracing::debug!("Removed embed script {}", self.src);
    }
}

impl std::fmt::Debug for EmbedGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbedGuard")
            .field("src", &self.src)
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// Script host without a script runtime.
///
/// Scripts are recorded but never executed, and report ready immediately.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    scripts: Mutex<Vec<String>>,
    processed: AtomicUsize,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts currently injected
    pub fn scripts(&self) -> Vec<String> {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of times embeds were processed
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }
}

impl ScriptHost for HeadlessHost {
    fn inject(&self, src: &str) {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(src.to_string());
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn process(&self) {
        self.processed.fetch_add(1, Ordering::SeqCst);
    }

    fn remove(&self, src: &str) {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|s| s != src);
    }
}
