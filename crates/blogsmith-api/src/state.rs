//! Application state management
//!
//! Author: hephaex@gmail.com

use blogsmith_core::config::AppConfig;
use blogsmith_mail::{Mailer, MailjetMailer};
use blogsmith_rag::BlogDrafter;
use blogsmith_vector::VectorIndex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Request counters, bucketed by status class
#[derive(Debug, Default)]
pub struct RequestMetrics {
    pub total: AtomicU64,
    pub success: AtomicU64,
    pub client_errors: AtomicU64,
    pub server_errors: AtomicU64,
    pub total_latency_us: AtomicU64,
    pub drafts_generated: AtomicU64,
    pub drafts_failed: AtomicU64,
    pub emails_sent: AtomicU64,
    pub emails_failed: AtomicU64,
}

/// Application state shared across handlers
///
/// Everything except the counters is fixed once the server starts.
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Request and pipeline counters
    pub metrics: RequestMetrics,
    /// Blog drafter, present once the index is loaded
    pub drafter: Option<Arc<BlogDrafter>>,
    /// Mail transport, present when credentials are configured
    pub mailer: Option<Arc<dyn Mailer>>,
}

impl AppState {
    /// Create new application state with config
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            metrics: RequestMetrics::default(),
            drafter: None,
            mailer: None,
        }
    }

    /// Load the index and wire every remote client from config
    ///
    /// Fails when the index cannot be loaded or the LLM provider is not
    /// configured. Missing mail credentials only disable email delivery.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let index = Arc::new(VectorIndex::load(&config.index.path)?);
        let drafter = BlogDrafter::from_config(&config, index)?;

        let mailer: Option<Arc<dyn Mailer>> = if config.mail.is_configured() {
            Some(Arc::new(MailjetMailer::from_config(&config.mail)?))
        } else {
            tracing::warn!("Mailjet keys not set; email delivery disabled");
            None
        };

        let mut state = Self::new(config).with_drafter(Arc::new(drafter));
        state.mailer = mailer;
        Ok(state)
    }

    /// Attach the drafter
    pub fn with_drafter(mut self, drafter: Arc<BlogDrafter>) -> Self {
        self.drafter = Some(drafter);
        self
    }

    /// Attach the mail transport
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Record a finished request
    pub fn record_request(&self, status: u16, latency_us: u64) {
        let metrics = &self.metrics;
        metrics.total.fetch_add(1, Ordering::Relaxed);
        metrics
            .total_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
        let bucket = match status {
            500.. => &metrics.server_errors,
            400..=499 => &metrics.client_errors,
            _ => &metrics.success,
        };
        bucket.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.metrics.total.load(Ordering::Relaxed)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Check if service is ready
    pub fn is_ready(&self) -> bool {
        self.drafter.is_some()
    }

    /// Number of records in the loaded index
    pub fn index_records(&self) -> usize {
        self.drafter
            .as_ref()
            .map(|d| d.retriever().index().len())
            .unwrap_or(0)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
