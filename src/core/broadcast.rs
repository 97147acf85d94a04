//! Periodic "verse of the day" broadcast.
//!
//! ```text
//! tick(period) -> pick reference -> resolve (cache, then fetch) -> format -> deliver to snapshot
//!      ^                                                                          |
//!      +--------------------------------------------------------------------------+
//! ```
//!
//! A cycle never takes the loop down: a verse that cannot be resolved skips the cycle,
//! a failed delivery is recorded and the next recipient is tried, and a panic inside a
//! cycle is caught at the task boundary.

use crate::core::format::broadcast_message;
use crate::core::{
    MessageSender, ReferencePicker, SubscriberId, SubscriberRegistry, Translator, VerseFetcher,
    VerseReference, MAX_SURAH, MIN_SURAH,
};
use crate::utils::error::{DeliveryError, Result};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);
/// Shortest period the ticker accepts; smaller values are raised to it.
pub const MIN_PERIOD: Duration = Duration::from_secs(1);
/// Upper bound for the random ayah. Real per-surah ayah counts are not modelled.
pub const DEFAULT_MAX_AYAH: u16 = 7;
/// Ayah count of the longest surah (Al-Baqarah).
pub const MAX_AYAH_LIMIT: u16 = 286;

#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    pub period: Duration,
    pub max_ayah: u16,
    pub translator: Translator,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            max_ayah: DEFAULT_MAX_AYAH,
            translator: Translator::default(),
        }
    }
}

/// Uniform surah in 1..=114, uniform ayah in 1..=max_ayah.
#[derive(Debug, Clone)]
pub struct RandomPicker {
    max_ayah: u16,
    translator: Translator,
}

impl RandomPicker {
    pub fn new(max_ayah: u16, translator: Translator) -> Self {
        Self {
            max_ayah: max_ayah.max(1),
            translator,
        }
    }
}

impl ReferencePicker for RandomPicker {
    fn pick(&self) -> Result<VerseReference> {
        let mut rng = rand::rng();
        let surah = rng.random_range(MIN_SURAH..=MAX_SURAH);
        let ayah = rng.random_range(1..=self.max_ayah);
        VerseReference::new(surah, ayah, self.translator)
    }
}

/// Per-recipient results of one fan-out.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: Vec<SubscriberId>,
    pub failed: Vec<(SubscriberId, DeliveryError)>,
}

impl DeliveryReport {
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoReference(String),
    NotFound(VerseReference),
    Panicked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Delivered {
        reference: VerseReference,
        report: DeliveryReport,
    },
    Skipped(SkipReason),
}

pub struct BroadcastScheduler {
    fetcher: Arc<VerseFetcher>,
    registry: Arc<SubscriberRegistry>,
    sender: Arc<dyn MessageSender>,
    picker: Arc<dyn ReferencePicker>,
    period: Duration,
}

impl BroadcastScheduler {
    pub fn new(
        fetcher: Arc<VerseFetcher>,
        registry: Arc<SubscriberRegistry>,
        sender: Arc<dyn MessageSender>,
        config: &BroadcastConfig,
    ) -> Self {
        if config.period < MIN_PERIOD {
            tracing::warn!(
                requested = ?config.period,
                "Broadcast period below {:?}, clamping",
                MIN_PERIOD
            );
        }
        Self {
            fetcher,
            registry,
            sender,
            picker: Arc::new(RandomPicker::new(config.max_ayah, config.translator)),
            period: config.period.max(MIN_PERIOD),
        }
    }

    pub fn with_picker(mut self, picker: Arc<dyn ReferencePicker>) -> Self {
        self.picker = picker;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// One full broadcast: pick, resolve, format, deliver.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let reference = match self.picker.pick() {
            Ok(reference) => reference,
            Err(e) => {
                tracing::warn!("⚠️ Could not pick a broadcast reference: {}", e);
                return CycleOutcome::Skipped(SkipReason::NoReference(e.to_string()));
            }
        };

        let Some(record) = self.fetcher.resolve(&reference).await else {
            tracing::info!(reference = %reference, "Verse unavailable, skipping this broadcast");
            return CycleOutcome::Skipped(SkipReason::NotFound(reference));
        };

        let text = broadcast_message(&reference, &record);
        let report = self.deliver_all(&text).await;

        tracing::info!(
            reference = %reference,
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            "📤 Broadcast finished"
        );

        CycleOutcome::Delivered { reference, report }
    }

    /// Sends `text` to every current subscriber. A failure for one recipient
    /// never stops delivery to the rest.
    pub async fn deliver_all(&self, text: &str) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for recipient in self.registry.snapshot() {
            match self.sender.send_message(recipient, text).await {
                Ok(()) => report.delivered.push(recipient),
                Err(e) => {
                    tracing::debug!(subscriber = %recipient, "Delivery failed: {}", e);
                    report.failed.push((recipient, e));
                }
            }
        }

        report
    }

    /// Starts the periodic loop. The first broadcast fires one full period from now.
    pub fn spawn(self) -> BroadcastHandle {
        let cancel = CancellationToken::new();
        let scheduler = Arc::new(self);
        let task = tokio::spawn(run_loop(scheduler, cancel.clone()));

        BroadcastHandle { cancel, task }
    }
}

async fn run_loop(scheduler: Arc<BroadcastScheduler>, cancel: CancellationToken) {
    let period = scheduler.period();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        period_secs = period.as_secs(),
        next = %next_run_label(period),
        "🕰️ Broadcast scheduler started"
    );

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Broadcast scheduler shutting down");
                break;
            }
            _ = ticker.tick() => {
                let cycle = Arc::clone(&scheduler);
                // Run in its own task so a panic ends only this cycle.
                let outcome = match tokio::spawn(async move { cycle.run_cycle().await }).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::error!("❌ Broadcast cycle aborted: {}", e);
                        CycleOutcome::Skipped(SkipReason::Panicked)
                    }
                };
                tracing::debug!(?outcome, "Broadcast cycle done");
                tracing::debug!(next = %next_run_label(period), "Waiting for next broadcast");
            }
        }
    }
}

fn next_run_label(period: Duration) -> String {
    chrono::TimeDelta::from_std(period)
        .ok()
        .and_then(|delta| chrono::Local::now().checked_add_signed(delta))
        .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Owner side of a running scheduler.
pub struct BroadcastHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl BroadcastHandle {
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the loop and waits for an in-flight cycle to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::error!("Broadcast task ended abnormally: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_picker_stays_in_range() {
        let picker = RandomPicker::new(DEFAULT_MAX_AYAH, Translator::Osmanov);
        for _ in 0..1000 {
            let reference = picker.pick().unwrap();
            assert!((1..=114).contains(&reference.surah()));
            assert!((1..=7).contains(&reference.ayah()));
            assert_eq!(reference.translator(), Translator::Osmanov);
        }
    }

    #[test]
    fn test_random_picker_clamps_zero_max() {
        let picker = RandomPicker::new(0, Translator::Kuliev);
        assert_eq!(picker.pick().unwrap().ayah(), 1);
    }

    #[test]
    fn test_delivery_report_counts() {
        let report = DeliveryReport {
            delivered: vec![SubscriberId(1), SubscriberId(3)],
            failed: vec![(SubscriberId(2), DeliveryError::Blocked(2))],
        };
        assert_eq!(report.attempted(), 3);
    }

    #[tokio::test]
    async fn test_period_is_clamped_to_minimum() {
        use crate::adapters::ConsoleSender;
        use crate::core::VerseCache;

        let fetcher = Arc::new(
            VerseFetcher::new("http://127.0.0.1:9", Arc::new(VerseCache::new())).unwrap(),
        );
        let registry = Arc::new(SubscriberRegistry::new());
        let sender: Arc<dyn MessageSender> = Arc::new(ConsoleSender::new(tokio::io::sink()));

        for requested in [Duration::ZERO, Duration::from_millis(250)] {
            let config = BroadcastConfig {
                period: requested,
                ..Default::default()
            };
            let scheduler =
                BroadcastScheduler::new(fetcher.clone(), registry.clone(), sender.clone(), &config);
            assert_eq!(scheduler.period(), MIN_PERIOD);
        }

        let config = BroadcastConfig::default();
        let scheduler = BroadcastScheduler::new(fetcher, registry, sender, &config);
        assert_eq!(scheduler.period(), DEFAULT_PERIOD);
    }

    #[test]
    fn test_default_config() {
        let config = BroadcastConfig::default();
        assert_eq!(config.period, Duration::from_secs(86_400));
        assert_eq!(config.max_ayah, 7);
    }
}
