use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// One progress event: overall percent complete plus a short stage message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressUpdate {
    pub percent: u8,
    pub message: String,
}

struct ProgressState {
    last_percent: AtomicU8,
    finished: AtomicBool,
}

/// Sending half of a progress stream.
///
/// Percent values never decrease over the life of a run: late or
/// out-of-order reports are lifted to the high-water mark instead of
/// moving backwards. 100 is delivered exactly once; anything reported
/// after that is dropped.
#[derive(Clone)]
pub struct ProgressSender {
    tx: Option<mpsc::Sender<ProgressUpdate>>,
    state: Arc<ProgressState>,
}

impl ProgressSender {
    /// Creates a bounded progress channel for one run.
    pub fn channel(capacity: usize) -> (ProgressSender, mpsc::Receiver<ProgressUpdate>) {
        let (tx, rx) = mpsc::channel(capacity);
        let sender = ProgressSender {
            tx: Some(tx),
            state: Arc::new(ProgressState {
                last_percent: AtomicU8::new(0),
                finished: AtomicBool::new(false),
            }),
        };
        (sender, rx)
    }

    /// Sender that drops every update, for callers that do not listen.
    pub fn noop() -> ProgressSender {
        ProgressSender {
            tx: None,
            state: Arc::new(ProgressState {
                last_percent: AtomicU8::new(0),
                finished: AtomicBool::new(false),
            }),
        }
    }

    pub async fn report(&self, percent: u8, message: impl Into<String>) {
        let percent = percent.min(100);
        // lift stale reports up to the high-water mark
        let prev = self.state.last_percent.fetch_max(percent, Ordering::SeqCst);
        let effective = prev.max(percent);

        if effective == 100 && self.state.finished.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(tx) = &self.tx {
            let update = ProgressUpdate {
                percent: effective,
                message: message.into(),
            };
            if let Err(e) = tx.send(update).await {
                debug!("progress receiver dropped: {}", e);
            }
        }
    }

    /// Highest percent reported so far.
    pub fn last_percent(&self) -> u8 {
        self.state.last_percent.load(Ordering::SeqCst)
    }

    /// Maps a stage's local completion onto the `lo..=hi` slice of the
    /// overall percent range.
    pub fn scope(&self, lo: u8, hi: u8) -> ProgressScope {
        let lo = lo.min(100);
        let hi = hi.clamp(lo, 100);
        ProgressScope {
            sender: self.clone(),
            lo,
            hi,
        }
    }
}

/// A band of the overall percent range owned by one pipeline stage.
#[derive(Clone)]
pub struct ProgressScope {
    sender: ProgressSender,
    lo: u8,
    hi: u8,
}

impl ProgressScope {
    /// Reports stage-local completion, `fraction` in `0.0..=1.0`.
    pub async fn emit(&self, fraction: f64, message: impl Into<String>) {
        let fraction = fraction.clamp(0.0, 1.0);
        let span = (self.hi - self.lo) as f64;
        let percent = self.lo + (span * fraction).round() as u8;
        self.sender.report(percent, message).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn percent_never_decreases() {
        let (sender, mut rx) = ProgressSender::channel(16);

        sender.report(10, "a").await;
        sender.report(40, "b").await;
        sender.report(25, "late").await;
        sender.report(60, "c").await;
        drop(sender);

        let mut seen = Vec::new();
        while let Some(update) = rx.recv().await {
            seen.push(update.percent);
        }
        assert_eq!(seen, vec![10, 40, 40, 60]);
    }

    #[tokio::test]
    async fn hundred_is_delivered_exactly_once() {
        let (sender, mut rx) = ProgressSender::channel(16);

        sender.report(90, "almost").await;
        sender.report(100, "done").await;
        sender.report(100, "done again").await;
        sender.report(50, "stale").await;
        drop(sender);

        let mut seen = Vec::new();
        while let Some(update) = rx.recv().await {
            seen.push(update.percent);
        }
        assert_eq!(seen, vec![90, 100]);
    }

    #[tokio::test]
    async fn scope_maps_fractions_into_band() {
        let (sender, mut rx) = ProgressSender::channel(16);
        let scope = sender.scope(60, 80);

        scope.emit(0.0, "start").await;
        scope.emit(0.5, "half").await;
        scope.emit(1.0, "end").await;
        drop(scope);
        drop(sender);

        let mut seen = Vec::new();
        while let Some(update) = rx.recv().await {
            seen.push(update.percent);
        }
        assert_eq!(seen, vec![60, 70, 80]);
    }

    #[tokio::test]
    async fn noop_sender_swallows_reports() {
        let sender = ProgressSender::noop();
        sender.report(42, "nobody listens").await;
        assert_eq!(sender.last_percent(), 42);
    }
}
