//! Simulated analysis progress
//!
//! Progress is cosmetic: it climbs by a fixed step on a fixed interval and
//! stops below 100 until the classification call settles. The owner forces
//! 100 on completion; the reporter itself never reports it.

use bagcheck_common::ServiceConfig;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSettings {
    pub interval: Duration,
    pub step: u8,
    /// Highest value reported while the call is outstanding
    pub ceiling: u8,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            step: 10,
            ceiling: 98,
        }
    }
}

impl From<&ServiceConfig> for ProgressSettings {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            interval: config.progress_interval(),
            step: config.progress_step,
            ceiling: config.progress_ceiling,
        }
    }
}

/// Next progress value: one step up, never past the ceiling
pub fn next_progress(current: u8, settings: &ProgressSettings) -> u8 {
    current.saturating_add(settings.step).min(settings.ceiling)
}

/// Periodic progress task
///
/// Stops when `stop` is called, when the reporter is dropped, when the
/// cancellation token fires, or when the tick callback returns `false`.
pub struct ProgressReporter {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    /// Spawn the reporter; `on_tick` receives each new value
    pub fn start<F, Fut>(settings: ProgressSettings, token: CancellationToken, on_tick: F) -> Self
    where
        F: Fn(u8) -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let task_token = token.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(settings.interval);
            // First tick completes immediately
            interval.tick().await;

            let mut progress = 0u8;
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = interval.tick() => {
                        progress = next_progress(progress, &settings);
                        tracing::debug!(progress, "Progress tick");
                        if !on_tick(progress).await {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            token,
            handle: Some(handle),
        }
    }

    /// Cancel the reporter and wait for the task to exit
    ///
    /// No tick is delivered after this returns.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn fast() -> ProgressSettings {
        ProgressSettings {
            interval: Duration::from_millis(5),
            step: 10,
            ceiling: 98,
        }
    }

    #[test]
    fn test_next_progress_clamps_at_ceiling() {
        let settings = ProgressSettings::default();
        assert_eq!(next_progress(0, &settings), 10);
        assert_eq!(next_progress(80, &settings), 90);
        assert_eq!(next_progress(90, &settings), 98);
        assert_eq!(next_progress(98, &settings), 98);
        assert_eq!(next_progress(250, &settings), 98);
    }

    #[tokio::test]
    async fn test_reporter_is_monotonic_and_never_reaches_100() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let reporter = ProgressReporter::start(fast(), CancellationToken::new(), move |p| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push(p);
                true
            }
        });

        tokio::time::sleep(Duration::from_millis(150)).await;
        reporter.stop().await;

        let seen = seen.lock().unwrap().clone();
        assert!(!seen.is_empty());
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert!(seen.iter().all(|&p| p <= 98));
        assert_eq!(seen[0], 10);
    }

    #[tokio::test]
    async fn test_no_ticks_after_stop() {
        let count = Arc::new(Mutex::new(0usize));
        let sink = count.clone();
        let reporter = ProgressReporter::start(fast(), CancellationToken::new(), move |_| {
            let sink = sink.clone();
            async move {
                *sink.lock().unwrap() += 1;
                true
            }
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        reporter.stop().await;
        let after_stop = *count.lock().unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(*count.lock().unwrap(), after_stop);
    }

    #[tokio::test]
    async fn test_external_cancel_stops_reporter() {
        let token = CancellationToken::new();
        let reporter = ProgressReporter::start(fast(), token.clone(), |_| async { true });

        token.cancel();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(reporter.is_finished());
    }

    #[tokio::test]
    async fn test_callback_false_stops_reporter() {
        let reporter = ProgressReporter::start(fast(), CancellationToken::new(), |_| async { false });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(reporter.is_finished());
    }
}
