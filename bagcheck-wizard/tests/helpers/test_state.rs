//! Wizard and app state builders with short timings

use async_trait::async_trait;
use bagcheck_common::events::EventBus;
use bagcheck_common::ServiceConfig;
use bagcheck_wizard::models::{ImageUpload, ScoreSource, REQUIRED_PARTS};
use bagcheck_wizard::services::{
    ClassificationClient, ClassificationStrategy, FixedDeduction, ProgressSettings,
    ScoreAggregator, StrategyError, Verifier,
};
use bagcheck_wizard::workflow::{WizardContext, WizardHandle};
use bagcheck_wizard::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Strategy returning a fixed score after `delay`
pub struct StubStrategy {
    pub score: i64,
    pub delay: Duration,
    pub source: ScoreSource,
}

impl StubStrategy {
    pub fn primary(score: i64) -> Self {
        Self {
            score,
            delay: Duration::ZERO,
            source: ScoreSource::Primary,
        }
    }

    pub fn slow(score: i64, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::primary(score)
        }
    }
}

#[async_trait]
impl ClassificationStrategy for StubStrategy {
    fn name(&self) -> &str {
        "stub"
    }

    fn source(&self) -> ScoreSource {
        self.source
    }

    async fn classify(&self, _image: &ImageUpload) -> Result<i64, StrategyError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.score)
    }
}

/// Strategy that always fails with a 503
pub struct FailingStrategy;

#[async_trait]
impl ClassificationStrategy for FailingStrategy {
    fn name(&self) -> &str {
        "failing"
    }

    fn source(&self) -> ScoreSource {
        ScoreSource::Primary
    }

    async fn classify(&self, _image: &ImageUpload) -> Result<i64, StrategyError> {
        Err(StrategyError::Status(503, "unavailable".to_string()))
    }
}

/// Config with 10 ms progress ticks and a 50 ms dismiss delay
pub fn fast_config() -> ServiceConfig {
    ServiceConfig {
        progress_interval_ms: 10,
        dismiss_reset_delay_ms: 50,
        ..ServiceConfig::default()
    }
}

/// Verifier over `strategies` with a fixed 2-point deduction
pub fn verifier_with(strategies: Vec<Box<dyn ClassificationStrategy>>) -> Arc<Verifier> {
    Arc::new(Verifier::new(
        Arc::new(ClassificationClient::with_strategies(strategies)),
        ScoreAggregator::new(Arc::new(FixedDeduction(2))),
    ))
}

pub fn test_context(verifier: Arc<Verifier>, event_bus: EventBus) -> WizardContext {
    let config = fast_config();
    WizardContext {
        verifier,
        event_bus,
        progress: ProgressSettings::from(&config),
        dismiss_reset_delay: config.dismiss_reset_delay(),
        last_error: Arc::new(RwLock::new(None)),
    }
}

pub fn test_app_state(verifier: Arc<Verifier>) -> AppState {
    AppState::new(&fast_config(), verifier, EventBus::new(256))
}

/// Minimal JPEG header, enough to pass as an image upload
pub fn sample_image() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00]
}

/// Select and confirm a photo for every part
pub async fn capture_all_parts(wizard: &WizardHandle) {
    for part in REQUIRED_PARTS.iter() {
        let image = ImageUpload::new(sample_image(), "image/jpeg")
            .with_file_name(format!("{}.jpg", part.name.to_lowercase()));
        wizard.select_file(image).await.unwrap();
        wizard.confirm_current_part().await;
    }
}
