//! Verification run
//!
//! Classifies the material photo of a complete capture set and turns the
//! score into a verdict. Failures become a `Failed` outcome rather than an
//! error so the wizard can always reach DONE.

use std::sync::Arc;

use crate::models::{CapturedPart, VerificationFailureKind, VerificationOutcome, PRIMARY_PART};
use crate::services::classification_client::{ClassificationClient, ClassificationError};
use crate::services::score_aggregator::ScoreAggregator;

pub struct Verifier {
    client: Arc<ClassificationClient>,
    aggregator: ScoreAggregator,
}

impl Verifier {
    pub fn new(client: Arc<ClassificationClient>, aggregator: ScoreAggregator) -> Self {
        Self { client, aggregator }
    }

    /// Run classification for `parts` (one remote call, material photo only)
    pub async fn verify(&self, parts: &[CapturedPart]) -> VerificationOutcome {
        let Some(material) = parts.iter().find(|p| p.part_name == PRIMARY_PART) else {
            tracing::error!(parts = parts.len(), "Material part missing from capture set");
            return VerificationOutcome::Failed {
                kind: VerificationFailureKind::MissingPrimaryPart,
                message: format!("{} photo not found", PRIMARY_PART),
            };
        };

        match self.client.classify(&material.image).await {
            Ok(classification) => {
                let result = self.aggregator.aggregate(classification, parts);
                tracing::info!(
                    overall_score = result.overall_score,
                    band = result.band.as_str(),
                    source = result.source.as_str(),
                    "Verification completed"
                );
                VerificationOutcome::Verified(result)
            }
            Err(e) => {
                let kind = match &e {
                    ClassificationError::AllEndpointsUnavailable { .. }
                    | ClassificationError::ClientBuild(_) => {
                        VerificationFailureKind::AllEndpointsUnavailable
                    }
                };
                tracing::error!(error = %e, "Verification failed");
                VerificationOutcome::Failed {
                    kind,
                    message: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImageUpload, ScoreSource, REQUIRED_PARTS};
    use crate::services::classification_client::{ClassificationStrategy, StrategyError};
    use crate::services::score_aggregator::FixedDeduction;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed score and counts calls
    struct CountingStrategy {
        score: i64,
        calls: Arc<AtomicUsize>,
        seen_data: Arc<std::sync::Mutex<Vec<Vec<u8>>>>,
    }

    #[async_trait]
    impl ClassificationStrategy for CountingStrategy {
        fn name(&self) -> &str {
            "counting"
        }

        fn source(&self) -> ScoreSource {
            ScoreSource::Primary
        }

        async fn classify(&self, image: &ImageUpload) -> Result<i64, StrategyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_data.lock().unwrap().push(image.data.to_vec());
            Ok(self.score)
        }
    }

    fn parts(names: &[&str]) -> Vec<CapturedPart> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| CapturedPart {
                part_name: name.to_string(),
                image: ImageUpload::new(vec![i as u8], "image/jpeg"),
                preview_uri: String::new(),
                confidence: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_only_material_photo_is_classified_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let strategy: Box<dyn ClassificationStrategy> = Box::new(CountingStrategy {
            score: 92,
            calls: calls.clone(),
            seen_data: seen.clone(),
        });
        let client = ClassificationClient::with_strategies(vec![strategy]);
        let verifier = Verifier::new(
            Arc::new(client),
            ScoreAggregator::new(Arc::new(FixedDeduction(2))),
        );

        let names: Vec<&str> = REQUIRED_PARTS.iter().map(|p| p.name).collect();
        let outcome = verifier.verify(&parts(&names)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(seen.lock().unwrap().as_slice(), &[vec![0u8]]);
        let result = outcome.result().unwrap();
        assert_eq!(result.part_scores.len(), 5);
        // (92 + 4 * 90) / 5 = 90.4
        assert_eq!(result.overall_score, 90);
    }

    #[tokio::test]
    async fn test_missing_material_part_fails_without_calling_endpoint() {
        let calls = Arc::new(AtomicUsize::new(0));
        let strategy: Box<dyn ClassificationStrategy> = Box::new(CountingStrategy {
            score: 92,
            calls: calls.clone(),
            seen_data: Arc::new(std::sync::Mutex::new(Vec::new())),
        });
        let client = ClassificationClient::with_strategies(vec![strategy]);
        let verifier = Verifier::new(Arc::new(client), ScoreAggregator::default());

        let outcome = verifier.verify(&parts(&["Label", "Zipper"])).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(matches!(
            outcome,
            VerificationOutcome::Failed {
                kind: VerificationFailureKind::MissingPrimaryPart,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_no_strategies_is_all_endpoints_unavailable() {
        let verifier = Verifier::new(
            Arc::new(ClassificationClient::with_strategies(Vec::new())),
            ScoreAggregator::default(),
        );
        let outcome = verifier.verify(&parts(&["Material"])).await;
        assert!(matches!(
            outcome,
            VerificationOutcome::Failed {
                kind: VerificationFailureKind::AllEndpointsUnavailable,
                ..
            }
        ));
    }
}
