//! Authenticity classification client
//!
//! Sends the material photo to an ordered list of classification endpoints
//! and normalizes the first successful response into a 0-100 score.
//!
//! # Endpoints
//! - **Primary** (remote): `{ predicted_label, confidence }`, confidence in 0-1
//! - **Secondary** (local fallback): `{ accuracy }`, already 0-100
//!
//! Each endpoint is a [`ClassificationStrategy`]; normalization rules stay
//! inside the strategy. The client makes exactly one pass over the list, so a
//! failed primary costs at most one extra request.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ImageUpload, ScoreSource};

const USER_AGENT: &str = concat!("bagcheck/", env!("CARGO_PKG_VERSION"));

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "file";

/// Bias added to authentic predictions from the primary endpoint
pub const REAL_LABEL_BIAS: f64 = 0.07;

/// Single endpoint attempt errors
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Endpoint returned {0}: {1}")]
    Status(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Classification client errors
#[derive(Debug, Error)]
pub enum ClassificationError {
    /// Every endpoint failed; one entry per attempt
    #[error("All classification endpoints unavailable ({})", .attempts.join("; "))]
    AllEndpointsUnavailable { attempts: Vec<String> },

    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

/// Normalized classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Authenticity score; may exceed 100 for biased primary predictions
    pub score: i64,
    pub source: ScoreSource,
}

/// One classification endpoint
#[async_trait]
pub trait ClassificationStrategy: Send + Sync {
    /// Endpoint name for logging
    fn name(&self) -> &str;

    fn source(&self) -> ScoreSource;

    /// Classify the image, returning a normalized authenticity score
    async fn classify(&self, image: &ImageUpload) -> Result<i64, StrategyError>;
}

/// Primary endpoint response body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PrimaryResponse {
    /// "Real" or "Fake", case-insensitive
    pub predicted_label: String,
    /// Confidence in the predicted label (0.0 to 1.0)
    pub confidence: f64,
}

impl PrimaryResponse {
    /// Authenticity score for this prediction
    ///
    /// Authentic predictions get a fixed +0.07 bias; fake predictions are
    /// inverted. The result is not clamped.
    pub fn authenticity_score(&self) -> i64 {
        let fraction = if self.predicted_label.eq_ignore_ascii_case("real") {
            self.confidence + REAL_LABEL_BIAS
        } else {
            1.0 - self.confidence
        };
        (fraction * 100.0).round() as i64
    }
}

/// Secondary endpoint response body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecondaryResponse {
    /// Authenticity score (0 to 100)
    pub accuracy: f64,
}

impl SecondaryResponse {
    pub fn authenticity_score(&self) -> i64 {
        self.accuracy.round() as i64
    }
}

fn image_form(image: &ImageUpload) -> Form {
    let file_name = image
        .file_name
        .clone()
        .unwrap_or_else(|| "material".to_string());
    let part = Part::bytes(image.data.to_vec())
        .file_name(file_name.clone())
        .mime_str(&image.content_type)
        .unwrap_or_else(|_| Part::bytes(image.data.to_vec()).file_name(file_name));
    Form::new().part(IMAGE_FIELD, part)
}

async fn post_image(
    http: &reqwest::Client,
    url: &str,
    image: &ImageUpload,
) -> Result<reqwest::Response, StrategyError> {
    let response = http
        .post(url)
        .multipart(image_form(image))
        .send()
        .await
        .map_err(|e| StrategyError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(StrategyError::Status(status.as_u16(), error_text));
    }

    Ok(response)
}

/// Remote classifier returning a label and confidence
pub struct PrimaryEndpoint {
    http: reqwest::Client,
    url: String,
}

impl PrimaryEndpoint {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }
}

#[async_trait]
impl ClassificationStrategy for PrimaryEndpoint {
    fn name(&self) -> &str {
        &self.url
    }

    fn source(&self) -> ScoreSource {
        ScoreSource::Primary
    }

    async fn classify(&self, image: &ImageUpload) -> Result<i64, StrategyError> {
        let body: PrimaryResponse = post_image(&self.http, &self.url, image)
            .await?
            .json()
            .await
            .map_err(|e| StrategyError::Parse(e.to_string()))?;

        tracing::debug!(
            endpoint = %self.url,
            label = %body.predicted_label,
            confidence = body.confidence,
            "Primary classification response"
        );

        Ok(body.authenticity_score())
    }
}

/// Local fallback classifier returning a ready-made score
pub struct SecondaryEndpoint {
    http: reqwest::Client,
    url: String,
}

impl SecondaryEndpoint {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }
}

#[async_trait]
impl ClassificationStrategy for SecondaryEndpoint {
    fn name(&self) -> &str {
        &self.url
    }

    fn source(&self) -> ScoreSource {
        ScoreSource::Secondary
    }

    async fn classify(&self, image: &ImageUpload) -> Result<i64, StrategyError> {
        let body: SecondaryResponse = post_image(&self.http, &self.url, image)
            .await?
            .json()
            .await
            .map_err(|e| StrategyError::Parse(e.to_string()))?;

        tracing::debug!(
            endpoint = %self.url,
            accuracy = body.accuracy,
            "Secondary classification response"
        );

        Ok(body.authenticity_score())
    }
}

/// Classification client trying each strategy in order
pub struct ClassificationClient {
    strategies: Vec<Box<dyn ClassificationStrategy>>,
}

impl ClassificationClient {
    /// Primary endpoint first, secondary as fallback
    ///
    /// No request timeout is set beyond the transport defaults.
    pub fn new(primary_url: &str, secondary_url: &str) -> Result<Self, ClassificationError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ClassificationError::ClientBuild(e.to_string()))?;

        let strategies: Vec<Box<dyn ClassificationStrategy>> = vec![
            Box::new(PrimaryEndpoint::new(http.clone(), primary_url)),
            Box::new(SecondaryEndpoint::new(http, secondary_url)),
        ];
        Ok(Self::with_strategies(strategies))
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ClassificationStrategy>>) -> Self {
        Self { strategies }
    }

    /// Classify one image, falling back through the strategies
    pub async fn classify(&self, image: &ImageUpload) -> Result<Classification, ClassificationError> {
        let mut attempts = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            match strategy.classify(image).await {
                Ok(score) => {
                    if score > 100 {
                        tracing::warn!(
                            endpoint = %strategy.name(),
                            score,
                            "Classification score exceeds 100 (unclamped)"
                        );
                    }
                    tracing::info!(
                        endpoint = %strategy.name(),
                        source = strategy.source().as_str(),
                        score,
                        "Classification successful"
                    );
                    return Ok(Classification {
                        score,
                        source: strategy.source(),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        endpoint = %strategy.name(),
                        error = %e,
                        "Classification endpoint failed, trying next"
                    );
                    attempts.push(format!("{}: {}", strategy.name(), e));
                }
            }
        }

        tracing::error!(attempts = attempts.len(), "All classification endpoints failed");
        Err(ClassificationError::AllEndpointsUnavailable { attempts })
    }
}
