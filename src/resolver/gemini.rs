//! Looks up bus stops by asking Gemini with Google Search grounding enabled.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{Instrument, info, info_span, warn};

use crate::config::Config;
use crate::error::ResolutionError;
use crate::model::StopRecord;
use crate::model::gemini_api_model::{GeminiStop, GenerateContentRequest, GenerateContentResponse};
use crate::utils::strip_code_fence;

use super::{Resolution, StopResolver};

pub struct GeminiResolver {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiResolver {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ResolutionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ResolutionError::Http)?;

        Ok(GeminiResolver {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(GeminiResolver::new(
            config.api_key()?,
            config.model.as_str(),
            config.base_url.as_str(),
            config.timeout,
        )?)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl StopResolver for GeminiResolver {
    #[tracing::instrument(err, skip(self))]
    async fn resolve(&self, stop_id: &str) -> Result<Resolution, ResolutionError> {
        let request = GenerateContentRequest::grounded_json(build_prompt(stop_id));

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .instrument(info_span!("Querying Gemini"))
            .await
            .map_err(|e| ResolutionError::from_transport(e, self.timeout))?;

        let status = response.status();

        let body = response
            .text()
            .instrument(info_span!("Reading body of response"))
            .await
            .map_err(|e| ResolutionError::from_transport(e, self.timeout))?;

        if !status.is_success() {
            warn!(%status, body = %body, "Gemini refused the request");
            return Err(ResolutionError::Status { status, body });
        }

        let resolution = parse_generate_content(&body, stop_id)?;

        info!(
            "resolved {} to {} ({}, {}) with {} sources",
            stop_id,
            resolution.stop.name(),
            resolution.stop.latitude(),
            resolution.stop.longitude(),
            resolution.sources.len()
        );

        Ok(resolution)
    }
}

pub fn build_prompt(stop_id: &str) -> String {
    format!(
        "Find the exact GPS coordinates (latitude, longitude) and the official name for the South Korean bus stop with ID \"{stop_id}\".
Provide the information in JSON format with the following keys: name, latitude, longitude, city.
If the ID is partially incomplete or standard (like 5 digits), find the most likely match."
    )
}

/// Pulls the stop and its citations out of a raw `generateContent` response body.
pub fn parse_generate_content(body: &str, stop_id: &str) -> Result<Resolution, ResolutionError> {
    let response: GenerateContentResponse = serde_json::from_str(body)?;

    let text = response.text().ok_or(ResolutionError::EmptyResponse)?;

    let stop: GeminiStop = serde_json::from_str(strip_code_fence(&text)).inspect_err(|e| {
        warn!("Couldn't parse stop from model answer {text:?}: {e}");
    })?;

    Ok(Resolution {
        stop: StopRecord::try_from_gemini_stop(stop, stop_id)?,
        sources: response.sources(),
    })
}
