use anyhow::{Context, Result, bail};
use base64::Engine;
use tracing::debug;

use pantry_core::recognition::{
    ChatRequest, ChatResponse, VoiceLine, image_request, reply_content, voice_request,
};

use crate::config::Config;

/// Chat-completions client for photo and voice recognition.
pub struct SiliconFlowClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    vision_model: String,
    text_model: String,
}

impl SiliconFlowClient {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "pantry-cli/{} (pantry tracker)",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(std::time::Duration::from_secs(60))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
            vision_model: config.vision_model.clone(),
            text_model: config.text_model.clone(),
        })
    }

    /// Raw reply text for a photo of ingredients.
    pub async fn recognize_image_async(&self, image: &[u8]) -> Result<String> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let request = image_request(&self.vision_model, &encoded);
        self.complete(&request).await
    }

    /// Raw reply text for pre-split spoken input.
    pub async fn recognize_voice_async(&self, lines: &[VoiceLine]) -> Result<String> {
        let request = voice_request(&self.text_model, lines)?;
        self.complete(&request).await
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        debug!(model = %request.model, url = %self.api_url, "calling recognition API");
        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .context("Failed to reach recognition API")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Recognition API returned {status}: {body}");
        }

        let data: ChatResponse = resp
            .json()
            .await
            .context("Failed to parse recognition API response")?;
        reply_content(data)
    }
}
