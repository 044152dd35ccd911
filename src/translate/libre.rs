use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ProviderError, TranslationProvider};

#[derive(Debug, Serialize)]
struct LibreRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LibreResponse {
    #[serde(default)]
    translated_text: Option<String>,
}

/// LibreTranslate: JSON POST
pub struct LibreTranslateProvider {
    client: Client,
    endpoint: String,
    max_chars: Option<usize>,
}

impl LibreTranslateProvider {
    pub fn new(client: Client, endpoint: String, max_chars: Option<usize>) -> Self {
        Self {
            client,
            endpoint,
            max_chars,
        }
    }
}

#[async_trait]
impl TranslationProvider for LibreTranslateProvider {
    fn name(&self) -> &str {
        "libretranslate"
    }

    fn max_chars(&self) -> Option<usize> {
        self.max_chars
    }

    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, ProviderError> {
        let request = LibreRequest {
            q: text,
            source,
            target,
            format: "text",
        };

        debug!("Sending translation request to: {}", self.endpoint);

        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body: LibreResponse = response.json().await?;
        body.translated_text.ok_or(ProviderError::EmptyResponse)
    }
}
