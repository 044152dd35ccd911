use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{ProviderError, TranslationProvider};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    #[serde(default)]
    response_data: Option<MyMemoryData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryData {
    #[serde(default)]
    translated_text: Option<String>,
}

impl MyMemoryResponse {
    fn into_translation(self) -> Option<String> {
        self.response_data.and_then(|data| data.translated_text)
    }
}

/// MyMemory: query-parameter GET with a `src|tgt` language pair
pub struct MyMemoryProvider {
    client: Client,
    endpoint: String,
    max_chars: Option<usize>,
}

impl MyMemoryProvider {
    pub fn new(client: Client, endpoint: String, max_chars: Option<usize>) -> Self {
        Self {
            client,
            endpoint,
            max_chars,
        }
    }
}

#[async_trait]
impl TranslationProvider for MyMemoryProvider {
    fn name(&self) -> &str {
        "mymemory"
    }

    fn max_chars(&self) -> Option<usize> {
        self.max_chars
    }

    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, ProviderError> {
        let lang_pair = format!("{}|{}", source, target);

        debug!("Sending translation request to: {} ({})", self.endpoint, lang_pair);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", text), ("langpair", lang_pair.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body: MyMemoryResponse = response.json().await?;
        body.into_translation().ok_or(ProviderError::EmptyResponse)
    }
}
