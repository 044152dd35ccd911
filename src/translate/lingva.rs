use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use super::{ProviderError, TranslationProvider};

#[derive(Debug, Deserialize)]
struct LingvaResponse {
    #[serde(default)]
    translation: Option<String>,
}

/// Lingva: GET `{endpoint}/{source}/{target}/{text}`
pub struct LingvaProvider {
    client: Client,
    endpoint: String,
    max_chars: Option<usize>,
}

impl LingvaProvider {
    pub fn new(client: Client, endpoint: String, max_chars: Option<usize>) -> Self {
        Self {
            client,
            endpoint,
            max_chars,
        }
    }

    /// Append the language pair and text as percent-encoded path segments
    fn request_url(&self, text: &str, source: &str, target: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| ProviderError::InvalidEndpoint(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidEndpoint(self.endpoint.clone()))?
            .pop_if_empty()
            .extend([source, target, text]);

        Ok(url)
    }
}

#[async_trait]
impl TranslationProvider for LingvaProvider {
    fn name(&self) -> &str {
        "lingva"
    }

    fn max_chars(&self) -> Option<usize> {
        self.max_chars
    }

    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, ProviderError> {
        let url = self.request_url(text, source, target)?;

        debug!("Sending translation request to: {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body: LingvaResponse = response.json().await?;
        body.translation.ok_or(ProviderError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(endpoint: &str) -> LingvaProvider {
        LingvaProvider::new(Client::new(), endpoint.to_string(), Some(1000))
    }

    #[test]
    fn test_request_url_encodes_text() {
        let url = provider("https://lingva.ml/api/v1")
            .request_url("hello world/again?", "en", "es")
            .unwrap();
        assert_eq!(url.as_str(), "https://lingva.ml/api/v1/en/es/hello%20world%2Fagain%3F");
    }

    #[test]
    fn test_request_url_trailing_slash() {
        let url = provider("https://lingva.ml/api/v1/").request_url("hi", "en", "ja").unwrap();
        assert_eq!(url.path(), "/api/v1/en/ja/hi");
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = provider("not a url").request_url("hi", "en", "ja").unwrap_err();
        assert!(matches!(err, ProviderError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_response_parsing() {
        let body: LingvaResponse = serde_json::from_str(r#"{"translation": "hola"}"#).unwrap();
        assert_eq!(body.translation.as_deref(), Some("hola"));
    }
}
