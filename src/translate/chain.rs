use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{
    LibreTranslateProvider, LingvaProvider, MyMemoryProvider, ProviderError, TranslationOutcome,
    TranslationProvider, is_supported_language, normalize_lang_code, truncate_chars,
};
use crate::config::{ProviderKind, TranslateConfig};
use crate::error::Result;

/// Ordered list of providers tried until one returns a translation
pub struct TranslationChain {
    providers: Vec<Box<dyn TranslationProvider>>,
    attempt_timeout: Duration,
}

impl TranslationChain {
    pub fn new(providers: Vec<Box<dyn TranslationProvider>>, attempt_timeout: Duration) -> Self {
        Self {
            providers,
            attempt_timeout,
        }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Translate `text`, falling back to the input when every provider fails.
    ///
    /// Equal languages and blank text return immediately without calling any
    /// provider. Attempts are sequential and each is bounded by the chain's
    /// attempt timeout.
    pub async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> TranslationOutcome {
        let source = normalize_lang_code(source_lang);
        let target = normalize_lang_code(target_lang);

        if source == target || text.trim().is_empty() {
            info!("Skipping translation ({} -> {})", source, target);
            return TranslationOutcome::untranslated(text);
        }

        if !is_supported_language(&target) {
            debug!("Target language {} is not in the common set, passing it through", target);
        }

        for provider in &self.providers {
            let input = match provider.max_chars() {
                Some(limit) => truncate_chars(text, limit),
                None => text,
            };

            info!("Translating with {} from {} to {}...", provider.name(), source, target);

            match self.attempt(provider.as_ref(), input, &source, &target).await {
                Ok(translated) => {
                    info!("{} successful", provider.name());
                    return TranslationOutcome {
                        text: translated,
                        translated: true,
                        provider: Some(provider.name().to_string()),
                    };
                }
                Err(e) => warn!("{} error: {}", provider.name(), e),
            }
        }

        warn!("All translation providers failed, returning original text");
        TranslationOutcome::untranslated(text)
    }

    async fn attempt(
        &self,
        provider: &dyn TranslationProvider,
        text: &str,
        source: &str,
        target: &str,
    ) -> std::result::Result<String, ProviderError> {
        let translated = tokio::time::timeout(self.attempt_timeout, provider.translate(text, source, target))
            .await
            .map_err(|_| ProviderError::Timeout(self.attempt_timeout))??;

        if translated.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        Ok(translated)
    }
}

/// Builds the chain from configuration, keeping the configured order
pub struct TranslationChainFactory;

impl TranslationChainFactory {
    pub fn from_config(config: &TranslateConfig) -> Result<TranslationChain> {
        let client = Client::builder().build()?;

        let providers = config
            .providers
            .iter()
            .map(|provider| -> Box<dyn TranslationProvider> {
                let endpoint = provider.endpoint.clone();
                match provider.kind {
                    ProviderKind::Libre => {
                        Box::new(LibreTranslateProvider::new(client.clone(), endpoint, provider.max_chars))
                    }
                    ProviderKind::MyMemory => {
                        Box::new(MyMemoryProvider::new(client.clone(), endpoint, provider.max_chars))
                    }
                    ProviderKind::Lingva => Box::new(LingvaProvider::new(client.clone(), endpoint, provider.max_chars)),
                }
            })
            .collect();

        Ok(TranslationChain::new(
            providers,
            Duration::from_secs(config.attempt_timeout_secs),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    enum Behavior {
        Reply(&'static str),
        Fail,
        Hang,
    }

    /// Records every call into a shared log
    struct FakeProvider {
        name: &'static str,
        behavior: Behavior,
        max_chars: Option<usize>,
        calls: Arc<Mutex<Vec<(String, String)>>>,
    }

    #[async_trait]
    impl TranslationProvider for FakeProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn max_chars(&self) -> Option<usize> {
            self.max_chars
        }

        async fn translate(&self, text: &str, _source: &str, _target: &str) -> std::result::Result<String, ProviderError> {
            self.calls.lock().unwrap().push((self.name.to_string(), text.to_string()));
            match self.behavior {
                Behavior::Reply(reply) => Ok(reply.to_string()),
                Behavior::Fail => Err(ProviderError::EmptyResponse),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok("too late".to_string())
                }
            }
        }
    }

    fn chain(
        behaviors: &[(&'static str, Behavior, Option<usize>)],
    ) -> (TranslationChain, Arc<Mutex<Vec<(String, String)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let providers = behaviors
            .iter()
            .map(|(name, behavior, max_chars)| -> Box<dyn TranslationProvider> {
                Box::new(FakeProvider {
                    name: *name,
                    behavior: behavior.clone(),
                    max_chars: *max_chars,
                    calls: calls.clone(),
                })
            })
            .collect();
        (TranslationChain::new(providers, Duration::from_millis(50)), calls)
    }

    #[tokio::test]
    async fn test_same_language_makes_no_calls() {
        let (chain, calls) = chain(&[("primary", Behavior::Reply("hola"), None)]);

        let outcome = chain.translate("hello", "en", "en").await;
        assert_eq!(outcome, TranslationOutcome::untranslated("hello"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_text_makes_no_calls() {
        let (chain, calls) = chain(&[("primary", Behavior::Reply("hola"), None)]);

        assert_eq!(chain.translate("", "en", "es").await.text, "");
        assert_eq!(chain.translate("  \n", "en", "es").await.text, "  \n");
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let (chain, calls) = chain(&[
            ("primary", Behavior::Fail, None),
            ("secondary", Behavior::Reply("hola mundo"), None),
            ("tertiary", Behavior::Reply("never"), None),
        ]);

        let outcome = chain.translate("hello world", "en", "es").await;
        assert_eq!(outcome.text, "hola mundo");
        assert!(outcome.translated);
        assert_eq!(outcome.provider.as_deref(), Some("secondary"));

        let names: Vec<String> = calls.lock().unwrap().iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(names, vec!["primary", "secondary"]);
    }

    #[tokio::test]
    async fn test_empty_reply_falls_through() {
        let (chain, _) = chain(&[
            ("primary", Behavior::Reply("   "), None),
            ("secondary", Behavior::Reply("bonjour"), None),
        ]);

        assert_eq!(chain.translate("hello", "en", "fr").await.text, "bonjour");
    }

    #[tokio::test]
    async fn test_all_failing_returns_original_within_timeouts() {
        let (chain, calls) = chain(&[
            ("primary", Behavior::Hang, None),
            ("secondary", Behavior::Fail, None),
            ("tertiary", Behavior::Hang, None),
        ]);

        let started = std::time::Instant::now();
        let outcome = chain.translate("hello", "en", "de").await;

        assert_eq!(outcome, TranslationOutcome::untranslated("hello"));
        assert_eq!(calls.lock().unwrap().len(), 3);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_truncation_applies_to_capped_provider_only() {
        let (chain, calls) = chain(&[
            ("capped", Behavior::Fail, Some(5)),
            ("uncapped", Behavior::Fail, None),
        ]);

        let outcome = chain.translate("hello world", "en", "es").await;
        assert_eq!(outcome.text, "hello world");

        let calls = calls.lock().unwrap();
        assert_eq!(calls[0], ("capped".to_string(), "hello".to_string()));
        assert_eq!(calls[1], ("uncapped".to_string(), "hello world".to_string()));
    }

    /// Records the language pair each call receives
    struct PairRecorder {
        pairs: Arc<Mutex<Vec<(String, String)>>>,
    }

    #[async_trait]
    impl TranslationProvider for PairRecorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn translate(&self, text: &str, source: &str, target: &str) -> std::result::Result<String, ProviderError> {
            self.pairs.lock().unwrap().push((source.to_string(), target.to_string()));
            Ok(format!("[{}] {}", target, text))
        }
    }

    #[tokio::test]
    async fn test_regional_variants_are_translated_and_kept() {
        let pairs = Arc::new(Mutex::new(Vec::new()));
        let providers: Vec<Box<dyn TranslationProvider>> = vec![Box::new(PairRecorder { pairs: pairs.clone() })];
        let chain = TranslationChain::new(providers, Duration::from_millis(50));

        let outcome = chain.translate("你好", "zh", "zh-TW").await;
        assert!(outcome.translated);
        assert_eq!(outcome.text, "[zh-tw] 你好");

        chain.translate("hello", " EN ", "pt-BR").await;

        let pairs = pairs.lock().unwrap();
        assert_eq!(
            *pairs,
            vec![
                ("zh".to_string(), "zh-tw".to_string()),
                ("en".to_string(), "pt-br".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_same_language_ignores_case_and_whitespace() {
        let (chain, calls) = chain(&[("primary", Behavior::Reply("hola"), None)]);

        assert!(!chain.translate("hello", "EN", " en ").await.translated);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_factory_keeps_configured_order() {
        let chain = TranslationChainFactory::from_config(&TranslateConfig::default()).unwrap();
        assert_eq!(chain.provider_names(), vec!["libretranslate", "mymemory", "lingva"]);
    }
}
