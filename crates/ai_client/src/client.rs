use std::time::Duration;

use ctrsum_core::{CompanyClassifier, IndicatorDictionary, RawCell};
use serde::{Deserialize, Serialize};

use crate::prompt::{build_prompt, parse_answer, representative_keywords, MAX_PROMPT_KEYWORDS};

const SYSTEM_PROMPT: &str =
    "You identify companies from search keyword lists. Answer with a company name and nothing else.";

/// Connection and sampling parameters.
#[derive(Debug, Clone)]
pub struct AiClientConfig {
    /// Base URL, e.g. `https://api.openai.com/v1`
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug)]
pub enum AiError {
    /// HTTP client could not be built
    Client(String),
    /// Network error
    Network(String),
    Timeout,
    /// HTTP error with status code
    Http(u16, String),
    /// Response body was not a chat completion
    Parse(String),
}

impl std::fmt::Display for AiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiError::Client(msg) => write!(f, "HTTP client error: {}", msg),
            AiError::Network(msg) => write!(f, "Network error: {}", msg),
            AiError::Timeout => write!(f, "request timed out"),
            AiError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            AiError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for AiError {}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Asks a chat-completions model which company a keyword list belongs to.
pub struct OpenAiClassifier {
    http: reqwest::blocking::Client,
    config: AiClientConfig,
}

impl OpenAiClassifier {
    pub fn new(config: AiClientConfig) -> Result<Self, AiError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("ctrsum/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::Client(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// One request. `Ok(None)` when there is nothing to ask about or the
    /// model declines.
    pub fn identify(&self, keywords: &[RawCell]) -> Result<Option<String>, AiError> {
        let sample = representative_keywords(keywords, MAX_PROMPT_KEYWORDS);
        if sample.is_empty() {
            return Ok(None);
        }

        let prompt = build_prompt(&sample);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &prompt },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout
                } else {
                    AiError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AiError::Http(status, body));
        }

        let body: ChatResponse = response.json().map_err(|e| AiError::Parse(e.to_string()))?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AiError::Parse("response has no message content".to_string()))?;

        Ok(parse_answer(&content))
    }
}

impl CompanyClassifier for OpenAiClassifier {
    fn name(&self) -> &'static str {
        "ai"
    }

    fn attempt(&self, keywords: &[RawCell], _dictionary: &IndicatorDictionary) -> Option<String> {
        match self.identify(keywords) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(model = %self.config.model, error = %e, "AI classification failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctrsum_core::ClassifierChain;
    use httpmock::prelude::*;

    fn config(endpoint: String) -> AiClientConfig {
        AiClientConfig {
            endpoint,
            model: "test-model".into(),
            api_key: "sk-test".into(),
            timeout: Duration::from_secs(5),
            temperature: 0.1,
            max_tokens: 20,
        }
    }

    fn kws(values: &[&str]) -> Vec<RawCell> {
        values.iter().map(|s| RawCell::Text(s.to_string())).collect()
    }

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }
            ]
        })
    }

    #[test]
    fn test_identify_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("Authorization", "Bearer sk-test");
            then.status(200)
                .json_body(completion(" \"Globex Corporation\".\n"));
        });

        let classifier = OpenAiClassifier::new(config(server.base_url())).unwrap();
        let answer = classifier.identify(&kws(&["globex login", "Globex pricing"])).unwrap();
        assert_eq!(answer.as_deref(), Some("Globex Corporation"));
        mock.assert();
    }

    #[test]
    fn test_unknown_reply_is_no_match() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(completion("Unknown Company"));
        });

        let classifier = OpenAiClassifier::new(config(server.base_url())).unwrap();
        assert_eq!(classifier.identify(&kws(&["cheap flights"])).unwrap(), None);
    }

    #[test]
    fn test_server_error_is_no_match_in_chain() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(500).body("upstream exploded");
        });

        let classifier = OpenAiClassifier::new(config(server.base_url())).unwrap();
        match classifier.identify(&kws(&["chase login"])) {
            Err(AiError::Http(500, body)) => assert_eq!(body, "upstream exploded"),
            other => panic!("expected HTTP 500, got {:?}", other),
        }
        assert_eq!(classifier.attempt(&kws(&["chase login"]), &IndicatorDictionary::builtin()), None);
    }

    #[test]
    fn test_failed_request_falls_through_to_heuristic() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(500).body("upstream exploded");
        });

        let mut chain = ClassifierChain::with_heuristic();
        chain.prepend(Box::new(OpenAiClassifier::new(config(server.base_url())).unwrap()));
        assert_eq!(chain.strategy_names(), vec!["ai", "dictionary", "capitalization"]);

        let res = chain.resolve(&kws(&["Globex Widgets", "widgets", "Globex Widgets"]), &IndicatorDictionary::builtin());
        assert_eq!(res.company, "Globex Widgets");
        assert_eq!(res.strategy, Some("capitalization"));

        // Dictionary still wins over the heuristic when it matches
        let res = chain.resolve(&kws(&["Amex Gold"]), &IndicatorDictionary::builtin());
        assert_eq!(res.company, "American Express");
        assert_eq!(res.strategy, Some("dictionary"));
        assert_eq!(mock.hits(), 2);
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).body("not json at all");
        });

        let classifier = OpenAiClassifier::new(config(server.base_url())).unwrap();
        assert!(matches!(classifier.identify(&kws(&["x co"])), Err(AiError::Parse(_))));
    }

    #[test]
    fn test_no_choices_is_parse_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(serde_json::json!({ "choices": [] }));
        });

        let classifier = OpenAiClassifier::new(config(server.base_url())).unwrap();
        assert!(matches!(classifier.identify(&kws(&["x co"])), Err(AiError::Parse(_))));
    }

    #[test]
    fn test_no_keywords_skips_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(completion("Chase"));
        });

        let classifier = OpenAiClassifier::new(config(server.base_url())).unwrap();
        assert_eq!(classifier.identify(&[RawCell::Empty]).unwrap(), None);
        assert_eq!(mock.hits(), 0);
    }

    #[test]
    fn test_unreachable_endpoint_is_network_error() {
        // Port 9 (discard) on localhost is closed in test environments
        let classifier = OpenAiClassifier::new(config("http://127.0.0.1:9".into())).unwrap();
        let err = classifier.identify(&kws(&["chase"])).unwrap_err();
        assert!(matches!(err, AiError::Network(_) | AiError::Timeout));
    }
}
