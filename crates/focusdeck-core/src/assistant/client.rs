use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

pub const DEFAULT_ENDPOINT: &str = "https://api.a0.dev/ai/llm";

/// Substituted when the endpoint answers without any text
pub const EMPTY_REPLY: &str = "I'm sorry, I couldn't process your request.";

/// One `(role, content)` pair as it travels over the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    messages: &'a [WireMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub struct AssistantClient {
    client: Client,
    endpoint: String,
}

impl AssistantClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send the whole conversation and return the reply text
    pub async fn complete(&self, messages: &[WireMessage]) -> Result<String> {
        let request = CompletionRequest { messages };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(CoreError::Assistant(format!(
                "completion request failed with status {}: {}",
                status, text
            )));
        }

        let completion: CompletionResponse = response.json().await?;
        Ok(completion
            .content
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| EMPTY_REPLY.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn history() -> Vec<WireMessage> {
        vec![
            WireMessage {
                role: "assistant".to_string(),
                content: "Hi there!".to_string(),
            },
            WireMessage {
                role: "user".to_string(),
                content: "Plan my day".to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn test_complete_posts_history_and_reads_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ai/llm"))
            .and(body_json(serde_json::json!({
                "messages": [
                    {"role": "assistant", "content": "Hi there!"},
                    {"role": "user", "content": "Plan my day"}
                ]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"content": "Start with the proposal."})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = AssistantClient::new(&format!("{}/ai/llm", server.uri()));
        let reply = client.complete(&history()).await.unwrap();
        assert_eq!(reply, "Start with the proposal.");
    }

    #[tokio::test]
    async fn test_missing_content_uses_fallback_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = AssistantClient::new(&server.uri());
        let reply = client.complete(&history()).await.unwrap();
        assert_eq!(reply, EMPTY_REPLY);
    }

    #[tokio::test]
    async fn test_error_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = AssistantClient::new(&server.uri());
        let err = client.complete(&history()).await.unwrap_err();
        assert!(matches!(err, CoreError::Assistant(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_non_json_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = AssistantClient::new(&server.uri());
        let err = client.complete(&history()).await.unwrap_err();
        assert!(matches!(err, CoreError::Http(_)));
    }
}
